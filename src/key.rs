//! Key derivation.
//!
//! Field keys are `{Model}:{identity}:{field}`, model keys are
//! `{Model}:{identity}` and top-level fields use `{field}` alone. Derivation is
//! a pure function of its inputs, and [`KeyPath::parse`] inverts it for any key
//! built from valid parts.

use crate::error::{TrolError, TrolResult};
use std::fmt;
use std::str::FromStr;

pub const DELIMITER: char = ':';

/// The identity of one entity, unique within its model.
///
/// An identity never contains the delimiter. Arbitrary strings can still be
/// used through [`Identity::escaped`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(String);

impl Identity {
    pub fn new(value: impl Into<String>) -> TrolResult<Self> {
        let value = value.into();
        if value.is_empty() {
            return Err(TrolError::InvalidIdentity(value, "identity is empty"));
        }
        if value.contains(DELIMITER) {
            return Err(TrolError::InvalidIdentity(
                value,
                "identity contains the ':' delimiter",
            ));
        }
        Ok(Identity(value))
    }

    /// Percent-encode `%` and `:` so that any non-empty string is usable.
    pub fn escaped(raw: &str) -> TrolResult<Self> {
        if raw.is_empty() {
            return Err(TrolError::InvalidIdentity(String::new(), "identity is empty"));
        }
        let mut out = String::with_capacity(raw.len());
        for ch in raw.chars() {
            match ch {
                '%' => out.push_str("%25"),
                ':' => out.push_str("%3A"),
                c => out.push(c),
            }
        }
        Ok(Identity(out))
    }

    /// Inverse of [`Identity::escaped`]. Unknown `%` sequences are kept verbatim.
    pub fn unescape(&self) -> String {
        let mut out = String::with_capacity(self.0.len());
        let mut rest = self.0.as_str();
        while let Some(pos) = rest.find('%') {
            out.push_str(&rest[..pos]);
            let tail = &rest[pos..];
            if tail.starts_with("%25") {
                out.push('%');
                rest = &tail[3..];
            } else if tail.starts_with("%3A") {
                out.push(':');
                rest = &tail[3..];
            } else {
                out.push('%');
                rest = &tail[1..];
            }
        }
        out.push_str(rest);
        out
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Identity {
    type Err = TrolError;

    fn from_str(s: &str) -> TrolResult<Self> {
        Identity::new(s)
    }
}

/// Model and field names: non-empty, no delimiter, no whitespace or control characters.
pub fn validate_name(name: &str) -> TrolResult<()> {
    if name.is_empty() {
        return Err(TrolError::InvalidName(name.to_string(), "name is empty"));
    }
    if name.contains(DELIMITER) {
        return Err(TrolError::InvalidName(
            name.to_string(),
            "name contains the ':' delimiter",
        ));
    }
    if name.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(TrolError::InvalidName(
            name.to_string(),
            "name contains whitespace or control characters",
        ));
    }
    Ok(())
}

/// `{model}:{identity}`, assuming both parts are already valid.
pub fn model_key(model: &str, identity: &Identity) -> String {
    format!("{model}{DELIMITER}{identity}")
}

/// `{model}:{identity}:{field}`, assuming all parts are already valid.
pub fn field_key(model: &str, identity: &Identity, field: &str) -> String {
    format!("{model}{DELIMITER}{identity}{DELIMITER}{field}")
}

/// A storage key broken into its schema components.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyPath {
    Global {
        field: String,
    },
    Entity {
        model: String,
        identity: Identity,
    },
    Field {
        model: String,
        identity: Identity,
        field: String,
    },
}

impl KeyPath {
    pub fn global(field: &str) -> TrolResult<Self> {
        validate_name(field)?;
        Ok(KeyPath::Global {
            field: field.to_string(),
        })
    }

    pub fn entity(model: &str, identity: &Identity) -> TrolResult<Self> {
        validate_name(model)?;
        Ok(KeyPath::Entity {
            model: model.to_string(),
            identity: identity.clone(),
        })
    }

    pub fn field(model: &str, identity: &Identity, field: &str) -> TrolResult<Self> {
        validate_name(model)?;
        validate_name(field)?;
        Ok(KeyPath::Field {
            model: model.to_string(),
            identity: identity.clone(),
            field: field.to_string(),
        })
    }

    pub fn parse(key: &str) -> TrolResult<Self> {
        let malformed = || TrolError::MalformedKey(key.to_string());
        let parts: Vec<&str> = key.split(DELIMITER).collect();
        let path = match parts.as_slice() {
            [field] => KeyPath::global(field),
            [model, identity] => {
                Identity::new(*identity).and_then(|id| KeyPath::entity(model, &id))
            }
            [model, identity, field] => {
                Identity::new(*identity).and_then(|id| KeyPath::field(model, &id, field))
            }
            _ => return Err(malformed()),
        };
        path.map_err(|_| malformed())
    }

    pub fn render(&self) -> String {
        match self {
            KeyPath::Global { field } => field.clone(),
            KeyPath::Entity { model, identity } => model_key(model, identity),
            KeyPath::Field {
                model,
                identity,
                field,
            } => field_key(model, identity, field),
        }
    }

    pub fn model(&self) -> Option<&str> {
        match self {
            KeyPath::Global { .. } => None,
            KeyPath::Entity { model, .. } | KeyPath::Field { model, .. } => Some(model),
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            KeyPath::Global { .. } => None,
            KeyPath::Entity { identity, .. } | KeyPath::Field { identity, .. } => Some(identity),
        }
    }

    pub fn field_name(&self) -> Option<&str> {
        match self {
            KeyPath::Entity { .. } => None,
            KeyPath::Global { field } | KeyPath::Field { field, .. } => Some(field),
        }
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl FromStr for KeyPath {
    type Err = TrolError;

    fn from_str(s: &str) -> TrolResult<Self> {
        KeyPath::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_brewery_name_key() {
        let id = Identity::new("frmt").unwrap();
        assert_eq!(field_key("Brewery", &id, "name"), "Brewery:frmt:name");
        assert_eq!(model_key("Brewery", &id), "Brewery:frmt");
    }

    #[test]
    fn test_identity_rejects_empty_and_delimiter() {
        assert!(matches!(
            Identity::new(""),
            Err(TrolError::InvalidIdentity(_, "identity is empty"))
        ));
        assert!(Identity::new("a:b").is_err());
        assert!(Identity::new("with space").is_ok());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name").is_ok());
        assert!(validate_name("2").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("first:name").is_err());
        assert!(validate_name("first name").is_err());
        assert!(validate_name("tab\t").is_err());
    }

    #[test]
    fn test_parse_is_left_inverse() {
        let models = ["Brewery", "Beer", "X"];
        let ids = ["frmt", "1", "élan", "a b", "%3A"];
        let fields = ["name", "beers", "2"];
        let mut seen = HashSet::new();

        for model in models {
            for id in ids {
                let identity = Identity::new(id).unwrap();
                for field in fields {
                    let key = field_key(model, &identity, field);
                    assert!(seen.insert(key.clone()), "collision on {key}");
                    let parsed = KeyPath::parse(&key).unwrap();
                    assert_eq!(
                        parsed,
                        KeyPath::field(model, &identity, field).unwrap()
                    );
                    assert_eq!(parsed.render(), key);
                }
            }
        }
        assert_eq!(seen.len(), models.len() * ids.len() * fields.len());
    }

    #[test]
    fn test_parse_global_and_entity() {
        assert_eq!(
            KeyPath::parse("visits").unwrap(),
            KeyPath::Global {
                field: "visits".to_string()
            }
        );
        let path = KeyPath::parse("Brewery:frmt").unwrap();
        assert_eq!(path.model(), Some("Brewery"));
        assert_eq!(path.identity().map(Identity::as_str), Some("frmt"));
        assert_eq!(path.field_name(), None);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for key in ["", "a:b:c:d", "a::b", ":x", "Brewery:frmt:", "bad name"] {
            assert!(
                matches!(KeyPath::parse(key), Err(TrolError::MalformedKey(_))),
                "{key:?} should be malformed"
            );
        }
    }

    #[test]
    fn test_escaped_identity_round_trip() {
        for raw in ["a:b", "100%", "%3A", "::", "plain"] {
            let id = Identity::escaped(raw).unwrap();
            assert!(!id.as_str().contains(DELIMITER));
            assert_eq!(id.unescape(), raw);

            let key = field_key("User", &id, "email");
            let parsed = KeyPath::parse(&key).unwrap();
            assert_eq!(parsed.identity().unwrap().unescape(), raw);
        }
        assert_eq!(Identity::escaped("a:b").unwrap().as_str(), "a%3Ab");
        assert!(Identity::escaped("").is_err());
    }

    #[test]
    fn test_escaped_identities_are_injective() {
        let a = Identity::escaped("a:b").unwrap();
        let b = Identity::escaped("a%3Ab").unwrap();
        assert_ne!(a, b);
    }
}
