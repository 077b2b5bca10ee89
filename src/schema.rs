//! Schema declaration.
//!
//! Fields are declared with typed descriptors (`Property<T>`, `Set<T>`, …)
//! that are registered on a [`ModelSchema`] or, for top-level fields, on the
//! database [`Schema`]. Binding a descriptor to a [`Holder`] checks the
//! registration and derives the key.

use crate::error::{TrolError, TrolResult};
use crate::key::{self, KeyPath};
use crate::model::Entity;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Property,
    Set,
    SortedSet,
    List,
    Hash,
    Lock,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Property => "property",
            FieldKind::Set => "set",
            FieldKind::SortedSet => "sorted set",
            FieldKind::List => "list",
            FieldKind::Hash => "hash",
            FieldKind::Lock => "lock",
        }
    }

    /// The Redis type (as reported by `TYPE`) a key of this kind holds.
    pub fn redis_type(&self) -> &'static str {
        match self {
            FieldKind::Property | FieldKind::Lock => "string",
            FieldKind::Set => "set",
            FieldKind::SortedSet => "zset",
            FieldKind::List => "list",
            FieldKind::Hash => "hash",
        }
    }
}

/// What a descriptor declares: its name, kind and value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub value_type: &'static str,
}

pub trait Field {
    fn spec(&self) -> FieldSpec;
}

/// Something descriptors can be bound to: an entity or the database itself.
pub trait Holder {
    fn holder_name(&self) -> &str;

    fn declared(&self, name: &str) -> Option<&FieldSpec>;

    /// The key for a field, without checking that it is declared.
    fn key_for(&self, name: &str) -> String;

    fn bind(&self, spec: &FieldSpec) -> TrolResult<String> {
        match self.declared(spec.name) {
            Some(declared) if declared == spec => Ok(self.key_for(spec.name)),
            _ => Err(TrolError::UndeclaredField {
                holder: self.holder_name().to_string(),
                field: spec.name.to_string(),
            }),
        }
    }
}

impl<H: Holder> Holder for Arc<H> {
    fn holder_name(&self) -> &str {
        (**self).holder_name()
    }

    fn declared(&self, name: &str) -> Option<&FieldSpec> {
        (**self).declared(name)
    }

    fn key_for(&self, name: &str) -> String {
        (**self).key_for(name)
    }
}

fn register(
    holder: &str,
    specs: Vec<FieldSpec>,
) -> TrolResult<BTreeMap<&'static str, FieldSpec>> {
    let mut fields = BTreeMap::new();
    for spec in specs {
        key::validate_name(spec.name)?;
        if fields.insert(spec.name, spec).is_some() {
            return Err(TrolError::DuplicateField {
                holder: holder.to_string(),
                field: spec.name.to_string(),
            });
        }
    }
    Ok(fields)
}

/// The declared fields of one model type.
#[derive(Debug)]
pub struct ModelSchema {
    name: String,
    fields: BTreeMap<&'static str, FieldSpec>,
}

impl ModelSchema {
    pub fn builder(name: impl Into<String>) -> ModelSchemaBuilder {
        ModelSchemaBuilder {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.values()
    }

    /// Shorthand for [`Entity::new`].
    pub fn entity(self: &Arc<Self>, identity: &str) -> TrolResult<Entity> {
        Entity::new(self, identity)
    }
}

pub struct ModelSchemaBuilder {
    name: String,
    fields: Vec<FieldSpec>,
}

impl ModelSchemaBuilder {
    pub fn field(mut self, field: &dyn Field) -> Self {
        self.fields.push(field.spec());
        self
    }

    pub fn build(self) -> TrolResult<Arc<ModelSchema>> {
        key::validate_name(&self.name)?;
        let fields = register(&self.name, self.fields)?;
        Ok(Arc::new(ModelSchema {
            name: self.name,
            fields,
        }))
    }
}

/// A schema-level view of a key, as resolved by [`Schema::describe`].
#[derive(Debug, Clone, PartialEq)]
pub struct KeyDescription {
    pub path: KeyPath,
    /// `None` for model keys, which are never stored themselves.
    pub field: Option<FieldSpec>,
}

/// The schema of a database: top-level fields and the models living in it.
#[derive(Debug, Default)]
pub struct Schema {
    fields: BTreeMap<&'static str, FieldSpec>,
    models: BTreeMap<String, Arc<ModelSchema>>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    pub fn empty() -> Arc<Schema> {
        Arc::new(Schema::default())
    }

    pub fn model(&self, name: &str) -> Option<&Arc<ModelSchema>> {
        self.models.get(name)
    }

    pub fn models(&self) -> impl Iterator<Item = &Arc<ModelSchema>> {
        self.models.values()
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.values()
    }

    /// Resolve a key against the declared schema. Keys that do not belong
    /// to a declared model or field yield `None`.
    pub fn describe(&self, key: &str) -> Option<KeyDescription> {
        let path = KeyPath::parse(key).ok()?;
        let field = match &path {
            KeyPath::Global { field } => Some(*self.fields.get(field.as_str())?),
            KeyPath::Entity { model, .. } => {
                self.models.get(model)?;
                None
            }
            KeyPath::Field { model, field, .. } => {
                Some(*self.models.get(model)?.field(field)?)
            }
        };
        Some(KeyDescription { path, field })
    }
}

impl Holder for Schema {
    fn holder_name(&self) -> &str {
        "database"
    }

    fn declared(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    fn key_for(&self, name: &str) -> String {
        name.to_string()
    }
}

#[derive(Default)]
pub struct SchemaBuilder {
    fields: Vec<FieldSpec>,
    models: Vec<Arc<ModelSchema>>,
}

impl SchemaBuilder {
    pub fn field(mut self, field: &dyn Field) -> Self {
        self.fields.push(field.spec());
        self
    }

    pub fn model(mut self, model: &Arc<ModelSchema>) -> Self {
        self.models.push(Arc::clone(model));
        self
    }

    pub fn build(self) -> TrolResult<Arc<Schema>> {
        let fields = register("database", self.fields)?;
        let mut models = BTreeMap::new();
        for model in self.models {
            let name = model.name().to_string();
            if models.insert(name.clone(), model).is_some() {
                return Err(TrolError::DuplicateModel(name));
            }
        }
        Ok(Arc::new(Schema { fields, models }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::Set;
    use crate::property::Property;

    const NAME: Property<String> = Property::new("name");
    const BEERS: Set<String> = Set::new("beers");
    const VISITS: Property<u64> = Property::new("visits");

    fn brewery() -> Arc<ModelSchema> {
        ModelSchema::builder("Brewery")
            .field(&NAME)
            .field(&BEERS)
            .build()
            .unwrap()
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let err = ModelSchema::builder("Brewery")
            .field(&NAME)
            .field(&Property::<i64>::new("name"))
            .build()
            .unwrap_err();
        assert!(matches!(err, TrolError::DuplicateField { .. }));
    }

    #[test]
    fn test_invalid_model_name_rejected() {
        assert!(ModelSchema::builder("Bad:Name").build().is_err());
        assert!(ModelSchema::builder("").build().is_err());
    }

    #[test]
    fn test_bind_checks_kind_and_type() {
        let frmt = brewery().entity("frmt").unwrap();
        assert_eq!(frmt.bind(&NAME.spec()).unwrap(), "Brewery:frmt:name");
        assert!(frmt.bind(&Property::<i64>::new("name").spec()).is_err());
        assert!(frmt.bind(&Set::<String>::new("name").spec()).is_err());
        assert!(frmt.bind(&VISITS.spec()).is_err());
    }

    #[test]
    fn test_describe() {
        let brewery = brewery();
        let schema = Schema::builder()
            .field(&VISITS)
            .model(&brewery)
            .build()
            .unwrap();

        let described = schema.describe("Brewery:frmt:beers").unwrap();
        assert_eq!(described.field.unwrap().kind, FieldKind::Set);
        assert_eq!(described.path.identity().unwrap().as_str(), "frmt");

        assert_eq!(schema.describe("visits").unwrap().field, Some(VISITS.spec()));
        assert!(schema.describe("Brewery:frmt").unwrap().field.is_none());
        assert!(schema.describe("Brewery:frmt:address").is_none());
        assert!(schema.describe("Winery:x:name").is_none());
        assert!(schema.describe("not a key").is_none());
    }

    #[test]
    fn test_duplicate_model_rejected() {
        let brewery = brewery();
        let err = Schema::builder()
            .model(&brewery)
            .model(&brewery)
            .build()
            .unwrap_err();
        assert!(matches!(err, TrolError::DuplicateModel(name) if name == "Brewery"));
    }
}
