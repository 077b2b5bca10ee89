use crate::error::{TrolError, TrolResult};
use crate::resp::RespValue;

/// One Redis command: a name followed by binary-safe arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    name: &'static str,
    args: Vec<Vec<u8>>,
}

impl Command {
    pub fn new(name: &'static str) -> Self {
        Command {
            name,
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<Vec<u8>>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Vec<u8>>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn int_arg(self, n: i64) -> Self {
        self.arg(n.to_string())
    }

    pub fn float_arg(self, f: f64) -> Self {
        self.arg(format_float(f))
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn arguments(&self) -> &[Vec<u8>] {
        &self.args
    }

    /// The first argument, which for every command this crate sends is a key.
    pub fn first_key(&self) -> Option<String> {
        self.args
            .first()
            .map(|a| String::from_utf8_lossy(a).into_owned())
    }

    /// The command as a RESP array of bulk strings, ready for the wire.
    pub fn to_resp(&self) -> RespValue {
        let mut items = Vec::with_capacity(self.args.len() + 1);
        items.push(RespValue::bulk_string(self.name.as_bytes()));
        items.extend(self.args.iter().map(|a| RespValue::bulk_string(a.clone())));
        RespValue::array(items)
    }
}

/// Redis spells infinities `inf` / `-inf`, which is also what `f64`'s
/// `Display` produces.
pub(crate) fn format_float(f: f64) -> String {
    format!("{f}")
}

/// A successful (non-error) reply, tagged with the command that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    command: &'static str,
    value: RespValue,
}

impl Reply {
    pub fn new(command: &'static str, value: RespValue) -> Self {
        Reply { command, value }
    }

    pub fn value(&self) -> &RespValue {
        &self.value
    }

    pub fn into_value(self) -> RespValue {
        self.value
    }

    fn unexpected(self) -> TrolError {
        TrolError::UnexpectedReply {
            command: self.command.to_string(),
            reply: self.value,
        }
    }

    /// `+OK`.
    pub fn ok(self) -> TrolResult<()> {
        if self.value.is_ok() {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    /// `+OK` or a null reply, as returned by conditional `SET`.
    pub fn ok_or_null(self) -> TrolResult<bool> {
        if self.value.is_ok() {
            Ok(true)
        } else if self.value.is_null() {
            Ok(false)
        } else {
            Err(self.unexpected())
        }
    }

    pub fn simple(self) -> TrolResult<String> {
        match self.value {
            RespValue::SimpleString(s) => Ok(s),
            _ => Err(self.unexpected()),
        }
    }

    pub fn integer(self) -> TrolResult<i64> {
        match self.value {
            RespValue::Integer(n) => Ok(n),
            _ => Err(self.unexpected()),
        }
    }

    /// A count that Redis never reports as negative.
    pub fn count(self) -> TrolResult<u64> {
        match self.value {
            RespValue::Integer(n) if n >= 0 => Ok(n as u64),
            _ => Err(self.unexpected()),
        }
    }

    pub fn flag(self) -> TrolResult<bool> {
        self.integer().map(|n| n != 0)
    }

    /// An integer or null, e.g. `ZRANK` on a missing member.
    pub fn optional_count(self) -> TrolResult<Option<u64>> {
        match self.value {
            RespValue::Integer(n) if n >= 0 => Ok(Some(n as u64)),
            ref v if v.is_null() => Ok(None),
            _ => Err(self.unexpected()),
        }
    }

    pub fn bulk(self) -> TrolResult<Option<Vec<u8>>> {
        match self.value {
            RespValue::BulkString(data) => Ok(data),
            RespValue::Array(None) => Ok(None),
            _ => Err(self.unexpected()),
        }
    }

    /// A float sent as a bulk string (`ZSCORE`, `ZINCRBY`).
    pub fn float(self) -> TrolResult<Option<f64>> {
        let command = self.command;
        let reply = self.value.clone();
        match self.bulk()? {
            None => Ok(None),
            Some(raw) => std::str::from_utf8(&raw)
                .ok()
                .and_then(|s| s.parse::<f64>().ok())
                .map(Some)
                .ok_or(TrolError::UnexpectedReply {
                    command: command.to_string(),
                    reply,
                }),
        }
    }

    pub fn array(self) -> TrolResult<Vec<RespValue>> {
        match self.value {
            RespValue::Array(Some(items)) => Ok(items),
            RespValue::Array(None) => Ok(Vec::new()),
            _ => Err(self.unexpected()),
        }
    }

    /// An array whose elements are all non-null bulk strings.
    pub fn bulk_array(self) -> TrolResult<Vec<Vec<u8>>> {
        let command = self.command;
        let items = self.array()?;
        items
            .into_iter()
            .map(|item| match item {
                RespValue::BulkString(Some(data)) => Ok(data),
                other => Err(TrolError::UnexpectedReply {
                    command: command.to_string(),
                    reply: other,
                }),
            })
            .collect()
    }

    /// An array of bulk strings that may be null, e.g. `MGET` / `HMGET`.
    pub fn optional_bulk_array(self) -> TrolResult<Vec<Option<Vec<u8>>>> {
        let command = self.command;
        let items = self.array()?;
        items
            .into_iter()
            .map(|item| match item {
                RespValue::BulkString(data) => Ok(data),
                other => Err(TrolError::UnexpectedReply {
                    command: command.to_string(),
                    reply: other,
                }),
            })
            .collect()
    }

    /// A flat array of alternating elements, e.g. `HGETALL` or `WITHSCORES`.
    pub fn pairs(self) -> TrolResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let command = self.command;
        let flat = self.bulk_array()?;
        if flat.len() % 2 != 0 {
            return Err(TrolError::UnexpectedReply {
                command: command.to_string(),
                reply: RespValue::array(flat.into_iter().map(RespValue::bulk_string).collect()),
            });
        }
        let mut out = Vec::with_capacity(flat.len() / 2);
        let mut it = flat.into_iter();
        while let (Some(a), Some(b)) = (it.next(), it.next()) {
            out.push((a, b));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_to_resp() {
        let cmd = Command::new("SET")
            .arg("Brewery:frmt:name")
            .arg("Fremont Brewing Company");
        assert_eq!(cmd.first_key().as_deref(), Some("Brewery:frmt:name"));
        assert_eq!(
            cmd.to_resp().serialize(),
            b"*3\r\n$3\r\nSET\r\n$17\r\nBrewery:frmt:name\r\n$23\r\nFremont Brewing Company\r\n"
        );
    }

    #[test]
    fn test_numeric_args() {
        let cmd = Command::new("ZADD")
            .arg("k")
            .float_arg(f64::NEG_INFINITY)
            .float_arg(1.5)
            .int_arg(-3);
        assert_eq!(
            cmd.arguments(),
            &[b"k".to_vec(), b"-inf".to_vec(), b"1.5".to_vec(), b"-3".to_vec()]
        );
    }

    #[test]
    fn test_reply_decoders() {
        assert!(Reply::new("SET", RespValue::ok()).ok().is_ok());
        assert!(!Reply::new("SET", RespValue::null_bulk_string()).ok_or_null().unwrap());
        assert_eq!(Reply::new("SCARD", RespValue::integer(3)).count().unwrap(), 3);
        assert_eq!(
            Reply::new("ZRANK", RespValue::null_bulk_string())
                .optional_count()
                .unwrap(),
            None
        );
        assert_eq!(
            Reply::new("ZSCORE", RespValue::bulk_string("2.5")).float().unwrap(),
            Some(2.5)
        );
        assert_eq!(
            Reply::new("HGETALL", RespValue::array(vec![
                RespValue::bulk_string("a"),
                RespValue::bulk_string("1"),
            ]))
            .pairs()
            .unwrap(),
            vec![(b"a".to_vec(), b"1".to_vec())]
        );
    }

    #[test]
    fn test_reply_type_mismatch() {
        let err = Reply::new("GET", RespValue::integer(1)).bulk().unwrap_err();
        assert!(matches!(err, TrolError::UnexpectedReply { ref command, .. } if command == "GET"));
    }
}
