//! Server-side Lua scripts.

use crate::command::Command;

/// A Lua script run with `EVAL`, identified by the SHA1 of its body.
#[derive(Debug)]
pub struct Script {
    body: &'static str,
}

impl Script {
    pub const fn new(body: &'static str) -> Self {
        Script { body }
    }

    pub fn body(&self) -> &'static str {
        self.body
    }

    /// Hex SHA1 digest, as used by `EVALSHA` and `SCRIPT EXISTS`.
    pub fn sha1(&self) -> String {
        sha1_hex(self.body)
    }

    /// `EVAL body numkeys keys… args…`.
    pub fn eval<K, A>(&self, keys: &[K], args: &[A]) -> Command
    where
        K: AsRef<[u8]>,
        A: AsRef<[u8]>,
    {
        Command::new("EVAL")
            .arg(self.body)
            .arg(keys.len().to_string())
            .args(keys.iter().map(|k| k.as_ref().to_vec()))
            .args(args.iter().map(|a| a.as_ref().to_vec()))
    }
}

pub fn sha1_hex(body: &str) -> String {
    sha1_smol::Sha1::from(body).digest().to_string()
}

/// Delete `KEYS[1]` only if it still holds `ARGV[1]`. Returns 1 on delete.
pub(crate) static COMPARE_AND_DELETE: Script = Script::new(
    r#"if redis.call("get", KEYS[1]) == ARGV[1] then
    return redis.call("del", KEYS[1])
else
    return 0
end"#,
);

/// Set a `ARGV[2]` millisecond expiry on `KEYS[1]` only if it still holds
/// `ARGV[1]`. Returns 1 when the expiry was set.
pub(crate) static COMPARE_AND_PEXPIRE: Script = Script::new(
    r#"if redis.call("get", KEYS[1]) == ARGV[1] then
    return redis.call("pexpire", KEYS[1], ARGV[2])
else
    return 0
end"#,
);
