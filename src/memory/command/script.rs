//! EVAL / EVALSHA for the scripts this crate ships.
//!
//! There is no Lua interpreter here: a script is recognised by its SHA1 and
//! executed natively.

use super::{arg_to_i64, arg_to_string, not_an_integer, wrong_arg_count};
use crate::memory::store::Keyspace;
use crate::resp::RespValue;
use crate::script::{COMPARE_AND_DELETE, COMPARE_AND_PEXPIRE, sha1_hex};
use std::time::Duration;

/// EVAL script numkeys key [key ...] arg [arg ...]
pub fn cmd_eval(args: &[Vec<u8>], ks: &mut Keyspace) -> RespValue {
    if args.len() < 2 {
        return wrong_arg_count("eval");
    }
    let sha = sha1_hex(&arg_to_string(&args[0]));
    run(&sha, &args[1..], ks)
}

/// EVALSHA sha1 numkeys key [key ...] arg [arg ...]
pub fn cmd_evalsha(args: &[Vec<u8>], ks: &mut Keyspace) -> RespValue {
    if args.len() < 2 {
        return wrong_arg_count("evalsha");
    }
    let sha = arg_to_string(&args[0]).to_ascii_lowercase();
    run(&sha, &args[1..], ks)
}

fn run(sha: &str, rest: &[Vec<u8>], ks: &mut Keyspace) -> RespValue {
    let numkeys = match arg_to_i64(&rest[0]) {
        Some(n) if n >= 0 => n as usize,
        _ => return not_an_integer(),
    };
    if rest.len() < 1 + numkeys {
        return RespValue::error("ERR Number of keys can't be greater than number of args");
    }
    let keys = &rest[1..1 + numkeys];
    let argv = &rest[1 + numkeys..];

    if sha == COMPARE_AND_DELETE.sha1() {
        compare_and_delete(keys, argv, ks)
    } else if sha == COMPARE_AND_PEXPIRE.sha1() {
        compare_and_pexpire(keys, argv, ks)
    } else {
        RespValue::error("NOSCRIPT No matching script. Please use EVAL.")
    }
}

/// Whether `key` holds exactly `expected` as a string.
fn holds(ks: &mut Keyspace, key: &[u8], expected: &[u8]) -> bool {
    ks.get(&arg_to_string(key))
        .and_then(|entry| entry.value.as_str())
        .is_some_and(|current| current.as_slice() == expected)
}

fn compare_and_delete(keys: &[Vec<u8>], argv: &[Vec<u8>], ks: &mut Keyspace) -> RespValue {
    let (Some(key), Some(token)) = (keys.first(), argv.first()) else {
        return RespValue::error("ERR script expects one key and one argument");
    };
    if !holds(ks, key, token) {
        return RespValue::integer(0);
    }
    RespValue::integer(ks.del(&arg_to_string(key)) as i64)
}

fn compare_and_pexpire(keys: &[Vec<u8>], argv: &[Vec<u8>], ks: &mut Keyspace) -> RespValue {
    let (Some(key), [token, ms, ..]) = (keys.first(), argv) else {
        return RespValue::error("ERR script expects one key and two arguments");
    };
    let ms = match arg_to_i64(ms) {
        Some(ms) if ms > 0 => ms as u64,
        _ => return not_an_integer(),
    };
    if !holds(ks, key, token) {
        return RespValue::integer(0);
    }
    RespValue::integer(ks.expire_in(&arg_to_string(key), Duration::from_millis(ms)) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::types::Value;

    fn args(items: &[&str]) -> Vec<Vec<u8>> {
        items.iter().map(|s| s.as_bytes().to_vec()).collect()
    }

    #[test]
    fn test_compare_and_delete() {
        let mut ks = Keyspace::default();
        ks.set("lock", Value::Str(b"mine".to_vec()));

        let theirs = args(&[COMPARE_AND_DELETE.body(), "1", "lock", "theirs"]);
        assert_eq!(cmd_eval(&theirs, &mut ks), RespValue::integer(0));
        assert!(ks.exists("lock"));

        let mine = args(&[COMPARE_AND_DELETE.body(), "1", "lock", "mine"]);
        assert_eq!(cmd_eval(&mine, &mut ks), RespValue::integer(1));
        assert!(!ks.exists("lock"));
    }

    #[test]
    fn test_evalsha_and_unknown_script() {
        let mut ks = Keyspace::default();
        ks.set("lock", Value::Str(b"mine".to_vec()));

        let sha = COMPARE_AND_PEXPIRE.sha1();
        let extend = args(&[&sha, "1", "lock", "mine", "5000"]);
        assert_eq!(cmd_evalsha(&extend, &mut ks), RespValue::integer(1));
        assert!(ks.pttl("lock") > 0);

        let unknown = args(&["return 1", "0"]);
        assert!(matches!(
            cmd_eval(&unknown, &mut ks),
            RespValue::Error(e) if e.starts_with("NOSCRIPT")
        ));
    }
}
