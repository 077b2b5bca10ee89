use super::{arg_to_i64, arg_to_string, not_an_integer, wrong_arg_count};
use crate::memory::store::Keyspace;
use crate::resp::RespValue;
use std::time::Duration;

pub fn cmd_del(args: &[Vec<u8>], ks: &mut Keyspace) -> RespValue {
    if args.is_empty() {
        return wrong_arg_count("del");
    }
    let removed = args.iter().filter(|k| ks.del(&arg_to_string(k))).count();
    RespValue::integer(removed as i64)
}

/// Counts duplicates once per mention, as Redis does.
pub fn cmd_exists(args: &[Vec<u8>], ks: &mut Keyspace) -> RespValue {
    if args.is_empty() {
        return wrong_arg_count("exists");
    }
    let found = args.iter().filter(|k| ks.exists(&arg_to_string(k))).count();
    RespValue::integer(found as i64)
}

pub fn cmd_pexpire(args: &[Vec<u8>], ks: &mut Keyspace) -> RespValue {
    if args.len() != 2 {
        return wrong_arg_count("pexpire");
    }
    let key = arg_to_string(&args[0]);
    let ms = match arg_to_i64(&args[1]) {
        Some(ms) => ms,
        None => return not_an_integer(),
    };
    if ms <= 0 {
        return RespValue::integer(ks.del(&key) as i64);
    }
    RespValue::integer(ks.expire_in(&key, Duration::from_millis(ms as u64)) as i64)
}

pub fn cmd_pttl(args: &[Vec<u8>], ks: &mut Keyspace) -> RespValue {
    if args.len() != 1 {
        return wrong_arg_count("pttl");
    }
    RespValue::integer(ks.pttl(&arg_to_string(&args[0])))
}

pub fn cmd_type(args: &[Vec<u8>], ks: &mut Keyspace) -> RespValue {
    if args.len() != 1 {
        return wrong_arg_count("type");
    }
    let name = ks
        .get(&arg_to_string(&args[0]))
        .map_or("none", |entry| entry.value.type_name());
    RespValue::simple_string(name)
}

pub fn cmd_keys(args: &[Vec<u8>], ks: &mut Keyspace) -> RespValue {
    if args.len() != 1 {
        return wrong_arg_count("keys");
    }
    let keys = ks.keys(&arg_to_string(&args[0]));
    RespValue::array(keys.into_iter().map(RespValue::bulk_string).collect())
}
