use super::{
    arg_to_i64, arg_to_string, lookup, lookup_mut, lookup_or_create, not_an_integer,
    wrong_arg_count,
};
use crate::memory::store::Keyspace;
use crate::memory::types::Value;
use crate::resp::RespValue;

fn bulk_array<'a>(items: impl Iterator<Item = &'a Vec<u8>>) -> RespValue {
    RespValue::array(items.map(|v| RespValue::bulk_string(v.clone())).collect())
}

/// HSET key field value [field value ...]
pub fn cmd_hset(args: &[Vec<u8>], ks: &mut Keyspace) -> RespValue {
    if args.len() < 3 || (args.len() - 1) % 2 != 0 {
        return wrong_arg_count("hset");
    }
    let hash = match lookup_or_create(ks, &args[0], Value::empty_hash, Value::as_hash_mut) {
        Ok(h) => h,
        Err(e) => return e,
    };
    let added = args[1..]
        .chunks(2)
        .filter(|pair| hash.insert(pair[0].clone(), pair[1].clone()).is_none())
        .count();
    RespValue::integer(added as i64)
}

pub fn cmd_hget(args: &[Vec<u8>], ks: &mut Keyspace) -> RespValue {
    if args.len() != 2 {
        return wrong_arg_count("hget");
    }
    match lookup(ks, &args[0], Value::as_hash) {
        Ok(hash) => hash
            .and_then(|h| h.get(&args[1]))
            .map_or_else(RespValue::null_bulk_string, |v| RespValue::bulk_string(v.clone())),
        Err(e) => e,
    }
}

pub fn cmd_hmget(args: &[Vec<u8>], ks: &mut Keyspace) -> RespValue {
    if args.len() < 2 {
        return wrong_arg_count("hmget");
    }
    match lookup(ks, &args[0], Value::as_hash) {
        Ok(hash) => RespValue::array(
            args[1..]
                .iter()
                .map(|field| {
                    hash.and_then(|h| h.get(field))
                        .map_or_else(RespValue::null_bulk_string, |v| {
                            RespValue::bulk_string(v.clone())
                        })
                })
                .collect(),
        ),
        Err(e) => e,
    }
}

pub fn cmd_hdel(args: &[Vec<u8>], ks: &mut Keyspace) -> RespValue {
    if args.len() < 2 {
        return wrong_arg_count("hdel");
    }
    let removed = match lookup_mut(ks, &args[0], Value::as_hash_mut) {
        Ok(Some(hash)) => args[1..]
            .iter()
            .filter(|field| hash.remove(*field).is_some())
            .count(),
        Ok(None) => 0,
        Err(e) => return e,
    };
    ks.prune(&arg_to_string(&args[0]));
    RespValue::integer(removed as i64)
}

pub fn cmd_hexists(args: &[Vec<u8>], ks: &mut Keyspace) -> RespValue {
    if args.len() != 2 {
        return wrong_arg_count("hexists");
    }
    match lookup(ks, &args[0], Value::as_hash) {
        Ok(hash) => RespValue::integer(hash.is_some_and(|h| h.contains_key(&args[1])) as i64),
        Err(e) => e,
    }
}

pub fn cmd_hlen(args: &[Vec<u8>], ks: &mut Keyspace) -> RespValue {
    if args.len() != 1 {
        return wrong_arg_count("hlen");
    }
    match lookup(ks, &args[0], Value::as_hash) {
        Ok(hash) => RespValue::integer(hash.map_or(0, |h| h.len()) as i64),
        Err(e) => e,
    }
}

pub fn cmd_hkeys(args: &[Vec<u8>], ks: &mut Keyspace) -> RespValue {
    if args.len() != 1 {
        return wrong_arg_count("hkeys");
    }
    match lookup(ks, &args[0], Value::as_hash) {
        Ok(hash) => bulk_array(hash.into_iter().flat_map(|h| h.keys())),
        Err(e) => e,
    }
}

pub fn cmd_hvals(args: &[Vec<u8>], ks: &mut Keyspace) -> RespValue {
    if args.len() != 1 {
        return wrong_arg_count("hvals");
    }
    match lookup(ks, &args[0], Value::as_hash) {
        Ok(hash) => bulk_array(hash.into_iter().flat_map(|h| h.values())),
        Err(e) => e,
    }
}

pub fn cmd_hgetall(args: &[Vec<u8>], ks: &mut Keyspace) -> RespValue {
    if args.len() != 1 {
        return wrong_arg_count("hgetall");
    }
    match lookup(ks, &args[0], Value::as_hash) {
        Ok(hash) => bulk_array(
            hash.into_iter()
                .flat_map(|h| h.iter())
                .flat_map(|(k, v)| [k, v]),
        ),
        Err(e) => e,
    }
}

pub fn cmd_hincrby(args: &[Vec<u8>], ks: &mut Keyspace) -> RespValue {
    if args.len() != 3 {
        return wrong_arg_count("hincrby");
    }
    let delta = match arg_to_i64(&args[2]) {
        Some(d) => d,
        None => return not_an_integer(),
    };
    let hash = match lookup_or_create(ks, &args[0], Value::empty_hash, Value::as_hash_mut) {
        Ok(h) => h,
        Err(e) => return e,
    };
    let current = match hash.get(&args[1]) {
        None => 0,
        Some(raw) => match arg_to_i64(raw) {
            Some(n) => n,
            None => return RespValue::error("ERR hash value is not an integer"),
        },
    };
    match current.checked_add(delta) {
        Some(next) => {
            hash.insert(args[1].clone(), next.to_string().into_bytes());
            RespValue::integer(next)
        }
        None => RespValue::error("ERR increment or decrement would overflow"),
    }
}
