use super::{
    arg_to_i64, arg_to_string, lookup, lookup_mut, lookup_or_create, not_an_integer,
    wrong_arg_count,
};
use crate::memory::store::Keyspace;
use crate::memory::types::Value;
use crate::resp::RespValue;
use rand::seq::IteratorRandom;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy)]
pub enum Op {
    Union,
    Inter,
    Diff,
}

fn members(items: impl IntoIterator<Item = Vec<u8>>) -> RespValue {
    RespValue::array(items.into_iter().map(RespValue::bulk_string).collect())
}

pub fn cmd_sadd(args: &[Vec<u8>], ks: &mut Keyspace) -> RespValue {
    if args.len() < 2 {
        return wrong_arg_count("sadd");
    }
    let set = match lookup_or_create(ks, &args[0], Value::empty_set, Value::as_set_mut) {
        Ok(s) => s,
        Err(e) => return e,
    };
    let added = args[1..]
        .iter()
        .filter(|m| set.insert(m.to_vec()))
        .count();
    RespValue::integer(added as i64)
}

pub fn cmd_srem(args: &[Vec<u8>], ks: &mut Keyspace) -> RespValue {
    if args.len() < 2 {
        return wrong_arg_count("srem");
    }
    let removed = match lookup_mut(ks, &args[0], Value::as_set_mut) {
        Ok(Some(set)) => args[1..].iter().filter(|m| set.remove(m.as_slice())).count(),
        Ok(None) => 0,
        Err(e) => return e,
    };
    ks.prune(&arg_to_string(&args[0]));
    RespValue::integer(removed as i64)
}

pub fn cmd_spop(args: &[Vec<u8>], ks: &mut Keyspace) -> RespValue {
    if args.len() != 1 {
        return wrong_arg_count("spop");
    }
    let popped = match lookup_mut(ks, &args[0], Value::as_set_mut) {
        Ok(Some(set)) => {
            let choice = set.iter().choose(&mut rand::thread_rng()).cloned();
            if let Some(member) = &choice {
                set.remove(member);
            }
            choice
        }
        Ok(None) => None,
        Err(e) => return e,
    };
    ks.prune(&arg_to_string(&args[0]));
    popped.map_or_else(RespValue::null_bulk_string, RespValue::bulk_string)
}

pub fn cmd_srandmember(args: &[Vec<u8>], ks: &mut Keyspace) -> RespValue {
    if args.len() != 1 {
        return wrong_arg_count("srandmember");
    }
    match lookup(ks, &args[0], Value::as_set) {
        Ok(Some(set)) => match set.iter().choose(&mut rand::thread_rng()) {
            Some(member) => RespValue::bulk_string(member.clone()),
            None => RespValue::null_bulk_string(),
        },
        Ok(None) => RespValue::null_bulk_string(),
        Err(e) => e,
    }
}

pub fn cmd_sismember(args: &[Vec<u8>], ks: &mut Keyspace) -> RespValue {
    if args.len() != 2 {
        return wrong_arg_count("sismember");
    }
    match lookup(ks, &args[0], Value::as_set) {
        Ok(set) => RespValue::integer(set.is_some_and(|s| s.contains(&args[1])) as i64),
        Err(e) => e,
    }
}

pub fn cmd_scard(args: &[Vec<u8>], ks: &mut Keyspace) -> RespValue {
    if args.len() != 1 {
        return wrong_arg_count("scard");
    }
    match lookup(ks, &args[0], Value::as_set) {
        Ok(set) => RespValue::integer(set.map_or(0, |s| s.len()) as i64),
        Err(e) => e,
    }
}

pub fn cmd_smembers(args: &[Vec<u8>], ks: &mut Keyspace) -> RespValue {
    if args.len() != 1 {
        return wrong_arg_count("smembers");
    }
    match lookup(ks, &args[0], Value::as_set) {
        Ok(set) => members(set.into_iter().flatten().cloned()),
        Err(e) => e,
    }
}

/// Fold the sets at `keys` with `op`. Missing keys count as empty sets.
fn combine(keys: &[Vec<u8>], ks: &mut Keyspace, op: Op) -> Result<BTreeSet<Vec<u8>>, RespValue> {
    let mut result: Option<BTreeSet<Vec<u8>>> = None;
    for key in keys {
        let next = lookup(ks, key, Value::as_set)?.cloned().unwrap_or_default();
        result = Some(match result {
            None => next,
            Some(acc) => match op {
                Op::Union => acc.union(&next).cloned().collect(),
                Op::Inter => acc.intersection(&next).cloned().collect(),
                Op::Diff => acc.difference(&next).cloned().collect(),
            },
        });
    }
    Ok(result.unwrap_or_default())
}

pub fn cmd_combine(args: &[Vec<u8>], ks: &mut Keyspace, op: Op) -> RespValue {
    if args.is_empty() {
        return wrong_arg_count("sunion");
    }
    match combine(args, ks, op) {
        Ok(set) => members(set),
        Err(e) => e,
    }
}

pub fn cmd_combine_store(args: &[Vec<u8>], ks: &mut Keyspace, op: Op) -> RespValue {
    if args.len() < 2 {
        return wrong_arg_count("sunionstore");
    }
    let set = match combine(&args[1..], ks, op) {
        Ok(set) => set,
        Err(e) => return e,
    };
    let dest = arg_to_string(&args[0]);
    let len = set.len();
    if set.is_empty() {
        ks.del(&dest);
    } else {
        ks.set(&dest, Value::Set(set));
    }
    RespValue::integer(len as i64)
}

/// SINTERCARD numkeys key [key ...] [LIMIT limit]
pub fn cmd_sintercard(args: &[Vec<u8>], ks: &mut Keyspace) -> RespValue {
    let numkeys = match args.first().and_then(|a| arg_to_i64(a)) {
        Some(n) if n > 0 => n as usize,
        Some(_) => return RespValue::error("ERR numkeys should be greater than 0"),
        None => return not_an_integer(),
    };
    if args.len() < 1 + numkeys {
        return wrong_arg_count("sintercard");
    }
    let mut limit = usize::MAX;
    let rest = &args[1 + numkeys..];
    match rest {
        [] => {}
        [opt, n] if arg_to_string(opt).eq_ignore_ascii_case("LIMIT") => match arg_to_i64(n) {
            Some(0) => {}
            Some(n) if n > 0 => limit = n as usize,
            _ => return RespValue::error("ERR LIMIT can't be negative"),
        },
        _ => return RespValue::error("ERR syntax error"),
    }
    match combine(&args[1..1 + numkeys], ks, Op::Inter) {
        Ok(set) => RespValue::integer(set.len().min(limit) as i64),
        Err(e) => e,
    }
}
