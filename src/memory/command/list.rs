use super::{
    arg_to_i64, arg_to_string, lookup, lookup_mut, lookup_or_create, not_an_integer,
    wrong_arg_count,
};
use crate::memory::store::Keyspace;
use crate::memory::types::{Value, clamp_range};
use crate::resp::RespValue;

/// LPUSH / RPUSH key element [element ...]
pub fn cmd_push(args: &[Vec<u8>], ks: &mut Keyspace, front: bool) -> RespValue {
    if args.len() < 2 {
        return wrong_arg_count(if front { "lpush" } else { "rpush" });
    }
    let list = match lookup_or_create(ks, &args[0], Value::empty_list, Value::as_list_mut) {
        Ok(l) => l,
        Err(e) => return e,
    };
    for value in &args[1..] {
        if front {
            list.push_front(value.clone());
        } else {
            list.push_back(value.clone());
        }
    }
    RespValue::integer(list.len() as i64)
}

pub fn cmd_pop(args: &[Vec<u8>], ks: &mut Keyspace, front: bool) -> RespValue {
    if args.len() != 1 {
        return wrong_arg_count(if front { "lpop" } else { "rpop" });
    }
    let popped = match lookup_mut(ks, &args[0], Value::as_list_mut) {
        Ok(Some(list)) => {
            if front {
                list.pop_front()
            } else {
                list.pop_back()
            }
        }
        Ok(None) => None,
        Err(e) => return e,
    };
    ks.prune(&arg_to_string(&args[0]));
    popped.map_or_else(RespValue::null_bulk_string, RespValue::bulk_string)
}

/// RPOPLPUSH source destination
pub fn cmd_rpoplpush(args: &[Vec<u8>], ks: &mut Keyspace) -> RespValue {
    if args.len() != 2 {
        return wrong_arg_count("rpoplpush");
    }
    // Check the destination type first so a WRONGTYPE leaves the source intact.
    if let Err(e) = lookup(ks, &args[1], Value::as_list) {
        return e;
    }
    let popped = match lookup_mut(ks, &args[0], Value::as_list_mut) {
        Ok(Some(list)) => list.pop_back(),
        Ok(None) => None,
        Err(e) => return e,
    };
    ks.prune(&arg_to_string(&args[0]));
    let Some(value) = popped else {
        return RespValue::null_bulk_string();
    };
    match lookup_or_create(ks, &args[1], Value::empty_list, Value::as_list_mut) {
        Ok(dest) => dest.push_front(value.clone()),
        Err(e) => return e,
    }
    RespValue::bulk_string(value)
}

pub fn cmd_llen(args: &[Vec<u8>], ks: &mut Keyspace) -> RespValue {
    if args.len() != 1 {
        return wrong_arg_count("llen");
    }
    match lookup(ks, &args[0], Value::as_list) {
        Ok(list) => RespValue::integer(list.map_or(0, |l| l.len()) as i64),
        Err(e) => e,
    }
}

pub fn cmd_lrange(args: &[Vec<u8>], ks: &mut Keyspace) -> RespValue {
    if args.len() != 3 {
        return wrong_arg_count("lrange");
    }
    let (start, stop) = match (arg_to_i64(&args[1]), arg_to_i64(&args[2])) {
        (Some(start), Some(stop)) => (start, stop),
        _ => return not_an_integer(),
    };
    match lookup(ks, &args[0], Value::as_list) {
        Ok(Some(list)) => match clamp_range(start, stop, list.len()) {
            Some((start, stop)) => RespValue::array(
                list.range(start..=stop)
                    .map(|v| RespValue::bulk_string(v.clone()))
                    .collect(),
            ),
            None => RespValue::array(vec![]),
        },
        Ok(None) => RespValue::array(vec![]),
        Err(e) => e,
    }
}

fn resolve_index(index: i64, len: usize) -> Option<usize> {
    let idx = if index < 0 { len as i64 + index } else { index };
    (0..len as i64).contains(&idx).then_some(idx as usize)
}

pub fn cmd_lindex(args: &[Vec<u8>], ks: &mut Keyspace) -> RespValue {
    if args.len() != 2 {
        return wrong_arg_count("lindex");
    }
    let index = match arg_to_i64(&args[1]) {
        Some(i) => i,
        None => return not_an_integer(),
    };
    match lookup(ks, &args[0], Value::as_list) {
        Ok(list) => list
            .and_then(|l| l.get(resolve_index(index, l.len())?))
            .map_or_else(RespValue::null_bulk_string, |v| RespValue::bulk_string(v.clone())),
        Err(e) => e,
    }
}

pub fn cmd_lset(args: &[Vec<u8>], ks: &mut Keyspace) -> RespValue {
    if args.len() != 3 {
        return wrong_arg_count("lset");
    }
    let index = match arg_to_i64(&args[1]) {
        Some(i) => i,
        None => return not_an_integer(),
    };
    match lookup_mut(ks, &args[0], Value::as_list_mut) {
        Ok(Some(list)) => match resolve_index(index, list.len()) {
            Some(idx) => {
                list[idx] = args[2].clone();
                RespValue::ok()
            }
            None => RespValue::error("ERR index out of range"),
        },
        Ok(None) => RespValue::error("ERR no such key"),
        Err(e) => e,
    }
}

/// LREM key count element
pub fn cmd_lrem(args: &[Vec<u8>], ks: &mut Keyspace) -> RespValue {
    if args.len() != 3 {
        return wrong_arg_count("lrem");
    }
    let count = match arg_to_i64(&args[1]) {
        Some(c) => c,
        None => return not_an_integer(),
    };
    let target = &args[2];
    let removed = match lookup_mut(ks, &args[0], Value::as_list_mut) {
        Ok(Some(list)) => {
            let limit = if count == 0 { usize::MAX } else { count.unsigned_abs() as usize };
            let positions: Vec<usize> = if count < 0 {
                (0..list.len()).rev().filter(|&i| list[i] == *target).take(limit).collect()
            } else {
                (0..list.len()).filter(|&i| list[i] == *target).take(limit).collect()
            };
            let mut positions = positions;
            positions.sort_unstable_by(|a, b| b.cmp(a));
            for i in &positions {
                list.remove(*i);
            }
            positions.len()
        }
        Ok(None) => 0,
        Err(e) => return e,
    };
    ks.prune(&arg_to_string(&args[0]));
    RespValue::integer(removed as i64)
}

pub fn cmd_ltrim(args: &[Vec<u8>], ks: &mut Keyspace) -> RespValue {
    if args.len() != 3 {
        return wrong_arg_count("ltrim");
    }
    let (start, stop) = match (arg_to_i64(&args[1]), arg_to_i64(&args[2])) {
        (Some(start), Some(stop)) => (start, stop),
        _ => return not_an_integer(),
    };
    match lookup_mut(ks, &args[0], Value::as_list_mut) {
        Ok(Some(list)) => match clamp_range(start, stop, list.len()) {
            Some((start, stop)) => {
                list.truncate(stop + 1);
                list.drain(..start);
            }
            None => list.clear(),
        },
        Ok(None) => {}
        Err(e) => return e,
    }
    ks.prune(&arg_to_string(&args[0]));
    RespValue::ok()
}
