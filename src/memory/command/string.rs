use super::{arg_to_i64, arg_to_string, not_an_integer, wrong_arg_count, wrong_type_error};
use crate::memory::store::{Entry, Keyspace};
use crate::memory::types::Value;
use crate::resp::RespValue;
use std::time::Duration;
use tokio::time::Instant;

pub fn cmd_get(args: &[Vec<u8>], ks: &mut Keyspace) -> RespValue {
    if args.len() != 1 {
        return wrong_arg_count("get");
    }
    match ks.get(&arg_to_string(&args[0])) {
        None => RespValue::null_bulk_string(),
        Some(entry) => match entry.value.as_str() {
            Some(data) => RespValue::bulk_string(data.clone()),
            None => wrong_type_error(),
        },
    }
}

/// SET key value [NX | XX] [EX seconds | PX milliseconds]
pub fn cmd_set(args: &[Vec<u8>], ks: &mut Keyspace) -> RespValue {
    if args.len() < 2 {
        return wrong_arg_count("set");
    }
    let key = arg_to_string(&args[0]);
    let value = args[1].clone();

    let mut nx = false;
    let mut xx = false;
    let mut ttl: Option<Duration> = None;
    let mut i = 2;
    while i < args.len() {
        let opt = arg_to_string(&args[i]).to_ascii_uppercase();
        match opt.as_str() {
            "NX" => nx = true,
            "XX" => xx = true,
            "EX" | "PX" => {
                let amount = match args.get(i + 1).and_then(|a| arg_to_i64(a)) {
                    Some(n) if n > 0 => n as u64,
                    Some(_) => {
                        return RespValue::error("ERR invalid expire time in 'set' command");
                    }
                    None => return not_an_integer(),
                };
                ttl = Some(if opt == "EX" {
                    Duration::from_secs(amount)
                } else {
                    Duration::from_millis(amount)
                });
                i += 1;
            }
            _ => return RespValue::error("ERR syntax error"),
        }
        i += 1;
    }
    if nx && xx {
        return RespValue::error("ERR syntax error");
    }

    let exists = ks.exists(&key);
    if (nx && exists) || (xx && !exists) {
        return RespValue::null_bulk_string();
    }

    ks.set_entry(
        &key,
        Entry {
            value: Value::Str(value),
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        },
    );
    RespValue::ok()
}

pub fn cmd_mget(args: &[Vec<u8>], ks: &mut Keyspace) -> RespValue {
    if args.is_empty() {
        return wrong_arg_count("mget");
    }
    let values = args
        .iter()
        .map(|key| match ks.get(&arg_to_string(key)) {
            Some(entry) => match entry.value.as_str() {
                Some(data) => RespValue::bulk_string(data.clone()),
                None => RespValue::null_bulk_string(),
            },
            None => RespValue::null_bulk_string(),
        })
        .collect();
    RespValue::array(values)
}

pub fn cmd_mset(args: &[Vec<u8>], ks: &mut Keyspace) -> RespValue {
    if args.is_empty() || args.len() % 2 != 0 {
        return wrong_arg_count("mset");
    }
    for pair in args.chunks(2) {
        ks.set(&arg_to_string(&pair[0]), Value::Str(pair[1].clone()));
    }
    RespValue::ok()
}
