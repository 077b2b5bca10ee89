mod hash;
mod key;
mod list;
mod script;
mod set;
mod sorted_set;
mod string;

use super::store::Keyspace;
use super::types::Value;
use crate::command::Command;
use crate::resp::RespValue;

/// Execute one command against the keyspace, replying as Redis would.
pub fn dispatch(command: &Command, ks: &mut Keyspace) -> RespValue {
    let args = command.arguments();
    match command.name().to_ascii_uppercase().as_str() {
        // Connection
        "PING" => RespValue::simple_string("PONG"),
        "QUIT" => RespValue::ok(),

        // Keys
        "DEL" => key::cmd_del(args, ks),
        "EXISTS" => key::cmd_exists(args, ks),
        "PEXPIRE" => key::cmd_pexpire(args, ks),
        "PTTL" => key::cmd_pttl(args, ks),
        "TYPE" => key::cmd_type(args, ks),
        "KEYS" => key::cmd_keys(args, ks),

        // Strings
        "GET" => string::cmd_get(args, ks),
        "SET" => string::cmd_set(args, ks),
        "MGET" => string::cmd_mget(args, ks),
        "MSET" => string::cmd_mset(args, ks),

        // Sets
        "SADD" => set::cmd_sadd(args, ks),
        "SREM" => set::cmd_srem(args, ks),
        "SPOP" => set::cmd_spop(args, ks),
        "SRANDMEMBER" => set::cmd_srandmember(args, ks),
        "SISMEMBER" => set::cmd_sismember(args, ks),
        "SCARD" => set::cmd_scard(args, ks),
        "SMEMBERS" => set::cmd_smembers(args, ks),
        "SUNION" => set::cmd_combine(args, ks, set::Op::Union),
        "SINTER" => set::cmd_combine(args, ks, set::Op::Inter),
        "SDIFF" => set::cmd_combine(args, ks, set::Op::Diff),
        "SUNIONSTORE" => set::cmd_combine_store(args, ks, set::Op::Union),
        "SINTERSTORE" => set::cmd_combine_store(args, ks, set::Op::Inter),
        "SDIFFSTORE" => set::cmd_combine_store(args, ks, set::Op::Diff),
        "SINTERCARD" => set::cmd_sintercard(args, ks),

        // Sorted sets
        "ZADD" => sorted_set::cmd_zadd(args, ks),
        "ZREM" => sorted_set::cmd_zrem(args, ks),
        "ZINCRBY" => sorted_set::cmd_zincrby(args, ks),
        "ZSCORE" => sorted_set::cmd_zscore(args, ks),
        "ZRANK" => sorted_set::cmd_zrank(args, ks, false),
        "ZREVRANK" => sorted_set::cmd_zrank(args, ks, true),
        "ZCARD" => sorted_set::cmd_zcard(args, ks),
        "ZRANGE" => sorted_set::cmd_zrange(args, ks, false),
        "ZREVRANGE" => sorted_set::cmd_zrange(args, ks, true),
        "ZRANGEBYSCORE" => sorted_set::cmd_zrangebyscore(args, ks, false),
        "ZREVRANGEBYSCORE" => sorted_set::cmd_zrangebyscore(args, ks, true),
        "ZCOUNT" => sorted_set::cmd_zcount(args, ks),
        "ZREMRANGEBYRANK" => sorted_set::cmd_zremrangebyrank(args, ks),
        "ZREMRANGEBYSCORE" => sorted_set::cmd_zremrangebyscore(args, ks),

        // Lists
        "LPUSH" => list::cmd_push(args, ks, true),
        "RPUSH" => list::cmd_push(args, ks, false),
        "LPOP" => list::cmd_pop(args, ks, true),
        "RPOP" => list::cmd_pop(args, ks, false),
        "RPOPLPUSH" => list::cmd_rpoplpush(args, ks),
        "LLEN" => list::cmd_llen(args, ks),
        "LRANGE" => list::cmd_lrange(args, ks),
        "LINDEX" => list::cmd_lindex(args, ks),
        "LSET" => list::cmd_lset(args, ks),
        "LREM" => list::cmd_lrem(args, ks),
        "LTRIM" => list::cmd_ltrim(args, ks),

        // Hashes
        "HSET" => hash::cmd_hset(args, ks),
        "HGET" => hash::cmd_hget(args, ks),
        "HMGET" => hash::cmd_hmget(args, ks),
        "HDEL" => hash::cmd_hdel(args, ks),
        "HEXISTS" => hash::cmd_hexists(args, ks),
        "HLEN" => hash::cmd_hlen(args, ks),
        "HKEYS" => hash::cmd_hkeys(args, ks),
        "HVALS" => hash::cmd_hvals(args, ks),
        "HGETALL" => hash::cmd_hgetall(args, ks),
        "HINCRBY" => hash::cmd_hincrby(args, ks),

        // Scripting
        "EVAL" => script::cmd_eval(args, ks),
        "EVALSHA" => script::cmd_evalsha(args, ks),

        other => RespValue::error(format!("ERR unknown command '{}'", other.to_lowercase())),
    }
}

pub(super) fn arg_to_string(arg: &[u8]) -> String {
    String::from_utf8_lossy(arg).into_owned()
}

pub(super) fn arg_to_i64(arg: &[u8]) -> Option<i64> {
    std::str::from_utf8(arg).ok()?.parse().ok()
}

pub(super) fn arg_to_f64(arg: &[u8]) -> Option<f64> {
    let text = std::str::from_utf8(arg).ok()?;
    let value = match text {
        "+inf" | "inf" => f64::INFINITY,
        "-inf" => f64::NEG_INFINITY,
        _ => text.parse().ok()?,
    };
    (!value.is_nan()).then_some(value)
}

pub(super) fn wrong_type_error() -> RespValue {
    RespValue::error("WRONGTYPE Operation against a key holding the wrong kind of value")
}

pub(super) fn wrong_arg_count(cmd: &str) -> RespValue {
    RespValue::error(format!("ERR wrong number of arguments for '{cmd}' command"))
}

pub(super) fn not_an_integer() -> RespValue {
    RespValue::error("ERR value is not an integer or out of range")
}

pub(super) fn not_a_float() -> RespValue {
    RespValue::error("ERR value is not a valid float")
}

pub(super) fn format_score(score: f64) -> RespValue {
    RespValue::bulk_string(crate::command::format_float(score))
}

/// Borrow the value at `key` if it has the type `pick` selects.
/// `Ok(None)` for a missing key.
pub(super) fn lookup<'a, T>(
    ks: &'a mut Keyspace,
    key: &[u8],
    pick: fn(&Value) -> Option<&T>,
) -> Result<Option<&'a T>, RespValue> {
    match ks.get(&arg_to_string(key)) {
        None => Ok(None),
        Some(entry) => pick(&entry.value).map(Some).ok_or_else(wrong_type_error),
    }
}

/// Mutably borrow the value at `key`, creating it with `make` if absent.
pub(super) fn lookup_or_create<'a, T>(
    ks: &'a mut Keyspace,
    key: &[u8],
    make: fn() -> Value,
    pick: fn(&mut Value) -> Option<&mut T>,
) -> Result<&'a mut T, RespValue> {
    pick(ks.get_or_insert(&arg_to_string(key), make)).ok_or_else(wrong_type_error)
}

/// Mutably borrow an existing value at `key`. `Ok(None)` for a missing key.
pub(super) fn lookup_mut<'a, T>(
    ks: &'a mut Keyspace,
    key: &[u8],
    pick: fn(&mut Value) -> Option<&mut T>,
) -> Result<Option<&'a mut T>, RespValue> {
    match ks.get_mut(&arg_to_string(key)) {
        None => Ok(None),
        Some(entry) => pick(&mut entry.value).map(Some).ok_or_else(wrong_type_error),
    }
}
