use super::{
    arg_to_f64, arg_to_i64, arg_to_string, format_score, lookup, lookup_mut, lookup_or_create,
    not_a_float, not_an_integer, wrong_arg_count,
};
use crate::memory::store::Keyspace;
use crate::memory::types::{Bound, Value, ZSet, clamp_range};
use crate::resp::RespValue;

fn format_range(items: Vec<(Vec<u8>, f64)>, withscores: bool) -> RespValue {
    let mut out = Vec::with_capacity(items.len() * if withscores { 2 } else { 1 });
    for (member, score) in items {
        out.push(RespValue::bulk_string(member));
        if withscores {
            out.push(format_score(score));
        }
    }
    RespValue::array(out)
}

fn parse_bounds(min: &[u8], max: &[u8]) -> Result<(Bound, Bound), RespValue> {
    match (Bound::parse(min), Bound::parse(max)) {
        (Some(min), Some(max)) => Ok((min, max)),
        _ => Err(RespValue::error("ERR min or max is not a float")),
    }
}

/// ZADD key score member [score member ...]
pub fn cmd_zadd(args: &[Vec<u8>], ks: &mut Keyspace) -> RespValue {
    if args.len() < 3 || (args.len() - 1) % 2 != 0 {
        return wrong_arg_count("zadd");
    }
    let mut pairs = Vec::with_capacity((args.len() - 1) / 2);
    for pair in args[1..].chunks(2) {
        match arg_to_f64(&pair[0]) {
            Some(score) => pairs.push((score, pair[1].clone())),
            None => return not_a_float(),
        }
    }
    let zset = match lookup_or_create(ks, &args[0], Value::empty_zset, Value::as_zset_mut) {
        Ok(z) => z,
        Err(e) => return e,
    };
    let added = pairs
        .into_iter()
        .filter(|(score, member)| zset.insert(member.clone(), *score))
        .count();
    RespValue::integer(added as i64)
}

pub fn cmd_zrem(args: &[Vec<u8>], ks: &mut Keyspace) -> RespValue {
    if args.len() < 2 {
        return wrong_arg_count("zrem");
    }
    let removed = match lookup_mut(ks, &args[0], Value::as_zset_mut) {
        Ok(Some(zset)) => args[1..].iter().filter(|m| zset.remove(m)).count(),
        Ok(None) => 0,
        Err(e) => return e,
    };
    ks.prune(&arg_to_string(&args[0]));
    RespValue::integer(removed as i64)
}

pub fn cmd_zincrby(args: &[Vec<u8>], ks: &mut Keyspace) -> RespValue {
    if args.len() != 3 {
        return wrong_arg_count("zincrby");
    }
    let delta = match arg_to_f64(&args[1]) {
        Some(d) => d,
        None => return not_a_float(),
    };
    let zset = match lookup_or_create(ks, &args[0], Value::empty_zset, Value::as_zset_mut) {
        Ok(z) => z,
        Err(e) => return e,
    };
    let score = zset.score(&args[2]).unwrap_or(0.0) + delta;
    if score.is_nan() {
        return RespValue::error("ERR resulting score is not a number (NaN)");
    }
    zset.insert(args[2].clone(), score);
    format_score(score)
}

pub fn cmd_zscore(args: &[Vec<u8>], ks: &mut Keyspace) -> RespValue {
    if args.len() != 2 {
        return wrong_arg_count("zscore");
    }
    match lookup(ks, &args[0], Value::as_zset) {
        Ok(zset) => match zset.and_then(|z| z.score(&args[1])) {
            Some(score) => format_score(score),
            None => RespValue::null_bulk_string(),
        },
        Err(e) => e,
    }
}

pub fn cmd_zrank(args: &[Vec<u8>], ks: &mut Keyspace, reverse: bool) -> RespValue {
    if args.len() != 2 {
        return wrong_arg_count(if reverse { "zrevrank" } else { "zrank" });
    }
    match lookup(ks, &args[0], Value::as_zset) {
        Ok(zset) => {
            let rank = zset.and_then(|z| {
                let rank = z.rank(&args[1])?;
                Some(if reverse { z.len() - 1 - rank } else { rank })
            });
            match rank {
                Some(rank) => RespValue::integer(rank as i64),
                None => RespValue::null_bulk_string(),
            }
        }
        Err(e) => e,
    }
}

pub fn cmd_zcard(args: &[Vec<u8>], ks: &mut Keyspace) -> RespValue {
    if args.len() != 1 {
        return wrong_arg_count("zcard");
    }
    match lookup(ks, &args[0], Value::as_zset) {
        Ok(zset) => RespValue::integer(zset.map_or(0, ZSet::len) as i64),
        Err(e) => e,
    }
}

fn withscores_flag(rest: &[Vec<u8>]) -> Result<bool, RespValue> {
    match rest {
        [] => Ok(false),
        [opt] if arg_to_string(opt).eq_ignore_ascii_case("WITHSCORES") => Ok(true),
        _ => Err(RespValue::error("ERR syntax error")),
    }
}

/// ZRANGE / ZREVRANGE key start stop [WITHSCORES]
pub fn cmd_zrange(args: &[Vec<u8>], ks: &mut Keyspace, reverse: bool) -> RespValue {
    if args.len() < 3 {
        return wrong_arg_count(if reverse { "zrevrange" } else { "zrange" });
    }
    let (start, stop) = match (arg_to_i64(&args[1]), arg_to_i64(&args[2])) {
        (Some(start), Some(stop)) => (start, stop),
        _ => return not_an_integer(),
    };
    let withscores = match withscores_flag(&args[3..]) {
        Ok(w) => w,
        Err(e) => return e,
    };
    let zset = match lookup(ks, &args[0], Value::as_zset) {
        Ok(Some(z)) => z,
        Ok(None) => return RespValue::array(vec![]),
        Err(e) => return e,
    };
    let items = match clamp_range(start, stop, zset.len()) {
        None => Vec::new(),
        Some((start, stop)) => {
            let take = stop - start + 1;
            let owned = |(m, s): (&[u8], f64)| (m.to_vec(), s);
            if reverse {
                zset.iter().rev().skip(start).take(take).map(owned).collect()
            } else {
                zset.iter().skip(start).take(take).map(owned).collect()
            }
        }
    };
    format_range(items, withscores)
}

/// ZRANGEBYSCORE key min max / ZREVRANGEBYSCORE key max min,
/// then [WITHSCORES] [LIMIT offset count] in any order.
pub fn cmd_zrangebyscore(args: &[Vec<u8>], ks: &mut Keyspace, reverse: bool) -> RespValue {
    if args.len() < 3 {
        return wrong_arg_count(if reverse { "zrevrangebyscore" } else { "zrangebyscore" });
    }
    let (lo, hi) = if reverse { (&args[2], &args[1]) } else { (&args[1], &args[2]) };
    let (min, max) = match parse_bounds(lo, hi) {
        Ok(bounds) => bounds,
        Err(e) => return e,
    };

    let mut withscores = false;
    let mut offset = 0usize;
    let mut count: Option<usize> = None;
    let mut i = 3;
    while i < args.len() {
        let opt = arg_to_string(&args[i]).to_ascii_uppercase();
        match opt.as_str() {
            "WITHSCORES" => withscores = true,
            "LIMIT" if i + 2 < args.len() => {
                match (arg_to_i64(&args[i + 1]), arg_to_i64(&args[i + 2])) {
                    (Some(o), Some(c)) => {
                        if o < 0 {
                            return RespValue::array(vec![]);
                        }
                        offset = o as usize;
                        count = usize::try_from(c).ok();
                    }
                    _ => return not_an_integer(),
                }
                i += 2;
            }
            _ => return RespValue::error("ERR syntax error"),
        }
        i += 1;
    }

    let zset = match lookup(ks, &args[0], Value::as_zset) {
        Ok(Some(z)) => z,
        Ok(None) => return RespValue::array(vec![]),
        Err(e) => return e,
    };
    let mut items = zset.in_range(min, max);
    if reverse {
        items.reverse();
    }
    let items = items
        .into_iter()
        .skip(offset)
        .take(count.unwrap_or(usize::MAX))
        .collect();
    format_range(items, withscores)
}

pub fn cmd_zcount(args: &[Vec<u8>], ks: &mut Keyspace) -> RespValue {
    if args.len() != 3 {
        return wrong_arg_count("zcount");
    }
    let (min, max) = match parse_bounds(&args[1], &args[2]) {
        Ok(bounds) => bounds,
        Err(e) => return e,
    };
    match lookup(ks, &args[0], Value::as_zset) {
        Ok(zset) => RespValue::integer(zset.map_or(0, |z| z.in_range(min, max).len()) as i64),
        Err(e) => e,
    }
}

pub fn cmd_zremrangebyrank(args: &[Vec<u8>], ks: &mut Keyspace) -> RespValue {
    if args.len() != 3 {
        return wrong_arg_count("zremrangebyrank");
    }
    let (start, stop) = match (arg_to_i64(&args[1]), arg_to_i64(&args[2])) {
        (Some(start), Some(stop)) => (start, stop),
        _ => return not_an_integer(),
    };
    let removed = match lookup_mut(ks, &args[0], Value::as_zset_mut) {
        Ok(Some(zset)) => match clamp_range(start, stop, zset.len()) {
            Some((start, stop)) => {
                let doomed: Vec<Vec<u8>> = zset
                    .iter()
                    .skip(start)
                    .take(stop - start + 1)
                    .map(|(m, _)| m.to_vec())
                    .collect();
                doomed.iter().filter(|m| zset.remove(m)).count()
            }
            None => 0,
        },
        Ok(None) => 0,
        Err(e) => return e,
    };
    ks.prune(&arg_to_string(&args[0]));
    RespValue::integer(removed as i64)
}

pub fn cmd_zremrangebyscore(args: &[Vec<u8>], ks: &mut Keyspace) -> RespValue {
    if args.len() != 3 {
        return wrong_arg_count("zremrangebyscore");
    }
    let (min, max) = match parse_bounds(&args[1], &args[2]) {
        Ok(bounds) => bounds,
        Err(e) => return e,
    };
    let removed = match lookup_mut(ks, &args[0], Value::as_zset_mut) {
        Ok(Some(zset)) => {
            let doomed = zset.in_range(min, max);
            doomed.iter().filter(|(m, _)| zset.remove(m)).count()
        }
        Ok(None) => 0,
        Err(e) => return e,
    };
    ks.prune(&arg_to_string(&args[0]));
    RespValue::integer(removed as i64)
}
