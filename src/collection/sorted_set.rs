use super::collection_field;
use crate::codec::{Codec, decode_all, decode_field, encode_all, encode_field};
use crate::command::{Command, format_float};
use crate::connection::Connection;
use crate::database::Database;
use crate::error::{TrolError, TrolResult};
use crate::resp::RespValue;
use crate::schema::FieldKind;

collection_field!(
    /// Members ordered by a floating-point score, stored as a Redis sorted set.
    SortedSet,
    SortedSetHandle,
    FieldKind::SortedSet
);

/// One end of a score interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreBound {
    Inclusive(f64),
    Exclusive(f64),
    NegInf,
    PosInf,
}

impl ScoreBound {
    fn to_arg(self) -> String {
        match self {
            ScoreBound::Inclusive(score) => format_float(score),
            ScoreBound::Exclusive(score) => format!("({}", format_float(score)),
            ScoreBound::NegInf => "-inf".to_string(),
            ScoreBound::PosInf => "+inf".to_string(),
        }
    }
}

impl From<f64> for ScoreBound {
    fn from(score: f64) -> Self {
        ScoreBound::Inclusive(score)
    }
}

fn parse_score(command: &'static str, raw: &[u8]) -> TrolResult<f64> {
    std::str::from_utf8(raw)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| TrolError::UnexpectedReply {
            command: command.to_string(),
            reply: RespValue::bulk_string(raw),
        })
}

impl<T: Codec> SortedSetHandle<T> {
    /// `ZADD`. Returns whether the member was new; an existing member
    /// only has its score updated.
    pub async fn add<C: Connection>(
        &self,
        db: &Database<C>,
        member: &T,
        score: f64,
    ) -> TrolResult<bool> {
        let raw = encode_field(self.field, member)?;
        db.execute(self.command("ZADD").float_arg(score).arg(raw))
            .await?
            .flag()
    }

    /// Variadic `ZADD` of `(member, score)` pairs.
    pub async fn add_many<C: Connection>(
        &self,
        db: &Database<C>,
        members: &[(T, f64)],
    ) -> TrolResult<u64> {
        if members.is_empty() {
            return Ok(0);
        }
        let mut cmd = self.command("ZADD");
        for (member, score) in members {
            cmd = cmd.float_arg(*score).arg(encode_field(self.field, member)?);
        }
        db.execute(cmd).await?.count()
    }

    /// `ZREM`.
    pub async fn remove<C: Connection>(&self, db: &Database<C>, member: &T) -> TrolResult<bool> {
        let raw = encode_field(self.field, member)?;
        db.execute(self.command("ZREM").arg(raw)).await?.flag()
    }

    pub async fn remove_many<C: Connection>(
        &self,
        db: &Database<C>,
        members: &[T],
    ) -> TrolResult<u64> {
        if members.is_empty() {
            return Ok(0);
        }
        let raw = encode_all(self.field, members)?;
        db.execute(self.command("ZREM").args(raw)).await?.count()
    }

    /// `ZINCRBY`. A missing member starts from zero. Returns the new score.
    pub async fn incr_by<C: Connection>(
        &self,
        db: &Database<C>,
        member: &T,
        delta: f64,
    ) -> TrolResult<f64> {
        let raw = encode_field(self.field, member)?;
        let reply = db
            .execute(self.command("ZINCRBY").float_arg(delta).arg(raw))
            .await?;
        let value = reply.value().clone();
        reply.float()?.ok_or(TrolError::UnexpectedReply {
            command: "ZINCRBY".to_string(),
            reply: value,
        })
    }

    /// `ZSCORE`.
    pub async fn score<C: Connection>(
        &self,
        db: &Database<C>,
        member: &T,
    ) -> TrolResult<Option<f64>> {
        let raw = encode_field(self.field, member)?;
        db.execute(self.command("ZSCORE").arg(raw)).await?.float()
    }

    /// `ZRANK`: zero-based position in ascending score order.
    pub async fn rank<C: Connection>(
        &self,
        db: &Database<C>,
        member: &T,
    ) -> TrolResult<Option<u64>> {
        let raw = encode_field(self.field, member)?;
        db.execute(self.command("ZRANK").arg(raw))
            .await?
            .optional_count()
    }

    /// `ZREVRANK`: zero-based position in descending score order.
    pub async fn rev_rank<C: Connection>(
        &self,
        db: &Database<C>,
        member: &T,
    ) -> TrolResult<Option<u64>> {
        let raw = encode_field(self.field, member)?;
        db.execute(self.command("ZREVRANK").arg(raw))
            .await?
            .optional_count()
    }

    /// `ZCARD`.
    pub async fn len<C: Connection>(&self, db: &Database<C>) -> TrolResult<u64> {
        db.execute(self.command("ZCARD")).await?.count()
    }

    /// `ZRANGE start stop`. Indices are inclusive and may be negative.
    pub async fn range<C: Connection>(
        &self,
        db: &Database<C>,
        start: i64,
        stop: i64,
    ) -> TrolResult<Vec<T>> {
        let cmd = self.command("ZRANGE").int_arg(start).int_arg(stop);
        let raw = db.execute(cmd).await?.bulk_array()?;
        decode_all(self.field, raw)
    }

    pub async fn range_with_scores<C: Connection>(
        &self,
        db: &Database<C>,
        start: i64,
        stop: i64,
    ) -> TrolResult<Vec<(T, f64)>> {
        let cmd = self
            .command("ZRANGE")
            .int_arg(start)
            .int_arg(stop)
            .arg("WITHSCORES");
        self.scored(db, cmd).await
    }

    /// `ZREVRANGE start stop`, highest score first.
    pub async fn rev_range<C: Connection>(
        &self,
        db: &Database<C>,
        start: i64,
        stop: i64,
    ) -> TrolResult<Vec<T>> {
        let cmd = self.command("ZREVRANGE").int_arg(start).int_arg(stop);
        let raw = db.execute(cmd).await?.bulk_array()?;
        decode_all(self.field, raw)
    }

    pub async fn rev_range_with_scores<C: Connection>(
        &self,
        db: &Database<C>,
        start: i64,
        stop: i64,
    ) -> TrolResult<Vec<(T, f64)>> {
        let cmd = self
            .command("ZREVRANGE")
            .int_arg(start)
            .int_arg(stop)
            .arg("WITHSCORES");
        self.scored(db, cmd).await
    }

    /// `ZRANGEBYSCORE min max [LIMIT offset count]`.
    pub async fn range_by_score<C: Connection>(
        &self,
        db: &Database<C>,
        min: ScoreBound,
        max: ScoreBound,
        limit: Option<(u64, u64)>,
    ) -> TrolResult<Vec<T>> {
        let cmd = self
            .command("ZRANGEBYSCORE")
            .arg(min.to_arg())
            .arg(max.to_arg());
        let raw = db.execute(with_limit(cmd, limit)).await?.bulk_array()?;
        decode_all(self.field, raw)
    }

    /// `ZREVRANGEBYSCORE max min [LIMIT offset count]`. Note the bound order.
    pub async fn rev_range_by_score<C: Connection>(
        &self,
        db: &Database<C>,
        max: ScoreBound,
        min: ScoreBound,
        limit: Option<(u64, u64)>,
    ) -> TrolResult<Vec<T>> {
        let cmd = self
            .command("ZREVRANGEBYSCORE")
            .arg(max.to_arg())
            .arg(min.to_arg());
        let raw = db.execute(with_limit(cmd, limit)).await?.bulk_array()?;
        decode_all(self.field, raw)
    }

    /// `ZCOUNT`.
    pub async fn count<C: Connection>(
        &self,
        db: &Database<C>,
        min: ScoreBound,
        max: ScoreBound,
    ) -> TrolResult<u64> {
        let cmd = self.command("ZCOUNT").arg(min.to_arg()).arg(max.to_arg());
        db.execute(cmd).await?.count()
    }

    /// `ZREMRANGEBYRANK`. Returns how many members were removed.
    pub async fn remove_range_by_rank<C: Connection>(
        &self,
        db: &Database<C>,
        start: i64,
        stop: i64,
    ) -> TrolResult<u64> {
        let cmd = self
            .command("ZREMRANGEBYRANK")
            .int_arg(start)
            .int_arg(stop);
        db.execute(cmd).await?.count()
    }

    /// `ZREMRANGEBYSCORE`.
    pub async fn remove_range_by_score<C: Connection>(
        &self,
        db: &Database<C>,
        min: ScoreBound,
        max: ScoreBound,
    ) -> TrolResult<u64> {
        let cmd = self
            .command("ZREMRANGEBYSCORE")
            .arg(min.to_arg())
            .arg(max.to_arg());
        db.execute(cmd).await?.count()
    }

    async fn scored<C: Connection>(
        &self,
        db: &Database<C>,
        cmd: Command,
    ) -> TrolResult<Vec<(T, f64)>> {
        let name = cmd.name();
        let pairs = db.execute(cmd).await?.pairs()?;
        pairs
            .into_iter()
            .map(|(member, score)| {
                Ok((
                    decode_field(self.field, &member)?,
                    parse_score(name, &score)?,
                ))
            })
            .collect()
    }
}

fn with_limit(cmd: Command, limit: Option<(u64, u64)>) -> Command {
    match limit {
        Some((offset, count)) => cmd
            .arg("LIMIT")
            .arg(offset.to_string())
            .arg(count.to_string()),
        None => cmd,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_bounds() {
        assert_eq!(ScoreBound::Inclusive(1.5).to_arg(), "1.5");
        assert_eq!(ScoreBound::Exclusive(2.0).to_arg(), "(2");
        assert_eq!(ScoreBound::NegInf.to_arg(), "-inf");
        assert_eq!(ScoreBound::PosInf.to_arg(), "+inf");
        assert_eq!(ScoreBound::from(3.0), ScoreBound::Inclusive(3.0));
    }

    #[test]
    fn test_parse_score() {
        assert_eq!(parse_score("ZRANGE", b"-0.5").unwrap(), -0.5);
        assert_eq!(parse_score("ZRANGE", b"inf").unwrap(), f64::INFINITY);
        assert!(parse_score("ZRANGE", b"many").is_err());
    }
}
