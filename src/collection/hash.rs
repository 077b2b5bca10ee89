use super::collection_field;
use crate::codec::{Codec, decode_all, decode_field, encode_field};
use crate::connection::Connection;
use crate::database::Database;
use crate::error::TrolResult;
use crate::schema::FieldKind;

collection_field!(
    /// A map from string keys to values of one type, stored as a Redis hash.
    Hash,
    HashHandle,
    FieldKind::Hash
);

impl<T: Codec> HashHandle<T> {
    /// `HSET`. Returns whether the entry was new.
    pub async fn set<C: Connection>(
        &self,
        db: &Database<C>,
        name: &str,
        value: &T,
    ) -> TrolResult<bool> {
        let raw = encode_field(self.field, value)?;
        db.execute(self.command("HSET").arg(name).arg(raw))
            .await?
            .flag()
    }

    /// Variadic `HSET`. Returns how many entries were new.
    pub async fn set_many<C: Connection>(
        &self,
        db: &Database<C>,
        entries: &[(&str, T)],
    ) -> TrolResult<u64> {
        if entries.is_empty() {
            return Ok(0);
        }
        let mut cmd = self.command("HSET");
        for (name, value) in entries {
            cmd = cmd.arg(*name).arg(encode_field(self.field, value)?);
        }
        db.execute(cmd).await?.count()
    }

    /// `HGET`.
    pub async fn get<C: Connection>(&self, db: &Database<C>, name: &str) -> TrolResult<Option<T>> {
        let raw = db.execute(self.command("HGET").arg(name)).await?.bulk()?;
        raw.map(|raw| decode_field(self.field, &raw)).transpose()
    }

    /// `HMGET`, one result per requested name.
    pub async fn get_many<C: Connection>(
        &self,
        db: &Database<C>,
        names: &[&str],
    ) -> TrolResult<Vec<Option<T>>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let raw = db
            .execute(self.command("HMGET").args(names.iter().copied()))
            .await?
            .optional_bulk_array()?;
        raw.into_iter()
            .map(|raw| raw.map(|raw| decode_field(self.field, &raw)).transpose())
            .collect()
    }

    /// `HDEL`.
    pub async fn remove<C: Connection>(&self, db: &Database<C>, name: &str) -> TrolResult<bool> {
        db.execute(self.command("HDEL").arg(name)).await?.flag()
    }

    pub async fn remove_many<C: Connection>(
        &self,
        db: &Database<C>,
        names: &[&str],
    ) -> TrolResult<u64> {
        if names.is_empty() {
            return Ok(0);
        }
        db.execute(self.command("HDEL").args(names.iter().copied()))
            .await?
            .count()
    }

    /// `HEXISTS`.
    pub async fn contains<C: Connection>(&self, db: &Database<C>, name: &str) -> TrolResult<bool> {
        db.execute(self.command("HEXISTS").arg(name)).await?.flag()
    }

    /// `HLEN`.
    pub async fn len<C: Connection>(&self, db: &Database<C>) -> TrolResult<u64> {
        db.execute(self.command("HLEN")).await?.count()
    }

    /// `HKEYS`.
    pub async fn fields<C: Connection>(&self, db: &Database<C>) -> TrolResult<Vec<String>> {
        let raw = db.execute(self.command("HKEYS")).await?.bulk_array()?;
        decode_all(self.field, raw)
    }

    /// `HVALS`.
    pub async fn values<C: Connection>(&self, db: &Database<C>) -> TrolResult<Vec<T>> {
        let raw = db.execute(self.command("HVALS")).await?.bulk_array()?;
        decode_all(self.field, raw)
    }

    /// `HGETALL`.
    pub async fn all<C: Connection>(&self, db: &Database<C>) -> TrolResult<Vec<(String, T)>> {
        let pairs = db.execute(self.command("HGETALL")).await?.pairs()?;
        pairs
            .into_iter()
            .map(|(name, value)| {
                Ok((
                    decode_field(self.field, &name)?,
                    decode_field(self.field, &value)?,
                ))
            })
            .collect()
    }

    /// `HINCRBY`. The stored value must be an integer.
    pub async fn incr_by<C: Connection>(
        &self,
        db: &Database<C>,
        name: &str,
        delta: i64,
    ) -> TrolResult<i64> {
        db.execute(self.command("HINCRBY").arg(name).int_arg(delta))
            .await?
            .integer()
    }
}
