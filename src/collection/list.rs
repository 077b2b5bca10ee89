use super::collection_field;
use crate::codec::{Codec, decode_all, decode_field, encode_all, encode_field};
use crate::command::Command;
use crate::connection::Connection;
use crate::database::Database;
use crate::error::TrolResult;
use crate::schema::FieldKind;

collection_field!(
    /// An ordered sequence, stored as a Redis list.
    List,
    ListHandle,
    FieldKind::List
);

impl<T: Codec> ListHandle<T> {
    /// `LPUSH`. Returns the new length.
    pub async fn push_front<C: Connection>(&self, db: &Database<C>, value: &T) -> TrolResult<u64> {
        let raw = encode_field(self.field, value)?;
        db.execute(self.command("LPUSH").arg(raw)).await?.count()
    }

    /// Variadic `LPUSH`. Each value is pushed in turn, so the last one ends
    /// up at the head.
    pub async fn push_front_many<C: Connection>(
        &self,
        db: &Database<C>,
        values: &[T],
    ) -> TrolResult<u64> {
        if values.is_empty() {
            return self.len(db).await;
        }
        let raw = encode_all(self.field, values)?;
        db.execute(self.command("LPUSH").args(raw)).await?.count()
    }

    /// `RPUSH`. Returns the new length.
    pub async fn push_back<C: Connection>(&self, db: &Database<C>, value: &T) -> TrolResult<u64> {
        let raw = encode_field(self.field, value)?;
        db.execute(self.command("RPUSH").arg(raw)).await?.count()
    }

    pub async fn push_back_many<C: Connection>(
        &self,
        db: &Database<C>,
        values: &[T],
    ) -> TrolResult<u64> {
        if values.is_empty() {
            return self.len(db).await;
        }
        let raw = encode_all(self.field, values)?;
        db.execute(self.command("RPUSH").args(raw)).await?.count()
    }

    /// `LPOP`.
    pub async fn pop_front<C: Connection>(&self, db: &Database<C>) -> TrolResult<Option<T>> {
        let raw = db.execute(self.command("LPOP")).await?.bulk()?;
        raw.map(|raw| decode_field(self.field, &raw)).transpose()
    }

    /// `RPOP`.
    pub async fn pop_back<C: Connection>(&self, db: &Database<C>) -> TrolResult<Option<T>> {
        let raw = db.execute(self.command("RPOP")).await?.bulk()?;
        raw.map(|raw| decode_field(self.field, &raw)).transpose()
    }

    /// `RPOPLPUSH self dest`: move the last element onto the head of `dest`.
    pub async fn pop_back_into<C: Connection>(
        &self,
        db: &Database<C>,
        dest: &ListHandle<T>,
    ) -> TrolResult<Option<T>> {
        let raw = db
            .execute(self.command("RPOPLPUSH").arg(dest.key.as_str()))
            .await?
            .bulk()?;
        raw.map(|raw| decode_field(self.field, &raw)).transpose()
    }

    /// `LLEN`.
    pub async fn len<C: Connection>(&self, db: &Database<C>) -> TrolResult<u64> {
        db.execute(self.command("LLEN")).await?.count()
    }

    /// `LRANGE start stop`. Both ends inclusive; negative indices count
    /// from the tail.
    pub async fn range<C: Connection>(
        &self,
        db: &Database<C>,
        start: i64,
        stop: i64,
    ) -> TrolResult<Vec<T>> {
        let cmd = self.command("LRANGE").int_arg(start).int_arg(stop);
        let raw = db.execute(cmd).await?.bulk_array()?;
        decode_all(self.field, raw)
    }

    pub async fn all<C: Connection>(&self, db: &Database<C>) -> TrolResult<Vec<T>> {
        self.range(db, 0, -1).await
    }

    /// `LINDEX`.
    pub async fn index<C: Connection>(
        &self,
        db: &Database<C>,
        index: i64,
    ) -> TrolResult<Option<T>> {
        let raw = db
            .execute(self.command("LINDEX").int_arg(index))
            .await?
            .bulk()?;
        raw.map(|raw| decode_field(self.field, &raw)).transpose()
    }

    /// `LSET`. Fails with a server error if the index is out of range.
    pub async fn set<C: Connection>(
        &self,
        db: &Database<C>,
        index: i64,
        value: &T,
    ) -> TrolResult<()> {
        let raw = encode_field(self.field, value)?;
        db.execute(self.command("LSET").int_arg(index).arg(raw))
            .await?
            .ok()
    }

    /// `LREM count value`. A positive count removes from the head, a
    /// negative one from the tail and zero removes every occurrence.
    pub async fn remove<C: Connection>(
        &self,
        db: &Database<C>,
        count: i64,
        value: &T,
    ) -> TrolResult<u64> {
        let raw = encode_field(self.field, value)?;
        db.execute(self.command("LREM").int_arg(count).arg(raw))
            .await?
            .count()
    }

    /// `LTRIM start stop`: keep only the given range.
    pub async fn trim<C: Connection>(
        &self,
        db: &Database<C>,
        start: i64,
        stop: i64,
    ) -> TrolResult<()> {
        let cmd: Command = self.command("LTRIM").int_arg(start).int_arg(stop);
        db.execute(cmd).await?.ok()
    }
}
