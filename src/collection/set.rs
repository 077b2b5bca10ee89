use super::collection_field;
use crate::codec::{Codec, decode_all, decode_field, encode_all, encode_field};
use crate::command::Command;
use crate::connection::Connection;
use crate::database::Database;
use crate::error::TrolResult;
use crate::schema::FieldKind;

collection_field!(
    /// An unordered set of unique members, stored as a Redis set.
    Set,
    SetHandle,
    FieldKind::Set
);

impl<T: Codec> SetHandle<T> {
    /// `SADD`. Returns whether the member was new.
    pub async fn add<C: Connection>(&self, db: &Database<C>, member: &T) -> TrolResult<bool> {
        let raw = encode_field(self.field, member)?;
        db.execute(self.command("SADD").arg(raw)).await?.flag()
    }

    /// Variadic `SADD`. Returns how many members were new.
    pub async fn add_many<C: Connection>(
        &self,
        db: &Database<C>,
        members: &[T],
    ) -> TrolResult<u64> {
        if members.is_empty() {
            return Ok(0);
        }
        let raw = encode_all(self.field, members)?;
        db.execute(self.command("SADD").args(raw)).await?.count()
    }

    /// `SREM`. Returns whether the member was present.
    pub async fn remove<C: Connection>(&self, db: &Database<C>, member: &T) -> TrolResult<bool> {
        let raw = encode_field(self.field, member)?;
        db.execute(self.command("SREM").arg(raw)).await?.flag()
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
        db.execute(self.command("SREM").args(raw)).await?.count()
    }

    /// `SPOP`: remove and return a random member.
    pub async fn pop<C: Connection>(&self, db: &Database<C>) -> TrolResult<Option<T>> {
        let raw = db.execute(self.command("SPOP")).await?.bulk()?;
        raw.map(|raw| decode_field(self.field, &raw)).transpose()
    }

    /// `SRANDMEMBER`: a random member, left in place.
    pub async fn random_member<C: Connection>(&self, db: &Database<C>) -> TrolResult<Option<T>> {
        let raw = db.execute(self.command("SRANDMEMBER")).await?.bulk()?;
        raw.map(|raw| decode_field(self.field, &raw)).transpose()
    }

    /// `SISMEMBER`.
    pub async fn contains<C: Connection>(&self, db: &Database<C>, member: &T) -> TrolResult<bool> {
        let raw = encode_field(self.field, member)?;
        db.execute(self.command("SISMEMBER").arg(raw)).await?.flag()
    }

    /// `SCARD`.
    pub async fn len<C: Connection>(&self, db: &Database<C>) -> TrolResult<u64> {
        db.execute(self.command("SCARD")).await?.count()
    }

    /// `SMEMBERS`, in whatever order the server returns them.
    pub async fn members<C: Connection>(&self, db: &Database<C>) -> TrolResult<Vec<T>> {
        let raw = db.execute(self.command("SMEMBERS")).await?.bulk_array()?;
        decode_all(self.field, raw)
    }

    pub async fn union<C: Connection>(
        &self,
        db: &Database<C>,
        others: &[&SetHandle<T>],
    ) -> TrolResult<Vec<T>> {
        self.combine(db, "SUNION", others).await
    }

    pub async fn intersection<C: Connection>(
        &self,
        db: &Database<C>,
        others: &[&SetHandle<T>],
    ) -> TrolResult<Vec<T>> {
        self.combine(db, "SINTER", others).await
    }

    /// Members of this set that are in none of `others`.
    pub async fn difference<C: Connection>(
        &self,
        db: &Database<C>,
        others: &[&SetHandle<T>],
    ) -> TrolResult<Vec<T>> {
        self.combine(db, "SDIFF", others).await
    }

    /// `SUNIONSTORE dest self others…`. Returns the size of `dest`.
    pub async fn union_store<C: Connection>(
        &self,
        db: &Database<C>,
        dest: &SetHandle<T>,
        others: &[&SetHandle<T>],
    ) -> TrolResult<u64> {
        self.combine_into(db, "SUNIONSTORE", dest, others).await
    }

    pub async fn intersection_store<C: Connection>(
        &self,
        db: &Database<C>,
        dest: &SetHandle<T>,
        others: &[&SetHandle<T>],
    ) -> TrolResult<u64> {
        self.combine_into(db, "SINTERSTORE", dest, others).await
    }

    pub async fn difference_store<C: Connection>(
        &self,
        db: &Database<C>,
        dest: &SetHandle<T>,
        others: &[&SetHandle<T>],
    ) -> TrolResult<u64> {
        self.combine_into(db, "SDIFFSTORE", dest, others).await
    }

    /// Add every member of `others` to this set, in place.
    pub async fn union_update<C: Connection>(
        &self,
        db: &Database<C>,
        others: &[&SetHandle<T>],
    ) -> TrolResult<u64> {
        self.combine_into(db, "SUNIONSTORE", self, others).await
    }

    /// Keep only members that are also in every one of `others`.
    pub async fn intersection_update<C: Connection>(
        &self,
        db: &Database<C>,
        others: &[&SetHandle<T>],
    ) -> TrolResult<u64> {
        self.combine_into(db, "SINTERSTORE", self, others).await
    }

    /// Drop every member found in any of `others`.
    pub async fn difference_update<C: Connection>(
        &self,
        db: &Database<C>,
        others: &[&SetHandle<T>],
    ) -> TrolResult<u64> {
        self.combine_into(db, "SDIFFSTORE", self, others).await
    }

    /// `SINTERCARD 2 self other LIMIT 1`: true when the sets share no member.
    pub async fn is_disjoint<C: Connection>(
        &self,
        db: &Database<C>,
        other: &SetHandle<T>,
    ) -> TrolResult<bool> {
        let cmd = Command::new("SINTERCARD")
            .arg("2")
            .arg(self.key.as_str())
            .arg(other.key.as_str())
            .arg("LIMIT")
            .arg("1");
        Ok(db.execute(cmd).await?.count()? == 0)
    }

    async fn combine<C: Connection>(
        &self,
        db: &Database<C>,
        name: &'static str,
        others: &[&SetHandle<T>],
    ) -> TrolResult<Vec<T>> {
        let cmd = self
            .command(name)
            .args(others.iter().map(|o| o.key.as_str()));
        let raw = db.execute(cmd).await?.bulk_array()?;
        decode_all(self.field, raw)
    }

    async fn combine_into<C: Connection>(
        &self,
        db: &Database<C>,
        name: &'static str,
        dest: &SetHandle<T>,
        others: &[&SetHandle<T>],
    ) -> TrolResult<u64> {
        let cmd = Command::new(name)
            .arg(dest.key.as_str())
            .arg(self.key.as_str())
            .args(others.iter().map(|o| o.key.as_str()));
        db.execute(cmd).await?.count()
    }
}
