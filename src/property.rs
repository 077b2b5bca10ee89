use crate::codec::{Codec, decode_field, encode_field};
use crate::command::Command;
use crate::connection::Connection;
use crate::database::Database;
use crate::error::TrolResult;
use crate::schema::{Field, FieldKind, FieldSpec, Holder};
use std::marker::PhantomData;
use std::time::Duration;

/// A single value stored as a Redis string.
///
/// ```ignore
/// const NAME: Property<String> = Property::new("name");
/// NAME.on(&brewery)?.set(&db, &"Fremont Brewing Company".to_string()).await?;
/// ```
pub struct Property<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Property<T> {
    pub const fn new(name: &'static str) -> Self {
        Property {
            name,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T: Codec> Property<T> {
    /// Bind to an entity or to the database's top-level fields.
    pub fn on(&self, holder: &impl Holder) -> TrolResult<PropertyHandle<T>> {
        Ok(PropertyHandle {
            key: holder.bind(&self.spec())?,
            field: self.name,
            _marker: PhantomData,
        })
    }
}

impl<T: Codec> Field for Property<T> {
    fn spec(&self) -> FieldSpec {
        FieldSpec {
            name: self.name,
            kind: FieldKind::Property,
            value_type: std::any::type_name::<T>(),
        }
    }
}

/// A property bound to its key. Each method sends exactly one command.
pub struct PropertyHandle<T> {
    key: String,
    field: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Codec> PropertyHandle<T> {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// `GET`. An absent key is `None`, never a default value.
    pub async fn get<C: Connection>(&self, db: &Database<C>) -> TrolResult<Option<T>> {
        let raw = db
            .execute(Command::new("GET").arg(self.key.as_str()))
            .await?
            .bulk()?;
        raw.map(|raw| decode_field(self.field, &raw)).transpose()
    }

    /// `SET`. Clears any TTL on the key, as Redis does.
    pub async fn set<C: Connection>(&self, db: &Database<C>, value: &T) -> TrolResult<()> {
        let raw = encode_field(self.field, value)?;
        db.execute(Command::new("SET").arg(self.key.as_str()).arg(raw))
            .await?
            .ok()
    }

    /// `SET key value PX ttl`.
    pub async fn set_with_ttl<C: Connection>(
        &self,
        db: &Database<C>,
        value: &T,
        ttl: Duration,
    ) -> TrolResult<()> {
        let raw = encode_field(self.field, value)?;
        db.execute(
            Command::new("SET")
                .arg(self.key.as_str())
                .arg(raw)
                .arg("PX")
                .arg(millis(ttl).to_string()),
        )
        .await?
        .ok()
    }

    /// `SET key value NX`. Returns whether the value was written.
    pub async fn set_if_absent<C: Connection>(
        &self,
        db: &Database<C>,
        value: &T,
    ) -> TrolResult<bool> {
        let raw = encode_field(self.field, value)?;
        db.execute(
            Command::new("SET")
                .arg(self.key.as_str())
                .arg(raw)
                .arg("NX"),
        )
        .await?
        .ok_or_null()
    }

    /// `DEL`. Returns whether the key existed.
    pub async fn delete<C: Connection>(&self, db: &Database<C>) -> TrolResult<bool> {
        db.execute(Command::new("DEL").arg(self.key.as_str()))
            .await?
            .flag()
    }

    pub async fn exists<C: Connection>(&self, db: &Database<C>) -> TrolResult<bool> {
        db.execute(Command::new("EXISTS").arg(self.key.as_str()))
            .await?
            .flag()
    }

    /// `PEXPIRE`. Returns false if the key does not exist.
    pub async fn expire<C: Connection>(
        &self,
        db: &Database<C>,
        ttl: Duration,
    ) -> TrolResult<bool> {
        db.execute(
            Command::new("PEXPIRE")
                .arg(self.key.as_str())
                .arg(millis(ttl).to_string()),
        )
        .await?
        .flag()
    }

    /// `PTTL`. `None` if the key is absent or has no expiry.
    pub async fn ttl<C: Connection>(&self, db: &Database<C>) -> TrolResult<Option<Duration>> {
        let ms = db
            .execute(Command::new("PTTL").arg(self.key.as_str()))
            .await?
            .integer()?;
        Ok(u64::try_from(ms).ok().map(Duration::from_millis))
    }
}

/// Redis rejects a zero expiry, so sub-millisecond durations round up.
pub(crate) fn millis(ttl: Duration) -> u128 {
    ttl.as_millis().max(1)
}
