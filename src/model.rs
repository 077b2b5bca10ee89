use crate::codec::{Codec, CodecError, encode_field};
use crate::command::Command;
use crate::connection::Connection;
use crate::database::Database;
use crate::error::{TrolError, TrolResult};
use crate::key::{self, Identity, KeyPath};
use crate::property::Property;
use crate::schema::{Field, FieldKind, FieldSpec, Holder, ModelSchema, Schema};
use std::fmt;
use std::sync::Arc;

/// One instance of a model: its schema plus an application-supplied identity.
#[derive(Debug, Clone)]
pub struct Entity {
    schema: Arc<ModelSchema>,
    identity: Identity,
}

impl Entity {
    pub fn new(schema: &Arc<ModelSchema>, identity: &str) -> TrolResult<Self> {
        Ok(Self::with_identity(schema, Identity::new(identity)?))
    }

    pub fn with_identity(schema: &Arc<ModelSchema>, identity: Identity) -> Self {
        Entity {
            schema: Arc::clone(schema),
            identity,
        }
    }

    pub fn schema(&self) -> &Arc<ModelSchema> {
        &self.schema
    }

    pub fn model_name(&self) -> &str {
        self.schema.name()
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// `{Model}:{identity}`, the prefix of every field key of this entity.
    pub fn key(&self) -> String {
        key::model_key(self.schema.name(), &self.identity)
    }

    pub fn to_ref(&self) -> EntityRef {
        EntityRef {
            model: self.schema.name().to_string(),
            identity: self.identity.clone(),
        }
    }

    /// Start a batch of property writes committed with a single `MSET`.
    pub fn write(&self) -> WriteBatch<'_> {
        WriteBatch {
            entity: self,
            pairs: Vec::new(),
        }
    }

    /// Delete several fields with one `DEL`. An empty list deletes every
    /// declared field except locks. Returns the number of keys removed.
    pub async fn delete<C: Connection>(
        &self,
        db: &Database<C>,
        fields: &[&(dyn Field + Sync)],
    ) -> TrolResult<u64> {
        let keys: Vec<String> = if fields.is_empty() {
            self.schema
                .fields()
                .filter(|spec| spec.kind != FieldKind::Lock)
                .map(|spec| self.key_for(spec.name))
                .collect()
        } else {
            fields
                .iter()
                .map(|field| self.bind(&field.spec()))
                .collect::<TrolResult<_>>()?
        };
        if keys.is_empty() {
            return Ok(0);
        }
        db.execute(Command::new("DEL").args(keys)).await?.count()
    }
}

impl Holder for Entity {
    fn holder_name(&self) -> &str {
        self.schema.name()
    }

    fn declared(&self, name: &str) -> Option<&FieldSpec> {
        self.schema.field(name)
    }

    fn key_for(&self, name: &str) -> String {
        key::field_key(self.schema.name(), &self.identity, name)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// Property values collected for a single `MSET`.
pub struct WriteBatch<'a> {
    entity: &'a Entity,
    pairs: Vec<(String, Vec<u8>)>,
}

impl WriteBatch<'_> {
    pub fn set<T: Codec>(mut self, property: &Property<T>, value: &T) -> TrolResult<Self> {
        let key = self.entity.bind(&property.spec())?;
        let raw = encode_field(property.name(), value)?;
        self.pairs.push((key, raw));
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub async fn commit<C: Connection>(self, db: &Database<C>) -> TrolResult<()> {
        if self.pairs.is_empty() {
            return Ok(());
        }
        let mut cmd = Command::new("MSET");
        for (key, raw) in self.pairs {
            cmd = cmd.arg(key).arg(raw);
        }
        db.execute(cmd).await?.ok()
    }
}

/// A stored reference to an entity, encoded as its model key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityRef {
    pub model: String,
    pub identity: Identity,
}

impl EntityRef {
    pub fn key(&self) -> String {
        key::model_key(&self.model, &self.identity)
    }

    /// Look the referenced model up in `schema`.
    pub fn resolve(&self, schema: &Schema) -> TrolResult<Entity> {
        let model = schema
            .model(&self.model)
            .ok_or_else(|| TrolError::MalformedKey(self.key()))?;
        Ok(Entity::with_identity(model, self.identity.clone()))
    }
}

impl From<&Entity> for EntityRef {
    fn from(entity: &Entity) -> Self {
        entity.to_ref()
    }
}

impl Codec for EntityRef {
    fn encode(&self) -> Result<Vec<u8>, CodecError> {
        Ok(self.key().into_bytes())
    }

    fn decode(raw: &[u8]) -> Result<Self, CodecError> {
        let text =
            std::str::from_utf8(raw).map_err(|_| CodecError::new("not valid UTF-8"))?;
        match KeyPath::parse(text) {
            Ok(KeyPath::Entity { model, identity }) => Ok(EntityRef { model, identity }),
            _ => Err(CodecError::new("expected a '{Model}:{identity}' reference")),
        }
    }
}
