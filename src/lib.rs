//! # Trol
//!
//! An object-to-Redis mapping. Models, their fields and top-level database
//! fields are declared with typed descriptors; each field lives in its own
//! Redis key (`{Model}:{identity}:{field}`), and every accessor call is
//! exactly one live round-trip.
//!
//! ```ignore
//! use trol::{Database, ModelSchema, Property, Schema, Set};
//!
//! const NAME: Property<String> = Property::new("name");
//! const BEERS: Set<String> = Set::new("beers");
//!
//! let brewery = ModelSchema::builder("Brewery").field(&NAME).field(&BEERS).build()?;
//! let schema = Schema::builder().model(&brewery).build()?;
//! let db = Database::open(&Config::default(), schema).await?;
//!
//! let frmt = brewery.entity("frmt")?;
//! NAME.on(&frmt)?.set(&db, &"Fremont Brewing Company".to_string()).await?;
//! BEERS.on(&frmt)?.add(&db, &"Interurban IPA".to_string()).await?;
//! ```
//!
//! The crate speaks RESP2 itself and has no client-side caching: what you
//! read is what the server holds at that moment.

pub mod codec;
pub mod collection;
pub mod command;
pub mod config;
pub mod connection;
pub mod database;
pub mod error;
pub mod key;
pub mod lock;
pub mod memory;
pub mod model;
pub mod property;
pub mod resp;
pub mod schema;
pub mod script;

pub use codec::{Codec, CodecError, Json};
pub use collection::{
    Hash, HashHandle, List, ListHandle, ScoreBound, Set, SetHandle, SortedSet, SortedSetHandle,
};
pub use config::Config;
pub use connection::{Client, Connection};
pub use database::Database;
pub use error::{TrolError, TrolResult};
pub use key::{Identity, KeyPath};
pub use lock::{Lock, LockGuard, LockHandle};
pub use memory::MemoryConnection;
pub use model::{Entity, EntityRef, WriteBatch};
pub use property::{Property, PropertyHandle};
pub use schema::{Field, FieldKind, FieldSpec, Holder, ModelSchema, Schema};
