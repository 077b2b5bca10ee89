//! Fields backed by native Redis aggregates.
//!
//! Every public method on a handle sends exactly one command. Bulk variants
//! (`add_many`, `push_back_many`, …) use the server's variadic form. Given no
//! items they send nothing, except list pushes, which still report the
//! current length with `LLEN`.

pub mod hash;
pub mod list;
pub mod set;
pub mod sorted_set;

pub use hash::{Hash, HashHandle};
pub use list::{List, ListHandle};
pub use set::{Set, SetHandle};
pub use sorted_set::{ScoreBound, SortedSet, SortedSetHandle};

/// Declares a collection descriptor, its bound handle, and the commands
/// shared by all collections (`DEL`, `EXISTS`, `PEXPIRE`).
macro_rules! collection_field {
    ($(#[$meta:meta])* $descriptor:ident, $handle:ident, $kind:expr) => {
        $(#[$meta])*
        pub struct $descriptor<T> {
            name: &'static str,
            _marker: ::std::marker::PhantomData<fn() -> T>,
        }

        impl<T> $descriptor<T> {
            pub const fn new(name: &'static str) -> Self {
                $descriptor {
                    name,
                    _marker: ::std::marker::PhantomData,
                }
            }

            pub fn name(&self) -> &'static str {
                self.name
            }
        }

        impl<T: $crate::codec::Codec> $descriptor<T> {
            pub fn on(
                &self,
                holder: &impl $crate::schema::Holder,
            ) -> $crate::error::TrolResult<$handle<T>> {
                use $crate::schema::Field;
                Ok($handle {
                    key: holder.bind(&self.spec())?,
                    field: self.name,
                    _marker: ::std::marker::PhantomData,
                })
            }
        }

        impl<T: $crate::codec::Codec> $crate::schema::Field for $descriptor<T> {
            fn spec(&self) -> $crate::schema::FieldSpec {
                $crate::schema::FieldSpec {
                    name: self.name,
                    kind: $kind,
                    value_type: ::std::any::type_name::<T>(),
                }
            }
        }

        pub struct $handle<T> {
            key: String,
            field: &'static str,
            _marker: ::std::marker::PhantomData<fn() -> T>,
        }

        impl<T: $crate::codec::Codec> $handle<T> {
            pub fn key(&self) -> &str {
                &self.key
            }

            fn command(&self, name: &'static str) -> $crate::command::Command {
                $crate::command::Command::new(name).arg(self.key.as_str())
            }

            /// `DEL`. Returns whether the collection existed.
            pub async fn clear<C: $crate::connection::Connection>(
                &self,
                db: &$crate::database::Database<C>,
            ) -> $crate::error::TrolResult<bool> {
                db.execute(self.command("DEL")).await?.flag()
            }

            pub async fn exists<C: $crate::connection::Connection>(
                &self,
                db: &$crate::database::Database<C>,
            ) -> $crate::error::TrolResult<bool> {
                db.execute(self.command("EXISTS")).await?.flag()
            }

            /// `PEXPIRE`. Returns false if the collection does not exist.
            pub async fn expire<C: $crate::connection::Connection>(
                &self,
                db: &$crate::database::Database<C>,
                ttl: ::std::time::Duration,
            ) -> $crate::error::TrolResult<bool> {
                let ms = $crate::property::millis(ttl).to_string();
                db.execute(self.command("PEXPIRE").arg(ms)).await?.flag()
            }
        }
    };
}

pub(crate) use collection_field;
