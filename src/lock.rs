//! A mutual-exclusion lock held in a single Redis key.
//!
//! Acquiring writes a random token with `SET key token NX [PX ttl]`; releasing
//! and extending run a script that only touches the key while it still holds
//! that token. This is sound against one Redis node for as long as the TTL
//! has not elapsed. It makes no promises across failover.

use crate::command::Command;
use crate::connection::Connection;
use crate::database::Database;
use crate::error::{TrolError, TrolResult};
use crate::property::millis;
use crate::schema::{Field, FieldKind, FieldSpec, Holder};
use crate::script::{COMPARE_AND_DELETE, COMPARE_AND_PEXPIRE};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

const DEFAULT_SLEEP: Duration = Duration::from_millis(100);

/// Lock descriptor.
///
/// ```ignore
/// const BREWING: Lock = Lock::new("brewing").with_ttl(Duration::from_secs(30));
/// let guard = BREWING.on(&batch)?.acquire(&db).await?;
/// // ...
/// guard.release(&db).await?;
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Lock {
    name: &'static str,
    ttl: Option<Duration>,
    sleep: Duration,
    blocking_timeout: Option<Duration>,
}

impl Lock {
    /// A lock that never expires on its own and waits forever in `acquire`.
    pub const fn new(name: &'static str) -> Self {
        Lock {
            name,
            ttl: None,
            sleep: DEFAULT_SLEEP,
            blocking_timeout: None,
        }
    }

    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Delay between attempts while the lock is contended.
    pub const fn with_sleep(mut self, sleep: Duration) -> Self {
        self.sleep = sleep;
        self
    }

    pub const fn with_blocking_timeout(mut self, timeout: Duration) -> Self {
        self.blocking_timeout = Some(timeout);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn on(&self, holder: &impl Holder) -> TrolResult<LockHandle> {
        Ok(LockHandle {
            key: holder.bind(&self.spec())?,
            ttl: self.ttl,
            sleep: self.sleep,
            blocking_timeout: self.blocking_timeout,
        })
    }
}

impl Field for Lock {
    fn spec(&self) -> FieldSpec {
        FieldSpec {
            name: self.name,
            kind: FieldKind::Lock,
            value_type: "token",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LockHandle {
    key: String,
    ttl: Option<Duration>,
    sleep: Duration,
    blocking_timeout: Option<Duration>,
}

impl LockHandle {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// One `SET NX` attempt. Fails with [`TrolError::LockContended`] if
    /// someone else holds the lock.
    pub async fn try_acquire<C: Connection>(&self, db: &Database<C>) -> TrolResult<LockGuard> {
        let token = format!("{:032x}", rand::random::<u128>());
        let mut cmd = Command::new("SET")
            .arg(self.key.as_str())
            .arg(token.as_str())
            .arg("NX");
        if let Some(ttl) = self.ttl {
            cmd = cmd.arg("PX").arg(millis(ttl).to_string());
        }
        if db.execute(cmd).await?.ok_or_null()? {
            debug!("Acquired lock {}", self.key);
            Ok(LockGuard {
                key: self.key.clone(),
                token,
                released: false,
            })
        } else {
            Err(TrolError::LockContended(self.key.clone()))
        }
    }

    /// Retry [`try_acquire`](Self::try_acquire) until it succeeds or the
    /// blocking timeout runs out ([`TrolError::LockTimeout`]).
    pub async fn acquire<C: Connection>(&self, db: &Database<C>) -> TrolResult<LockGuard> {
        self.acquire_until(db, None).await
    }

    /// Like [`acquire`](Self::acquire), but gives up with
    /// [`TrolError::LockCancelled`] once `cancel` fires.
    pub async fn acquire_with_cancel<C: Connection>(
        &self,
        db: &Database<C>,
        cancel: &CancellationToken,
    ) -> TrolResult<LockGuard> {
        self.acquire_until(db, Some(cancel)).await
    }

    async fn acquire_until<C: Connection>(
        &self,
        db: &Database<C>,
        cancel: Option<&CancellationToken>,
    ) -> TrolResult<LockGuard> {
        let started = Instant::now();
        let deadline = self.blocking_timeout.map(|t| started + t);
        loop {
            if let Some(cancel) = cancel
                && cancel.is_cancelled()
            {
                return Err(TrolError::LockCancelled(self.key.clone()));
            }

            match self.try_acquire(db).await {
                Err(TrolError::LockContended(_)) => {}
                result => return result,
            }

            let mut pause = self.sleep;
            if let Some(deadline) = deadline {
                let now = Instant::now();
                if now >= deadline {
                    return Err(TrolError::LockTimeout {
                        key: self.key.clone(),
                        waited: now - started,
                    });
                }
                pause = pause.min(deadline - now);
            }

            match cancel {
                Some(cancel) => {
                    tokio::select! {
                        _ = tokio::time::sleep(pause) => {}
                        _ = cancel.cancelled() => {
                            return Err(TrolError::LockCancelled(self.key.clone()));
                        }
                    }
                }
                None => tokio::time::sleep(pause).await,
            }
        }
    }

    /// `EXISTS`: whether anyone currently holds the lock.
    pub async fn is_locked<C: Connection>(&self, db: &Database<C>) -> TrolResult<bool> {
        db.execute(Command::new("EXISTS").arg(self.key.as_str()))
            .await?
            .flag()
    }
}

/// Proof of ownership of a lock. Release it explicitly; dropping a guard
/// leaves the key in place until its TTL (if any) runs out.
#[derive(Debug)]
pub struct LockGuard {
    key: String,
    token: String,
    released: bool,
}

impl LockGuard {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Delete the key if it still holds this guard's token. Fails with
    /// [`TrolError::LockNotOwned`] if the lock expired or was taken over.
    pub async fn release<C: Connection>(mut self, db: &Database<C>) -> TrolResult<()> {
        self.released = true;
        let cmd = COMPARE_AND_DELETE.eval(&[self.key.as_str()], &[self.token.as_str()]);
        if db.execute(cmd).await?.flag()? {
            debug!("Released lock {}", self.key);
            Ok(())
        } else {
            warn!("Lock {} was no longer held at release", self.key);
            Err(TrolError::LockNotOwned(self.key.clone()))
        }
    }

    /// Reset the TTL to `ttl` if this guard still owns the lock.
    pub async fn extend<C: Connection>(&self, db: &Database<C>, ttl: Duration) -> TrolResult<()> {
        let ms = millis(ttl).to_string();
        let cmd = COMPARE_AND_PEXPIRE.eval(
            &[self.key.as_str()],
            &[self.token.as_str(), ms.as_str()],
        );
        if db.execute(cmd).await?.flag()? {
            Ok(())
        } else {
            Err(TrolError::LockNotOwned(self.key.clone()))
        }
    }

    /// `GET`: whether the key still holds this guard's token.
    pub async fn is_owned<C: Connection>(&self, db: &Database<C>) -> TrolResult<bool> {
        let current = db
            .execute(Command::new("GET").arg(self.key.as_str()))
            .await?
            .bulk()?;
        Ok(current.as_deref() == Some(self.token.as_bytes()))
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if !self.released {
            warn!("Lock {} dropped without being released", self.key);
        }
    }
}
