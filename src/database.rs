use crate::command::{Command, Reply};
use crate::config::Config;
use crate::connection::{Client, Connection};
use crate::error::{TrolError, TrolResult};
use crate::resp::RespValue;
use crate::schema::Schema;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// A connection plus the schema of what is stored behind it.
///
/// Every accessor takes a `&Database` and issues its commands through
/// [`Database::execute`]. Commands are serialized on one connection, so a
/// `Database` can be shared across tasks behind an `Arc`.
pub struct Database<C: Connection = Client> {
    connection: Mutex<C>,
    schema: Arc<Schema>,
}

impl Database<Client> {
    pub async fn open(config: &Config, schema: Arc<Schema>) -> TrolResult<Self> {
        let client = Client::connect(config).await?;
        Ok(Database::with_connection(client, schema))
    }
}

impl<C: Connection> Database<C> {
    pub fn with_connection(connection: C, schema: Arc<Schema>) -> Self {
        Database {
            connection: Mutex::new(connection),
            schema,
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Run one command. Error replies become [`TrolError::Server`].
    pub async fn execute(&self, command: Command) -> TrolResult<Reply> {
        debug!(
            "{} {}",
            command.name(),
            command.first_key().unwrap_or_default()
        );
        let value = self.connection.lock().await.execute(&command).await?;
        match value {
            RespValue::Error(msg) => Err(TrolError::Server(msg)),
            value => Ok(Reply::new(command.name(), value)),
        }
    }

    /// `KEYS pattern`. Meant for inspection, not for hot paths.
    pub async fn keys(&self, pattern: &str) -> TrolResult<Vec<String>> {
        let raw = self
            .execute(Command::new("KEYS").arg(pattern))
            .await?
            .bulk_array()?;
        Ok(raw
            .into_iter()
            .map(|k| String::from_utf8_lossy(&k).into_owned())
            .collect())
    }

    /// `TYPE key`, e.g. `"string"`, `"zset"` or `"none"`.
    pub async fn key_type(&self, key: &str) -> TrolResult<String> {
        self.execute(Command::new("TYPE").arg(key)).await?.simple()
    }

    pub async fn ping(&self) -> TrolResult<()> {
        let reply = self.execute(Command::new("PING")).await?.simple()?;
        if reply == "PONG" {
            Ok(())
        } else {
            Err(TrolError::UnexpectedReply {
                command: "PING".to_string(),
                reply: RespValue::simple_string(reply),
            })
        }
    }

    pub async fn close(self) -> TrolResult<()> {
        self.connection.into_inner().close().await
    }
}
