//! An in-process stand-in for a Redis server.
//!
//! [`MemoryConnection`] implements [`Connection`] over a private keyspace
//! and records every command it receives, so tests can assert both on the
//! stored data and on exactly which commands an accessor sent. Clones share
//! the same keyspace and log.

mod command;
mod glob;
mod store;
mod types;

use crate::command::Command;
use crate::connection::Connection;
use crate::error::TrolResult;
use crate::resp::RespValue;
use std::sync::Arc;
use store::Keyspace;
use tokio::sync::Mutex;

#[derive(Default)]
struct Shared {
    keyspace: Mutex<Keyspace>,
    log: Mutex<Vec<Command>>,
}

#[derive(Clone, Default)]
pub struct MemoryConnection {
    shared: Arc<Shared>,
}

impl MemoryConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every command received so far, oldest first.
    pub async fn commands(&self) -> Vec<Command> {
        self.shared.log.lock().await.clone()
    }

    pub async fn command_names(&self) -> Vec<&'static str> {
        self.shared.log.lock().await.iter().map(Command::name).collect()
    }

    pub async fn command_count(&self) -> usize {
        self.shared.log.lock().await.len()
    }

    pub async fn clear_log(&self) {
        self.shared.log.lock().await.clear();
    }

    /// Whether `key` is present (and not expired). Not logged.
    pub async fn contains_key(&self, key: &str) -> bool {
        self.shared.keyspace.lock().await.exists(key)
    }

    /// All live keys, sorted. Not logged.
    pub async fn keys(&self) -> Vec<String> {
        self.shared.keyspace.lock().await.keys("*")
    }
}

impl Connection for MemoryConnection {
    async fn execute(&mut self, command: &Command) -> TrolResult<RespValue> {
        self.shared.log.lock().await.push(command.clone());
        let mut keyspace = self.shared.keyspace.lock().await;
        Ok(command::dispatch(command, &mut keyspace))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn run(conn: &mut MemoryConnection, parts: &[&str]) -> RespValue {
        let (name, args) = parts.split_first().unwrap();
        let name: &'static str = match *name {
            "SET" => "SET",
            "GET" => "GET",
            "TYPE" => "TYPE",
            "SADD" => "SADD",
            "LPUSH" => "LPUSH",
            "ZADD" => "ZADD",
            "ZRANGEBYSCORE" => "ZRANGEBYSCORE",
            "HINCRBY" => "HINCRBY",
            "RPOPLPUSH" => "RPOPLPUSH",
            "LRANGE" => "LRANGE",
            "SINTERCARD" => "SINTERCARD",
            "FLUSHALL" => "FLUSHALL",
            other => panic!("add {other} to the test helper"),
        };
        let cmd = Command::new(name).args(args.iter().copied());
        conn.execute(&cmd).await.unwrap()
    }

    fn bulks(items: &[&str]) -> RespValue {
        RespValue::array(items.iter().map(|s| RespValue::bulk_string(*s)).collect())
    }

    #[tokio::test]
    async fn test_log_is_shared_between_clones() {
        let mut conn = MemoryConnection::new();
        let observer = conn.clone();
        run(&mut conn, &["SET", "a", "1"]).await;
        run(&mut conn, &["GET", "a"]).await;
        assert_eq!(observer.command_names().await, vec!["SET", "GET"]);
        assert!(observer.contains_key("a").await);
        observer.clear_log().await;
        assert_eq!(observer.command_count().await, 0);
    }

    #[tokio::test]
    async fn test_wrong_type() {
        let mut conn = MemoryConnection::new();
        run(&mut conn, &["SET", "k", "v"]).await;
        let reply = run(&mut conn, &["SADD", "k", "m"]).await;
        assert!(matches!(reply, RespValue::Error(e) if e.starts_with("WRONGTYPE")));
        assert_eq!(
            run(&mut conn, &["TYPE", "k"]).await,
            RespValue::simple_string("string")
        );
    }

    #[tokio::test]
    async fn test_unknown_command() {
        let mut conn = MemoryConnection::new();
        let reply = run(&mut conn, &["FLUSHALL"]).await;
        assert!(matches!(reply, RespValue::Error(e) if e.contains("unknown command")));
    }

    #[tokio::test]
    async fn test_zrangebyscore_limit_and_exclusive() {
        let mut conn = MemoryConnection::new();
        run(&mut conn, &["ZADD", "z", "1", "a", "2", "b", "3", "c", "4", "d"]).await;
        assert_eq!(
            run(&mut conn, &["ZRANGEBYSCORE", "z", "(1", "+inf", "LIMIT", "1", "2"]).await,
            bulks(&["c", "d"])
        );
    }

    #[tokio::test]
    async fn test_rpoplpush_rotates_a_single_list() {
        let mut conn = MemoryConnection::new();
        run(&mut conn, &["LPUSH", "l", "c", "b", "a"]).await;
        assert_eq!(
            run(&mut conn, &["RPOPLPUSH", "l", "l"]).await,
            RespValue::bulk_string("c")
        );
        assert_eq!(
            run(&mut conn, &["LRANGE", "l", "0", "-1"]).await,
            bulks(&["c", "a", "b"])
        );
    }

    #[tokio::test]
    async fn test_hincrby_rejects_non_integers() {
        let mut conn = MemoryConnection::new();
        assert_eq!(
            run(&mut conn, &["HINCRBY", "h", "n", "5"]).await,
            RespValue::integer(5)
        );
        assert_eq!(
            run(&mut conn, &["HINCRBY", "h", "n", "-7"]).await,
            RespValue::integer(-2)
        );
        let reply = run(&mut conn, &["HINCRBY", "h", "n", "x"]).await;
        assert!(matches!(reply, RespValue::Error(_)));
    }

    #[tokio::test]
    async fn test_sintercard_limit() {
        let mut conn = MemoryConnection::new();
        run(&mut conn, &["SADD", "a", "1", "2", "3"]).await;
        run(&mut conn, &["SADD", "b", "2", "3", "4"]).await;
        assert_eq!(
            run(&mut conn, &["SINTERCARD", "2", "a", "b"]).await,
            RespValue::integer(2)
        );
        assert_eq!(
            run(&mut conn, &["SINTERCARD", "2", "a", "b", "LIMIT", "1"]).await,
            RespValue::integer(1)
        );
        assert_eq!(
            run(&mut conn, &["SINTERCARD", "2", "a", "missing"]).await,
            RespValue::integer(0)
        );
    }
}
