use crate::command::Command;
use crate::config::Config;
use crate::error::{TrolError, TrolResult};
use crate::resp::{RespParser, RespValue};
use bytes::BytesMut;
use std::future::Future;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

/// Something that can run one command and return its raw reply.
///
/// Error replies from the server come back as `Ok(RespValue::Error(..))`;
/// only transport failures are `Err`.
pub trait Connection: Send + 'static {
    fn execute(&mut self, command: &Command) -> impl Future<Output = TrolResult<RespValue>> + Send;

    fn close(&mut self) -> impl Future<Output = TrolResult<()>> + Send {
        async { Ok(()) }
    }
}

/// A single TCP connection to a Redis server.
pub struct Client {
    stream: TcpStream,
    buf: BytesMut,
    addr: String,
    response_timeout: Option<Duration>,
    /// Set while a command is in flight and after any transport failure.
    broken: bool,
}

impl Client {
    /// Connect and run the handshake (`AUTH`, `SELECT`, `CLIENT SETNAME`)
    /// implied by `config`.
    pub async fn connect(config: &Config) -> TrolResult<Self> {
        let addr = config.addr();
        let stream = tokio::time::timeout(config.connect_timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| {
                TrolError::Io(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    format!("connecting to {addr} timed out"),
                ))
            })??;
        stream.set_nodelay(true)?;
        info!("Connected to {addr}");

        let mut client = Client {
            stream,
            buf: BytesMut::with_capacity(4096),
            addr,
            response_timeout: config.response_timeout,
            broken: false,
        };
        client.handshake(config).await?;
        Ok(client)
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Whether the stream is out of sync with the requests sent on it.
    pub fn is_broken(&self) -> bool {
        self.broken
    }

    async fn handshake(&mut self, config: &Config) -> TrolResult<()> {
        if let Some(password) = &config.password {
            let mut auth = Command::new("AUTH");
            if let Some(user) = &config.username {
                auth = auth.arg(user.as_str());
            }
            self.expect_ok(auth.arg(password.as_str())).await?;
        }
        if config.db != 0 {
            self.expect_ok(Command::new("SELECT").arg(config.db.to_string()))
                .await?;
        }
        if let Some(name) = &config.client_name {
            self.expect_ok(Command::new("CLIENT").arg("SETNAME").arg(name.as_str()))
                .await?;
        }
        Ok(())
    }

    async fn expect_ok(&mut self, command: Command) -> TrolResult<()> {
        match self.execute(&command).await? {
            RespValue::Error(msg) => Err(TrolError::Server(msg)),
            reply if reply.is_ok() => Ok(()),
            reply => Err(TrolError::UnexpectedReply {
                command: command.name().to_string(),
                reply,
            }),
        }
    }

    async fn send(&mut self, command: &Command) -> TrolResult<()> {
        self.stream.write_all(&command.to_resp().serialize()).await?;
        Ok(())
    }

    async fn read_response(&mut self) -> TrolResult<RespValue> {
        loop {
            if let Some(value) = RespParser::parse(&mut self.buf)? {
                return Ok(value);
            }
            if self.stream.read_buf(&mut self.buf).await? == 0 {
                return Err(TrolError::ConnectionClosed);
            }
        }
    }

    async fn round_trip(&mut self, command: &Command) -> TrolResult<RespValue> {
        self.send(command).await?;
        match self.response_timeout {
            Some(limit) => tokio::time::timeout(limit, self.read_response())
                .await
                .map_err(|_| TrolError::ResponseTimeout(limit))?,
            None => self.read_response().await,
        }
    }
}

impl Connection for Client {
    async fn execute(&mut self, command: &Command) -> TrolResult<RespValue> {
        if self.broken {
            return Err(TrolError::ConnectionBroken(self.addr.clone()));
        }
        // Cleared only once the reply is fully read; a future dropped
        // mid-flight leaves the client unusable.
        self.broken = true;
        let result = self.round_trip(command).await;
        match &result {
            Ok(_) => self.broken = false,
            Err(e) => warn!("{} to {} failed: {e}", command.name(), self.addr),
        }
        result
    }

    async fn close(&mut self) -> TrolResult<()> {
        if !self.broken {
            debug!("Closing connection to {}", self.addr);
            self.round_trip(&Command::new("QUIT")).await?;
        }
        self.stream.shutdown().await?;
        self.broken = true;
        Ok(())
    }
}
