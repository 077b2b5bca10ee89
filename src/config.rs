use crate::error::{TrolError, TrolResult};
use std::time::Duration;
use url::{Host, Url};

/// Connection settings for a [`Client`](crate::connection::Client).
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Logical database selected after connecting.
    pub db: u32,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Sent with `CLIENT SETNAME` when set.
    pub client_name: Option<String>,
    pub connect_timeout: Duration,
    /// `None` waits for replies indefinitely.
    pub response_timeout: Option<Duration>,
    pub loglevel: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: "127.0.0.1".to_string(),
            port: 6379,
            db: 0,
            username: None,
            password: None,
            client_name: None,
            connect_timeout: Duration::from_secs(5),
            response_timeout: None,
            loglevel: "info".to_string(),
        }
    }
}

impl Config {
    /// Build a config from `--flag value` pairs. Unknown flags are an error;
    /// positional arguments are returned untouched.
    pub fn from_args(args: &[String]) -> TrolResult<(Self, Vec<String>)> {
        let mut config = Config::default();
        let mut rest = Vec::new();
        let mut i = 0;
        while i < args.len() {
            let flag = args[i].as_str();
            if !flag.starts_with("--") {
                rest.push(args[i].clone());
                i += 1;
                continue;
            }
            let value = args
                .get(i + 1)
                .ok_or_else(|| TrolError::Config(format!("missing value for {flag}")))?;
            match flag {
                "--url" => config = Config::from_url(value)?,
                "--host" => config.host = value.clone(),
                "--port" => config.port = parse_number(flag, value)?,
                "--db" => config.db = parse_number(flag, value)?,
                "--user" => config.username = Some(value.clone()),
                "--password" => config.password = Some(value.clone()),
                "--name" => config.client_name = Some(value.clone()),
                "--connect-timeout" => {
                    config.connect_timeout = Duration::from_millis(parse_number(flag, value)?)
                }
                "--response-timeout" => {
                    config.response_timeout =
                        Some(Duration::from_millis(parse_number(flag, value)?))
                }
                "--loglevel" => config.loglevel = value.clone(),
                _ => return Err(TrolError::Config(format!("unknown option {flag}"))),
            }
            i += 2;
        }
        Ok((config, rest))
    }

    /// Parse `redis://[user[:password]@]host[:port][/db]`. Credentials may be
    /// percent-encoded; IPv6 hosts go in brackets.
    pub fn from_url(raw: &str) -> TrolResult<Self> {
        let invalid = |why: &str| TrolError::Config(format!("{raw:?}: {why}"));
        let url = Url::parse(raw).map_err(|e| invalid(&e.to_string()))?;
        if url.scheme() != "redis" {
            return Err(invalid("expected the redis:// scheme"));
        }

        let mut config = Config::default();
        config.host = match url.host() {
            Some(Host::Domain(name)) if !name.is_empty() => name.to_string(),
            Some(Host::Ipv4(addr)) => addr.to_string(),
            Some(Host::Ipv6(addr)) => addr.to_string(),
            _ => return Err(invalid("missing host")),
        };
        if let Some(port) = url.port() {
            config.port = port;
        }

        let decode = |part: &str| {
            urlencoding::decode(part)
                .map(|s| s.into_owned())
                .map_err(|_| invalid("credentials are not valid UTF-8"))
        };
        if !url.username().is_empty() {
            config.username = Some(decode(url.username())?);
        }
        if let Some(password) = url.password() {
            config.password = Some(decode(password)?);
        }

        let db = url.path().trim_start_matches('/');
        if !db.is_empty() {
            config.db = db.parse().map_err(|_| invalid("invalid database index"))?;
        }

        Ok(config)
    }

    /// `host:port`, with IPv6 hosts bracketed.
    pub fn addr(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

fn parse_number<T: std::str::FromStr>(flag: &str, value: &str) -> TrolResult<T> {
    value
        .parse()
        .map_err(|_| TrolError::Config(format!("invalid value for {flag}: {value:?}")))
}
