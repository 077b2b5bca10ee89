use std::process::ExitCode;
use trol::command::Command;
use trol::config::Config;
use trol::connection::{Client, Connection};
use trol::error::TrolResult;
use trol::key::{self, Identity, KeyPath};
use trol::resp::RespValue;
use tracing::error;

const USAGE: &str = "usage:
  trol key <Model> <identity> <field>   print the derived key
  trol parse <key>                      split a key into its parts
  trol get <key> [--host h --port p ...]   GET a key from a server
  trol type <key> [--host h --port p ...]  TYPE of a key on a server";

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (config, positional) = match Config::from_args(&args) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.loglevel)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&config, &positional).await {
        Ok(Some(output)) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Ok(None) => {
            eprintln!("{USAGE}");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &Config, args: &[String]) -> TrolResult<Option<String>> {
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    match args.as_slice() {
        ["key", model, identity, field] => {
            key::validate_name(model)?;
            key::validate_name(field)?;
            let identity = Identity::new(*identity)?;
            Ok(Some(KeyPath::field(model, &identity, field)?.render()))
        }
        ["parse", raw] => Ok(Some(describe(&KeyPath::parse(raw)?))),
        ["get", raw] => {
            let reply = remote(config, Command::new("GET").arg(*raw)).await?;
            Ok(Some(match reply.as_bytes() {
                Some(data) => String::from_utf8_lossy(data).into_owned(),
                None => "(nil)".to_string(),
            }))
        }
        ["type", raw] => {
            let reply = remote(config, Command::new("TYPE").arg(*raw)).await?;
            Ok(reply.to_string_lossy())
        }
        _ => Ok(None),
    }
}

fn describe(path: &KeyPath) -> String {
    match path {
        KeyPath::Global { field } => format!("field={field}"),
        KeyPath::Entity { model, identity } => format!("model={model} identity={identity}"),
        KeyPath::Field {
            model,
            identity,
            field,
        } => format!("model={model} identity={identity} field={field}"),
    }
}

async fn remote(config: &Config, command: Command) -> TrolResult<RespValue> {
    let mut client = Client::connect(config).await?;
    let reply = client.execute(&command).await?;
    client.close().await?;
    match reply {
        RespValue::Error(msg) => Err(trol::error::TrolError::Server(msg)),
        reply => Ok(reply),
    }
}
