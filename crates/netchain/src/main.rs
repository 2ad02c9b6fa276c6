//! Netchain demo binary.
//!
//! Fetches a session through the reference chain
//! `loading → decode → signing → transport` and prints it.
//!
//! # Usage
//!
//! ```bash
//! # Against the built-in stub transport (answers after two seconds)
//! netchain-demo
//!
//! # Against a real endpoint
//! NETCHAIN__TRANSPORT__BASE_URL=https://api.example.com netchain-demo
//!
//! # With a configuration file
//! netchain-demo --config netchain.toml
//! ```

use anyhow::{Context, Result};
use bytes::Bytes;
use netchain::prelude::*;
use netchain::{ConfigLoader, NetchainConfig};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Secret used by the stub signer when none is configured.
const DEMO_SECRET: &str = "netchain-demo-secret";

/// Delay before the stub transport answers.
const STUB_DELAY: Duration = Duration::from_secs(2);

/// Payload returned by the stub transport.
const STUB_SESSION: &[u8] = br#"{"token":"123456"}"#;

#[derive(Debug, Deserialize)]
struct Session {
    token: String,
}

/// Command line arguments.
struct Args {
    config_path: Option<PathBuf>,
    path: String,
}

impl Args {
    fn parse() -> Self {
        let mut args = std::env::args().skip(1);
        let mut config_path = None;
        let mut path = "/session".to_string();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    config_path = args.next().map(PathBuf::from);
                }
                "--path" | "-p" => {
                    if let Some(value) = args.next() {
                        path = value;
                    }
                }
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("netchain-demo {}", netchain::VERSION);
                    std::process::exit(0);
                }
                _ => {
                    eprintln!("Unknown argument: {arg}");
                    print_help();
                    std::process::exit(1);
                }
            }
        }

        Self { config_path, path }
    }
}

fn print_help() {
    println!(
        r"Netchain demo - fetch a session through a middleware chain

USAGE:
    netchain-demo [OPTIONS]

OPTIONS:
    -c, --config <PATH>    Path to configuration file (TOML or JSON)
    -p, --path <PATH>      Request path (default: /session)
    -h, --help             Print help information
    -v, --version          Print version information

ENVIRONMENT VARIABLES:
    NETCHAIN__SERVICE_NAME                Service name used in logs
    NETCHAIN__TRANSPORT__BASE_URL         Upstream base URL (stub transport if unset)
    NETCHAIN__TRANSPORT__TIMEOUT_MS       Request timeout in milliseconds
    NETCHAIN__SIGNING__ENABLED            Sign requests (true/false)
    NETCHAIN__SIGNING__SECRET             Signing secret
    NETCHAIN__LOGGING__LEVEL              Log level (trace, debug, info, warn, error)
    NETCHAIN__LOGGING__FORMAT             Log format (json, pretty)

EXAMPLES:
    # Run against the stub transport
    netchain-demo

    # Run against a real endpoint with signing
    NETCHAIN__TRANSPORT__BASE_URL=https://api.example.com \
    NETCHAIN__SIGNING__ENABLED=trueNETCHAIN__SIGNING__SECRET=s3cret \
    netchain-demo --path /session
"
    );
}

fn load_config(args: &Args) -> Result<NetchainConfig> {
    let mut loader = ConfigLoader::new().with_dotenv()?;
    if let Some(path) = &args.config_path {
        loader = loader
            .with_file(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
    }
    let config = loader.with_env_prefix("NETCHAIN").load()?;
    Ok(config)
}

/// Builds the provider: HTTP when a base URL is configured, otherwise a stub.
fn build_provider(config: &NetchainConfig) -> Result<Provider<Session>> {
    let chain = loading::middleware(LogIndicator::labelled("session"))
        .with(&decode::json::<Session>());

    if config.transport.base_url.is_some() {
        return Ok(Provider::from_config(chain, config)?);
    }

    let secret = config
        .signing
        .secret
        .clone()
        .unwrap_or_else(|| DEMO_SECRET.to_string());
    let signer = Sha256Signer::new(secret).with_header_name(&config.signing.header)?;
    let chain = telemetry::middleware(config.service_name.as_str())
        .with(&chain)
        .with(&signing::middleware(signer));

    let transport = FnTransport::new(|request: Request| async move {
        info!(
            http.method = %request.method(),
            http.url = %request.uri(),
            "Stub transport received request"
        );
        tokio::time::sleep(STUB_DELAY).await;
        Ok(Bytes::from_static(STUB_SESSION))
    });

    Ok(Provider::new(chain, transport))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    netchain::init_logging(&config.logging.to_log_config(&config.service_name))?;

    info!(
        version = netchain::VERSION,
        service = %config.service_name,
        base_url = config.transport.base_url.as_deref().unwrap_or("<stub>"),
        "Starting netchain demo"
    );

    let provider = build_provider(&config)?;
    info!(layers = ?provider.layer_names(), "Pipeline ready");

    let uri = args
        .path
        .parse()
        .with_context(|| format!("invalid request path '{}'", args.path))?;
    let session = provider.send(Request::get(uri)).await?;

    println!("Session token: {}", session.token);
    Ok(())
}
