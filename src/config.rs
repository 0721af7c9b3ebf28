use anyhow::{Context, Result};
use clap::Parser;
use std::{env, str::FromStr, time::Duration};

use crate::models::connection::ConnectionParameters;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Request body limit for uploads, in MiB.
    pub max_upload_mb: usize,
    /// Upper bound for every call made against the emulator.
    pub request_timeout: Duration,
    /// Account used to derive queue URLs and policy ARNs.
    pub account_id: String,
    /// Connection offered to the UI as its initial form values.
    pub default_connection: ConnectionParameters,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Web console backend for local AWS emulators")]
pub struct Args {
    /// Host to bind to (overrides CONSOLE_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides CONSOLE_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Maximum upload size in MiB (overrides CONSOLE_MAX_UPLOAD_MB)
    #[arg(long)]
    pub max_upload_mb: Option<usize>,

    /// Timeout for each emulator call in seconds (overrides CONSOLE_REQUEST_TIMEOUT_SECS)
    #[arg(long)]
    pub request_timeout_secs: Option<u64>,

    /// Account id of the emulator (overrides CONSOLE_ACCOUNT_ID)
    #[arg(long)]
    pub account_id: Option<String>,

    /// Default emulator endpoint (overrides AWS_ENDPOINT_URL)
    #[arg(long)]
    pub endpoint: Option<String>,
}

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_UPLOAD_MB: usize = 512;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_ACCOUNT_ID: &str = "000000000000";
const DEFAULT_ENDPOINT: &str = "http://localhost:4566";
const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_CREDENTIAL: &str = "test";

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        Self::merge(Args::parse(), |name| env::var(name))
    }

    /// Merge CLI arguments over values read through `lookup`.
    fn merge<F>(args: Args, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Result<String, env::VarError>,
    {
        let text = |name: &str, default: &str| lookup(name).unwrap_or_else(|_| default.into());

        let env_port = parsed(&lookup, "CONSOLE_PORT", DEFAULT_PORT)?;
        let env_upload = parsed(&lookup, "CONSOLE_MAX_UPLOAD_MB", DEFAULT_MAX_UPLOAD_MB)?;
        let env_timeout = parsed(&lookup, "CONSOLE_REQUEST_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;

        let default_connection = ConnectionParameters {
            endpoint: args
                .endpoint
                .unwrap_or_else(|| text("AWS_ENDPOINT_URL", DEFAULT_ENDPOINT)),
            region: text("AWS_DEFAULT_REGION", DEFAULT_REGION),
            access_key: text("AWS_ACCESS_KEY_ID", DEFAULT_CREDENTIAL),
            secret_key: text("AWS_SECRET_ACCESS_KEY", DEFAULT_CREDENTIAL),
            force_path_style: true,
        };

        let timeout_secs = args.request_timeout_secs.unwrap_or(env_timeout);
        if timeout_secs == 0 {
            anyhow::bail!("request timeout must be at least one second");
        }

        Ok(Self {
            host: args.host.unwrap_or_else(|| text("CONSOLE_HOST", DEFAULT_HOST)),
            port: args.port.unwrap_or(env_port),
            max_upload_mb: args.max_upload_mb.unwrap_or(env_upload),
            request_timeout: Duration::from_secs(timeout_secs),
            account_id: args
                .account_id
                .unwrap_or_else(|| text("CONSOLE_ACCOUNT_ID", DEFAULT_ACCOUNT_ID)),
            default_connection,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

fn parsed<F, T>(lookup: &F, name: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Result<String, env::VarError>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(name) {
        Ok(value) => value
            .parse::<T>()
            .with_context(|| format!("parsing {name} value `{value}`")),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err).with_context(|| format!("reading {name}")),
    }
}
