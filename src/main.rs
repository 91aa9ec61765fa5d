//! Command-line entry point: run one named operation and print the result.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use doapi::config::{ClientConfig, FileConfig};
use doapi::resource::dispatch;
use doapi::{Availability, Credentials, Manager};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// DigitalOcean API client
#[derive(Parser, Debug)]
#[command(name = "doapi", version, about, long_about = None)]
struct Args {
    /// API version to speak (1 or 2)
    #[arg(long)]
    api_version: Option<String>,

    /// API host (default: https://api.digitalocean.com)
    #[arg(long)]
    endpoint: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,

    /// List available operations
    #[arg(long)]
    list: bool,

    /// Operation to run, e.g. all_active_droplets
    operation: Option<String>,

    /// Positional arguments of the operation
    #[arg(allow_hyphen_values = true)]
    args: Vec<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_directive(self) -> Option<&'static str> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some("error"),
            LogLevel::Warn => Some("warn"),
            LogLevel::Info => Some("info"),
            LogLevel::Debug => Some("debug"),
            LogLevel::Trace => Some("trace"),
        }
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let directive = level.as_directive()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(err) => {
            eprintln!("Cannot open log file {:?}: {}", log_path, err);
            return None;
        },
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    // RUST_LOG wins over --log-level when set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("doapi={}", directive)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("doapi started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("doapi").join("doapi.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".doapi").join("doapi.log");
    }
    PathBuf::from("doapi.log")
}

/// Resolve configuration: CLI flag > environment > config file > default
fn build_config(args: &Args) -> Result<ClientConfig> {
    let mut config = FileConfig::load()
        .apply(ClientConfig::default())
        .context("Invalid config file")?
        .with_env()
        .context("Invalid environment configuration")?;

    if let Some(endpoint) = &args.endpoint {
        config = config.with_endpoint(endpoint)?;
    }
    if let Some(version) = &args.api_version {
        config = config.with_version(version.parse()?);
    }

    Ok(config)
}

fn print_operations() {
    println!("Operations:");
    for (name, _) in dispatch::OPERATIONS {
        if let Some(usage) = dispatch::usage(name) {
            println!("  {}", usage);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    let Some(operation) = args.operation.as_deref().filter(|_| !args.list) else {
        print_operations();
        return Ok(());
    };

    let config = build_config(&args)?;
    let credentials =
        Credentials::from_env(config.version).context("Failed to read API credentials")?;
    let manager = Manager::new(config, credentials).context("Failed to create API client")?;

    match dispatch::invoke(&manager, operation, &args.args).await? {
        Availability::Available(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
        },
        Availability::NotSupported { operation, version } => {
            println!("{} is not supported by API {}", operation, version);
        },
    }

    Ok(())
}
