use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use pd_manager::backend::ReservationClient;
use pd_manager::catalog::{CatalogSource, FileCatalog};
use pd_manager::config::{default_log_path, Config};
use pd_manager::host;
use pd_manager::manager::{LifecycleController, ResourceManager, UserInfo};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Physical device resource manager
#[derive(Parser, Debug)]
#[command(name = "pd-manager", version, about, long_about = None)]
struct Args {
    /// Config file (defaults to $PD_MANAGER_CONFIG, then the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve orchestrator requests as JSON lines on stdin/stdout
    Serve,
    /// Print the advertised resources and exit
    List {
        /// User name the listing is issued for
        #[arg(long, default_value = "pd-manager")]
        user: String,
    },
    /// Check the config and the resource catalog
    Check,
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
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

/// Logs go to a file: stdout carries the host protocol
fn setup_logging(
    level: LogLevel,
    log_path: &Path,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Cannot open log file {}: {}", log_path.display(), e);
            return None;
        },
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("pd-manager started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = Config::resolve_path(args.config.as_deref());
    let config = Config::load(&config_path);

    let log_path = config
        .as_ref()
        .map(|c| c.log_path())
        .unwrap_or_else(|_| default_log_path());
    let _log_guard = setup_logging(args.log_level, &log_path);

    let config = config.with_context(|| format!("Failed to load {}", config_path.display()))?;
    tracing::info!("Using config {}, catalog {}", config_path.display(), config.resources_file.display());

    let catalog = Arc::new(FileCatalog::new(&config.resources_file));

    match args.command {
        Command::Check => check(&catalog),
        Command::List { user } => {
            let manager = build_manager(&config, catalog)?;
            let resources = manager.list_resources(&UserInfo::new(&user)).await?;
            println!("{}", serde_json::to_string_pretty(&resources)?);
            Ok(())
        },
        Command::Serve => {
            let manager = build_manager(&config, catalog)?;
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            host::serve(&manager, stdin, tokio::io::stdout()).await
        },
    }
}

fn build_manager(config: &Config, catalog: Arc<FileCatalog>) -> Result<LifecycleController> {
    let client = ReservationClient::new(&config.user_agent, config.request_timeout())
        .context("Failed to create reservation client")?;
    Ok(LifecycleController::new(catalog, client))
}

fn check(catalog: &FileCatalog) -> Result<()> {
    let loaded = catalog
        .load()
        .with_context(|| format!("Invalid catalog {}", catalog.path().display()))?;

    let remote = loaded.iter().filter(|d| d.is_remote()).count();
    let unmapped: Vec<&str> = loaded
        .iter()
        .filter(|d| d.testbed().is_none())
        .map(|d| d.resource_id.as_str())
        .collect();

    println!(
        "{} resources, {} backed by a reservation service",
        loaded.len(),
        remote
    );
    if !unmapped.is_empty() {
        println!("Not advertised (unknown testbed): {}", unmapped.join(", "));
    }
    Ok(())
}
