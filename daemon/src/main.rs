//! Stakeway daemon: entry point for running the staking service.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use stakeway_node::{init_logging, LogFormat, NodeConfig, StakewayNode};
use stakeway_store::LedgerStore;
use stakeway_store_lmdb::integrity::check_data_dir;
use stakeway_store_lmdb::LmdbEnvironment;
use stakeway_types::SystemClock;

#[derive(Parser)]
#[command(name = "stakeway-daemon", about = "Stakeway staking service daemon")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "STAKEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Address for the HTTP API, e.g. "0.0.0.0:8080".
    #[arg(long, env = "STAKEWAY_LISTEN_ADDR")]
    listen_addr: Option<SocketAddr>,

    /// Data directory for ledger storage.
    #[arg(long, env = "STAKEWAY_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "STAKEWAY_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "STAKEWAY_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Disable the Prometheus `/metrics` endpoint.
    #[arg(long, env = "STAKEWAY_DISABLE_METRICS")]
    disable_metrics: bool,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Serve the HTTP API until SIGINT/SIGTERM.
    Run,
    /// Verify the ledger database and print a summary.
    #[command(name = "check-db")]
    CheckDb,
}

/// Start from the config file (or defaults) and apply CLI/env overrides.
fn resolve_config(cli: &Cli) -> anyhow::Result<NodeConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let path_str = path.to_str().context("config path is not valid UTF-8")?;
            NodeConfig::from_toml_file(path_str)
                .with_context(|| format!("loading config from {}", path.display()))?
        }
        None => NodeConfig::default(),
    };

    if let Some(addr) = cli.listen_addr {
        config.listen_addr = addr;
    }
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    if cli.disable_metrics {
        config.enable_metrics = false;
    }

    Ok(config)
}

async fn run(config: NodeConfig) -> anyhow::Result<()> {
    tracing::info!(
        "Starting Stakeway node (HTTP:{}, data:{}, metrics:{})",
        config.listen_addr,
        config.data_dir.display(),
        if config.enable_metrics { "on" } else { "off" },
    );

    let mut node = StakewayNode::new(config).context("failed to open node")?;
    node.run().await.context("node exited with an error")?;
    Ok(())
}

fn check_db(config: &NodeConfig) -> anyhow::Result<()> {
    check_data_dir(&config.data_dir).map_err(anyhow::Error::msg)?;
    if !config.data_dir.exists() {
        anyhow::bail!("no ledger at {}", config.data_dir.display());
    }

    let env = LmdbEnvironment::open(&config.data_dir, config.map_size_bytes()?)
        .with_context(|| format!("opening ledger at {}", config.data_dir.display()))?;
    let report = env.check_integrity()?;
    let stakes = env.ledger_store(Arc::new(SystemClock)).stake_count()?;

    println!("ledger:        {}", config.data_dir.display());
    println!("databases:     {}", report.databases_checked);
    println!("entries:       {}", report.total_entries);
    println!("stake records: {}", report.stake_records);
    println!("stakes:        {stakes}");
    println!("wallets:       {}", report.wallets);

    if report.is_healthy() {
        println!("status:        ok");
        Ok(())
    } else {
        for error in &report.errors {
            println!("error:         {error}");
        }
        anyhow::bail!("{} integrity problem(s) found", report.errors.len())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    init_logging(config.log_format, &config.log_level)?;

    match cli.command {
        Command::Run => run(config).await,
        Command::CheckDb => check_db(&config),
    }
}
