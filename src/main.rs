//! Wilayah main entry point
//!
//! This is the command-line interface for mirroring and serving Indonesian
//! administrative-region reference data.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use wilayah::config::{load_config_or_default, validate, Config};
use wilayah::crawler::{run_crawl, CrawlPlan};
use wilayah::output::{load_statistics, print_statistics};

/// Wilayah: Indonesian administrative-region reference data
///
/// Wilayah mirrors the province, regency, district and village listings of a
/// slow origin API to local storage, and serves lookups through a tiered
/// cache.
#[derive(Parser, Debug)]
#[command(name = "wilayah")]
#[command(version)]
#[command(about = "Indonesian administrative-region mirror", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, global = true, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download region listings from the origin into local storage
    Fetch(FetchArgs),

    /// Serve region lookups over HTTP
    Serve(ServeArgs),

    /// Show what the local store holds and exit
    Stats,
}

#[derive(Args, Debug)]
struct FetchArgs {
    /// Fetch the whole tree, province by province
    #[arg(long)]
    all: bool,

    /// Fetch one province's regencies, districts and villages (2 digits)
    #[arg(long, value_name = "CODE")]
    province: Option<String>,

    /// Fetch one regency's districts and villages (4 digits)
    #[arg(long, value_name = "CODE")]
    regency: Option<String>,

    /// Fetch one district's villages (7 digits)
    #[arg(long, value_name = "CODE")]
    district: Option<String>,

    /// Re-download listings that are already stored
    #[arg(long)]
    force: bool,
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Address to listen on (overrides server.bind)
    #[arg(long, value_name = "ADDR")]
    bind: Option<SocketAddr>,

    /// CDN mirror base URL (overrides mirror.base-url)
    #[arg(long, env = "WILAYAH_BASE_URL", value_name = "URL")]
    mirror_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    let (mut config, config_hash) = match load_config_or_default(cli.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };
    match (&cli.config, config_hash) {
        (Some(path), Some(hash)) => tracing::info!(
            "Configuration loaded from {} (hash: {})",
            path.display(),
            hash
        ),
        _ => tracing::debug!("No configuration file given; using defaults"),
    }

    match cli.command {
        Command::Fetch(args) => handle_fetch(&config, args).await,
        Command::Serve(args) => {
            if let Some(url) = args.mirror_url {
                config.mirror.base_url = Some(url);
            }
            if let Some(bind) = args.bind {
                config.server.bind = bind.to_string();
            }
            validate(&config).context("invalid server settings")?;
            handle_serve(&config).await
        }
        Command::Stats => handle_stats(&config).await,
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("wilayah=info,warn"),
            1 => EnvFilter::new("wilayah=debug,info"),
            2 => EnvFilter::new("wilayah=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the `fetch` command: exits 0 on completion, 1 on abort, 2 on bad codes
async fn handle_fetch(config: &Config, args: FetchArgs) -> anyhow::Result<()> {
    let plan = match CrawlPlan::from_flags(
        args.all,
        args.province.as_deref(),
        args.regency.as_deref(),
        args.district.as_deref(),
        args.force,
    ) {
        Ok(plan) => plan,
        Err(e) => {
            tracing::error!("[ERROR] {}", e);
            std::process::exit(2);
        }
    };

    if plan.force {
        tracing::info!("Force mode: stored listings will be re-downloaded");
    }

    let outcome = run_crawl(config, &plan)
        .await
        .context("failed to set up crawl")?;
    std::process::exit(outcome.exit_code());
}

/// Handles the `serve` command
async fn handle_serve(config: &Config) -> anyhow::Result<()> {
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("invalid bind address '{}'", config.server.bind))?;

    wilayah::server::serve(config, addr)
        .await
        .context("query server error")?;

    Ok(())
}

/// Handles the `stats` command
async fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let stats = load_statistics(config)
        .await
        .context("failed to read the local store")?;

    print_statistics(&stats);

    Ok(())
}
