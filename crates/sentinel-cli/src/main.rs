mod baselines;
mod check;
mod scan;
mod watch;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "sentinel")]
#[command(about = "Flash-trend detector for public Telegram channels")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Poll every watched channel once and alert on spikes
    Scan {
        /// Print alerts instead of sending them and leave cursors untouched
        #[arg(long)]
        dry_run: bool,
    },
    /// Scan on the `SENTINEL_WATCH_CRON` schedule until Ctrl-C
    Watch,
    /// Baseline table maintenance
    Baselines {
        #[command(subcommand)]
        command: BaselinesCommands,
    },
    /// Configuration helpers
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Debug, Subcommand)]
enum BaselinesCommands {
    /// Learn hourly rates from historical corpus shards
    Build {
        /// URL of a JSON corpus shard; repeat for several
        #[arg(long = "source", required = true)]
        sources: Vec<String>,

        /// Output path (defaults to `SENTINEL_BASELINE_PATH`)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigCommands {
    /// Validate the environment and monitor file and print a summary
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = sentinel_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Some(Commands::Scan { dry_run }) => {
            scan::run_scan_once(&config, dry_run, shutdown_signal()).await?;
        }
        Some(Commands::Watch) => watch::run_watch(config).await?,
        Some(Commands::Baselines {
            command: BaselinesCommands::Build { sources, output },
        }) => {
            let output = output.unwrap_or_else(|| config.baseline_path.clone());
            let count = baselines::run_baselines_build(
                &sources,
                &output,
                config.feed_request_timeout_secs,
            )
            .await?;
            println!("wrote {count} baselines to {}", output.display());
        }
        Some(Commands::Config {
            command: ConfigCommands::Check,
        }) => check::run_config_check(&config)?,
        None => println!("sentinel: no command given; see `sentinel --help`"),
    }

    Ok(())
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("received shutdown signal, finishing current window");
}
