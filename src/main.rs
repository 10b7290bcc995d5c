use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use parkwatch::config::Config;
use parkwatch::models::Snapshot;
use parkwatch::scheduler::Scheduler;
use parkwatch::store::SnapshotStore;

#[derive(Parser)]
#[command(
    name = "parkwatch",
    version,
    about = "Live occupancy collector for the Aix-en-Provence SEMEPA parking facilities",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the collector daemon (background sweeps until interrupted)
    Run,

    /// Run one sweep, publish it, and print the result
    Sweep,

    /// Print the last persisted snapshot without fetching anything
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;
    config.validate()?;

    let format = cli
        .log_format
        .clone()
        .unwrap_or_else(|| config.logging.format.clone());
    setup_tracing(&format, &config.logging.level, cli.verbose)?;

    match cli.command {
        Commands::Run => run(config).await?,
        Commands::Sweep => sweep(config).await?,
        Commands::Status => status(config).await?,
    }

    Ok(())
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("parkwatch=debug,info")
    } else {
        tracing_subscriber::EnvFilter::new(format!("parkwatch={level},warn"))
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    Ok(())
}

async fn run(config: Config) -> Result<()> {
    tracing::info!(
        facilities = config.facilities.len(),
        interval_secs = config.schedule.interval_secs,
        "parkwatch starting"
    );

    let scheduler = Scheduler::from_config(&config)?;
    scheduler.start().await;

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown requested");
    scheduler.stop().await;

    Ok(())
}

async fn sweep(config: Config) -> Result<()> {
    let scheduler = Scheduler::from_config(&config)?;
    let snapshot = scheduler.refresh().await;
    print_snapshot(&snapshot, &config)?;
    Ok(())
}

async fn status(config: Config) -> Result<()> {
    let store = SnapshotStore::with_dir(&config.store.data_dir);
    store.load().await;

    match store.read().await {
        Some(snapshot) => {
            print_snapshot(&snapshot, &config)?;
            println!("\nSnapshot age: {}s", snapshot.age_seconds());
        }
        None => println!("No snapshot available yet. Run `parkwatch sweep` first."),
    }

    Ok(())
}

fn print_snapshot(snapshot: &Snapshot, config: &Config) -> Result<()> {
    let tz = config.timezone()?;

    println!(
        "Parkings: {}/{} open, {} places available, updated {}",
        snapshot.open_count(),
        snapshot.len(),
        snapshot.total_available(),
        snapshot.taken_in(tz).format("%d/%m/%Y %H:%M:%S")
    );

    // Most available first, the way the status boards order them
    let mut entries: Vec<_> = snapshot.entries.iter().collect();
    entries.sort_by(|a, b| b.available.cmp(&a.available));

    for entry in entries {
        println!(
            "  {:<12} {:>12}  {:<11} {}",
            entry.facility,
            entry.display,
            entry.state.to_string(),
            entry.observed_in(tz).format("%H:%M:%S")
        );
    }

    Ok(())
}
