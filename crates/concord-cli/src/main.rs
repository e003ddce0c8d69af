//! Concord command-line entry point.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use concord_config::ConcordConfig;
use concord_esi::EsiClient;
use concord_sync::{SyncScheduler, SyncService};

mod registry;

use registry::{FileRegistry, LogNotifier};

#[derive(Parser)]
#[command(name = "concord", about = "Contact standings synchronization", version)]
struct Cli {
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one sync round over all registered actors.
    Run {
        /// Path to the registry TOML file (actors + standings).
        #[arg(long, default_value = "concord.toml")]
        registry: PathBuf,
    },
    /// Print the resolved configuration.
    CheckConfig,
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("concord error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let config = ConcordConfig::load_with_dotenv()?;

    match cli.command {
        Commands::Run { registry } => run_sync_round(&config, &registry).await,
        Commands::CheckConfig => {
            println!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

async fn run_sync_round(config: &ConcordConfig, registry_path: &std::path::Path) -> anyhow::Result<()> {
    let registry = Arc::new(FileRegistry::load(registry_path)?);
    let gateway = Arc::new(EsiClient::new(&config.esi, &config.retry));

    let service = Arc::new(SyncService::new(
        gateway,
        Arc::clone(&registry) as Arc<dyn concord_sync::Authorization>,
        Arc::clone(&registry) as Arc<dyn concord_sync::CredentialStore>,
        Arc::clone(&registry) as Arc<dyn concord_sync::StandingsSource>,
        Arc::new(LogNotifier),
        config.sync.clone(),
    ));

    let mut scheduler = SyncScheduler::new(service);
    for actor in registry.actors() {
        scheduler.register(actor);
    }

    let reports = scheduler.run_round().await;
    for report in &reports {
        println!("{}: {:?}", report.actor_id, report.outcome);
    }
    println!("{} passes completed", reports.len());
    Ok(())
}

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_env("CONCORD_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
