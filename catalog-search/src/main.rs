use clap::Parser;
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use catalog_search::cli::{Cli, Command, SearchArgs};
use catalog_search::{AppError, Dependencies, LogFormat, Settings};
use catalog_search_shared::EntityType;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    init_tracing(settings.log_format);

    if let Err(e) = run(cli, settings).await {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Logs go to stderr so `search` output on stdout stays parseable.
fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

async fn run(cli: Cli, settings: Settings) -> Result<(), AppError> {
    let deps = Dependencies::new(&settings).await?;
    match cli.command {
        Command::Serve => serve(deps, settings.resync_on_start).await,
        Command::Resync { entity } => resync(deps, entity).await,
        Command::Search(args) => search(deps, args).await,
    }
}

async fn serve(deps: Dependencies, resync_on_start: bool) -> Result<(), AppError> {
    info!("Starting catalog search");
    let monitor = deps.monitor();
    for (entity_type, available) in monitor.start(resync_on_start).await {
        if !available {
            warn!(entity_type = %entity_type, "Search index not ready; queries will use the store");
        }
    }

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let monitor_handle = tokio::spawn(async move { monitor.run(shutdown_rx).await });

    tokio::signal::ctrl_c().await?;
    info!("Received shutdown signal");
    let _ = shutdown_tx.send(());
    let _ = monitor_handle.await;

    info!("Catalog search shutdown complete");
    Ok(())
}

async fn resync(deps: Dependencies, entity: Option<EntityType>) -> Result<(), AppError> {
    let targets: Vec<EntityType> = match entity {
        Some(entity_type) => vec![entity_type],
        None => deps.engines.entity_types().collect(),
    };

    let mut first_error = None;
    for entity_type in targets {
        if !deps.registrar.ensure_index(entity_type).await {
            warn!(entity_type = %entity_type, "Skipping resync of unavailable index");
            continue;
        }
        match deps.synchronizer.resync(entity_type).await {
            Ok(summary) => info!(
                entity_type = %entity_type,
                total = summary.total,
                failed = summary.failed,
                "Resync finished"
            ),
            Err(e) => {
                error!(entity_type = %entity_type, error = %e, "Resync failed");
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

async fn search(deps: Dependencies, args: SearchArgs) -> Result<(), AppError> {
    deps.registrar.ensure_index(args.entity).await;
    let envelope = deps.service.search(args.entity, &args.raw_query()).await?;
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}
