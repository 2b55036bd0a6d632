use sb_server::error::ServerError;
use sb_server::{attach_health_routes, logger, registry_builder, shutdown};

use std::error::Error;

use log::{error, info, warn};
use sb_core::{Orchestrator, ReportedState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let config = sb_config::Config::load()?;
    config.validate()?;

    // Initialize logger (before any other logging)
    let log_file_path = logger::log_file_path(&config)?;
    logger::initialize(config.logging.level, log_file_path, config.logging.colored)?;

    info!("Starting serverbox v{}", env!("CARGO_PKG_VERSION"));
    config.log_summary();

    let orchestrator = Orchestrator::new();

    let registry = match registry_builder(&config).build(&config.servers).await {
        Ok(registry) => registry,
        Err(bring_up) => {
            let (partial, source) = bring_up.into_parts();
            error!("Bring-up failed, aborting {} server(s) already up", partial.len());
            if let Err(e) = orchestrator.abort_all(&partial).await {
                error!("Abort of partial bring-up: {e}");
            }
            return Err(ServerError::from(source).into());
        }
    };

    if registry.is_empty() {
        warn!("No servers configured, nothing to run");
        return Ok(());
    }

    attach_health_routes(&orchestrator, &registry).await?;

    if let Err(e) = orchestrator.register_all(&registry).await {
        warn!("Collector registration incomplete: {e}");
    }

    orchestrator.run_all(&registry);

    if let Err(e) = orchestrator
        .report_state_all(&registry, ReportedState::Up, "serving")
        .await
    {
        warn!("State report failed: {e}");
    }

    info!("serverbox ready, press Ctrl+C to stop");
    tokio::signal::ctrl_c().await.map_err(ServerError::Signal)?;
    info!("Received SIGINT (Ctrl+C), initiating graceful shutdown");

    if let Err(e) = orchestrator
        .report_state_all(&registry, ReportedState::Down, "shutting down")
        .await
    {
        warn!("State report failed: {e}");
    }

    shutdown(&orchestrator, &registry, config.shutdown.timeout()).await;

    Ok(())
}
