use anyhow::{Context, Result};
use epex_imbalance::config::Config;
use epex_imbalance::logging::init_logging;
use epex_imbalance::schedule::PollSchedule;
use epex_imbalance::sensor::{EpexImbalanceSensor, SensorRunner};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    init_logging(&config.logging).context("Failed to initialize logging")?;

    info!(
        "epex-imbalance {} starting; sensor '{}', dataset {}/{}, sign {:?}",
        env!("APP_VERSION"),
        config.name,
        config.imbalance.dataset_id,
        config.imbalance.price_field,
        config.combine_sign
    );

    let sensor = Arc::new(
        EpexImbalanceSensor::from_config(&config).context("Failed to create sensor")?,
    );
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    #[cfg(feature = "web")]
    let web_task = if config.web.enabled {
        let state = epex_imbalance::web::AppState {
            sensor: sensor.clone(),
            config: Arc::new(config.clone()),
        };
        let host = config.web.host.clone();
        let port = config.web.port;
        Some(tokio::spawn(async move {
            if let Err(e) = epex_imbalance::web::serve(state, &host, port).await {
                error!("{}", e);
            }
        }))
    } else {
        None
    };
    #[cfg(not(feature = "web"))]
    let web_task: Option<tokio::task::JoinHandle<()>> = None;

    let runner = SensorRunner::new(sensor, PollSchedule::from_config(&config.schedule));
    let runner_task = tokio::spawn(runner.run(shutdown_rx));

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutting down");
    let _ = shutdown_tx.send(true);

    if let Err(e) = runner_task.await {
        error!("Poll loop ended abnormally: {}", e);
    }
    if let Some(task) = web_task {
        task.abort();
    }

    info!("Shutdown complete");
    Ok(())
}
