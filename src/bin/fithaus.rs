//! FitHaus maintenance binary: connects, brings the schema up to date, checks
//! health and keeps the generation workers running until interrupted.

use fithaus::prelude::*;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load()?;
    let fithaus = FitHaus::new(&config).await?;

    let recreate = std::env::args().any(|arg| arg == "--recreate");
    fithaus.migrate(recreate).await?;
    fithaus.health_check().await?;

    fithaus.events().add_callback(|event: &JobEvent| {
        tracing::info!(
            job_id = %event.job_id,
            job = %event.job_name,
            kind = ?event.kind,
            detail = event.detail.as_deref().unwrap_or(""),
            "job event"
        );
    });

    tracing::info!(
        default_limit = config.query.default_limit,
        unknown_keys = ?config.query.unknown_keys,
        workers = config.generation.workers,
        "fithaus ready"
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown requested");
    fithaus.shutdown().await;
    Ok(())
}
