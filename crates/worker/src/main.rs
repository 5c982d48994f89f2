//! Maintenance worker: runs the lease sweeper on a fixed interval so that
//! leases abandoned by crashed or closed clients are reclaimed without any
//! other actor having to contend for them first.

mod config;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "herdbook_worker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::WorkerConfig::from_env();
    tracing::info!(database_url = %config.database_url, "Worker starting");

    let pool = herdbook_db::create_pool(&config.database_url).await?;
    herdbook_db::MIGRATOR.run(&pool).await?;

    let cancel = CancellationToken::new();
    let sweeper = tokio::spawn(herdbook_coordination::sweeper::run(
        pool.clone(),
        config.sweep_interval,
        cancel.clone(),
    ));

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");
    cancel.cancel();
    let _ = sweeper.await;

    Ok(())
}
