//! Periodic reclamation of expired leases.
//!
//! `check_lock` already self-heals stale rows it encounters, but a lease on
//! a record nobody contends for would otherwise linger forever. The sweeper
//! clears those in bulk. With the dedicated lock table this is O(lock rows)
//! per pass, not O(all records).

use std::time::Duration;

use chrono::Utc;
use herdbook_db::repositories::LockRepo;
use herdbook_db::DbPool;
use tokio_util::sync::CancellationToken;

/// One stateless sweep pass: release every expired lease.
///
/// Returns the number of leases reclaimed.
pub async fn sweep(pool: &DbPool) -> Result<u64, sqlx::Error> {
    LockRepo::release_expired(pool, Utc::now()).await
}

/// Run the sweeper loop on a fixed interval until `cancel` is triggered.
///
/// Sweep failures are logged and the loop keeps going; a transiently
/// unavailable store must not kill the maintenance task.
pub async fn run(pool: DbPool, every: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = every.as_secs(), "Lease sweeper started");

    let mut interval = tokio::time::interval(every);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Lease sweeper stopping");
                break;
            }
            _ = interval.tick() => {
                match sweep(&pool).await {
                    Ok(released) => {
                        if released > 0 {
                            tracing::info!(released, "Lease sweeper: reclaimed expired leases");
                        } else {
                            tracing::debug!("Lease sweeper: nothing to reclaim");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Lease sweeper: pass failed");
                    }
                }
            }
        }
    }
}
