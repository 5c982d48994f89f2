use std::time::Duration;

use herdbook_core::locking::SWEEP_INTERVAL_SECS;

/// Worker configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// SQLite database URL (default: `sqlite://herdbook.db`).
    pub database_url: String,
    /// How often the lease sweeper runs (default: 60 seconds).
    pub sweep_interval: Duration,
}

impl WorkerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var               | Default               |
    /// |-----------------------|-----------------------|
    /// | `DATABASE_URL`        | `sqlite://herdbook.db`|
    /// | `SWEEP_INTERVAL_SECS` | `60`                  |
    ///
    /// Unset or malformed values fall back to the default.
    pub fn from_env() -> Self {
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://herdbook.db".into());

        let sweep_interval_secs: u64 = std::env::var("SWEEP_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(SWEEP_INTERVAL_SECS);

        Self {
            database_url,
            sweep_interval: Duration::from_secs(sweep_interval_secs),
        }
    }
}
