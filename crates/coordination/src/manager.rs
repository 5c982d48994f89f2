//! Lease-based exclusive record locking.
//!
//! Locking is advisory: it gates the editable form, not the store. The lease
//! TTL is the only timeout mechanism; an explicit unlock on form close is a
//! courtesy, expiry is the backstop. Contention is a normal outcome, never
//! an error, and a storage fault fails safe toward refusing the edit rather
//! than granting a false lease.

use chrono::{Duration, Utc};
use herdbook_core::entities::EntityKind;
use herdbook_core::error::CoreError;
use herdbook_core::locking::{validate_lease_ttl, DEFAULT_LEASE_TTL_MINS};
use herdbook_core::messages::UserMessage;
use herdbook_core::types::{DbId, Timestamp};
use herdbook_db::models::lock::RecordLock;
use herdbook_db::repositories::LockRepo;
use herdbook_db::DbPool;

// ---------------------------------------------------------------------------
// Lease
// ---------------------------------------------------------------------------

/// An active lease on a record as seen by a caller.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Lease {
    pub actor_id: String,
    pub actor_label: Option<String>,
    pub acquired_at: Timestamp,
    pub expires_at: Timestamp,
}

impl From<RecordLock> for Lease {
    fn from(lock: RecordLock) -> Self {
        Self {
            actor_id: lock.actor_id,
            actor_label: lock.actor_label,
            acquired_at: lock.acquired_at,
            expires_at: lock.expires_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Lock outcome
// ---------------------------------------------------------------------------

/// Outcome of a lock attempt.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LockOutcome {
    /// The lease was granted, renewed, or taken over from an expired holder.
    Granted(Lease),
    /// Another actor holds a live lease. Holder details are included when
    /// the row could still be read after the failed attempt.
    Held {
        holder_id: Option<String>,
        holder_label: Option<String>,
        expires_at: Option<Timestamp>,
    },
    /// The store could not be reached; the edit is refused.
    Unavailable,
}

impl LockOutcome {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted(_))
    }

    /// User-facing message for a denied attempt, `None` when granted.
    pub fn denial_message(&self) -> Option<UserMessage> {
        match self {
            Self::Granted(_) => None,
            Self::Held {
                holder_id,
                holder_label,
                ..
            } => {
                let holder = holder_label
                    .as_deref()
                    .or(holder_id.as_deref())
                    .unwrap_or("another user");
                Some(UserMessage::warning(
                    "Record is being edited",
                    format!("This record is currently locked by {holder}. Try again later."),
                ))
            }
            Self::Unavailable => Some(UserMessage::error(
                "Could not lock record",
                "The local store is unavailable. The record was opened read-only.",
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// LockManager
// ---------------------------------------------------------------------------

/// Grants, renews, inspects, and releases leases on records.
pub struct LockManager {
    pool: DbPool,
    ttl: Duration,
}

impl LockManager {
    /// A manager with the default lease TTL.
    pub fn new(pool: DbPool) -> Self {
        Self::with_ttl(pool, Duration::minutes(DEFAULT_LEASE_TTL_MINS))
    }

    /// A manager with a caller-chosen lease TTL.
    pub fn with_ttl(pool: DbPool, ttl: Duration) -> Self {
        Self { pool, ttl }
    }

    /// A manager with a validated TTL in whole minutes (configuration path).
    pub fn with_ttl_minutes(pool: DbPool, minutes: i64) -> Result<Self, CoreError> {
        validate_lease_ttl(minutes)?;
        Ok(Self::with_ttl(pool, Duration::minutes(minutes)))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Inspect the lease on a record.
    ///
    /// Returns `None` when the record is unlocked or its lease has expired;
    /// an expired row is actively cleared on sight (idempotent self-healing)
    /// so later readers see a clean state.
    pub async fn check_lock(
        &self,
        kind: EntityKind,
        id: DbId,
    ) -> Result<Option<Lease>, sqlx::Error> {
        let now = Utc::now();
        let Some(lock) = LockRepo::get(&self.pool, kind, id).await? else {
            return Ok(None);
        };
        if lock.is_expired(now) {
            LockRepo::release_if_expired(&self.pool, kind, id, now).await?;
            return Ok(None);
        }
        Ok(Some(lock.into()))
    }

    /// Attempt to acquire (or renew) the lease on a record.
    ///
    /// A repeat call by the current holder always succeeds and advances the
    /// lease (keep-alive while a form stays open). Never returns an error:
    /// contention yields [`LockOutcome::Held`], and a storage fault is
    /// logged and yields [`LockOutcome::Unavailable`].
    pub async fn lock_record(
        &self,
        kind: EntityKind,
        id: DbId,
        actor_id: &str,
        actor_label: Option<&str>,
    ) -> LockOutcome {
        let now = Utc::now();
        match LockRepo::acquire(&self.pool, kind, id, actor_id, actor_label, now, self.ttl).await
        {
            Ok(Some(lock)) => {
                tracing::debug!(
                    entity_type = %kind,
                    entity_id = id,
                    actor_id,
                    expires_at = %lock.expires_at,
                    "Lease granted"
                );
                LockOutcome::Granted(lock.into())
            }
            Ok(None) => match LockRepo::get(&self.pool, kind, id).await {
                Ok(Some(holder)) => LockOutcome::Held {
                    holder_id: Some(holder.actor_id),
                    holder_label: holder.actor_label,
                    expires_at: Some(holder.expires_at),
                },
                // The holder released between our attempt and this read;
                // the caller may simply retry.
                Ok(None) => LockOutcome::Held {
                    holder_id: None,
                    holder_label: None,
                    expires_at: None,
                },
                Err(e) => {
                    tracing::warn!(error = %e, entity_type = %kind, entity_id = id, "Failed to read lock holder");
                    LockOutcome::Held {
                        holder_id: None,
                        holder_label: None,
                        expires_at: None,
                    }
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, entity_type = %kind, entity_id = id, "Lock acquisition failed");
                LockOutcome::Unavailable
            }
        }
    }

    /// Unconditionally release the lease on a record, regardless of holder.
    ///
    /// Intentionally permissive: callers invoke it from contexts that
    /// already hold (or believe they hold) the lease — modal close, unmount,
    /// post-save. It is not an enforcement point. No-op when unlocked.
    pub async fn unlock_record(&self, kind: EntityKind, id: DbId) -> Result<bool, sqlx::Error> {
        let released = LockRepo::release(&self.pool, kind, id).await?;
        if released {
            tracing::debug!(entity_type = %kind, entity_id = id, "Lease released");
        }
        Ok(released)
    }

    /// Release every expired lease across all entity kinds.
    ///
    /// Returns the number of leases reclaimed. Idempotent.
    pub async fn cleanup_expired_locks(&self) -> Result<u64, sqlx::Error> {
        LockRepo::release_expired(&self.pool, Utc::now()).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denial_message_names_holder_label() {
        let outcome = LockOutcome::Held {
            holder_id: Some("device-2".into()),
            holder_label: Some("Alice".into()),
            expires_at: None,
        };
        let message = outcome.denial_message().unwrap();
        assert!(message.body.contains("Alice"));
    }

    #[test]
    fn denial_message_falls_back_to_holder_id() {
        let outcome = LockOutcome::Held {
            holder_id: Some("device-2".into()),
            holder_label: None,
            expires_at: None,
        };
        assert!(outcome.denial_message().unwrap().body.contains("device-2"));
    }

    #[test]
    fn denial_message_handles_unknown_holder() {
        let outcome = LockOutcome::Held {
            holder_id: None,
            holder_label: None,
            expires_at: None,
        };
        assert!(outcome
            .denial_message()
            .unwrap()
            .body
            .contains("another user"));
    }

    #[test]
    fn granted_has_no_denial_message() {
        let outcome = LockOutcome::Granted(Lease {
            actor_id: "device-1".into(),
            actor_label: None,
            acquired_at: Utc::now(),
            expires_at: Utc::now(),
        });
        assert!(outcome.is_granted());
        assert!(outcome.denial_message().is_none());
    }
}
