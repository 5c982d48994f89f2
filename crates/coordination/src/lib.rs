//! Herdbook concurrent-edit coordination services.
//!
//! Multiple clients share one logical store with no server-enforced mutual
//! exclusion; this crate provides the advisory machinery that keeps their
//! edits from trampling each other:
//!
//! - [`LockManager`] — grants, renews, inspects, and releases time-bounded
//!   exclusive leases on records.
//! - [`sweeper`] — reclaims leases abandoned by crashed or closed clients.
//! - [`AuditTrail`] — best-effort append-only before/after history of every
//!   mutation.
//! - [`restore`] — reapplies a historical snapshot as a new update.

pub mod history;
pub mod manager;
pub mod restore;
pub mod sweeper;

pub use history::AuditTrail;
pub use manager::{Lease, LockManager, LockOutcome};
pub use restore::{restore_version, RestoreError, RestoredRecord};
