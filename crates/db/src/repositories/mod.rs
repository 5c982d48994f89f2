//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&SqlitePool` as the first argument and dispatch over the
//! [`EntityKind`](herdbook_core::entities::EntityKind) registry.

pub mod audit_repo;
pub mod lock_repo;
pub mod record_repo;

pub use audit_repo::AuditRepo;
pub use lock_repo::LockRepo;
pub use record_repo::RecordRepo;
