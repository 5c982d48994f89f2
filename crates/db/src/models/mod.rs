//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - Query-parameter structs where the table supports filtered queries

pub mod audit;
pub mod lock;
pub mod record;

pub use audit::{AuditEvent, AuditEventPage, AuditQuery, CreateAuditEvent};
pub use lock::RecordLock;
pub use record::{CreateRecord, StoredRecord};
