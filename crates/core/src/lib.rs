//! Herdbook domain core.
//!
//! Zero-internal-dependency building blocks shared by the repository layer,
//! the coordination services, and the maintenance worker:
//!
//! - [`entities`] — the closed registry of lockable/auditable entity kinds.
//! - [`locking`] — lease TTL policy constants and the expiry rule.
//! - [`audit`] — audit action vocabulary, snapshot bookkeeping fields,
//!   and sensitive-value redaction.
//! - [`diff`] — normalized field-level snapshot comparison.
//! - [`messages`] — user-facing notification payloads.

pub mod audit;
pub mod diff;
pub mod entities;
pub mod error;
pub mod locking;
pub mod messages;
pub mod types;
