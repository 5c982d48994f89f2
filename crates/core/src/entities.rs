//! The closed registry of lockable and auditable entity kinds.
//!
//! The lock manager, sweeper, audit trail, and restore engine all dispatch
//! over this registry instead of hard-coded per-type branches: adding a new
//! lockable type means adding a variant here (and its table semantics in the
//! record store), nothing else.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// An entity type that participates in locking, auditing, and restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Farm,
    Breed,
    Category,
    Matriarch,
    WeaningEvent,
    Weighing,
    Vaccination,
    User,
}

impl EntityKind {
    /// Every registered kind, for registry-wide iteration (sweeps, exports).
    pub const ALL: &'static [EntityKind] = &[
        EntityKind::Farm,
        EntityKind::Breed,
        EntityKind::Category,
        EntityKind::Matriarch,
        EntityKind::WeaningEvent,
        EntityKind::Weighing,
        EntityKind::Vaccination,
        EntityKind::User,
    ];

    /// String representation for display, logging, and database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Farm => "farm",
            Self::Breed => "breed",
            Self::Category => "category",
            Self::Matriarch => "matriarch",
            Self::WeaningEvent => "weaning_event",
            Self::Weighing => "weighing",
            Self::Vaccination => "vaccination",
            Self::User => "user",
        }
    }

    /// Parse a stored entity-type string back into a kind.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Unknown entity type '{value}'. Must be one of: {}",
                    Self::ALL
                        .iter()
                        .map(|k| k.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })
    }

    /// Whether snapshots of this kind may be reapplied automatically.
    ///
    /// User records carry credential material and must be edited manually.
    pub fn supports_restore(&self) -> bool {
        !matches!(self, Self::User)
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_str_round_trips_through_parse() {
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::parse(kind.as_str()).unwrap(), *kind);
        }
    }

    #[test]
    fn parse_rejects_unknown_types() {
        let result = EntityKind::parse("tractor");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("tractor"));
    }

    #[test]
    fn parse_is_case_sensitive() {
        assert!(EntityKind::parse("Farm").is_err());
        assert!(EntityKind::parse("WEANING_EVENT").is_err());
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&EntityKind::WeaningEvent).unwrap();
        assert_eq!(json, "\"weaning_event\"");
        let parsed: EntityKind = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, EntityKind::WeaningEvent);
    }

    #[test]
    fn user_records_are_not_restorable() {
        assert!(!EntityKind::User.supports_restore());
        assert!(EntityKind::Weighing.supports_restore());
        assert!(EntityKind::Matriarch.supports_restore());
    }

    #[test]
    fn registry_covers_all_kinds() {
        assert_eq!(EntityKind::ALL.len(), 8);
    }
}
