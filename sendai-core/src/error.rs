//! Error types for Sendai operations

use crate::{EntityType, RefId};
use thiserror::Error;
use uuid::Uuid;

/// Store layer errors.
///
/// Absence is only an error for direct single-entity lookups; aggregate
/// queries that match zero rows return empty sets, not `NotFound`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Entity not found: {entity_type:?} with id {id}")]
    NotFound { entity_type: EntityType, id: Uuid },

    #[error("Reference entity not found: {entity_type:?} with id {id}")]
    RefNotFound { entity_type: EntityType, id: RefId },

    #[error("Query failed for {entity_type:?}: {reason}")]
    QueryFailed { entity_type: EntityType, reason: String },

    #[error("Update failed for {entity_type:?} with id {id}: {reason}")]
    UpdateFailed {
        entity_type: EntityType,
        id: Uuid,
        reason: String,
    },

    #[error("Transaction failed: {reason}")]
    TransactionFailed { reason: String },

    #[error("Store lock poisoned")]
    LockPoisoned,
}

/// Argument validation errors, raised before any store access.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required argument missing: {field}")]
    RequiredArgumentMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Master error type for all Sendai errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SendaiError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Result type alias for Sendai operations.
pub type SendaiResult<T> = Result<T, SendaiError>;

/// Advisory diagnostic produced by filter validation.
///
/// Diagnostics never fail an operation. They are carried in the result so
/// callers and tests can assert on them, and logged by the producer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A supplied hierarchy filter value contradicts the taxonomy's true
    /// parent-child relationship. The most specific value still applies.
    HierarchyMismatch {
        supplied_field: &'static str,
        supplied_id: RefId,
        expected_id: RefId,
    },
    /// A supplied filter id does not exist in the store. The filter is still
    /// applied and legitimately matches zero rows downstream.
    UnknownFilterId {
        field: &'static str,
        id: RefId,
    },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::HierarchyMismatch {
                supplied_field,
                supplied_id,
                expected_id,
            } => write!(
                f,
                "{supplied_field} {supplied_id} does not match taxonomy ancestry (expected {expected_id})"
            ),
            Diagnostic::UnknownFilterId { field, id } => {
                write!(f, "{field} {id} does not exist")
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display_not_found() {
        let err = StoreError::NotFound {
            entity_type: EntityType::DisasterRecord,
            id: Uuid::nil(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Entity not found"));
        assert!(msg.contains("DisasterRecord"));
        assert!(msg.contains("00000000-0000-0000-0000-000000000000"));
    }

    #[test]
    fn test_validation_error_display_missing_argument() {
        let err = ValidationError::RequiredArgumentMissing {
            field: "disaster_event_id".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Required argument missing"));
        assert!(msg.contains("disaster_event_id"));
    }

    #[test]
    fn test_sendai_error_from_variants() {
        let store = SendaiError::from(StoreError::LockPoisoned);
        assert!(matches!(store, SendaiError::Store(_)));

        let validation = SendaiError::from(ValidationError::RequiredArgumentMissing {
            field: "id".to_string(),
        });
        assert!(matches!(validation, SendaiError::Validation(_)));
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::HierarchyMismatch {
            supplied_field: "hazard_cluster_id",
            supplied_id: 7,
            expected_id: 3,
        };
        let msg = format!("{}", diag);
        assert!(msg.contains("hazard_cluster_id"));
        assert!(msg.contains("7"));
        assert!(msg.contains("3"));

        let diag = Diagnostic::UnknownFilterId {
            field: "specific_hazard_id",
            id: 42,
        };
        assert!(format!("{}", diag).contains("does not exist"));
    }
}
