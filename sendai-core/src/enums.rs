//! Shared enums for Sendai entities

use serde::{Deserialize, Serialize};

/// Entity type discriminator for error reporting and polymorphic references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    DisasterEvent,
    DisasterRecord,
    SectorRelation,
    DamageRecord,
    LossRecord,
    Disruption,
    HazardousEvent,
    HazardType,
    HazardCluster,
    SpecificHazard,
    Division,
    Sector,
}

/// Approval workflow state of a disaster record.
///
/// Aggregate queries use this as a filter condition; the record itself moves
/// through the states via the entry-form workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Draft,
    Submitted,
    Approved,
    Published,
    Archived,
}

impl ApprovalStatus {
    /// Whether the record is visible outside the entry workflow.
    pub fn is_public(&self) -> bool {
        matches!(self, ApprovalStatus::Approved | ApprovalStatus::Published)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approval_status_public_states() {
        assert!(ApprovalStatus::Published.is_public());
        assert!(ApprovalStatus::Approved.is_public());
        assert!(!ApprovalStatus::Draft.is_public());
        assert!(!ApprovalStatus::Submitted.is_public());
        assert!(!ApprovalStatus::Archived.is_public());
    }

    #[test]
    fn test_approval_status_serde_lowercase() {
        let json = serde_json::to_string(&ApprovalStatus::Draft).unwrap();
        assert_eq!(json, "\"draft\"");
        let back: ApprovalStatus = serde_json::from_str("\"published\"").unwrap();
        assert_eq!(back, ApprovalStatus::Published);
    }
}
