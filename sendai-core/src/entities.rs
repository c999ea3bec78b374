//! Core entity structures
//!
//! Plain data rows mirroring the relational store. Nullable columns are
//! `Option`; semi-structured columns (spatial footprints, division geometry)
//! stay `serde_json::Value` until normalized at the boundary.

use crate::{ApprovalStatus, EntityId, RefId, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Disaster event - aggregate record summarizing one or more disaster records.
///
/// The four `*_calc` fields are derived totals. They are recomputed on demand
/// by the impact resolver after any contributing row changes and are never
/// hand-edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisasterEvent {
    pub id: EntityId,
    pub country_account_id: Option<EntityId>,
    pub name: String,
    pub repair_costs_calc: Option<Decimal>,
    pub replacement_costs_calc: Option<Decimal>,
    pub rehabilitation_costs_calc: Option<Decimal>,
    pub recovery_needs_calc: Option<Decimal>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Disaster record - one reporting unit of impact data.
///
/// A record may belong to a disaster event, or sit directly under a hazardous
/// event with no disaster event; both are valid terminal states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisasterRecord {
    pub id: EntityId,
    pub country_account_id: Option<EntityId>,
    pub disaster_event_id: Option<EntityId>,
    pub hazardous_event_id: Option<EntityId>,
    pub approval_status: ApprovalStatus,
    /// Stored spatial footprint JSON: an array of heterogeneous entries.
    /// Normalized into `FootprintEntry` values via `parse_footprint`.
    pub spatial_footprint: Option<serde_json::Value>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Join row linking a disaster record to an economic sector.
///
/// The three `*_cost` fields are optional overrides. A non-null override is
/// authoritative for its metric; a null one sends the resolver to the
/// asset-level rows for the same (record, sector) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorRelation {
    pub id: EntityId,
    pub disaster_record_id: EntityId,
    pub sector_id: RefId,
    pub damage_cost: Option<Decimal>,
    pub damage_cost_currency: Option<String>,
    pub losses_cost: Option<Decimal>,
    pub losses_cost_currency: Option<String>,
    pub damage_recovery_cost: Option<Decimal>,
    pub damage_recovery_cost_currency: Option<String>,
    /// Whether asset-level damage rows exist for this pair.
    pub with_damage: bool,
    /// Whether asset-level loss rows exist for this pair.
    pub with_losses: bool,
}

/// Asset-level damage row for one (record, sector) pair.
///
/// `pd_*` fields cover partially damaged assets, `td_*` totally destroyed
/// ones. Each `*_override` flag marks its total as authoritative: the total
/// must not be recomputed from finer-grained unit-by-quantity detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageRecord {
    pub id: EntityId,
    pub disaster_record_id: EntityId,
    pub sector_id: RefId,
    pub pd_repair_cost_total: Option<Decimal>,
    pub pd_repair_cost_total_override: bool,
    pub td_replacement_cost_total: Option<Decimal>,
    pub td_replacement_cost_total_override: bool,
    /// Pre-totaled repair-plus-replacement figure used by sector drilldowns.
    pub total_repair_replacement: Option<Decimal>,
    pub total_recovery: Option<Decimal>,
    pub total_recovery_override: bool,
    pub pd_recovery_cost_unit_currency: Option<String>,
    pub spatial_footprint: Option<serde_json::Value>,
}

/// Asset-level loss row, split into public and private sides.
///
/// Per side: when the override flag is set the total field is authoritative,
/// otherwise the side resolves to units x unit cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LossRecord {
    pub id: EntityId,
    pub disaster_record_id: EntityId,
    pub sector_id: RefId,
    pub public_cost_total: Option<Decimal>,
    pub public_cost_total_override: bool,
    pub public_units: Option<Decimal>,
    pub public_cost_unit: Option<Decimal>,
    pub public_cost_currency: Option<String>,
    pub private_cost_total: Option<Decimal>,
    pub private_cost_total_override: bool,
    pub private_units: Option<Decimal>,
    pub private_cost_unit: Option<Decimal>,
    pub private_cost_currency: Option<String>,
    pub spatial_footprint: Option<serde_json::Value>,
}

impl LossRecord {
    /// Resolve the public side: override wins, else units x unit cost.
    pub fn resolved_public_total(&self) -> Decimal {
        resolve_side(
            self.public_cost_total_override,
            self.public_cost_total,
            self.public_units,
            self.public_cost_unit,
        )
    }

    /// Resolve the private side: override wins, else units x unit cost.
    pub fn resolved_private_total(&self) -> Decimal {
        resolve_side(
            self.private_cost_total_override,
            self.private_cost_total,
            self.private_units,
            self.private_cost_unit,
        )
    }
}

fn resolve_side(
    overridden: bool,
    total: Option<Decimal>,
    units: Option<Decimal>,
    cost_unit: Option<Decimal>,
) -> Decimal {
    if overridden {
        total.unwrap_or(Decimal::ZERO)
    } else {
        match (units, cost_unit) {
            (Some(u), Some(c)) => u * c,
            _ => Decimal::ZERO,
        }
    }
}

/// Service disruption row. Its response cost feeds the rehabilitation total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Disruption {
    pub id: EntityId,
    pub disaster_record_id: EntityId,
    pub response_cost: Option<Decimal>,
    pub spatial_footprint: Option<serde_json::Value>,
}

/// Geographic administrative unit.
///
/// Divisions form a forest: `parent_id` self-references, `level` increases
/// strictly from root (level 1) downward. Reference data, read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Division {
    pub id: RefId,
    pub parent_id: Option<RefId>,
    pub level: i32,
    /// Display names keyed by language code ("en", "es", ...).
    pub names: HashMap<String, String>,
    /// GeoJSON geometry used for containment and intersection tests.
    pub geometry: Option<serde_json::Value>,
}

impl Division {
    /// English display name, used by the named-level footprint rule.
    pub fn english_name(&self) -> Option<&str> {
        self.names.get("en").map(String::as_str)
    }
}

/// Economic sector taxonomy node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    pub id: RefId,
    pub parent_id: Option<RefId>,
    pub name: String,
}

/// Top level of the hazard taxonomy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardType {
    pub id: RefId,
    pub name: String,
}

/// Middle level of the hazard taxonomy; belongs to exactly one type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardCluster {
    pub id: RefId,
    pub hazard_type_id: RefId,
    pub name: String,
}

/// Leaf level of the hazard taxonomy; belongs to exactly one cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecificHazard {
    pub id: RefId,
    pub hazard_cluster_id: RefId,
    pub name: String,
}

/// Hazardous event row, target of the hazard hierarchy filter.
///
/// The three taxonomy references are written by the entry forms; their mutual
/// consistency along the hierarchy is validated, not enforced at write time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardousEvent {
    pub id: EntityId,
    pub country_account_id: Option<EntityId>,
    pub name: String,
    pub hazard_type_id: Option<RefId>,
    pub hazard_cluster_id: Option<RefId>,
    pub specific_hazard_id: Option<RefId>,
    pub created_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loss_record_side_resolution_override_wins() {
        let loss = LossRecord {
            id: crate::new_entity_id(),
            disaster_record_id: crate::new_entity_id(),
            sector_id: 10,
            public_cost_total: Some(Decimal::new(900, 0)),
            public_cost_total_override: true,
            public_units: Some(Decimal::new(3, 0)),
            public_cost_unit: Some(Decimal::new(100, 0)),
            public_cost_currency: Some("USD".to_string()),
            private_cost_total: Some(Decimal::new(5000, 0)),
            private_cost_total_override: false,
            private_units: Some(Decimal::new(4, 0)),
            private_cost_unit: Some(Decimal::new(250, 0)),
            private_cost_currency: None,
            spatial_footprint: None,
        };
        // Override set: the total field wins over 3 x 100.
        assert_eq!(loss.resolved_public_total(), Decimal::new(900, 0));
        // Override unset: units x unit cost wins over the stale total field.
        assert_eq!(loss.resolved_private_total(), Decimal::new(1000, 0));
    }

    #[test]
    fn test_loss_record_side_resolution_missing_detail_is_zero() {
        let loss = LossRecord {
            id: crate::new_entity_id(),
            disaster_record_id: crate::new_entity_id(),
            sector_id: 10,
            public_cost_total: None,
            public_cost_total_override: false,
            public_units: Some(Decimal::new(3, 0)),
            public_cost_unit: None,
            public_cost_currency: None,
            private_cost_total: None,
            private_cost_total_override: true,
            private_units: None,
            private_cost_unit: None,
            private_cost_currency: None,
            spatial_footprint: None,
        };
        assert_eq!(loss.resolved_public_total(), Decimal::ZERO);
        // Override with a null total still resolves to zero, not a panic.
        assert_eq!(loss.resolved_private_total(), Decimal::ZERO);
    }

    #[test]
    fn test_division_english_name() {
        let mut names = HashMap::new();
        names.insert("en".to_string(), "Western Province".to_string());
        names.insert("fr".to_string(), "Province Occidentale".to_string());
        let division = Division {
            id: 5,
            parent_id: None,
            level: 1,
            names,
            geometry: None,
        };
        assert_eq!(division.english_name(), Some("Western Province"));
    }
}
