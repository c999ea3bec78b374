//! Sendai Test Utilities
//!
//! Centralized test infrastructure for the workspace: fixture builders for
//! every entity type, a seeded hazard taxonomy, and the mock store re-export.
//! Fixtures come back with every optional field empty; tests set the handful
//! of fields a scenario cares about.

pub use sendai_storage::MockStore;

use rust_decimal::Decimal;
use sendai_core::{
    new_entity_id, ApprovalStatus, DamageRecord, DisasterEvent, DisasterRecord, Disruption,
    Division, EntityId, HazardCluster, HazardType, HazardousEvent, LossRecord, RefId,
    SectorRelation, SpecificHazard,
};
use std::collections::HashMap;

/// Parse a decimal literal in a test.
pub fn dec(raw: &str) -> Decimal {
    Decimal::from_str_exact(raw).expect("test decimal literal")
}

pub fn disaster_event(name: &str) -> DisasterEvent {
    DisasterEvent {
        id: new_entity_id(),
        country_account_id: None,
        name: name.to_string(),
        repair_costs_calc: None,
        replacement_costs_calc: None,
        rehabilitation_costs_calc: None,
        recovery_needs_calc: None,
        created_at: chrono::Utc::now(),
        updated_at: chrono::Utc::now(),
    }
}

pub fn disaster_record(event_id: Option<EntityId>) -> DisasterRecord {
    DisasterRecord {
        id: new_entity_id(),
        country_account_id: None,
        disaster_event_id: event_id,
        hazardous_event_id: None,
        approval_status: ApprovalStatus::Published,
        spatial_footprint: None,
        created_at: chrono::Utc::now(),
        updated_at: chrono::Utc::now(),
    }
}

pub fn sector_relation(record_id: EntityId, sector_id: RefId) -> SectorRelation {
    SectorRelation {
        id: new_entity_id(),
        disaster_record_id: record_id,
        sector_id,
        damage_cost: None,
        damage_cost_currency: None,
        losses_cost: None,
        losses_cost_currency: None,
        damage_recovery_cost: None,
        damage_recovery_cost_currency: None,
        with_damage: false,
        with_losses: false,
    }
}

pub fn damage_record(record_id: EntityId, sector_id: RefId) -> DamageRecord {
    DamageRecord {
        id: new_entity_id(),
        disaster_record_id: record_id,
        sector_id,
        pd_repair_cost_total: None,
        pd_repair_cost_total_override: false,
        td_replacement_cost_total: None,
        td_replacement_cost_total_override: false,
        total_repair_replacement: None,
        total_recovery: None,
        total_recovery_override: false,
        pd_recovery_cost_unit_currency: None,
        spatial_footprint: None,
    }
}

pub fn loss_record(record_id: EntityId, sector_id: RefId) -> LossRecord {
    LossRecord {
        id: new_entity_id(),
        disaster_record_id: record_id,
        sector_id,
        public_cost_total: None,
        public_cost_total_override: false,
        public_units: None,
        public_cost_unit: None,
        public_cost_currency: None,
        private_cost_total: None,
        private_cost_total_override: false,
        private_units: None,
        private_cost_unit: None,
        private_cost_currency: None,
        spatial_footprint: None,
    }
}

pub fn disruption(record_id: EntityId) -> Disruption {
    Disruption {
        id: new_entity_id(),
        disaster_record_id: record_id,
        response_cost: None,
        spatial_footprint: None,
    }
}

pub fn hazardous_event(name: &str) -> HazardousEvent {
    HazardousEvent {
        id: new_entity_id(),
        country_account_id: None,
        name: name.to_string(),
        hazard_type_id: None,
        hazard_cluster_id: None,
        specific_hazard_id: None,
        created_at: chrono::Utc::now(),
    }
}

/// Division with an English name and no geometry.
pub fn division(id: RefId, english_name: &str) -> Division {
    let mut names = HashMap::new();
    names.insert("en".to_string(), english_name.to_string());
    Division {
        id,
        parent_id: None,
        level: 1,
        names,
        geometry: None,
    }
}

/// Division whose geometry is the unit square from (0, 0) to (1, 1).
pub fn square_division(id: RefId, english_name: &str) -> Division {
    let mut d = division(id, english_name);
    d.geometry = Some(serde_json::json!({
        "type": "Polygon",
        "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]]
    }));
    d
}

/// Ids of the taxonomy rows seeded by `seed_hazard_taxonomy`.
///
/// The shape on purpose includes two independent branches so mismatch tests
/// have a wrong-but-existing sibling to point at.
#[derive(Debug, Clone, Copy)]
pub struct HazardTaxonomy {
    pub geophysical_type: RefId,
    pub hydro_type: RefId,
    pub seismic_cluster: RefId,
    pub flood_cluster: RefId,
    pub earthquake: RefId,
    pub riverine_flood: RefId,
}

/// Seed a two-branch hazard taxonomy into the store:
/// Geophysical > Seismic > Earthquake, Hydrometeorological > Flood > Riverine flood.
pub fn seed_hazard_taxonomy(store: &MockStore) -> HazardTaxonomy {
    let taxonomy = HazardTaxonomy {
        geophysical_type: 1,
        hydro_type: 2,
        seismic_cluster: 10,
        flood_cluster: 20,
        earthquake: 100,
        riverine_flood: 200,
    };
    store.insert_hazard_type(HazardType {
        id: taxonomy.geophysical_type,
        name: "Geophysical".to_string(),
    });
    store.insert_hazard_type(HazardType {
        id: taxonomy.hydro_type,
        name: "Hydrometeorological".to_string(),
    });
    store.insert_hazard_cluster(HazardCluster {
        id: taxonomy.seismic_cluster,
        hazard_type_id: taxonomy.geophysical_type,
        name: "Seismic".to_string(),
    });
    store.insert_hazard_cluster(HazardCluster {
        id: taxonomy.flood_cluster,
        hazard_type_id: taxonomy.hydro_type,
        name: "Flood".to_string(),
    });
    store.insert_specific_hazard(SpecificHazard {
        id: taxonomy.earthquake,
        hazard_cluster_id: taxonomy.seismic_cluster,
        name: "Earthquake".to_string(),
    });
    store.insert_specific_hazard(SpecificHazard {
        id: taxonomy.riverine_flood,
        hazard_cluster_id: taxonomy.flood_cluster,
        name: "Riverine flood".to_string(),
    });
    taxonomy
}
