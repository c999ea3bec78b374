//! Sendai Storage - Store Traits and In-Memory Implementation
//!
//! Defines the store abstraction the resolvers and filters are written
//! against. A relational backend implements `Store`/`StoreTx` over SQL; the
//! in-memory `MockStore` here is the reference implementation every test in
//! the workspace runs on.

pub mod mock;

pub use mock::MockStore;

use rust_decimal::Decimal;
use sendai_core::{
    Condition, DamageRecord, DisasterEvent, DisasterRecord, Disruption, Division, EntityId,
    HazardCluster, HazardType, HazardousEvent, LossRecord, RefId, SectorRelation, SendaiResult,
    SpecificHazard,
};

// ============================================================================
// UPDATE TYPES
// ============================================================================

/// Persisted aggregate totals for a disaster event.
///
/// This is the only write the impact resolver performs. All four fields are
/// written together; a partial total is never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventTotalsUpdate {
    pub repair_cost: Decimal,
    pub replacement_cost: Decimal,
    pub rehabilitation_cost: Decimal,
    pub recovery_cost: Decimal,
}

// ============================================================================
// STORE TRAITS
// ============================================================================

/// Read/write operations available inside one transaction.
///
/// Multi-row reads return rows ordered by id so that order-sensitive
/// behavior (the last-seen-currency rule) is deterministic. Zero matching
/// rows is an empty vector, never an error; only the single-entity getters
/// distinguish absence, and they do so with `Ok(None)`.
pub trait StoreTx {
    // === Disaster events ===

    /// Get a disaster event by ID.
    fn disaster_event_get(&self, id: EntityId) -> SendaiResult<Option<DisasterEvent>>;

    /// Persist the four derived totals onto a disaster event row.
    fn disaster_event_update_totals(
        &self,
        id: EntityId,
        totals: EventTotalsUpdate,
    ) -> SendaiResult<()>;

    // === Disaster records ===

    /// Get a disaster record by ID.
    fn disaster_record_get(&self, id: EntityId) -> SendaiResult<Option<DisasterRecord>>;

    /// List the records belonging to a disaster event.
    fn disaster_records_by_event(&self, event_id: EntityId) -> SendaiResult<Vec<DisasterRecord>>;

    /// Query records by an arbitrary condition tree.
    fn disaster_record_query(&self, conditions: &[Condition]) -> SendaiResult<Vec<DisasterRecord>>;

    // === Sector relations and asset-level rows ===

    /// List sector relations for a set of records, distinct by relation id.
    fn sector_relations_by_records(
        &self,
        record_ids: &[EntityId],
    ) -> SendaiResult<Vec<SectorRelation>>;

    /// List damage rows for one (record, sector) pair.
    fn damages_by_record_and_sector(
        &self,
        record_id: EntityId,
        sector_id: RefId,
    ) -> SendaiResult<Vec<DamageRecord>>;

    /// List damage rows across a set of records.
    fn damages_by_records(&self, record_ids: &[EntityId]) -> SendaiResult<Vec<DamageRecord>>;

    /// List loss rows for one (record, sector) pair.
    fn losses_by_record_and_sector(
        &self,
        record_id: EntityId,
        sector_id: RefId,
    ) -> SendaiResult<Vec<LossRecord>>;

    /// List disruption rows across a set of records.
    fn disruptions_by_records(&self, record_ids: &[EntityId]) -> SendaiResult<Vec<Disruption>>;

    // === Hazardous events and taxonomy ===

    /// Query hazardous events by an arbitrary condition tree.
    fn hazardous_event_query(&self, conditions: &[Condition]) -> SendaiResult<Vec<HazardousEvent>>;

    /// Get a hazard type by ID.
    fn hazard_type_get(&self, id: RefId) -> SendaiResult<Option<HazardType>>;

    /// Get a hazard cluster by ID.
    fn hazard_cluster_get(&self, id: RefId) -> SendaiResult<Option<HazardCluster>>;

    /// Get a specific hazard by ID.
    fn specific_hazard_get(&self, id: RefId) -> SendaiResult<Option<SpecificHazard>>;

    // === Reference data ===

    /// Get a geographic division by ID.
    fn division_get(&self, id: RefId) -> SendaiResult<Option<Division>>;
}

/// Transactional entry point.
///
/// The resolvers never commit or roll back; the caller opens the transaction
/// and all reads plus the final totals write happen inside it. A closure
/// error aborts the transaction and nothing is applied.
pub trait Store: Send + Sync {
    fn run_in_transaction(
        &self,
        f: &mut dyn FnMut(&dyn StoreTx) -> SendaiResult<()>,
    ) -> SendaiResult<()>;
}
