//! In-memory store
//!
//! `MockStore` backs every test in the workspace. It keeps one map per table
//! behind an `RwLock`, returns rows ordered by id for determinism, and
//! evaluates the same condition trees a SQL backend would compile, including
//! the store-delegated geometric footprint predicate.

use crate::{EventTotalsUpdate, Store, StoreTx};
use sendai_core::{
    parse_footprint, Condition, DamageRecord, DisasterEvent, DisasterRecord, Disruption, Division,
    EntityId, EntityType, FilterOperator, FootprintEntry, HazardCluster, HazardType,
    HazardousEvent, LossRecord, RefId, Sector, SectorRelation, SendaiResult, SpecificHazard,
    StoreError,
};
use sendai_geo::{point_feature_match, shape_matches, Geometry};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// In-memory store for testing.
#[derive(Debug, Default)]
pub struct MockStore {
    disaster_events: Arc<RwLock<HashMap<EntityId, DisasterEvent>>>,
    disaster_records: Arc<RwLock<HashMap<EntityId, DisasterRecord>>>,
    sector_relations: Arc<RwLock<HashMap<EntityId, SectorRelation>>>,
    damages: Arc<RwLock<HashMap<EntityId, DamageRecord>>>,
    losses: Arc<RwLock<HashMap<EntityId, LossRecord>>>,
    disruptions: Arc<RwLock<HashMap<EntityId, Disruption>>>,
    hazardous_events: Arc<RwLock<HashMap<EntityId, HazardousEvent>>>,
    hazard_types: Arc<RwLock<HashMap<RefId, HazardType>>>,
    hazard_clusters: Arc<RwLock<HashMap<RefId, HazardCluster>>>,
    specific_hazards: Arc<RwLock<HashMap<RefId, SpecificHazard>>>,
    divisions: Arc<RwLock<HashMap<RefId, Division>>>,
    sectors: Arc<RwLock<HashMap<RefId, Sector>>>,
    /// When set, every store operation fails with this reason. Used to test
    /// that callers propagate store failures instead of soft-zeroing.
    failure: Arc<RwLock<Option<String>>>,
}

impl MockStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all stored data.
    pub fn clear(&self) {
        self.disaster_events.write().unwrap().clear();
        self.disaster_records.write().unwrap().clear();
        self.sector_relations.write().unwrap().clear();
        self.damages.write().unwrap().clear();
        self.losses.write().unwrap().clear();
        self.disruptions.write().unwrap().clear();
        self.hazardous_events.write().unwrap().clear();
        self.hazard_types.write().unwrap().clear();
        self.hazard_clusters.write().unwrap().clear();
        self.specific_hazards.write().unwrap().clear();
        self.divisions.write().unwrap().clear();
        self.sectors.write().unwrap().clear();
        *self.failure.write().unwrap() = None;
    }

    /// Make every subsequent operation fail with the given reason.
    pub fn fail_with(&self, reason: impl Into<String>) {
        *self.failure.write().unwrap() = Some(reason.into());
    }

    /// Stop failing operations.
    pub fn clear_failure(&self) {
        *self.failure.write().unwrap() = None;
    }

    fn check_failure(&self, entity_type: EntityType) -> SendaiResult<()> {
        if let Some(reason) = self.failure.read().unwrap().as_ref() {
            return Err(StoreError::QueryFailed {
                entity_type,
                reason: reason.clone(),
            }
            .into());
        }
        Ok(())
    }

    // === Insert helpers ===

    pub fn insert_disaster_event(&self, e: DisasterEvent) {
        self.disaster_events.write().unwrap().insert(e.id, e);
    }

    pub fn insert_disaster_record(&self, r: DisasterRecord) {
        self.disaster_records.write().unwrap().insert(r.id, r);
    }

    pub fn insert_sector_relation(&self, s: SectorRelation) {
        self.sector_relations.write().unwrap().insert(s.id, s);
    }

    pub fn insert_damage(&self, d: DamageRecord) {
        self.damages.write().unwrap().insert(d.id, d);
    }

    pub fn insert_loss(&self, l: LossRecord) {
        self.losses.write().unwrap().insert(l.id, l);
    }

    pub fn insert_disruption(&self, d: Disruption) {
        self.disruptions.write().unwrap().insert(d.id, d);
    }

    pub fn insert_hazardous_event(&self, h: HazardousEvent) {
        self.hazardous_events.write().unwrap().insert(h.id, h);
    }

    pub fn insert_hazard_type(&self, t: HazardType) {
        self.hazard_types.write().unwrap().insert(t.id, t);
    }

    pub fn insert_hazard_cluster(&self, c: HazardCluster) {
        self.hazard_clusters.write().unwrap().insert(c.id, c);
    }

    pub fn insert_specific_hazard(&self, s: SpecificHazard) {
        self.specific_hazards.write().unwrap().insert(s.id, s);
    }

    pub fn insert_division(&self, d: Division) {
        self.divisions.write().unwrap().insert(d.id, d);
    }

    pub fn insert_sector(&self, s: Sector) {
        self.sectors.write().unwrap().insert(s.id, s);
    }

    /// Get count of stored disaster records.
    pub fn disaster_record_count(&self) -> usize {
        self.disaster_records.read().unwrap().len()
    }

    /// Get count of stored sector relations.
    pub fn sector_relation_count(&self) -> usize {
        self.sector_relations.read().unwrap().len()
    }

    // === Condition evaluation ===

    fn condition_matches(
        &self,
        row: &serde_json::Value,
        footprint: Option<&serde_json::Value>,
        condition: &Condition,
    ) -> bool {
        match condition {
            Condition::Field(field) => {
                let stored = row.get(&field.field).unwrap_or(&serde_json::Value::Null);
                compare(stored, field.operator, &field.value)
            }
            Condition::FootprintPath {
                path,
                operator,
                value,
            } => {
                let Some(footprint) = footprint else {
                    return false;
                };
                let mut nodes = Vec::new();
                walk_path(footprint, path, &mut nodes);
                nodes.iter().any(|node| compare(node, *operator, value))
            }
            Condition::FootprintIntersectsDivision { division_id } => footprint
                .map(|fp| self.footprint_intersects_division(fp, *division_id))
                .unwrap_or(false),
            Condition::All(children) => children
                .iter()
                .all(|c| self.condition_matches(row, footprint, c)),
            Condition::Any(children) => children
                .iter()
                .any(|c| self.condition_matches(row, footprint, c)),
        }
    }

    /// The geometric half of the spatial filter: drawn shapes and point
    /// features against the division geometry. The direct-id and named-level
    /// predicates arrive as separate footprint-path conditions.
    fn footprint_intersects_division(
        &self,
        footprint: &serde_json::Value,
        division_id: RefId,
    ) -> bool {
        let divisions = self.divisions.read().unwrap();
        let Some(geometry) = divisions
            .get(&division_id)
            .and_then(|d| d.geometry.as_ref())
            .and_then(Geometry::from_geojson)
        else {
            return false;
        };
        parse_footprint(footprint).iter().any(|entry| match entry {
            FootprintEntry::Shape(shape) => shape_matches(shape, &geometry),
            FootprintEntry::GeoJson(g) => point_feature_match(g, &geometry),
            _ => false,
        })
    }
}

/// Walk a path through the footprint JSON. Arrays fan out to every element,
/// and Feature-shaped objects also expose their `features` members under the
/// remaining path, which is how `dts_info` blocks nested per feature are
/// reached.
fn walk_path<'a>(node: &'a serde_json::Value, path: &[String], out: &mut Vec<&'a serde_json::Value>) {
    if path.is_empty() {
        out.push(node);
        return;
    }
    match node {
        serde_json::Value::Array(items) => {
            for item in items {
                walk_path(item, path, out);
            }
        }
        serde_json::Value::Object(map) => {
            if let Some(next) = map.get(&path[0]) {
                walk_path(next, &path[1..], out);
            }
            if let Some(serde_json::Value::Array(features)) = map.get("features") {
                for feature in features {
                    walk_path(feature, path, out);
                }
            }
        }
        _ => {}
    }
}

fn compare(stored: &serde_json::Value, operator: FilterOperator, value: &serde_json::Value) -> bool {
    match operator {
        FilterOperator::Eq => loose_eq(stored, value),
        FilterOperator::Ne => !loose_eq(stored, value),
        FilterOperator::Gt => numeric_cmp(stored, value).is_some_and(|o| o.is_gt()),
        FilterOperator::Lt => numeric_cmp(stored, value).is_some_and(|o| o.is_lt()),
        FilterOperator::Gte => numeric_cmp(stored, value).is_some_and(|o| o.is_ge()),
        FilterOperator::Lte => numeric_cmp(stored, value).is_some_and(|o| o.is_le()),
        FilterOperator::Contains => stored
            .as_array()
            .is_some_and(|items| items.iter().any(|item| loose_eq(item, value))),
        FilterOperator::In => value
            .as_array()
            .is_some_and(|items| items.iter().any(|item| loose_eq(stored, item))),
    }
}

/// Equality with numeric coercion: stored JSON mixes numbers and numeric
/// strings for the same logical field.
fn loose_eq(a: &serde_json::Value, b: &serde_json::Value) -> bool {
    if a == b {
        return true;
    }
    match (as_number(a), as_number(b)) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

fn as_number(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn numeric_cmp(a: &serde_json::Value, b: &serde_json::Value) -> Option<std::cmp::Ordering> {
    as_number(a)?.partial_cmp(&as_number(b)?)
}

fn sorted_by_id<T, K: Ord, F: Fn(&T) -> K>(mut rows: Vec<T>, key: F) -> Vec<T> {
    rows.sort_by_key(key);
    rows
}

impl StoreTx for MockStore {
    fn disaster_event_get(&self, id: EntityId) -> SendaiResult<Option<DisasterEvent>> {
        self.check_failure(EntityType::DisasterEvent)?;
        Ok(self.disaster_events.read().unwrap().get(&id).cloned())
    }

    fn disaster_event_update_totals(
        &self,
        id: EntityId,
        totals: EventTotalsUpdate,
    ) -> SendaiResult<()> {
        self.check_failure(EntityType::DisasterEvent)?;
        let mut events = self.disaster_events.write().unwrap();
        let event = events.get_mut(&id).ok_or(StoreError::NotFound {
            entity_type: EntityType::DisasterEvent,
            id,
        })?;
        event.repair_costs_calc = Some(totals.repair_cost);
        event.replacement_costs_calc = Some(totals.replacement_cost);
        event.rehabilitation_costs_calc = Some(totals.rehabilitation_cost);
        event.recovery_needs_calc = Some(totals.recovery_cost);
        event.updated_at = chrono::Utc::now();
        Ok(())
    }

    fn disaster_record_get(&self, id: EntityId) -> SendaiResult<Option<DisasterRecord>> {
        self.check_failure(EntityType::DisasterRecord)?;
        Ok(self.disaster_records.read().unwrap().get(&id).cloned())
    }

    fn disaster_records_by_event(&self, event_id: EntityId) -> SendaiResult<Vec<DisasterRecord>> {
        self.check_failure(EntityType::DisasterRecord)?;
        let records = self.disaster_records.read().unwrap();
        Ok(sorted_by_id(
            records
                .values()
                .filter(|r| r.disaster_event_id == Some(event_id))
                .cloned()
                .collect(),
            |r| r.id,
        ))
    }

    fn disaster_record_query(&self, conditions: &[Condition]) -> SendaiResult<Vec<DisasterRecord>> {
        self.check_failure(EntityType::DisasterRecord)?;
        let records = self.disaster_records.read().unwrap();
        let mut matched = Vec::new();
        for record in records.values() {
            let row = serde_json::to_value(record).map_err(|e| StoreError::QueryFailed {
                entity_type: EntityType::DisasterRecord,
                reason: e.to_string(),
            })?;
            let footprint = record.spatial_footprint.as_ref();
            if conditions
                .iter()
                .all(|c| self.condition_matches(&row, footprint, c))
            {
                matched.push(record.clone());
            }
        }
        Ok(sorted_by_id(matched, |r| r.id))
    }

    fn sector_relations_by_records(
        &self,
        record_ids: &[EntityId],
    ) -> SendaiResult<Vec<SectorRelation>> {
        self.check_failure(EntityType::SectorRelation)?;
        let relations = self.sector_relations.read().unwrap();
        Ok(sorted_by_id(
            relations
                .values()
                .filter(|s| record_ids.contains(&s.disaster_record_id))
                .cloned()
                .collect(),
            |s| s.id,
        ))
    }

    fn damages_by_record_and_sector(
        &self,
        record_id: EntityId,
        sector_id: RefId,
    ) -> SendaiResult<Vec<DamageRecord>> {
        self.check_failure(EntityType::DamageRecord)?;
        let damages = self.damages.read().unwrap();
        Ok(sorted_by_id(
            damages
                .values()
                .filter(|d| d.disaster_record_id == record_id && d.sector_id == sector_id)
                .cloned()
                .collect(),
            |d| d.id,
        ))
    }

    fn damages_by_records(&self, record_ids: &[EntityId]) -> SendaiResult<Vec<DamageRecord>> {
        self.check_failure(EntityType::DamageRecord)?;
        let damages = self.damages.read().unwrap();
        Ok(sorted_by_id(
            damages
                .values()
                .filter(|d| record_ids.contains(&d.disaster_record_id))
                .cloned()
                .collect(),
            |d| d.id,
        ))
    }

    fn losses_by_record_and_sector(
        &self,
        record_id: EntityId,
        sector_id: RefId,
    ) -> SendaiResult<Vec<LossRecord>> {
        self.check_failure(EntityType::LossRecord)?;
        let losses = self.losses.read().unwrap();
        Ok(sorted_by_id(
            losses
                .values()
                .filter(|l| l.disaster_record_id == record_id && l.sector_id == sector_id)
                .cloned()
                .collect(),
            |l| l.id,
        ))
    }

    fn disruptions_by_records(&self, record_ids: &[EntityId]) -> SendaiResult<Vec<Disruption>> {
        self.check_failure(EntityType::Disruption)?;
        let disruptions = self.disruptions.read().unwrap();
        Ok(sorted_by_id(
            disruptions
                .values()
                .filter(|d| record_ids.contains(&d.disaster_record_id))
                .cloned()
                .collect(),
            |d| d.id,
        ))
    }

    fn hazardous_event_query(&self, conditions: &[Condition]) -> SendaiResult<Vec<HazardousEvent>> {
        self.check_failure(EntityType::HazardousEvent)?;
        let events = self.hazardous_events.read().unwrap();
        let mut matched = Vec::new();
        for event in events.values() {
            let row = serde_json::to_value(event).map_err(|e| StoreError::QueryFailed {
                entity_type: EntityType::HazardousEvent,
                reason: e.to_string(),
            })?;
            if conditions
                .iter()
                .all(|c| self.condition_matches(&row, None, c))
            {
                matched.push(event.clone());
            }
        }
        Ok(sorted_by_id(matched, |e| e.id))
    }

    fn hazard_type_get(&self, id: RefId) -> SendaiResult<Option<HazardType>> {
        self.check_failure(EntityType::HazardType)?;
        Ok(self.hazard_types.read().unwrap().get(&id).cloned())
    }

    fn hazard_cluster_get(&self, id: RefId) -> SendaiResult<Option<HazardCluster>> {
        self.check_failure(EntityType::HazardCluster)?;
        Ok(self.hazard_clusters.read().unwrap().get(&id).cloned())
    }

    fn specific_hazard_get(&self, id: RefId) -> SendaiResult<Option<SpecificHazard>> {
        self.check_failure(EntityType::SpecificHazard)?;
        Ok(self.specific_hazards.read().unwrap().get(&id).cloned())
    }

    fn division_get(&self, id: RefId) -> SendaiResult<Option<Division>> {
        self.check_failure(EntityType::Division)?;
        Ok(self.divisions.read().unwrap().get(&id).cloned())
    }
}

impl sendai_geo::DivisionProvider for MockStore {
    fn division_by_id(&self, id: RefId) -> SendaiResult<Option<Division>> {
        self.division_get(id)
    }
}

impl Store for MockStore {
    /// The mock's transactional guarantee is the trivial one: a single
    /// process and per-table locks. The contract the resolvers rely on
    /// (reads and the final write observe one consistent snapshot) is the
    /// relational backend's to provide.
    fn run_in_transaction(
        &self,
        f: &mut dyn FnMut(&dyn StoreTx) -> SendaiResult<()>,
    ) -> SendaiResult<()> {
        f(self)
    }
}

// =============================================================================
// TESTS
// =============================================================================
