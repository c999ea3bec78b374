//! Event-level aggregate totals
//!
//! Computes the four derived monetary totals of a disaster event by walking
//! its records and their damage, disruption, and sector-relation rows. The
//! recovery total applies the override cascade: a sector-relation override
//! wins outright, otherwise the matching damage rows' recovery totals are
//! summed, otherwise the pair contributes zero.

use rust_decimal::Decimal;
use sendai_core::{amount_or_zero, EntityId, SendaiResult, ValidationError};
use sendai_storage::{EventTotalsUpdate, StoreTx};

/// The four derived totals of a disaster event.
///
/// Accumulated in decimal arithmetic; use `sendai_core::format_amount` at
/// the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventTotals {
    pub repair_cost: Decimal,
    pub replacement_cost: Decimal,
    pub rehabilitation_cost: Decimal,
    pub recovery_cost: Decimal,
}

impl EventTotals {
    pub fn zero() -> Self {
        Self::default()
    }
}

impl From<EventTotals> for EventTotalsUpdate {
    fn from(t: EventTotals) -> Self {
        EventTotalsUpdate {
            repair_cost: t.repair_cost,
            replacement_cost: t.replacement_cost,
            rehabilitation_cost: t.rehabilitation_cost,
            recovery_cost: t.recovery_cost,
        }
    }
}

/// Compute the four totals for a disaster event.
///
/// An event with no records yields all-zero totals; that is a valid state,
/// not an error. Store failures propagate; no partial result is returned.
pub fn calculate_totals(tx: &dyn StoreTx, event_id: EntityId) -> SendaiResult<EventTotals> {
    require_id("disaster_event_id", event_id)?;

    let records = tx.disaster_records_by_event(event_id)?;
    if records.is_empty() {
        return Ok(EventTotals::zero());
    }
    let record_ids: Vec<EntityId> = records.iter().map(|r| r.id).collect();

    let mut totals = EventTotals::zero();

    // Repair and replacement come from pre-totaled damage fields; there is
    // no override cascade at this level.
    for damage in tx.damages_by_records(&record_ids)? {
        totals.repair_cost += amount_or_zero(damage.pd_repair_cost_total);
        totals.replacement_cost += amount_or_zero(damage.td_replacement_cost_total);
    }

    for disruption in tx.disruptions_by_records(&record_ids)? {
        totals.rehabilitation_cost += amount_or_zero(disruption.response_cost);
    }

    for relation in tx.sector_relations_by_records(&record_ids)? {
        totals.recovery_cost += match relation.damage_recovery_cost {
            Some(override_cost) => override_cost,
            None => tx
                .damages_by_record_and_sector(relation.disaster_record_id, relation.sector_id)?
                .iter()
                .map(|d| amount_or_zero(d.total_recovery))
                .sum(),
        };
    }

    tracing::debug!(
        %event_id,
        records = records.len(),
        repair = %totals.repair_cost,
        replacement = %totals.replacement_cost,
        rehabilitation = %totals.rehabilitation_cost,
        recovery = %totals.recovery_cost,
        "calculated disaster event totals"
    );
    Ok(totals)
}

/// Compute and persist the four totals onto the disaster event row.
///
/// All reads and the write are expected to run inside one caller-supplied
/// transaction; this function never commits on its own.
pub fn update_totals(tx: &dyn StoreTx, event_id: EntityId) -> SendaiResult<EventTotals> {
    let totals = calculate_totals(tx, event_id)?;
    tx.disaster_event_update_totals(event_id, totals.into())?;
    Ok(totals)
}

/// Recompute an event's totals starting from one of its records.
///
/// Unknown record ids are `NotFound`. A record with no parent disaster event
/// is a valid terminal state and a no-op, not an error.
pub fn update_totals_by_record_id(tx: &dyn StoreTx, record_id: EntityId) -> SendaiResult<()> {
    require_id("disaster_record_id", record_id)?;
    let record = tx.disaster_record_get(record_id)?.ok_or_else(|| {
        sendai_core::StoreError::NotFound {
            entity_type: sendai_core::EntityType::DisasterRecord,
            id: record_id,
        }
    })?;
    match record.disaster_event_id {
        Some(event_id) => {
            update_totals(tx, event_id)?;
            Ok(())
        }
        None => Ok(()),
    }
}

pub(crate) fn require_id(field: &'static str, id: EntityId) -> SendaiResult<()> {
    if id.is_nil() {
        return Err(ValidationError::RequiredArgumentMissing {
            field: field.to_string(),
        }
        .into());
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
