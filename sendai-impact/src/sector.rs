//! Sector-scoped totals
//!
//! Damages/losses/recovery totals for one event restricted to a set of
//! sector ids, used by the sector-drilldown analytics. Each sector relation
//! resolves through the same override cascade as the event totals: a
//! relation-level override is authoritative, otherwise the asset-level rows
//! for the (record, sector) pair are summed, otherwise the pair contributes
//! zero.

use crate::totals::require_id;
use rust_decimal::Decimal;
use sendai_core::{amount_or_zero, DamageRecord, EntityId, RefId, SendaiResult};
use sendai_storage::StoreTx;

/// One monetary total with its representative currency.
///
/// Currency is not summed or converted: rows are assumed single-currency
/// within one event and the last non-null code seen in query-result order
/// wins. A known limitation, preserved deliberately; multi-currency events
/// will show one of their currencies, not a conversion.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MoneyTotal {
    pub total: Decimal,
    pub currency: Option<String>,
}

impl MoneyTotal {
    fn add(&mut self, amount: Decimal, currency: Option<&String>) {
        self.total += amount;
        if let Some(code) = currency {
            self.currency = Some(code.clone());
        }
    }
}

/// Sector-scoped damages, losses, and recovery totals.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SectorTotals {
    pub damages: MoneyTotal,
    pub losses: MoneyTotal,
    pub recovery: MoneyTotal,
}

/// Compute damages/losses/recovery totals for an event, restricted to the
/// given sector ids.
///
/// A (record, sector) pair with an override never consults its asset rows
/// for that metric; a pair without one and without asset rows contributes
/// zero. An empty sector set yields zero totals.
pub fn sector_totals(
    tx: &dyn StoreTx,
    event_id: EntityId,
    sector_ids: &[RefId],
) -> SendaiResult<SectorTotals> {
    require_id("disaster_event_id", event_id)?;

    let mut totals = SectorTotals::default();
    if sector_ids.is_empty() {
        return Ok(totals);
    }
    let records = tx.disaster_records_by_event(event_id)?;
    if records.is_empty() {
        return Ok(totals);
    }
    let record_ids: Vec<EntityId> = records.iter().map(|r| r.id).collect();

    for relation in tx.sector_relations_by_records(&record_ids)? {
        if !sector_ids.contains(&relation.sector_id) {
            continue;
        }

        // Damage rows are shared by the damages fallback and the recovery
        // fallback; fetch them once per relation, only when needed.
        let mut damage_rows: Option<Vec<DamageRecord>> = None;

        match relation.damage_cost {
            Some(override_cost) => totals
                .damages
                .add(override_cost, relation.damage_cost_currency.as_ref()),
            None => {
                let rows = fetch_damage_rows(tx, &relation, &mut damage_rows)?;
                for damage in rows {
                    totals.damages.add(
                        amount_or_zero(damage.total_repair_replacement),
                        damage.pd_recovery_cost_unit_currency.as_ref(),
                    );
                }
            }
        }

        match relation.losses_cost {
            Some(override_cost) => totals
                .losses
                .add(override_cost, relation.losses_cost_currency.as_ref()),
            None => {
                for loss in
                    tx.losses_by_record_and_sector(relation.disaster_record_id, relation.sector_id)?
                {
                    totals
                        .losses
                        .add(loss.resolved_public_total(), loss.public_cost_currency.as_ref());
                    totals
                        .losses
                        .add(loss.resolved_private_total(), loss.private_cost_currency.as_ref());
                }
            }
        }

        match relation.damage_recovery_cost {
            Some(override_cost) => totals.recovery.add(
                override_cost,
                relation.damage_recovery_cost_currency.as_ref(),
            ),
            None => {
                let rows = fetch_damage_rows(tx, &relation, &mut damage_rows)?;
                for damage in rows {
                    totals.recovery.add(
                        amount_or_zero(damage.total_recovery),
                        damage.pd_recovery_cost_unit_currency.as_ref(),
                    );
                }
            }
        }
    }

    tracing::debug!(
        %event_id,
        sectors = sector_ids.len(),
        damages = %totals.damages.total,
        losses = %totals.losses.total,
        recovery = %totals.recovery.total,
        "calculated sector totals"
    );
    Ok(totals)
}

fn fetch_damage_rows<'a>(
    tx: &dyn StoreTx,
    relation: &sendai_core::SectorRelation,
    cache: &'a mut Option<Vec<DamageRecord>>,
) -> SendaiResult<&'a [DamageRecord]> {
    if cache.is_none() {
        *cache =
            Some(tx.damages_by_record_and_sector(relation.disaster_record_id, relation.sector_id)?);
    }
    Ok(cache.as_deref().unwrap_or(&[]))
}

// =============================================================================
// TESTS
// =============================================================================
