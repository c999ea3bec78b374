//! Sendai Impact - Aggregation Resolvers
//!
//! The override-cascade resolver producing a disaster event's four derived
//! monetary totals, and the sector total resolver behind the sector
//! drilldown analytics. Both run entirely inside a caller-supplied store
//! transaction and never commit, roll back, or soften store failures into
//! zero results.

pub mod sector;
pub mod totals;

pub use sector::{sector_totals, MoneyTotal, SectorTotals};
pub use totals::{calculate_totals, update_totals, update_totals_by_record_id, EventTotals};
