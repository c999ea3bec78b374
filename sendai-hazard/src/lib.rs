//! Sendai Hazard - Hierarchy Filter
//!
//! Turns a partial (type, cluster, specific hazard) filter into store
//! conditions for hazardous-event queries, validating the combination
//! against the three-level taxonomy. Validation never blocks: the most
//! specific value supplied always filters, inconsistencies and stale ids
//! surface as advisory diagnostics. Hierarchical dropdowns make bad
//! combinations unreachable in the UI, but saved bookmarks outlive taxonomy
//! edits and the filter must stay defensively correct for them.

use sendai_core::{Condition, Diagnostic, RefId, SendaiResult};
use sendai_storage::StoreTx;
use serde_json::json;

/// Partial hazard taxonomy filter, as submitted by a caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HazardFilter {
    pub hazard_type_id: Option<RefId>,
    pub hazard_cluster_id: Option<RefId>,
    pub specific_hazard_id: Option<RefId>,
}

impl HazardFilter {
    pub fn is_empty(&self) -> bool {
        self.hazard_type_id.is_none()
            && self.hazard_cluster_id.is_none()
            && self.specific_hazard_id.is_none()
    }
}

/// The accepted filter plus its advisory diagnostics.
///
/// Diagnostics are values, not log lines, so callers and tests can assert on
/// them; `apply_hazard_filter` also logs each one.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome {
    pub conditions: Vec<Condition>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Extend a base condition set with the hazard filter.
///
/// The most specific supplied level decides what is filtered on: a specific
/// hazard filters alone, a cluster filters together with a supplied type, a
/// type filters by itself, and an empty filter returns the base conditions
/// unchanged. Supplied values that contradict the taxonomy's true ancestry,
/// or reference ids the store does not know, produce diagnostics without
/// changing what the caller asked for; an unknown id simply matches zero
/// rows downstream.
pub fn apply_hazard_filter(
    tx: &dyn StoreTx,
    filter: &HazardFilter,
    base_conditions: Vec<Condition>,
) -> SendaiResult<FilterOutcome> {
    let mut outcome = FilterOutcome {
        conditions: base_conditions,
        diagnostics: Vec::new(),
    };

    if let Some(specific_id) = filter.specific_hazard_id {
        outcome
            .conditions
            .push(Condition::eq("specific_hazard_id", json!(specific_id)));
        check_specific_ancestry(tx, filter, specific_id, &mut outcome.diagnostics)?;
    } else if let Some(cluster_id) = filter.hazard_cluster_id {
        outcome
            .conditions
            .push(Condition::eq("hazard_cluster_id", json!(cluster_id)));
        if let Some(type_id) = filter.hazard_type_id {
            outcome
                .conditions
                .push(Condition::eq("hazard_type_id", json!(type_id)));
        }
        check_cluster_ancestry(tx, filter, cluster_id, &mut outcome.diagnostics)?;
    } else if let Some(type_id) = filter.hazard_type_id {
        outcome
            .conditions
            .push(Condition::eq("hazard_type_id", json!(type_id)));
        if tx.hazard_type_get(type_id)?.is_none() {
            outcome.diagnostics.push(Diagnostic::UnknownFilterId {
                field: "hazard_type_id",
                id: type_id,
            });
        }
    }

    for diagnostic in &outcome.diagnostics {
        tracing::warn!(%diagnostic, "hazard filter consistency warning");
    }
    Ok(outcome)
}

/// Validate a supplied (cluster, type) pair against the specific hazard's
/// true ancestry. The specific hazard filters regardless.
fn check_specific_ancestry(
    tx: &dyn StoreTx,
    filter: &HazardFilter,
    specific_id: RefId,
    diagnostics: &mut Vec<Diagnostic>,
) -> SendaiResult<()> {
    let Some(specific) = tx.specific_hazard_get(specific_id)? else {
        diagnostics.push(Diagnostic::UnknownFilterId {
            field: "specific_hazard_id",
            id: specific_id,
        });
        return Ok(());
    };

    let true_cluster = specific.hazard_cluster_id;
    if let Some(supplied_cluster) = filter.hazard_cluster_id {
        if supplied_cluster != true_cluster {
            diagnostics.push(Diagnostic::HierarchyMismatch {
                supplied_field: "hazard_cluster_id",
                supplied_id: supplied_cluster,
                expected_id: true_cluster,
            });
        }
    }

    if let Some(supplied_type) = filter.hazard_type_id {
        if let Some(cluster) = tx.hazard_cluster_get(true_cluster)? {
            if supplied_type != cluster.hazard_type_id {
                diagnostics.push(Diagnostic::HierarchyMismatch {
                    supplied_field: "hazard_type_id",
                    supplied_id: supplied_type,
                    expected_id: cluster.hazard_type_id,
                });
            }
        }
    }
    Ok(())
}

fn check_cluster_ancestry(
    tx: &dyn StoreTx,
    filter: &HazardFilter,
    cluster_id: RefId,
    diagnostics: &mut Vec<Diagnostic>,
) -> SendaiResult<()> {
    let Some(cluster) = tx.hazard_cluster_get(cluster_id)? else {
        diagnostics.push(Diagnostic::UnknownFilterId {
            field: "hazard_cluster_id",
            id: cluster_id,
        });
        return Ok(());
    };
    if let Some(supplied_type) = filter.hazard_type_id {
        if supplied_type != cluster.hazard_type_id {
            diagnostics.push(Diagnostic::HierarchyMismatch {
                supplied_field: "hazard_type_id",
                supplied_id: supplied_type,
                expected_id: cluster.hazard_type_id,
            });
        }
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use sendai_core::ApprovalStatus;
    use sendai_test_utils::{hazardous_event, seed_hazard_taxonomy, MockStore};

    fn seeded_store() -> (MockStore, sendai_test_utils::HazardTaxonomy) {
        let store = MockStore::new();
        let taxonomy = seed_hazard_taxonomy(&store);
        (store, taxonomy)
    }

    #[test]
    fn test_empty_filter_returns_base_conditions_unchanged() {
        let (store, _) = seeded_store();
        let base = vec![Condition::eq("approval_status", json!("published"))];
        let outcome = apply_hazard_filter(&store, &HazardFilter::default(), base.clone()).unwrap();
        assert_eq!(outcome.conditions, base);
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn test_consistent_specific_hazard_filters_without_diagnostics() {
        let (store, taxonomy) = seeded_store();
        let filter = HazardFilter {
            hazard_type_id: Some(taxonomy.geophysical_type),
            hazard_cluster_id: Some(taxonomy.seismic_cluster),
            specific_hazard_id: Some(taxonomy.earthquake),
        };
        let outcome = apply_hazard_filter(&store, &filter, Vec::new()).unwrap();
        assert_eq!(
            outcome.conditions,
            vec![Condition::eq("specific_hazard_id", json!(taxonomy.earthquake))]
        );
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn test_mismatched_cluster_warns_but_specific_hazard_still_filters() {
        let (store, taxonomy) = seeded_store();

        let mut quake = hazardous_event("Ms 6.1 near the lake");
        quake.hazard_type_id = Some(taxonomy.geophysical_type);
        quake.hazard_cluster_id = Some(taxonomy.seismic_cluster);
        quake.specific_hazard_id = Some(taxonomy.earthquake);
        store.insert_hazardous_event(quake.clone());
        let mut flood = hazardous_event("River out of banks");
        flood.specific_hazard_id = Some(taxonomy.riverine_flood);
        store.insert_hazardous_event(flood);

        // Caller pairs the earthquake with the flood cluster.
        let filter = HazardFilter {
            hazard_type_id: None,
            hazard_cluster_id: Some(taxonomy.flood_cluster),
            specific_hazard_id: Some(taxonomy.earthquake),
        };
        let outcome = apply_hazard_filter(&store, &filter, Vec::new()).unwrap();

        assert_eq!(
            outcome.conditions,
            vec![Condition::eq("specific_hazard_id", json!(taxonomy.earthquake))]
        );
        assert_eq!(
            outcome.diagnostics,
            vec![Diagnostic::HierarchyMismatch {
                supplied_field: "hazard_cluster_id",
                supplied_id: taxonomy.flood_cluster,
                expected_id: taxonomy.seismic_cluster,
            }]
        );

        // The query still executes and returns the earthquake's rows.
        let rows = store.hazardous_event_query(&outcome.conditions).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, quake.id);
    }

    #[test]
    fn test_mismatched_type_with_specific_hazard_warns() {
        let (store, taxonomy) = seeded_store();
        let filter = HazardFilter {
            hazard_type_id: Some(taxonomy.hydro_type),
            hazard_cluster_id: None,
            specific_hazard_id: Some(taxonomy.earthquake),
        };
        let outcome = apply_hazard_filter(&store, &filter, Vec::new()).unwrap();
        assert_eq!(
            outcome.diagnostics,
            vec![Diagnostic::HierarchyMismatch {
                supplied_field: "hazard_type_id",
                supplied_id: taxonomy.hydro_type,
                expected_id: taxonomy.geophysical_type,
            }]
        );
    }

    #[test]
    fn test_cluster_with_mismatched_type_filters_both_and_warns() {
        let (store, taxonomy) = seeded_store();
        let filter = HazardFilter {
            hazard_type_id: Some(taxonomy.geophysical_type),
            hazard_cluster_id: Some(taxonomy.flood_cluster),
            specific_hazard_id: None,
        };
        let outcome = apply_hazard_filter(&store, &filter, Vec::new()).unwrap();

        // The caller's filter applies verbatim: cluster and type conditions.
        assert_eq!(
            outcome.conditions,
            vec![
                Condition::eq("hazard_cluster_id", json!(taxonomy.flood_cluster)),
                Condition::eq("hazard_type_id", json!(taxonomy.geophysical_type)),
            ]
        );
        assert_eq!(
            outcome.diagnostics,
            vec![Diagnostic::HierarchyMismatch {
                supplied_field: "hazard_type_id",
                supplied_id: taxonomy.geophysical_type,
                expected_id: taxonomy.hydro_type,
            }]
        );
    }

    #[test]
    fn test_consistent_cluster_and_type_has_no_diagnostics() {
        let (store, taxonomy) = seeded_store();
        let filter = HazardFilter {
            hazard_type_id: Some(taxonomy.hydro_type),
            hazard_cluster_id: Some(taxonomy.flood_cluster),
            specific_hazard_id: None,
        };
        let outcome = apply_hazard_filter(&store, &filter, Vec::new()).unwrap();
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn test_unknown_specific_hazard_warns_and_matches_zero_rows() {
        let (store, taxonomy) = seeded_store();
        let mut quake = hazardous_event("Quake");
        quake.specific_hazard_id = Some(taxonomy.earthquake);
        store.insert_hazardous_event(quake);

        let filter = HazardFilter {
            hazard_type_id: None,
            hazard_cluster_id: None,
            specific_hazard_id: Some(99999),
        };
        let outcome = apply_hazard_filter(&store, &filter, Vec::new()).unwrap();
        assert_eq!(
            outcome.diagnostics,
            vec![Diagnostic::UnknownFilterId {
                field: "specific_hazard_id",
                id: 99999,
            }]
        );

        // The stale id still filters; it just matches nothing.
        let rows = store.hazardous_event_query(&outcome.conditions).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_unknown_type_alone_warns() {
        let (store, _) = seeded_store();
        let filter = HazardFilter {
            hazard_type_id: Some(77),
            hazard_cluster_id: None,
            specific_hazard_id: None,
        };
        let outcome = apply_hazard_filter(&store, &filter, Vec::new()).unwrap();
        assert_eq!(
            outcome.diagnostics,
            vec![Diagnostic::UnknownFilterId {
                field: "hazard_type_id",
                id: 77,
            }]
        );
    }

    #[test]
    fn test_base_conditions_are_preserved_in_front() {
        let (store, taxonomy) = seeded_store();
        let base = vec![Condition::eq(
            "approval_status",
            serde_json::to_value(ApprovalStatus::Published).unwrap(),
        )];
        let filter = HazardFilter {
            hazard_type_id: Some(taxonomy.geophysical_type),
            hazard_cluster_id: None,
            specific_hazard_id: None,
        };
        let outcome = apply_hazard_filter(&store, &filter, base.clone()).unwrap();
        assert_eq!(outcome.conditions.len(), 2);
        assert_eq!(outcome.conditions[0], base[0]);
    }
}
