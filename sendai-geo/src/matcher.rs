//! Spatial footprint matching
//!
//! Decides whether a division is touched by a record's footprint. Six rules
//! with OR semantics: three direct division-id rules over ids embedded in the
//! stored GeoJSON, one named-level rule over the division's English name, and
//! two geometric rules over drawn shapes and point features.

use crate::cache::DivisionProvider;
use crate::geometry::{BoundingBox, Geometry, METERS_PER_DEGREE};
use sendai_core::{
    Condition, Division, FootprintEntry, FootprintShape, GeoJsonFootprint, RefId, SendaiResult,
};
use serde_json::json;
use std::collections::BTreeSet;

/// The individual matching rules, reported by `matched_rules` diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchRule {
    /// Division id listed in `properties.division_ids`.
    PropertyDivisionIds,
    /// Division id listed in `dts_info.division_ids`.
    InfoDivisionIds,
    /// Division id equal to `dts_info.division_id`.
    InfoDivisionId,
    /// `geographic_level` string equal to the division's English name.
    NamedLevel,
    /// Drawn marker/circle/rectangle/polygon intersects the division geometry.
    DrawnShape,
    /// GeoJSON `Point` feature contained in the division geometry.
    PointFeature,
}

/// Footprint matcher over an injected division provider (typically a
/// `DivisionCache` wrapping the store).
pub struct SpatialMatcher<P: DivisionProvider> {
    provider: P,
}

impl<P: DivisionProvider> SpatialMatcher<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Whether any footprint entry touches the division.
    ///
    /// Rules are evaluated cheapest first and the first hit returns: the
    /// direct id rules need no store access, the name rule needs the division
    /// row, the geometric rules additionally need its parsed geometry. A
    /// division id unknown to the store can still match the direct id rules.
    pub fn matches(&self, division_id: RefId, entries: &[FootprintEntry]) -> SendaiResult<bool> {
        if entries.iter().any(|e| direct_id_match(e, division_id)) {
            return Ok(true);
        }

        let Some(division) = self.provider.division_by_id(division_id)? else {
            return Ok(false);
        };
        if entries.iter().any(|e| named_level_match(e, &division)) {
            return Ok(true);
        }

        let Some(geometry) = division_geometry(&division) else {
            return Ok(false);
        };
        Ok(entries.iter().any(|e| geometric_match(e, &geometry)))
    }

    /// Which rules fire for the division, all six evaluated. Diagnostics
    /// only; `matches` is the decision path.
    pub fn matched_rules(
        &self,
        division_id: RefId,
        entries: &[FootprintEntry],
    ) -> SendaiResult<BTreeSet<MatchRule>> {
        let mut rules = BTreeSet::new();
        for entry in entries {
            if let FootprintEntry::GeoJson(g) = entry {
                if g.property_division_ids.contains(&division_id) {
                    rules.insert(MatchRule::PropertyDivisionIds);
                }
                if g.info_division_ids.contains(&division_id) {
                    rules.insert(MatchRule::InfoDivisionIds);
                }
                if g.info_division_id == Some(division_id) {
                    rules.insert(MatchRule::InfoDivisionId);
                }
            }
        }

        let Some(division) = self.provider.division_by_id(division_id)? else {
            return Ok(rules);
        };
        if entries.iter().any(|e| named_level_match(e, &division)) {
            rules.insert(MatchRule::NamedLevel);
        }

        if let Some(geometry) = division_geometry(&division) {
            for entry in entries {
                match entry {
                    FootprintEntry::Shape(shape) => {
                        if shape_matches(shape, &geometry) {
                            rules.insert(MatchRule::DrawnShape);
                        }
                    }
                    FootprintEntry::GeoJson(g) => {
                        if point_feature_match(g, &geometry) {
                            rules.insert(MatchRule::PointFeature);
                        }
                    }
                    _ => {}
                }
            }
        }

        tracing::debug!(division_id, ?rules, "footprint rule diagnostics");
        Ok(rules)
    }

    /// The same six predicates as a store-level condition: the id and name
    /// rules as footprint-path predicates, the geometric rules delegated to
    /// the store's spatial evaluation.
    pub fn filter_condition(&self, division_id: RefId) -> SendaiResult<Condition> {
        let mut alternatives = vec![
            Condition::footprint_contains(
                &["geojson", "properties", "division_ids"],
                json!(division_id),
            ),
            Condition::footprint_contains(
                &["geojson", "dts_info", "division_ids"],
                json!(division_id),
            ),
            Condition::footprint_eq(&["geojson", "dts_info", "division_id"], json!(division_id)),
        ];
        if let Some(division) = self.provider.division_by_id(division_id)? {
            if let Some(name) = division.english_name() {
                alternatives.push(Condition::footprint_eq(&["geographic_level"], json!(name)));
            }
        }
        alternatives.push(Condition::FootprintIntersectsDivision { division_id });
        Ok(Condition::Any(alternatives))
    }
}

/// Direct id rules: ids embedded in the stored GeoJSON, no store access needed.
fn direct_id_match(entry: &FootprintEntry, division_id: RefId) -> bool {
    match entry {
        FootprintEntry::GeoJson(g) => {
            g.property_division_ids.contains(&division_id)
                || g.info_division_ids.contains(&division_id)
                || g.info_division_id == Some(division_id)
        }
        _ => false,
    }
}

fn named_level_match(entry: &FootprintEntry, division: &Division) -> bool {
    match (entry, division.english_name()) {
        (FootprintEntry::NamedLevel(level), Some(name)) => level == name,
        _ => false,
    }
}

fn division_geometry(division: &Division) -> Option<Geometry> {
    division.geometry.as_ref().and_then(Geometry::from_geojson)
}

fn geometric_match(entry: &FootprintEntry, geometry: &Geometry) -> bool {
    match entry {
        FootprintEntry::Shape(shape) => shape_matches(shape, geometry),
        FootprintEntry::GeoJson(g) => point_feature_match(g, geometry),
        _ => false,
    }
}

/// Evaluate one drawn shape against the division geometry. Also used by the
/// in-memory store to evaluate `Condition::FootprintIntersectsDivision`.
pub fn shape_matches(shape: &FootprintShape, geometry: &Geometry) -> bool {
    match shape {
        FootprintShape::Markers(points) => points.iter().any(|p| geometry.contains_point(p)),
        FootprintShape::Circle { center, radius_m } => {
            // Meters to degrees via the flat-earth factor. A zero radius
            // degenerates to containment of the center.
            let radius_deg = radius_m / METERS_PER_DEGREE;
            geometry.distance_deg(center) <= radius_deg
        }
        FootprintShape::Rectangle {
            south_west,
            north_east,
        } => {
            let drawn = BoundingBox {
                min: *south_west,
                max: *north_east,
            };
            geometry
                .bounding_box()
                .is_some_and(|bbox| bbox.intersects(&drawn))
        }
        FootprintShape::Polygon(ring) => geometry.intersects_ring(ring),
    }
}

/// Any `Point` feature contained in the division geometry.
pub fn point_feature_match(footprint: &GeoJsonFootprint, geometry: &Geometry) -> bool {
    footprint
        .point_features
        .iter()
        .any(|p| geometry.contains_point(p))
}

// =============================================================================
// TESTS
// =============================================================================
