//! Planar geometry over lng/lat coordinates
//!
//! All tests are flat-earth approximations in degree space, which is
//! acceptable at the country scale this system targets. Circle radii stored
//! in meters convert to degrees via `METERS_PER_DEGREE`.

use sendai_core::LngLat;

/// Flat-earth degree length. One degree of latitude is roughly 111,320 m;
/// the same factor is applied to longitude, a documented approximation.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

const EPSILON: f64 = 1e-9;

/// Axis-aligned bounding box in degree space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: LngLat,
    pub max: LngLat,
}

impl BoundingBox {
    pub fn of_points(points: &[LngLat]) -> Option<Self> {
        let first = points.first()?;
        let mut bbox = BoundingBox { min: *first, max: *first };
        for p in &points[1..] {
            bbox.min.lng = bbox.min.lng.min(p.lng);
            bbox.min.lat = bbox.min.lat.min(p.lat);
            bbox.max.lng = bbox.max.lng.max(p.lng);
            bbox.max.lat = bbox.max.lat.max(p.lat);
        }
        Some(bbox)
    }

    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min.lng <= other.max.lng
            && self.max.lng >= other.min.lng
            && self.min.lat <= other.max.lat
            && self.max.lat >= other.min.lat
    }

    fn merge(self, other: BoundingBox) -> BoundingBox {
        BoundingBox {
            min: LngLat::new(self.min.lng.min(other.min.lng), self.min.lat.min(other.min.lat)),
            max: LngLat::new(self.max.lng.max(other.max.lng), self.max.lat.max(other.max.lat)),
        }
    }
}

/// One polygon: an exterior ring and zero or more interior holes.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonGeom {
    pub exterior: Vec<LngLat>,
    pub holes: Vec<Vec<LngLat>>,
}

/// Parsed division geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(LngLat),
    Polygon(PolygonGeom),
    MultiPolygon(Vec<PolygonGeom>),
}

impl Geometry {
    /// Parse a stored GeoJSON value. Accepts a bare geometry, a Feature, or
    /// a FeatureCollection (polygonal members collected into a MultiPolygon).
    /// Returns `None` for shapes the matcher cannot use.
    pub fn from_geojson(value: &serde_json::Value) -> Option<Geometry> {
        let kind = value.get("type")?.as_str()?;
        match kind {
            "Feature" => Geometry::from_geojson(value.get("geometry")?),
            "FeatureCollection" => {
                let features = value.get("features")?.as_array()?;
                let mut polygons = Vec::new();
                let mut point = None;
                for feature in features {
                    match Geometry::from_geojson(feature) {
                        Some(Geometry::Polygon(p)) => polygons.push(p),
                        Some(Geometry::MultiPolygon(ps)) => polygons.extend(ps),
                        Some(Geometry::Point(p)) if point.is_none() => point = Some(p),
                        _ => {}
                    }
                }
                if !polygons.is_empty() {
                    Some(Geometry::MultiPolygon(polygons))
                } else {
                    point.map(Geometry::Point)
                }
            }
            "Point" => parse_position(value.get("coordinates")?).map(Geometry::Point),
            "Polygon" => parse_polygon(value.get("coordinates")?).map(Geometry::Polygon),
            "MultiPolygon" => {
                let outer = value.get("coordinates")?.as_array()?;
                let polygons: Vec<PolygonGeom> =
                    outer.iter().filter_map(parse_polygon).collect();
                if polygons.is_empty() {
                    None
                } else {
                    Some(Geometry::MultiPolygon(polygons))
                }
            }
            _ => None,
        }
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        match self {
            Geometry::Point(p) => Some(BoundingBox { min: *p, max: *p }),
            Geometry::Polygon(poly) => BoundingBox::of_points(&poly.exterior),
            Geometry::MultiPolygon(polys) => polys
                .iter()
                .filter_map(|p| BoundingBox::of_points(&p.exterior))
                .reduce(BoundingBox::merge),
        }
    }

    /// Point containment. A Point geometry contains only (near-)coincident
    /// points; polygon containment is ray casting minus holes.
    pub fn contains_point(&self, point: &LngLat) -> bool {
        match self {
            Geometry::Point(p) => {
                (p.lng - point.lng).abs() < EPSILON && (p.lat - point.lat).abs() < EPSILON
            }
            Geometry::Polygon(poly) => polygon_contains(poly, point),
            Geometry::MultiPolygon(polys) => polys.iter().any(|p| polygon_contains(p, point)),
        }
    }

    /// Minimum planar distance in degrees from a point to this geometry.
    /// Zero when the point is contained.
    pub fn distance_deg(&self, point: &LngLat) -> f64 {
        if self.contains_point(point) {
            return 0.0;
        }
        match self {
            Geometry::Point(p) => planar_distance(p, point),
            Geometry::Polygon(poly) => polygon_distance(poly, point),
            Geometry::MultiPolygon(polys) => polys
                .iter()
                .map(|p| polygon_distance(p, point))
                .fold(f64::INFINITY, f64::min),
        }
    }

    /// Polygon intersection against a drawn ring: true when either shape
    /// contains a vertex of the other or any pair of edges crosses.
    pub fn intersects_ring(&self, ring: &[LngLat]) -> bool {
        if ring.len() < 3 {
            return false;
        }
        if ring.iter().any(|v| self.contains_point(v)) {
            return true;
        }
        match self {
            Geometry::Point(p) => point_in_ring(ring, p),
            Geometry::Polygon(poly) => ring_intersects_ring(&poly.exterior, ring),
            Geometry::MultiPolygon(polys) => polys
                .iter()
                .any(|p| ring_intersects_ring(&p.exterior, ring)),
        }
    }
}

fn parse_polygon(coordinates: &serde_json::Value) -> Option<PolygonGeom> {
    let rings = coordinates.as_array()?;
    let mut iter = rings.iter();
    let exterior = parse_ring(iter.next()?)?;
    if exterior.len() < 3 {
        return None;
    }
    let holes = iter.filter_map(parse_ring).collect();
    Some(PolygonGeom { exterior, holes })
}

fn parse_ring(value: &serde_json::Value) -> Option<Vec<LngLat>> {
    let arr = value.as_array()?;
    let mut out = Vec::with_capacity(arr.len());
    for item in arr {
        out.push(parse_position(item)?);
    }
    Some(out)
}

fn parse_position(value: &serde_json::Value) -> Option<LngLat> {
    let pair = value.as_array()?;
    if pair.len() < 2 {
        return None;
    }
    Some(LngLat::new(pair[0].as_f64()?, pair[1].as_f64()?))
}

fn polygon_contains(poly: &PolygonGeom, point: &LngLat) -> bool {
    if !point_in_ring(&poly.exterior, point) {
        return false;
    }
    !poly.holes.iter().any(|hole| point_in_ring(hole, point))
}

/// Ray casting. Counts crossings of a horizontal ray to the east; treats the
/// ring as closed whether or not the closing vertex is stored.
pub fn point_in_ring(ring: &[LngLat], point: &LngLat) -> bool {
    if ring.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (a, b) = (&ring[i], &ring[j]);
        if (a.lat > point.lat) != (b.lat > point.lat) {
            let slope_lng = (b.lng - a.lng) * (point.lat - a.lat) / (b.lat - a.lat) + a.lng;
            if point.lng < slope_lng {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

fn ring_intersects_ring(a: &[LngLat], b: &[LngLat]) -> bool {
    if a.iter().any(|v| point_in_ring(b, v)) || b.iter().any(|v| point_in_ring(a, v)) {
        return true;
    }
    for (a1, a2) in ring_edges(a) {
        for (b1, b2) in ring_edges(b) {
            if segments_intersect(a1, a2, b1, b2) {
                return true;
            }
        }
    }
    false
}

fn ring_edges(ring: &[LngLat]) -> impl Iterator<Item = (&LngLat, &LngLat)> {
    (0..ring.len()).map(move |i| (&ring[i], &ring[(i + 1) % ring.len()]))
}

fn segments_intersect(p1: &LngLat, p2: &LngLat, q1: &LngLat, q2: &LngLat) -> bool {
    let d1 = cross(q1, q2, p1);
    let d2 = cross(q1, q2, p2);
    let d3 = cross(p1, p2, q1);
    let d4 = cross(p1, p2, q2);
    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }
    (d1.abs() < EPSILON && on_segment(q1, q2, p1))
        || (d2.abs() < EPSILON && on_segment(q1, q2, p2))
        || (d3.abs() < EPSILON && on_segment(p1, p2, q1))
        || (d4.abs() < EPSILON && on_segment(p1, p2, q2))
}

fn cross(o: &LngLat, a: &LngLat, b: &LngLat) -> f64 {
    (a.lng - o.lng) * (b.lat - o.lat) - (a.lat - o.lat) * (b.lng - o.lng)
}

fn on_segment(a: &LngLat, b: &LngLat, p: &LngLat) -> bool {
    p.lng >= a.lng.min(b.lng) - EPSILON
        && p.lng <= a.lng.max(b.lng) + EPSILON
        && p.lat >= a.lat.min(b.lat) - EPSILON
        && p.lat <= a.lat.max(b.lat) + EPSILON
}

fn planar_distance(a: &LngLat, b: &LngLat) -> f64 {
    ((a.lng - b.lng).powi(2) + (a.lat - b.lat).powi(2)).sqrt()
}

/// Distance to the polygon boundary, hole edges included: a point sitting
/// inside a hole is nearest to the hole's ring, not the exterior.
fn polygon_distance(poly: &PolygonGeom, point: &LngLat) -> f64 {
    let exterior = ring_distance(&poly.exterior, point);
    poly.holes
        .iter()
        .map(|hole| ring_distance(hole, point))
        .fold(exterior, f64::min)
}

fn ring_distance(ring: &[LngLat], point: &LngLat) -> f64 {
    ring_edges(ring)
        .map(|(a, b)| point_to_segment_distance(point, a, b))
        .fold(f64::INFINITY, f64::min)
}

fn point_to_segment_distance(p: &LngLat, a: &LngLat, b: &LngLat) -> f64 {
    let (dx, dy) = (b.lng - a.lng, b.lat - a.lat);
    let len_sq = dx * dx + dy * dy;
    if len_sq < EPSILON {
        return planar_distance(p, a);
    }
    let t = (((p.lng - a.lng) * dx + (p.lat - a.lat) * dy) / len_sq).clamp(0.0, 1.0);
    let projection = LngLat::new(a.lng + t * dx, a.lat + t * dy);
    planar_distance(p, &projection)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn unit_square() -> Vec<LngLat> {
        vec![
            LngLat::new(0.0, 0.0),
            LngLat::new(1.0, 0.0),
            LngLat::new(1.0, 1.0),
            LngLat::new(0.0, 1.0),
        ]
    }

    fn square_geometry() -> Geometry {
        Geometry::Polygon(PolygonGeom {
            exterior: unit_square(),
            holes: vec![],
        })
    }

    #[test]
    fn test_point_in_ring_basic() {
        let ring = unit_square();
        assert!(point_in_ring(&ring, &LngLat::new(0.5, 0.5)));
        assert!(!point_in_ring(&ring, &LngLat::new(1.5, 0.5)));
        assert!(!point_in_ring(&ring, &LngLat::new(-0.1, 0.5)));
    }

    #[test]
    fn test_polygon_with_hole_excludes_hole_interior() {
        let poly = PolygonGeom {
            exterior: unit_square(),
            holes: vec![vec![
                LngLat::new(0.4, 0.4),
                LngLat::new(0.6, 0.4),
                LngLat::new(0.6, 0.6),
                LngLat::new(0.4, 0.6),
            ]],
        };
        let geom = Geometry::Polygon(poly);
        assert!(geom.contains_point(&LngLat::new(0.2, 0.2)));
        assert!(!geom.contains_point(&LngLat::new(0.5, 0.5)));
    }

    #[test]
    fn test_from_geojson_polygon() {
        let value = json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]]
        });
        let geom = Geometry::from_geojson(&value).unwrap();
        assert!(geom.contains_point(&LngLat::new(0.5, 0.5)));
    }

    #[test]
    fn test_from_geojson_feature_wrapper() {
        let value = json!({
            "type": "Feature",
            "properties": {},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]]
            }
        });
        assert!(Geometry::from_geojson(&value).is_some());
    }

    #[test]
    fn test_from_geojson_rejects_unusable_types() {
        assert!(Geometry::from_geojson(&json!({"type": "LineString", "coordinates": []})).is_none());
        assert!(Geometry::from_geojson(&json!({"type": "Polygon", "coordinates": [[]]})).is_none());
        assert!(Geometry::from_geojson(&json!(null)).is_none());
    }

    #[test]
    fn test_distance_deg_zero_inside_positive_outside() {
        let geom = square_geometry();
        assert_eq!(geom.distance_deg(&LngLat::new(0.5, 0.5)), 0.0);
        let d = geom.distance_deg(&LngLat::new(2.0, 0.5));
        assert!((d - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_intersects_ring_overlap_and_disjoint() {
        let geom = square_geometry();
        let overlapping = vec![
            LngLat::new(0.5, 0.5),
            LngLat::new(1.5, 0.5),
            LngLat::new(1.5, 1.5),
            LngLat::new(0.5, 1.5),
        ];
        let disjoint = vec![
            LngLat::new(2.0, 2.0),
            LngLat::new(3.0, 2.0),
            LngLat::new(3.0, 3.0),
            LngLat::new(2.0, 3.0),
        ];
        assert!(geom.intersects_ring(&overlapping));
        assert!(!geom.intersects_ring(&disjoint));
    }

    #[test]
    fn test_intersects_ring_containment_without_edge_crossing() {
        // Drawn ring entirely inside the division: no edges cross.
        let geom = square_geometry();
        let inner = vec![
            LngLat::new(0.2, 0.2),
            LngLat::new(0.8, 0.2),
            LngLat::new(0.8, 0.8),
            LngLat::new(0.2, 0.8),
        ];
        assert!(geom.intersects_ring(&inner));

        // Division entirely inside the drawn ring.
        let outer = vec![
            LngLat::new(-1.0, -1.0),
            LngLat::new(2.0, -1.0),
            LngLat::new(2.0, 2.0),
            LngLat::new(-1.0, 2.0),
        ];
        assert!(geom.intersects_ring(&outer));
    }

    #[test]
    fn test_bounding_box_intersection() {
        let a = BoundingBox {
            min: LngLat::new(0.0, 0.0),
            max: LngLat::new(1.0, 1.0),
        };
        let b = BoundingBox {
            min: LngLat::new(0.9, 0.9),
            max: LngLat::new(2.0, 2.0),
        };
        let c = BoundingBox {
            min: LngLat::new(1.1, 1.1),
            max: LngLat::new(2.0, 2.0),
        };
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    proptest! {
        #[test]
        fn prop_points_outside_bbox_are_outside_ring(
            lng in -10.0f64..10.0,
            lat in -10.0f64..10.0,
        ) {
            let ring = unit_square();
            let p = LngLat::new(lng, lat);
            if !(0.0..=1.0).contains(&lng) || !(0.0..=1.0).contains(&lat) {
                prop_assert!(!point_in_ring(&ring, &p));
            }
        }

        #[test]
        fn prop_distance_deg_is_non_negative(
            lng in -10.0f64..10.0,
            lat in -10.0f64..10.0,
        ) {
            let d = square_geometry().distance_deg(&LngLat::new(lng, lat));
            prop_assert!(d >= 0.0);
        }
    }
}
