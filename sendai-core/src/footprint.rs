//! Spatial footprint normalization
//!
//! Stored footprints are arrays of heterogeneous JSON: drawn map shapes under
//! a `map_coords` key, GeoJSON under a `geojson` key (whose `properties` or
//! `dts_info` blocks may name division ids directly), or a bare
//! `geographic_level` division name. This module parses that loose JSON once
//! into an explicit sum type; downstream code never probes raw properties.

use crate::RefId;
use serde::{Deserialize, Serialize};

/// A longitude/latitude pair, degrees, WGS84 order `[lng, lat]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

/// A shape drawn on the entry-form map (`map_coords` key).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FootprintShape {
    /// One or more dropped point markers.
    Markers(Vec<LngLat>),
    /// Circle with a center and a radius in meters.
    Circle { center: LngLat, radius_m: f64 },
    /// Axis-aligned rectangle, corners normalized to south-west/north-east.
    Rectangle {
        south_west: LngLat,
        north_east: LngLat,
    },
    /// Closed polygon ring (closing vertex optional in stored data).
    Polygon(Vec<LngLat>),
}

/// Normalized view of a `geojson` footprint entry.
///
/// Division ids named directly in the JSON are kept separate per source
/// block because the matching rules (and their diagnostics) distinguish them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoJsonFootprint {
    /// Ids from `properties.division_ids` (plus a scalar `properties.division_id`).
    pub property_division_ids: Vec<RefId>,
    /// Ids from `dts_info.division_ids`.
    pub info_division_ids: Vec<RefId>,
    /// Id from `dts_info.division_id`.
    pub info_division_id: Option<RefId>,
    /// Coordinates of every `Point` feature geometry.
    pub point_features: Vec<LngLat>,
}

/// One normalized footprint entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FootprintEntry {
    Shape(FootprintShape),
    GeoJson(GeoJsonFootprint),
    /// English division name from a `geographic_level` string.
    NamedLevel(String),
    /// Entry with none of the recognized keys. Never matches anything.
    Opaque,
}

/// Parse a stored footprint column into normalized entries.
///
/// Accepts an array of entries or a single entry object. Malformed entries
/// degrade to `Opaque` rather than failing the parse; stored footprints are
/// user-drawn data and a bad entry must not poison its siblings.
pub fn parse_footprint(raw: &serde_json::Value) -> Vec<FootprintEntry> {
    match raw {
        serde_json::Value::Array(entries) => entries.iter().map(parse_entry).collect(),
        serde_json::Value::Object(_) => vec![parse_entry(raw)],
        _ => Vec::new(),
    }
}

fn parse_entry(entry: &serde_json::Value) -> FootprintEntry {
    let Some(obj) = entry.as_object() else {
        return FootprintEntry::Opaque;
    };
    if let Some(geojson) = obj.get("geojson") {
        return FootprintEntry::GeoJson(parse_geojson(geojson));
    }
    if let Some(coords) = obj.get("map_coords") {
        if let Some(shape) = parse_shape(coords) {
            return FootprintEntry::Shape(shape);
        }
        return FootprintEntry::Opaque;
    }
    if let Some(level) = obj.get("geographic_level").and_then(|v| v.as_str()) {
        return FootprintEntry::NamedLevel(level.to_string());
    }
    FootprintEntry::Opaque
}

fn parse_geojson(geojson: &serde_json::Value) -> GeoJsonFootprint {
    let mut out = GeoJsonFootprint::default();
    collect_geojson_object(geojson, &mut out);
    if let Some(features) = geojson.get("features").and_then(|f| f.as_array()) {
        for feature in features {
            collect_geojson_object(feature, &mut out);
        }
    }
    out
}

/// Collect division ids and point geometries from one Feature-shaped object.
fn collect_geojson_object(value: &serde_json::Value, out: &mut GeoJsonFootprint) {
    if let Some(properties) = value.get("properties") {
        collect_ref_ids(properties.get("division_ids"), &mut out.property_division_ids);
        if let Some(id) = properties.get("division_id").and_then(as_ref_id) {
            out.property_division_ids.push(id);
        }
    }
    if let Some(info) = value.get("dts_info") {
        collect_ref_ids(info.get("division_ids"), &mut out.info_division_ids);
        if out.info_division_id.is_none() {
            out.info_division_id = info.get("division_id").and_then(as_ref_id);
        }
    }
    if let Some(geometry) = value.get("geometry") {
        let is_point = geometry.get("type").and_then(|t| t.as_str()) == Some("Point");
        if is_point {
            if let Some(point) = geometry.get("coordinates").and_then(parse_position) {
                out.point_features.push(point);
            }
        }
    }
}

fn parse_shape(coords: &serde_json::Value) -> Option<FootprintShape> {
    let mode = coords.get("mode").and_then(|m| m.as_str())?;
    match mode {
        "markers" => {
            let positions = parse_positions(coords.get("coordinates")?)?;
            if positions.is_empty() {
                return None;
            }
            Some(FootprintShape::Markers(positions))
        }
        "circle" => {
            let center = parse_position(coords.get("center")?)?;
            let radius_m = as_f64(coords.get("radius")?)?;
            if !radius_m.is_finite() || radius_m < 0.0 {
                return None;
            }
            Some(FootprintShape::Circle { center, radius_m })
        }
        "rectangle" => {
            let corners = parse_positions(coords.get("coordinates").or(coords.get("bounds"))?)?;
            if corners.len() < 2 {
                return None;
            }
            let (a, b) = (corners[0], corners[1]);
            Some(FootprintShape::Rectangle {
                south_west: LngLat::new(a.lng.min(b.lng), a.lat.min(b.lat)),
                north_east: LngLat::new(a.lng.max(b.lng), a.lat.max(b.lat)),
            })
        }
        "polygon" => {
            let ring = parse_ring(coords.get("coordinates")?)?;
            if ring.len() < 3 {
                return None;
            }
            Some(FootprintShape::Polygon(ring))
        }
        _ => None,
    }
}

/// Polygon coordinates arrive either as a ring or as a one-ring nesting
/// (`[[...positions...]]`), depending on which map widget saved them.
fn parse_ring(value: &serde_json::Value) -> Option<Vec<LngLat>> {
    let arr = value.as_array()?;
    if let Some(first) = arr.first() {
        if parse_position(first).is_none() {
            return parse_positions(first);
        }
    }
    parse_positions(value)
}

fn parse_positions(value: &serde_json::Value) -> Option<Vec<LngLat>> {
    let arr = value.as_array()?;
    let mut out = Vec::with_capacity(arr.len());
    for item in arr {
        out.push(parse_position(item)?);
    }
    Some(out)
}

/// A position is `[lng, lat]` or a `{lng, lat}` / `{lat, lng}` object, with
/// numbers possibly stored as strings.
fn parse_position(value: &serde_json::Value) -> Option<LngLat> {
    if let Some(pair) = value.as_array() {
        if pair.len() >= 2 {
            return Some(LngLat::new(as_f64(&pair[0])?, as_f64(&pair[1])?));
        }
        return None;
    }
    if let Some(obj) = value.as_object() {
        let lng = obj.get("lng").or(obj.get("lon")).or(obj.get("longitude"))?;
        let lat = obj.get("lat").or(obj.get("latitude"))?;
        return Some(LngLat::new(as_f64(lng)?, as_f64(lat)?));
    }
    None
}

fn collect_ref_ids(value: Option<&serde_json::Value>, out: &mut Vec<RefId>) {
    if let Some(arr) = value.and_then(|v| v.as_array()) {
        out.extend(arr.iter().filter_map(as_ref_id));
    }
}

fn as_ref_id(value: &serde_json::Value) -> Option<RefId> {
    match value {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_f64(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
