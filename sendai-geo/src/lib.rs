//! Sendai Geo - Spatial Footprint Matching
//!
//! Division lookup with an injected read-through cache, planar geometry over
//! lng/lat coordinates, and the six-rule footprint matcher used both as an
//! in-process predicate and as a store-level filter condition builder.

pub mod cache;
pub mod geometry;
pub mod matcher;

pub use cache::{CacheStats, DivisionCache, DivisionCacheConfig, DivisionProvider};
pub use geometry::{BoundingBox, Geometry, PolygonGeom, METERS_PER_DEGREE};
pub use matcher::{point_feature_match, shape_matches, MatchRule, SpatialMatcher};
