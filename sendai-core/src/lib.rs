//! Sendai Core - Entity Types
//!
//! Data types shared by every crate in the workspace: row structs, id
//! aliases, the error taxonomy, filter conditions, monetary helpers, and the
//! spatial-footprint sum type. Boundary normalization lives here; business
//! logic does not.

pub mod entities;
pub mod enums;
pub mod error;
pub mod filter;
pub mod footprint;
pub mod ids;
pub mod money;

pub use entities::{
    DamageRecord, DisasterEvent, DisasterRecord, Disruption, Division, HazardCluster,
    HazardType, HazardousEvent, LossRecord, Sector, SectorRelation, SpecificHazard,
};
pub use enums::{ApprovalStatus, EntityType};
pub use error::{Diagnostic, SendaiError, SendaiResult, StoreError, ValidationError};
pub use filter::{Condition, FieldCondition, FilterOperator};
pub use footprint::{parse_footprint, FootprintEntry, FootprintShape, GeoJsonFootprint, LngLat};
pub use ids::{new_entity_id, EntityId, RefId, Timestamp};
pub use money::{amount_or_zero, format_amount, parse_amount};
