//! Identity types for Sendai entities

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Row identifier using UUIDv7 for timestamp-sortable IDs.
/// UUIDv7 embeds a Unix timestamp, making IDs naturally sortable by creation time.
pub type EntityId = Uuid;

/// Reference-data identifier (divisions, sectors, hazard taxonomy).
/// These ids also appear as plain numbers inside stored footprint JSON.
pub type RefId = i64;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Generate a new UUIDv7 EntityId (timestamp-sortable).
pub fn new_entity_id() -> EntityId {
    Uuid::now_v7()
}
