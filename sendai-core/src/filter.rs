//! Composable filter conditions for store queries
//!
//! Conditions are built by the core (hazard filter, spatial filter) and
//! evaluated by the store. The same tree works as an in-memory predicate over
//! mock rows and as input to a SQL compiler on a relational backend.

use crate::RefId;
use serde::{Deserialize, Serialize};

/// Filter operator for field comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    /// Equal to
    Eq,
    /// Not equal to
    Ne,
    /// Greater than
    Gt,
    /// Less than
    Lt,
    /// Greater than or equal
    Gte,
    /// Less than or equal
    Lte,
    /// Array membership (value is contained in the stored array)
    Contains,
    /// In list of values
    In,
}

/// A single field comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldCondition {
    /// Field to filter on
    pub field: String,
    /// Operator to apply
    pub operator: FilterOperator,
    /// Value to compare against (JSON value for flexibility)
    pub value: serde_json::Value,
}

/// Composable filter condition tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    /// Comparison against a scalar column.
    Field(FieldCondition),
    /// Comparison against a path inside each entry of the stored spatial
    /// footprint array. Matches when any entry satisfies the predicate.
    FootprintPath {
        path: Vec<String>,
        operator: FilterOperator,
        value: serde_json::Value,
    },
    /// Store-evaluated geometric test: any drawn shape or point feature in
    /// the footprint intersects the division's geometry. A SQL backend
    /// compiles this to its spatial predicate; the in-memory store evaluates
    /// it with the geometry code.
    FootprintIntersectsDivision { division_id: RefId },
    /// Every child must match.
    All(Vec<Condition>),
    /// At least one child must match.
    Any(Vec<Condition>),
}

impl Condition {
    /// Create an equality condition on a scalar column.
    pub fn eq(field: impl Into<String>, value: serde_json::Value) -> Self {
        Condition::Field(FieldCondition {
            field: field.into(),
            operator: FilterOperator::Eq,
            value,
        })
    }

    /// Create a membership condition on a footprint-entry path.
    pub fn footprint_contains(path: &[&str], value: serde_json::Value) -> Self {
        Condition::FootprintPath {
            path: path.iter().map(|s| s.to_string()).collect(),
            operator: FilterOperator::Contains,
            value,
        }
    }

    /// Create an equality condition on a footprint-entry path.
    pub fn footprint_eq(path: &[&str], value: serde_json::Value) -> Self {
        Condition::FootprintPath {
            path: path.iter().map(|s| s.to_string()).collect(),
            operator: FilterOperator::Eq,
            value,
        }
    }
}
