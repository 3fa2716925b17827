//! Collection query description and in-memory ordering fallback.

use bson::{Bson, Document};
use std::cmp::Ordering;

/// Sort direction for an ordered query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Single-field sort specification
#[derive(Debug, Clone)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }

    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }
}

/// A collection query: at most one equality filter plus an optional order.
///
/// Ordering is a hint. Backends that cannot order an equality-filtered scan
/// without a composite index return matches unordered, and the caller applies
/// [`sort_in_memory`] with the same key. See the crate docs.
#[derive(Debug, Clone, Default)]
pub struct RecordQuery {
    pub filter: Option<(String, Bson)>,
    pub order_by: Option<SortSpec>,
}

impl RecordQuery {
    /// Match every record in the collection.
    pub fn all() -> Self {
        Self::default()
    }

    /// Match records whose `field` equals `value`.
    pub fn where_eq(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self {
            filter: Some((field.into(), value.into())),
            order_by: None,
        }
    }

    pub fn order_by_desc(mut self, field: impl Into<String>) -> Self {
        self.order_by = Some(SortSpec::descending(field));
        self
    }

    pub fn order_by_asc(mut self, field: impl Into<String>) -> Self {
        self.order_by = Some(SortSpec::ascending(field));
        self
    }

    /// Whether `record` satisfies the equality filter.
    pub fn matches(&self, record: &Document) -> bool {
        match &self.filter {
            Some((field, value)) => record.get(field) == Some(value),
            None => true,
        }
    }
}

/// Sort records in memory by the given key.
///
/// This is the fallback path for backends without native ordering. Records
/// missing the sort field compare below every present value, so a descending
/// sort puts them last. The sort is stable.
pub fn sort_in_memory(records: &mut [Document], spec: &SortSpec) {
    records.sort_by(|a, b| {
        let ord = compare_fields(a.get(&spec.field), b.get(&spec.field));
        match spec.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
}

fn compare_fields(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    match (a, b) {
        (None | Some(Bson::Null), None | Some(Bson::Null)) => Ordering::Equal,
        (None | Some(Bson::Null), Some(_)) => Ordering::Less,
        (Some(_), None | Some(Bson::Null)) => Ordering::Greater,
        (Some(a), Some(b)) => compare_values(a, b),
    }
}

/// Compare two BSON values of the kinds our records carry. ISO-8601 date
/// strings compare correctly as plain strings. Values of unrelated types
/// compare equal, which keeps the sort stable rather than panicking.
fn compare_values(a: &Bson, b: &Bson) -> Ordering {
    match (a, b) {
        (Bson::String(a), Bson::String(b)) => a.cmp(b),
        (Bson::DateTime(a), Bson::DateTime(b)) => a.cmp(b),
        (Bson::Boolean(a), Bson::Boolean(b)) => a.cmp(b),
        _ => match (as_f64(a), as_f64(b)) {
            (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        },
    }
}

fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(v) => Some(*v as f64),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        _ => None,
    }
}
