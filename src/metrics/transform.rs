//! Record to point mapping
//!
//! Every record becomes exactly one point: `name` and `namespace` are the tags,
//! every other attribute is a field with its native type.

use crate::metrics::{FieldValue, Point, Precision};
use crate::source::Record;
use chrono::Utc;
use std::collections::BTreeMap;

/// Maps records to points, preserving order
///
/// Each point is stamped with the wall clock at the moment it is built; the
/// record's own `last_updated` is carried as a plain field.
pub fn records_to_points(
    records: &[Record],
    measurement: &str,
    precision: Precision,
) -> Vec<Point> {
    records
        .iter()
        .map(|record| record_to_point(record, measurement, precision))
        .collect()
}

/// Builds the point for a single record
pub fn record_to_point(record: &Record, measurement: &str, precision: Precision) -> Point {
    let mut tags = BTreeMap::new();
    tags.insert("name".to_string(), record.name.clone());
    tags.insert("namespace".to_string(), record.namespace.clone());

    let fields: BTreeMap<String, FieldValue> = [
        ("user", FieldValue::from(record.user.as_str())),
        ("repository_type", record.repository_type.as_str().into()),
        ("status", record.status.into()),
        ("description", record.description.as_str().into()),
        ("is_private", record.is_private.into()),
        ("is_automated", record.is_automated.into()),
        ("can_edit", record.can_edit.into()),
        ("star_count", record.star_count.into()),
        ("pull_count", record.pull_count.into()),
        ("last_updated", record.last_updated.as_str().into()),
        ("is_migrated", record.is_migrated.into()),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), value))
    .collect();

    Point {
        measurement: measurement.to_string(),
        tags,
        fields,
        time: Utc::now(),
        precision,
    }
}
