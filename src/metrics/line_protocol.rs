//! InfluxDB line protocol encoding
//!
//! `measurement[,tag=value...] field=value[,field=value...] timestamp`

use crate::metrics::{FieldValue, Point};
use std::fmt::Write;

/// Encodes a batch as newline-separated lines, in input order
pub fn encode_batch(points: &[Point]) -> String {
    let mut body = String::new();
    for point in points {
        encode_point(point, &mut body);
        body.push('\n');
    }
    body
}

/// Appends the line for `point` to `out` (without a trailing newline)
pub fn encode_point(point: &Point, out: &mut String) {
    escape_into(&point.measurement, &[',', ' '], out);

    // Tags with empty values are not representable and are dropped
    for (key, value) in point.tags.iter().filter(|(_, v)| !v.is_empty()) {
        out.push(',');
        escape_into(key, &[',', '=', ' '], out);
        out.push('=');
        escape_into(value, &[',', '=', ' '], out);
    }

    let mut separator = ' ';
    for (key, value) in &point.fields {
        out.push(separator);
        separator = ',';
        escape_into(key, &[',', '=', ' '], out);
        out.push('=');
        encode_field_value(value, out);
    }

    // Writing into a String cannot fail
    let _ = write!(out, " {}", point.precision.timestamp(&point.time));
}

fn encode_field_value(value: &FieldValue, out: &mut String) {
    match value {
        FieldValue::String(s) => {
            out.push('"');
            escape_into(s, &['"', '\\'], out);
            out.push('"');
        }
        FieldValue::Integer(i) => {
            let _ = write!(out, "{}i", i);
        }
        FieldValue::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
    }
}

fn escape_into(raw: &str, special: &[char], out: &mut String) {
    for c in raw.chars() {
        if special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
}
