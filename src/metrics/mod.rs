//! Time-series side of the collector
//!
//! - `Point`, `FieldValue`, `Precision`: the sample model
//! - `transform`: repository records to points
//! - `line_protocol`: InfluxDB line protocol encoding
//! - `writer`: batch writes over the InfluxDB 1.x HTTP API

pub mod line_protocol;
mod point;
mod transform;
mod writer;

pub use point::{FieldValue, Point, Precision};
pub use transform::{record_to_point, records_to_points};
pub use writer::{InfluxWriter, RETENTION_POLICY};
