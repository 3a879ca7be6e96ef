//! Repository metadata API types
//!
//! - `Page`: one response of the paginated listing, carrying the `next` cursor
//! - `Record`: the metadata of a single repository

mod types;

pub use types::{Page, Record};
