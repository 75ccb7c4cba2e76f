//! The FeaturizedDataset schema tree and its JSON dialect.
//!
//! A [`schema::Schema`] is a validated tree of [`schema::SchemaNode`] values
//! parsed from the JSON record-schema dialect. Record nodes carry a
//! name-to-position index over their fields; every other node kind carries
//! only its ordered children.

pub mod json;
pub mod schema;

pub use schema::{BasicType, Schema, SchemaNode};
