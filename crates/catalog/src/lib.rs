//! Describes the layout of table rows: field types, field descriptors ([`column::Column`]) and
//! tuple descriptors ([`schema::Schema`]).
//!
//! Also provides an API (via [`crate::serde`]) for converting between serialized and deserialized
//! representations of table rows / tuples.
pub mod column;
pub mod field;
pub mod schema;
pub mod serde;
pub mod tuple;
pub mod types;
