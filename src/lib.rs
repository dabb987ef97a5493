//! Validates nested JSON data against a declarative schema, reporting one
//! error per failing field and producing a sanitized copy of the data that
//! holds only the schema-declared fields with valid values.
//!
//! Validation is a recursive descent, so deeply nested schemas consume stack
//! proportionally. Use [`ValidateOptions::with_max_depth`] when schemas come
//! from untrusted sources.

mod formats;
mod schema;
mod serde_schema;
mod types;
mod validate;

pub use formats::*;
pub use schema::*;
pub use serde_schema::*;
pub use types::*;
pub use validate::*;
