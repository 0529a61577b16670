//! # Fields
//!
//! Everything the engine knows about a record's attributes comes from here:
//!
//! - [`FieldSpec`]: declarative descriptor (key, label, kind, participation)
//! - [`FieldValue`]: the runtime value read from a record
//! - [`FilterOp`]: per-field filter operators, resolved by [`ValueKind`]
//!
//! The engine never guesses at value semantics beyond what the descriptor
//! declares. Missing keys read as [`FieldValue::Empty`].

pub mod filter;
pub mod spec;
pub mod value;

pub use filter::FilterOp;
pub use spec::{CellFormatter, EnumOption, FieldSpec, Participation, Validator, ValueKind};
pub use value::FieldValue;
