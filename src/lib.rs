//! Decode flat form submissions into typed, validated values.
//!
//! A [`SchemaNode`] describes the expected shape. The decoder walks it
//! alongside a [`Submission`] (an ordered multi-map of dotted keys to text
//! values), coerces leaves by primitive kind, rebuilds nested objects and
//! arrays, then validates the result into an [`Outcome`].
pub mod action;
pub mod config;
pub mod decode;
pub mod error;
pub mod fields;
pub mod outcome;
pub mod path_de;
pub mod schema;
pub mod shape;
pub mod submission;
pub mod validate;
pub mod value;

pub use action::{FormAction, Input};
pub use config::{ArrayStrategy, DecoderConfig, IndexNotation};
pub use decode::{Decoder, decode, decode_value, lift_json};
pub use error::{DecodeError, PathError};
pub use fields::{FieldPath, FieldPaths};
pub use outcome::{FieldErrors, Outcome};
pub use schema::{Check, Pattern, PrimitiveKind, SchemaNode};
pub use shape::{Introspect, Shape};
pub use submission::{Entry, FilePart, Submission};
pub use validate::{PathSegment, Validator, Violation};
pub use value::FormValue;
