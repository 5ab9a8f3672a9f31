//! Core types for TeaFile containers
//!
//! This crate defines the foundational types shared by the format codec and
//! the container engine:
//! - FieldType: The closed set of primitive field kinds and their type codes
//! - Field: One entry of a record's field table (index, type, offset, name)
//! - ItemDescriptor: The full layout of a fixed-size record type
//! - AccessMode: Whether a container was opened for reading or writing
//! - NameValue: Tagged values stored in the name-value section
//! - Error: Error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod types;
pub mod value;

pub use error::{Error, Result, SchemaMismatch};
pub use types::{AccessMode, Field, FieldType, ItemDescriptor, Primitive};
pub use value::NameValue;
