//! Error types for TeaFile containers
//!
//! Every fallible operation in the workspace returns [`Error`]. Errors are
//! never retried internally; a failed create or open yields no container.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use crate::types::{AccessMode, FieldType};
use std::io;
use thiserror::Error;

/// Result type alias for TeaFile operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for TeaFile containers
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from the underlying file, passed through unchanged.
    ///
    /// Short reads surface here as `UnexpectedEof`.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed bytes: bad magic, section length mismatch, unknown value tag
    #[error("Format error: {0}")]
    Format(String),

    /// Section ID not part of the format
    #[error("Unknown section ID {0:#x}")]
    UnknownSection(i32),

    /// Record layout does not match the stored item section
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(#[from] SchemaMismatch),

    /// Operation not permitted in the container's access mode, or not
    /// permitted by the sections the container was opened with
    #[error("Cannot {operation} in {mode} mode")]
    Mode {
        /// Operation that was attempted
        operation: &'static str,
        /// Mode the container was opened in
        mode: AccessMode,
    },

    /// Read-side operation needs an item section and the container has none
    #[error("Container has no item section")]
    NoItemSection,

    /// Item region is empty, nothing to map
    #[error("No item data to map")]
    NoData,

    /// Descriptor list rejected while deriving an item section
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// Creation configuration rejected
    #[error("Invalid config: {0}")]
    Config(String),
}

impl Error {
    /// Shorthand for [`Error::Format`]
    pub fn format(msg: impl Into<String>) -> Self {
        Error::Format(msg.into())
    }

    /// Shorthand for [`Error::Mode`]
    pub fn mode(operation: &'static str, mode: AccessMode) -> Self {
        Error::Mode { operation, mode }
    }

    /// True if this error is an `UnexpectedEof` from the underlying file
    pub fn is_eof(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof)
    }
}

/// Ways a record layout can disagree with a stored item section.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaMismatch {
    /// Different number of fields
    #[error("expected {expected} fields, got {actual}")]
    FieldCount {
        /// Field count stored in the file
        expected: usize,
        /// Field count provided by the caller
        actual: usize,
    },

    /// Field at `index` has a different type
    #[error("field {index} has type {actual}, expected {expected}")]
    FieldType {
        /// Position of the field
        index: usize,
        /// Type stored in the file
        expected: FieldType,
        /// Type provided by the caller
        actual: FieldType,
    },

    /// Field at `index` sits at a different byte offset
    #[error("field {index} has offset {actual}, expected {expected}")]
    FieldOffset {
        /// Position of the field
        index: usize,
        /// Offset stored in the file
        expected: i32,
        /// Offset provided by the caller
        actual: i32,
    },

    /// Record size differs from the stored item size
    #[error("item size is {actual} bytes, expected {expected}")]
    ItemSize {
        /// Item size stored in the file
        expected: usize,
        /// Size of the record provided by the caller
        actual: usize,
    },

    /// File carries no item section to validate against
    #[error("file has no item section")]
    MissingItemSection,
}
