//! TeaFile containers
//!
//! This crate ties the lower layers together:
//! - [`TeaFile`]: create, open, read, append, seek and close a container
//! - [`TeaFileConfig`]: which sections a new file carries
//! - [`Item`] and [`item_descriptor!`]: typed records
//! - [`MappedItems`]: random access to the item region through a mapping
//!
//! Section encoding and the file layout live in `teafile-format`; shared
//! types and the error taxonomy in `teafile-core`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod item;
pub mod mmap;
pub mod teafile;

pub use config::{ConfigError, TeaFileConfig, TimeFieldConfig};
pub use item::Item;
pub use mmap::{MappedItems, TypedItems};
pub use teafile::TeaFile;

pub use teafile_core::{
    AccessMode, Error, Field, FieldType, ItemDescriptor, NameValue, Primitive, Result,
    SchemaMismatch,
};
pub use teafile_format::{
    ContentDescriptionSection, Header, ItemSection, NameValueSection, Preamble, Section,
    SectionId, Sections, TimeSection, EPOCH_1970, MICROS_PER_DAY, MILLIS_PER_DAY,
};
