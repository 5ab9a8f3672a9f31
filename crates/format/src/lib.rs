//! On-disk byte format for TeaFile containers.
//!
//! This crate centralizes all serialization logic for the file preamble:
//! the fixed header, the four metadata sections and the layout rules that
//! place the item region. Record I/O lives in `teafile-engine`.
//!
//! # File Layout
//!
//! ```text
//! ┌────────────────────────────────────┐
//! │ Header (32 bytes)                  │
//! ├────────────────────────────────────┤
//! │ Section ID (4) │ Length (4)        │
//! │ Section payload                    │  × sectionCount
//! ├────────────────────────────────────┤
//! │ Zero padding (1..=8 bytes)         │
//! ├────────────────────────────────────┤  ← itemStart (8-byte aligned)
//! │ Item 0 │ Item 1 │ ...              │
//! └────────────────────────────────────┘
//! ```
//!
//! # Byte Order
//!
//! Every multi-byte value, in the preamble and in the records, is written in
//! the creating host's native byte order. There is no byte-order marker
//! beyond the magic value: a file moved to a host of the other endianness
//! fails the magic check.
//!
//! # Module Structure
//!
//! - `codec`: length-prefixed text and name-value payloads
//! - `header`: the 32-byte file header
//! - `section`: Item, ContentDescription, NameValue and Time sections
//! - `layout`: item-start computation and preamble read/write

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod header;
pub mod layout;
pub mod section;

pub use header::{Header, HEADER_SIZE, MAGIC_VALUE};
pub use layout::{
    assemble_header, padding_for, read_preamble, write_preamble, Preamble, Sections,
    ITEM_ALIGNMENT, SECTION_PREFIX_SIZE,
};
pub use section::{
    ContentDescriptionSection, ItemSection, NameValueSection, Section, SectionId, TimeSection,
    EPOCH_1970, MICROS_PER_DAY, MILLIS_PER_DAY,
};
