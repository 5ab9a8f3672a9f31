//! Metadata sections.
//!
//! Each section is written as a prefix followed by its payload:
//!
//! ```text
//! [Section ID: i32] [Payload length: i32] [Payload: length bytes]
//! ```
//!
//! The payload length must equal [`Section::size_in_bytes`]; layout
//! computation relies on it.

mod content;
mod item;
mod name_value;
mod time;

pub use content::ContentDescriptionSection;
pub use item::ItemSection;
pub use name_value::NameValueSection;
pub use time::{TimeSection, EPOCH_1970, MICROS_PER_DAY, MILLIS_PER_DAY};

use std::fmt;
use std::io::{Read, Write};
use teafile_core::Result;

/// Section identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum SectionId {
    /// Record layout
    Item = 0x0a,
    /// Free-form description
    ContentDescription = 0x80,
    /// Name-value metadata
    NameValue = 0x81,
    /// Time field metadata
    Time = 0x40,
}

impl SectionId {
    /// Canonical write order
    pub const CANONICAL_ORDER: [SectionId; 4] = [
        SectionId::Item,
        SectionId::ContentDescription,
        SectionId::NameValue,
        SectionId::Time,
    ];

    /// Parse an on-disk section ID
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0x0a => Some(SectionId::Item),
            0x80 => Some(SectionId::ContentDescription),
            0x81 => Some(SectionId::NameValue),
            0x40 => Some(SectionId::Time),
            _ => None,
        }
    }

    /// On-disk section ID
    pub fn as_raw(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SectionId::Item => "item",
            SectionId::ContentDescription => "content description",
            SectionId::NameValue => "name value",
            SectionId::Time => "time",
        };
        f.write_str(name)
    }
}

/// A metadata section payload.
///
/// Implementations must keep `size_in_bytes` equal to the number of bytes
/// `encode` produces.
pub trait Section: Sized {
    /// Identifier written before the payload
    const ID: SectionId;

    /// Decode the payload
    fn decode<R: Read>(reader: &mut R) -> Result<Self>;

    /// Encode the payload
    fn encode<W: Write>(&self, writer: &mut W) -> Result<()>;

    /// Exact encoded payload size
    fn size_in_bytes(&self) -> usize;

    /// Encode into a fresh buffer
    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.size_in_bytes());
        self.encode(&mut buf)?;
        Ok(buf)
    }
}
