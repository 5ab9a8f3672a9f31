//! File header.
//!
//! ```text
//! ┌──────────────┬──────────────┬──────────────┬──────────────┐
//! │ Magic (8)    │ ItemStart (8)│ ItemEnd (8)  │ Sections (8) │
//! └──────────────┴──────────────┴──────────────┴──────────────┘
//! ```
//!
//! All four fields are i64 in native byte order.

use byteorder::{NativeEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};
use teafile_core::{Error, Result};

/// Sentinel stored in the first 8 bytes of every file
pub const MAGIC_VALUE: i64 = 0x0d0e_0a04_0208_0500;

/// Size of the header in bytes
pub const HEADER_SIZE: usize = 32;

/// File header (32 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Must equal [`MAGIC_VALUE`]
    pub magic_value: i64,
    /// Byte offset of the first record, a positive multiple of 8
    pub item_start: i64,
    /// Exclusive end of the item region, 0 when it runs to end of file
    pub item_end: i64,
    /// Number of sections following the header
    pub section_count: i64,
}

impl Header {
    /// Header for a file with no sections yet accounted for
    pub fn new() -> Self {
        Header {
            magic_value: MAGIC_VALUE,
            item_start: HEADER_SIZE as i64,
            item_end: 0,
            section_count: 0,
        }
    }

    /// Read a header, rejecting a wrong magic value
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let header = Header {
            magic_value: reader.read_i64::<NativeEndian>()?,
            item_start: reader.read_i64::<NativeEndian>()?,
            item_end: reader.read_i64::<NativeEndian>()?,
            section_count: reader.read_i64::<NativeEndian>()?,
        };
        if header.magic_value != MAGIC_VALUE {
            return Err(Error::format(format!(
                "magic mismatch: expected {:#018x}, got {:#018x}",
                MAGIC_VALUE, header.magic_value
            )));
        }
        Ok(header)
    }

    /// Write the header
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_i64::<NativeEndian>(self.magic_value)?;
        writer.write_i64::<NativeEndian>(self.item_start)?;
        writer.write_i64::<NativeEndian>(self.item_end)?;
        writer.write_i64::<NativeEndian>(self.section_count)?;
        Ok(())
    }

    /// True when the item region extends to the end of the file
    pub fn is_unbounded(&self) -> bool {
        self.item_end == 0
    }
}

impl Default for Header {
    fn default() -> Self {
        Self::new()
    }
}
