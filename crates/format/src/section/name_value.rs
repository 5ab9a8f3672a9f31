//! Name-value section.
//!
//! ```text
//! [Entry count: i32]
//! For each entry (ascending name order):
//!   [Name: text] [Tag: i32] [Payload]
//! ```
//!
//! Entries are kept in a `BTreeMap` so the same logical content always
//! encodes to the same bytes.

use super::{Section, SectionId};
use crate::codec::{
    length_prefix, read_count, read_text, read_value, text_size, value_size, write_text,
    write_value, I32_SIZE,
};
use byteorder::{NativeEndian, WriteBytesExt};
use std::collections::BTreeMap;
use std::io::{Read, Write};
use teafile_core::{Error, NameValue, Result};

/// Named metadata values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NameValueSection {
    /// Entries by name
    pub entries: BTreeMap<String, NameValue>,
}

impl NameValueSection {
    /// Empty section
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entry
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<NameValue>) {
        self.entries.insert(name.into(), value.into());
    }

    /// Look up an entry
    pub fn get(&self, name: &str) -> Option<&NameValue> {
        self.entries.get(name)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<BTreeMap<String, NameValue>> for NameValueSection {
    fn from(entries: BTreeMap<String, NameValue>) -> Self {
        NameValueSection { entries }
    }
}

impl Section for NameValueSection {
    const ID: SectionId = SectionId::NameValue;

    fn decode<R: Read>(reader: &mut R) -> Result<Self> {
        let count = read_count(reader, "name value count")?;
        let mut entries = BTreeMap::new();
        for _ in 0..count {
            let name = read_text(reader)?;
            let value = read_value(reader)?;
            if entries.insert(name.clone(), value).is_some() {
                return Err(Error::format(format!("duplicate name value '{}'", name)));
            }
        }
        Ok(NameValueSection { entries })
    }

    fn encode<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_i32::<NativeEndian>(length_prefix(self.entries.len())?)?;
        for (name, value) in &self.entries {
            write_text(writer, name)?;
            write_value(writer, value)?;
        }
        Ok(())
    }

    fn size_in_bytes(&self) -> usize {
        I32_SIZE
            + self
                .entries
                .iter()
                .map(|(name, value)| text_size(name) + value_size(value))
                .sum::<usize>()
    }
}
