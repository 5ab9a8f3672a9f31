//! Item section: the on-disk field table of the record type.
//!
//! ```text
//! [Item size: i32]
//! [Type name: text]
//! [Field count: i32]
//! For each field:
//!   [Type code: i32] [Offset: i32] [Name: text]
//! ```
//!
//! Field indices are not stored; they are the field's position.

use super::{Section, SectionId};
use crate::codec::{length_prefix, read_count, read_text, text_size, write_text, I32_SIZE};
use byteorder::{NativeEndian, ReadBytesExt, WriteBytesExt};
use std::fmt;
use std::io::{Read, Write};
use teafile_core::{Error, Field, FieldType, ItemDescriptor, Result, SchemaMismatch};

/// Field table of the stored record type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSection {
    /// Size of one record in bytes
    pub item_size: i32,
    /// Name of the record type
    pub item_type_name: String,
    /// Fields in index order
    pub fields: Vec<Field>,
}

impl ItemSection {
    /// Build the section from a record descriptor.
    ///
    /// Fields are copied as given: nothing is reordered and no offset is
    /// recomputed. The descriptor is rejected if indices are not `0..n` in
    /// order or a field does not fit inside the item.
    pub fn derive(descriptor: &ItemDescriptor) -> Result<Self> {
        let item_size = i32::try_from(descriptor.item_size)
            .ok()
            .filter(|size| *size > 0)
            .ok_or_else(|| {
                Error::InvalidSchema(format!("invalid item size {}", descriptor.item_size))
            })?;

        for (position, field) in descriptor.fields.iter().enumerate() {
            if field.index as i64 != position as i64 {
                return Err(Error::InvalidSchema(format!(
                    "field '{}' has index {}, expected {}",
                    field.name, field.index, position
                )));
            }
            if field.offset < 0 || field.byte_range().end > descriptor.item_size {
                return Err(Error::InvalidSchema(format!(
                    "field '{}' ({} at offset {}) does not fit in {} bytes",
                    field.name, field.field_type, field.offset, descriptor.item_size
                )));
            }
        }

        Ok(ItemSection {
            item_size,
            item_type_name: descriptor.type_name.clone(),
            fields: descriptor.fields.clone(),
        })
    }

    /// Number of fields
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Item size in bytes
    pub fn item_size_bytes(&self) -> usize {
        self.item_size as usize
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Check a caller's field list against the stored one.
    ///
    /// Count, type and offset must agree position by position; names are
    /// not compared.
    pub fn validate(&self, provided: &[Field]) -> std::result::Result<(), SchemaMismatch> {
        if provided.len() != self.fields.len() {
            return Err(SchemaMismatch::FieldCount {
                expected: self.fields.len(),
                actual: provided.len(),
            });
        }
        for (index, (stored, given)) in self.fields.iter().zip(provided).enumerate() {
            if given.field_type != stored.field_type {
                return Err(SchemaMismatch::FieldType {
                    index,
                    expected: stored.field_type,
                    actual: given.field_type,
                });
            }
            if given.offset != stored.offset {
                return Err(SchemaMismatch::FieldOffset {
                    index,
                    expected: stored.offset,
                    actual: given.offset,
                });
            }
        }
        Ok(())
    }

    /// [`validate`](Self::validate) plus an item size check
    pub fn validate_descriptor(
        &self,
        descriptor: &ItemDescriptor,
    ) -> std::result::Result<(), SchemaMismatch> {
        if descriptor.item_size != self.item_size_bytes() {
            return Err(SchemaMismatch::ItemSize {
                expected: self.item_size_bytes(),
                actual: descriptor.item_size,
            });
        }
        self.validate(&descriptor.fields)
    }

    /// The stored layout as a descriptor
    pub fn to_descriptor(&self) -> ItemDescriptor {
        ItemDescriptor::new(
            self.item_type_name.clone(),
            self.item_size_bytes(),
            self.fields.clone(),
        )
    }
}

impl Section for ItemSection {
    const ID: SectionId = SectionId::Item;

    fn decode<R: Read>(reader: &mut R) -> Result<Self> {
        let item_size = reader.read_i32::<NativeEndian>()?;
        if item_size <= 0 {
            return Err(Error::format(format!("invalid item size {}", item_size)));
        }
        let item_type_name = read_text(reader)?;
        let field_count = read_count(reader, "field count")?;

        let mut fields = Vec::new();
        for index in 0..field_count {
            let code = reader.read_i32::<NativeEndian>()?;
            let field_type = FieldType::from_code(code)
                .ok_or_else(|| Error::format(format!("unknown field type code {}", code)))?;
            let offset = reader.read_i32::<NativeEndian>()?;
            let name = read_text(reader)?;
            fields.push(Field::new(index as i32, field_type, offset, name));
        }

        Ok(ItemSection {
            item_size,
            item_type_name,
            fields,
        })
    }

    fn encode<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_i32::<NativeEndian>(self.item_size)?;
        write_text(writer, &self.item_type_name)?;
        writer.write_i32::<NativeEndian>(length_prefix(self.fields.len())?)?;
        for field in &self.fields {
            writer.write_i32::<NativeEndian>(field.field_type.code())?;
            writer.write_i32::<NativeEndian>(field.offset)?;
            write_text(writer, &field.name)?;
        }
        Ok(())
    }

    fn size_in_bytes(&self) -> usize {
        let fields: usize = self
            .fields
            .iter()
            .map(|f| I32_SIZE + I32_SIZE + text_size(&f.name))
            .sum();
        I32_SIZE + text_size(&self.item_type_name) + I32_SIZE + fields
    }
}

impl fmt::Display for ItemSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({} bytes)", self.item_type_name, self.item_size)?;
        for field in &self.fields {
            writeln!(
                f,
                "  {:>3}  {:<24} {:<8} @{}",
                field.index, field.name, field.field_type, field.offset
            )?;
        }
        Ok(())
    }
}
