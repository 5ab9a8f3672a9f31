//! Preamble layout: header, sections and item-region alignment.
//!
//! Sections are always written in the canonical order Item,
//! ContentDescription, NameValue, Time. The item region starts after the
//! last section plus 1 to 8 zero bytes of padding; padding is added even
//! when the end of the last section is already 8-byte aligned.
//!
//! Parsing is strict: an unknown section ID, a section whose decoded size
//! differs from its length prefix, or a header whose offsets are not
//! consistent with the parsed sections all fail the read.

use crate::codec::length_prefix;
use crate::header::{Header, HEADER_SIZE};
use crate::section::{
    ContentDescriptionSection, ItemSection, NameValueSection, Section, SectionId, TimeSection,
};
use byteorder::{NativeEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Seek, SeekFrom, Write};
use teafile_core::{Error, Result};
use tracing::trace;

/// Alignment of the item region
pub const ITEM_ALIGNMENT: u64 = 8;

/// Section ID plus length prefix
pub const SECTION_PREFIX_SIZE: usize = 4 + 4;

/// The metadata sections of one file, each present at most once
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sections {
    /// Record layout
    pub item: Option<ItemSection>,
    /// Free-form description
    pub content_description: Option<ContentDescriptionSection>,
    /// Name-value metadata
    pub name_value: Option<NameValueSection>,
    /// Time field metadata
    pub time: Option<TimeSection>,
}

impl Sections {
    /// Number of present sections
    pub fn count(&self) -> usize {
        self.present().len()
    }

    /// IDs of the present sections in canonical order
    pub fn present(&self) -> Vec<SectionId> {
        let mut ids = Vec::with_capacity(4);
        if self.item.is_some() {
            ids.push(SectionId::Item);
        }
        if self.content_description.is_some() {
            ids.push(SectionId::ContentDescription);
        }
        if self.name_value.is_some() {
            ids.push(SectionId::NameValue);
        }
        if self.time.is_some() {
            ids.push(SectionId::Time);
        }
        ids
    }

    /// Bytes taken by all present sections, prefixes included
    pub fn encoded_size(&self) -> usize {
        fn framed<S: Section>(section: &Option<S>) -> usize {
            section
                .as_ref()
                .map_or(0, |s| SECTION_PREFIX_SIZE + s.size_in_bytes())
        }
        framed(&self.item)
            + framed(&self.content_description)
            + framed(&self.name_value)
            + framed(&self.time)
    }
}

/// Header and sections as parsed from a file
#[derive(Debug, Clone, PartialEq)]
pub struct Preamble {
    /// File header
    pub header: Header,
    /// Parsed sections
    pub sections: Sections,
}

/// Zero bytes needed after `offset` to reach the item region, in `1..=8`
pub fn padding_for(offset: u64) -> u64 {
    ITEM_ALIGNMENT - offset % ITEM_ALIGNMENT
}

/// Compute the header for a new file holding `sections`
pub fn assemble_header(sections: &Sections) -> Header {
    let unpadded = (HEADER_SIZE + sections.encoded_size()) as u64;
    Header {
        item_start: (unpadded + padding_for(unpadded)) as i64,
        section_count: sections.count() as i64,
        ..Header::new()
    }
}

/// Write the header, every present section and the padding.
///
/// On return the writer sits at `header.item_start`.
pub fn write_preamble<W: Write>(writer: &mut W, header: &Header, sections: &Sections) -> Result<()> {
    header.write(writer)?;
    let mut written = HEADER_SIZE;

    if let Some(section) = &sections.item {
        written += write_section(writer, section)?;
    }
    if let Some(section) = &sections.content_description {
        written += write_section(writer, section)?;
    }
    if let Some(section) = &sections.name_value {
        written += write_section(writer, section)?;
    }
    if let Some(section) = &sections.time {
        written += write_section(writer, section)?;
    }

    let padding = usize::try_from(header.item_start)
        .ok()
        .and_then(|start| start.checked_sub(written))
        .ok_or_else(|| {
            Error::format(format!(
                "item start {} precedes end of sections at {}",
                header.item_start, written
            ))
        })?;
    writer.write_all(&vec![0u8; padding])?;
    Ok(())
}

fn write_section<W: Write, S: Section>(writer: &mut W, section: &S) -> Result<usize> {
    let payload = section.to_bytes()?;
    if payload.len() != section.size_in_bytes() {
        return Err(Error::format(format!(
            "{} section encoded {} bytes, computed {}",
            S::ID,
            payload.len(),
            section.size_in_bytes()
        )));
    }
    writer.write_i32::<NativeEndian>(S::ID.as_raw())?;
    writer.write_i32::<NativeEndian>(length_prefix(payload.len())?)?;
    writer.write_all(&payload)?;
    Ok(SECTION_PREFIX_SIZE + payload.len())
}

/// Parse the header and all sections, then seek to the item region.
pub fn read_preamble<R: Read + Seek>(reader: &mut R) -> Result<Preamble> {
    let header = Header::read(reader)?;
    if !(0..=SectionId::CANONICAL_ORDER.len() as i64).contains(&header.section_count) {
        return Err(Error::format(format!(
            "invalid section count {}",
            header.section_count
        )));
    }
    if header.item_start < HEADER_SIZE as i64 || header.item_start % ITEM_ALIGNMENT as i64 != 0 {
        return Err(Error::format(format!(
            "item start {} is not an aligned offset past the header",
            header.item_start
        )));
    }
    if header.item_end != 0 && header.item_end < header.item_start {
        return Err(Error::format(format!(
            "item end {} precedes item start {}",
            header.item_end, header.item_start
        )));
    }

    let mut sections = Sections::default();
    for _ in 0..header.section_count {
        let raw_id = reader.read_i32::<NativeEndian>()?;
        let next_section_offset = reader.read_i32::<NativeEndian>()?;
        let before = reader.stream_position()?;

        let id = SectionId::from_raw(raw_id).ok_or(Error::UnknownSection(raw_id))?;
        match id {
            SectionId::Item => read_section(reader, &mut sections.item)?,
            SectionId::ContentDescription => {
                read_section(reader, &mut sections.content_description)?
            }
            SectionId::NameValue => read_section(reader, &mut sections.name_value)?,
            SectionId::Time => read_section(reader, &mut sections.time)?,
        }

        let consumed = reader.stream_position()? - before;
        if consumed != next_section_offset as u64 || next_section_offset < 0 {
            return Err(Error::format(format!(
                "section size mismatch: {} section declares {} bytes, decoded {}",
                id, next_section_offset, consumed
            )));
        }
        trace!(section = %id, bytes = consumed, "parsed section");
    }

    let position = reader.stream_position()?;
    if position > header.item_start as u64 {
        return Err(Error::format(format!(
            "sections end at {} past item start {}",
            position, header.item_start
        )));
    }
    reader.seek(SeekFrom::Start(header.item_start as u64))?;

    Ok(Preamble { header, sections })
}

fn read_section<R: Read, S: Section>(reader: &mut R, slot: &mut Option<S>) -> Result<()> {
    if slot.is_some() {
        return Err(Error::format(format!("duplicate {} section", S::ID)));
    }
    *slot = Some(S::decode(reader)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use teafile_core::{Field, FieldType, ItemDescriptor};

    fn item() -> ItemSection {
        ItemSection::derive(&ItemDescriptor::new(
            "Data",
            40,
            vec![
                Field::new(0, FieldType::UInt64, 0, "Time"),
                Field::new(1, FieldType::UInt8, 8, "Price"),
                Field::new(2, FieldType::UInt64, 16, "Volume"),
                Field::new(3, FieldType::UInt8, 24, "Prob"),
                Field::new(4, FieldType::UInt64, 32, "Prib"),
            ],
        ))
        .unwrap()
    }

    fn all_sections() -> Sections {
        let mut name_value = NameValueSection::new();
        name_value.insert("decimals", 2i32);
        name_value.insert("url", "www.acme.com");
        Sections {
            item: Some(item()),
            content_description: Some(ContentDescriptionSection::new("prices of acme at NYSE")),
            name_value: Some(name_value),
            time: Some(TimeSection::new(719_162, 86_400_000, vec![0])),
        }
    }

    fn preamble_bytes(sections: &Sections) -> (Header, Vec<u8>) {
        let header = assemble_header(sections);
        let mut buf = Vec::new();
        write_preamble(&mut buf, &header, sections).unwrap();
        (header, buf)
    }

    #[test]
    fn test_padding_always_added() {
        assert_eq!(padding_for(32), 8);
        assert_eq!(padding_for(33), 7);
        assert_eq!(padding_for(39), 1);
        assert_eq!(padding_for(40), 8);
    }

    #[test]
    fn test_empty_file_header() {
        let header = assemble_header(&Sections::default());
        assert_eq!(header.section_count, 0);
        assert_eq!(header.item_start, 40);
        assert_eq!(header.item_end, 0);
    }

    #[test]
    fn test_item_start_every_combination() {
        let full = all_sections();
        for mask in 0..16u8 {
            let sections = Sections {
                item: full.item.clone().filter(|_| mask & 1 != 0),
                content_description: full.content_description.clone().filter(|_| mask & 2 != 0),
                name_value: full.name_value.clone().filter(|_| mask & 4 != 0),
                time: full.time.clone().filter(|_| mask & 8 != 0),
            };
            let (header, bytes) = preamble_bytes(&sections);
            let unpadded = (HEADER_SIZE + sections.encoded_size()) as i64;

            assert_eq!(header.item_start % 8, 0, "mask {}", mask);
            assert!((1..=8).contains(&(header.item_start - unpadded)), "mask {}", mask);
            assert_eq!(header.section_count, mask.count_ones() as i64);
            assert_eq!(bytes.len() as i64, header.item_start);
        }
    }

    #[test]
    fn test_sections_written_in_canonical_order() {
        let (_, bytes) = preamble_bytes(&all_sections());
        let mut cursor = Cursor::new(&bytes);
        cursor.seek(SeekFrom::Start(HEADER_SIZE as u64)).unwrap();
        let mut ids = Vec::new();
        for _ in 0..4 {
            ids.push(cursor.read_i32::<NativeEndian>().unwrap());
            let len = cursor.read_i32::<NativeEndian>().unwrap();
            cursor.seek(SeekFrom::Current(len as i64)).unwrap();
        }
        assert_eq!(ids, vec![0x0a, 0x80, 0x81, 0x40]);
    }

    #[test]
    fn test_read_preamble_roundtrip() {
        let sections = all_sections();
        let (header, mut bytes) = preamble_bytes(&sections);
        bytes.extend_from_slice(&[7u8; 40]);

        let mut cursor = Cursor::new(&bytes);
        let preamble = read_preamble(&mut cursor).unwrap();
        assert_eq!(preamble.header, header);
        assert_eq!(preamble.sections, sections);
        assert_eq!(cursor.position(), header.item_start as u64);
    }

    #[test]
    fn test_padding_bytes_are_zero() {
        let sections = all_sections();
        let (header, bytes) = preamble_bytes(&sections);
        let unpadded = HEADER_SIZE + sections.encoded_size();
        assert!(bytes[unpadded..header.item_start as usize]
            .iter()
            .all(|b| *b == 0));
    }

    #[test]
    fn test_unknown_section_id() {
        let sections = Sections {
            content_description: Some(ContentDescriptionSection::new("x")),
            ..Default::default()
        };
        let (_, mut bytes) = preamble_bytes(&sections);
        bytes[HEADER_SIZE..HEADER_SIZE + 4].copy_from_slice(&0x99i32.to_ne_bytes());
        let err = read_preamble(&mut Cursor::new(&bytes)).unwrap_err();
        assert!(matches!(err, Error::UnknownSection(0x99)));
    }

    #[test]
    fn test_section_length_mismatch() {
        let sections = Sections {
            content_description: Some(ContentDescriptionSection::new("abc")),
            ..Default::default()
        };
        let (_, mut bytes) = preamble_bytes(&sections);
        bytes[HEADER_SIZE + 4..HEADER_SIZE + 8].copy_from_slice(&6i32.to_ne_bytes());
        let err = read_preamble(&mut Cursor::new(&bytes)).unwrap_err();
        assert!(matches!(err, Error::Format(ref m) if m.contains("section size mismatch")));
    }

    #[test]
    fn test_bad_magic() {
        let (_, mut bytes) = preamble_bytes(&all_sections());
        bytes[..8].copy_from_slice(&0i64.to_ne_bytes());
        let err = read_preamble(&mut Cursor::new(&bytes)).unwrap_err();
        assert!(matches!(err, Error::Format(ref m) if m.contains("magic mismatch")));
    }

    #[test]
    fn test_misaligned_item_start() {
        let (_, mut bytes) = preamble_bytes(&Sections::default());
        bytes[8..16].copy_from_slice(&36i64.to_ne_bytes());
        let err = read_preamble(&mut Cursor::new(&bytes)).unwrap_err();
        assert!(matches!(err, Error::Format(_)));
    }

    #[test]
    fn test_item_start_inside_sections() {
        let sections = all_sections();
        let (_, mut bytes) = preamble_bytes(&sections);
        bytes[8..16].copy_from_slice(&40i64.to_ne_bytes());
        let err = read_preamble(&mut Cursor::new(&bytes)).unwrap_err();
        assert!(matches!(err, Error::Format(ref m) if m.contains("past item start")));
    }

    #[test]
    fn test_duplicate_section() {
        let sections = Sections {
            time: Some(TimeSection::default()),
            ..Default::default()
        };
        let header = Header {
            section_count: 2,
            ..assemble_header(&sections)
        };
        let mut bytes = Vec::new();
        header.write(&mut bytes).unwrap();
        for _ in 0..2 {
            write_section(&mut bytes, sections.time.as_ref().unwrap()).unwrap();
        }
        bytes.resize(128, 0);
        let err = read_preamble(&mut Cursor::new(&bytes)).unwrap_err();
        assert!(matches!(err, Error::Format(ref m) if m.contains("duplicate")));
    }

    #[test]
    fn test_truncated_section_is_eof() {
        let (_, bytes) = preamble_bytes(&all_sections());
        let err = read_preamble(&mut Cursor::new(&bytes[..60])).unwrap_err();
        assert!(err.is_eof(), "got {:?}", err);
    }

    #[test]
    fn test_negative_section_count() {
        let (_, mut bytes) = preamble_bytes(&Sections::default());
        bytes[24..32].copy_from_slice(&(-1i64).to_ne_bytes());
        let err = read_preamble(&mut Cursor::new(&bytes)).unwrap_err();
        assert!(matches!(err, Error::Format(ref m) if m.contains("section count")));
    }
}
