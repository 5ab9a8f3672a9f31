//! The TeaFile container
//!
//! A container is opened either for reading or for appending, never both.
//! Metadata is parsed once on open and stays immutable; only the item
//! region is read or extended.
//!
//! # Example
//!
//! ```ignore
//! let config = TeaFileConfig::new().with_item::<Tick>();
//! let mut tf = TeaFile::create(&path, &config)?;
//! tf.write(&tick)?;
//! tf.close()?;
//!
//! let mut tf = TeaFile::open_read(&path, &Tick::descriptor().fields)?;
//! let first: Tick = tf.read()?;
//! ```

use crate::config::TeaFileConfig;
use crate::item::Item;
use crate::mmap::MappedItems;
use std::any::TypeId;
use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use teafile_core::{AccessMode, Error, Field, Result, SchemaMismatch};
use teafile_format::{
    assemble_header, read_preamble, write_preamble, ContentDescriptionSection, Header,
    ItemSection, NameValueSection, Preamble, Sections, TimeSection,
};
use tracing::{debug, info, warn};
use zerocopy::{FromZeros, IntoBytes};

enum Handle {
    Reader(BufReader<File>),
    Writer(BufWriter<File>),
}

/// An open TeaFile
pub struct TeaFile {
    path: PathBuf,
    handle: Handle,
    header: Header,
    sections: Sections,
    /// Absolute offset of the next record
    cursor: u64,
    /// Record type last checked against the item section
    validated: Option<TypeId>,
}

impl std::fmt::Debug for TeaFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TeaFile")
            .field("path", &self.path)
            .field("mode", &self.mode())
            .field("header", &self.header)
            .field("cursor", &self.cursor)
            .finish()
    }
}

impl TeaFile {
    /// Create a new file, replacing any existing one, and open it for writing.
    ///
    /// Header and sections are written before this returns.
    pub fn create(path: impl AsRef<Path>, config: &TeaFileConfig) -> Result<Self> {
        let path = path.as_ref();
        let sections = config.build_sections()?;
        let header = assemble_header(&sections);

        let mut writer = BufWriter::new(File::create(path)?);
        write_preamble(&mut writer, &header, &sections)?;

        debug!(
            path = %path.display(),
            sections = header.section_count,
            item_start = header.item_start,
            item_size = sections.item.as_ref().map_or(0, ItemSection::item_size_bytes),
            "created teafile"
        );

        Ok(TeaFile {
            path: path.to_path_buf(),
            handle: Handle::Writer(writer),
            cursor: header.item_start as u64,
            header,
            sections,
            validated: None,
        })
    }

    /// Open an existing file for reading.
    ///
    /// `fields` must match the stored item section in count, type and
    /// offset. Pass an empty slice for files without records.
    pub fn open_read(path: impl AsRef<Path>, fields: &[Field]) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = BufReader::new(File::open(path)?);
        let Preamble { header, sections } = read_preamble(&mut reader)?;
        validate_fields(&sections, fields)?;

        let file_len = reader.get_ref().metadata()?.len();
        if !header.is_unbounded() && (header.item_end as u64) < file_len {
            warn!(
                path = %path.display(),
                item_end = header.item_end,
                file_len,
                "ignoring bytes past item end"
            );
        }
        debug!(
            path = %path.display(),
            sections = header.section_count,
            item_start = header.item_start,
            item_end = header.item_end,
            "opened teafile for reading"
        );

        Ok(TeaFile {
            path: path.to_path_buf(),
            handle: Handle::Reader(reader),
            cursor: header.item_start as u64,
            header,
            sections,
            validated: None,
        })
    }

    /// Open an existing file for appending records.
    ///
    /// Validation is the same as for [`open_read`](Self::open_read); the
    /// cursor is placed at the end of the file.
    pub fn open_write(path: impl AsRef<Path>, fields: &[Field]) -> Result<Self> {
        let path = path.as_ref();
        let mut file = OpenOptions::new().read(true).write(true).open(path)?;
        let Preamble { header, sections } = read_preamble(&mut BufReader::new(&mut file))?;
        validate_fields(&sections, fields)?;

        let end = file.seek(SeekFrom::End(0))?;
        if end < header.item_start as u64 {
            return Err(Error::format(format!(
                "file ends at {} before item start {}",
                end, header.item_start
            )));
        }
        if !header.is_unbounded() {
            return Err(Error::format(format!(
                "cannot append past item end {}",
                header.item_end
            )));
        }
        if let Some(item) = &sections.item {
            let tail = (end - header.item_start as u64) % item.item_size_bytes() as u64;
            if tail != 0 {
                return Err(Error::format(format!(
                    "item region ends with a partial record of {} bytes",
                    tail
                )));
            }
        }
        debug!(
            path = %path.display(),
            sections = header.section_count,
            item_start = header.item_start,
            end,
            "opened teafile for writing"
        );

        Ok(TeaFile {
            path: path.to_path_buf(),
            handle: Handle::Writer(BufWriter::new(file)),
            cursor: end,
            header,
            sections,
            validated: None,
        })
    }

    /// Parse header and sections without validating a layout
    pub fn inspect(path: impl AsRef<Path>) -> Result<Preamble> {
        let mut reader = BufReader::new(File::open(path)?);
        read_preamble(&mut reader)
    }

    /// Path the container was opened with
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read or write
    pub fn mode(&self) -> AccessMode {
        match self.handle {
            Handle::Reader(_) => AccessMode::Read,
            Handle::Writer(_) => AccessMode::Write,
        }
    }

    /// File header
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// All parsed sections
    pub fn sections(&self) -> &Sections {
        &self.sections
    }

    /// Record layout, if the file has one
    pub fn item_section(&self) -> Option<&ItemSection> {
        self.sections.item.as_ref()
    }

    /// Content description text
    pub fn content_description(&self) -> Option<&str> {
        self.sections
            .content_description
            .as_ref()
            .map(|s: &ContentDescriptionSection| s.text.as_str())
    }

    /// Name-value metadata
    pub fn name_values(&self) -> Option<&NameValueSection> {
        self.sections.name_value.as_ref()
    }

    /// Time metadata
    pub fn time_section(&self) -> Option<&TimeSection> {
        self.sections.time.as_ref()
    }

    /// Bytes per record
    pub fn item_size(&self) -> Result<usize> {
        self.sections
            .item
            .as_ref()
            .map(ItemSection::item_size_bytes)
            .ok_or(Error::NoItemSection)
    }

    /// Number of whole records in the item region
    pub fn item_count(&self) -> Result<u64> {
        let item_size = self.item_size()? as u64;
        let start = self.header.item_start as u64;
        let end = match &self.handle {
            Handle::Writer(_) => self.cursor,
            Handle::Reader(_) if !self.header.is_unbounded() => self.header.item_end as u64,
            Handle::Reader(reader) => reader.get_ref().metadata()?.len(),
        };
        Ok(end.saturating_sub(start) / item_size)
    }

    /// Read the next record into `buf`, which must be exactly one record long
    pub fn read_into(&mut self, buf: &mut [u8]) -> Result<()> {
        self.require(AccessMode::Read, "read")?;
        let item_size = self.item_size()?;
        let Handle::Reader(reader) = &mut self.handle else {
            return Err(Error::mode("read", AccessMode::Write));
        };
        if buf.len() != item_size {
            return Err(SchemaMismatch::ItemSize {
                expected: item_size,
                actual: buf.len(),
            }
            .into());
        }
        let next = self.cursor + item_size as u64;
        if !self.header.is_unbounded() && next > self.header.item_end as u64 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "read past item end").into());
        }
        reader.read_exact(buf)?;
        self.cursor = next;
        Ok(())
    }

    /// Read the next record as raw bytes
    pub fn read_bytes(&mut self) -> Result<Vec<u8>> {
        self.require(AccessMode::Read, "read")?;
        let mut buf = vec![0u8; self.item_size()?];
        self.read_into(&mut buf)?;
        Ok(buf)
    }

    /// Read the next record as `T`
    pub fn read<T: Item>(&mut self) -> Result<T> {
        self.require(AccessMode::Read, "read")?;
        self.check_type::<T>()?;
        let mut item = T::new_zeroed();
        self.read_into(item.as_mut_bytes())?;
        Ok(item)
    }

    /// Append one record given as raw bytes.
    ///
    /// A container created without an item section accepts no records;
    /// writing to it is a mode error.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let Handle::Writer(writer) = &mut self.handle else {
            return Err(Error::mode("write", AccessMode::Read));
        };
        let item_size = self
            .sections
            .item
            .as_ref()
            .map(ItemSection::item_size_bytes)
            .ok_or_else(|| {
                Error::mode("write records without an item section", AccessMode::Write)
            })?;
        if bytes.len() != item_size {
            return Err(SchemaMismatch::ItemSize {
                expected: item_size,
                actual: bytes.len(),
            }
            .into());
        }
        writer.write_all(bytes)?;
        self.cursor += item_size as u64;
        Ok(())
    }

    /// Append one record
    pub fn write<T: Item>(&mut self, item: &T) -> Result<()> {
        self.require(AccessMode::Write, "write")?;
        if self.sections.item.is_none() {
            return Err(Error::mode(
                "write records without an item section",
                AccessMode::Write,
            ));
        }
        self.check_type::<T>()?;
        self.write_bytes(item.as_bytes())
    }

    /// Position the cursor at record `index`.
    ///
    /// Seeking past the last record is allowed; the next read fails.
    pub fn seek_item(&mut self, index: u64) -> Result<()> {
        self.require(AccessMode::Read, "seek")?;
        let item_size = self.item_size()? as u64;
        let Handle::Reader(reader) = &mut self.handle else {
            return Err(Error::mode("seek", AccessMode::Write));
        };
        let position = index
            .checked_mul(item_size)
            .and_then(|offset| offset.checked_add(self.header.item_start as u64))
            .ok_or_else(|| Error::format(format!("record index {} out of range", index)))?;
        reader.seek(SeekFrom::Start(position))?;
        self.cursor = position;
        Ok(())
    }

    /// Push buffered records to the OS
    pub fn flush(&mut self) -> Result<()> {
        if let Handle::Writer(writer) = &mut self.handle {
            writer.flush()?;
        }
        Ok(())
    }

    /// Flush, sync and release the file
    pub fn close(mut self) -> Result<()> {
        if let Handle::Writer(writer) = &mut self.handle {
            writer.flush()?;
            writer.get_ref().sync_all()?;
            info!(
                path = %self.path.display(),
                items = self.item_count().unwrap_or(0),
                "closed teafile"
            );
        }
        Ok(())
    }

    /// Map the item region for random access
    pub fn map_items(&self) -> Result<MappedItems<'_>> {
        let Handle::Reader(reader) = &self.handle else {
            return Err(Error::mode("map", AccessMode::Write));
        };
        let item = self.sections.item.as_ref().ok_or(Error::NoItemSection)?;
        MappedItems::map(reader.get_ref(), &self.header, item)
    }

    fn require(&self, mode: AccessMode, operation: &'static str) -> Result<()> {
        let current = self.mode();
        if current != mode {
            return Err(Error::mode(operation, current));
        }
        Ok(())
    }

    fn check_type<T: Item>(&mut self) -> Result<()> {
        let type_id = TypeId::of::<T>();
        if self.validated == Some(type_id) {
            return Ok(());
        }
        let item = self.sections.item.as_ref().ok_or(Error::NoItemSection)?;
        item.validate_descriptor(&T::descriptor())?;
        self.validated = Some(type_id);
        Ok(())
    }
}

fn validate_fields(sections: &Sections, fields: &[Field]) -> Result<()> {
    match &sections.item {
        Some(item) => item.validate(fields)?,
        None if fields.is_empty() => {}
        None => return Err(SchemaMismatch::MissingItemSection.into()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use teafile_core::{FieldType, ItemDescriptor};
    use tempfile::TempDir;

    fn descriptor() -> ItemDescriptor {
        ItemDescriptor::new(
            "Pair",
            16,
            vec![
                Field::new(0, FieldType::Int64, 0, "a"),
                Field::new(1, FieldType::Float64, 8, "b"),
            ],
        )
    }

    fn record(n: u8) -> Vec<u8> {
        vec![n; 16]
    }

    #[test]
    fn test_create_positions_cursor_at_item_start() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pair.tea");
        let tf = TeaFile::create(&path, &TeaFileConfig::new().with_item_descriptor(descriptor()))
            .unwrap();
        assert_eq!(tf.mode(), AccessMode::Write);
        assert_eq!(tf.cursor, tf.header().item_start as u64);
        assert_eq!(tf.item_count().unwrap(), 0);
        tf.close().unwrap();

        let len = std::fs::metadata(&path).unwrap().len();
        assert_eq!(len % 8, 0);
    }

    #[test]
    fn test_item_count_tracks_writes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pair.tea");
        let mut tf =
            TeaFile::create(&path, &TeaFileConfig::new().with_item_descriptor(descriptor()))
                .unwrap();
        for n in 0..3 {
            tf.write_bytes(&record(n)).unwrap();
        }
        assert_eq!(tf.item_count().unwrap(), 3);
        tf.close().unwrap();

        let tf = TeaFile::open_read(&path, &descriptor().fields).unwrap();
        assert_eq!(tf.item_count().unwrap(), 3);
    }

    #[test]
    fn test_read_into_wrong_length() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pair.tea");
        let mut tf =
            TeaFile::create(&path, &TeaFileConfig::new().with_item_descriptor(descriptor()))
                .unwrap();
        tf.write_bytes(&record(1)).unwrap();
        tf.close().unwrap();

        let mut tf = TeaFile::open_read(&path, &descriptor().fields).unwrap();
        let mut short = [0u8; 8];
        assert!(matches!(
            tf.read_into(&mut short),
            Err(Error::SchemaMismatch(SchemaMismatch::ItemSize { expected: 16, actual: 8 }))
        ));
    }

    #[test]
    fn test_metadata_only_file_opens_with_empty_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("meta.tea");
        TeaFile::create(&path, &TeaFileConfig::new().with_content_description("notes"))
            .unwrap()
            .close()
            .unwrap();

        let mut tf = TeaFile::open_read(&path, &[]).unwrap();
        assert_eq!(tf.content_description(), Some("notes"));
        assert!(matches!(tf.read_bytes(), Err(Error::NoItemSection)));
        assert!(matches!(tf.item_count(), Err(Error::NoItemSection)));

        let err = TeaFile::open_read(&path, &descriptor().fields).unwrap_err();
        assert!(matches!(
            err,
            Error::SchemaMismatch(SchemaMismatch::MissingItemSection)
        ));
    }

    #[test]
    fn test_write_without_item_section() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("meta.tea");
        let mut tf = TeaFile::create(&path, &TeaFileConfig::new()).unwrap();
        assert!(matches!(
            tf.write_bytes(&record(0)),
            Err(Error::Mode {
                operation: "write records without an item section",
                mode: AccessMode::Write
            })
        ));

        // mode is checked before the missing layout
        assert!(matches!(
            tf.read_bytes(),
            Err(Error::Mode {
                operation: "read",
                mode: AccessMode::Write
            })
        ));
        assert!(matches!(
            tf.seek_item(0),
            Err(Error::Mode {
                operation: "seek",
                mode: AccessMode::Write
            })
        ));
        let mut buf = [0u8; 16];
        assert!(matches!(
            tf.read_into(&mut buf),
            Err(Error::Mode { operation: "read", .. })
        ));
    }
}
