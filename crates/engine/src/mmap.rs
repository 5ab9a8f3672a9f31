//! Memory-mapped access to the item region
//!
//! ```text
//! file:   [header][sections][padding][rec 0][rec 1]...[rec n-1]
//!                                    ^ item start       ^ item end or EOF
//! mapped:                            [---- n * item size ----]
//! ```
//!
//! Only the item region is mapped. Records are handed out as slices
//! borrowed from the mapping, which itself borrows the container, so no
//! record view outlives the unmap.

use crate::item::Item;
use memmap2::{Mmap, MmapOptions};
use std::fs::File;
use std::marker::PhantomData;
use teafile_core::{Error, Result};
use teafile_format::{Header, ItemSection};
use tracing::debug;

/// Read-only mapping of a container's records.
///
/// Obtained from [`TeaFile::map_items`](crate::TeaFile::map_items).
pub struct MappedItems<'a> {
    mmap: Mmap,
    item: &'a ItemSection,
    item_size: usize,
    item_count: usize,
}

impl<'a> MappedItems<'a> {
    pub(crate) fn map(file: &File, header: &Header, item: &'a ItemSection) -> Result<Self> {
        let file_len = file.metadata()?.len() as i64;
        let start = header.item_start;
        let size = if header.is_unbounded() {
            file_len - start
        } else {
            header.item_end - start
        };
        if size <= 0 {
            return Err(Error::NoData);
        }
        if start + size > file_len {
            return Err(Error::format(format!(
                "item region {}..{} extends past end of file at {}",
                start,
                start + size,
                file_len
            )));
        }

        // SAFETY: the map is read-only and the range was checked against the
        // file length. The mapped range must not be truncated or rewritten by
        // another process while mapped; TeaFiles are append-only and a reader
        // never modifies its file.
        let mmap = unsafe {
            MmapOptions::new()
                .offset(start as u64)
                .len(size as usize)
                .map(file)?
        };

        let item_size = item.item_size_bytes();
        let item_count = mmap.len() / item_size;
        debug!(offset = start, bytes = size, item_count, "mapped item region");

        Ok(MappedItems {
            mmap,
            item,
            item_size,
            item_count,
        })
    }

    /// Number of whole records in the mapping
    pub fn len(&self) -> usize {
        self.item_count
    }

    /// True if no whole record is mapped
    pub fn is_empty(&self) -> bool {
        self.item_count == 0
    }

    /// Bytes per record
    pub fn item_size(&self) -> usize {
        self.item_size
    }

    /// Record `index`, or `None` past the end
    pub fn get(&self, index: usize) -> Option<&[u8]> {
        if index >= self.item_count {
            return None;
        }
        let start = index * self.item_size;
        self.mmap.get(start..start + self.item_size)
    }

    /// All records in order
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.mmap
            .chunks_exact(self.item_size)
            .take(self.item_count)
    }

    /// View the records as `T`.
    ///
    /// Checks the layout of `T` against the stored item section and the
    /// alignment of the mapping once; element access is then free of copies.
    pub fn typed<T: Item>(&self) -> Result<TypedItems<'_, T>> {
        self.item.validate_descriptor(&T::descriptor())?;
        let align = std::mem::align_of::<T>();
        if self.mmap.as_ptr() as usize % align != 0 {
            return Err(Error::format(format!(
                "mapped records are not aligned to {} bytes",
                align
            )));
        }
        Ok(TypedItems {
            items: self,
            _item: PhantomData,
        })
    }

    /// Unmap
    pub fn close(self) {}
}

impl std::fmt::Debug for MappedItems<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedItems")
            .field("item_size", &self.item_size)
            .field("item_count", &self.item_count)
            .finish()
    }
}

/// Typed records over a mapping
pub struct TypedItems<'m, T> {
    items: &'m MappedItems<'m>,
    _item: PhantomData<&'m T>,
}

impl<'m, T: Item> TypedItems<'m, T> {
    /// Number of records
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if there are no records
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Record `index` as `&T`, or `None` past the end
    pub fn get(&self, index: usize) -> Option<&'m T> {
        let bytes = self.items.get(index)?;
        T::ref_from_bytes(bytes).ok()
    }

    /// All records in order
    pub fn iter(&self) -> impl Iterator<Item = &'m T> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }
}
