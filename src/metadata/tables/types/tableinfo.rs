//! Column width information for the table stream.
//!
//! The width of every index column depends on stream-wide state: the `HeapSizes` flags choose
//! 2- or 4-byte heap indices, and the row counts of *all* tables choose 2- or 4-byte table and
//! coded indices. [`TableInfo`] is computed once from the table stream header, before any row
//! is decoded.

use std::sync::Arc;

use bitflags::bitflags;
use strum::{EnumCount, IntoEnumIterator};

use crate::metadata::tables::types::{CodedIndexType, TableId};

bitflags! {
    /// The `HeapSizes` byte of the table stream header.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct HeapSizes: u8 {
        /// `#Strings` indices are 4 bytes wide
        const LARGE_STRINGS = 0x01;
        /// `#GUID` indices are 4 bytes wide
        const LARGE_GUID = 0x02;
        /// `#Blob` indices are 4 bytes wide
        const LARGE_BLOB = 0x04;
        /// Delta-only stream produced by edit-and-continue
        const DELTA_ONLY = 0x20;
        /// An extra 4 bytes follow the row counts
        const EXTRA_DATA = 0x40;
        /// Deleted rows are flagged rather than removed
        const HAS_DELETE = 0x80;
    }
}

/// Row counts and derived column widths of one table stream.
#[derive(Clone, Debug)]
pub struct TableInfo {
    rows: [u32; TableId::COUNT],
    large_coded: [bool; CodedIndexType::COUNT],
    heap_sizes: HeapSizes,
}

/// Shared handle to a [`TableInfo`].
pub type TableInfoRef = Arc<TableInfo>;

impl TableInfo {
    /// Computes column widths from the per-table row counts and the heap size flags.
    #[must_use]
    pub fn new(rows: [u32; TableId::COUNT], heap_sizes: HeapSizes) -> Self {
        let mut info = TableInfo {
            rows,
            large_coded: [false; CodedIndexType::COUNT],
            heap_sizes,
        };

        for kind in CodedIndexType::iter() {
            info.large_coded[kind as usize] = info.coded_index_is_large(kind);
        }

        info
    }

    /// Creates a `TableInfo` for unit tests from `(table, rows)` pairs.
    #[cfg(test)]
    pub fn new_test(
        valid_tables: &[(TableId, u32)],
        large_str: bool,
        large_blob: bool,
        large_guid: bool,
    ) -> Self {
        let mut rows = [0u32; TableId::COUNT];
        for (table, count) in valid_tables {
            rows[*table as usize] = *count;
        }

        let mut heap_sizes = HeapSizes::empty();
        heap_sizes.set(HeapSizes::LARGE_STRINGS, large_str);
        heap_sizes.set(HeapSizes::LARGE_BLOB, large_blob);
        heap_sizes.set(HeapSizes::LARGE_GUID, large_guid);

        TableInfo::new(rows, heap_sizes)
    }

    // A coded index needs 4 bytes once the largest referenced table no longer fits into the
    // bits left over after the tag: rows >= 2^(16 - tag_bits).
    fn coded_index_is_large(&self, kind: CodedIndexType) -> bool {
        let max_rows = kind
            .tables()
            .iter()
            .flatten()
            .map(|table| self.rows[*table as usize])
            .max()
            .unwrap_or(0);

        max_rows >= (1u32 << (16 - kind.tag_bits()))
    }

    /// Number of rows of `table`.
    #[must_use]
    pub fn row_count(&self, table: TableId) -> u32 {
        self.rows[table as usize]
    }

    /// The heap size flags of the stream.
    #[must_use]
    pub fn heap_sizes(&self) -> HeapSizes {
        self.heap_sizes
    }

    /// `true` if simple indices into `table` are 4 bytes wide.
    #[must_use]
    pub fn is_large(&self, table: TableId) -> bool {
        self.rows[table as usize] > u32::from(u16::MAX)
    }

    /// `true` if `#Strings` indices are 4 bytes wide.
    #[must_use]
    pub fn is_large_str(&self) -> bool {
        self.heap_sizes.contains(HeapSizes::LARGE_STRINGS)
    }

    /// `true` if `#GUID` indices are 4 bytes wide.
    #[must_use]
    pub fn is_large_guid(&self) -> bool {
        self.heap_sizes.contains(HeapSizes::LARGE_GUID)
    }

    /// `true` if `#Blob` indices are 4 bytes wide.
    #[must_use]
    pub fn is_large_blob(&self) -> bool {
        self.heap_sizes.contains(HeapSizes::LARGE_BLOB)
    }

    /// `true` if coded indices of `kind` are 4 bytes wide.
    #[must_use]
    pub fn is_large_coded(&self, kind: CodedIndexType) -> bool {
        self.large_coded[kind as usize]
    }

    /// Width of a `#Strings` index in bytes.
    #[must_use]
    pub fn str_bytes(&self) -> u32 {
        Self::width(self.is_large_str())
    }

    /// Width of a `#GUID` index in bytes.
    #[must_use]
    pub fn guid_bytes(&self) -> u32 {
        Self::width(self.is_large_guid())
    }

    /// Width of a `#Blob` index in bytes.
    #[must_use]
    pub fn blob_bytes(&self) -> u32 {
        Self::width(self.is_large_blob())
    }

    /// Width of a simple index into `table` in bytes.
    #[must_use]
    pub fn table_index_bytes(&self, table: TableId) -> u32 {
        Self::width(self.is_large(table))
    }

    /// Width of a coded index of `kind` in bytes.
    #[must_use]
    pub fn coded_index_bytes(&self, kind: CodedIndexType) -> u32 {
        Self::width(self.is_large_coded(kind))
    }

    fn width(is_large: bool) -> u32 {
        if is_large {
            4
        } else {
            2
        }
    }
}
