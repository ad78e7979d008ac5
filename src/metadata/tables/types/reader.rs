//! Forward-only buffered reader for the table stream.
//!
//! [`TableReader`] decodes table rows from any [`std::io::Read`] source through a fixed 2 KiB
//! buffer. When a read needs more bytes than are buffered, the unconsumed tail is moved to the
//! front and the rest of the buffer is refilled, so a column never straddles a refill.
//!
//! Every index column is read at the width [`TableInfo`] prescribes. A source that ends before
//! the expected number of columns has been consumed fails with [`crate::Error::OutOfBounds`].

use std::io::{ErrorKind, Read};

use crate::{
    metadata::tables::types::{CodedIndex, CodedIndexType, TableId, TableInfo, TableInfoRef},
    Error, Result,
};

const BUFFER_SIZE: usize = 2048;

/// Buffered reader used during the single pass that populates the row arrays.
pub struct TableReader<R: Read> {
    source: R,
    buffer: Box<[u8; BUFFER_SIZE]>,
    pos: usize,
    end: usize,
    consumed: u64,
    info: TableInfoRef,
}

impl<R: Read> TableReader<R> {
    /// Creates a reader over `source` with column widths taken from `info`.
    pub fn new(source: R, info: TableInfoRef) -> Self {
        TableReader {
            source,
            buffer: Box::new([0u8; BUFFER_SIZE]),
            pos: 0,
            end: 0,
            consumed: 0,
            info,
        }
    }

    /// The column width information this reader was built with.
    #[must_use]
    pub fn info(&self) -> &TableInfo {
        &self.info
    }

    /// Total number of bytes decoded so far.
    #[must_use]
    pub fn bytes_consumed(&self) -> u64 {
        self.consumed
    }

    fn fill(&mut self, needed: usize) -> Result<()> {
        if self.end - self.pos >= needed {
            return Ok(());
        }

        self.buffer.copy_within(self.pos..self.end, 0);
        self.end -= self.pos;
        self.pos = 0;

        while self.end < needed {
            match self.source.read(&mut self.buffer[self.end..]) {
                Ok(0) => return Err(out_of_bounds_error!()),
                Ok(read) => self.end += read,
                Err(error) if error.kind() == ErrorKind::Interrupted => {}
                Err(error) => return Err(Error::FileError(error)),
            }
        }

        Ok(())
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.fill(N)?;
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(&self.buffer[self.pos..self.pos + N]);
        self.pos += N;
        self.consumed += N as u64;
        Ok(bytes)
    }

    /// Reads a `u8` column.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the stream is exhausted.
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take::<1>()?[0])
    }

    /// Reads a little-endian `u16` column.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the stream is exhausted.
    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.take()?))
    }

    /// Reads a little-endian `i16` column.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the stream is exhausted.
    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(i16::from_le_bytes(self.take()?))
    }

    /// Reads a little-endian `u32` column.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the stream is exhausted.
    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.take()?))
    }

    /// Reads a little-endian `i32` column.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the stream is exhausted.
    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.take()?))
    }

    fn read_index(&mut self, is_large: bool) -> Result<u32> {
        if is_large {
            self.read_u32()
        } else {
            Ok(u32::from(self.read_u16()?))
        }
    }

    /// Reads a `#Strings` heap index.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the stream is exhausted.
    pub fn read_string_index(&mut self) -> Result<u32> {
        let is_large = self.info.is_large_str();
        self.read_index(is_large)
    }

    /// Reads a `#GUID` heap index.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the stream is exhausted.
    pub fn read_guid_index(&mut self) -> Result<u32> {
        let is_large = self.info.is_large_guid();
        self.read_index(is_large)
    }

    /// Reads a `#Blob` heap index.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the stream is exhausted.
    pub fn read_blob_index(&mut self) -> Result<u32> {
        let is_large = self.info.is_large_blob();
        self.read_index(is_large)
    }

    /// Reads a simple row index into `table`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the stream is exhausted.
    pub fn read_table_index(&mut self, table: TableId) -> Result<u32> {
        let is_large = self.info.is_large(table);
        self.read_index(is_large)
    }

    /// Reads and decodes a coded index of `kind`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the stream is exhausted, or
    /// [`crate::Error::Malformed`] for a tag outside the kind's mapping.
    pub fn read_coded_index(&mut self, kind: CodedIndexType) -> Result<CodedIndex> {
        let is_large = self.info.is_large_coded(kind);
        let value = self.read_index(is_large)?;
        kind.decode(value)
    }
}

/// A table row that knows its own column layout.
pub trait RowReadable: Sized {
    /// Size of one row in bytes for the given column widths.
    fn row_size(info: &TableInfo) -> u32;

    /// Decodes the row with 1-based `rid` from the current reader position.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the stream ends inside the row, or
    /// [`crate::Error::Malformed`] for an invalid coded index tag.
    fn row_read<R: Read>(reader: &mut TableReader<R>, rid: u32) -> Result<Self>;
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    /// Yields at most `chunk` bytes per `read` call.
    struct Trickle<'a> {
        data: &'a [u8],
        chunk: usize,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let n = self.chunk.min(buf.len()).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    fn small_info() -> TableInfoRef {
        Arc::new(TableInfo::new_test(&[(TableId::TypeDef, 10)], false, false, false))
    }

    #[test]
    fn primitives() {
        let data = [0x01, 0x02, 0x03, 0xFE, 0xFF, 0x04, 0x03, 0x02, 0x01];
        let mut reader = TableReader::new(&data[..], small_info());
        assert_eq!(reader.read_u8().unwrap(), 0x01);
        assert_eq!(reader.read_u16().unwrap(), 0x0302);
        assert_eq!(reader.read_i16().unwrap(), -2);
        assert_eq!(reader.read_u32().unwrap(), 0x0102_0304);
        assert_eq!(reader.bytes_consumed(), 9);
        assert!(matches!(reader.read_u8(), Err(Error::OutOfBounds { .. })));
    }

    #[test]
    fn index_widths() {
        let data = [0x01, 0x00, 0x02, 0x00, 0x00, 0x00, 0x09, 0x00];
        let info = Arc::new(TableInfo::new_test(&[], false, false, true));
        let mut reader = TableReader::new(&data[..], info);
        assert_eq!(reader.read_string_index().unwrap(), 1);
        assert_eq!(reader.read_guid_index().unwrap(), 2);
        let coded = reader.read_coded_index(CodedIndexType::TypeDefOrRef).unwrap();
        assert_eq!(coded.tag, TableId::TypeRef);
        assert_eq!(coded.row, 2);
    }

    #[test]
    fn refill_preserves_tail() {
        // 3 * 1000 u32 values across a 2 KiB buffer, delivered 7 bytes at a time
        let values: Vec<u32> = (0..3000).map(|i| i * 0x0101).collect();
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();

        let mut reader = TableReader::new(Trickle { data: &bytes, chunk: 7 }, small_info());
        for expected in &values {
            assert_eq!(reader.read_u32().unwrap(), *expected);
        }
        assert!(reader.read_u8().is_err());
    }

    #[test]
    fn short_read_is_truncation() {
        let data = [0x01];
        let mut reader = TableReader::new(&data[..], small_info());
        assert!(matches!(reader.read_u16(), Err(Error::OutOfBounds { .. })));
    }
}
