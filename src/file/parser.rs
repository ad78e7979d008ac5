//! Cursor-based byte parser for headers, heap entries and signature blobs.
//!
//! [`Parser`] wraps a byte slice and a position. Every read is bounds-checked and fails with
//! [`crate::Error::OutOfBounds`] (truncated data) or [`crate::Error::Malformed`] (invalid
//! encoding); there is no recovery, callers propagate with `?`.
//!
//! Besides fixed-width little-endian values the parser decodes the ECMA-335 §II.23.2 compressed
//! integer encodings used throughout blobs and signatures:
//!
//! | First byte  | Width   | Payload bits |
//! |-------------|---------|--------------|
//! | `0xxxxxxx`  | 1 byte  | 7            |
//! | `10xxxxxx`  | 2 bytes | 14           |
//! | `11xxxxxx`  | 4 bytes | 29           |
//!
//! # Examples
//!
//! ```rust
//! use cilreader::Parser;
//!
//! let data = [0x81, 0x00, 0x2A];
//! let mut parser = Parser::new(&data);
//! assert_eq!(parser.read_compressed_uint()?, 0x100);
//! assert_eq!(parser.read_le::<u8>()?, 0x2A);
//! assert!(!parser.has_more_data());
//! # Ok::<(), cilreader::Error>(())
//! ```
//!
//! Blob heap entries are turned into bounded sub-parsers with [`Parser::from_blob`]:
//!
//! ```rust
//! use cilreader::Parser;
//!
//! let heap = [0x00, 0x03, 0x06, 0x08, 0xFF];
//! let mut blob = Parser::from_blob(&heap, 1)?;
//! assert_eq!(blob.len(), 3);
//! assert_eq!(blob.read_le::<u8>()?, 0x06);
//! # Ok::<(), cilreader::Error>(())
//! ```

use crate::{
    file::io::{read_le_at, CilIO},
    metadata::token::Token,
    Result,
};

/// A bounds-checked reader over a byte slice.
///
/// The parser never owns its data; sub-parsers created with [`Parser::slice`] or
/// [`Parser::from_blob`] borrow from the same underlying buffer.
#[derive(Clone, Debug)]
pub struct Parser<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new [`Parser`] from a byte slice.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Creates a parser bounded to one blob heap entry.
    ///
    /// Reads a compressed length at `start` and returns a parser over exactly that many
    /// following bytes.
    ///
    /// # Errors
    /// Returns an error if `start` is outside the heap or the entry extends past its end.
    pub fn from_blob(heap: &'a [u8], start: usize) -> Result<Self> {
        if start >= heap.len() {
            return Err(out_of_bounds_error!());
        }

        let mut header = Parser::new(&heap[start..]);
        let length = header.read_compressed_uint()? as usize;
        let body_start = start + header.pos();
        let Some(body_end) = body_start.checked_add(length) else {
            return Err(out_of_bounds_error!());
        };
        if body_end > heap.len() {
            return Err(out_of_bounds_error!());
        }

        Ok(Parser::new(&heap[body_start..body_end]))
    }

    /// Returns the length of the underlying data buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the underlying buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if the cursor has not reached the end of the buffer.
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Number of bytes between the cursor and the end of the buffer.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Moves the cursor to an absolute position.
    ///
    /// Seeking to `len()` is allowed and leaves the parser exhausted.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `pos` is past the end.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(out_of_bounds_error!());
        }

        self.position = pos;
        Ok(())
    }

    /// Advances the cursor by one byte.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] on an exhausted parser.
    pub fn advance(&mut self) -> Result<()> {
        self.advance_by(1)
    }

    /// Advances the cursor by `step` bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `step` bytes remain.
    pub fn advance_by(&mut self, step: usize) -> Result<()> {
        if step > self.remaining() {
            return Err(out_of_bounds_error!());
        }

        self.position += step;
        Ok(())
    }

    /// Current cursor position.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// The full underlying buffer, independent of the cursor.
    #[must_use]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Returns the next byte without advancing.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] on an exhausted parser.
    pub fn peek_byte(&self) -> Result<u8> {
        self.data
            .get(self.position)
            .copied()
            .ok_or_else(|| out_of_bounds_error!())
    }

    /// Advances the cursor to the next multiple of `alignment`.
    ///
    /// `alignment` must be a power of two and the buffer must start aligned.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the padding would run past the end.
    pub fn align(&mut self, alignment: usize) -> Result<()> {
        debug_assert!(alignment.is_power_of_two());
        let padding = (alignment - (self.position % alignment)) % alignment;
        self.advance_by(padding)
    }

    /// Reads a little-endian primitive and advances past it.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if not enough bytes remain.
    pub fn read_le<T: CilIO>(&mut self) -> Result<T> {
        read_le_at::<T>(self.data, &mut self.position)
    }

    /// Reads `length` raw bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if not enough bytes remain.
    pub fn read_bytes(&mut self, length: usize) -> Result<&'a [u8]> {
        if length > self.remaining() {
            return Err(out_of_bounds_error!());
        }

        let bytes = &self.data[self.position..self.position + length];
        self.position += length;
        Ok(bytes)
    }

    /// Splits off a sub-parser over the next `length` bytes and advances past them.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if not enough bytes remain.
    pub fn slice(&mut self, length: usize) -> Result<Parser<'a>> {
        Ok(Parser::new(self.read_bytes(length)?))
    }

    /// Reads an ECMA-335 compressed unsigned integer.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the encoding is truncated.
    pub fn read_compressed_uint(&mut self) -> Result<u32> {
        let first_byte = u32::from(self.read_le::<u8>()?);

        // 0xxxxxxx
        if (first_byte & 0x80) == 0 {
            return Ok(first_byte);
        }

        // 10xxxxxx xxxxxxxx
        if (first_byte & 0xC0) == 0x80 {
            let b1 = u32::from(self.read_le::<u8>()?);
            return Ok(((first_byte & 0x3F) << 8) | b1);
        }

        // 11xxxxxx xxxxxxxx xxxxxxxx xxxxxxxx
        let b1 = u32::from(self.read_le::<u8>()?);
        let b2 = u32::from(self.read_le::<u8>()?);
        let b3 = u32::from(self.read_le::<u8>()?);
        Ok(((first_byte & 0x3F) << 24) | (b1 << 16) | (b2 << 8) | b3)
    }

    /// Reads an ECMA-335 compressed signed integer.
    ///
    /// The value is rotated so that the sign bit sits in bit 0; negative values are restored by
    /// subtracting the bias of the encoding width that was used (`0x40`, `0x2000`, or
    /// `0x1000_0000`).
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the encoding is truncated.
    #[allow(clippy::cast_possible_wrap)]
    pub fn read_compressed_int(&mut self) -> Result<i32> {
        let first_byte = self.peek_byte()?;
        let bias: i32 = if (first_byte & 0x80) == 0 {
            0x40
        } else if (first_byte & 0xC0) == 0x80 {
            0x2000
        } else {
            0x1000_0000
        };

        let raw = self.read_compressed_uint()?;
        let magnitude = (raw >> 1) as i32;
        if (raw & 1) == 0 {
            Ok(magnitude)
        } else {
            Ok(magnitude - bias)
        }
    }

    /// Reads a compressed `TypeDefOrRefOrSpecEncoded` token (ECMA-335 §II.23.2.8).
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for the unused tag value `3`.
    pub fn read_compressed_token(&mut self) -> Result<Token> {
        let compressed_token = self.read_compressed_uint()?;

        let table: u32 = match compressed_token & 0x3 {
            0x0 => 0x0200_0000, // TypeDef
            0x1 => 0x0100_0000, // TypeRef
            0x2 => 0x1B00_0000, // TypeSpec
            _ => {
                return Err(malformed_error!(
                    "Invalid compressed token - {}",
                    compressed_token
                ))
            }
        };

        Ok(Token::new(table | (compressed_token >> 2)))
    }

    /// Reads a NUL-terminated UTF-8 string.
    ///
    /// A string that runs to the end of the buffer without a terminator is accepted.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the bytes are not valid UTF-8.
    pub fn read_string_utf8(&mut self) -> Result<String> {
        let start = self.position;
        let end = self.data[start..]
            .iter()
            .position(|&b| b == 0)
            .map_or(self.data.len(), |n| start + n);

        let string_data = &self.data[start..end];
        self.position = if end < self.data.len() { end + 1 } else { end };

        std::str::from_utf8(string_data)
            .map(ToString::to_string)
            .map_err(|e| malformed_error!("Invalid UTF-8 string at offset {}: {}", start, e))
    }

    /// Reads a serialized string: `0xFF` for null, otherwise a compressed length and UTF-8 bytes.
    ///
    /// # Errors
    /// Returns an error if the length runs past the buffer or the bytes are not valid UTF-8.
    pub fn read_compressed_string(&mut self) -> Result<Option<String>> {
        if self.peek_byte()? == 0xFF {
            self.advance()?;
            return Ok(None);
        }

        let length = self.read_compressed_uint()? as usize;
        let start = self.position;
        let bytes = self.read_bytes(length)?;
        std::str::from_utf8(bytes)
            .map(|s| Some(s.to_string()))
            .map_err(|e| malformed_error!("Invalid UTF-8 string at offset {}: {}", start, e))
    }
}
