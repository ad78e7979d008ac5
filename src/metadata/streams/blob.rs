//! The `#Blob` heap (ECMA-335 §II.24.2.4).
//!
//! Binary entries prefixed with a compressed length: signatures, constant values, custom
//! attribute arguments, public keys. [`Blob::get`] turns a column value into a [`Parser`]
//! bounded to exactly that entry.

use crate::{file::parser::Parser, Result};

/// Owned `#Blob` heap.
#[derive(Default)]
pub struct Blob {
    data: Box<[u8]>,
}

impl Blob {
    /// Wraps the heap bytes. A non-empty heap must start with the empty entry.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the first byte is not `0`.
    pub fn from(data: Vec<u8>) -> Result<Blob> {
        if data.first().is_some_and(|first| *first != 0) {
            return Err(malformed_error!("#Blob heap does not start with an empty entry"));
        }

        Ok(Blob {
            data: data.into_boxed_slice(),
        })
    }

    /// A heap without entries, used when the stream is absent.
    #[must_use]
    pub fn empty() -> Blob {
        Blob::default()
    }

    /// A parser over the entry at `index`.
    ///
    /// Index 0 is the empty blob, also when the heap itself is empty.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the index or the entry's length runs past the heap.
    pub fn get(&self, index: u32) -> Result<Parser<'_>> {
        if index == 0 && self.data.is_empty() {
            return Ok(Parser::new(&[]));
        }

        Parser::from_blob(&self.data, index as usize)
    }

    /// An owned copy of the entry at `index`.
    ///
    /// # Errors
    /// See [`Blob::get`].
    pub fn get_copy(&self, index: u32) -> Result<Vec<u8>> {
        Ok(self.get(index)?.data().to_vec())
    }

    /// Size of the heap in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// `true` if the heap has no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn entries() {
        #[rustfmt::skip]
        let blob = Blob::from(vec![
            0x00,
            0x03, 0x20, 0x00, 0x01,
            0x02, 0x06, 0x08,
        ]).unwrap();

        let mut sig = blob.get(1).unwrap();
        assert_eq!(sig.len(), 3);
        assert_eq!(sig.read_le::<u8>().unwrap(), 0x20);
        assert_eq!(blob.get_copy(5).unwrap(), vec![0x06, 0x08]);
        assert!(blob.get(0).unwrap().is_empty());
    }

    #[test]
    fn long_length_prefix() {
        let mut data = vec![0x00, 0x81, 0x00];
        data.extend(std::iter::repeat(0xAB).take(0x100));
        let blob = Blob::from(data).unwrap();
        let entry = blob.get(1).unwrap();
        assert_eq!(entry.len(), 0x100);
        assert!(entry.data().iter().all(|b| *b == 0xAB));
    }

    #[test]
    fn out_of_range() {
        let blob = Blob::from(vec![0x00, 0x05, 0x01]).unwrap();
        assert!(matches!(blob.get(1), Err(Error::OutOfBounds { .. })));
        assert!(matches!(blob.get(9), Err(Error::OutOfBounds { .. })));
        assert!(Blob::from(vec![0x01]).is_err());
        assert!(Blob::empty().get(0).unwrap().is_empty());
        assert!(Blob::empty().get(1).is_err());
    }
}
