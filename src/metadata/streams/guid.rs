//! The `#GUID` heap (ECMA-335 §II.24.2.5): a sequence of 16-byte records, indexed from 1.

use crate::Result;

const GUID_SIZE: usize = 16;

/// Owned `#GUID` heap.
#[derive(Default)]
pub struct Guid {
    data: Box<[u8]>,
}

impl Guid {
    /// Wraps the heap bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the size is not a multiple of 16.
    pub fn from(data: Vec<u8>) -> Result<Guid> {
        if data.len() % GUID_SIZE != 0 {
            return Err(malformed_error!(
                "#GUID heap size {} is not a multiple of 16",
                data.len()
            ));
        }

        Ok(Guid {
            data: data.into_boxed_slice(),
        })
    }

    /// A heap without entries.
    #[must_use]
    pub fn empty() -> Guid {
        Guid::default()
    }

    /// The GUID with 1-based `index`, `None` for index 0.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the index is past the last record.
    pub fn get(&self, index: u32) -> Result<Option<uguid::Guid>> {
        if index == 0 {
            return Ok(None);
        }

        let start = (index as usize - 1) * GUID_SIZE;
        let Some(record) = self.data.get(start..start + GUID_SIZE) else {
            return Err(out_of_bounds_error!());
        };

        let mut buffer = [0u8; GUID_SIZE];
        buffer.copy_from_slice(record);
        Ok(Some(uguid::Guid::from_bytes(buffer)))
    }

    /// Number of records.
    #[must_use]
    pub fn count(&self) -> usize {
        self.data.len() / GUID_SIZE
    }
}
