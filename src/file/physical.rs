//! Memory-mapped file byte source.

use super::Backend;
use crate::{Error, Result};

use memmap2::Mmap;
use std::{fs, io, path::Path};

/// A [`Backend`] over a read-only memory mapping of a file on disk.
///
/// Dropping the backend unmaps the file and releases its handle.
#[derive(Debug)]
pub struct Physical {
    data: Mmap,
}

impl Physical {
    /// Opens and maps `path`.
    ///
    /// # Errors
    /// Returns [`Error::FileNotFound`] if the path does not exist and [`Error::FileError`] for
    /// any other I/O failure.
    pub fn new(path: impl AsRef<Path>) -> Result<Physical> {
        let path = path.as_ref();
        let file = fs::File::open(path).map_err(|error| match error.kind() {
            io::ErrorKind::NotFound => Error::FileNotFound(path.display().to_string()),
            _ => Error::FileError(error),
        })?;

        // SAFETY: the mapping is read-only and never handed out beyond the lifetime of self.
        let mmap = unsafe { Mmap::map(&file) }?;

        Ok(Physical { data: mmap })
    }
}

impl Backend for Physical {
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        let Some(offset_end) = offset.checked_add(len) else {
            return Err(out_of_bounds_error!());
        };

        if offset_end > self.data.len() {
            return Err(out_of_bounds_error!());
        }

        Ok(&self.data[offset..offset_end])
    }

    fn data(&self) -> &[u8] {
        self.data.as_ref()
    }

    fn len(&self) -> usize {
        self.data.len()
    }
}
