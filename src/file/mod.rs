//! Byte sources for managed PE images.
//!
//! A [`File`] owns a [`Backend`] (an in-memory buffer or a memory-mapped file) together with the
//! [`ImageLayout`] parsed from its headers. Everything above this layer addresses the image
//! through RVAs, which [`File::read_rva`] translates through the section table.
//!
//! ```rust,no_run
//! use cilreader::File;
//! use std::path::Path;
//!
//! let file = File::from_file(Path::new("assembly.dll"))?;
//! let (cli_rva, cli_size) = file.cli_header_directory()?;
//! let cli_header = file.read_rva(cli_rva, cli_size as usize)?;
//! assert_eq!(cli_header.len(), 72);
//! # Ok::<(), cilreader::Error>(())
//! ```

pub mod io;
pub mod layout;
pub mod parser;

mod memory;
mod physical;

use std::path::{Path, PathBuf};

use crate::{Error, Result};
use layout::{ImageLayout, DIRECTORY_CLI_HEADER};
use memory::Memory;
use physical::Physical;

/// Backend trait for file data sources.
///
/// Implementations provide bounds-checked access to the raw bytes of an image. All
/// implementations must be thread-safe.
pub trait Backend: Send + Sync {
    /// Returns a slice of the data at the given offset and length.
    ///
    /// # Errors
    /// Returns an error if the requested range is out of bounds.
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]>;

    /// Returns the entire data buffer.
    fn data(&self) -> &[u8];

    /// Returns the total length of the data buffer.
    fn len(&self) -> usize;
}

/// A loaded PE image: raw bytes plus the parsed header layout.
pub struct File {
    data: Box<dyn Backend>,
    layout: ImageLayout,
    path: Option<PathBuf>,
}

impl File {
    /// Memory-maps and parses the image at `path`.
    ///
    /// # Errors
    /// Returns [`Error::FileNotFound`] if `path` does not exist, or a format error if the
    /// file is not a PE image.
    pub fn from_file(path: &Path) -> Result<File> {
        let backend = Physical::new(path)?;
        Self::load(Box::new(backend), Some(path.to_path_buf()))
    }

    /// Parses an image held in memory.
    ///
    /// # Errors
    /// Returns [`Error::Empty`] for an empty buffer, or a format error if the buffer is not a PE
    /// image.
    pub fn from_mem(data: Vec<u8>) -> Result<File> {
        Self::load(Box::new(Memory::new(data)), None)
    }

    fn load(data: Box<dyn Backend>, path: Option<PathBuf>) -> Result<File> {
        if data.len() == 0 {
            return Err(Error::Empty);
        }

        let layout = ImageLayout::parse(data.data())?;
        Ok(File { data, layout, path })
    }

    /// Returns the total size of the image in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the image has a length of zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.len() == 0
    }

    /// The complete raw image.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.data.data()
    }

    /// Bounds-checked access to `len` bytes at a file offset.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if the range leaves the file.
    pub fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        self.data.data_slice(offset, len)
    }

    /// The parsed PE headers and section table.
    #[must_use]
    pub fn layout(&self) -> &ImageLayout {
        &self.layout
    }

    /// The path this image was mapped from, `None` for in-memory images.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Translates an RVA into a file offset.
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] if no section maps `rva`.
    pub fn rva_to_offset(&self, rva: u32) -> Result<usize> {
        let offset = self.layout.rva_to_file_offset(rva)?;
        usize::try_from(offset).map_err(|_| out_of_bounds_error!())
    }

    /// Reads `len` bytes starting at an RVA.
    ///
    /// # Errors
    /// Returns an error if the RVA is unmapped or the range leaves the file.
    pub fn read_rva(&self, rva: u32, len: usize) -> Result<&[u8]> {
        self.data_slice(self.rva_to_offset(rva)?, len)
    }

    /// Returns the `(rva, size)` of the CLI header data directory.
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] if the image is not a managed image.
    pub fn cli_header_directory(&self) -> Result<(u32, u32)> {
        self.layout
            .get_data_directory(DIRECTORY_CLI_HEADER)
            .ok_or_else(|| malformed_error!("Image does not have a CLI header directory"))
    }
}

impl std::fmt::Debug for File {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("File")
            .field("len", &self.len())
            .field("path", &self.path)
            .field("layout", &self.layout)
            .finish()
    }
}
