//! The `#Strings` heap (ECMA-335 §II.24.2.3).
//!
//! Identifier strings referenced from table columns, stored as NUL-terminated UTF-8. Index 0 is
//! the empty entry and means "no string". Decoded strings are memoized by index, so repeated
//! lookups of the same column value do not rescan the heap.

use std::sync::Arc;

use dashmap::DashMap;

use crate::Result;

/// Owned `#Strings` heap with an index-keyed decode cache.
///
/// # Examples
///
/// ```rust
/// use cilreader::metadata::streams::Strings;
///
/// let strings = Strings::from(b"\0Hello\0World\0".to_vec())?;
/// assert_eq!(strings.get(1)?.as_deref(), Some("Hello"));
/// assert_eq!(strings.get(7)?.as_deref(), Some("World"));
/// assert!(strings.get(0)?.is_none());
/// # Ok::<(), cilreader::Error>(())
/// ```
#[derive(Default)]
pub struct Strings {
    data: Box<[u8]>,
    cache: DashMap<u32, Arc<str>>,
}

impl Strings {
    /// Wraps the heap bytes. A non-empty heap must start with the empty entry.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the first byte is not `0`.
    pub fn from(data: Vec<u8>) -> Result<Strings> {
        if data.first().is_some_and(|first| *first != 0) {
            return Err(malformed_error!("#Strings heap does not start with an empty entry"));
        }

        Ok(Strings {
            data: data.into_boxed_slice(),
            cache: DashMap::new(),
        })
    }

    /// A heap without entries, used when the stream is absent.
    #[must_use]
    pub fn empty() -> Strings {
        Strings::default()
    }

    /// The string starting at `index`, `None` for index 0.
    ///
    /// Invalid UTF-8 sequences are replaced with `U+FFFD`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for an index past the heap, or
    /// [`crate::Error::Malformed`] if the string is not terminated.
    pub fn get(&self, index: u32) -> Result<Option<Arc<str>>> {
        if index == 0 {
            return Ok(None);
        }

        if let Some(cached) = self.cache.get(&index) {
            return Ok(Some(cached.clone()));
        }

        let Some(tail) = self.data.get(index as usize..).filter(|tail| !tail.is_empty()) else {
            return Err(out_of_bounds_error!());
        };
        let Some(end) = tail.iter().position(|byte| *byte == 0) else {
            return Err(malformed_error!("Unterminated string at #Strings index {}", index));
        };

        let value: Arc<str> = Arc::from(String::from_utf8_lossy(&tail[..end]).as_ref());
        Ok(Some(self.cache.entry(index).or_insert(value).clone()))
    }

    /// Like [`Strings::get`], with index 0 mapped to the empty string.
    ///
    /// # Errors
    /// See [`Strings::get`].
    pub fn get_or_empty(&self, index: u32) -> Result<Arc<str>> {
        Ok(self.get(index)?.unwrap_or_else(|| Arc::from("")))
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

    /// Number of decoded strings currently memoized.
    #[must_use]
    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }
}
