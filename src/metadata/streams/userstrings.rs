//! The `#US` heap (ECMA-335 §II.24.2.4).
//!
//! String literals used by `ldstr`, addressed by tokens with tag `0x70`. Each entry is a
//! compressed length followed by UTF-16LE code units and one trailing flag byte that marks
//! strings needing special handling. The length counts the flag byte, so the number of code
//! units is `length / 2`.

use std::sync::Arc;

use dashmap::DashMap;
use widestring::U16Str;

use crate::{
    file::parser::Parser,
    metadata::token::{Token, USER_STRING_TAG},
    Result,
};

/// Owned `#US` heap with a memo of decoded strings.
#[derive(Default)]
pub struct UserStrings {
    data: Box<[u8]>,
    cache: DashMap<u32, Arc<str>>,
}

impl UserStrings {
    /// Wraps the heap bytes. A non-empty heap must start with the empty entry.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the first byte is not `0`.
    pub fn from(data: Vec<u8>) -> Result<UserStrings> {
        if data.first().is_some_and(|first| *first != 0) {
            return Err(malformed_error!("#US heap does not start with an empty entry"));
        }

        Ok(UserStrings {
            data: data.into_boxed_slice(),
            cache: DashMap::new(),
        })
    }

    /// A heap without entries.
    #[must_use]
    pub fn empty() -> UserStrings {
        UserStrings::default()
    }

    /// Decodes the literal addressed by a `0x70` token.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the token has another tag, or
    /// [`crate::Error::OutOfBounds`] if the entry runs past the heap.
    pub fn resolve(&self, token: Token) -> Result<Arc<str>> {
        if token.table() != USER_STRING_TAG {
            return Err(malformed_error!("Token {} is not a user string token", token));
        }

        self.get(token.row())
    }

    /// Decodes the literal at heap offset `index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the entry runs past the heap.
    pub fn get(&self, index: u32) -> Result<Arc<str>> {
        if let Some(cached) = self.cache.get(&index) {
            return Ok(cached.clone());
        }

        let entry = Parser::from_blob(&self.data, index as usize)?;
        let bytes = entry.data();
        let units: Vec<u16> = bytes[..(bytes.len() & !1)]
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();

        let value: Arc<str> = Arc::from(U16Str::from_slice(&units).to_string_lossy());
        Ok(self.cache.entry(index).or_insert(value).clone())
    }
}
