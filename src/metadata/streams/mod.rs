//! Metadata heaps and stream headers.
//!
//! The metadata root lists its streams by name. Four of them are heaps addressed by offset or
//! index from table columns:
//!
//! | Stream     | Type            | Content                                   |
//! |------------|-----------------|-------------------------------------------|
//! | `#Strings` | [`Strings`]     | NUL-terminated UTF-8 identifiers          |
//! | `#US`      | [`UserStrings`] | length-prefixed UTF-16 string literals    |
//! | `#Blob`    | [`Blob`]        | length-prefixed binary entries            |
//! | `#GUID`    | [`Guid`]        | 16-byte records, 1-based                  |
//!
//! [`Heaps`] bundles them for the resolver. A stream missing from the image is an empty heap.

mod blob;
mod guid;
mod streamheader;
mod strings;
mod userstrings;

pub use blob::Blob;
pub use guid::Guid;
pub use streamheader::{StreamHeader, KNOWN_STREAMS};
pub use strings::Strings;
pub use userstrings::UserStrings;

use std::sync::Arc;

use crate::{file::parser::Parser, metadata::token::Token, Result};

/// The four heaps of one module.
#[derive(Default)]
pub struct Heaps {
    /// `#Strings`
    pub strings: Strings,
    /// `#Blob`
    pub blob: Blob,
    /// `#GUID`
    pub guid: Guid,
    /// `#US`
    pub user_strings: UserStrings,
}

impl Heaps {
    /// Identifier string at `index`, `None` for 0.
    ///
    /// # Errors
    /// See [`Strings::get`].
    pub fn get_string(&self, index: u32) -> Result<Option<Arc<str>>> {
        self.strings.get(index)
    }

    /// Identifier string at `index`, empty for 0.
    ///
    /// # Errors
    /// See [`Strings::get`].
    pub fn get_name(&self, index: u32) -> Result<Arc<str>> {
        self.strings.get_or_empty(index)
    }

    /// Bounded parser over the blob at `index`.
    ///
    /// # Errors
    /// See [`Blob::get`].
    pub fn get_blob(&self, index: u32) -> Result<Parser<'_>> {
        self.blob.get(index)
    }

    /// Owned copy of the blob at `index`.
    ///
    /// # Errors
    /// See [`Blob::get`].
    pub fn get_blob_copy(&self, index: u32) -> Result<Vec<u8>> {
        self.blob.get_copy(index)
    }

    /// The literal addressed by a `0x70` token.
    ///
    /// # Errors
    /// See [`UserStrings::resolve`].
    pub fn resolve_user_string(&self, token: Token) -> Result<Arc<str>> {
        self.user_strings.resolve(token)
    }

    /// GUID with 1-based `index`, `None` for 0.
    ///
    /// # Errors
    /// See [`Guid::get`].
    pub fn get_guid(&self, index: u32) -> Result<Option<uguid::Guid>> {
        self.guid.get(index)
    }
}
