//! Metadata tokens.
//!
//! A token is a 32-bit reference to a metadata entity: the high byte selects the table
//! (or `0x70` for a user string), the low 24 bits hold the 1-based row index. Row `0` is the
//! null reference used by optional columns.
//!
//! ```rust
//! use cilreader::{metadata::tables::TableId, Token};
//!
//! let token = Token::new(0x0200_0005);
//! assert_eq!(token.table_id(), Some(TableId::TypeDef));
//! assert_eq!(token.row(), 5);
//! assert_eq!(Token::from_parts(TableId::TypeDef, 5), token);
//! ```

use std::fmt;

use crate::metadata::tables::TableId;

/// Table tag of tokens that index the `#US` heap.
pub const USER_STRING_TAG: u8 = 0x70;

/// A metadata token: `(table << 24) | row`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Token(pub u32);

impl Token {
    /// Wraps a raw token value.
    #[must_use]
    pub fn new(value: u32) -> Self {
        Token(value)
    }

    /// Builds a token for `row` of `table`.
    #[must_use]
    pub fn from_parts(table: TableId, row: u32) -> Self {
        Token(((table as u32) << 24) | (row & 0x00FF_FFFF))
    }

    /// The raw 32-bit value.
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// The table tag in the high byte.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn table(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// The table this token indexes, `None` for user strings and unknown tags.
    #[must_use]
    pub fn table_id(&self) -> Option<TableId> {
        TableId::from_u8(self.table())
    }

    /// The 1-based row (or `#US` heap offset for user strings).
    #[must_use]
    pub fn row(&self) -> u32 {
        self.0 & 0x00FF_FFFF
    }

    /// `true` if the row part is zero.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.row() == 0
    }

    /// `true` if this token references the `#US` heap.
    #[must_use]
    pub fn is_user_string(&self) -> bool {
        self.table() == USER_STRING_TAG
    }
}

impl From<u32> for Token {
    fn from(value: u32) -> Self {
        Token(value)
    }
}

impl From<Token> for u32 {
    fn from(token: Token) -> Self {
        token.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token(0x{:08x}, table: 0x{:02x}, row: {})",
            self.0,
            self.table(),
            self.row()
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}
