use std::io::Read;

use crate::{
    metadata::{
        tables::{KeyedRow, RowReadable, TableId, TableInfo, TableReader},
        token::Token,
    },
    Result,
};

/// Explicit offset of a field. `TableId` = 0x10
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldLayoutRaw {
    /// `RowID`, 1-based
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// Byte offset of the field within its type
    pub field_offset: u32,
    /// The field this offset applies to
    pub field: u32,
}

impl RowReadable for FieldLayoutRaw {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        /* field_offset */          4 +
        /* field */                 info.table_index_bytes(TableId::Field)
    }

    fn row_read<R: Read>(reader: &mut TableReader<R>, rid: u32) -> Result<Self> {
        Ok(FieldLayoutRaw {
            rid,
            token: Token::from_parts(TableId::FieldLayout, rid),
            field_offset: reader.read_u32()?,
            field: reader.read_table_index(TableId::Field)?,
        })
    }
}

impl KeyedRow for FieldLayoutRaw {
    fn key(&self) -> Token {
        Token::from_parts(TableId::Field, self.field)
    }
}
