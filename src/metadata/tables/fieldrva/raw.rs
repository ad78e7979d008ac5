use std::io::Read;

use crate::{
    metadata::{
        tables::{KeyedRow, RowReadable, TableId, TableInfo, TableReader},
        token::Token,
    },
    Result,
};

/// Initial data of a static field. `TableId` = 0x1d
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldRvaRaw {
    /// `RowID`, 1-based
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// RVA of the field data
    pub rva: u32,
    /// The field this data belongs to
    pub field: u32,
}

impl RowReadable for FieldRvaRaw {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        /* rva */                   4 +
        /* field */                 info.table_index_bytes(TableId::Field)
    }

    fn row_read<R: Read>(reader: &mut TableReader<R>, rid: u32) -> Result<Self> {
        Ok(FieldRvaRaw {
            rid,
            token: Token::from_parts(TableId::FieldRVA, rid),
            rva: reader.read_u32()?,
            field: reader.read_table_index(TableId::Field)?,
        })
    }
}

impl KeyedRow for FieldRvaRaw {
    fn key(&self) -> Token {
        Token::from_parts(TableId::Field, self.field)
    }
}
