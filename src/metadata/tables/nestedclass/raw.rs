use std::io::Read;

use crate::{
    metadata::{
        tables::{KeyedRow, RowReadable, TableId, TableInfo, TableReader},
        token::Token,
    },
    Result,
};

/// Records which type encloses a nested type. `TableId` = 0x29
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NestedClassRaw {
    /// `RowID`, 1-based
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// The nested type
    pub nested_class: u32,
    /// Its enclosing type
    pub enclosing_class: u32,
}

impl RowReadable for NestedClassRaw {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        /* nested_class */          info.table_index_bytes(TableId::TypeDef) +
        /* enclosing_class */       info.table_index_bytes(TableId::TypeDef)
    }

    fn row_read<R: Read>(reader: &mut TableReader<R>, rid: u32) -> Result<Self> {
        Ok(NestedClassRaw {
            rid,
            token: Token::from_parts(TableId::NestedClass, rid),
            nested_class: reader.read_table_index(TableId::TypeDef)?,
            enclosing_class: reader.read_table_index(TableId::TypeDef)?,
        })
    }
}

impl KeyedRow for NestedClassRaw {
    fn key(&self) -> Token {
        Token::from_parts(TableId::TypeDef, self.nested_class)
    }
}
