use std::io::Read;

use crate::{
    metadata::{
        tables::{KeyedRow, RowReadable, TableId, TableInfo, TableReader},
        token::Token,
    },
    Result,
};

/// Links a type to the run of properties it owns. `TableId` = 0x15
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyMapRaw {
    /// `RowID`, 1-based
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// The owning type
    pub parent: u32,
    /// First of the contiguous run of properties owned by `parent`
    pub property_list: u32,
}

impl RowReadable for PropertyMapRaw {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        /* parent */                info.table_index_bytes(TableId::TypeDef) +
        /* property_list */         info.table_index_bytes(TableId::Property)
    }

    fn row_read<R: Read>(reader: &mut TableReader<R>, rid: u32) -> Result<Self> {
        Ok(PropertyMapRaw {
            rid,
            token: Token::from_parts(TableId::PropertyMap, rid),
            parent: reader.read_table_index(TableId::TypeDef)?,
            property_list: reader.read_table_index(TableId::Property)?,
        })
    }
}

impl KeyedRow for PropertyMapRaw {
    fn key(&self) -> Token {
        Token::from_parts(TableId::TypeDef, self.parent)
    }
}
