use std::io::Read;

use crate::{
    metadata::{
        tables::{RowReadable, TableId, TableInfo, TableReader},
        token::Token,
    },
    Result,
};

/// Indirection into the `Property` table. `TableId` = 0x16
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyPtrRaw {
    /// `RowID`, 1-based
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// The property this slot stands for
    pub property: u32,
}

impl RowReadable for PropertyPtrRaw {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        /* property */              info.table_index_bytes(TableId::Property)
    }

    fn row_read<R: Read>(reader: &mut TableReader<R>, rid: u32) -> Result<Self> {
        Ok(PropertyPtrRaw {
            rid,
            token: Token::from_parts(TableId::PropertyPtr, rid),
            property: reader.read_table_index(TableId::Property)?,
        })
    }
}
