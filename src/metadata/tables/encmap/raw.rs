use std::io::Read;

use crate::{
    metadata::{
        tables::{RowReadable, TableId, TableInfo, TableReader},
        token::Token,
    },
    Result,
};

/// Edit-and-continue token map entry. `TableId` = 0x1f
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncMapRaw {
    /// `RowID`, 1-based
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// Token of the mapped row
    pub token_value: u32,
}

impl RowReadable for EncMapRaw {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        /* token_value */           4
    }

    fn row_read<R: Read>(reader: &mut TableReader<R>, rid: u32) -> Result<Self> {
        Ok(EncMapRaw {
            rid,
            token: Token::from_parts(TableId::EncMap, rid),
            token_value: reader.read_u32()?,
        })
    }
}
