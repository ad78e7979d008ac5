use std::io::Read;

use crate::{
    metadata::{
        tables::{RowReadable, TableId, TableInfo, TableReader},
        token::Token,
    },
    Result,
};

/// Indirection into the `Param` table. `TableId` = 0x07
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamPtrRaw {
    /// `RowID`, 1-based
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// The parameter this slot stands for
    pub param: u32,
}

impl RowReadable for ParamPtrRaw {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        /* param */                 info.table_index_bytes(TableId::Param)
    }

    fn row_read<R: Read>(reader: &mut TableReader<R>, rid: u32) -> Result<Self> {
        Ok(ParamPtrRaw {
            rid,
            token: Token::from_parts(TableId::ParamPtr, rid),
            param: reader.read_table_index(TableId::Param)?,
        })
    }
}
