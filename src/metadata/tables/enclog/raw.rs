use std::io::Read;

use crate::{
    metadata::{
        tables::{RowReadable, TableId, TableInfo, TableReader},
        token::Token,
    },
    Result,
};

/// Edit-and-continue log entry. `TableId` = 0x1e
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncLogRaw {
    /// `RowID`, 1-based
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// Token of the affected row
    pub token_value: u32,
    /// Edit operation
    pub func_code: u32,
}

impl RowReadable for EncLogRaw {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        /* token_value */           4 +
        /* func_code */             4
    }

    fn row_read<R: Read>(reader: &mut TableReader<R>, rid: u32) -> Result<Self> {
        Ok(EncLogRaw {
            rid,
            token: Token::from_parts(TableId::EncLog, rid),
            token_value: reader.read_u32()?,
            func_code: reader.read_u32()?,
        })
    }
}
