use std::io::Read;

use crate::{
    metadata::{
        tables::{RowReadable, TableId, TableInfo, TableReader},
        token::Token,
    },
    Result,
};

/// Indirection into the `Event` table. `TableId` = 0x13
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventPtrRaw {
    /// `RowID`, 1-based
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// The event this slot stands for
    pub event: u32,
}

impl RowReadable for EventPtrRaw {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        /* event */                 info.table_index_bytes(TableId::Event)
    }

    fn row_read<R: Read>(reader: &mut TableReader<R>, rid: u32) -> Result<Self> {
        Ok(EventPtrRaw {
            rid,
            token: Token::from_parts(TableId::EventPtr, rid),
            event: reader.read_table_index(TableId::Event)?,
        })
    }
}
