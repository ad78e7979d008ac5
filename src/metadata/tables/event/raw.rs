use std::io::Read;

use crate::{
    metadata::{
        tables::{CodedIndex, CodedIndexType, RowReadable, TableId, TableInfo, TableReader},
        token::Token,
    },
    Result,
};

/// An event defined on a type. `TableId` = 0x14
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventRaw {
    /// `RowID`, 1-based
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// `EventAttributes` bitmask
    pub flags: u16,
    /// Event name
    pub name: u32,
    /// Delegate type of the event
    pub event_type: CodedIndex,
}

impl RowReadable for EventRaw {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        /* flags */                 2 +
        /* name */                  info.str_bytes() +
        /* event_type */            info.coded_index_bytes(CodedIndexType::TypeDefOrRef)
    }

    fn row_read<R: Read>(reader: &mut TableReader<R>, rid: u32) -> Result<Self> {
        Ok(EventRaw {
            rid,
            token: Token::from_parts(TableId::Event, rid),
            flags: reader.read_u16()?,
            name: reader.read_string_index()?,
            event_type: reader.read_coded_index(CodedIndexType::TypeDefOrRef)?,
        })
    }
}
