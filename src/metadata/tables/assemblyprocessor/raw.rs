use std::io::Read;

use crate::{
    metadata::{
        tables::{RowReadable, TableId, TableInfo, TableReader},
        token::Token,
    },
    Result,
};

/// Target processor of the assembly, ignored by the runtime. `TableId` = 0x21
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssemblyProcessorRaw {
    /// `RowID`, 1-based
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// Processor identifier
    pub processor: u32,
}

impl RowReadable for AssemblyProcessorRaw {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        /* processor */             4
    }

    fn row_read<R: Read>(reader: &mut TableReader<R>, rid: u32) -> Result<Self> {
        Ok(AssemblyProcessorRaw {
            rid,
            token: Token::from_parts(TableId::AssemblyProcessor, rid),
            processor: reader.read_u32()?,
        })
    }
}
