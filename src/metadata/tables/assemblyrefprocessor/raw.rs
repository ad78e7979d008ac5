use std::io::Read;

use crate::{
    metadata::{
        tables::{RowReadable, TableId, TableInfo, TableReader},
        token::Token,
    },
    Result,
};

/// Target processor of a referenced assembly. `TableId` = 0x24
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssemblyRefProcessorRaw {
    /// `RowID`, 1-based
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// Processor identifier
    pub processor: u32,
    /// The referenced assembly
    pub assembly_ref: u32,
}

impl RowReadable for AssemblyRefProcessorRaw {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        /* processor */             4 +
        /* assembly_ref */          info.table_index_bytes(TableId::AssemblyRef)
    }

    fn row_read<R: Read>(reader: &mut TableReader<R>, rid: u32) -> Result<Self> {
        Ok(AssemblyRefProcessorRaw {
            rid,
            token: Token::from_parts(TableId::AssemblyRefProcessor, rid),
            processor: reader.read_u32()?,
            assembly_ref: reader.read_table_index(TableId::AssemblyRef)?,
        })
    }
}
