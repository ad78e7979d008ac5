use std::io::Read;

use crate::{
    metadata::{
        tables::{RowReadable, TableId, TableInfo, TableReader},
        token::Token,
    },
    Result,
};

/// Target operating system of a referenced assembly. `TableId` = 0x25
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssemblyRefOsRaw {
    /// `RowID`, 1-based
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// Platform identifier
    pub os_platform_id: u32,
    /// Major version of the platform
    pub os_major_version: u32,
    /// Minor version of the platform
    pub os_minor_version: u32,
    /// The referenced assembly
    pub assembly_ref: u32,
}

impl RowReadable for AssemblyRefOsRaw {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        /* os_platform_id */        4 +
        /* os_major_version */      4 +
        /* os_minor_version */      4 +
        /* assembly_ref */          info.table_index_bytes(TableId::AssemblyRef)
    }

    fn row_read<R: Read>(reader: &mut TableReader<R>, rid: u32) -> Result<Self> {
        Ok(AssemblyRefOsRaw {
            rid,
            token: Token::from_parts(TableId::AssemblyRefOS, rid),
            os_platform_id: reader.read_u32()?,
            os_major_version: reader.read_u32()?,
            os_minor_version: reader.read_u32()?,
            assembly_ref: reader.read_table_index(TableId::AssemblyRef)?,
        })
    }
}
