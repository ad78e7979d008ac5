use std::io::Read;

use crate::{
    metadata::{
        tables::{RowReadable, TableId, TableInfo, TableReader},
        token::Token,
    },
    Result,
};

/// Target operating system of the assembly, ignored by the runtime. `TableId` = 0x22
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssemblyOsRaw {
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
}

impl RowReadable for AssemblyOsRaw {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        /* os_platform_id */        4 +
        /* os_major_version */      4 +
        /* os_minor_version */      4
    }

    fn row_read<R: Read>(reader: &mut TableReader<R>, rid: u32) -> Result<Self> {
        Ok(AssemblyOsRaw {
            rid,
            token: Token::from_parts(TableId::AssemblyOS, rid),
            os_platform_id: reader.read_u32()?,
            os_major_version: reader.read_u32()?,
            os_minor_version: reader.read_u32()?,
        })
    }
}
