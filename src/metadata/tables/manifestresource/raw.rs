use std::io::Read;

use crate::{
    metadata::{
        tables::{CodedIndex, CodedIndexType, RowReadable, TableId, TableInfo, TableReader},
        token::Token,
    },
    Result,
};

/// A resource carried by or referenced from the assembly. `TableId` = 0x28
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManifestResourceRaw {
    /// `RowID`, 1-based
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// Offset of the resource data in the embedded resources or in the file
    pub offset: u32,
    /// `ManifestResourceAttributes` bitmask
    pub flags: u32,
    /// Resource name
    pub name: u32,
    /// Null for embedded resources, otherwise the `File` or `AssemblyRef` holding it
    pub implementation: CodedIndex,
}

impl RowReadable for ManifestResourceRaw {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        /* offset */                4 +
        /* flags */                 4 +
        /* name */                  info.str_bytes() +
        /* implementation */        info.coded_index_bytes(CodedIndexType::Implementation)
    }

    fn row_read<R: Read>(reader: &mut TableReader<R>, rid: u32) -> Result<Self> {
        Ok(ManifestResourceRaw {
            rid,
            token: Token::from_parts(TableId::ManifestResource, rid),
            offset: reader.read_u32()?,
            flags: reader.read_u32()?,
            name: reader.read_string_index()?,
            implementation: reader.read_coded_index(CodedIndexType::Implementation)?,
        })
    }
}
