use std::io::Read;

use crate::{
    metadata::{
        tables::{RowReadable, TableId, TableInfo, TableReader},
        token::Token,
    },
    Result,
};

/// Identity of the assembly whose manifest this module carries. `TableId` = 0x20
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssemblyRaw {
    /// `RowID`, 1-based
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// `AssemblyHashAlgorithm` used for the `File` table hashes
    pub hash_alg_id: u32,
    /// Major version
    pub major_version: u16,
    /// Minor version
    pub minor_version: u16,
    /// Build number
    pub build_number: u16,
    /// Revision number
    pub revision_number: u16,
    /// `AssemblyFlags` bitmask
    pub flags: u32,
    /// Full public key, empty for unsigned assemblies
    pub public_key: u32,
    /// Simple name
    pub name: u32,
    /// Culture, empty for neutral
    pub culture: u32,
}

impl RowReadable for AssemblyRaw {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        /* hash_alg_id */           4 +
        /* major_version */         2 +
        /* minor_version */         2 +
        /* build_number */          2 +
        /* revision_number */       2 +
        /* flags */                 4 +
        /* public_key */            info.blob_bytes() +
        /* name */                  info.str_bytes() +
        /* culture */               info.str_bytes()
    }

    fn row_read<R: Read>(reader: &mut TableReader<R>, rid: u32) -> Result<Self> {
        Ok(AssemblyRaw {
            rid,
            token: Token::from_parts(TableId::Assembly, rid),
            hash_alg_id: reader.read_u32()?,
            major_version: reader.read_u16()?,
            minor_version: reader.read_u16()?,
            build_number: reader.read_u16()?,
            revision_number: reader.read_u16()?,
            flags: reader.read_u32()?,
            public_key: reader.read_blob_index()?,
            name: reader.read_string_index()?,
            culture: reader.read_string_index()?,
        })
    }
}
