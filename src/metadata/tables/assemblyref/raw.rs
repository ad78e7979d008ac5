use std::io::Read;

use crate::{
    metadata::{
        tables::{RowReadable, TableId, TableInfo, TableReader},
        token::Token,
    },
    Result,
};

/// A reference to another assembly. `TableId` = 0x23
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssemblyRefRaw {
    /// `RowID`, 1-based
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// Major version
    pub major_version: u16,
    /// Minor version
    pub minor_version: u16,
    /// Build number
    pub build_number: u16,
    /// Revision number
    pub revision_number: u16,
    /// `AssemblyFlags` bitmask; `PUBLIC_KEY` tells a full key from a token
    pub flags: u32,
    /// Full public key or the 8-byte token
    pub public_key_or_token: u32,
    /// Simple name
    pub name: u32,
    /// Culture, empty for neutral
    pub culture: u32,
    /// Hash of the referenced assembly
    pub hash_value: u32,
}

impl RowReadable for AssemblyRefRaw {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        /* major_version */         2 +
        /* minor_version */         2 +
        /* build_number */          2 +
        /* revision_number */       2 +
        /* flags */                 4 +
        /* public_key_or_token */   info.blob_bytes() +
        /* name */                  info.str_bytes() +
        /* culture */               info.str_bytes() +
        /* hash_value */            info.blob_bytes()
    }

    fn row_read<R: Read>(reader: &mut TableReader<R>, rid: u32) -> Result<Self> {
        Ok(AssemblyRefRaw {
            rid,
            token: Token::from_parts(TableId::AssemblyRef, rid),
            major_version: reader.read_u16()?,
            minor_version: reader.read_u16()?,
            build_number: reader.read_u16()?,
            revision_number: reader.read_u16()?,
            flags: reader.read_u32()?,
            public_key_or_token: reader.read_blob_index()?,
            name: reader.read_string_index()?,
            culture: reader.read_string_index()?,
            hash_value: reader.read_blob_index()?,
        })
    }
}
