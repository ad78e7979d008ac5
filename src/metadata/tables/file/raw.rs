use std::io::Read;

use crate::{
    metadata::{
        tables::{RowReadable, TableId, TableInfo, TableReader},
        token::Token,
    },
    Result,
};

/// A file that is part of the assembly. `TableId` = 0x26
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileRaw {
    /// `RowID`, 1-based
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// `FileAttributes` bitmask
    pub flags: u32,
    /// File name, relative to the manifest module
    pub name: u32,
    /// Hash of the file contents
    pub hash_value: u32,
}

impl RowReadable for FileRaw {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        /* flags */                 4 +
        /* name */                  info.str_bytes() +
        /* hash_value */            info.blob_bytes()
    }

    fn row_read<R: Read>(reader: &mut TableReader<R>, rid: u32) -> Result<Self> {
        Ok(FileRaw {
            rid,
            token: Token::from_parts(TableId::File, rid),
            flags: reader.read_u32()?,
            name: reader.read_string_index()?,
            hash_value: reader.read_blob_index()?,
        })
    }
}
