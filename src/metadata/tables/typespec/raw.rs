use std::io::Read;

use crate::{
    metadata::{
        tables::{RowReadable, TableId, TableInfo, TableReader},
        token::Token,
    },
    Result,
};

/// A constructed type described by a signature. `TableId` = 0x1b
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeSpecRaw {
    /// `RowID`, 1-based
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// `TypeSpec` blob
    pub signature: u32,
}

impl RowReadable for TypeSpecRaw {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        /* signature */             info.blob_bytes()
    }

    fn row_read<R: Read>(reader: &mut TableReader<R>, rid: u32) -> Result<Self> {
        Ok(TypeSpecRaw {
            rid,
            token: Token::from_parts(TableId::TypeSpec, rid),
            signature: reader.read_blob_index()?,
        })
    }
}
