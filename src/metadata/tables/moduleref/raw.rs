use std::io::Read;

use crate::{
    metadata::{
        tables::{RowReadable, TableId, TableInfo, TableReader},
        token::Token,
    },
    Result,
};

/// A reference to another module of the same assembly, or a native library. `TableId` = 0x1a
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleRefRaw {
    /// `RowID`, 1-based
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// File name of the module
    pub name: u32,
}

impl RowReadable for ModuleRefRaw {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        /* name */                  info.str_bytes()
    }

    fn row_read<R: Read>(reader: &mut TableReader<R>, rid: u32) -> Result<Self> {
        Ok(ModuleRefRaw {
            rid,
            token: Token::from_parts(TableId::ModuleRef, rid),
            name: reader.read_string_index()?,
        })
    }
}
