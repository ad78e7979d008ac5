use std::io::Read;

use crate::{
    metadata::{
        tables::{RowReadable, TableId, TableInfo, TableReader},
        token::Token,
    },
    Result,
};

/// A named parameter of a method; sequence 0 describes the return value. `TableId` = 0x08
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamRaw {
    /// `RowID`, 1-based
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// `ParamAttributes` bitmask
    pub flags: u16,
    /// Position in the signature, 0 for the return value
    pub sequence: u16,
    /// Parameter name
    pub name: u32,
}

impl RowReadable for ParamRaw {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        /* flags */                 2 +
        /* sequence */              2 +
        /* name */                  info.str_bytes()
    }

    fn row_read<R: Read>(reader: &mut TableReader<R>, rid: u32) -> Result<Self> {
        Ok(ParamRaw {
            rid,
            token: Token::from_parts(TableId::Param, rid),
            flags: reader.read_u16()?,
            sequence: reader.read_u16()?,
            name: reader.read_string_index()?,
        })
    }
}
