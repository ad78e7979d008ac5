use std::io::Read;

use crate::{
    metadata::{
        tables::{RowReadable, TableId, TableInfo, TableReader},
        token::Token,
    },
    Result,
};

/// Identity of the current module; exactly one row per image. `TableId` = 0x00
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleRaw {
    /// `RowID`, 1-based
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// Reserved, always zero
    pub generation: u16,
    /// Module name
    pub name: u32,
    /// Module version id, distinguishes two versions of the same module
    pub mvid: u32,
    /// Reserved, always zero
    pub enc_id: u32,
    /// Reserved, always zero
    pub enc_base_id: u32,
}

impl RowReadable for ModuleRaw {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        /* generation */            2 +
        /* name */                  info.str_bytes() +
        /* mvid */                  info.guid_bytes() +
        /* enc_id */                info.guid_bytes() +
        /* enc_base_id */           info.guid_bytes()
    }

    fn row_read<R: Read>(reader: &mut TableReader<R>, rid: u32) -> Result<Self> {
        Ok(ModuleRaw {
            rid,
            token: Token::from_parts(TableId::Module, rid),
            generation: reader.read_u16()?,
            name: reader.read_string_index()?,
            mvid: reader.read_guid_index()?,
            enc_id: reader.read_guid_index()?,
            enc_base_id: reader.read_guid_index()?,
        })
    }
}
