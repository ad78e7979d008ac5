use std::io::Read;

use crate::{
    metadata::{
        tables::{RowReadable, TableId, TableInfo, TableReader},
        token::Token,
    },
    Result,
};

/// A method defined in this module. `TableId` = 0x06
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodDefRaw {
    /// `RowID`, 1-based
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// RVA of the method body, 0 for abstract, runtime or PInvoke methods
    pub rva: u32,
    /// `MethodImplAttributes` bitmask
    pub impl_flags: u16,
    /// `MethodAttributes` bitmask
    pub flags: u16,
    /// Method name
    pub name: u32,
    /// `MethodDefSig` blob
    pub signature: u32,
    /// First of the contiguous run of parameters owned by this method
    pub param_list: u32,
}

impl RowReadable for MethodDefRaw {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        /* rva */                   4 +
        /* impl_flags */            2 +
        /* flags */                 2 +
        /* name */                  info.str_bytes() +
        /* signature */             info.blob_bytes() +
        /* param_list */            info.table_index_bytes(TableId::Param)
    }

    fn row_read<R: Read>(reader: &mut TableReader<R>, rid: u32) -> Result<Self> {
        Ok(MethodDefRaw {
            rid,
            token: Token::from_parts(TableId::MethodDef, rid),
            rva: reader.read_u32()?,
            impl_flags: reader.read_u16()?,
            flags: reader.read_u16()?,
            name: reader.read_string_index()?,
            signature: reader.read_blob_index()?,
            param_list: reader.read_table_index(TableId::Param)?,
        })
    }
}
