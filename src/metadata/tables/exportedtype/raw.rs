use std::io::Read;

use crate::{
    metadata::{
        tables::{CodedIndex, CodedIndexType, RowReadable, TableId, TableInfo, TableReader},
        token::Token,
    },
    Result,
};

/// A type exported from another module of the assembly, or forwarded to another assembly. `TableId` = 0x27
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportedTypeRaw {
    /// `RowID`, 1-based
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// `TypeAttributes` bitmask
    pub flags: u32,
    /// Hint: `TypeDef` row in the implementing module
    pub type_def_id: u32,
    /// Simple name of the type
    pub type_name: u32,
    /// Namespace, empty for nested types
    pub type_namespace: u32,
    /// `File` holding the type, `AssemblyRef` it is forwarded to, or the enclosing `ExportedType`
    pub implementation: CodedIndex,
}

impl RowReadable for ExportedTypeRaw {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        /* flags */                 4 +
        /* type_def_id */           4 +
        /* type_name */             info.str_bytes() +
        /* type_namespace */        info.str_bytes() +
        /* implementation */        info.coded_index_bytes(CodedIndexType::Implementation)
    }

    fn row_read<R: Read>(reader: &mut TableReader<R>, rid: u32) -> Result<Self> {
        Ok(ExportedTypeRaw {
            rid,
            token: Token::from_parts(TableId::ExportedType, rid),
            flags: reader.read_u32()?,
            type_def_id: reader.read_u32()?,
            type_name: reader.read_string_index()?,
            type_namespace: reader.read_string_index()?,
            implementation: reader.read_coded_index(CodedIndexType::Implementation)?,
        })
    }
}
