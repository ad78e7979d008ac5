use std::io::Read;

use crate::{
    metadata::{
        tables::{CodedIndex, CodedIndexType, RowReadable, TableId, TableInfo, TableReader},
        token::Token,
    },
    Result,
};

/// A reference to a type defined in another module, assembly, or enclosing type. `TableId` = 0x01
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeRefRaw {
    /// `RowID`, 1-based
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// Where the type is defined: `Module`, `ModuleRef`, `AssemblyRef` or an enclosing `TypeRef`; null means the `ExportedType` table of this assembly
    pub resolution_scope: CodedIndex,
    /// Simple name of the type
    pub type_name: u32,
    /// Namespace, empty for nested types
    pub type_namespace: u32,
}

impl RowReadable for TypeRefRaw {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        /* resolution_scope */      info.coded_index_bytes(CodedIndexType::ResolutionScope) +
        /* type_name */             info.str_bytes() +
        /* type_namespace */        info.str_bytes()
    }

    fn row_read<R: Read>(reader: &mut TableReader<R>, rid: u32) -> Result<Self> {
        Ok(TypeRefRaw {
            rid,
            token: Token::from_parts(TableId::TypeRef, rid),
            resolution_scope: reader.read_coded_index(CodedIndexType::ResolutionScope)?,
            type_name: reader.read_string_index()?,
            type_namespace: reader.read_string_index()?,
        })
    }
}
