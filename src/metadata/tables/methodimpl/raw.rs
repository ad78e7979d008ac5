use std::io::Read;

use crate::{
    metadata::{
        tables::{
            CodedIndex, CodedIndexType, KeyedRow, RowReadable, TableId, TableInfo, TableReader,
        },
        token::Token,
    },
    Result,
};

/// An explicit override of an interface or base method. `TableId` = 0x19
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodImplRaw {
    /// `RowID`, 1-based
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// The type containing the override
    pub class: u32,
    /// The implementing method
    pub method_body: CodedIndex,
    /// The overridden method
    pub method_declaration: CodedIndex,
}

impl RowReadable for MethodImplRaw {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        /* class */                 info.table_index_bytes(TableId::TypeDef) +
        /* method_body */           info.coded_index_bytes(CodedIndexType::MethodDefOrRef) +
        /* method_declaration */    info.coded_index_bytes(CodedIndexType::MethodDefOrRef)
    }

    fn row_read<R: Read>(reader: &mut TableReader<R>, rid: u32) -> Result<Self> {
        Ok(MethodImplRaw {
            rid,
            token: Token::from_parts(TableId::MethodImpl, rid),
            class: reader.read_table_index(TableId::TypeDef)?,
            method_body: reader.read_coded_index(CodedIndexType::MethodDefOrRef)?,
            method_declaration: reader.read_coded_index(CodedIndexType::MethodDefOrRef)?,
        })
    }
}

impl KeyedRow for MethodImplRaw {
    fn key(&self) -> Token {
        Token::from_parts(TableId::TypeDef, self.class)
    }
}
