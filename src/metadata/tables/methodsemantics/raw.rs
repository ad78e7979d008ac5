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

/// Binds an accessor method to a property or event. `TableId` = 0x18
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodSemanticsRaw {
    /// `RowID`, 1-based
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// `MethodSemanticsAttributes` bitmask
    pub semantics: u16,
    /// The accessor method
    pub method: u32,
    /// The property or event
    pub association: CodedIndex,
}

impl RowReadable for MethodSemanticsRaw {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        /* semantics */             2 +
        /* method */                info.table_index_bytes(TableId::MethodDef) +
        /* association */           info.coded_index_bytes(CodedIndexType::HasSemantics)
    }

    fn row_read<R: Read>(reader: &mut TableReader<R>, rid: u32) -> Result<Self> {
        Ok(MethodSemanticsRaw {
            rid,
            token: Token::from_parts(TableId::MethodSemantics, rid),
            semantics: reader.read_u16()?,
            method: reader.read_table_index(TableId::MethodDef)?,
            association: reader.read_coded_index(CodedIndexType::HasSemantics)?,
        })
    }
}

impl KeyedRow for MethodSemanticsRaw {
    fn key(&self) -> Token {
        self.association.token
    }
}
