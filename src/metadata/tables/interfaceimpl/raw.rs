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

/// Records that a type implements an interface. `TableId` = 0x09
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterfaceImplRaw {
    /// `RowID`, 1-based
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// The implementing type
    pub class: u32,
    /// The implemented interface
    pub interface: CodedIndex,
}

impl RowReadable for InterfaceImplRaw {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        /* class */                 info.table_index_bytes(TableId::TypeDef) +
        /* interface */             info.coded_index_bytes(CodedIndexType::TypeDefOrRef)
    }

    fn row_read<R: Read>(reader: &mut TableReader<R>, rid: u32) -> Result<Self> {
        Ok(InterfaceImplRaw {
            rid,
            token: Token::from_parts(TableId::InterfaceImpl, rid),
            class: reader.read_table_index(TableId::TypeDef)?,
            interface: reader.read_coded_index(CodedIndexType::TypeDefOrRef)?,
        })
    }
}

impl KeyedRow for InterfaceImplRaw {
    fn key(&self) -> Token {
        Token::from_parts(TableId::TypeDef, self.class)
    }
}
