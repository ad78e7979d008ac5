use std::io::Read;

use crate::{
    metadata::{
        tables::{KeyedRow, RowReadable, TableId, TableInfo, TableReader},
        token::Token,
    },
    Result,
};

/// Explicit packing and size of a type. `TableId` = 0x0f
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassLayoutRaw {
    /// `RowID`, 1-based
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// Field alignment, a power of two up to 128
    pub packing_size: u16,
    /// Total size of the type in bytes
    pub class_size: u32,
    /// The type this layout applies to
    pub parent: u32,
}

impl RowReadable for ClassLayoutRaw {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        /* packing_size */          2 +
        /* class_size */            4 +
        /* parent */                info.table_index_bytes(TableId::TypeDef)
    }

    fn row_read<R: Read>(reader: &mut TableReader<R>, rid: u32) -> Result<Self> {
        Ok(ClassLayoutRaw {
            rid,
            token: Token::from_parts(TableId::ClassLayout, rid),
            packing_size: reader.read_u16()?,
            class_size: reader.read_u32()?,
            parent: reader.read_table_index(TableId::TypeDef)?,
        })
    }
}

impl KeyedRow for ClassLayoutRaw {
    fn key(&self) -> Token {
        Token::from_parts(TableId::TypeDef, self.parent)
    }
}
