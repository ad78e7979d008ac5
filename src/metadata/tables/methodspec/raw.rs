use std::io::Read;

use crate::{
    metadata::{
        tables::{CodedIndex, CodedIndexType, RowReadable, TableId, TableInfo, TableReader},
        token::Token,
    },
    Result,
};

/// An instantiation of a generic method. `TableId` = 0x2b
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodSpecRaw {
    /// `RowID`, 1-based
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// The generic method definition
    pub method: CodedIndex,
    /// `MethodSpec` blob with the type arguments
    pub instantiation: u32,
}

impl RowReadable for MethodSpecRaw {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        /* method */                info.coded_index_bytes(CodedIndexType::MethodDefOrRef) +
        /* instantiation */         info.blob_bytes()
    }

    fn row_read<R: Read>(reader: &mut TableReader<R>, rid: u32) -> Result<Self> {
        Ok(MethodSpecRaw {
            rid,
            token: Token::from_parts(TableId::MethodSpec, rid),
            method: reader.read_coded_index(CodedIndexType::MethodDefOrRef)?,
            instantiation: reader.read_blob_index()?,
        })
    }
}
