use std::io::Read;

use crate::{
    metadata::{
        tables::{CodedIndex, CodedIndexType, RowReadable, TableId, TableInfo, TableReader},
        token::Token,
    },
    Result,
};

/// A reference to a field or method of another type. `TableId` = 0x0a
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberRefRaw {
    /// `RowID`, 1-based
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// Owner: a type, a module (global members), or a `MethodDef` for vararg call sites
    pub class: CodedIndex,
    /// Member name
    pub name: u32,
    /// `FieldSig` or `MethodRefSig` blob; the first byte tells them apart
    pub signature: u32,
}

impl RowReadable for MemberRefRaw {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        /* class */                 info.coded_index_bytes(CodedIndexType::MemberRefParent) +
        /* name */                  info.str_bytes() +
        /* signature */             info.blob_bytes()
    }

    fn row_read<R: Read>(reader: &mut TableReader<R>, rid: u32) -> Result<Self> {
        Ok(MemberRefRaw {
            rid,
            token: Token::from_parts(TableId::MemberRef, rid),
            class: reader.read_coded_index(CodedIndexType::MemberRefParent)?,
            name: reader.read_string_index()?,
            signature: reader.read_blob_index()?,
        })
    }
}
