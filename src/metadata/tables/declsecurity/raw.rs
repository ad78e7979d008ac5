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

/// A declarative security permission set. `TableId` = 0x0e
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeclSecurityRaw {
    /// `RowID`, 1-based
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// `SecurityAction` value
    pub action: u16,
    /// Owner of the permission set
    pub parent: CodedIndex,
    /// Serialized permission set
    pub permission_set: u32,
}

impl RowReadable for DeclSecurityRaw {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        /* action */                2 +
        /* parent */                info.coded_index_bytes(CodedIndexType::HasDeclSecurity) +
        /* permission_set */        info.blob_bytes()
    }

    fn row_read<R: Read>(reader: &mut TableReader<R>, rid: u32) -> Result<Self> {
        Ok(DeclSecurityRaw {
            rid,
            token: Token::from_parts(TableId::DeclSecurity, rid),
            action: reader.read_u16()?,
            parent: reader.read_coded_index(CodedIndexType::HasDeclSecurity)?,
            permission_set: reader.read_blob_index()?,
        })
    }
}

impl KeyedRow for DeclSecurityRaw {
    fn key(&self) -> Token {
        self.parent.token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::tables::MetadataTable;
    use crate::test::tables::{long_info, short_info};

    #[test]
    fn crafted_short() {
        #[rustfmt::skip]
        let data = [
            0x01, 0x01, // action
            0x88, 0x00, // parent
            0x03, 0x01, // permission_set
        ];

        let info = short_info();
        assert_eq!(DeclSecurityRaw::row_size(&info) as usize, data.len());
        let mut reader = TableReader::new(&data[..], info);
        let table = MetadataTable::<DeclSecurityRaw>::read(&mut reader, 1).unwrap();

        let row = table.get(1).unwrap();
        assert_eq!(row.rid, 1);
        assert_eq!(row.token.value(), 0x0e000001);
        assert_eq!(row.action, 0x0101);
        assert_eq!(row.parent, CodedIndex::new(TableId::TypeDef, 0x22));
        assert_eq!(row.permission_set, 0x103);
    }

    #[test]
    fn crafted_long() {
        #[rustfmt::skip]
        let data = [
            0x01, 0x01, // action
            0x08, 0x00, 0x04, 0x00, // parent
            0x03, 0x00, 0x02, 0x01, // permission_set
        ];

        let info = long_info();
        assert_eq!(DeclSecurityRaw::row_size(&info) as usize, data.len());
        let mut reader = TableReader::new(&data[..], info);
        let table = MetadataTable::<DeclSecurityRaw>::read(&mut reader, 1).unwrap();

        let row = table.get(1).unwrap();
        assert_eq!(row.rid, 1);
        assert_eq!(row.token.value(), 0x0e000001);
        assert_eq!(row.action, 0x0101);
        assert_eq!(row.parent, CodedIndex::new(TableId::TypeDef, 0x10002));
        assert_eq!(row.permission_set, 0x1020003);
    }
}
