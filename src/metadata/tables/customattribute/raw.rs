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

/// A custom attribute applied to a metadata entity. `TableId` = 0x0c
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CustomAttributeRaw {
    /// `RowID`, 1-based
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// The entity the attribute is applied to
    pub parent: CodedIndex,
    /// Constructor of the attribute type
    pub constructor: CodedIndex,
    /// Encoded constructor arguments and named arguments
    pub value: u32,
}

impl RowReadable for CustomAttributeRaw {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        /* parent */                info.coded_index_bytes(CodedIndexType::HasCustomAttribute) +
        /* constructor */           info.coded_index_bytes(CodedIndexType::CustomAttributeType) +
        /* value */                 info.blob_bytes()
    }

    fn row_read<R: Read>(reader: &mut TableReader<R>, rid: u32) -> Result<Self> {
        Ok(CustomAttributeRaw {
            rid,
            token: Token::from_parts(TableId::CustomAttribute, rid),
            parent: reader.read_coded_index(CodedIndexType::HasCustomAttribute)?,
            constructor: reader.read_coded_index(CodedIndexType::CustomAttributeType)?,
            value: reader.read_blob_index()?,
        })
    }
}

impl KeyedRow for CustomAttributeRaw {
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
            0x20, 0x04, // parent
            0x12, 0x01, // constructor
            0x03, 0x01, // value
        ];

        let info = short_info();
        assert_eq!(CustomAttributeRaw::row_size(&info) as usize, data.len());
        let mut reader = TableReader::new(&data[..], info);
        let table = MetadataTable::<CustomAttributeRaw>::read(&mut reader, 1).unwrap();

        let row = table.get(1).unwrap();
        assert_eq!(row.rid, 1);
        assert_eq!(row.token.value(), 0x0c000001);
        assert_eq!(row.parent, CodedIndex::new(TableId::MethodDef, 0x21));
        assert_eq!(row.constructor, CodedIndex::new(TableId::MethodDef, 0x22));
        assert_eq!(row.value, 0x103);
    }

    #[test]
    fn crafted_long() {
        #[rustfmt::skip]
        let data = [
            0x20, 0x00, 0x20, 0x00, // parent
            0x12, 0x00, 0x08, 0x00, // constructor
            0x03, 0x00, 0x02, 0x01, // value
        ];

        let info = long_info();
        assert_eq!(CustomAttributeRaw::row_size(&info) as usize, data.len());
        let mut reader = TableReader::new(&data[..], info);
        let table = MetadataTable::<CustomAttributeRaw>::read(&mut reader, 1).unwrap();

        let row = table.get(1).unwrap();
        assert_eq!(row.rid, 1);
        assert_eq!(row.token.value(), 0x0c000001);
        assert_eq!(row.parent, CodedIndex::new(TableId::MethodDef, 0x10001));
        assert_eq!(row.constructor, CodedIndex::new(TableId::MethodDef, 0x10002));
        assert_eq!(row.value, 0x1020003);
    }
}
