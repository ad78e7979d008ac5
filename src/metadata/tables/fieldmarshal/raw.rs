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

/// Marshalling descriptor of a field or parameter. `TableId` = 0x0d
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldMarshalRaw {
    /// `RowID`, 1-based
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// Owner of the descriptor
    pub parent: CodedIndex,
    /// `MarshalSpec` blob
    pub native_type: u32,
}

impl RowReadable for FieldMarshalRaw {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        /* parent */                info.coded_index_bytes(CodedIndexType::HasFieldMarshal) +
        /* native_type */           info.blob_bytes()
    }

    fn row_read<R: Read>(reader: &mut TableReader<R>, rid: u32) -> Result<Self> {
        Ok(FieldMarshalRaw {
            rid,
            token: Token::from_parts(TableId::FieldMarshal, rid),
            parent: reader.read_coded_index(CodedIndexType::HasFieldMarshal)?,
            native_type: reader.read_blob_index()?,
        })
    }
}

impl KeyedRow for FieldMarshalRaw {
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
            0x42, 0x00, // parent
            0x02, 0x01, // native_type
        ];

        let info = short_info();
        assert_eq!(FieldMarshalRaw::row_size(&info) as usize, data.len());
        let mut reader = TableReader::new(&data[..], info);
        let table = MetadataTable::<FieldMarshalRaw>::read(&mut reader, 1).unwrap();

        let row = table.get(1).unwrap();
        assert_eq!(row.rid, 1);
        assert_eq!(row.token.value(), 0x0d000001);
        assert_eq!(row.parent, CodedIndex::new(TableId::Field, 0x21));
        assert_eq!(row.native_type, 0x102);
    }

    #[test]
    fn crafted_long() {
        #[rustfmt::skip]
        let data = [
            0x02, 0x00, 0x02, 0x00, // parent
            0x02, 0x00, 0x02, 0x01, // native_type
        ];

        let info = long_info();
        assert_eq!(FieldMarshalRaw::row_size(&info) as usize, data.len());
        let mut reader = TableReader::new(&data[..], info);
        let table = MetadataTable::<FieldMarshalRaw>::read(&mut reader, 1).unwrap();

        let row = table.get(1).unwrap();
        assert_eq!(row.rid, 1);
        assert_eq!(row.token.value(), 0x0d000001);
        assert_eq!(row.parent, CodedIndex::new(TableId::Field, 0x10001));
        assert_eq!(row.native_type, 0x1020002);
    }
}
