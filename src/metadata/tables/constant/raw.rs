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

/// Compile-time constant value of a field, parameter, or property. `TableId` = 0x0b
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstantRaw {
    /// `RowID`, 1-based
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// `ELEMENT_TYPE_*` of the value
    pub base: u8,
    /// Always zero
    pub padding: u8,
    /// Owner of the constant
    pub parent: CodedIndex,
    /// Little-endian encoded value
    pub value: u32,
}

impl RowReadable for ConstantRaw {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        /* base */                  1 +
        /* padding */               1 +
        /* parent */                info.coded_index_bytes(CodedIndexType::HasConstant) +
        /* value */                 info.blob_bytes()
    }

    fn row_read<R: Read>(reader: &mut TableReader<R>, rid: u32) -> Result<Self> {
        Ok(ConstantRaw {
            rid,
            token: Token::from_parts(TableId::Constant, rid),
            base: reader.read_u8()?,
            padding: reader.read_u8()?,
            parent: reader.read_coded_index(CodedIndexType::HasConstant)?,
            value: reader.read_blob_index()?,
        })
    }
}

impl KeyedRow for ConstantRaw {
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
            0x11, // base
            0x12, // padding
            0x8C, 0x00, // parent
            0x04, 0x01, // value
        ];

        let info = short_info();
        assert_eq!(ConstantRaw::row_size(&info) as usize, data.len());
        let mut reader = TableReader::new(&data[..], info);
        let table = MetadataTable::<ConstantRaw>::read(&mut reader, 1).unwrap();

        let row = table.get(1).unwrap();
        assert_eq!(row.rid, 1);
        assert_eq!(row.token.value(), 0x0b000001);
        assert_eq!(row.base, 0x11);
        assert_eq!(row.padding, 0x12);
        assert_eq!(row.parent, CodedIndex::new(TableId::Field, 0x23));
        assert_eq!(row.value, 0x104);
    }

    #[test]
    fn crafted_long() {
        #[rustfmt::skip]
        let data = [
            0x11, // base
            0x12, // padding
            0x0C, 0x00, 0x04, 0x00, // parent
            0x04, 0x00, 0x02, 0x01, // value
        ];

        let info = long_info();
        assert_eq!(ConstantRaw::row_size(&info) as usize, data.len());
        let mut reader = TableReader::new(&data[..], info);
        let table = MetadataTable::<ConstantRaw>::read(&mut reader, 1).unwrap();

        let row = table.get(1).unwrap();
        assert_eq!(row.rid, 1);
        assert_eq!(row.token.value(), 0x0b000001);
        assert_eq!(row.base, 0x11);
        assert_eq!(row.padding, 0x12);
        assert_eq!(row.parent, CodedIndex::new(TableId::Field, 0x10003));
        assert_eq!(row.value, 0x1020004);
    }
}
