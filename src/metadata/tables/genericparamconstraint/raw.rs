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

/// A constraint on a generic parameter. `TableId` = 0x2c
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenericParamConstraintRaw {
    /// `RowID`, 1-based
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// The constrained parameter
    pub owner: u32,
    /// The type the parameter is constrained to
    pub constraint: CodedIndex,
}

impl RowReadable for GenericParamConstraintRaw {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        /* owner */                 info.table_index_bytes(TableId::GenericParam) +
        /* constraint */            info.coded_index_bytes(CodedIndexType::TypeDefOrRef)
    }

    fn row_read<R: Read>(reader: &mut TableReader<R>, rid: u32) -> Result<Self> {
        Ok(GenericParamConstraintRaw {
            rid,
            token: Token::from_parts(TableId::GenericParamConstraint, rid),
            owner: reader.read_table_index(TableId::GenericParam)?,
            constraint: reader.read_coded_index(CodedIndexType::TypeDefOrRef)?,
        })
    }
}

impl KeyedRow for GenericParamConstraintRaw {
    fn key(&self) -> Token {
        Token::from_parts(TableId::GenericParam, self.owner)
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
            0x01, 0x01, // owner
            0x88, 0x00, // constraint
        ];

        let info = short_info();
        assert_eq!(GenericParamConstraintRaw::row_size(&info) as usize, data.len());
        let mut reader = TableReader::new(&data[..], info);
        let table = MetadataTable::<GenericParamConstraintRaw>::read(&mut reader, 1).unwrap();

        let row = table.get(1).unwrap();
        assert_eq!(row.rid, 1);
        assert_eq!(row.token.value(), 0x2c000001);
        assert_eq!(row.owner, 0x101);
        assert_eq!(row.constraint, CodedIndex::new(TableId::TypeDef, 0x22));
    }

    #[test]
    fn crafted_long() {
        #[rustfmt::skip]
        let data = [
            0x01, 0x00, 0x02, 0x01, // owner
            0x08, 0x00, 0x04, 0x00, // constraint
        ];

        let info = long_info();
        assert_eq!(GenericParamConstraintRaw::row_size(&info) as usize, data.len());
        let mut reader = TableReader::new(&data[..], info);
        let table = MetadataTable::<GenericParamConstraintRaw>::read(&mut reader, 1).unwrap();

        let row = table.get(1).unwrap();
        assert_eq!(row.rid, 1);
        assert_eq!(row.token.value(), 0x2c000001);
        assert_eq!(row.owner, 0x1020001);
        assert_eq!(row.constraint, CodedIndex::new(TableId::TypeDef, 0x10002));
    }
}
