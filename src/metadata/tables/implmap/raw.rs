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

/// Platform invoke information of a field or method. `TableId` = 0x1c
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImplMapRaw {
    /// `RowID`, 1-based
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// `PInvokeAttributes` bitmask
    pub mapping_flags: u16,
    /// The imported member
    pub member_forwarded: CodedIndex,
    /// Entry point name in the native library
    pub import_name: u32,
    /// The native library
    pub import_scope: u32,
}

impl RowReadable for ImplMapRaw {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        /* mapping_flags */         2 +
        /* member_forwarded */      info.coded_index_bytes(CodedIndexType::MemberForwarded) +
        /* import_name */           info.str_bytes() +
        /* import_scope */          info.table_index_bytes(TableId::ModuleRef)
    }

    fn row_read<R: Read>(reader: &mut TableReader<R>, rid: u32) -> Result<Self> {
        Ok(ImplMapRaw {
            rid,
            token: Token::from_parts(TableId::ImplMap, rid),
            mapping_flags: reader.read_u16()?,
            member_forwarded: reader.read_coded_index(CodedIndexType::MemberForwarded)?,
            import_name: reader.read_string_index()?,
            import_scope: reader.read_table_index(TableId::ModuleRef)?,
        })
    }
}

impl KeyedRow for ImplMapRaw {
    fn key(&self) -> Token {
        self.member_forwarded.token
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
            0x01, 0x01, // mapping_flags
            0x44, 0x00, // member_forwarded
            0x03, 0x01, // import_name
            0x04, 0x01, // import_scope
        ];

        let info = short_info();
        assert_eq!(ImplMapRaw::row_size(&info) as usize, data.len());
        let mut reader = TableReader::new(&data[..], info);
        let table = MetadataTable::<ImplMapRaw>::read(&mut reader, 1).unwrap();

        let row = table.get(1).unwrap();
        assert_eq!(row.rid, 1);
        assert_eq!(row.token.value(), 0x1c000001);
        assert_eq!(row.mapping_flags, 0x0101);
        assert_eq!(row.member_forwarded, CodedIndex::new(TableId::Field, 0x22));
        assert_eq!(row.import_name, 0x103);
        assert_eq!(row.import_scope, 0x104);
    }

    #[test]
    fn crafted_long() {
        #[rustfmt::skip]
        let data = [
            0x01, 0x01, // mapping_flags
            0x04, 0x00, 0x02, 0x00, // member_forwarded
            0x03, 0x00, 0x02, 0x01, // import_name
            0x04, 0x00, 0x02, 0x01, // import_scope
        ];

        let info = long_info();
        assert_eq!(ImplMapRaw::row_size(&info) as usize, data.len());
        let mut reader = TableReader::new(&data[..], info);
        let table = MetadataTable::<ImplMapRaw>::read(&mut reader, 1).unwrap();

        let row = table.get(1).unwrap();
        assert_eq!(row.rid, 1);
        assert_eq!(row.token.value(), 0x1c000001);
        assert_eq!(row.mapping_flags, 0x0101);
        assert_eq!(row.member_forwarded, CodedIndex::new(TableId::Field, 0x10002));
        assert_eq!(row.import_name, 0x1020003);
        assert_eq!(row.import_scope, 0x1020004);
    }
}
