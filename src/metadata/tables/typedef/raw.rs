use std::io::Read;

use crate::{
    metadata::{
        tables::{CodedIndex, CodedIndexType, RowReadable, TableId, TableInfo, TableReader},
        token::Token,
    },
    Result,
};

/// A type defined in this module. `TableId` = 0x02
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDefRaw {
    /// `RowID`, 1-based
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// `TypeAttributes` bitmask
    pub flags: u32,
    /// Simple name of the type
    pub type_name: u32,
    /// Namespace, empty for nested types
    pub type_namespace: u32,
    /// Base type, null for interfaces and `System.Object`
    pub extends: CodedIndex,
    /// First of the contiguous run of fields owned by this type
    pub field_list: u32,
    /// First of the contiguous run of methods owned by this type
    pub method_list: u32,
}

impl RowReadable for TypeDefRaw {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        /* flags */                 4 +
        /* type_name */             info.str_bytes() +
        /* type_namespace */        info.str_bytes() +
        /* extends */               info.coded_index_bytes(CodedIndexType::TypeDefOrRef) +
        /* field_list */            info.table_index_bytes(TableId::Field) +
        /* method_list */           info.table_index_bytes(TableId::MethodDef)
    }

    fn row_read<R: Read>(reader: &mut TableReader<R>, rid: u32) -> Result<Self> {
        Ok(TypeDefRaw {
            rid,
            token: Token::from_parts(TableId::TypeDef, rid),
            flags: reader.read_u32()?,
            type_name: reader.read_string_index()?,
            type_namespace: reader.read_string_index()?,
            extends: reader.read_coded_index(CodedIndexType::TypeDefOrRef)?,
            field_list: reader.read_table_index(TableId::Field)?,
            method_list: reader.read_table_index(TableId::MethodDef)?,
        })
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
            0x01, 0x03, 0x02, 0x01, // flags
            0x02, 0x01, // type_name
            0x03, 0x01, // type_namespace
            0x90, 0x00, // extends
            0x05, 0x01, // field_list
            0x06, 0x01, // method_list
        ];

        let info = short_info();
        assert_eq!(TypeDefRaw::row_size(&info) as usize, data.len());
        let mut reader = TableReader::new(&data[..], info);
        let table = MetadataTable::<TypeDefRaw>::read(&mut reader, 1).unwrap();

        let row = table.get(1).unwrap();
        assert_eq!(row.rid, 1);
        assert_eq!(row.token.value(), 0x02000001);
        assert_eq!(row.flags, 0x01020301);
        assert_eq!(row.type_name, 0x102);
        assert_eq!(row.type_namespace, 0x103);
        assert_eq!(row.extends, CodedIndex::new(TableId::TypeDef, 0x24));
        assert_eq!(row.field_list, 0x105);
        assert_eq!(row.method_list, 0x106);
    }

    #[test]
    fn crafted_long() {
        #[rustfmt::skip]
        let data = [
            0x01, 0x03, 0x02, 0x01, // flags
            0x02, 0x00, 0x02, 0x01, // type_name
            0x03, 0x00, 0x02, 0x01, // type_namespace
            0x10, 0x00, 0x04, 0x00, // extends
            0x05, 0x00, 0x02, 0x01, // field_list
            0x06, 0x00, 0x02, 0x01, // method_list
        ];

        let info = long_info();
        assert_eq!(TypeDefRaw::row_size(&info) as usize, data.len());
        let mut reader = TableReader::new(&data[..], info);
        let table = MetadataTable::<TypeDefRaw>::read(&mut reader, 1).unwrap();

        let row = table.get(1).unwrap();
        assert_eq!(row.rid, 1);
        assert_eq!(row.token.value(), 0x02000001);
        assert_eq!(row.flags, 0x01020301);
        assert_eq!(row.type_name, 0x1020002);
        assert_eq!(row.type_namespace, 0x1020003);
        assert_eq!(row.extends, CodedIndex::new(TableId::TypeDef, 0x10004));
        assert_eq!(row.field_list, 0x1020005);
        assert_eq!(row.method_list, 0x1020006);
    }
}
