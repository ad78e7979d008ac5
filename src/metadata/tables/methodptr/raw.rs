use std::io::Read;

use crate::{
    metadata::{
        tables::{RowReadable, TableId, TableInfo, TableReader},
        token::Token,
    },
    Result,
};

/// Indirection into the `MethodDef` table, present only in unoptimized streams. `TableId` = 0x05
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodPtrRaw {
    /// `RowID`, 1-based
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// The method this slot stands for
    pub method: u32,
}

impl RowReadable for MethodPtrRaw {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        /* method */                info.table_index_bytes(TableId::MethodDef)
    }

    fn row_read<R: Read>(reader: &mut TableReader<R>, rid: u32) -> Result<Self> {
        Ok(MethodPtrRaw {
            rid,
            token: Token::from_parts(TableId::MethodPtr, rid),
            method: reader.read_table_index(TableId::MethodDef)?,
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
            0x01, 0x01, // method
        ];

        let info = short_info();
        assert_eq!(MethodPtrRaw::row_size(&info) as usize, data.len());
        let mut reader = TableReader::new(&data[..], info);
        let table = MetadataTable::<MethodPtrRaw>::read(&mut reader, 1).unwrap();

        let row = table.get(1).unwrap();
        assert_eq!(row.rid, 1);
        assert_eq!(row.token.value(), 0x05000001);
        assert_eq!(row.method, 0x101);
    }

    #[test]
    fn crafted_long() {
        #[rustfmt::skip]
        let data = [
            0x01, 0x00, 0x02, 0x01, // method
        ];

        let info = long_info();
        assert_eq!(MethodPtrRaw::row_size(&info) as usize, data.len());
        let mut reader = TableReader::new(&data[..], info);
        let table = MetadataTable::<MethodPtrRaw>::read(&mut reader, 1).unwrap();

        let row = table.get(1).unwrap();
        assert_eq!(row.rid, 1);
        assert_eq!(row.token.value(), 0x05000001);
        assert_eq!(row.method, 0x1020001);
    }
}
