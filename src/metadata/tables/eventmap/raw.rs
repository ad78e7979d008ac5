use std::io::Read;

use crate::{
    metadata::{
        tables::{KeyedRow, RowReadable, TableId, TableInfo, TableReader},
        token::Token,
    },
    Result,
};

/// Links a type to the run of events it owns. `TableId` = 0x12
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventMapRaw {
    /// `RowID`, 1-based
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// The owning type
    pub parent: u32,
    /// First of the contiguous run of events owned by `parent`
    pub event_list: u32,
}

impl RowReadable for EventMapRaw {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        /* parent */                info.table_index_bytes(TableId::TypeDef) +
        /* event_list */            info.table_index_bytes(TableId::Event)
    }

    fn row_read<R: Read>(reader: &mut TableReader<R>, rid: u32) -> Result<Self> {
        Ok(EventMapRaw {
            rid,
            token: Token::from_parts(TableId::EventMap, rid),
            parent: reader.read_table_index(TableId::TypeDef)?,
            event_list: reader.read_table_index(TableId::Event)?,
        })
    }
}

impl KeyedRow for EventMapRaw {
    fn key(&self) -> Token {
        Token::from_parts(TableId::TypeDef, self.parent)
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
            0x01, 0x01, // parent
            0x02, 0x01, // event_list
        ];

        let info = short_info();
        assert_eq!(EventMapRaw::row_size(&info) as usize, data.len());
        let mut reader = TableReader::new(&data[..], info);
        let table = MetadataTable::<EventMapRaw>::read(&mut reader, 1).unwrap();

        let row = table.get(1).unwrap();
        assert_eq!(row.rid, 1);
        assert_eq!(row.token.value(), 0x12000001);
        assert_eq!(row.parent, 0x101);
        assert_eq!(row.event_list, 0x102);
    }

    #[test]
    fn crafted_long() {
        #[rustfmt::skip]
        let data = [
            0x01, 0x00, 0x02, 0x01, // parent
            0x02, 0x00, 0x02, 0x01, // event_list
        ];

        let info = long_info();
        assert_eq!(EventMapRaw::row_size(&info) as usize, data.len());
        let mut reader = TableReader::new(&data[..], info);
        let table = MetadataTable::<EventMapRaw>::read(&mut reader, 1).unwrap();

        let row = table.get(1).unwrap();
        assert_eq!(row.rid, 1);
        assert_eq!(row.token.value(), 0x12000001);
        assert_eq!(row.parent, 0x1020001);
        assert_eq!(row.event_list, 0x1020002);
    }
}
