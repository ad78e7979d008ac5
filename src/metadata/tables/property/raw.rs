use std::io::Read;

use crate::{
    metadata::{
        tables::{RowReadable, TableId, TableInfo, TableReader},
        token::Token,
    },
    Result,
};

/// A property defined on a type. `TableId` = 0x17
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyRaw {
    /// `RowID`, 1-based
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// `PropertyAttributes` bitmask
    pub flags: u16,
    /// Property name
    pub name: u32,
    /// `PropertySig` blob
    pub signature: u32,
}

impl RowReadable for PropertyRaw {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        /* flags */                 2 +
        /* name */                  info.str_bytes() +
        /* signature */             info.blob_bytes()
    }

    fn row_read<R: Read>(reader: &mut TableReader<R>, rid: u32) -> Result<Self> {
        Ok(PropertyRaw {
            rid,
            token: Token::from_parts(TableId::Property, rid),
            flags: reader.read_u16()?,
            name: reader.read_string_index()?,
            signature: reader.read_blob_index()?,
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
            0x01, 0x01, // flags
            0x02, 0x01, // name
            0x03, 0x01, // signature
        ];

        let info = short_info();
        assert_eq!(PropertyRaw::row_size(&info) as usize, data.len());
        let mut reader = TableReader::new(&data[..], info);
        let table = MetadataTable::<PropertyRaw>::read(&mut reader, 1).unwrap();

        let row = table.get(1).unwrap();
        assert_eq!(row.rid, 1);
        assert_eq!(row.token.value(), 0x17000001);
        assert_eq!(row.flags, 0x0101);
        assert_eq!(row.name, 0x102);
        assert_eq!(row.signature, 0x103);
    }

    #[test]
    fn crafted_long() {
        #[rustfmt::skip]
        let data = [
            0x01, 0x01, // flags
            0x02, 0x00, 0x02, 0x01, // name
            0x03, 0x00, 0x02, 0x01, // signature
        ];

        let info = long_info();
        assert_eq!(PropertyRaw::row_size(&info) as usize, data.len());
        let mut reader = TableReader::new(&data[..], info);
        let table = MetadataTable::<PropertyRaw>::read(&mut reader, 1).unwrap();

        let row = table.get(1).unwrap();
        assert_eq!(row.rid, 1);
        assert_eq!(row.token.value(), 0x17000001);
        assert_eq!(row.flags, 0x0101);
        assert_eq!(row.name, 0x1020002);
        assert_eq!(row.signature, 0x1020003);
    }
}
