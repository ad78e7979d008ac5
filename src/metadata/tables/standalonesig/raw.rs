use std::io::Read;

use crate::{
    metadata::{
        tables::{RowReadable, TableId, TableInfo, TableReader},
        token::Token,
    },
    Result,
};

/// A signature not attached to any member, used by method bodies. `TableId` = 0x11
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StandAloneSigRaw {
    /// `RowID`, 1-based
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// `LocalVarSig` or `StandAloneMethodSig` blob
    pub signature: u32,
}

impl RowReadable for StandAloneSigRaw {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        /* signature */             info.blob_bytes()
    }

    fn row_read<R: Read>(reader: &mut TableReader<R>, rid: u32) -> Result<Self> {
        Ok(StandAloneSigRaw {
            rid,
            token: Token::from_parts(TableId::StandAloneSig, rid),
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
            0x01, 0x01, // signature
        ];

        let info = short_info();
        assert_eq!(StandAloneSigRaw::row_size(&info) as usize, data.len());
        let mut reader = TableReader::new(&data[..], info);
        let table = MetadataTable::<StandAloneSigRaw>::read(&mut reader, 1).unwrap();

        let row = table.get(1).unwrap();
        assert_eq!(row.rid, 1);
        assert_eq!(row.token.value(), 0x11000001);
        assert_eq!(row.signature, 0x101);
    }

    #[test]
    fn crafted_long() {
        #[rustfmt::skip]
        let data = [
            0x01, 0x00, 0x02, 0x01, // signature
        ];

        let info = long_info();
        assert_eq!(StandAloneSigRaw::row_size(&info) as usize, data.len());
        let mut reader = TableReader::new(&data[..], info);
        let table = MetadataTable::<StandAloneSigRaw>::read(&mut reader, 1).unwrap();

        let row = table.get(1).unwrap();
        assert_eq!(row.rid, 1);
        assert_eq!(row.token.value(), 0x11000001);
        assert_eq!(row.signature, 0x1020001);
    }
}
