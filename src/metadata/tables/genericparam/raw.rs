use std::io::Read;

use crate::{
    metadata::{
        tables::{
            CodedIndex, CodedIndexType, MetadataTable, RowReadable, TableId, TableInfo, TableReader,
        },
        token::Token,
    },
    Result,
};

/// A generic parameter of a type or method. `TableId` = 0x2a
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenericParamRaw {
    /// `RowID`, 1-based
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// Position of the parameter, 0-based
    pub number: u16,
    /// `GenericParamAttributes` bitmask
    pub flags: u16,
    /// The generic type or method
    pub owner: CodedIndex,
    /// Parameter name
    pub name: u32,
}

impl RowReadable for GenericParamRaw {
    #[rustfmt::skip]
    fn row_size(info: &TableInfo) -> u32 {
        /* number */                2 +
        /* flags */                 2 +
        /* owner */                 info.coded_index_bytes(CodedIndexType::TypeOrMethodDef) +
        /* name */                  info.str_bytes()
    }

    fn row_read<R: Read>(reader: &mut TableReader<R>, rid: u32) -> Result<Self> {
        Ok(GenericParamRaw {
            rid,
            token: Token::from_parts(TableId::GenericParam, rid),
            number: reader.read_u16()?,
            flags: reader.read_u16()?,
            owner: reader.read_coded_index(CodedIndexType::TypeOrMethodDef)?,
            name: reader.read_string_index()?,
        })
    }
}

impl GenericParamRaw {
    /// The sort key of the table: the raw `TypeOrMethodDef` value of `owner`.
    #[must_use]
    pub fn owner_sort_key(&self) -> u64 {
        Self::sort_key(self.owner)
    }

    fn sort_key(owner: CodedIndex) -> u64 {
        let tag = match owner.tag {
            TableId::MethodDef => 1,
            _ => 0,
        };
        (u64::from(owner.row) << 1) | tag
    }
}

impl MetadataTable<GenericParamRaw> {
    /// RID of the first parameter owned by `owner`, by binary search over the sorted table.
    #[must_use]
    pub fn find_first_by_owner(&self, owner: Token) -> Option<u32> {
        let table = owner.table_id()?;
        if !matches!(table, TableId::TypeDef | TableId::MethodDef) || owner.is_null() {
            return None;
        }

        let key = GenericParamRaw::sort_key(CodedIndex::new(table, owner.row()));
        let rows = self.rows();
        let position = rows.partition_point(|row| row.owner_sort_key() < key);

        match rows.get(position) {
            Some(row) if row.owner.token == owner => Some(position as u32 + 1),
            _ => None,
        }
    }

    /// All parameters owned by `owner` in `number` order.
    ///
    /// Starts at [`Self::find_first_by_owner`] and stops at the first row with another owner.
    pub fn by_owner(&self, owner: Token) -> impl Iterator<Item = &GenericParamRaw> + '_ {
        let skip = self
            .find_first_by_owner(owner)
            .map_or(self.row_count() as usize, |rid| rid as usize - 1);

        self.iter()
            .skip(skip)
            .take_while(move |row| row.owner.token == owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::tables::{long_info, short_info};

    #[test]
    fn crafted_short() {
        #[rustfmt::skip]
        let data = [
            0x01, 0x01, // number
            0x02, 0x01, // flags
            0x46, 0x00, // owner
            0x04, 0x01, // name
        ];

        let info = short_info();
        assert_eq!(GenericParamRaw::row_size(&info) as usize, data.len());
        let mut reader = TableReader::new(&data[..], info);
        let table = MetadataTable::<GenericParamRaw>::read(&mut reader, 1).unwrap();

        let row = table.get(1).unwrap();
        assert_eq!(row.rid, 1);
        assert_eq!(row.token.value(), 0x2a000001);
        assert_eq!(row.number, 0x0101);
        assert_eq!(row.flags, 0x0102);
        assert_eq!(row.owner, CodedIndex::new(TableId::TypeDef, 0x23));
        assert_eq!(row.name, 0x104);
    }

    #[test]
    fn crafted_long() {
        #[rustfmt::skip]
        let data = [
            0x01, 0x01, // number
            0x02, 0x01, // flags
            0x06, 0x00, 0x02, 0x00, // owner
            0x04, 0x00, 0x02, 0x01, // name
        ];

        let info = long_info();
        assert_eq!(GenericParamRaw::row_size(&info) as usize, data.len());
        let mut reader = TableReader::new(&data[..], info);
        let table = MetadataTable::<GenericParamRaw>::read(&mut reader, 1).unwrap();

        let row = table.get(1).unwrap();
        assert_eq!(row.rid, 1);
        assert_eq!(row.token.value(), 0x2a000001);
        assert_eq!(row.number, 0x0101);
        assert_eq!(row.flags, 0x0102);
        assert_eq!(row.owner, CodedIndex::new(TableId::TypeDef, 0x10003));
        assert_eq!(row.name, 0x1020004);
    }

    #[test]
    fn owner_scan_stops_at_next_owner() {
        let row = |rid: u32, number: u16, owner: CodedIndex| GenericParamRaw {
            rid,
            token: Token::from_parts(TableId::GenericParam, rid),
            number,
            flags: 0,
            owner,
            name: 0,
        };

        // sorted by raw coded value: TypeDef 1 (2), MethodDef 1 (3), TypeDef 2 (4), MethodDef 3 (7)
        let table = MetadataTable::from_rows(vec![
            row(1, 0, CodedIndex::new(TableId::TypeDef, 1)),
            row(2, 1, CodedIndex::new(TableId::TypeDef, 1)),
            row(3, 0, CodedIndex::new(TableId::MethodDef, 1)),
            row(4, 0, CodedIndex::new(TableId::TypeDef, 2)),
            row(5, 1, CodedIndex::new(TableId::TypeDef, 2)),
            row(6, 2, CodedIndex::new(TableId::TypeDef, 2)),
            row(7, 0, CodedIndex::new(TableId::MethodDef, 3)),
        ]);

        let type2 = Token::from_parts(TableId::TypeDef, 2);
        assert_eq!(table.find_first_by_owner(type2), Some(4));
        let numbers: Vec<u16> = table.by_owner(type2).map(|p| p.number).collect();
        assert_eq!(numbers, vec![0, 1, 2]);

        let method1 = Token::from_parts(TableId::MethodDef, 1);
        let rids: Vec<u32> = table.by_owner(method1).map(|p| p.rid).collect();
        assert_eq!(rids, vec![3]);

        let type1 = Token::from_parts(TableId::TypeDef, 1);
        assert_eq!(table.by_owner(type1).count(), 2);

        let missing = Token::from_parts(TableId::MethodDef, 2);
        assert_eq!(table.find_first_by_owner(missing), None);
        assert_eq!(table.by_owner(missing).count(), 0);
        assert_eq!(table.find_first_by_owner(Token::from_parts(TableId::Field, 1)), None);
    }
}
