//! Typed row arrays and the two query patterns over them.
//!
//! A [`MetadataTable`] is the fully decoded content of one table: a `Vec` of rows in RID order.
//! Besides direct RID access it answers:
//!
//! - **Ownership ranges** ([`MetadataTable::find_owner`], [`MetadataTable::owned_range`]): a
//!   parent row stores only the first RID of its children. The children of parent `i` run up to
//!   the start of parent `i + 1`, the last parent's run ends at the end of the child table. Two
//!   consecutive parents with equal starts mean the first one owns nothing.
//! - **Filter by key** ([`KeyedRow`]): tables that are logically keyed by an owner token but not
//!   guaranteed to be sorted. [`MetadataTable::find_all`] is a linear scan,
//!   [`MetadataTable::find_all_indexed`] answers from a token map built on first use. Both
//!   enumerate matches in RID order.

use std::{collections::HashMap, io::Read, ops::Range, sync::OnceLock};

use crate::{
    metadata::{
        tables::types::{RowReadable, TableReader},
        token::Token,
    },
    Result,
};

/// Rows of a table that are logically indexed by an owner token.
pub trait KeyedRow {
    /// The owner token this row is filed under.
    fn key(&self) -> Token;
}

/// All rows of one metadata table, in RID order.
pub struct MetadataTable<T> {
    rows: Vec<T>,
    key_index: OnceLock<HashMap<Token, Vec<u32>>>,
}

impl<T> MetadataTable<T> {
    /// A table without rows.
    #[must_use]
    pub fn empty() -> Self {
        MetadataTable {
            rows: Vec::new(),
            key_index: OnceLock::new(),
        }
    }

    /// Wraps already decoded rows.
    #[must_use]
    pub fn from_rows(rows: Vec<T>) -> Self {
        MetadataTable {
            rows,
            key_index: OnceLock::new(),
        }
    }

    /// Number of rows.
    #[must_use]
    pub fn row_count(&self) -> u32 {
        self.rows.len() as u32
    }

    /// `true` if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The row with 1-based `rid`, `None` for 0 or past the end.
    #[must_use]
    pub fn get(&self, rid: u32) -> Option<&T> {
        if rid == 0 {
            return None;
        }
        self.rows.get(rid as usize - 1)
    }

    /// All rows as a slice, index `rid - 1`.
    #[must_use]
    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    /// Iterates all rows in RID order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.rows.iter()
    }

    /// Finds the parent row that owns child `child`, given each parent's start column.
    ///
    /// Returns the owner's RID, or `None` if `child` precedes the first parent's run. Parents
    /// whose run is empty are skipped: the owner is the *last* parent whose start is at or
    /// before `child`.
    pub fn find_owner<F>(&self, child: u32, start_of: F) -> Option<u32>
    where
        F: Fn(&T) -> u32,
    {
        let position = self.rows.partition_point(|row| start_of(row) <= child);
        if position == 0 {
            None
        } else {
            Some(position as u32)
        }
    }

    /// The half-open range of child RIDs owned by parent `owner_rid`.
    ///
    /// `child_count` is the row count of the child table; the last parent's run extends to
    /// `child_count + 1`. Start columns pointing past the child table are clamped, a start of `0`
    /// yields an empty range.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the start column decreases between `owner_rid`
    /// and either neighbour, since the runs would then overlap.
    pub fn owned_range<F>(
        &self,
        owner_rid: u32,
        child_count: u32,
        start_of: F,
    ) -> Result<Range<u32>>
    where
        F: Fn(&T) -> u32,
    {
        let limit = child_count + 1;
        let Some(owner) = self.get(owner_rid) else {
            return Ok(0..0);
        };

        let start = start_of(owner);
        if start == 0 {
            return Ok(0..0);
        }

        if let Some(previous) = self.get(owner_rid - 1) {
            let previous_start = start_of(previous);
            if previous_start > start {
                return Err(malformed_error!(
                    "Row {} starts its child run at {}, before row {} at {}",
                    owner_rid,
                    start,
                    owner_rid - 1,
                    previous_start
                ));
            }
        }

        let end = match self.get(owner_rid + 1) {
            Some(next) => {
                let next_start = start_of(next);
                if next_start < start {
                    return Err(malformed_error!(
                        "Row {} starts its child run at {}, before row {} at {}",
                        owner_rid + 1,
                        next_start,
                        owner_rid,
                        start
                    ));
                }
                next_start.min(limit)
            }
            None => limit,
        };

        Ok(start.min(limit)..end)
    }
}

impl<T: RowReadable> MetadataTable<T> {
    /// Reads `count` consecutive rows from `reader`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the stream ends early.
    pub fn read<R: Read>(reader: &mut TableReader<R>, count: u32) -> Result<Self> {
        let mut rows = Vec::with_capacity(count as usize);
        for rid in 1..=count {
            rows.push(T::row_read(reader, rid)?);
        }

        Ok(MetadataTable::from_rows(rows))
    }
}

impl<T: KeyedRow> MetadataTable<T> {
    /// RIDs of all rows keyed by `key`, by linear scan in RID order.
    pub fn find_all(&self, key: Token) -> impl Iterator<Item = u32> + '_ {
        self.rows
            .iter()
            .enumerate()
            .filter(move |(_, row)| row.key() == key)
            .map(|(index, _)| index as u32 + 1)
    }

    /// RIDs of all rows keyed by `key`, answered from a map built on first use.
    ///
    /// Yields the same RIDs in the same order as [`MetadataTable::find_all`].
    pub fn find_all_indexed(&self, key: Token) -> &[u32] {
        let index = self.key_index.get_or_init(|| {
            let mut map: HashMap<Token, Vec<u32>> = HashMap::new();
            for (position, row) in self.rows.iter().enumerate() {
                map.entry(row.key()).or_default().push(position as u32 + 1);
            }
            map
        });

        index.get(&key).map_or(&[], Vec::as_slice)
    }

    /// The first row keyed by `key`.
    pub fn find_first(&self, key: Token) -> Option<&T> {
        self.rows.iter().find(|row| row.key() == key)
    }
}

impl<'a, T> IntoIterator for &'a MetadataTable<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl<T> Default for MetadataTable<T> {
    fn default() -> Self {
        MetadataTable::empty()
    }
}

impl<T> std::fmt::Debug for MetadataTable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataTable")
            .field("rows", &self.rows.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    struct Parent {
        start: u32,
    }

    struct Keyed {
        owner: Token,
    }

    impl KeyedRow for Keyed {
        fn key(&self) -> Token {
            self.owner
        }
    }

    fn parents(starts: &[u32]) -> MetadataTable<Parent> {
        MetadataTable::from_rows(starts.iter().map(|&start| Parent { start }).collect())
    }

    #[test]
    fn owner_skips_empty_runs() {
        // parent 1 owns nothing, parent 2 owns 1..3, parent 3 owns 3..=5
        let table = parents(&[1, 1, 3]);

        assert_eq!(table.find_owner(1, |p| p.start), Some(2));
        assert_eq!(table.find_owner(2, |p| p.start), Some(2));
        assert_eq!(table.find_owner(3, |p| p.start), Some(3));
        assert_eq!(table.find_owner(5, |p| p.start), Some(3));

        assert_eq!(table.owned_range(1, 5, |p| p.start).unwrap(), 1..1);
        assert_eq!(table.owned_range(2, 5, |p| p.start).unwrap(), 1..3);
        assert_eq!(table.owned_range(3, 5, |p| p.start).unwrap(), 3..6);
        assert_eq!(table.owned_range(4, 5, |p| p.start).unwrap(), 0..0);
    }

    #[test]
    fn owner_before_first_run() {
        let table = parents(&[3, 4]);
        assert_eq!(table.find_owner(2, |p| p.start), None);
        assert_eq!(table.find_owner(3, |p| p.start), Some(1));
    }

    #[test]
    fn owned_range_clamps_past_the_child_table() {
        let table = parents(&[2, 9]);
        assert_eq!(table.owned_range(1, 4, |p| p.start).unwrap(), 2..5);
        assert_eq!(table.owned_range(2, 4, |p| p.start).unwrap(), 5..5);
    }

    #[test]
    fn owned_range_rejects_decreasing_starts() {
        let table = parents(&[2, 9, 1]);
        assert_eq!(table.owned_range(1, 4, |p| p.start).unwrap(), 2..5);
        assert!(matches!(
            table.owned_range(2, 4, |p| p.start),
            Err(Error::Malformed { .. })
        ));
        assert!(matches!(
            table.owned_range(3, 4, |p| p.start),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn last_owner_extends_to_end() {
        let table = parents(&[1]);
        assert_eq!(table.owned_range(1, 0, |p| p.start).unwrap(), 1..1);
        assert_eq!(table.owned_range(1, 7, |p| p.start).unwrap(), 1..8);
    }

    #[test]
    fn keyed_lookup_orders_match() {
        let a = Token::new(0x0200_0001);
        let b = Token::new(0x0600_0002);
        let table = MetadataTable::from_rows(vec![
            Keyed { owner: b },
            Keyed { owner: a },
            Keyed { owner: b },
            Keyed { owner: a },
            Keyed { owner: a },
        ]);

        let scanned: Vec<u32> = table.find_all(a).collect();
        assert_eq!(scanned, vec![2, 4, 5]);
        assert_eq!(table.find_all_indexed(a), scanned.as_slice());
        assert_eq!(table.find_all_indexed(b), &[1, 3]);
        assert!(table.find_all_indexed(Token::new(0x0400_0001)).is_empty());
        assert_eq!(table.find_first(b).unwrap().owner, b);
    }

    #[test]
    fn rid_access() {
        let table = parents(&[5, 6]);
        assert!(table.get(0).is_none());
        assert_eq!(table.get(2).unwrap().start, 6);
        assert!(table.get(3).is_none());
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.iter().count(), 2);
    }
}
