//! Memoization of constructed entities.
//!
//! Entity equality is identity, so each row must map to exactly one published instance for
//! the lifetime of its module. [`RowCache`] holds one slot per row of a table and
//! [`KeyedCache`] covers lookups keyed by anything else.
//!
//! Both publish first-write-wins: a factory may run more than once when two threads race on
//! the same empty slot, but only one result is stored and every caller receives that one.

use std::{
    hash::Hash,
    sync::{Arc, OnceLock},
};

use dashmap::DashMap;

use crate::{
    metadata::{
        members::{
            EventDefinition, Field, FieldDefinition, Method, MethodDefinition, ParameterDefinition,
            PropertyDefinition,
        },
        tables::{MetadataTables, TableId},
        typesystem::TypeRc,
    },
    Result,
};

/// One lazily filled slot per 1-based row of a table.
pub struct RowCache<T> {
    len: u32,
    slots: OnceLock<Box<[OnceLock<T>]>>,
}

impl<T: Clone> RowCache<T> {
    /// A cache for a table with `len` rows. Nothing is allocated until first use.
    #[must_use]
    pub fn new(len: u32) -> Self {
        RowCache {
            len,
            slots: OnceLock::new(),
        }
    }

    fn slot(&self, rid: u32) -> Result<&OnceLock<T>> {
        if rid == 0 || rid > self.len {
            return Err(malformed_error!(
                "Row {} is outside of the table ({} rows)",
                rid,
                self.len
            ));
        }

        let slots = self
            .slots
            .get_or_init(|| (0..self.len).map(|_| OnceLock::new()).collect());
        Ok(&slots[rid as usize - 1])
    }

    /// The cached value of `rid`, if any.
    pub fn get(&self, rid: u32) -> Option<T> {
        self.slots
            .get()
            .and_then(|slots| slots.get((rid as usize).checked_sub(1)?))
            .and_then(OnceLock::get)
            .cloned()
    }

    /// The cached value of `rid`, constructing it with `factory` on a miss.
    ///
    /// A failing factory publishes nothing, so a later call retries.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for a RID outside the table, or the factory's error.
    pub fn get_or_try_init<F>(&self, rid: u32, factory: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let slot = self.slot(rid)?;
        if let Some(value) = slot.get() {
            return Ok(value.clone());
        }

        tracing::trace!(rid, "row cache miss");
        let value = factory()?;
        Ok(slot.get_or_init(|| value).clone())
    }

    /// Number of rows covered.
    #[must_use]
    pub fn len(&self) -> u32 {
        self.len
    }

    /// `true` for an empty table.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// A first-write-wins map.
pub struct KeyedCache<K: Eq + Hash, V> {
    map: DashMap<K, V>,
}

impl<K: Eq + Hash, V: Clone> KeyedCache<K, V> {
    /// An empty cache.
    #[must_use]
    pub fn new() -> Self {
        KeyedCache {
            map: DashMap::new(),
        }
    }

    /// The cached value for `key`, if any.
    pub fn get(&self, key: &K) -> Option<V> {
        self.map.get(key).map(|entry| entry.value().clone())
    }

    /// The cached value for `key`, constructing it with `factory` on a miss.
    ///
    /// The factory runs without holding a shard lock, so it may recurse into the cache.
    ///
    /// # Errors
    /// Returns the factory's error; nothing is published in that case.
    pub fn get_or_try_init<F>(&self, key: K, factory: F) -> Result<V>
    where
        F: FnOnce() -> Result<V>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }

        let value = factory()?;
        Ok(self.map.entry(key).or_insert(value).value().clone())
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl<K: Eq + Hash, V: Clone> Default for KeyedCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// The per-module entity caches, sized from the module's row counts.
pub struct EntityCache {
    /// `TypeRef` resolutions
    pub type_refs: RowCache<TypeRc>,
    /// Context-free `TypeSpec` resolutions
    pub type_specs: RowCache<TypeRc>,
    /// `MethodDef` wrappers
    pub methods: RowCache<Arc<MethodDefinition>>,
    /// `Field` wrappers
    pub fields: RowCache<Arc<FieldDefinition>>,
    /// `Param` wrappers
    pub params: RowCache<Arc<ParameterDefinition>>,
    /// `Property` wrappers
    pub properties: RowCache<Arc<PropertyDefinition>>,
    /// `Event` wrappers
    pub events: RowCache<Arc<EventDefinition>>,
    /// `GenericParam` types
    pub generic_params: RowCache<TypeRc>,
    /// Context-free `MemberRef` resolutions naming methods
    pub member_ref_methods: RowCache<Method>,
    /// Context-free `MemberRef` resolutions naming fields
    pub member_ref_fields: RowCache<Field>,
    /// Context-free `MethodSpec` resolutions
    pub method_specs: RowCache<Method>,
    /// Forwarded types by `ExportedType` row
    pub forwarded: KeyedCache<u32, TypeRc>,
}

impl EntityCache {
    /// Sizes every row cache from `tables`.
    #[must_use]
    pub fn new(tables: &MetadataTables) -> Self {
        let rows = |table| tables.row_count(table);
        EntityCache {
            type_refs: RowCache::new(rows(TableId::TypeRef)),
            type_specs: RowCache::new(rows(TableId::TypeSpec)),
            methods: RowCache::new(rows(TableId::MethodDef)),
            fields: RowCache::new(rows(TableId::Field)),
            params: RowCache::new(rows(TableId::Param)),
            properties: RowCache::new(rows(TableId::Property)),
            events: RowCache::new(rows(TableId::Event)),
            generic_params: RowCache::new(rows(TableId::GenericParam)),
            member_ref_methods: RowCache::new(rows(TableId::MemberRef)),
            member_ref_fields: RowCache::new(rows(TableId::MemberRef)),
            method_specs: RowCache::new(rows(TableId::MethodSpec)),
            forwarded: KeyedCache::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn row_cache_publishes_once() {
        let cache: RowCache<Arc<String>> = RowCache::new(3);
        assert!(cache.get(2).is_none());

        let first = cache
            .get_or_try_init(2, || Ok(Arc::new("a".to_string())))
            .unwrap();
        let second = cache
            .get_or_try_init(2, || Ok(Arc::new("b".to_string())))
            .unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*cache.get(2).unwrap(), "a");
        assert!(cache.get(1).is_none());
    }

    #[test]
    fn row_cache_bounds() {
        let cache: RowCache<u32> = RowCache::new(2);
        assert!(matches!(
            cache.get_or_try_init(0, || Ok(1)),
            Err(Error::Malformed { .. })
        ));
        assert!(matches!(
            cache.get_or_try_init(3, || Ok(1)),
            Err(Error::Malformed { .. })
        ));
        assert!(cache.get(0).is_none());
        assert!(cache.get(7).is_none());
    }

    #[test]
    fn failed_factory_is_retried() {
        let cache: RowCache<u32> = RowCache::new(1);
        assert!(cache.get_or_try_init(1, || Err(Error::Empty)).is_err());
        assert_eq!(cache.get_or_try_init(1, || Ok(5)).unwrap(), 5);
    }

    #[test]
    fn keyed_cache_concurrent_first_write_wins() {
        let cache: Arc<KeyedCache<u32, Arc<usize>>> = Arc::new(KeyedCache::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|thread| {
                let cache = cache.clone();
                let calls = calls.clone();
                std::thread::spawn(move || {
                    cache
                        .get_or_try_init(7, || {
                            calls.fetch_add(1, Ordering::SeqCst);
                            Ok(Arc::new(thread))
                        })
                        .unwrap()
                })
            })
            .collect();

        let results: Vec<Arc<usize>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let published = cache.get(&7).unwrap();
        assert!(results.iter().all(|r| Arc::ptr_eq(r, &published)));
        assert!(calls.load(Ordering::SeqCst) >= 1);
        assert_eq!(cache.len(), 1);
    }
}
