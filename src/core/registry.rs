//! core::registry
//!
//! Slot tables for every live container instance.
//!
//! # Layout
//!
//! Each kind has its own fixed array of `slot_count` slots, addressed by
//! the numeric suffix of an [`InstanceName`]. All lists share one
//! [`NodePool`], which is what lets `list_splice` move nodes between lists
//! without copying payloads. Every hash table owns a private pool.
//!
//! # Invariants
//!
//! - A slot is either vacant or holds exactly one instance of its kind.
//! - Name and slot checks happen before anything is allocated, so a failed
//!   `create` never leaves a half-built instance behind.
//! - Destroying an instance releases every node it owned.

use thiserror::Error;

use crate::containers::{Bitmap, ContainerError, HashTable, List, NodePool};
use crate::core::types::{InstanceName, Kind, TypeError};

/// Payload stored in lists and hash tables.
pub type Value = i64;

/// Errors from registry lookups and lifecycle transitions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("{0} already exists")]
    AlreadyExists(InstanceName),

    #[error("{0} does not exist")]
    NotFound(InstanceName),

    #[error(transparent)]
    Invalid(#[from] TypeError),

    #[error("failed to create {name}: {source}")]
    Create {
        name: InstanceName,
        #[source]
        source: ContainerError,
    },
}

/// Fixed-size slot array for one kind.
#[derive(Debug)]
struct Slots<T> {
    kind: Kind,
    slots: Vec<Option<T>>,
}

impl<T> Slots<T> {
    fn new(kind: Kind, count: usize) -> Self {
        Self {
            kind,
            slots: (0..count).map(|_| None).collect(),
        }
    }

    fn index(&self, name: &InstanceName) -> Result<usize, RegistryError> {
        if name.kind() != self.kind {
            return Err(TypeError::WrongKind {
                name: name.to_string(),
                expected: self.kind,
            }
            .into());
        }
        Ok(name.check_slot(self.slots.len())?)
    }

    fn vacant(&self, name: &InstanceName) -> Result<usize, RegistryError> {
        let idx = self.index(name)?;
        match self.slots[idx] {
            Some(_) => Err(RegistryError::AlreadyExists(*name)),
            None => Ok(idx),
        }
    }

    fn get(&self, name: &InstanceName) -> Result<&T, RegistryError> {
        let idx = self.index(name)?;
        self.slots[idx]
            .as_ref()
            .ok_or(RegistryError::NotFound(*name))
    }

    fn get_mut(&mut self, name: &InstanceName) -> Result<&mut T, RegistryError> {
        let idx = self.index(name)?;
        self.slots[idx]
            .as_mut()
            .ok_or(RegistryError::NotFound(*name))
    }

    /// Borrows two distinct occupied slots at once.
    fn pair_mut(
        &mut self,
        a: &InstanceName,
        b: &InstanceName,
    ) -> Result<(&mut T, &mut T), RegistryError> {
        let (i, j) = (self.index(a)?, self.index(b)?);
        for (idx, name) in [(i, a), (j, b)] {
            if self.slots[idx].is_none() {
                return Err(RegistryError::NotFound(*name));
            }
        }
        debug_assert_ne!(i, j, "pair_mut needs distinct slots");
        let (low, high) = (i.min(j), i.max(j));
        let (head, tail) = self.slots.split_at_mut(high);
        let x = head.get_mut(low).and_then(Option::as_mut);
        let y = tail.first_mut().and_then(Option::as_mut);
        match (x, y) {
            (Some(x), Some(y)) if i < j => Ok((x, y)),
            (Some(x), Some(y)) => Ok((y, x)),
            _ => Err(RegistryError::NotFound(*a)),
        }
    }

    fn take(&mut self, name: &InstanceName) -> Result<T, RegistryError> {
        let idx = self.index(name)?;
        self.slots[idx].take().ok_or(RegistryError::NotFound(*name))
    }

    fn occupied(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.slots.iter_mut().filter_map(Option::take)
    }
}

/// What a teardown released.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Teardown {
    pub lists: usize,
    pub hashes: usize,
    pub bitmaps: usize,
    pub nodes: usize,
}

impl Teardown {
    /// Total number of instances destroyed.
    pub fn instances(&self) -> usize {
        self.lists + self.hashes + self.bitmaps
    }
}

/// The live instance tables.
#[derive(Debug)]
pub struct Registry {
    slot_count: usize,
    node_limit: Option<usize>,
    list_pool: NodePool<Value>,
    lists: Slots<List<Value>>,
    hashes: Slots<HashTable<Value>>,
    bitmaps: Slots<Bitmap>,
}

impl Registry {
    /// Creates an empty registry with `slot_count` slots per kind.
    ///
    /// `node_limit` caps the live nodes of each pool: the shared list pool
    /// and every hash table's own pool.
    pub fn new(slot_count: usize, node_limit: Option<usize>) -> Self {
        Self {
            slot_count,
            node_limit,
            list_pool: NodePool::with_limit(node_limit),
            lists: Slots::new(Kind::List, slot_count),
            hashes: Slots::new(Kind::Hash, slot_count),
            bitmaps: Slots::new(Kind::Bitmap, slot_count),
        }
    }

    /// Slots per kind.
    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// Nodes currently held by all lists.
    pub fn list_nodes(&self) -> usize {
        self.list_pool.live()
    }

    /// Number of live instances across all kinds.
    pub fn live_instances(&self) -> usize {
        self.lists.occupied() + self.hashes.occupied() + self.bitmaps.occupied()
    }

    /// Returns `true` if `name` names a live instance.
    pub fn contains(&self, name: &InstanceName) -> bool {
        match name.kind() {
            Kind::List => self.lists.get(name).is_ok(),
            Kind::Hash => self.hashes.get(name).is_ok(),
            Kind::Bitmap => self.bitmaps.get(name).is_ok(),
        }
    }

    /// Creates an empty list in `name`'s slot.
    pub fn create_list(&mut self, name: &InstanceName) -> Result<(), RegistryError> {
        let idx = self.lists.vacant(name)?;
        self.lists.slots[idx] = Some(List::new());
        Ok(())
    }

    /// Creates an empty hash table in `name`'s slot.
    pub fn create_hash(&mut self, name: &InstanceName) -> Result<(), RegistryError> {
        let idx = self.hashes.vacant(name)?;
        self.hashes.slots[idx] = Some(HashTable::with_limit(self.node_limit));
        Ok(())
    }

    /// Creates a bitmap of `bits` bits, all `false`.
    ///
    /// The slot stays vacant if the bitmap cannot be allocated.
    pub fn create_bitmap(&mut self, name: &InstanceName, bits: usize) -> Result<(), RegistryError> {
        let idx = self.bitmaps.vacant(name)?;
        let bitmap = Bitmap::new(bits).map_err(|source| RegistryError::Create {
            name: *name,
            source,
        })?;
        self.bitmaps.slots[idx] = Some(bitmap);
        Ok(())
    }

    /// Destroys the instance in `name`'s slot, returning how many nodes
    /// were released.
    pub fn destroy(&mut self, name: &InstanceName) -> Result<usize, RegistryError> {
        Ok(match name.kind() {
            Kind::List => self.lists.take(name)?.clear(&mut self.list_pool),
            Kind::Hash => self.hashes.take(name)?.clear(),
            Kind::Bitmap => {
                self.bitmaps.take(name)?;
                0
            }
        })
    }

    /// Borrows a list together with the pool its nodes live in.
    pub fn list(&self, name: &InstanceName) -> Result<(&List<Value>, &NodePool<Value>), RegistryError> {
        Ok((self.lists.get(name)?, &self.list_pool))
    }

    /// Mutably borrows a list together with its pool.
    pub fn list_mut(
        &mut self,
        name: &InstanceName,
    ) -> Result<(&mut List<Value>, &mut NodePool<Value>), RegistryError> {
        Ok((self.lists.get_mut(name)?, &mut self.list_pool))
    }

    /// Mutably borrows two distinct lists and their shared pool.
    ///
    /// The caller must handle `a == b` itself.
    pub fn list_pair_mut(
        &mut self,
        a: &InstanceName,
        b: &InstanceName,
    ) -> Result<(&mut List<Value>, &mut List<Value>, &mut NodePool<Value>), RegistryError> {
        let (x, y) = self.lists.pair_mut(a, b)?;
        Ok((x, y, &mut self.list_pool))
    }

    pub fn hash(&self, name: &InstanceName) -> Result<&HashTable<Value>, RegistryError> {
        self.hashes.get(name)
    }

    pub fn hash_mut(&mut self, name: &InstanceName) -> Result<&mut HashTable<Value>, RegistryError> {
        self.hashes.get_mut(name)
    }

    pub fn bitmap(&self, name: &InstanceName) -> Result<&Bitmap, RegistryError> {
        self.bitmaps.get(name)
    }

    pub fn bitmap_mut(&mut self, name: &InstanceName) -> Result<&mut Bitmap, RegistryError> {
        self.bitmaps.get_mut(name)
    }

    /// Destroys every live instance.
    pub fn teardown(&mut self) -> Teardown {
        let mut summary = Teardown::default();
        let pool = &mut self.list_pool;
        for mut list in self.lists.drain() {
            summary.lists += 1;
            summary.nodes += list.clear(pool);
        }
        for mut table in self.hashes.drain() {
            summary.hashes += 1;
            summary.nodes += table.clear();
        }
        summary.bitmaps = self.bitmaps.drain().count();
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(text: &str) -> InstanceName {
        InstanceName::parse(text).unwrap()
    }

    #[test]
    fn create_lookup_destroy() {
        let mut reg = Registry::new(10, None);
        reg.create_list(&name("list0")).unwrap();
        assert!(reg.contains(&name("list0")));
        assert!(!reg.contains(&name("list1")));

        let (list, pool) = reg.list_mut(&name("list0")).unwrap();
        list.push_back(pool, 1).unwrap();
        list.push_back(pool, 2).unwrap();
        assert_eq!(reg.list_nodes(), 2);

        assert_eq!(reg.destroy(&name("list0")), Ok(2));
        assert_eq!(reg.list_nodes(), 0);
        assert_eq!(
            reg.destroy(&name("list0")),
            Err(RegistryError::NotFound(name("list0")))
        );
    }

    #[test]
    fn duplicate_create_is_rejected() {
        let mut reg = Registry::new(10, None);
        reg.create_hash(&name("hash3")).unwrap();
        assert_eq!(
            reg.create_hash(&name("hash3")),
            Err(RegistryError::AlreadyExists(name("hash3")))
        );
    }

    #[test]
    fn kinds_have_separate_slots() {
        let mut reg = Registry::new(10, None);
        reg.create_list(&name("list2")).unwrap();
        reg.create_hash(&name("hash2")).unwrap();
        reg.create_bitmap(&name("bm2"), 8).unwrap();
        assert_eq!(reg.live_instances(), 3);
    }

    #[test]
    fn failed_bitmap_allocation_leaves_slot_vacant() {
        let mut reg = Registry::new(10, None);
        assert!(matches!(
            reg.create_bitmap(&name("bm0"), usize::MAX),
            Err(RegistryError::Create { .. })
        ));
        assert!(!reg.contains(&name("bm0")));
        reg.create_bitmap(&name("bm0"), 8).unwrap();
        assert_eq!(reg.bitmap(&name("bm0")).unwrap().size(), 8);
    }

    #[test]
    fn create_checks_kind() {
        let mut reg = Registry::new(10, None);
        assert!(matches!(
            reg.create_list(&name("hash0")),
            Err(RegistryError::Invalid(TypeError::WrongKind { .. }))
        ));
        assert_eq!(reg.live_instances(), 0);
    }

    #[test]
    fn slot_bounds_follow_slot_count() {
        let mut reg = Registry::new(2, None);
        reg.create_list(&name("list1")).unwrap();
        assert!(matches!(
            reg.create_list(&name("list2")),
            Err(RegistryError::Invalid(TypeError::SlotOutOfRange { .. }))
        ));
        assert!(matches!(
            reg.bitmap(&name("bm7")),
            Err(RegistryError::Invalid(_))
        ));
    }

    #[test]
    fn wrong_kind_lookup_is_rejected() {
        let mut reg = Registry::new(10, None);
        reg.create_hash(&name("hash0")).unwrap();
        assert!(matches!(
            reg.list(&name("hash0")),
            Err(RegistryError::Invalid(TypeError::WrongKind { .. }))
        ));
    }

    #[test]
    fn pair_mut_preserves_argument_order() {
        let mut reg = Registry::new(10, None);
        reg.create_list(&name("list4")).unwrap();
        reg.create_list(&name("list1")).unwrap();
        {
            let (a, _b, pool) = reg.list_pair_mut(&name("list4"), &name("list1")).unwrap();
            a.push_back(pool, 40).unwrap();
        }
        let (list, pool) = reg.list(&name("list4")).unwrap();
        assert_eq!(list.iter(pool).copied().collect::<Vec<_>>(), vec![40]);
    }

    #[test]
    fn pair_mut_reports_missing_list() {
        let mut reg = Registry::new(10, None);
        reg.create_list(&name("list0")).unwrap();
        assert_eq!(
            reg.list_pair_mut(&name("list0"), &name("list5")).err(),
            Some(RegistryError::NotFound(name("list5")))
        );
    }

    #[test]
    fn node_limit_applies_to_shared_list_pool() {
        let mut reg = Registry::new(10, Some(2));
        reg.create_list(&name("list0")).unwrap();
        reg.create_list(&name("list1")).unwrap();
        {
            let (list, pool) = reg.list_mut(&name("list0")).unwrap();
            list.push_back(pool, 1).unwrap();
        }
        let (list, pool) = reg.list_mut(&name("list1")).unwrap();
        list.push_back(pool, 2).unwrap();
        assert!(list.push_back(pool, 3).is_err());
    }

    #[test]
    fn teardown_releases_everything() {
        let mut reg = Registry::new(10, None);
        reg.create_list(&name("list0")).unwrap();
        reg.create_hash(&name("hash0")).unwrap();
        reg.create_bitmap(&name("bm0"), 4).unwrap();
        {
            let (list, pool) = reg.list_mut(&name("list0")).unwrap();
            list.push_back(pool, 1).unwrap();
        }
        reg.hash_mut(&name("hash0")).unwrap().insert(5).unwrap();
        reg.hash_mut(&name("hash0")).unwrap().insert(6).unwrap();

        let summary = reg.teardown();
        assert_eq!(
            summary,
            Teardown {
                lists: 1,
                hashes: 1,
                bitmaps: 1,
                nodes: 3
            }
        );
        assert_eq!(summary.instances(), 3);
        assert_eq!(reg.live_instances(), 0);
        assert_eq!(reg.list_nodes(), 0);
    }
}
