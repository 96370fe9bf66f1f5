//! containers::list
//!
//! Doubly linked list whose nodes live in a shared [`NodePool`].
//!
//! # Design
//!
//! The pool owns every node; a [`List`] only coordinates keys (head, tail,
//! length). Several lists may share one pool, which is what lets
//! [`splice`] and [`List::unique`] move nodes between lists by relinking
//! them: a node's key, and therefore its identity, survives the move.
//!
//! # Invariants
//!
//! - Every key reachable from a list is live in that list's pool
//! - A node is linked into at most one list at a time
//! - A node is released exactly once, by the operation that unlinks it
//!   for good (pop, remove, clear, dedup without a destination)
//!
//! # Example
//!
//! ```
//! use slotwise::containers::list::{List, NodePool};
//!
//! let mut pool = NodePool::new();
//! let mut list = List::new();
//! for v in [3, 1, 2] {
//!     list.insert_ordered(&mut pool, v, |a, b| a < b).unwrap();
//! }
//! assert_eq!(list.iter(&pool).copied().collect::<Vec<_>>(), vec![1, 2, 3]);
//! assert_eq!(list.pop_front(&mut pool), Some(1));
//! assert_eq!(pool.live(), 2);
//! ```

use std::cmp::Ordering;
use std::marker::PhantomData;

use rand::seq::SliceRandom;
use rand::Rng;
use slab::Slab;

use super::ContainerError;

/// Stable handle to a node inside a [`NodePool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeKey(usize);

#[derive(Debug)]
struct Node<T> {
    value: T,
    prev: Option<NodeKey>,
    next: Option<NodeKey>,
}

/// Slab of list nodes, optionally capped at a fixed number of live nodes.
#[derive(Debug)]
pub struct NodePool<T> {
    nodes: Slab<Node<T>>,
    limit: Option<usize>,
}

impl<T> Default for NodePool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> NodePool<T> {
    /// Creates an unbounded pool.
    pub fn new() -> Self {
        Self::with_limit(None)
    }

    /// Creates a pool that refuses to hold more than `limit` live nodes.
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            nodes: Slab::new(),
            limit,
        }
    }

    /// Number of live nodes across every list using this pool.
    pub fn live(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the payload of a live node.
    pub fn get(&self, key: NodeKey) -> Option<&T> {
        self.nodes.get(key.0).map(|node| &node.value)
    }

    /// Returns the payload of a live node mutably.
    pub fn get_mut(&mut self, key: NodeKey) -> Option<&mut T> {
        self.nodes.get_mut(key.0).map(|node| &mut node.value)
    }

    fn alloc(&mut self, value: T) -> Result<NodeKey, ContainerError> {
        if let Some(limit) = self.limit {
            if self.nodes.len() >= limit {
                return Err(ContainerError::Full { limit });
            }
        }
        let key = self.nodes.insert(Node {
            value,
            prev: None,
            next: None,
        });
        Ok(NodeKey(key))
    }

    fn release(&mut self, key: NodeKey) -> T {
        self.nodes.remove(key.0).value
    }

    fn node(&self, key: NodeKey) -> &Node<T> {
        &self.nodes[key.0]
    }

    fn node_mut(&mut self, key: NodeKey) -> &mut Node<T> {
        &mut self.nodes[key.0]
    }
}

/// A resolved list position: a node, or the end-of-list sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// The node currently at the requested index.
    Node(NodeKey),
    /// One past the last node.
    End,
}

/// Doubly linked list over a [`NodePool`].
///
/// All operations must be given the same pool the list was built with.
#[derive(Debug)]
pub struct List<T> {
    head: Option<NodeKey>,
    tail: Option<NodeKey>,
    len: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Default for List<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> List<T> {
    /// Creates an empty list.
    pub const fn new() -> Self {
        Self {
            head: None,
            tail: None,
            len: 0,
            _marker: PhantomData,
        }
    }

    /// Number of nodes in the list.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the list holds no nodes.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Key of the first node.
    pub fn front_key(&self) -> Option<NodeKey> {
        self.head
    }

    /// Key of the last node.
    pub fn back_key(&self) -> Option<NodeKey> {
        self.tail
    }

    /// Payload of the first node.
    pub fn front<'a>(&self, pool: &'a NodePool<T>) -> Option<&'a T> {
        self.head.map(|key| &pool.node(key).value)
    }

    /// Payload of the last node.
    pub fn back<'a>(&self, pool: &'a NodePool<T>) -> Option<&'a T> {
        self.tail.map(|key| &pool.node(key).value)
    }

    /// Iterates payloads front to back.
    pub fn iter<'a>(&self, pool: &'a NodePool<T>) -> Iter<'a, T> {
        Iter {
            pool,
            cursor: self.head,
            remaining: self.len,
        }
    }

    /// Iterates node keys front to back.
    pub fn keys<'a>(&self, pool: &'a NodePool<T>) -> Keys<'a, T> {
        Keys {
            pool,
            cursor: self.head,
            remaining: self.len,
        }
    }

    /// Key of the node at `pos`, walking from the head.
    pub fn nth_key(&self, pool: &NodePool<T>, pos: usize) -> Option<NodeKey> {
        if pos >= self.len {
            return None;
        }
        self.keys(pool).nth(pos)
    }

    /// Resolves `pos` to a node or to the end sentinel.
    ///
    /// `pos == len` resolves to [`Position::End`]; anything larger does not
    /// resolve at all.
    pub fn resolve(&self, pool: &NodePool<T>, pos: usize) -> Option<Position> {
        match pos.cmp(&self.len) {
            Ordering::Less => self.nth_key(pool, pos).map(Position::Node),
            Ordering::Equal => Some(Position::End),
            Ordering::Greater => None,
        }
    }

    // =========================================================================
    // Linkage primitives
    // =========================================================================

    fn link_between(
        &mut self,
        pool: &mut NodePool<T>,
        key: NodeKey,
        prev: Option<NodeKey>,
        next: Option<NodeKey>,
    ) {
        {
            let node = pool.node_mut(key);
            node.prev = prev;
            node.next = next;
        }
        match prev {
            Some(p) => pool.node_mut(p).next = Some(key),
            None => self.head = Some(key),
        }
        match next {
            Some(n) => pool.node_mut(n).prev = Some(key),
            None => self.tail = Some(key),
        }
        self.len += 1;
    }

    fn link_before(&mut self, pool: &mut NodePool<T>, before: Position, key: NodeKey) {
        let (prev, next) = match before {
            Position::Node(b) => (pool.node(b).prev, Some(b)),
            Position::End => (self.tail, None),
        };
        self.link_between(pool, key, prev, next);
    }

    /// Links `key` after `after`, or at the front when `after` is `None`.
    fn link_after(&mut self, pool: &mut NodePool<T>, after: Option<NodeKey>, key: NodeKey) {
        let next = match after {
            Some(a) => pool.node(a).next,
            None => self.head,
        };
        self.link_between(pool, key, after, next);
    }

    fn unlink(&mut self, pool: &mut NodePool<T>, key: NodeKey) {
        let (prev, next) = {
            let node = pool.node(key);
            (node.prev, node.next)
        };
        match prev {
            Some(p) => pool.node_mut(p).next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => pool.node_mut(n).prev = prev,
            None => self.tail = prev,
        }
        let node = pool.node_mut(key);
        node.prev = None;
        node.next = None;
        self.len -= 1;
    }

    /// Detaches the inclusive run `first..=last` of `count` nodes.
    fn detach_segment(
        &mut self,
        pool: &mut NodePool<T>,
        first: NodeKey,
        last: NodeKey,
        count: usize,
    ) {
        let prev = pool.node(first).prev;
        let next = pool.node(last).next;
        match prev {
            Some(p) => pool.node_mut(p).next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => pool.node_mut(n).prev = prev,
            None => self.tail = prev,
        }
        pool.node_mut(first).prev = None;
        pool.node_mut(last).next = None;
        self.len -= count;
    }

    /// Attaches a detached run `first..=last` of `count` nodes before `before`.
    fn attach_segment(
        &mut self,
        pool: &mut NodePool<T>,
        before: Position,
        first: NodeKey,
        last: NodeKey,
        count: usize,
    ) {
        let (prev, next) = match before {
            Position::Node(b) => (pool.node(b).prev, Some(b)),
            Position::End => (self.tail, None),
        };
        pool.node_mut(first).prev = prev;
        pool.node_mut(last).next = next;
        match prev {
            Some(p) => pool.node_mut(p).next = Some(first),
            None => self.head = Some(first),
        }
        match next {
            Some(n) => pool.node_mut(n).prev = Some(last),
            None => self.tail = Some(last),
        }
        self.len += count;
    }

    /// Rewrites the links so the list visits `keys` in order.
    fn relink(&mut self, pool: &mut NodePool<T>, keys: &[NodeKey]) {
        self.head = keys.first().copied();
        self.tail = keys.last().copied();
        for (i, &key) in keys.iter().enumerate() {
            let node = pool.node_mut(key);
            node.prev = i.checked_sub(1).map(|p| keys[p]);
            node.next = keys.get(i + 1).copied();
        }
    }

    // =========================================================================
    // Insertion and removal
    // =========================================================================

    /// Allocates a node for `value` and appends it.
    pub fn push_back(&mut self, pool: &mut NodePool<T>, value: T) -> Result<NodeKey, ContainerError> {
        let key = pool.alloc(value)?;
        self.link_before(pool, Position::End, key);
        Ok(key)
    }

    /// Allocates a node for `value` and prepends it.
    pub fn push_front(&mut self, pool: &mut NodePool<T>, value: T) -> Result<NodeKey, ContainerError> {
        let key = pool.alloc(value)?;
        self.link_after(pool, None, key);
        Ok(key)
    }

    /// Inserts `value` before the node currently at `pos`.
    ///
    /// A position at or past the end appends.
    pub fn insert_at(
        &mut self,
        pool: &mut NodePool<T>,
        pos: usize,
        value: T,
    ) -> Result<NodeKey, ContainerError> {
        let before = self.resolve(pool, pos).unwrap_or(Position::End);
        let key = pool.alloc(value)?;
        self.link_before(pool, before, key);
        Ok(key)
    }

    /// Inserts `value` before the first node it is strictly less than.
    ///
    /// Equal values land after the ones already present.
    pub fn insert_ordered<F>(
        &mut self,
        pool: &mut NodePool<T>,
        value: T,
        mut less: F,
    ) -> Result<NodeKey, ContainerError>
    where
        F: FnMut(&T, &T) -> bool,
    {
        let before = self
            .keys(pool)
            .find(|&key| less(&value, &pool.node(key).value))
            .map_or(Position::End, Position::Node);
        let key = pool.alloc(value)?;
        self.link_before(pool, before, key);
        Ok(key)
    }

    /// Unlinks and releases the first node.
    pub fn pop_front(&mut self, pool: &mut NodePool<T>) -> Option<T> {
        let key = self.head?;
        self.unlink(pool, key);
        Some(pool.release(key))
    }

    /// Unlinks and releases the last node.
    pub fn pop_back(&mut self, pool: &mut NodePool<T>) -> Option<T> {
        let key = self.tail?;
        self.unlink(pool, key);
        Some(pool.release(key))
    }

    /// Unlinks and releases the node `key`, which must belong to this list.
    pub fn remove(&mut self, pool: &mut NodePool<T>, key: NodeKey) -> T {
        self.unlink(pool, key);
        pool.release(key)
    }

    /// Unlinks and releases the node at `pos`.
    pub fn remove_at(&mut self, pool: &mut NodePool<T>, pos: usize) -> Result<T, ContainerError> {
        let key = self.nth_key(pool, pos).ok_or(ContainerError::OutOfRange {
            pos,
            len: self.len,
        })?;
        Ok(self.remove(pool, key))
    }

    /// Moves the front node to the front of `dst` without releasing it.
    pub(crate) fn transfer_front(&mut self, pool: &mut NodePool<T>, dst: &mut List<T>) -> Option<NodeKey> {
        let key = self.head?;
        self.unlink(pool, key);
        dst.link_after(pool, None, key);
        Some(key)
    }

    /// Releases every node, returning how many were freed.
    pub fn clear(&mut self, pool: &mut NodePool<T>) -> usize {
        let mut released = 0;
        while self.pop_front(pool).is_some() {
            released += 1;
        }
        released
    }

    // =========================================================================
    // Reordering
    // =========================================================================

    /// Exchanges the nodes at positions `i` and `j`.
    ///
    /// Both positions are located in one pass; if either is missing the list
    /// is left untouched.
    pub fn swap_at(&mut self, pool: &mut NodePool<T>, i: usize, j: usize) -> Result<(), ContainerError> {
        let (mut a, mut b) = (None, None);
        for (pos, key) in self.keys(pool).enumerate() {
            if pos == i {
                a = Some(key);
            }
            if pos == j {
                b = Some(key);
            }
        }
        let len = self.len;
        let a = a.ok_or(ContainerError::OutOfRange { pos: i, len })?;
        let b = b.ok_or(ContainerError::OutOfRange { pos: j, len })?;
        match i.cmp(&j) {
            Ordering::Equal => {}
            Ordering::Less => self.swap_ordered(pool, a, b),
            Ordering::Greater => self.swap_ordered(pool, b, a),
        }
        Ok(())
    }

    /// Swaps two distinct nodes where `a` precedes `b`.
    fn swap_ordered(&mut self, pool: &mut NodePool<T>, a: NodeKey, b: NodeKey) {
        if pool.node(a).next == Some(b) {
            self.unlink(pool, a);
            self.link_after(pool, Some(b), a);
            return;
        }
        let a_prev = pool.node(a).prev;
        let b_prev = pool.node(b).prev;
        self.unlink(pool, a);
        self.unlink(pool, b);
        self.link_after(pool, a_prev, b);
        self.link_after(pool, b_prev, a);
    }

    /// Reverses link order in place.
    pub fn reverse(&mut self, pool: &mut NodePool<T>) {
        let mut cursor = self.head;
        while let Some(key) = cursor {
            let node = pool.node_mut(key);
            std::mem::swap(&mut node.prev, &mut node.next);
            cursor = node.prev;
        }
        std::mem::swap(&mut self.head, &mut self.tail);
    }

    /// Stable sort under the strict-weak order `less`.
    pub fn sort_by<F>(&mut self, pool: &mut NodePool<T>, mut less: F)
    where
        F: FnMut(&T, &T) -> bool,
    {
        let mut keys: Vec<NodeKey> = self.keys(pool).collect();
        keys.sort_by(|&a, &b| {
            let (a, b) = (&pool.node(a).value, &pool.node(b).value);
            if less(a, b) {
                Ordering::Less
            } else if less(b, a) {
                Ordering::Greater
            } else {
                Ordering::Equal
            }
        });
        self.relink(pool, &keys);
    }

    /// Randomly permutes link order.
    pub fn shuffle<R>(&mut self, pool: &mut NodePool<T>, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let mut keys: Vec<NodeKey> = self.keys(pool).collect();
        keys.shuffle(rng);
        self.relink(pool, &keys);
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// First node not less than any other.
    pub fn max_by<'a, F>(&self, pool: &'a NodePool<T>, mut less: F) -> Option<&'a T>
    where
        F: FnMut(&T, &T) -> bool,
    {
        self.iter(pool)
            .reduce(|max, value| if less(max, value) { value } else { max })
    }

    /// First node no other is less than.
    pub fn min_by<'a, F>(&self, pool: &'a NodePool<T>, mut less: F) -> Option<&'a T>
    where
        F: FnMut(&T, &T) -> bool,
    {
        self.iter(pool)
            .reduce(|min, value| if less(value, min) { value } else { min })
    }

    /// Removes every node order-equivalent to the node kept before it.
    ///
    /// Removed nodes are appended to `duplicates` in their original order
    /// when given, and released otherwise. Returns the number removed.
    pub fn unique<F>(
        &mut self,
        pool: &mut NodePool<T>,
        mut duplicates: Option<&mut List<T>>,
        mut less: F,
    ) -> usize
    where
        F: FnMut(&T, &T) -> bool,
    {
        let Some(mut kept) = self.head else {
            return 0;
        };
        let mut removed = 0;
        while let Some(next) = pool.node(kept).next {
            let equivalent = {
                let (a, b) = (&pool.node(kept).value, &pool.node(next).value);
                !less(a, b) && !less(b, a)
            };
            if !equivalent {
                kept = next;
                continue;
            }
            self.unlink(pool, next);
            match duplicates.as_deref_mut() {
                Some(dups) => dups.link_before(pool, Position::End, next),
                None => {
                    pool.release(next);
                }
            }
            removed += 1;
        }
        removed
    }
}

/// Validated `[first, last)` range of a source list.
struct Segment {
    first: NodeKey,
    last: NodeKey,
    count: usize,
}

fn resolve_segment<T>(
    pool: &NodePool<T>,
    src: &List<T>,
    first: usize,
    last: usize,
) -> Result<Option<Segment>, ContainerError> {
    if first > last || last > src.len() {
        return Err(ContainerError::InvalidPosition);
    }
    let count = last - first;
    if count == 0 {
        return Ok(None);
    }
    let mut keys = src.keys(pool).skip(first);
    let first_key = keys.next();
    let last_key = if count == 1 {
        first_key
    } else {
        keys.nth(count - 2)
    };
    match (first_key, last_key) {
        (Some(first), Some(last)) => Ok(Some(Segment { first, last, count })),
        _ => Err(ContainerError::InvalidPosition),
    }
}

/// Moves nodes `[first, last)` of `src` to just before position `before` of
/// `dst`. Returns the number of nodes moved.
///
/// All three positions are resolved before anything is relinked, so a bad
/// position leaves both lists unmodified.
pub fn splice<T>(
    pool: &mut NodePool<T>,
    dst: &mut List<T>,
    before: usize,
    src: &mut List<T>,
    first: usize,
    last: usize,
) -> Result<usize, ContainerError> {
    let before = dst
        .resolve(pool, before)
        .ok_or(ContainerError::InvalidPosition)?;
    let Some(segment) = resolve_segment(pool, src, first, last)? else {
        return Ok(0);
    };
    src.detach_segment(pool, segment.first, segment.last, segment.count);
    dst.attach_segment(pool, before, segment.first, segment.last, segment.count);
    Ok(segment.count)
}

/// Moves nodes `[first, last)` of `list` to just before position `before`
/// of the same list.
///
/// `before` must not fall strictly inside the range.
pub fn splice_within<T>(
    pool: &mut NodePool<T>,
    list: &mut List<T>,
    before: usize,
    first: usize,
    last: usize,
) -> Result<usize, ContainerError> {
    let before_pos = list
        .resolve(pool, before)
        .ok_or(ContainerError::InvalidPosition)?;
    let Some(segment) = resolve_segment(pool, list, first, last)? else {
        return Ok(0);
    };
    if before > first && before < last {
        return Err(ContainerError::InvalidPosition);
    }
    if before == first || before == last {
        return Ok(segment.count);
    }
    list.detach_segment(pool, segment.first, segment.last, segment.count);
    list.attach_segment(pool, before_pos, segment.first, segment.last, segment.count);
    Ok(segment.count)
}

/// Front-to-back payload iterator.
pub struct Iter<'a, T> {
    pool: &'a NodePool<T>,
    cursor: Option<NodeKey>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.cursor?;
        let node = self.pool.node(key);
        self.cursor = node.next;
        self.remaining -= 1;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

/// Front-to-back key iterator.
pub struct Keys<'a, T> {
    pool: &'a NodePool<T>,
    cursor: Option<NodeKey>,
    remaining: usize,
}

impl<T> Iterator for Keys<'_, T> {
    type Item = NodeKey;

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.cursor?;
        self.cursor = self.pool.node(key).next;
        self.remaining -= 1;
        Some(key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Keys<'_, T> {}
