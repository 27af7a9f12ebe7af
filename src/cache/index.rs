//! Ordering Index Module
//!
//! Combines key lookup with an eviction-ordered sequence of entries.
//!
//! Entries live in an arena addressed by stable [`Handle`]s, each slot
//! carrying explicit `prev`/`next` links. A `HashMap` maps keys to handles.
//! The front of the sequence is the eviction-first end.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use crate::cache::CacheEntry;

/// Stable reference to an entry's slot in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(usize);

#[derive(Debug)]
struct Node<K, V> {
    entry: CacheEntry<K, V>,
    prev: Option<Handle>,
    next: Option<Handle>,
}

// == Ordering Index ==
/// Key map plus doubly linked sequence over an arena of entries.
///
/// All operations are O(1) except [`OrderingIndex::remove_front`], which is
/// O(n) in the number of removed entries.
#[derive(Debug)]
pub struct OrderingIndex<K, V> {
    /// Key to slot mapping
    map: HashMap<K, Handle>,
    /// Arena slots, `None` when free
    slots: Vec<Option<Node<K, V>>>,
    /// Free slot indices available for reuse
    free: Vec<usize>,
    /// Eviction-first end
    head: Option<Handle>,
    /// Eviction-last end
    tail: Option<Handle>,
}

impl<K, V> Default for OrderingIndex<K, V> {
    fn default() -> Self {
        Self {
            map: HashMap::new(),
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
        }
    }
}

impl<K: Hash + Eq + Clone, V> OrderingIndex<K, V> {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Length ==
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    // == Lookup ==
    /// Returns the handle for `key`, if present.
    pub fn lookup<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.get(key).copied()
    }

    pub fn entry(&self, handle: Handle) -> Option<&CacheEntry<K, V>> {
        self.node(handle).map(|node| &node.entry)
    }

    pub(crate) fn entry_mut(&mut self, handle: Handle) -> Option<&mut CacheEntry<K, V>> {
        self.node_mut(handle).map(|node| &mut node.entry)
    }

    // == Neighbours ==
    pub fn front(&self) -> Option<Handle> {
        self.head
    }

    pub fn back(&self) -> Option<Handle> {
        self.tail
    }

    pub fn prev(&self, handle: Handle) -> Option<Handle> {
        self.node(handle).and_then(|node| node.prev)
    }

    pub fn next(&self, handle: Handle) -> Option<Handle> {
        self.node(handle).and_then(|node| node.next)
    }

    // == Insert ==
    /// Inserts at the eviction-first end.
    ///
    /// An existing entry under the same key is dropped first.
    pub fn push_front(&mut self, entry: CacheEntry<K, V>) -> Handle {
        let handle = self.alloc(entry);
        self.link_front(handle);
        handle
    }

    /// Inserts at the eviction-last end.
    ///
    /// An existing entry under the same key is dropped first.
    pub fn push_back(&mut self, entry: CacheEntry<K, V>) -> Handle {
        let handle = self.alloc(entry);
        self.link_back(handle);
        handle
    }

    // == Remove ==
    /// Removes the entry for `key`. Absent keys are a no-op.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<CacheEntry<K, V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let handle = self.lookup(key)?;
        self.remove_handle(handle)
    }

    pub fn remove_handle(&mut self, handle: Handle) -> Option<CacheEntry<K, V>> {
        self.node(handle)?;
        self.unlink(handle);
        let node = self.slots.get_mut(handle.0)?.take()?;
        self.map.remove(&node.entry.key);
        self.free.push(handle.0);
        Some(node.entry)
    }

    /// Removes up to `n` entries from the eviction-first end.
    pub fn remove_front(&mut self, n: usize) -> Vec<CacheEntry<K, V>> {
        let mut removed = Vec::with_capacity(n.min(self.len()));
        while removed.len() < n {
            let Some(entry) = self.head.and_then(|head| self.remove_handle(head)) else {
                break;
            };
            removed.push(entry);
        }
        removed
    }

    /// Removes every entry matching `pred`, returning how many were removed.
    pub fn remove_where<F>(&mut self, mut pred: F) -> usize
    where
        F: FnMut(&CacheEntry<K, V>) -> bool,
    {
        let doomed: Vec<Handle> = self
            .handles()
            .filter(|&handle| self.entry(handle).is_some_and(&mut pred))
            .collect();

        doomed
            .into_iter()
            .filter_map(|handle| self.remove_handle(handle))
            .count()
    }

    pub fn clear(&mut self) {
        self.map.clear();
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
    }

    // == Reposition ==
    pub fn move_to_front(&mut self, handle: Handle) {
        if self.head == Some(handle) || self.node(handle).is_none() {
            return;
        }
        self.unlink(handle);
        self.link_front(handle);
    }

    pub fn move_to_back(&mut self, handle: Handle) {
        if self.tail == Some(handle) || self.node(handle).is_none() {
            return;
        }
        self.unlink(handle);
        self.link_back(handle);
    }

    /// Moves `handle` so it sits immediately before `anchor`.
    pub fn move_before(&mut self, handle: Handle, anchor: Handle) {
        if handle == anchor || self.node(handle).is_none() || self.node(anchor).is_none() {
            return;
        }
        self.unlink(handle);
        let prev = self.prev(anchor);
        self.set_links(handle, prev, Some(anchor));
        self.set_prev(anchor, Some(handle));
        match prev {
            Some(p) => self.set_next(p, Some(handle)),
            None => self.head = Some(handle),
        }
    }

    /// Moves `handle` so it sits immediately after `anchor`.
    pub fn move_after(&mut self, handle: Handle, anchor: Handle) {
        if handle == anchor || self.node(handle).is_none() || self.node(anchor).is_none() {
            return;
        }
        self.unlink(handle);
        let next = self.next(anchor);
        self.set_links(handle, Some(anchor), next);
        self.set_next(anchor, Some(handle));
        match next {
            Some(n) => self.set_prev(n, Some(handle)),
            None => self.tail = Some(handle),
        }
    }

    // == Iteration ==
    /// Iterates entries from the eviction-first end to the eviction-last end.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            index: self,
            cursor: self.head,
        }
    }

    /// Snapshot of keys in eviction order.
    pub fn keys(&self) -> Vec<K> {
        self.iter().map(|entry| entry.key.clone()).collect()
    }

    fn handles(&self) -> impl Iterator<Item = Handle> + '_ {
        std::iter::successors(self.head, move |&handle| self.next(handle))
    }

    // == Internal linked-list operations ==
    fn node(&self, handle: Handle) -> Option<&Node<K, V>> {
        self.slots.get(handle.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, handle: Handle) -> Option<&mut Node<K, V>> {
        self.slots.get_mut(handle.0).and_then(Option::as_mut)
    }

    fn alloc(&mut self, entry: CacheEntry<K, V>) -> Handle {
        if let Some(existing) = self.lookup(&entry.key) {
            self.remove_handle(existing);
        }

        let key = entry.key.clone();
        let node = Some(Node {
            entry,
            prev: None,
            next: None,
        });
        let handle = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = node;
                Handle(slot)
            }
            None => {
                self.slots.push(node);
                Handle(self.slots.len() - 1)
            }
        };
        self.map.insert(key, handle);
        handle
    }

    fn link_front(&mut self, handle: Handle) {
        let old_head = self.head;
        self.set_links(handle, None, old_head);
        match old_head {
            Some(h) => self.set_prev(h, Some(handle)),
            None => self.tail = Some(handle),
        }
        self.head = Some(handle);
    }

    fn link_back(&mut self, handle: Handle) {
        let old_tail = self.tail;
        self.set_links(handle, old_tail, None);
        match old_tail {
            Some(t) => self.set_next(t, Some(handle)),
            None => self.head = Some(handle),
        }
        self.tail = Some(handle);
    }

    fn unlink(&mut self, handle: Handle) {
        let Some((prev, next)) = self.node(handle).map(|node| (node.prev, node.next)) else {
            return;
        };
        match prev {
            Some(p) => self.set_next(p, next),
            None => self.head = next,
        }
        match next {
            Some(n) => self.set_prev(n, prev),
            None => self.tail = prev,
        }
        self.set_links(handle, None, None);
    }

    fn set_links(&mut self, handle: Handle, prev: Option<Handle>, next: Option<Handle>) {
        if let Some(node) = self.node_mut(handle) {
            node.prev = prev;
            node.next = next;
        }
    }

    fn set_prev(&mut self, handle: Handle, prev: Option<Handle>) {
        if let Some(node) = self.node_mut(handle) {
            node.prev = prev;
        }
    }

    fn set_next(&mut self, handle: Handle, next: Option<Handle>) {
        if let Some(node) = self.node_mut(handle) {
            node.next = next;
        }
    }

    /// Walks the sequence and checks it agrees with the key map.
    #[cfg(test)]
    pub(crate) fn is_consistent(&self) -> bool {
        let mut linked = 0;
        let mut prev = None;
        let mut cursor = self.head;
        while let Some(handle) = cursor {
            let Some(node) = self.node(handle) else {
                return false;
            };
            if node.prev != prev || self.map.get(&node.entry.key) != Some(&handle) {
                return false;
            }
            linked += 1;
            if linked > self.map.len() {
                return false;
            }
            prev = Some(handle);
            cursor = node.next;
        }
        prev == self.tail && linked == self.map.len()
    }
}

// == Iterator ==
/// Front-to-back iterator over index entries.
pub struct Iter<'a, K, V> {
    index: &'a OrderingIndex<K, V>,
    cursor: Option<Handle>,
}

impl<'a, K: Hash + Eq + Clone, V> Iterator for Iter<'a, K, V> {
    type Item = &'a CacheEntry<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.index.node(self.cursor?)?;
        self.cursor = node.next;
        Some(&node.entry)
    }
}
