// Copyright 2026 the Scion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use super::id::{INVALID, NodeId};
use super::store::NodeStore;

/// An iterator over the direct children of a node.
///
/// Created by [`NodeStore::children`].
#[derive(Debug)]
pub struct Children<'a> {
    store: &'a NodeStore,
    current: u32,
}

impl<'a> Children<'a> {
    pub(crate) fn new(store: &'a NodeStore, first: u32) -> Self {
        Self {
            store,
            current: first,
        }
    }
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.store.next_sibling[idx as usize];
        Some(self.store.id_at(idx))
    }
}

/// A depth-first, pre-order iterator over the strict descendants of a node.
///
/// Walks the sibling links directly, so it needs no stack. Created by
/// [`NodeStore::descendants`].
#[derive(Debug)]
pub struct Descendants<'a> {
    store: &'a NodeStore,
    root: u32,
    current: u32,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.advance(idx);
        Some(self.store.id_at(idx))
    }
}

impl Descendants<'_> {
    fn advance(&self, idx: u32) -> u32 {
        let store = self.store;
        let first = store.first_child[idx as usize];
        if first != INVALID {
            return first;
        }
        // Climb until a node with a next sibling, stopping at the root.
        let mut cursor = idx;
        while cursor != self.root {
            let next = store.next_sibling[cursor as usize];
            if next != INVALID {
                return next;
            }
            cursor = store.parent[cursor as usize];
        }
        INVALID
    }
}

impl NodeStore {
    /// Returns an iterator over every descendant of `id` in depth-first
    /// pre-order, excluding `id` itself.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        self.validate(id);
        Descendants {
            store: self,
            root: id.idx,
            current: self.first_child[id.idx as usize],
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;

    #[test]
    fn descendants_are_pre_order() {
        let mut store = NodeStore::new();
        // root → {a → {a1 → {a1x}, a2}, b}
        let [root, a, a1, a1x, a2, b] = [(); 6].map(|()| store.create_node());
        store.add_child(root, a).unwrap();
        store.add_child(a, a1).unwrap();
        store.add_child(a1, a1x).unwrap();
        store.add_child(a, a2).unwrap();
        store.add_child(root, b).unwrap();

        let order: Vec<_> = store.descendants(root).collect();
        assert_eq!(order, vec![a, a1, a1x, a2, b]);

        // A subtree walk stops at its own root, even with later siblings.
        let order: Vec<_> = store.descendants(a1).collect();
        assert_eq!(order, vec![a1x]);
    }

    #[test]
    fn leaf_has_no_descendants() {
        let mut store = NodeStore::new();
        let leaf = store.create_node();
        assert_eq!(store.descendants(leaf).count(), 0);
        assert_eq!(store.children(leaf).count(), 0);
    }
}
