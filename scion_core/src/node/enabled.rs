// Copyright 2026 the Scion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Push-based propagation of the enabled-in-hierarchy cache.
//!
//! Each node carries a local `enabled` intent and a cached
//! `enabled_in_hierarchy` flag. The cache is written only by
//! [`NodeStore::set_enabled`] and by insertion, never recomputed on read.
//!
//! Propagation does not descend into children that are locally disabled.
//! Their subtrees keep whatever cache they had, which can leave a deep cache
//! stale after a later change further up the tree. Callers that need the
//! strict answer should combine [`NodeStore::is_enabled_locally`] along the
//! ancestor chain.

use alloc::vec::Vec;

use super::id::{INVALID, NodeId};
use super::store::NodeStore;

impl NodeStore {
    /// Sets the local enabled intent of a node.
    ///
    /// Disabling always pushes `false` into the subtree. Enabling pushes
    /// `true` only when the parent is itself effectively enabled (roots
    /// always are).
    pub fn set_enabled(&mut self, id: NodeId, enabled: bool) {
        self.validate(id);
        let i = id.idx as usize;
        if self.enabled[i] == enabled {
            return;
        }
        self.enabled[i] = enabled;
        log::debug!("{id:?} enabled = {enabled}");

        let parent = self.parent[i];
        let parent_enabled = parent == INVALID
            || (self.enabled[parent as usize] && self.enabled_in_hierarchy[parent as usize]);
        if !enabled || parent_enabled {
            self.broadcast_enabled(id.idx, enabled);
        }
    }

    /// Returns whether a node is effectively enabled: its local flag and its
    /// cached hierarchy flag are both set.
    #[must_use]
    pub fn is_enabled(&self, id: NodeId) -> bool {
        self.validate(id);
        let i = id.idx as usize;
        self.enabled[i] && self.enabled_in_hierarchy[i]
    }

    /// Returns the local enabled intent, ignoring ancestors.
    #[must_use]
    pub fn is_enabled_locally(&self, id: NodeId) -> bool {
        self.validate(id);
        self.enabled[id.idx as usize]
    }

    /// Returns the raw cached hierarchy flag.
    #[must_use]
    pub fn enabled_in_hierarchy(&self, id: NodeId) -> bool {
        self.validate(id);
        self.enabled_in_hierarchy[id.idx as usize]
    }

    /// Writes `enabled` into the cache of `idx` and of every descendant
    /// reachable through locally enabled children.
    pub(crate) fn broadcast_enabled(&mut self, idx: u32, enabled: bool) {
        // The flag records that every ancestor of the node is already unfrozen.
        let mut stack = Vec::from([(idx, false)]);
        while let Some((node, ancestors_unfrozen)) = stack.pop() {
            let i = node as usize;
            self.stats.enabled_visits += 1;
            self.enabled_in_hierarchy[i] = enabled;
            let unfreezes = enabled && !self.frozen[i];
            if unfreezes && !ancestors_unfrozen {
                self.unfreeze_parent_to_root(node);
            }

            let mut child = self.first_child[i];
            while child != INVALID {
                if self.enabled[child as usize] {
                    stack.push((child, unfreezes));
                }
                child = self.next_sibling[child as usize];
            }
        }
    }
}
