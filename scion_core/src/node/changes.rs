// Copyright 2026 the Scion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lifecycle and invalidation feed for external bookkeeping.
//!
//! Component systems and renderers that mirror the hierarchy drain this feed
//! once per tick instead of observing individual calls. The feed is purely
//! informational: world resolution never reads it.
//!
//! Lifecycle events carry [`NodeId`] handles. The invalidation lists use raw
//! slot indices (`u32`) collected from the [`understory_dirty`] channels, so
//! consumers can index their own parallel arrays directly; turn them back
//! into handles with [`NodeStore::handle_at`].

use alloc::vec::Vec;

use super::id::NodeId;
use super::store::NodeStore;
use crate::dirty;

/// A parent-child edge that was created or removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HierarchyEvent {
    /// The node that moved.
    pub node: NodeId,
    /// The parent it was inserted under or removed from.
    pub parent: NodeId,
}

/// Everything that happened to a [`NodeStore`] since the previous drain.
#[derive(Clone, Debug, Default)]
pub struct HierarchyChanges {
    /// Nodes created, in allocation order.
    pub created: Vec<NodeId>,
    /// Edges created, in call order.
    pub inserted: Vec<HierarchyEvent>,
    /// Edges removed, in call order. Edges torn down by
    /// [`destroy`](NodeStore::destroy) below the destroyed node are not
    /// listed.
    pub removed: Vec<HierarchyEvent>,
    /// Nodes destroyed, every descendant before its parent.
    pub destroyed: Vec<NodeId>,
    /// Slots whose world transform was invalidated, including descendants of
    /// directly touched nodes.
    pub transforms: Vec<u32>,
    /// Slots whose child list changed.
    pub topology: Vec<u32>,
}

impl HierarchyChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.created.clear();
        self.inserted.clear();
        self.removed.clear();
        self.destroyed.clear();
        self.transforms.clear();
        self.topology.clear();
    }

    /// Returns whether nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.created.is_empty()
            && self.inserted.is_empty()
            && self.removed.is_empty()
            && self.destroyed.is_empty()
            && self.transforms.is_empty()
            && self.topology.is_empty()
    }
}

impl NodeStore {
    /// Takes the accumulated change feed.
    pub fn drain_changes(&mut self) -> HierarchyChanges {
        let mut changes = HierarchyChanges::default();
        self.drain_changes_into(&mut changes);
        changes
    }

    /// Like [`drain_changes`](Self::drain_changes), but reuses a
    /// caller-provided buffer.
    pub fn drain_changes_into(&mut self, changes: &mut HierarchyChanges) {
        changes.clear();

        changes.transforms = self
            .dirty
            .drain(dirty::TRANSFORM)
            .affected()
            .deterministic()
            .run()
            .collect();
        changes.topology = self
            .dirty
            .drain(dirty::TOPOLOGY)
            .deterministic()
            .run()
            .collect();

        core::mem::swap(&mut self.pending_created, &mut changes.created);
        core::mem::swap(&mut self.pending_inserted, &mut changes.inserted);
        core::mem::swap(&mut self.pending_removed, &mut changes.removed);
        core::mem::swap(&mut self.pending_destroyed, &mut changes.destroyed);
    }
}
