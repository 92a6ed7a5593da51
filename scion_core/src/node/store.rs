// Copyright 2026 the Scion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays node storage with allocation and the local transform cache.

use alloc::vec::Vec;

use glam::{DMat4, DQuat, DVec3, EulerRot};
use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use super::changes::HierarchyEvent;
use super::id::{INVALID, NodeId};
use crate::dirty::{self, DirtyState};
use crate::transform::{LocalPose, ScaleSign};

/// Always-on work counters.
///
/// These count actual recomputation, so they can be used to assert that a
/// cached read or a repeated [`sync_hierarchy`](NodeStore::sync_hierarchy)
/// did no work.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Local matrices recomposed from their pose.
    pub local_recomputes: u64,
    /// World matrices recomposed from the ancestor chain.
    pub world_recomputes: u64,
    /// Nodes visited by enabled-state propagation.
    pub enabled_visits: u64,
}

/// Struct-of-arrays storage for all nodes.
///
/// Nodes are addressed by [`NodeId`] handles. Internally, each node occupies
/// a slot in parallel arrays. Destroyed nodes are recycled via a free list,
/// and generation counters prevent stale handle access.
#[derive(Debug)]
pub struct NodeStore {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) last_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,
    pub(crate) child_count: Vec<u32>,
    pub(crate) graph_depth: Vec<u32>,

    // -- Local state (set by callers) --
    pub(crate) local_pose: Vec<LocalPose>,
    pub(crate) scale_compensation: Vec<bool>,
    pub(crate) enabled: Vec<bool>,

    // -- Cached state --
    pub(crate) local_matrix: Vec<DMat4>,
    pub(crate) world_matrix: Vec<DMat4>,
    pub(crate) world_scale_sign: Vec<ScaleSign>,
    pub(crate) dirty_state: Vec<DirtyState>,
    pub(crate) enabled_in_hierarchy: Vec<bool>,
    pub(crate) frozen: Vec<bool>,
    pub(crate) frozen_count: u32,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) alive: Vec<bool>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,
    pub(crate) live: u32,

    // -- Change feed --
    pub(crate) dirty: DirtyTracker<u32>,
    pub(crate) pending_created: Vec<NodeId>,
    pub(crate) pending_inserted: Vec<HierarchyEvent>,
    pub(crate) pending_removed: Vec<HierarchyEvent>,
    pub(crate) pending_destroyed: Vec<NodeId>,

    pub(crate) stats: SyncStats,
    pub(crate) sync_passes: u64,
}

impl Default for NodeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeStore {
    /// Creates an empty node store.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty node store with room for `capacity` nodes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            parent: Vec::with_capacity(capacity),
            first_child: Vec::with_capacity(capacity),
            last_child: Vec::with_capacity(capacity),
            next_sibling: Vec::with_capacity(capacity),
            prev_sibling: Vec::with_capacity(capacity),
            child_count: Vec::with_capacity(capacity),
            graph_depth: Vec::with_capacity(capacity),
            local_pose: Vec::with_capacity(capacity),
            scale_compensation: Vec::with_capacity(capacity),
            enabled: Vec::with_capacity(capacity),
            local_matrix: Vec::with_capacity(capacity),
            world_matrix: Vec::with_capacity(capacity),
            world_scale_sign: Vec::with_capacity(capacity),
            dirty_state: Vec::with_capacity(capacity),
            enabled_in_hierarchy: Vec::with_capacity(capacity),
            frozen: Vec::with_capacity(capacity),
            frozen_count: 0,
            generation: Vec::with_capacity(capacity),
            alive: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            len: 0,
            live: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            pending_created: Vec::new(),
            pending_inserted: Vec::new(),
            pending_removed: Vec::new(),
            pending_destroyed: Vec::new(),
            stats: SyncStats::default(),
            sync_passes: 0,
        }
    }

    // -- Allocation API --

    /// Creates a new detached node and returns its handle.
    ///
    /// The node starts with an identity pose, enabled, not frozen, without
    /// scale compensation, and with clean caches (its world matrix is the
    /// identity).
    pub fn create_node(&mut self) -> NodeId {
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot. Its generation was bumped on destroy.
            let i = idx as usize;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.last_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.child_count[i] = 0;
            self.graph_depth[i] = 0;
            self.local_pose[i] = LocalPose::IDENTITY;
            self.scale_compensation[i] = false;
            self.enabled[i] = true;
            self.local_matrix[i] = DMat4::IDENTITY;
            self.world_matrix[i] = DMat4::IDENTITY;
            self.world_scale_sign[i] = ScaleSign::Unknown;
            self.dirty_state[i] = DirtyState::Clean;
            self.enabled_in_hierarchy[i] = true;
            self.set_frozen(idx, false);
            self.alive[i] = true;
            idx
        } else {
            // Allocate a new slot.
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.last_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.child_count.push(0);
            self.graph_depth.push(0);
            self.local_pose.push(LocalPose::IDENTITY);
            self.scale_compensation.push(false);
            self.enabled.push(true);
            self.local_matrix.push(DMat4::IDENTITY);
            self.world_matrix.push(DMat4::IDENTITY);
            self.world_scale_sign.push(ScaleSign::Unknown);
            self.dirty_state.push(DirtyState::Clean);
            self.enabled_in_hierarchy.push(true);
            self.frozen.push(false);
            self.generation.push(0);
            self.alive.push(true);
            idx
        };

        self.live += 1;
        let id = self.id_at(idx);
        self.pending_created.push(id);
        id
    }

    /// Creates a detached node with the given local pose.
    pub fn create_node_with_pose(&mut self, pose: LocalPose) -> NodeId {
        let id = self.create_node();
        self.set_local_pose(id, pose);
        id
    }

    /// Returns whether the given handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        id.idx < self.len
            && self.generation[id.idx as usize] == id.generation
            && self.alive[id.idx as usize]
    }

    /// Returns the number of live nodes.
    #[must_use]
    pub fn len(&self) -> u32 {
        self.live
    }

    /// Returns whether the store holds no live nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the current handle for raw slot `idx`, if that slot is live.
    ///
    /// Used to turn indices from [`HierarchyChanges`](super::HierarchyChanges)
    /// back into handles.
    #[must_use]
    pub fn handle_at(&self, idx: u32) -> Option<NodeId> {
        (idx < self.len && self.alive[idx as usize]).then(|| self.id_at(idx))
    }

    /// Returns handles of all root nodes (those with no parent), in slot order.
    #[must_use]
    pub fn roots(&self) -> Vec<NodeId> {
        (0..self.len)
            .filter(|&idx| self.alive[idx as usize] && self.parent[idx as usize] == INVALID)
            .map(|idx| self.id_at(idx))
            .collect()
    }

    /// Returns the work counters accumulated since creation or the last
    /// [`reset_stats`](Self::reset_stats).
    #[must_use]
    pub fn stats(&self) -> SyncStats {
        self.stats
    }

    /// Zeroes the work counters.
    pub fn reset_stats(&mut self) {
        self.stats = SyncStats::default();
    }

    // -- Local getters (read-only, no recomputation) --

    /// Returns the local pose of a node.
    #[must_use]
    pub fn local_pose(&self, id: NodeId) -> LocalPose {
        self.validate(id);
        self.local_pose[id.idx as usize]
    }

    /// Returns the position relative to the parent.
    #[must_use]
    pub fn local_position(&self, id: NodeId) -> DVec3 {
        self.local_pose(id).position
    }

    /// Returns the rotation relative to the parent.
    #[must_use]
    pub fn local_rotation(&self, id: NodeId) -> DQuat {
        self.local_pose(id).rotation
    }

    /// Returns the local scale.
    #[must_use]
    pub fn local_scale(&self, id: NodeId) -> DVec3 {
        self.local_pose(id).scale
    }

    /// Returns the local rotation as XYZ Euler angles in radians.
    #[must_use]
    pub fn local_euler_angles(&self, id: NodeId) -> DVec3 {
        let (x, y, z) = self.local_rotation(id).to_euler(EulerRot::XYZ);
        DVec3::new(x, y, z)
    }

    /// Returns the current dirty state of a node.
    #[must_use]
    pub fn dirty_state(&self, id: NodeId) -> DirtyState {
        self.validate(id);
        self.dirty_state[id.idx as usize]
    }

    // -- Local transform cache --

    /// Returns the composed local matrix.
    ///
    /// Recomposes it from the pose if the local cache is stale. A clean read
    /// has no side effects.
    pub fn local_transform(&mut self, id: NodeId) -> DMat4 {
        self.validate(id);
        let i = id.idx as usize;
        let state = self.dirty_state[i];
        if state.is_local_dirty() {
            self.local_matrix[i] = self.local_pose[i].to_matrix();
            self.dirty_state[i] = state.without_local();
            self.stats.local_recomputes += 1;
        }
        self.local_matrix[i]
    }

    // -- Local mutation API (auto-marks dirty) --

    /// Sets the position relative to the parent.
    pub fn set_local_position(&mut self, id: NodeId, position: DVec3) {
        self.validate(id);
        self.local_pose[id.idx as usize].position = position;
        self.touch_local(id.idx);
    }

    /// Sets the rotation relative to the parent.
    pub fn set_local_rotation(&mut self, id: NodeId, rotation: DQuat) {
        self.validate(id);
        self.local_pose[id.idx as usize].rotation = rotation;
        self.touch_local(id.idx);
    }

    /// Sets the local rotation from XYZ Euler angles in radians.
    pub fn set_local_euler_angles(&mut self, id: NodeId, angles: DVec3) {
        let rotation = DQuat::from_euler(EulerRot::XYZ, angles.x, angles.y, angles.z);
        self.set_local_rotation(id, rotation);
    }

    /// Sets the local scale.
    pub fn set_local_scale(&mut self, id: NodeId, scale: DVec3) {
        self.validate(id);
        self.local_pose[id.idx as usize].scale = scale;
        self.touch_local(id.idx);
    }

    /// Replaces the whole local pose.
    pub fn set_local_pose(&mut self, id: NodeId, pose: LocalPose) {
        self.validate(id);
        self.local_pose[id.idx as usize] = pose;
        self.touch_local(id.idx);
    }

    /// Moves the node by `offset` expressed in its own local axes.
    pub fn translate_local(&mut self, id: NodeId, offset: DVec3) {
        self.validate(id);
        let pose = &mut self.local_pose[id.idx as usize];
        pose.position += pose.rotation * offset;
        self.touch_local(id.idx);
    }

    /// Rotates the node by `rotation` about its own local axes.
    pub fn rotate_local(&mut self, id: NodeId, rotation: DQuat) {
        self.validate(id);
        let pose = &mut self.local_pose[id.idx as usize];
        pose.rotation *= rotation;
        self.touch_local(id.idx);
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: NodeId) {
        assert!(
            self.is_alive(id),
            "stale NodeId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    /// Builds the current handle for a live slot.
    #[inline]
    pub(crate) fn id_at(&self, idx: u32) -> NodeId {
        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Records a local pose change: feeds the TRANSFORM channel and runs the
    /// local dirtying step.
    pub(crate) fn touch_local(&mut self, idx: u32) {
        self.mark_transform_feed(idx);
        self.dirtify_local(idx);
    }

    /// Marks the local cache stale. The world cascade runs only on the
    /// transition out of a clean local cache, and only if the world cache is
    /// not already stale.
    fn dirtify_local(&mut self, idx: u32) {
        let state = self.dirty_state[idx as usize];
        if state.is_local_dirty() {
            return;
        }
        self.dirty_state[idx as usize] = state.with_local();
        if !state.is_world_dirty() {
            self.dirtify_world(idx);
        }
    }

    /// Marks `idx` and its descendants world-dirty.
    ///
    /// A node that becomes world-dirty can no longer be part of a frozen
    /// subtree, so the ancestor chain is unfrozen as well.
    pub(crate) fn dirtify_world(&mut self, idx: u32) {
        if !self.dirty_state[idx as usize].is_world_dirty() {
            self.unfreeze_parent_to_root(idx);
        }
        self.dirtify_world_internal(idx);
    }

    fn dirtify_world_internal(&mut self, idx: u32) {
        let mut stack = Vec::from([idx]);
        while let Some(node) = stack.pop() {
            let i = node as usize;
            self.world_scale_sign[i] = ScaleSign::Unknown;
            if self.dirty_state[i].is_world_dirty() {
                continue;
            }
            self.set_frozen(node, false);
            self.dirty_state[i] = self.dirty_state[i].with_world();
            let mut child = self.first_child[i];
            while child != INVALID {
                // Already-dirty children have dirty subtrees.
                if !self.dirty_state[child as usize].is_world_dirty() {
                    stack.push(child);
                }
                child = self.next_sibling[child as usize];
            }
        }
    }

    /// Clears `frozen` on every ancestor of `idx` (not on `idx` itself).
    pub(crate) fn unfreeze_parent_to_root(&mut self, idx: u32) {
        if self.frozen_count == 0 {
            return;
        }
        let mut p = self.parent[idx as usize];
        while p != INVALID {
            self.set_frozen(p, false);
            p = self.parent[p as usize];
        }
    }

    /// Writes the frozen flag of `idx`, keeping `frozen_count` in step.
    pub(crate) fn set_frozen(&mut self, idx: u32, frozen: bool) {
        let slot = &mut self.frozen[idx as usize];
        if *slot == frozen {
            return;
        }
        *slot = frozen;
        if frozen {
            self.frozen_count += 1;
        } else {
            self.frozen_count -= 1;
        }
    }

    /// Marks the TRANSFORM feed channel for `idx` and its descendants.
    pub(crate) fn mark_transform_feed(&mut self, idx: u32) {
        self.dirty.mark_with(idx, dirty::TRANSFORM, &EagerPolicy);
    }
}
