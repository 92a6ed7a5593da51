// Copyright 2026 the Scion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pull-based world resolution and world-space accessors.
//!
//! World matrices are resolved lazily: a read walks up from the node to the
//! nearest clean ancestor, then recomposes the stale chain top-down. Because
//! world dirtying always cascades to the whole subtree, a clean node never
//! has a stale ancestor, so the walk can stop at the first clean node.

use alloc::vec::Vec;

use glam::{DMat4, DQuat, DVec3, EulerRot};

use super::id::{INVALID, NodeId};
use super::store::NodeStore;
use crate::dirty::DirtyState;
use crate::trace::{Tracer, WorldRecomputeEvent};
use crate::transform::{self, ScaleSign};

impl NodeStore {
    /// Returns the world matrix of a node, resolving stale caches first.
    pub fn world_transform(&mut self, id: NodeId) -> DMat4 {
        self.validate(id);
        self.resolve_world(id.idx, &mut Tracer::none());
        self.world_matrix[id.idx as usize]
    }

    /// Returns the world-space position.
    pub fn position(&mut self, id: NodeId) -> DVec3 {
        transform::translation(&self.world_transform(id))
    }

    /// Returns the world-space rotation.
    pub fn rotation(&mut self, id: NodeId) -> DQuat {
        transform::rotation(&self.world_transform(id))
    }

    /// Returns the world-space axis scale (column lengths, always
    /// non-negative).
    pub fn scale(&mut self, id: NodeId) -> DVec3 {
        transform::axis_scale(&self.world_transform(id))
    }

    /// Returns the world-space rotation as XYZ Euler angles in radians.
    pub fn euler_angles(&mut self, id: NodeId) -> DVec3 {
        let (x, y, z) = self.rotation(id).to_euler(EulerRot::XYZ);
        DVec3::new(x, y, z)
    }

    /// Returns the world-space forward direction (−Z).
    pub fn forward(&mut self, id: NodeId) -> DVec3 {
        (-self.world_transform(id).z_axis.truncate()).normalize()
    }

    /// Returns the world-space right direction (+X).
    pub fn right(&mut self, id: NodeId) -> DVec3 {
        self.world_transform(id).x_axis.truncate().normalize()
    }

    /// Returns the world-space up direction (+Y).
    pub fn up(&mut self, id: NodeId) -> DVec3 {
        self.world_transform(id).y_axis.truncate().normalize()
    }

    /// Returns whether the world matrix mirrors space.
    ///
    /// Computed from the determinant on first request and cached until the
    /// world matrix next becomes stale.
    pub fn world_scale_sign(&mut self, id: NodeId) -> ScaleSign {
        let world = self.world_transform(id);
        let i = id.idx as usize;
        if self.world_scale_sign[i] == ScaleSign::Unknown {
            self.world_scale_sign[i] = transform::scale_sign(&world);
        }
        self.world_scale_sign[i]
    }

    /// Transforms a point from the node's local space into world space.
    pub fn transform_point(&mut self, id: NodeId, point: DVec3) -> DVec3 {
        self.world_transform(id).transform_point3(point)
    }

    /// Transforms a point from world space into the node's local space.
    pub fn inverse_transform_point(&mut self, id: NodeId, point: DVec3) -> DVec3 {
        self.world_transform(id).inverse().transform_point3(point)
    }

    // -- World-space mutation --

    /// Moves the node so its world position becomes `position`.
    pub fn set_position(&mut self, id: NodeId, position: DVec3) {
        self.validate(id);
        let parent = self.parent[id.idx as usize];
        let local = if parent == INVALID {
            position
        } else {
            let parent_world = self.world_transform(self.id_at(parent));
            parent_world.inverse().transform_point3(position)
        };
        self.set_local_position(id, local);
    }

    /// Turns the node so its world rotation becomes `rotation`.
    pub fn set_rotation(&mut self, id: NodeId, rotation: DQuat) {
        self.validate(id);
        let parent = self.parent[id.idx as usize];
        let local = if parent == INVALID {
            rotation
        } else {
            let parent_rotation = self.rotation(self.id_at(parent));
            parent_rotation.inverse() * rotation
        };
        self.set_local_rotation(id, local);
    }

    /// Sets world position and rotation together.
    pub fn set_position_and_rotation(&mut self, id: NodeId, position: DVec3, rotation: DQuat) {
        self.set_position(id, position);
        self.set_rotation(id, rotation);
    }

    /// Sets the world rotation from XYZ Euler angles in radians.
    pub fn set_euler_angles(&mut self, id: NodeId, angles: DVec3) {
        let rotation = DQuat::from_euler(EulerRot::XYZ, angles.x, angles.y, angles.z);
        self.set_rotation(id, rotation);
    }

    /// Moves the node by a world-space offset.
    pub fn translate(&mut self, id: NodeId, offset: DVec3) {
        let position = self.position(id);
        self.set_position(id, position + offset);
    }

    /// Rotates the node by a world-space rotation.
    pub fn rotate(&mut self, id: NodeId, rotation: DQuat) {
        self.validate(id);
        let parent = self.parent[id.idx as usize];
        let local = if parent == INVALID {
            rotation * self.local_pose[id.idx as usize].rotation
        } else {
            let world_rotation = self.rotation(id);
            let parent_rotation = self.rotation(self.id_at(parent));
            parent_rotation.inverse() * rotation * world_rotation
        };
        self.set_local_rotation(id, local);
    }

    /// Turns the node so its forward (−Z) axis points at `target`.
    pub fn look_at(&mut self, id: NodeId, target: DVec3, up: DVec3) {
        let eye = self.position(id);
        self.set_rotation(id, transform::look_rotation(eye, target, up));
    }

    // -- Scale compensation --

    /// Opts a node in or out of ignoring its parent's scale.
    pub fn set_scale_compensation(&mut self, id: NodeId, enabled: bool) {
        self.validate(id);
        let i = id.idx as usize;
        if self.scale_compensation[i] != enabled {
            self.scale_compensation[i] = enabled;
            self.mark_transform_feed(id.idx);
            self.dirtify_world(id.idx);
        }
    }

    /// Returns whether a node ignores its parent's scale.
    #[must_use]
    pub fn scale_compensation(&self, id: NodeId) -> bool {
        self.validate(id);
        self.scale_compensation[id.idx as usize]
    }

    // -- Resolution internals --

    /// Brings the world cache of `idx` and all its stale ancestors up to date.
    pub(crate) fn resolve_world(&mut self, idx: u32, tracer: &mut Tracer<'_>) {
        let mut chain = Vec::new();
        let mut cursor = idx;
        while cursor != INVALID && !self.dirty_state[cursor as usize].is_clean() {
            chain.push(cursor);
            cursor = self.parent[cursor as usize];
        }
        for &node in chain.iter().rev() {
            self.sync_node(node, tracer);
        }
    }

    /// Recomposes one node. The parent's world cache must already be clean.
    fn sync_node(&mut self, idx: u32, tracer: &mut Tracer<'_>) {
        let i = idx as usize;
        let state = self.dirty_state[i];
        let local_recomputed = state.is_local_dirty();
        if local_recomputed {
            self.local_matrix[i] = self.local_pose[i].to_matrix();
            self.stats.local_recomputes += 1;
        }
        if state.is_clean() {
            return;
        }

        let parent = self.parent[i];
        let compensated = parent != INVALID && self.scale_compensation[i];
        self.world_matrix[i] = if parent == INVALID {
            self.local_matrix[i]
        } else if compensated {
            self.compensated_world(idx)
        } else {
            self.world_matrix[parent as usize] * self.local_matrix[i]
        };
        self.dirty_state[i] = DirtyState::Clean;
        self.stats.world_recomputes += 1;

        tracer.world_recompute(&WorldRecomputeEvent {
            node: idx,
            depth: self.graph_depth[i],
            local_recomputed,
            scale_compensated: compensated,
        });
    }

    /// World matrix for a node that ignores its parent's scale.
    ///
    /// Rotation and position still follow the parent. The scale comes from
    /// the scale source (see [`scale_source`](Self::scale_source)) times the
    /// node's own local scale.
    fn compensated_world(&self, idx: u32) -> DMat4 {
        let i = idx as usize;
        let parent = self.parent[i] as usize;
        let local = self.local_pose[i];
        let parent_world = self.world_matrix[parent];
        let parent_rotation = transform::rotation(&parent_world);

        let source_scale = self
            .scale_source(parent as u32)
            .map(|s| transform::axis_scale(&self.world_matrix[s as usize]));
        let scale = source_scale.map_or(local.scale, |s| s * local.scale);

        // A compensated parent places children using its own compensated
        // scale rather than whatever its world matrix carries.
        let basis = if self.scale_compensation[parent] {
            let parent_scale = self.local_pose[parent].scale;
            DMat4::from_scale_rotation_translation(
                source_scale.map_or(parent_scale, |s| s * parent_scale),
                parent_rotation,
                transform::translation(&parent_world),
            )
        } else {
            parent_world
        };

        DMat4::from_scale_rotation_translation(
            scale,
            parent_rotation * local.rotation,
            basis.transform_point3(local.position),
        )
    }

    /// Finds the node whose world scale a compensated child of `parent`
    /// inherits: the parent of the nearest uncompensated node at or above
    /// `parent`.
    fn scale_source(&self, parent: u32) -> Option<u32> {
        let mut cursor = parent;
        while cursor != INVALID && self.scale_compensation[cursor as usize] {
            cursor = self.parent[cursor as usize];
        }
        if cursor == INVALID {
            return None;
        }
        let source = self.parent[cursor as usize];
        (source != INVALID).then_some(source)
    }
}
