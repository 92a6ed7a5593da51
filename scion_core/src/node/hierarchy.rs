// Copyright 2026 the Scion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structural edits: insertion, removal, reparenting, and destruction.

use alloc::vec::Vec;

use understory_dirty::EagerPolicy;

use super::changes::HierarchyEvent;
use super::id::{INVALID, NodeId};
use super::store::NodeStore;
use super::traverse::Children;
use crate::dirty;
use crate::error::HierarchyError;
use crate::transform;

impl NodeStore {
    // -- Topology API --

    /// Appends `child` as the last child of `parent`.
    ///
    /// See [`insert_child`](Self::insert_child).
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), HierarchyError> {
        self.insert_child(parent, child, usize::MAX)
    }

    /// Inserts `child` into `parent`'s child list at `index`, or appends it if
    /// `index` is past the end.
    ///
    /// `child` is detached from its current parent first. Its subtree gets a
    /// new graph depth, a recomputed enabled cache, and a stale world cache;
    /// `parent` and its ancestors are unfrozen.
    ///
    /// # Errors
    ///
    /// Returns [`HierarchyError`] if `child` is `parent` or one of its
    /// ancestors. Nothing is changed in that case.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        child: NodeId,
        index: usize,
    ) -> Result<(), HierarchyError> {
        self.validate(parent);
        self.validate(child);
        self.check_adopt(parent.idx, child.idx)?;

        if self.parent[child.idx as usize] != INVALID {
            self.detach(child.idx);
        }
        self.link_at(parent.idx, child.idx, index);
        self.on_insert(parent.idx, child.idx);
        Ok(())
    }

    /// Removes `child` from `parent`.
    ///
    /// Returns `false` without effect if `child` is not a child of `parent`.
    /// The detached subtree keeps its enabled cache as it was.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        self.validate(parent);
        self.validate(child);
        if self.parent[child.idx as usize] != parent.idx {
            return false;
        }
        self.detach(child.idx);
        true
    }

    /// Detaches a node from its parent, returning the old parent.
    ///
    /// Returns `None` without effect if the node is already a root.
    pub fn remove_from_parent(&mut self, child: NodeId) -> Option<NodeId> {
        self.validate(child);
        let p = self.parent[child.idx as usize];
        if p == INVALID {
            return None;
        }
        self.detach(child.idx);
        Some(self.id_at(p))
    }

    /// Moves `node` under `new_parent` at `index` (appending when `None`), or
    /// makes it a root when `new_parent` is `None`.
    ///
    /// The local pose is kept, so the world pose generally changes.
    ///
    /// # Errors
    ///
    /// Same as [`insert_child`](Self::insert_child).
    pub fn reparent(
        &mut self,
        node: NodeId,
        new_parent: Option<NodeId>,
        index: Option<usize>,
    ) -> Result<(), HierarchyError> {
        match new_parent {
            Some(parent) => self.insert_child(parent, node, index.unwrap_or(usize::MAX)),
            None => {
                self.remove_from_parent(node);
                Ok(())
            }
        }
    }

    /// Like [`reparent`](Self::reparent), but rewrites the local position and
    /// rotation so the world position and rotation stay where they were.
    ///
    /// World scale is not preserved.
    ///
    /// # Errors
    ///
    /// Same as [`insert_child`](Self::insert_child).
    pub fn reparent_preserving_pose(
        &mut self,
        node: NodeId,
        new_parent: Option<NodeId>,
        index: Option<usize>,
    ) -> Result<(), HierarchyError> {
        self.validate(node);
        if let Some(parent) = new_parent {
            self.validate(parent);
            self.check_adopt(parent.idx, node.idx)?;
        }

        let position = self.position(node);
        let rotation = self.rotation(node);
        let c = node.idx;
        if self.parent[c as usize] != INVALID {
            self.detach(c);
        }

        let (local_position, local_rotation) = match new_parent {
            Some(parent) => {
                let parent_world = self.world_transform(parent);
                (
                    parent_world.inverse().transform_point3(position),
                    transform::rotation(&parent_world).inverse() * rotation,
                )
            }
            None => (position, rotation),
        };
        let pose = &mut self.local_pose[c as usize];
        pose.position = local_position;
        pose.rotation = local_rotation;
        self.touch_local(c);

        if let Some(parent) = new_parent {
            self.link_at(parent.idx, c, index.unwrap_or(usize::MAX));
            self.on_insert(parent.idx, c);
        }
        Ok(())
    }

    /// Destroys a node and its whole subtree, freeing their slots.
    ///
    /// The node is detached first. Children are destroyed depth-first, last
    /// child first, so [`HierarchyChanges::destroyed`](super::HierarchyChanges::destroyed)
    /// lists every descendant before its parent.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn destroy(&mut self, id: NodeId) {
        self.validate(id);
        if self.parent[id.idx as usize] != INVALID {
            self.detach(id.idx);
        }
        self.destroy_subtree(id.idx);
    }

    // -- Topology queries --

    /// Returns the parent of a node, if any.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        (p != INVALID).then(|| self.id_at(p))
    }

    /// Returns an iterator over the direct children of a node, in order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    /// Returns the number of direct children.
    #[must_use]
    pub fn child_count(&self, id: NodeId) -> usize {
        self.validate(id);
        self.child_count[id.idx as usize] as usize
    }

    /// Returns the child at `index`, if any.
    #[must_use]
    pub fn child_at(&self, parent: NodeId, index: usize) -> Option<NodeId> {
        self.children(parent).nth(index)
    }

    /// Returns the position of a node within its parent's child list.
    #[must_use]
    pub fn child_index(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).position(|c| c == id)
    }

    /// Returns the root of the tree containing `id` (possibly `id` itself).
    #[must_use]
    pub fn root_of(&self, id: NodeId) -> NodeId {
        self.validate(id);
        let mut cursor = id.idx;
        while self.parent[cursor as usize] != INVALID {
            cursor = self.parent[cursor as usize];
        }
        self.id_at(cursor)
    }

    /// Returns the number of edges between a node and its root.
    #[must_use]
    pub fn graph_depth(&self, id: NodeId) -> u32 {
        self.validate(id);
        self.graph_depth[id.idx as usize]
    }

    /// Returns whether `node` is a strict descendant of `ancestor`.
    #[must_use]
    pub fn is_descendant_of(&self, node: NodeId, ancestor: NodeId) -> bool {
        self.validate(node);
        self.validate(ancestor);
        self.has_ancestor(node.idx, ancestor.idx)
    }

    /// Returns whether `ancestor` is a strict ancestor of `node`.
    #[must_use]
    pub fn is_ancestor_of(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.is_descendant_of(node, ancestor)
    }

    // -- Internal helpers --

    fn has_ancestor(&self, idx: u32, ancestor: u32) -> bool {
        let mut cursor = self.parent[idx as usize];
        while cursor != INVALID {
            if cursor == ancestor {
                return true;
            }
            cursor = self.parent[cursor as usize];
        }
        false
    }

    /// Rejects edges that would make the tree cyclic.
    fn check_adopt(&self, parent: u32, child: u32) -> Result<(), HierarchyError> {
        if parent == child {
            return Err(HierarchyError::SelfParent(self.id_at(child)));
        }
        // A leaf cannot be an ancestor of anything.
        if self.first_child[child as usize] != INVALID && self.has_ancestor(parent, child) {
            return Err(HierarchyError::AncestorCycle {
                parent: self.id_at(parent),
                child: self.id_at(child),
            });
        }
        Ok(())
    }

    /// Splices a detached node into `parent`'s child list.
    fn link_at(&mut self, parent: u32, child: u32, index: usize) {
        let (p, c) = (parent as usize, child as usize);
        self.parent[c] = parent;

        if index >= self.child_count[p] as usize {
            // Append.
            let last = self.last_child[p];
            self.prev_sibling[c] = last;
            self.next_sibling[c] = INVALID;
            if last == INVALID {
                self.first_child[p] = child;
            } else {
                self.next_sibling[last as usize] = child;
            }
            self.last_child[p] = child;
        } else {
            let mut sibling = self.first_child[p];
            for _ in 0..index {
                sibling = self.next_sibling[sibling as usize];
            }
            let prev = self.prev_sibling[sibling as usize];
            self.prev_sibling[c] = prev;
            self.next_sibling[c] = sibling;
            self.prev_sibling[sibling as usize] = child;
            if prev == INVALID {
                self.first_child[p] = child;
            } else {
                self.next_sibling[prev as usize] = child;
            }
        }
        self.child_count[p] += 1;
    }

    /// Removes `idx` from its parent's child list without touching any
    /// cached state.
    fn unlink(&mut self, idx: u32) {
        let i = idx as usize;
        let p = self.parent[i] as usize;
        let prev = self.prev_sibling[i];
        let next = self.next_sibling[i];

        if prev == INVALID {
            self.first_child[p] = next;
        } else {
            self.next_sibling[prev as usize] = next;
        }
        if next == INVALID {
            self.last_child[p] = prev;
        } else {
            self.prev_sibling[next as usize] = prev;
        }
        self.child_count[p] -= 1;

        self.parent[i] = INVALID;
        self.prev_sibling[i] = INVALID;
        self.next_sibling[i] = INVALID;
    }

    /// Bookkeeping after `child` was linked under `parent`.
    fn on_insert(&mut self, parent: u32, child: u32) {
        let (p, c) = (parent as usize, child as usize);

        let inherited = self.enabled[c] && self.enabled[p] && self.enabled_in_hierarchy[p];
        if inherited != self.enabled_in_hierarchy[c] {
            self.broadcast_enabled(child, inherited);
        }
        self.set_subtree_depth(child, self.graph_depth[p] + 1);

        let _ = self.dirty.add_dependency(child, parent, dirty::TRANSFORM);
        self.dirty.mark(parent, dirty::TOPOLOGY);
        self.dirty.mark_with(child, dirty::TRANSFORM, &EagerPolicy);
        self.dirtify_world(child);
        if self.frozen[p] {
            self.unfreeze_parent_to_root(child);
        }

        let event = HierarchyEvent {
            node: self.id_at(child),
            parent: self.id_at(parent),
        };
        log::debug!("inserted {:?} under {:?}", event.node, event.parent);
        self.pending_inserted.push(event);
    }

    /// Detaches a parented node and makes it a clean-slate root.
    ///
    /// The enabled cache of the detached subtree is left untouched.
    fn detach(&mut self, idx: u32) {
        let parent = self.parent[idx as usize];
        self.unlink(idx);
        self.dirty.remove_dependency(idx, parent, dirty::TRANSFORM);
        self.dirty.mark(parent, dirty::TOPOLOGY);

        self.mark_transform_feed(idx);
        self.dirtify_world(idx);
        self.set_subtree_depth(idx, 0);

        let event = HierarchyEvent {
            node: self.id_at(idx),
            parent: self.id_at(parent),
        };
        log::debug!("removed {:?} from {:?}", event.node, event.parent);
        self.pending_removed.push(event);
    }

    fn set_subtree_depth(&mut self, idx: u32, depth: u32) {
        let mut stack = Vec::from([(idx, depth)]);
        while let Some((node, depth)) = stack.pop() {
            self.graph_depth[node as usize] = depth;
            let mut child = self.first_child[node as usize];
            while child != INVALID {
                stack.push((child, depth + 1));
                child = self.next_sibling[child as usize];
            }
        }
    }

    /// Frees `idx` and all its descendants, children before their parent.
    /// `idx` must already be a root or be unlinked by the caller.
    fn destroy_subtree(&mut self, idx: u32) {
        let mut stack = Vec::from([idx]);
        while let Some(&node) = stack.last() {
            let child = self.last_child[node as usize];
            if child != INVALID {
                self.unlink(child);
                self.dirty.remove_dependency(child, node, dirty::TRANSFORM);
                stack.push(child);
                continue;
            }
            stack.pop();
            self.free_slot(node);
        }
    }

    fn free_slot(&mut self, idx: u32) {
        let id = self.id_at(idx);
        log::debug!("destroyed {id:?}");
        self.pending_destroyed.push(id);
        self.dirty.remove_key(idx);

        let i = idx as usize;
        // Bump generation so old handles immediately fail validation.
        self.generation[i] = self.generation[i].wrapping_add(1);
        self.alive[i] = false;
        self.set_frozen(idx, false);
        self.free_list.push(idx);
        self.live -= 1;
    }
}
