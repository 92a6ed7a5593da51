// Copyright 2026 the Scion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-tick synchronization pass that freezes stable subtrees.
//!
//! A frozen node has a resolved world matrix and so does everything below
//! it. Any mutation that could change such a result clears `frozen` on the
//! affected node and on every ancestor, so the next pass walks back down to
//! it while still skipping untouched sibling subtrees.

use alloc::vec::Vec;

use super::id::{INVALID, NodeId};
use super::store::NodeStore;
use crate::trace::{SkipReason, SubtreeSkipEvent, SyncBeginEvent, SyncSummary, Tracer};

impl NodeStore {
    /// Resolves and freezes every enabled subtree under `root`.
    ///
    /// Meant to run once per tick. A pass over a tree that has not changed
    /// since the previous pass recomputes nothing.
    pub fn sync_hierarchy(&mut self, root: NodeId) -> SyncSummary {
        self.sync_hierarchy_traced(root, &mut Tracer::none())
    }

    /// Like [`sync_hierarchy`](Self::sync_hierarchy), reporting progress to
    /// `tracer`.
    pub fn sync_hierarchy_traced(&mut self, root: NodeId, tracer: &mut Tracer<'_>) -> SyncSummary {
        self.validate(root);
        let tick = self.sync_passes;
        self.sync_passes += 1;

        tracer.sync_begin(&SyncBeginEvent {
            tick,
            root: root.idx,
            node_count: self.len(),
        });

        let before = self.stats.world_recomputes;
        let mut summary = SyncSummary {
            tick,
            ..SyncSummary::default()
        };
        self.sync_subtree(root.idx, &mut summary, tracer);
        summary.world_recomputes = self.stats.world_recomputes - before;

        log::trace!(
            "sync #{tick}: froze {}, recomputed {}",
            summary.frozen,
            summary.world_recomputes
        );
        tracer.sync_end(&summary);
        summary
    }

    /// Returns whether a node is currently frozen.
    #[must_use]
    pub fn is_frozen(&self, id: NodeId) -> bool {
        self.validate(id);
        self.frozen[id.idx as usize]
    }

    fn sync_subtree(&mut self, idx: u32, summary: &mut SyncSummary, tracer: &mut Tracer<'_>) {
        let mut stack = Vec::from([idx]);
        while let Some(node) = stack.pop() {
            let i = node as usize;
            // The local flag decides; the hierarchy cache may be stale.
            if !self.enabled[i] {
                summary.skipped_disabled += 1;
                tracer.subtree_skip(&SubtreeSkipEvent {
                    node,
                    reason: SkipReason::Disabled,
                });
                continue;
            }
            if self.frozen[i] {
                summary.skipped_frozen += 1;
                tracer.subtree_skip(&SubtreeSkipEvent {
                    node,
                    reason: SkipReason::Frozen,
                });
                continue;
            }

            if !self.dirty_state[i].is_clean() {
                self.resolve_world(node, tracer);
            }
            self.set_frozen(node, true);
            summary.frozen += 1;

            // Pushed last to first so children are visited in order.
            let mut child = self.last_child[i];
            while child != INVALID {
                stack.push(child);
                child = self.prev_sibling[child as usize];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::DVec3;

    use super::*;
    use crate::dirty::DirtyState;

    /// root → {a → {a1, a2}, b → {b1}}
    fn rig(store: &mut NodeStore) -> [NodeId; 6] {
        let ids = [(); 6].map(|()| store.create_node());
        let [root, a, a1, a2, b, b1] = ids;
        store.add_child(root, a).unwrap();
        store.add_child(a, a1).unwrap();
        store.add_child(a, a2).unwrap();
        store.add_child(root, b).unwrap();
        store.add_child(b, b1).unwrap();
        for (n, &id) in ids.iter().enumerate() {
            store.set_local_position(id, DVec3::new(n as f64, 0.0, 0.0));
        }
        ids
    }

    #[test]
    fn first_pass_resolves_and_freezes_everything() {
        let mut store = NodeStore::new();
        let ids = rig(&mut store);
        let summary = store.sync_hierarchy(ids[0]);
        assert_eq!(summary.tick, 0);
        assert_eq!(summary.frozen, 6);
        assert_eq!(summary.world_recomputes, 6);
        for id in ids {
            assert!(store.is_frozen(id));
            assert_eq!(store.dirty_state(id), DirtyState::Clean);
        }
    }

    #[test]
    fn second_pass_is_idle() {
        let mut store = NodeStore::new();
        let ids = rig(&mut store);
        store.sync_hierarchy(ids[0]);
        store.reset_stats();

        let summary = store.sync_hierarchy(ids[0]);
        assert_eq!(summary.tick, 1);
        assert!(summary.is_idle());
        assert_eq!(summary.skipped_frozen, 1);
        assert_eq!(store.stats().world_recomputes, 0);
    }

    #[test]
    fn mutation_reopens_only_the_touched_branch() {
        let mut store = NodeStore::new();
        let [root, a, a1, a2, b, b1] = rig(&mut store);
        store.sync_hierarchy(root);

        store.set_local_position(a1, DVec3::Y);
        assert!(!store.is_frozen(a1));
        assert!(!store.is_frozen(a));
        assert!(!store.is_frozen(root));
        assert!(store.is_frozen(a2));
        assert!(store.is_frozen(b));

        let summary = store.sync_hierarchy(root);
        assert_eq!(summary.frozen, 3);
        assert_eq!(summary.world_recomputes, 1);
        assert_eq!(summary.skipped_frozen, 2);
        assert!(store.is_frozen(b1));
    }

    #[test]
    fn disabled_subtrees_are_skipped() {
        let mut store = NodeStore::new();
        let [root, a, a1, a2, b, b1] = rig(&mut store);
        store.set_enabled(b, false);

        let summary = store.sync_hierarchy(root);
        assert_eq!(summary.skipped_disabled, 1);
        assert_eq!(summary.frozen, 4);
        assert!(!store.is_frozen(b));
        assert!(store.dirty_state(b1).is_world_dirty());
        assert!(store.is_frozen(a1) && store.is_frozen(a2) && store.is_frozen(a));
    }

    #[test]
    fn reads_between_passes_do_not_unfreeze() {
        let mut store = NodeStore::new();
        let ids = rig(&mut store);
        store.sync_hierarchy(ids[0]);
        let _ = store.world_transform(ids[5]);
        let _ = store.local_transform(ids[3]);
        assert!(ids.iter().all(|&id| store.is_frozen(id)));
    }

    #[cfg(feature = "trace")]
    #[test]
    fn traced_pass_reports_skips() {
        use alloc::vec::Vec;

        use crate::trace::{TraceSink, WorldRecomputeEvent};

        #[derive(Default)]
        struct Collect {
            recomputed: Vec<u32>,
            skipped: Vec<(u32, SkipReason)>,
            ended: Option<SyncSummary>,
        }

        impl TraceSink for Collect {
            fn on_world_recompute(&mut self, e: &WorldRecomputeEvent) {
                self.recomputed.push(e.node);
            }
            fn on_subtree_skip(&mut self, e: &SubtreeSkipEvent) {
                self.skipped.push((e.node, e.reason));
            }
            fn on_sync_end(&mut self, s: &SyncSummary) {
                self.ended = Some(*s);
            }
        }

        let mut store = NodeStore::new();
        let [root, a, _a1, _a2, b, _b1] = rig(&mut store);
        store.set_enabled(b, false);

        let mut sink = Collect::default();
        let summary = store.sync_hierarchy_traced(root, &mut Tracer::new(&mut sink));
        assert_eq!(sink.recomputed.len(), 4);
        assert_eq!(sink.recomputed[0], root.index());
        assert_eq!(sink.skipped, [(b.index(), SkipReason::Disabled)]);
        assert_eq!(sink.ended, Some(summary));

        store.set_local_position(a, DVec3::Z);
        let mut sink = Collect::default();
        store.sync_hierarchy_traced(root, &mut Tracer::new(&mut sink));
        assert_eq!(sink.recomputed.len(), 3);
        assert_eq!(sink.skipped, [(b.index(), SkipReason::Disabled)]);
    }
}
