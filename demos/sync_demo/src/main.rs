// Copyright 2026 the Scion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated tick loop that exercises the synchronization and diagnostics
//! pipeline.
//!
//! Builds a small articulated rig (a body carrying an arm and a turret with a
//! scale-compensated sight), then runs a few ticks of
//! [`sync_hierarchy`](scion_core::node::NodeStore::sync_hierarchy) through a
//! [`PrettyPrintSink`](scion_debug::pretty::PrettyPrintSink). Each tick mutates
//! a different part of the rig so the output shows which subtrees are
//! recomputed and which stay frozen.
//!
//! Run with `RUST_LOG=debug` to also see structural mutations.

use glam::{DQuat, DVec3};
use scion_core::node::{NodeId, NodeStore};
use scion_core::trace::Tracer;
use scion_core::transform::LocalPose;
use scion_debug::dump::dump_tree;
use scion_debug::pretty::PrettyPrintSink;

const TICK_COUNT: u64 = 6;

struct Rig {
    body: NodeId,
    arm: NodeId,
    hand: NodeId,
    turret: NodeId,
    sight: NodeId,
}

fn build_rig(store: &mut NodeStore) -> Rig {
    let body = store.create_node_with_pose(LocalPose::from_scale(DVec3::new(2.0, 1.0, 3.0)));
    let arm = store.create_node_with_pose(LocalPose::from_position(DVec3::new(1.0, 0.5, 0.0)));
    let hand = store.create_node_with_pose(LocalPose::from_position(DVec3::new(0.0, -1.0, 0.0)));
    let turret = store.create_node_with_pose(LocalPose::from_position(DVec3::new(0.0, 1.0, 0.0)));
    let sight = store.create_node_with_pose(LocalPose::from_position(DVec3::new(0.0, 0.25, 0.5)));

    let edges = [(body, arm), (arm, hand), (body, turret), (turret, sight)];
    for (parent, child) in edges {
        if let Err(err) = store.add_child(parent, child) {
            log::error!("rig assembly failed: {err}");
        }
    }
    // The sight keeps its own proportions regardless of the body's stretch.
    store.set_scale_compensation(sight, true);

    Rig {
        body,
        arm,
        hand,
        turret,
        sight,
    }
}

fn main() {
    env_logger::init();

    let mut store = NodeStore::with_capacity(8);
    let rig = build_rig(&mut store);
    let mut pretty = PrettyPrintSink::new(Box::new(std::io::stdout()));

    for tick in 0..TICK_COUNT {
        match tick {
            1 => store.rotate_local(rig.arm, DQuat::from_rotation_z(0.4)),
            2 => store.look_at(rig.turret, DVec3::new(5.0, 1.0, -5.0), DVec3::Y),
            3 => store.set_enabled(rig.arm, false),
            4 => {
                let spare = store.create_node();
                if let Err(err) = store.reparent_preserving_pose(rig.hand, Some(spare), None) {
                    log::error!("reparent failed: {err}");
                }
            }
            _ => {}
        }

        let summary = store.sync_hierarchy_traced(rig.body, &mut Tracer::new(&mut pretty));
        let changes = store.drain_changes();
        log::info!(
            "tick {}: {} transforms invalidated, {} inserted, {} removed",
            summary.tick,
            changes.transforms.len(),
            changes.inserted.len(),
            changes.removed.len(),
        );
    }

    println!();
    print!("{}", dump_tree(&mut store, rig.body));
    println!(
        "sight world scale: {:.2} (body scale {:.2})",
        store.scale(rig.sight),
        store.scale(rig.body),
    );
    println!("{:?}", store.stats());
}
