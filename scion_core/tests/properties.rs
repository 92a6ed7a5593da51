// Copyright 2026 the Scion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Whole-store properties checked against randomized trees.

use glam::{DMat4, DQuat, DVec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use scion_core::node::{NodeId, NodeStore};
use scion_core::transform::LocalPose;

const EPS: f64 = 1e-6;

fn random_pose(rng: &mut StdRng) -> LocalPose {
    let axis = DVec3::new(
        rng.gen_range(-1.0..1.0),
        rng.gen_range(-1.0..1.0),
        rng.gen_range(-1.0..1.0),
    )
    .try_normalize()
    .unwrap_or(DVec3::Y);
    LocalPose {
        position: DVec3::new(
            rng.gen_range(-5.0..5.0),
            rng.gen_range(-5.0..5.0),
            rng.gen_range(-5.0..5.0),
        ),
        rotation: DQuat::from_axis_angle(axis, rng.gen_range(-3.0..3.0)),
        scale: DVec3::new(
            rng.gen_range(0.8..1.25),
            rng.gen_range(0.8..1.25),
            rng.gen_range(0.8..1.25),
        ),
    }
}

/// Builds a random forest: node `i` is attached under a random earlier node
/// or left as a root.
fn random_forest(rng: &mut StdRng, len: usize) -> (NodeStore, Vec<NodeId>) {
    let mut store = NodeStore::with_capacity(len);
    let mut ids = Vec::with_capacity(len);
    for i in 0..len {
        let id = store.create_node_with_pose(random_pose(rng));
        if i > 0 && rng.gen_bool(0.85) {
            let parent = ids[rng.gen_range(0..i)];
            store.add_child(parent, id).unwrap();
        }
        ids.push(id);
    }
    (store, ids)
}

/// Recomposes the world matrix from scratch along the ancestor chain.
fn brute_force_world(store: &NodeStore, id: NodeId) -> DMat4 {
    let mut world = store.local_pose(id).to_matrix();
    let mut cursor = store.parent(id);
    while let Some(parent) = cursor {
        world = store.local_pose(parent).to_matrix() * world;
        cursor = store.parent(parent);
    }
    world
}

fn assert_all_match_brute_force(store: &mut NodeStore, ids: &[NodeId]) {
    for &id in ids {
        let expected = brute_force_world(store, id);
        let got = store.world_transform(id);
        assert!(
            got.abs_diff_eq(expected, EPS),
            "{id:?}: cached {got:?} != recomposed {expected:?}"
        );
    }
}

#[test]
fn world_matches_brute_force_under_random_edits() {
    let mut rng = StdRng::seed_from_u64(0x5c10_0001);
    let (mut store, ids) = random_forest(&mut rng, 40);
    assert_all_match_brute_force(&mut store, &ids);

    for round in 0..200 {
        let id = ids[rng.gen_range(0..ids.len())];
        match rng.gen_range(0..6) {
            0 => store.set_local_position(id, random_pose(&mut rng).position),
            1 => store.set_local_rotation(id, random_pose(&mut rng).rotation),
            2 => store.set_local_scale(id, random_pose(&mut rng).scale),
            3 => store.translate_local(id, DVec3::new(0.5, -0.25, 1.0)),
            4 => store.rotate_local(id, DQuat::from_rotation_y(0.3)),
            _ => {
                let parent = ids[rng.gen_range(0..ids.len())];
                // Cyclic requests are rejected and leave the tree intact.
                let _ = store.reparent(id, Some(parent), Some(rng.gen_range(0..4)));
            }
        }
        // Read a random subset between edits so that partially clean trees
        // are exercised too.
        if round % 3 == 0 {
            let sample = ids[rng.gen_range(0..ids.len())];
            let _ = store.world_transform(sample);
        }
        if round % 20 == 0 {
            store.sync_hierarchy(store.root_of(id));
        }
    }
    assert_all_match_brute_force(&mut store, &ids);
}

#[test]
fn repeated_reads_are_identical_and_free() {
    let mut rng = StdRng::seed_from_u64(7);
    let (mut store, ids) = random_forest(&mut rng, 25);
    for &id in &ids {
        let first = store.world_transform(id);
        let local = store.local_transform(id);
        let stats = store.stats();

        let second = store.world_transform(id);
        assert_eq!(first.to_cols_array(), second.to_cols_array());
        assert_eq!(local.to_cols_array(), store.local_transform(id).to_cols_array());
        assert_eq!(store.stats(), stats, "second read of {id:?} recomputed");
    }
}

#[test]
fn root_set_position_round_trips() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut store = NodeStore::new();
    let root = store.create_node_with_pose(random_pose(&mut rng));
    for _ in 0..50 {
        let p = random_pose(&mut rng).position * 100.0;
        store.set_position(root, p);
        assert!(store.position(root).abs_diff_eq(p, EPS));
    }
}

#[test]
fn pose_preserving_reparent_keeps_world_pose() {
    let mut rng = StdRng::seed_from_u64(23);
    let (mut store, ids) = random_forest(&mut rng, 30);
    // Non-uniform scale under rotation shears, and a sheared matrix has no
    // single rotation to preserve.
    for &id in &ids {
        store.set_local_scale(id, DVec3::splat(rng.gen_range(0.8..1.25)));
    }
    let dir = DVec3::new(0.3, -1.0, 2.0);

    for _ in 0..60 {
        let node = ids[rng.gen_range(0..ids.len())];
        let target = if rng.gen_bool(0.1) {
            None
        } else {
            Some(ids[rng.gen_range(0..ids.len())])
        };

        let position = store.position(node);
        let turned = store.rotation(node) * dir;
        if store.reparent_preserving_pose(node, target, None).is_err() {
            continue;
        }
        assert_eq!(store.parent(node), target);
        assert!(store.position(node).abs_diff_eq(position, EPS));
        assert!((store.rotation(node) * dir).abs_diff_eq(turned, EPS));
    }
}

#[test]
fn disabling_root_skips_locally_disabled_branch() {
    // R → A → B (locally disabled) → C (locally enabled)
    let mut store = NodeStore::new();
    let [r, a, b, c] = [(); 4].map(|()| store.create_node());
    store.add_child(r, a).unwrap();
    store.add_child(a, b).unwrap();
    store.add_child(b, c).unwrap();
    store.set_enabled(b, false);
    let b_cache = store.enabled_in_hierarchy(b);
    let c_cache = store.enabled_in_hierarchy(c);

    store.reset_stats();
    store.set_enabled(r, false);

    // Only R and A are visited.
    assert_eq!(store.stats().enabled_visits, 2);
    assert!(!store.enabled_in_hierarchy(a));
    assert_eq!(store.enabled_in_hierarchy(b), b_cache);
    assert_eq!(store.enabled_in_hierarchy(c), c_cache);
    assert!(store.is_enabled_locally(c));
}

#[test]
fn second_sync_pass_recomputes_nothing() {
    let mut rng = StdRng::seed_from_u64(31);
    let (mut store, ids) = random_forest(&mut rng, 50);
    let roots = store.roots();
    for &root in &roots {
        store.sync_hierarchy(root);
    }
    assert!(ids.iter().all(|&id| store.is_frozen(id)));

    store.reset_stats();
    for &root in &roots {
        let summary = store.sync_hierarchy(root);
        assert!(summary.is_idle(), "{summary:?}");
        assert_eq!(summary.skipped_frozen, 1);
    }
    assert_eq!(store.stats().world_recomputes, 0);
}

#[test]
fn scale_compensation_isolates_scale_but_not_position() {
    let mut store = NodeStore::new();
    let r = store.create_node();
    let a = store.create_node();
    store.add_child(r, a).unwrap();
    store.set_local_scale(r, DVec3::splat(2.0));
    store.set_scale_compensation(a, true);
    store.set_local_position(a, DVec3::X);

    assert!(store.scale(a).abs_diff_eq(DVec3::ONE, EPS));
    assert!(store.position(a).abs_diff_eq(DVec3::new(2.0, 0.0, 0.0), EPS));

    // Non-uniform scale on the parent still leaves the scale alone.
    for scale in [
        DVec3::new(3.0, 0.5, 7.0),
        DVec3::new(0.25, 4.0, 1.0),
        DVec3::new(1.0, 1.0, 9.0),
    ] {
        store.set_local_scale(r, scale);
        assert!(store.scale(a).abs_diff_eq(DVec3::ONE, EPS));
        assert!(store.position(a).abs_diff_eq(DVec3::new(scale.x, 0.0, 0.0), EPS));
    }
}

#[test]
fn scale_compensation_follows_rotation_of_scaled_parent() {
    let mut store = NodeStore::new();
    let r = store.create_node();
    let a = store.create_node();
    let leaf = store.create_node();
    store.add_child(r, a).unwrap();
    store.add_child(a, leaf).unwrap();
    store.set_local_pose(
        r,
        LocalPose::from_position(DVec3::new(0.0, 1.0, 0.0))
            .with_rotation(DQuat::from_rotation_z(core::f64::consts::FRAC_PI_2))
            .with_scale(DVec3::new(4.0, 0.5, 2.0)),
    );
    store.set_scale_compensation(a, true);
    store.set_local_pose(a, LocalPose::from_scale(DVec3::splat(3.0)));
    store.set_local_position(leaf, DVec3::X);

    assert!(store.scale(a).abs_diff_eq(DVec3::splat(3.0), EPS));
    // The uncompensated leaf inherits a's compensated world matrix.
    assert!(store.scale(leaf).abs_diff_eq(DVec3::splat(3.0), EPS));
    // a's +X maps to world +Y after the 90° turn; 3 units away.
    assert!(store.position(leaf).abs_diff_eq(DVec3::new(0.0, 4.0, 0.0), EPS));
}

#[test]
fn scale_compensation_ignores_scale_of_skipped_ancestors() {
    let mut rng = StdRng::seed_from_u64(0x5c10_0c0e);
    let (mut store, ids) = random_forest(&mut rng, 60);
    for &id in &ids {
        if rng.gen_bool(0.4) {
            store.set_scale_compensation(id, true);
        }
    }

    for _ in 0..200 {
        let n = ids[rng.gen_range(0..ids.len())];
        if !store.scale_compensation(n) || store.parent(n).is_none() {
            continue;
        }
        let scale = store.scale(n);
        let position = store.position(n);

        // Rescale every compensated ancestor up to and including the nearest
        // uncompensated one.
        let mut cursor = store.parent(n);
        while let Some(ancestor) = cursor {
            let skewed = DVec3::new(
                rng.gen_range(0.5..3.0),
                rng.gen_range(0.5..3.0),
                rng.gen_range(0.5..3.0),
            );
            store.set_local_scale(ancestor, skewed);
            if !store.scale_compensation(ancestor) {
                break;
            }
            cursor = store.parent(ancestor);
        }

        assert!(
            store.scale(n).abs_diff_eq(scale, EPS),
            "{n:?}: scale {:?} != {scale:?}",
            store.scale(n)
        );
        // Position still follows the rescaled chain unless the node sits on
        // its parent's origin.
        if store.local_position(n).length() > 1e-3 {
            assert!(!store.position(n).abs_diff_eq(position, 1e-9));
        }
    }
}
