// Copyright 2026 the Scion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! ASCII dumps of a node hierarchy.

use std::fmt::Write;

use scion_core::node::{NodeId, NodeStore};

/// Renders the subtree under `root` as an indented tree, one node per line.
///
/// Each line shows the handle, world position, world scale, and the
/// `frozen` / `disabled` / `comp` markers that apply. World matrices are
/// resolved as a side effect.
#[must_use]
pub fn dump_tree(store: &mut NodeStore, root: NodeId) -> String {
    let mut out = String::new();
    write_node(store, root, "", "", &mut out);
    out
}

/// Dumps every tree in the store, roots in slot order.
#[must_use]
pub fn dump_forest(store: &mut NodeStore) -> String {
    store
        .roots()
        .into_iter()
        .map(|root| dump_tree(store, root))
        .collect()
}

fn write_node(store: &mut NodeStore, id: NodeId, lead: &str, indent: &str, out: &mut String) {
    let p = store.position(id);
    let s = store.scale(id);
    let _ = write!(
        out,
        "{lead}{id:?} pos=({:.2}, {:.2}, {:.2}) scale=({:.2}, {:.2}, {:.2})",
        p.x, p.y, p.z, s.x, s.y, s.z,
    );
    if store.is_frozen(id) {
        out.push_str(" frozen");
    }
    if !store.is_enabled(id) {
        out.push_str(" disabled");
    }
    if store.scale_compensation(id) {
        out.push_str(" comp");
    }
    out.push('\n');

    let children: Vec<_> = store.children(id).collect();
    let count = children.len();
    for (i, child) in children.into_iter().enumerate() {
        let last = i + 1 == count;
        let lead = format!("{indent}{}", if last { "└── " } else { "├── " });
        let indent = format!("{indent}{}", if last { "    " } else { "│   " });
        write_node(store, child, &lead, &indent, out);
    }
}

#[cfg(test)]
mod tests {
    use scion_core::transform::LocalPose;

    use super::*;

    #[test]
    fn dump_shows_structure_and_markers() {
        let mut store = NodeStore::new();
        let root = store.create_node_with_pose(LocalPose::IDENTITY);
        let a = store.create_node();
        let b = store.create_node();
        let a1 = store.create_node();
        store.add_child(root, a).unwrap();
        store.add_child(root, b).unwrap();
        store.add_child(a, a1).unwrap();
        store.set_enabled(b, false);
        store.set_scale_compensation(a1, true);

        let dump = dump_tree(&mut store, root);
        let lines: Vec<_> = dump.lines().collect();
        assert_eq!(lines.len(), 4, "got:\n{dump}");
        assert!(lines[0].starts_with("NodeId(0@gen0) pos=(0.00, 0.00, 0.00)"), "got:\n{dump}");
        assert!(lines[1].starts_with("├── NodeId(1@gen0)"), "got:\n{dump}");
        assert!(lines[2].starts_with("│   └── NodeId(3@gen0)"), "got:\n{dump}");
        assert!(lines[2].ends_with(" comp"), "got:\n{dump}");
        assert!(lines[3].starts_with("└── NodeId(2@gen0)"), "got:\n{dump}");
        assert!(lines[3].ends_with(" disabled"), "got:\n{dump}");
    }

    #[test]
    fn forest_lists_every_root() {
        let mut store = NodeStore::new();
        let _ = store.create_node();
        let _ = store.create_node();
        assert_eq!(dump_forest(&mut store).lines().count(), 2);
    }
}
