// Copyright 2026 the Scion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node hierarchy data model.
//!
//! A *node* is an element of a transform tree. Each node has:
//!
//! - An identity ([`NodeId`]): a generational handle that becomes stale when
//!   the node is destroyed, preventing use-after-free bugs at the API level.
//! - Topology: parent, first/last-child, and sibling links forming an ordered
//!   tree. The parent link is a plain slot index and never owns anything; a
//!   node's children are owned in the sense that [`destroy`](NodeStore::destroy)
//!   takes them down with it.
//! - **Local state** set by the caller: a [`LocalPose`](crate::transform::LocalPose),
//!   the local `enabled` flag, and the scale-compensation opt-in.
//! - **Cached state** derived on demand or by push propagation: the local
//!   matrix, the world matrix, the world scale sign, `graph_depth`,
//!   `enabled_in_hierarchy`, and `frozen`.
//!
//! # Operation groups
//!
//! - Allocation and the local transform cache:
//!   [`create_node`](NodeStore::create_node),
//!   [`local_transform`](NodeStore::local_transform).
//! - Pull-based world resolution, scale compensation, and world-space
//!   setters: [`world_transform`](NodeStore::world_transform).
//! - Structural edits: [`add_child`](NodeStore::add_child),
//!   [`reparent`](NodeStore::reparent), [`destroy`](NodeStore::destroy).
//! - Push-based enabled propagation: [`set_enabled`](NodeStore::set_enabled).
//! - The per-tick pass that freezes stable subtrees:
//!   [`sync_hierarchy`](NodeStore::sync_hierarchy).
//! - The change feed for external bookkeeping:
//!   [`drain_changes`](NodeStore::drain_changes).

mod changes;
mod enabled;
mod freeze;
mod hierarchy;
mod id;
mod store;
mod traverse;
mod world;

pub use changes::{HierarchyChanges, HierarchyEvent};
pub use id::{INVALID, NodeId};
pub use store::{NodeStore, SyncStats};
pub use traverse::{Children, Descendants};
