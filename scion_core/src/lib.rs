// Copyright 2026 the Scion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transform hierarchy with lazy world-matrix caching.
//!
//! `scion_core` maintains a tree of spatial nodes, each carrying a local
//! position, rotation, and scale, and produces up-to-date composed *world*
//! transforms for arbitrarily deep hierarchies without redundant
//! recomputation. It is `no_std` compatible (with `alloc`) and stores nodes
//! in struct-of-arrays layout addressed by generational handles.
//!
//! # Architecture
//!
//! Writes push invalidation; reads pull recomputation:
//!
//! ```text
//!   set_local_position / add_child / set_enabled
//!       │
//!       ├──► DirtyState (local, world) ──► pushed down to descendants
//!       ├──► frozen flags ───────────────► cleared up to the root
//!       └──► enabled cache ──────────────► pushed down (pruned)
//!
//!   world_transform(node)
//!       │
//!       ▼
//!   resolve dirty ancestor chain top-down ──► cached world matrix
//!
//!   sync_hierarchy(root) once per tick ──► freezes stable subtrees
//! ```
//!
//! **[`node`]**: The [`NodeStore`](node::NodeStore) arena: allocation,
//! local transform caching, hierarchy mutation, world synchronization
//! (including scale compensation), enabled-state propagation, and the
//! freeze pass.
//!
//! **[`transform`]**: [`LocalPose`](transform::LocalPose) and the matrix
//! helpers used to compose and decompose world transforms.
//!
//! **[`dirty`]**: The per-node [`DirtyState`](dirty::DirtyState) machine and
//! the `understory_dirty` channels behind the change feed.
//!
//! **[`error`]**: [`HierarchyError`](error::HierarchyError) for rejected
//! hierarchy insertions.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! instrumenting the synchronization pass, with a zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Threading
//!
//! A store is mutated and queried from one logical thread. Reads that may
//! resolve dirty state take `&mut self`.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in `glam`.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod dirty;
pub mod error;
pub mod node;
pub mod trace;
pub mod transform;
