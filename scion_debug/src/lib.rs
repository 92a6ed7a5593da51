// Copyright 2026 the Scion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pretty-printing and hierarchy dumps for scion diagnostics.
//!
//! This crate provides development-time views of a
//! [`NodeStore`](scion_core::node::NodeStore):
//!
//! - [`pretty::PrettyPrintSink`]: a [`TraceSink`](scion_core::trace::TraceSink)
//!   writing one human-readable line per synchronization event.
//! - [`dump::dump_tree`]: an ASCII tree of handles, world poses, and
//!   frozen/enabled markers.

pub mod dump;
pub mod pretty;
