// Copyright 2026 the Scion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use scion_core::trace::{
    SkipReason, SubtreeSkipEvent, SyncBeginEvent, SyncSummary, TraceSink, WorldRecomputeEvent,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    show_recomputes: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("show_recomputes", &self.show_recomputes)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::with_writer(Box::new(std::io::stderr()))
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self::with_writer(writer)
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            show_recomputes: true,
        }
    }

    /// Suppresses the per-node `[world]` lines, keeping pass boundaries and
    /// skips.
    #[must_use]
    pub fn quiet(mut self) -> Self {
        self.show_recomputes = false;
        self
    }

    /// Consumes the sink and returns the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn reason_name(reason: SkipReason) -> &'static str {
    match reason {
        SkipReason::Frozen => "frozen",
        SkipReason::Disabled => "disabled",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_sync_begin(&mut self, e: &SyncBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[sync:begin] tick={} root={} nodes={}",
            e.tick, e.root, e.node_count,
        );
    }

    fn on_world_recompute(&mut self, e: &WorldRecomputeEvent) {
        if !self.show_recomputes {
            return;
        }
        let local = if e.local_recomputed { " +local" } else { "" };
        let comp = if e.scale_compensated { " compensated" } else { "" };
        let _ = writeln!(
            self.writer,
            "[world] node={} depth={}{local}{comp}",
            e.node, e.depth,
        );
    }

    fn on_subtree_skip(&mut self, e: &SubtreeSkipEvent) {
        let _ = writeln!(
            self.writer,
            "[skip] node={} {}",
            e.node,
            reason_name(e.reason),
        );
    }

    fn on_sync_end(&mut self, s: &SyncSummary) {
        let idle = if s.is_idle() { " idle" } else { "" };
        let _ = writeln!(
            self.writer,
            "[sync:end] tick={} frozen={} recomputed={} skipped={}+{}{idle}",
            s.tick, s.frozen, s.world_recomputes, s.skipped_frozen, s.skipped_disabled,
        );
    }
}
