// Copyright 2026 the Scion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the synchronization pass.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that
//! [`NodeStore::sync_hierarchy_traced`](crate::node::NodeStore::sync_hierarchy_traced)
//! calls as it walks the tree. All method bodies default to no-ops, so
//! implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Why the synchronization pass did not descend into a subtree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// The subtree was already frozen by an earlier pass.
    Frozen,
    /// The subtree root is locally disabled.
    Disabled,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a synchronization pass starts.
#[derive(Clone, Copy, Debug)]
pub struct SyncBeginEvent {
    /// Sequence number of the pass within its store, starting at 0.
    pub tick: u64,
    /// Raw slot index of the node the pass starts from.
    pub root: u32,
    /// Number of live nodes in the store.
    pub node_count: u32,
}

/// Emitted every time a node's world matrix is recomposed.
#[derive(Clone, Copy, Debug)]
pub struct WorldRecomputeEvent {
    /// Raw slot index of the node.
    pub node: u32,
    /// Graph depth of the node.
    pub depth: u32,
    /// Whether the local matrix was recomposed as well.
    pub local_recomputed: bool,
    /// Whether the scale-compensated composition was used.
    pub scale_compensated: bool,
}

/// Emitted when the pass skips a subtree.
#[derive(Clone, Copy, Debug)]
pub struct SubtreeSkipEvent {
    /// Raw slot index of the skipped subtree root.
    pub node: u32,
    /// Why it was skipped.
    pub reason: SkipReason,
}

/// Per-pass summary returned by
/// [`sync_hierarchy`](crate::node::NodeStore::sync_hierarchy).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncSummary {
    /// Sequence number of the pass within its store, starting at 0.
    pub tick: u64,
    /// Nodes newly frozen by this pass.
    pub frozen: u32,
    /// World matrices recomposed during this pass.
    pub world_recomputes: u64,
    /// Subtrees skipped because they were already frozen.
    pub skipped_frozen: u32,
    /// Subtrees skipped because their root is locally disabled.
    pub skipped_disabled: u32,
}

impl SyncSummary {
    /// Returns whether the pass found nothing to do.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.frozen == 0 && self.world_recomputes == 0
    }
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the synchronization pass.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a pass starts.
    fn on_sync_begin(&mut self, e: &SyncBeginEvent) {
        _ = e;
    }

    /// Called after a node's world matrix is recomposed.
    fn on_world_recompute(&mut self, e: &WorldRecomputeEvent) {
        _ = e;
    }

    /// Called when a subtree is skipped.
    fn on_subtree_skip(&mut self, e: &SubtreeSkipEvent) {
        _ = e;
    }

    /// Called with the summary when a pass ends.
    fn on_sync_end(&mut self, s: &SyncSummary) {
        _ = s;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`SyncBeginEvent`].
    #[inline]
    pub fn sync_begin(&mut self, e: &SyncBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_sync_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`WorldRecomputeEvent`].
    #[inline]
    pub fn world_recompute(&mut self, e: &WorldRecomputeEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_world_recompute(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`SubtreeSkipEvent`].
    #[inline]
    pub fn subtree_skip(&mut self, e: &SubtreeSkipEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_subtree_skip(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`SyncSummary`].
    #[inline]
    pub fn sync_end(&mut self, s: &SyncSummary) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_sync_end(s);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
