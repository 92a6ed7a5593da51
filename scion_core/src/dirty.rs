// Copyright 2026 the Scion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-state tracking.
//!
//! Two independent mechanisms live here.
//!
//! # Per-node transform state
//!
//! [`DirtyState`] records whether a node's cached local matrix and cached
//! world matrix are stale. Setters move a node toward dirty; a successful
//! world read moves it back to [`Clean`](DirtyState::Clean):
//!
//! ```text
//!   local mutation      Clean ─► LocalDirty      WorldDirty ─► BothDirty
//!   ancestor cascade    Clean ─► WorldDirty      LocalDirty ─► BothDirty
//!   world_transform()   any    ─► Clean
//! ```
//!
//! The machine has no error states.
//!
//! # Change feed channels
//!
//! The [`TRANSFORM`] and [`TOPOLOGY`] channels are tracked via
//! [`understory_dirty`] purely for external consumers, who drain them through
//! [`NodeStore::drain_changes`](crate::node::NodeStore::drain_changes).
//!
//! - **TRANSFORM** uses [`EagerPolicy`](understory_dirty::EagerPolicy) with
//!   child → parent dependency edges, so marking a node also marks its
//!   descendants.
//! - **TOPOLOGY** is local-only and marks nodes whose child list changed.
//!
//! Transform correctness never depends on the feed.

use understory_dirty::Channel;

/// World transform may have changed; propagates to descendants.
pub const TRANSFORM: Channel = Channel::new(0);

/// Child list changed; local-only.
pub const TOPOLOGY: Channel = Channel::new(1);

/// Staleness of a node's cached local and world matrices.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DirtyState {
    /// Both caches are current.
    #[default]
    Clean,
    /// The local matrix must be recomposed from the pose.
    LocalDirty,
    /// The world matrix must be recomposed from the ancestor chain.
    WorldDirty,
    /// Both caches are stale.
    BothDirty,
}

impl DirtyState {
    /// Returns whether nothing needs recomputing.
    #[inline]
    #[must_use]
    pub const fn is_clean(self) -> bool {
        matches!(self, Self::Clean)
    }

    /// Returns whether the local matrix is stale.
    #[inline]
    #[must_use]
    pub const fn is_local_dirty(self) -> bool {
        matches!(self, Self::LocalDirty | Self::BothDirty)
    }

    /// Returns whether the world matrix is stale.
    #[inline]
    #[must_use]
    pub const fn is_world_dirty(self) -> bool {
        matches!(self, Self::WorldDirty | Self::BothDirty)
    }

    /// State after a local mutation.
    #[inline]
    #[must_use]
    pub const fn with_local(self) -> Self {
        match self {
            Self::Clean | Self::LocalDirty => Self::LocalDirty,
            Self::WorldDirty | Self::BothDirty => Self::BothDirty,
        }
    }

    /// State after an ancestor (or the node itself) cascades world dirtiness.
    #[inline]
    #[must_use]
    pub const fn with_world(self) -> Self {
        match self {
            Self::Clean | Self::WorldDirty => Self::WorldDirty,
            Self::LocalDirty | Self::BothDirty => Self::BothDirty,
        }
    }

    /// State after the local matrix has been recomposed.
    #[inline]
    #[must_use]
    pub const fn without_local(self) -> Self {
        match self {
            Self::Clean | Self::LocalDirty => Self::Clean,
            Self::WorldDirty | Self::BothDirty => Self::WorldDirty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_clean() {
        assert!(DirtyState::default().is_clean());
    }

    #[test]
    fn local_mutation_transitions() {
        assert_eq!(DirtyState::Clean.with_local(), DirtyState::LocalDirty);
        assert_eq!(DirtyState::LocalDirty.with_local(), DirtyState::LocalDirty);
        assert_eq!(DirtyState::WorldDirty.with_local(), DirtyState::BothDirty);
        assert_eq!(DirtyState::BothDirty.with_local(), DirtyState::BothDirty);
    }

    #[test]
    fn world_cascade_transitions() {
        assert_eq!(DirtyState::Clean.with_world(), DirtyState::WorldDirty);
        assert_eq!(DirtyState::LocalDirty.with_world(), DirtyState::BothDirty);
        assert_eq!(DirtyState::WorldDirty.with_world(), DirtyState::WorldDirty);
        assert_eq!(DirtyState::BothDirty.with_world(), DirtyState::BothDirty);
    }

    #[test]
    fn local_resolve_keeps_world_bit() {
        assert_eq!(DirtyState::BothDirty.without_local(), DirtyState::WorldDirty);
        assert_eq!(DirtyState::LocalDirty.without_local(), DirtyState::Clean);
        assert_eq!(DirtyState::WorldDirty.without_local(), DirtyState::WorldDirty);
    }

    #[test]
    fn bit_queries() {
        assert!(DirtyState::BothDirty.is_local_dirty());
        assert!(DirtyState::BothDirty.is_world_dirty());
        assert!(!DirtyState::WorldDirty.is_local_dirty());
        assert!(!DirtyState::LocalDirty.is_world_dirty());
    }
}
