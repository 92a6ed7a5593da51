// Copyright 2026 the Scion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hierarchy errors.

use crate::node::NodeId;

/// A rejected hierarchy insertion.
///
/// Both variants are caller contract violations: the tree must stay acyclic.
/// The store is left untouched when one is returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum HierarchyError {
    /// A node was asked to become its own child.
    #[error("{0:?} cannot be a child of itself")]
    SelfParent(NodeId),
    /// A node was asked to adopt one of its own ancestors.
    #[error("{parent:?} cannot adopt its ancestor {child:?} as a child")]
    AncestorCycle {
        /// The node that would receive the child.
        parent: NodeId,
        /// The ancestor that was offered as a child.
        child: NodeId,
    },
}
