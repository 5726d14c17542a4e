// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Expand/collapse.
//!
//! Expansion is orthogonal to checkbox state and never cascades. In delegated
//! mode the toggle becomes an [`ExpandedRowKeysChanged`] proposal computed from
//! the registry, and the host feeds the accepted key list back on the next
//! render pass.

use alloc::collections::BTreeSet;
use alloc::vec::Vec;

use crate::registry::NodeRegistry;
use crate::store::StateStore;
use crate::types::{NodeFlags, NodeIndex, RowKey};

/// Proposal handed to the expanded-keys delegate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpandedRowKeysChanged {
    /// Expanded keys before the toggle, root excluded.
    pub previous_row_keys: Vec<RowKey>,
    /// Proposed expanded keys, root excluded.
    pub current_row_keys: Vec<RowKey>,
    /// Node that was toggled.
    pub expanded_row_key: RowKey,
}

/// Flip the expanded flag of `idx`, returning the new value.
pub(crate) fn toggle<R, S: StateStore<R>>(
    store: &mut S,
    reg: &mut NodeRegistry<R>,
    idx: NodeIndex,
) -> bool {
    let on = !store.expanded(reg, idx);
    store.set_expanded(reg, idx, on);
    on
}

/// Build the proposal for toggling `idx`.
///
/// Both lists keep registration order for untouched nodes; the toggled node is
/// appended to whichever side holds it.
pub(crate) fn proposal<R>(reg: &NodeRegistry<R>, idx: NodeIndex) -> ExpandedRowKeysChanged {
    let root = reg.root();
    let mut previous = Vec::new();
    for (n, node) in reg.iter() {
        if n != root && n != idx && node.is_expanded() {
            previous.push(node.id.clone());
        }
    }
    let mut current = previous.clone();
    let toggled = reg.node(idx);
    if toggled.is_expanded() {
        previous.push(toggled.id.clone());
    } else {
        current.push(toggled.id.clone());
    }
    ExpandedRowKeysChanged {
        previous_row_keys: previous,
        current_row_keys: current,
        expanded_row_key: toggled.id.clone(),
    }
}

/// Take every non-root node's expanded flag from the host's key list.
pub(crate) fn reconcile<R>(reg: &mut NodeRegistry<R>, expanded_row_keys: &[RowKey]) {
    let listed: BTreeSet<&RowKey> = expanded_row_keys.iter().collect();
    let root = reg.root();
    for idx in reg.indices().filter(|n| *n != root) {
        let node = reg.node_mut(idx);
        let on = listed.contains(&node.id);
        node.set_flag(NodeFlags::EXPANDED, on);
    }
}
