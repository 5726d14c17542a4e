// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tri-state checkbox propagation.
//!
//! ## Toggle
//!
//! Clicking a node's checkbox picks a target from the node's current state:
//! `Checked` → uncheck, `Unchecked` → check, `Undetermined` → check or uncheck
//! depending on [`ToggleMode`]. The node and every loaded descendant are set to
//! the target, then every ancestor is re-evaluated from its known children,
//! nearest first:
//!
//! - all children `Checked` → `Checked`
//! - some child `Checked` or `Undetermined` → `Undetermined`
//! - otherwise → `Unchecked`
//!
//! Children that are not loaded are not considered. Both walks are iterative.
//!
//! ## Delegated mode
//!
//! The same walk runs against a [`Delegated`] store; the overlay is then turned
//! into a [`CheckedRowKeysChanged`] proposal. Because ancestors are re-evaluated
//! through the overlay, an ancestor that was `Checked` but lost a fully checked
//! child is demoted and listed in `unchecked_row_keys`, so `current_row_keys`
//! never holds a checked ancestor of an unchecked node.
//!
//! On each render pass [`reconcile`] rebuilds every node's state from the host's
//! checked keys, re-evaluating all nodes bottom-up.

use alloc::collections::BTreeSet;
use alloc::vec::Vec;

use crate::registry::NodeRegistry;
use crate::store::{Delegated, SelfManaged, StateStore};
use crate::types::{CheckState, NodeIndex, RowKey, ToggleMode};

/// Proposal handed to the checked-keys delegate.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckedRowKeysChanged {
    /// Node whose checkbox was clicked.
    pub clicked_row_key: Option<RowKey>,
    /// Checked keys before the click, in registration order.
    pub previous_row_keys: Vec<RowKey>,
    /// Proposed full checked set, in registration order.
    pub current_row_keys: Vec<RowKey>,
    /// Keys that become checked.
    pub checked_row_keys: Vec<RowKey>,
    /// Keys that become unchecked, including demoted ancestors.
    pub unchecked_row_keys: Vec<RowKey>,
}

/// Next state of a clicked node.
pub(crate) fn toggle_target(current: CheckState, mode: ToggleMode) -> CheckState {
    match (current, mode) {
        (CheckState::Checked, _) | (CheckState::Undetermined, ToggleMode::Deselect) => {
            CheckState::Unchecked
        }
        (CheckState::Unchecked, _) | (CheckState::Undetermined, ToggleMode::Select) => {
            CheckState::Checked
        }
    }
}

/// State of `idx` derived from its known children, or `None` if none are loaded.
pub(crate) fn evaluate<R, S: StateStore<R>>(
    store: &S,
    reg: &NodeRegistry<R>,
    idx: NodeIndex,
) -> Option<CheckState> {
    let children = &reg.node(idx).children;
    if children.is_empty() {
        return None;
    }
    let mut all_checked = true;
    let mut any_checked = false;
    for &child in children {
        let state = store.checked(reg, child);
        all_checked &= state.is_checked();
        any_checked |= state.is_partially_checked();
    }
    Some(if all_checked {
        CheckState::Checked
    } else if any_checked {
        CheckState::Undetermined
    } else {
        CheckState::Unchecked
    })
}

/// Click the checkbox of `idx`: set the subtree, then re-evaluate ancestors.
pub(crate) fn toggle<R, S: StateStore<R>>(
    store: &mut S,
    reg: &mut NodeRegistry<R>,
    idx: NodeIndex,
    mode: ToggleMode,
) -> CheckState {
    let target = toggle_target(store.checked(reg, idx), mode);
    set_subtree(store, reg, idx, target);
    reevaluate_ancestors(store, reg, idx);
    target
}

fn set_subtree<R, S: StateStore<R>>(
    store: &mut S,
    reg: &mut NodeRegistry<R>,
    idx: NodeIndex,
    target: CheckState,
) {
    let mut stack = Vec::from([idx]);
    while let Some(n) = stack.pop() {
        if store.checked(reg, n) != target {
            store.set_checked(reg, n, target);
        }
        stack.extend(reg.node(n).children.iter().rev());
    }
}

fn reevaluate_ancestors<R, S: StateStore<R>>(
    store: &mut S,
    reg: &mut NodeRegistry<R>,
    idx: NodeIndex,
) {
    let mut cur = reg.node(idx).parent;
    while let Some(p) = cur {
        if let Some(state) = evaluate(store, reg, p)
            && state != store.checked(reg, p)
        {
            store.set_checked(reg, p, state);
        }
        cur = reg.node(p).parent;
    }
}

/// Turn a delegated overlay into the proposal for the host.
pub(crate) fn proposal<R>(
    store: &Delegated,
    reg: &NodeRegistry<R>,
    clicked: NodeIndex,
) -> CheckedRowKeysChanged {
    let mut event = CheckedRowKeysChanged {
        clicked_row_key: Some(reg.node(clicked).id.clone()),
        ..CheckedRowKeysChanged::default()
    };
    for (idx, node) in reg.iter() {
        if node.checked.is_checked() {
            event.previous_row_keys.push(node.id.clone());
        }
        if store.checked(reg, idx).is_checked() {
            event.current_row_keys.push(node.id.clone());
        }
    }
    for (idx, state) in store.checked.entries() {
        let before = reg.node(idx).checked;
        let id = &reg.node(idx).id;
        match state {
            CheckState::Checked if !before.is_checked() => event.checked_row_keys.push(id.clone()),
            CheckState::Unchecked if before != CheckState::Unchecked => {
                event.unchecked_row_keys.push(id.clone());
            }
            CheckState::Undetermined if before.is_checked() => {
                event.unchecked_row_keys.push(id.clone());
            }
            _ => {}
        }
    }
    event
}

/// Rebuild every node's state from the host's checked keys.
///
/// Each node starts as `Checked` iff its key is listed; then every node with
/// loaded children is re-evaluated bottom-up, so the result always satisfies the
/// ancestor rule regardless of what the host passed in.
pub(crate) fn reconcile<R>(reg: &mut NodeRegistry<R>, checked_row_keys: &[RowKey]) {
    let listed: BTreeSet<&RowKey> = checked_row_keys.iter().collect();
    for node in reg.iter_mut() {
        node.checked = if listed.contains(&node.id) {
            CheckState::Checked
        } else {
            CheckState::Unchecked
        };
    }
    let mut store = SelfManaged;
    for idx in reg.indices().rev() {
        if let Some(state) = evaluate(&store, reg, idx) {
            store.set_checked(reg, idx, state);
        }
    }
}
