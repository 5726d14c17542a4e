// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Single-row focus.

use crate::registry::NodeRegistry;
use crate::store::StateStore;
use crate::types::{NodeFlags, NodeIndex, RowKey};

/// Proposal handed to the focused-key delegate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FocusedRowKeyChanged {
    /// Key focused before the click.
    pub previous_row_key: Option<RowKey>,
    /// Proposed focused key; `None` when the focused row was clicked again.
    pub focused_row_key: Option<RowKey>,
}

/// Back-reference to the focused node.
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct FocusTracker {
    current: Option<NodeIndex>,
}

impl FocusTracker {
    pub(crate) fn current(self) -> Option<NodeIndex> {
        self.current
    }

    pub(crate) fn clear(&mut self) {
        self.current = None;
    }

    /// Click `idx`: focus it, or drop focus if it already holds it.
    ///
    /// Returns the node that holds focus afterwards. The back-reference is only
    /// moved when `commit` is set; delegated clicks leave it for [`Self::reconcile`].
    pub(crate) fn click<R, S: StateStore<R>>(
        &mut self,
        store: &mut S,
        reg: &mut NodeRegistry<R>,
        idx: NodeIndex,
        commit: bool,
    ) -> Option<NodeIndex> {
        let on = !store.focused(reg, idx);
        if let Some(prev) = self.current
            && prev != idx
            && reg.contains(prev)
        {
            store.set_focused(reg, prev, false);
        }
        store.set_focused(reg, idx, on);
        let next = on.then_some(idx);
        if commit {
            self.current = next;
        }
        next
    }

    /// Take over a freshly loaded node that was seeded as focused.
    ///
    /// A focus already held elsewhere wins and the node's flag is cleared.
    pub(crate) fn adopt<R>(&mut self, reg: &mut NodeRegistry<R>, idx: NodeIndex) {
        if !reg.node(idx).is_focused() {
            return;
        }
        match self.current.filter(|n| reg.contains(*n)) {
            None => self.current = Some(idx),
            Some(held) if held == idx => {}
            Some(_) => reg.node_mut(idx).set_flag(NodeFlags::FOCUSED, false),
        }
    }

    pub(crate) fn proposal<R>(
        self,
        reg: &NodeRegistry<R>,
        next: Option<NodeIndex>,
    ) -> FocusedRowKeyChanged {
        let key = |n: NodeIndex| reg.node(n).id.clone();
        FocusedRowKeyChanged {
            previous_row_key: self.current.filter(|n| reg.contains(*n)).map(key),
            focused_row_key: next.map(key),
        }
    }

    /// Take every non-root node's focused flag from the host's key.
    pub(crate) fn reconcile<R>(&mut self, reg: &mut NodeRegistry<R>, key: Option<&RowKey>) {
        let root = reg.root();
        self.current = None;
        for idx in reg.indices().filter(|n| *n != root) {
            let node = reg.node_mut(idx);
            let on = key == Some(&node.id);
            node.set_flag(NodeFlags::FOCUSED, on);
            if on {
                self.current = Some(idx);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::Accessor;
    use crate::accessor::tests::MapRecord;
    use crate::registry::{Fields, Seed};
    use crate::store::{Delegated, SelfManaged};
    use crate::types::CheckState;

    fn tree() -> (NodeRegistry<MapRecord>, NodeIndex, NodeIndex) {
        let fields = Fields {
            id: Accessor::field("id"),
            parent_id: Accessor::field("parent"),
            has_children: None,
            checkbox_visible: None,
            disabled: None,
            title: None,
            hint: None,
        };
        let mut reg = NodeRegistry::new(RowKey::from(0_i64), CheckState::Unchecked, false);
        let mut add = |id: i64| {
            let rec = MapRecord::default().with("id", id).with("parent", 0_i64);
            reg.materialize(&fields, Seed::default(), &RowKey::from(0_i64), rec)
                .unwrap()
        };
        let a = add(1);
        let b = add(2);
        (reg, a, b)
    }

    #[test]
    fn focus_is_exclusive_and_toggles_off() {
        let (mut reg, a, b) = tree();
        let mut focus = FocusTracker::default();
        assert_eq!(focus.click(&mut SelfManaged, &mut reg, a, true), Some(a));
        assert_eq!(focus.click(&mut SelfManaged, &mut reg, b, true), Some(b));
        assert!(!reg.node(a).is_focused(), "previous focus is cleared");
        assert!(reg.node(b).is_focused());
        assert_eq!(focus.current(), Some(b));

        assert_eq!(focus.click(&mut SelfManaged, &mut reg, b, true), None);
        assert!(!reg.node(b).is_focused());
        assert_eq!(focus.current(), None);
    }

    #[test]
    fn delegated_click_proposes_without_moving_focus() {
        let (mut reg, a, b) = tree();
        let mut focus = FocusTracker::default();
        focus.reconcile(&mut reg, Some(&RowKey::from(1_i64)));
        assert_eq!(focus.current(), Some(a));

        let next = focus.click(&mut Delegated::default(), &mut reg, b, false);
        let ev = focus.proposal(&reg, next);
        assert_eq!(ev.previous_row_key, Some(RowKey::from(1_i64)));
        assert_eq!(ev.focused_row_key, Some(RowKey::from(2_i64)));
        assert!(reg.node(a).is_focused(), "host has not answered yet");

        let next = focus.click(&mut Delegated::default(), &mut reg, a, false);
        let ev = focus.proposal(&reg, next);
        assert_eq!(ev.focused_row_key, None, "clicking the focused row clears focus");
    }

    #[test]
    fn reconcile_moves_back_reference() {
        let (mut reg, a, b) = tree();
        let mut focus = FocusTracker::default();
        focus.reconcile(&mut reg, Some(&RowKey::from(2_i64)));
        assert_eq!(focus.current(), Some(b));
        assert!(!reg.node(a).is_focused());
        focus.reconcile(&mut reg, None);
        assert_eq!(focus.current(), None);
        assert!(!reg.node(b).is_focused());
    }

    #[test]
    fn adopt_tracks_seeded_node_unless_focus_is_held() {
        let (mut reg, a, b) = tree();
        let mut focus = FocusTracker::default();
        focus.adopt(&mut reg, b);
        assert_eq!(focus.current(), None, "unfocused nodes are not adopted");

        reg.node_mut(a).set_flag(NodeFlags::FOCUSED, true);
        focus.adopt(&mut reg, a);
        assert_eq!(focus.current(), Some(a));

        reg.node_mut(b).set_flag(NodeFlags::FOCUSED, true);
        focus.adopt(&mut reg, b);
        assert_eq!(focus.current(), Some(a));
        assert!(!reg.node(b).is_focused(), "held focus wins");
    }
}
