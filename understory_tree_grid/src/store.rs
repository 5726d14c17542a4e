// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! State stores: where expansion, checkbox and focus mutations go.
//!
//! The interaction algorithms are written once against [`StateStore`].
//! [`SelfManaged`] writes through to the registry. [`Delegated`] records the
//! writes in an overlay on top of the registry, so the algorithms observe their
//! own effects while the registry keeps the host's authoritative state; the
//! overlay is then turned into a change event for the host.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::registry::NodeRegistry;
use crate::types::{CheckState, NodeFlags, NodeIndex};

/// Read/write access to the mutable per-node state.
pub(crate) trait StateStore<R> {
    fn checked(&self, reg: &NodeRegistry<R>, idx: NodeIndex) -> CheckState;
    fn set_checked(&mut self, reg: &mut NodeRegistry<R>, idx: NodeIndex, state: CheckState);
    fn expanded(&self, reg: &NodeRegistry<R>, idx: NodeIndex) -> bool;
    fn set_expanded(&mut self, reg: &mut NodeRegistry<R>, idx: NodeIndex, on: bool);
    fn focused(&self, reg: &NodeRegistry<R>, idx: NodeIndex) -> bool;
    fn set_focused(&mut self, reg: &mut NodeRegistry<R>, idx: NodeIndex, on: bool);
}

/// Mutates the registry in place.
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct SelfManaged;

impl<R> StateStore<R> for SelfManaged {
    fn checked(&self, reg: &NodeRegistry<R>, idx: NodeIndex) -> CheckState {
        reg.node(idx).checked
    }

    fn set_checked(&mut self, reg: &mut NodeRegistry<R>, idx: NodeIndex, state: CheckState) {
        reg.node_mut(idx).checked = state;
    }

    fn expanded(&self, reg: &NodeRegistry<R>, idx: NodeIndex) -> bool {
        reg.node(idx).is_expanded()
    }

    fn set_expanded(&mut self, reg: &mut NodeRegistry<R>, idx: NodeIndex, on: bool) {
        reg.node_mut(idx).set_flag(NodeFlags::EXPANDED, on);
    }

    fn focused(&self, reg: &NodeRegistry<R>, idx: NodeIndex) -> bool {
        reg.node(idx).is_focused()
    }

    fn set_focused(&mut self, reg: &mut NodeRegistry<R>, idx: NodeIndex, on: bool) {
        reg.node_mut(idx).set_flag(NodeFlags::FOCUSED, on);
    }
}

/// Ordered overlay of pending values.
#[derive(Clone, Debug)]
pub(crate) struct Overlay<T> {
    values: BTreeMap<NodeIndex, T>,
    order: Vec<NodeIndex>,
}

impl<T> Default for Overlay<T> {
    fn default() -> Self {
        Self {
            values: BTreeMap::new(),
            order: Vec::new(),
        }
    }
}

impl<T: Copy> Overlay<T> {
    pub(crate) fn get(&self, idx: NodeIndex) -> Option<T> {
        self.values.get(&idx).copied()
    }

    fn set(&mut self, idx: NodeIndex, value: T) {
        if self.values.insert(idx, value).is_none() {
            self.order.push(idx);
        }
    }

    /// Written slots with their final values, in first-write order.
    pub(crate) fn entries(&self) -> impl Iterator<Item = (NodeIndex, T)> + '_ {
        self.order.iter().map(|idx| (*idx, self.values[idx]))
    }
}

/// Records mutations without touching the registry.
#[derive(Clone, Debug, Default)]
pub(crate) struct Delegated {
    pub(crate) checked: Overlay<CheckState>,
    pub(crate) expanded: Overlay<bool>,
    pub(crate) focused: Overlay<bool>,
}

impl<R> StateStore<R> for Delegated {
    fn checked(&self, reg: &NodeRegistry<R>, idx: NodeIndex) -> CheckState {
        self.checked.get(idx).unwrap_or(reg.node(idx).checked)
    }

    fn set_checked(&mut self, _reg: &mut NodeRegistry<R>, idx: NodeIndex, state: CheckState) {
        self.checked.set(idx, state);
    }

    fn expanded(&self, reg: &NodeRegistry<R>, idx: NodeIndex) -> bool {
        self.expanded
            .get(idx)
            .unwrap_or_else(|| reg.node(idx).is_expanded())
    }

    fn set_expanded(&mut self, _reg: &mut NodeRegistry<R>, idx: NodeIndex, on: bool) {
        self.expanded.set(idx, on);
    }

    fn focused(&self, reg: &NodeRegistry<R>, idx: NodeIndex) -> bool {
        self.focused
            .get(idx)
            .unwrap_or_else(|| reg.node(idx).is_focused())
    }

    fn set_focused(&mut self, _reg: &mut NodeRegistry<R>, idx: NodeIndex, on: bool) {
        self.focused.set(idx, on);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::tests::MapRecord;
    use crate::types::RowKey;

    fn registry() -> NodeRegistry<MapRecord> {
        NodeRegistry::new(RowKey::from("r"), CheckState::Unchecked, true)
    }

    #[test]
    fn self_managed_writes_through() {
        let mut reg = registry();
        let root = reg.root();
        let mut store = SelfManaged;
        store.set_checked(&mut reg, root, CheckState::Checked);
        store.set_focused(&mut reg, root, true);
        assert_eq!(reg.node(root).checked(), CheckState::Checked);
        assert!(reg.node(root).is_focused());
    }

    #[test]
    fn delegated_overlays_without_mutating() {
        let mut reg = registry();
        let root = reg.root();
        let mut store = Delegated::default();
        store.set_checked(&mut reg, root, CheckState::Checked);
        store.set_expanded(&mut reg, root, false);
        assert_eq!(store.checked(&reg, root), CheckState::Checked);
        assert!(!StateStore::<MapRecord>::expanded(&store, &reg, root));
        assert_eq!(reg.node(root).checked(), CheckState::Unchecked);
        assert!(reg.node(root).is_expanded(), "registry is untouched");
    }

    #[test]
    fn overlay_keeps_first_write_order_and_last_value() {
        let mut overlay = Overlay::default();
        overlay.set(NodeIndex::new(3), 1);
        overlay.set(NodeIndex::new(1), 2);
        overlay.set(NodeIndex::new(3), 5);
        let entries: Vec<_> = overlay.entries().collect();
        assert_eq!(entries, alloc::vec![(NodeIndex::new(3), 5), (NodeIndex::new(1), 2)]);
    }
}
