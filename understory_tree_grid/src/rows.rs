// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flattened row snapshots handed to renderers.
//!
//! A render pass walks the visible part of the tree depth-first and produces one
//! [`RowView`] per row. Views borrow the tree and are immutable; interactions go
//! back through [`RowAction`] values dispatched on the
//! [`TreeGrid`](crate::TreeGrid).

use alloc::string::String;

use crate::registry::{NodeRegistry, NodeState};
use crate::types::{CheckState, NodeFlags, NodeIndex, RowKey};

/// Interaction bound to a row or the header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RowAction {
    /// Expand or collapse the row.
    ToggleExpand(RowKey),
    /// Click the row's checkbox.
    ToggleCheck(RowKey),
    /// Click the row for focus.
    Focus(RowKey),
    /// Click the header's check-all box.
    CheckAll,
}

/// Immutable snapshot of one visible row.
#[derive(Debug)]
pub struct RowView<'a, R> {
    node: &'a NodeState<R>,
    allow_focusing: bool,
}

impl<'a, R> RowView<'a, R> {
    pub(crate) fn new(node: &'a NodeState<R>, allow_focusing: bool) -> Self {
        Self {
            node,
            allow_focusing,
        }
    }

    /// Row identifier.
    pub fn id(&self) -> &'a RowKey {
        &self.node.id
    }

    /// Parent identifier.
    pub fn parent_id(&self) -> Option<&'a RowKey> {
        self.node.parent_id.as_ref()
    }

    /// Depth; top-level rows are level 1.
    pub fn level(&self) -> u32 {
        self.node.level
    }

    /// Checkbox value.
    pub fn checked(&self) -> CheckState {
        self.node.checked
    }

    /// Flag bits.
    pub fn flags(&self) -> NodeFlags {
        self.node.flags
    }

    /// Shortcut for the expanded flag.
    pub fn is_expanded(&self) -> bool {
        self.node.is_expanded()
    }

    /// Shortcut for the focused flag.
    pub fn is_focused(&self) -> bool {
        self.node.is_focused()
    }

    /// At least one loaded child can itself be expanded.
    pub fn has_expandable_children(&self) -> bool {
        self.node.has_expandable_children()
    }

    /// Resolved title.
    pub fn title(&self) -> Option<&'a str> {
        self.node.title.as_deref()
    }

    /// Resolved hint.
    pub fn hint(&self) -> Option<&'a str> {
        self.node.hint.as_deref()
    }

    /// Backing record.
    pub fn record(&self) -> Option<&'a R> {
        self.node.record.as_ref()
    }

    /// Action for the expander, if the row can be expanded.
    pub fn toggle_expand(&self) -> Option<RowAction> {
        self.node
            .has_children()
            .then(|| RowAction::ToggleExpand(self.node.id.clone()))
    }

    /// Action for the checkbox, if the row has one.
    pub fn toggle_check(&self) -> Option<RowAction> {
        self.node
            .has_checkbox()
            .then(|| RowAction::ToggleCheck(self.node.id.clone()))
    }

    /// Action for a click on the row, if focusing is allowed.
    pub fn focus(&self) -> Option<RowAction> {
        self.allow_focusing
            .then(|| RowAction::Focus(self.node.id.clone()))
    }
}

/// The check-all header row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderView<'a> {
    /// Header caption.
    pub title: &'a str,
    /// Check state of the root.
    pub checked: CheckState,
}

impl HeaderView<'_> {
    /// Action for the header checkbox.
    pub fn toggle_check(&self) -> RowAction {
        RowAction::CheckAll
    }
}

/// Custom row presentation.
///
/// Only [`RowRenderer::render_row`] is required; [`RowRenderer::render_title`]
/// defaults to the row's resolved title, falling back to its identifier.
pub trait RowRenderer<R> {
    /// Rendered form of one row.
    type Output;

    /// Render one row.
    fn render_row(&mut self, row: &RowView<'_, R>) -> Self::Output;

    /// Text shown in the title cell.
    fn render_title(&mut self, row: &RowView<'_, R>) -> String {
        default_title(row)
    }
}

/// The title cell text used by renderers that do not override it.
pub fn default_title<R>(row: &RowView<'_, R>) -> String {
    match row.title() {
        Some(title) => String::from(title),
        None => alloc::format!("{}", row.id()),
    }
}

/// Iterator over the visible rows, depth-first.
///
/// Descends into a node only when it is expanded, its children are loaded and
/// it has at least one child.
#[derive(Debug)]
pub struct VisibleRows<'a, R> {
    reg: &'a NodeRegistry<R>,
    stack: alloc::vec::Vec<NodeIndex>,
    allow_focusing: bool,
}

impl<'a, R> VisibleRows<'a, R> {
    pub(crate) fn new(reg: &'a NodeRegistry<R>, allow_focusing: bool) -> Self {
        let root = reg.node(reg.root());
        let stack = if root.shows_children() {
            root.children.iter().rev().copied().collect()
        } else {
            alloc::vec::Vec::new()
        };
        Self {
            reg,
            stack,
            allow_focusing,
        }
    }
}

impl<'a, R> Iterator for VisibleRows<'a, R> {
    type Item = RowView<'a, R>;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.stack.pop()?;
        let node = self.reg.node(idx);
        if node.shows_children() {
            self.stack.extend(node.children.iter().rev());
        }
        Some(RowView::new(node, self.allow_focusing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::Accessor;
    use crate::accessor::tests::MapRecord;
    use crate::registry::{Fields, Seed};
    use alloc::vec::Vec;

    fn registry(expanded: &[RowKey]) -> NodeRegistry<MapRecord> {
        let fields = Fields {
            id: Accessor::field("id"),
            parent_id: Accessor::field("parent"),
            has_children: Some(Accessor::field("kids")),
            checkbox_visible: None,
            disabled: None,
            title: Some(Accessor::field("name")),
            hint: None,
        };
        let seed = Seed {
            allow_checkboxes: true,
            expanded_row_keys: expanded,
            ..Seed::default()
        };
        let mut reg = NodeRegistry::new(RowKey::from("r"), CheckState::Unchecked, true);
        for (id, parent, kids) in [
            ("a", "r", true),
            ("b", "r", true),
            ("a1", "a", false),
            ("b1", "b", false),
        ] {
            let rec = MapRecord::default()
                .with("id", id)
                .with("parent", parent)
                .with("kids", kids)
                .with("name", alloc::format!("Item {id}"));
            reg.materialize(&fields, seed, &RowKey::from(parent), rec)
                .unwrap();
        }
        reg
    }

    fn ids(reg: &NodeRegistry<MapRecord>) -> Vec<RowKey> {
        VisibleRows::new(reg, false)
            .map(|row| row.id().clone())
            .collect()
    }

    #[test]
    fn collapsed_nodes_hide_their_children() {
        let reg = registry(&[]);
        assert_eq!(ids(&reg), [RowKey::from("a"), RowKey::from("b")]);
    }

    #[test]
    fn expanded_nodes_show_children_in_order() {
        let reg = registry(&[RowKey::from("b")]);
        assert_eq!(
            ids(&reg),
            [RowKey::from("a"), RowKey::from("b"), RowKey::from("b1")]
        );
        let levels: Vec<u32> = VisibleRows::new(&reg, false).map(|r| r.level()).collect();
        assert_eq!(levels, [1, 1, 2]);
    }

    #[test]
    fn actions_follow_flags() {
        let reg = registry(&[]);
        let row = VisibleRows::new(&reg, false).next().unwrap();
        assert_eq!(row.toggle_expand(), Some(RowAction::ToggleExpand(RowKey::from("a"))));
        assert_eq!(row.toggle_check(), Some(RowAction::ToggleCheck(RowKey::from("a"))));
        assert_eq!(row.focus(), None, "focusing not allowed");
        assert!(!row.has_expandable_children(), "a1 is a leaf");
    }

    struct Plain;

    impl RowRenderer<MapRecord> for Plain {
        type Output = String;

        fn render_row(&mut self, row: &RowView<'_, MapRecord>) -> String {
            let indent = " ".repeat(row.level() as usize);
            alloc::format!("{indent}{}", self.render_title(row))
        }
    }

    #[test]
    fn default_title_renderer_uses_title() {
        let reg = registry(&[RowKey::from("a")]);
        let mut r = Plain;
        let out: Vec<String> = VisibleRows::new(&reg, false)
            .map(|row| r.render_row(&row))
            .collect();
        assert_eq!(out, [" Item a", "  Item a1", " Item b"]);
    }
}
