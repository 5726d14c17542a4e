// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node registry: the authoritative in-memory tree.
//!
//! Nodes live in a single arena in insertion order and are looked up by [`RowKey`]
//! through an ordered index. Parent and child links are arena slots. Because a
//! parent must be registered before any of its children, arena order is always a
//! valid top-down order, and reverse arena order a valid bottom-up order.
//!
//! The registry only grows. [`NodeRegistry::reset`] discards everything, bumps
//! the epoch and recreates the synthetic root.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use crate::accessor::{Accessor, Record, resolve, resolve_or};
use crate::error::MaterializeError;
use crate::types::{CheckState, LoadState, NodeFlags, NodeIndex, RowKey};

/// Resolved accessor set used to materialize records.
#[derive(Debug)]
pub(crate) struct Fields<R> {
    pub(crate) id: Accessor<R, RowKey>,
    pub(crate) parent_id: Accessor<R, Option<RowKey>>,
    pub(crate) has_children: Option<Accessor<R, bool>>,
    pub(crate) checkbox_visible: Option<Accessor<R, bool>>,
    pub(crate) disabled: Option<Accessor<R, bool>>,
    pub(crate) title: Option<Accessor<R, String>>,
    pub(crate) hint: Option<Accessor<R, String>>,
}

/// Tree-level inputs consulted when a node is created.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Seed<'a> {
    pub(crate) allow_checkboxes: bool,
    pub(crate) allow_focusing: bool,
    pub(crate) expanded_row_keys: &'a [RowKey],
    pub(crate) focused_row_key: Option<&'a RowKey>,
}

/// State of one registered node.
#[derive(Clone, Debug)]
pub struct NodeState<R> {
    pub(crate) id: RowKey,
    pub(crate) parent_id: Option<RowKey>,
    pub(crate) level: u32,
    pub(crate) parent: Option<NodeIndex>,
    pub(crate) children: Vec<NodeIndex>,
    pub(crate) flags: NodeFlags,
    pub(crate) checked: CheckState,
    pub(crate) load: LoadState,
    pub(crate) title: Option<String>,
    pub(crate) hint: Option<String>,
    pub(crate) record: Option<R>,
}

impl<R> NodeState<R> {
    /// Node identifier.
    pub fn id(&self) -> &RowKey {
        &self.id
    }

    /// Parent identifier; `None` only for the synthetic root.
    pub fn parent_id(&self) -> Option<&RowKey> {
        self.parent_id.as_ref()
    }

    /// Depth; the root is level 0.
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Flag bits.
    pub fn flags(&self) -> NodeFlags {
        self.flags
    }

    /// Tri-state checkbox value.
    pub fn checked(&self) -> CheckState {
        self.checked
    }

    /// Progress of the children load.
    pub fn load_state(&self) -> LoadState {
        self.load
    }

    /// Number of loaded children.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// The record declares children.
    pub fn has_children(&self) -> bool {
        self.flags.contains(NodeFlags::HAS_CHILDREN)
    }

    /// A load populated the children.
    pub fn is_children_loaded(&self) -> bool {
        self.flags.contains(NodeFlags::CHILDREN_LOADED)
    }

    /// The node is expanded.
    pub fn is_expanded(&self) -> bool {
        self.flags.contains(NodeFlags::EXPANDED)
    }

    /// The node holds focus.
    pub fn is_focused(&self) -> bool {
        self.flags.contains(NodeFlags::FOCUSED)
    }

    /// The record marks the node disabled.
    pub fn is_disabled(&self) -> bool {
        self.flags.contains(NodeFlags::DISABLED)
    }

    /// The node shows a checkbox.
    pub fn has_checkbox(&self) -> bool {
        self.flags.contains(NodeFlags::HAS_CHECKBOX)
    }

    /// At least one loaded child declares children.
    pub fn has_expandable_children(&self) -> bool {
        self.flags.contains(NodeFlags::HAS_EXPANDABLE_CHILDREN)
    }

    /// Resolved title.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Resolved hint.
    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    /// Backing record; `None` for the synthetic root.
    pub fn record(&self) -> Option<&R> {
        self.record.as_ref()
    }

    /// Whether the node's subtree is traversed when rendering.
    pub(crate) fn shows_children(&self) -> bool {
        self.is_expanded() && self.is_children_loaded() && !self.children.is_empty()
    }

    pub(crate) fn set_flag(&mut self, flag: NodeFlags, on: bool) {
        self.flags.set(flag, on);
    }
}

/// Parameters of the synthetic root, kept so that a reset can recreate it.
#[derive(Clone, Debug)]
struct RootTemplate {
    id: RowKey,
    checked: CheckState,
    has_checkbox: bool,
}

/// Arena of nodes keyed by identifier.
pub struct NodeRegistry<R> {
    nodes: Vec<NodeState<R>>,
    by_id: BTreeMap<RowKey, NodeIndex>,
    root: RootTemplate,
    epoch: u64,
}

impl<R> core::fmt::Debug for NodeRegistry<R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let loaded = self.nodes.iter().filter(|n| n.is_children_loaded()).count();
        f.debug_struct("NodeRegistry")
            .field("root", &self.root.id)
            .field("nodes", &self.nodes.len())
            .field("loaded", &loaded)
            .field("epoch", &self.epoch)
            .finish_non_exhaustive()
    }
}

impl<R> NodeRegistry<R> {
    /// Create a registry holding only the synthetic root.
    pub(crate) fn new(root_id: RowKey, checked: CheckState, has_checkbox: bool) -> Self {
        let mut registry = Self {
            nodes: Vec::new(),
            by_id: BTreeMap::new(),
            root: RootTemplate {
                id: root_id,
                checked,
                has_checkbox,
            },
            epoch: 0,
        };
        registry.create_root();
        registry
    }

    fn create_root(&mut self) {
        let mut flags = NodeFlags::HAS_CHILDREN | NodeFlags::EXPANDED;
        flags.set(NodeFlags::HAS_CHECKBOX, self.root.has_checkbox);
        let root = NodeState {
            id: self.root.id.clone(),
            parent_id: None,
            level: 0,
            parent: None,
            children: Vec::new(),
            flags,
            checked: self.root.checked,
            load: LoadState::NotLoaded,
            title: None,
            hint: None,
            record: None,
        };
        self.by_id.insert(root.id.clone(), NodeIndex::new(0));
        self.nodes.push(root);
    }

    /// Discard every node and recreate the root. Outstanding slots become stale.
    pub(crate) fn reset(&mut self, root_checked: CheckState) {
        self.nodes.clear();
        self.by_id.clear();
        self.root.checked = root_checked;
        self.epoch = self.epoch.wrapping_add(1);
        self.create_root();
    }

    /// Generation counter bumped by every reset.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Slot of the synthetic root.
    pub fn root(&self) -> NodeIndex {
        NodeIndex::new(0)
    }

    /// Identifier of the synthetic root.
    pub fn root_id(&self) -> &RowKey {
        &self.root.id
    }

    /// Number of registered nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the root is registered for the registry's whole lifetime.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node by identifier.
    pub fn get(&self, id: &RowKey) -> Option<&NodeState<R>> {
        self.index_of(id).map(|idx| self.node(idx))
    }

    /// Slot of the node with this identifier.
    pub fn index_of(&self, id: &RowKey) -> Option<NodeIndex> {
        self.by_id.get(id).copied()
    }

    /// Whether `idx` refers to a slot of the current epoch.
    pub fn contains(&self, idx: NodeIndex) -> bool {
        idx.idx() < self.nodes.len()
    }

    /// Node in slot `idx`; `None` if the slot predates a reset.
    pub fn node_at(&self, idx: NodeIndex) -> Option<&NodeState<R>> {
        self.nodes.get(idx.idx())
    }

    /// Slots handed out by this registry in the current epoch only.
    pub(crate) fn node(&self, idx: NodeIndex) -> &NodeState<R> {
        &self.nodes[idx.idx()]
    }

    pub(crate) fn node_mut(&mut self, idx: NodeIndex) -> &mut NodeState<R> {
        &mut self.nodes[idx.idx()]
    }

    /// Iterate nodes in registration order (parents before children).
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (NodeIndex, &NodeState<R>)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeIndex::new(i), n))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut NodeState<R>> + '_ {
        self.nodes.iter_mut()
    }

    /// Slots in registration order.
    pub(crate) fn indices(&self) -> impl DoubleEndedIterator<Item = NodeIndex> + use<R> {
        (0..self.nodes.len()).map(NodeIndex::new)
    }

    /// Ancestors of `idx`, nearest first, root last. Empty for a stale slot.
    pub fn ancestors(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        let first = self.node_at(idx).and_then(|n| n.parent);
        core::iter::successors(first, |p| self.node(*p).parent)
    }

    /// Path from the root to `idx`, inclusive. Empty for a stale slot.
    pub fn path_to_root(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        if !self.contains(idx) {
            return Vec::new();
        }
        let mut out: Vec<NodeIndex> = self.ancestors(idx).collect();
        out.reverse();
        out.push(idx);
        out
    }

    /// Every registered descendant of `idx` in depth-first pre-order.
    pub fn descendants(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        let Some(node) = self.node_at(idx) else {
            return out;
        };
        let mut stack: Vec<NodeIndex> = node.children.iter().rev().copied().collect();
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.node(n).children.iter().rev());
        }
        out
    }
}

impl<R: Record> NodeRegistry<R> {
    /// Turn a record into a registered node under its declared parent.
    ///
    /// `requested_parent` is the node the load was issued for; a record naming a
    /// different registered parent is still attached where it says.
    ///
    /// On success the node is appended to its parent's children and the parent
    /// is marked as having loaded children.
    pub(crate) fn materialize(
        &mut self,
        fields: &Fields<R>,
        seed: Seed<'_>,
        requested_parent: &RowKey,
        record: R,
    ) -> Result<NodeIndex, MaterializeError> {
        let id = resolve("id", &fields.id, &record)?;
        if self.by_id.contains_key(&id) {
            return Err(MaterializeError::DuplicateId { id });
        }
        let Some(parent_id) = resolve("parent_id", &fields.parent_id, &record)? else {
            return Err(MaterializeError::MissingParentId { id });
        };
        let Some(parent) = self.index_of(&parent_id) else {
            return Err(MaterializeError::UnknownParent { id, parent_id });
        };
        if &parent_id != requested_parent {
            tracing::debug!(
                message = "tree_grid.materialize.foreign_parent",
                id = %id,
                parent_id = %parent_id,
                requested = %requested_parent,
            );
        }

        let has_children = resolve_or("has_children", fields.has_children.as_ref(), &record, false)?;
        let has_checkbox = seed.allow_checkboxes
            && resolve_or(
                "checkbox_visible",
                fields.checkbox_visible.as_ref(),
                &record,
                true,
            )?;
        let disabled = resolve_or("disabled", fields.disabled.as_ref(), &record, false)?;
        let hint = fields
            .hint
            .as_ref()
            .map(|a| resolve("hint", a, &record))
            .transpose()?;
        let title = fields
            .title
            .as_ref()
            .map(|a| resolve("title", a, &record))
            .transpose()?;

        let mut flags = NodeFlags::empty();
        flags.set(NodeFlags::HAS_CHILDREN, has_children);
        flags.set(NodeFlags::HAS_CHECKBOX, has_checkbox);
        flags.set(NodeFlags::DISABLED, disabled);
        flags.set(NodeFlags::EXPANDED, seed.expanded_row_keys.contains(&id));
        flags.set(
            NodeFlags::FOCUSED,
            seed.allow_focusing && seed.focused_row_key == Some(&id),
        );

        let parent_node = self.node(parent);
        let node = NodeState {
            id: id.clone(),
            parent_id: Some(parent_id),
            level: parent_node.level + 1,
            parent: Some(parent),
            children: Vec::new(),
            flags,
            checked: if parent_node.checked.is_checked() {
                CheckState::Checked
            } else {
                CheckState::Unchecked
            },
            load: LoadState::NotLoaded,
            title,
            hint,
            record: Some(record),
        };

        let idx = NodeIndex::new(self.nodes.len());
        self.nodes.push(node);
        self.by_id.insert(id, idx);

        let parent_node = self.node_mut(parent);
        parent_node.children.push(idx);
        parent_node.flags.insert(NodeFlags::CHILDREN_LOADED);
        if has_children {
            parent_node.flags.insert(NodeFlags::HAS_EXPANDABLE_CHILDREN);
        }
        Ok(idx)
    }
}
