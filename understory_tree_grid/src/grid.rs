// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The tree-grid state engine.
//!
//! [`TreeGrid`] owns the [`NodeRegistry`] and routes every interaction through
//! the expansion, checkbox and focus algorithms, picking the self-managed or
//! delegated store per concern. All entry points are synchronous; children
//! loads leave the engine as [`LoadRequest`]s and come back through
//! [`TreeGrid::complete_load`].

use alloc::vec::Vec;
use core::fmt;

use crate::accessor::Record;
use crate::checkbox;
use crate::config::{Delegates, Inputs, TreeConfig, TreeOptions};
use crate::error::{ConfigurationError, LoadError};
use crate::expansion;
use crate::focus::FocusTracker;
use crate::lazy_load::{self, LoadOutcome, LoadRequest, LoadResponse};
use crate::registry::{Fields, NodeRegistry, Seed};
use crate::rows::{HeaderView, RowAction, RowRenderer, VisibleRows};
use crate::store::{Delegated, SelfManaged};
use crate::types::{CheckState, LoadState, NodeIndex, RowKey};

/// What an interaction did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing happened: the tree or the target does not accept the interaction.
    Ignored,
    /// The engine updated its own state.
    Applied,
    /// A proposal was handed to the host's delegate; state is unchanged until the host answers.
    Delegated,
    /// The node's children must be loaded first. Answer with [`TreeGrid::complete_load`].
    Load(LoadRequest),
}

/// Lazily populated tree with expansion, tri-state checkboxes and focus.
///
/// `R` is the record type, `E` the error type of the children loader.
pub struct TreeGrid<R, E> {
    registry: NodeRegistry<R>,
    fields: Fields<R>,
    options: TreeOptions,
    inputs: Inputs,
    delegates: Delegates,
    focus: FocusTracker,
    error: Option<LoadError<E>>,
    started: bool,
    active: bool,
    dirty: bool,
}

impl<R, E: fmt::Debug> fmt::Debug for TreeGrid<R, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeGrid")
            .field("registry", &self.registry)
            .field("options", &self.options)
            .field("inputs", &self.inputs)
            .field("delegates", &self.delegates)
            .field("error", &self.error)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

fn seed<'a>(options: &TreeOptions, inputs: &'a Inputs) -> Seed<'a> {
    Seed {
        allow_checkboxes: options.allow_checkboxes,
        allow_focusing: options.allow_focusing,
        expanded_row_keys: &inputs.expanded_row_keys,
        focused_row_key: inputs.focused_row_key.as_ref(),
    }
}

fn root_state(root_id: &RowKey, inputs: &Inputs) -> CheckState {
    if inputs.checked_row_keys.contains(root_id) {
        CheckState::Checked
    } else {
        CheckState::Unchecked
    }
}

impl<R: Record, E: fmt::Debug> TreeGrid<R, E> {
    /// Build a tree holding only its synthetic root.
    ///
    /// Call [`TreeGrid::start`] to obtain the root's first children request.
    pub fn new(config: TreeConfig<R>) -> Result<Self, ConfigurationError> {
        let v = config.validate()?;
        let registry = NodeRegistry::new(
            v.root_id.clone(),
            root_state(&v.root_id, &v.inputs),
            v.options.allow_checkboxes,
        );
        tracing::debug!(
            message = "tree_grid.new",
            root_id = %v.root_id,
            delegated_expansion = v.delegates.expanded.is_some(),
            delegated_checkboxes = v.delegates.checked.is_some(),
            delegated_focus = v.delegates.focused.is_some(),
        );
        Ok(Self {
            registry,
            fields: v.fields,
            options: v.options,
            inputs: v.inputs,
            delegates: v.delegates,
            focus: FocusTracker::default(),
            error: None,
            started: false,
            active: true,
            dirty: true,
        })
    }

    /// The root's initial children request; `None` once it has been issued.
    pub fn start(&mut self) -> Option<LoadRequest> {
        if self.started || !self.active {
            return None;
        }
        self.started = true;
        let root = self.registry.root();
        Some(lazy_load::begin(&mut self.registry, root))
    }

    /// Discard every node and recreate the root.
    ///
    /// Outstanding requests become stale. [`TreeGrid::start`] issues a new root request afterwards.
    pub fn reset(&mut self) {
        let root_checked = root_state(self.registry.root_id(), &self.inputs);
        self.registry.reset(root_checked);
        self.focus.clear();
        self.started = false;
        self.dirty = true;
        tracing::debug!(message = "tree_grid.reset", epoch = self.registry.epoch());
    }

    /// Stop accepting load completions. Use when the tree is torn down with loads in flight.
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Whether load completions are still applied.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Integrate the answer to a [`LoadRequest`].
    pub fn complete_load(&mut self, response: LoadResponse<R, E>) -> LoadOutcome {
        let ticket = response.request.ticket();
        let idx = match lazy_load::redeem(&self.registry, ticket) {
            Some(idx) if self.active => idx,
            _ => {
                tracing::debug!(
                    message = "tree_grid.load.stale",
                    parent_id = %response.request.parent_id,
                    epoch = ticket.epoch(),
                    active = self.active,
                );
                return LoadOutcome::Stale;
            }
        };
        let parent_id = response.request.parent_id;

        let records = match response.result {
            Ok(records) => records,
            Err(error) => {
                self.fail(idx, LoadError::Rejected { parent_id, error });
                return LoadOutcome::Failed;
            }
        };
        if records.is_empty() {
            self.registry.node_mut(idx).load = LoadState::Loaded;
            tracing::debug!(message = "tree_grid.load.empty", parent_id = %parent_id);
            return LoadOutcome::Empty;
        }

        let batch = lazy_load::integrate(
            &mut self.registry,
            &self.fields,
            seed(&self.options, &self.inputs),
            idx,
            records,
        );
        let added: Vec<RowKey> = batch
            .added
            .iter()
            .map(|n| self.registry.node(*n).id.clone())
            .collect();
        let inherited_checked: Vec<RowKey> = batch
            .added
            .iter()
            .map(|n| self.registry.node(*n))
            .filter(|n| n.checked.is_checked())
            .map(|n| n.id.clone())
            .collect();
        for &n in &batch.added {
            self.focus.adopt(&mut self.registry, n);
        }
        if self.delegates.checked.is_some() {
            for key in &inherited_checked {
                if !self.inputs.checked_row_keys.contains(key) {
                    self.inputs.checked_row_keys.push(key.clone());
                }
            }
        }
        if let Some(source) = batch.error {
            self.fail(idx, LoadError::Materialize { parent_id, source });
            return LoadOutcome::Failed;
        }

        self.registry.node_mut(idx).load = LoadState::Loaded;
        tracing::debug!(
            message = "tree_grid.load.complete",
            parent_id = %parent_id,
            added = added.len(),
        );
        let expansion = if idx == self.registry.root() || self.registry.node(idx).is_expanded() {
            Outcome::Ignored
        } else {
            self.flip_expansion(idx)
        };
        LoadOutcome::Loaded {
            added,
            inherited_checked,
            expansion,
        }
    }

    /// Requests for expanded nodes whose children were never requested.
    ///
    /// Trees prepared with expanded keys call this after each completed load to
    /// walk down the prepared levels. Failed nodes are not retried.
    pub fn prepared_loads(&mut self) -> Vec<LoadRequest> {
        if self.options.disabled || !self.active {
            return Vec::new();
        }
        self.refresh();
        let root = self.registry.root();
        let pending: Vec<NodeIndex> = self
            .registry
            .iter()
            .filter(|(n, node)| {
                *n != root
                    && node.is_expanded()
                    && node.has_children()
                    && node.load == LoadState::NotLoaded
            })
            .map(|(n, _)| n)
            .collect();
        pending
            .into_iter()
            .map(|n| lazy_load::begin(&mut self.registry, n))
            .collect()
    }

    fn fail(&mut self, idx: NodeIndex, error: LoadError<E>) {
        lazy_load::fail(&mut self.registry, idx, &error);
        self.error = Some(error);
    }

    /// Resolve `id` to a slot, or `None` when the tree ignores interactions.
    fn target(&mut self, action: &'static str, id: &RowKey) -> Option<NodeIndex> {
        if self.options.disabled {
            tracing::debug!(message = "tree_grid.ignored", action, id = %id, reason = "disabled");
            return None;
        }
        let idx = self.registry.index_of(id);
        if idx.is_none() {
            tracing::debug!(message = "tree_grid.ignored", action, id = %id, reason = "unknown");
        }
        self.refresh();
        idx
    }

    /// Expand or collapse a node, loading its children first if needed.
    pub fn toggle_expand(&mut self, id: &RowKey) -> Outcome {
        let Some(idx) = self.target("toggle_expand", id) else {
            return Outcome::Ignored;
        };
        let node = self.registry.node(idx);
        if idx == self.registry.root() || node.load == LoadState::Loading {
            return Outcome::Ignored;
        }
        if node.is_children_loaded() || node.is_expanded() {
            self.flip_expansion(idx)
        } else if node.has_children() {
            Outcome::Load(lazy_load::begin(&mut self.registry, idx))
        } else {
            Outcome::Ignored
        }
    }

    fn flip_expansion(&mut self, idx: NodeIndex) -> Outcome {
        match self.delegates.expanded.as_mut() {
            None => {
                let on = expansion::toggle(&mut SelfManaged, &mut self.registry, idx);
                tracing::debug!(
                    message = "tree_grid.toggle_expand",
                    id = %self.registry.node(idx).id,
                    expanded = on,
                );
                Outcome::Applied
            }
            Some(delegate) => {
                let event = expansion::proposal(&self.registry, idx);
                delegate(&event);
                Outcome::Delegated
            }
        }
    }

    /// Click a node's checkbox.
    ///
    /// Ignored for nodes without a checkbox, and for the root unless check-all is allowed.
    pub fn toggle_check(&mut self, id: &RowKey) -> Outcome {
        let Some(idx) = self.target("toggle_check", id) else {
            return Outcome::Ignored;
        };
        let node = self.registry.node(idx);
        let allowed = if idx == self.registry.root() {
            self.options.allow_checkboxes && self.options.allow_check_all
        } else {
            node.has_checkbox()
        };
        if !allowed {
            return Outcome::Ignored;
        }
        let mode = self.options.descendant_toggle_mode;
        match self.delegates.checked.as_mut() {
            None => {
                let target = checkbox::toggle(&mut SelfManaged, &mut self.registry, idx, mode);
                tracing::debug!(
                    message = "tree_grid.toggle_check",
                    id = %id,
                    checked = ?target,
                );
                Outcome::Applied
            }
            Some(delegate) => {
                let mut store = Delegated::default();
                checkbox::toggle(&mut store, &mut self.registry, idx, mode);
                let event = checkbox::proposal(&store, &self.registry, idx);
                delegate(&event);
                Outcome::Delegated
            }
        }
    }

    /// Click the header's check-all box; toggles the root.
    pub fn toggle_check_all(&mut self) -> Outcome {
        let root_id = self.registry.root_id().clone();
        self.toggle_check(&root_id)
    }

    /// Click a row for focus. Clicking the focused row clears focus.
    pub fn click_focus(&mut self, id: &RowKey) -> Outcome {
        if !self.options.allow_focusing {
            return Outcome::Ignored;
        }
        let Some(idx) = self.target("focus", id) else {
            return Outcome::Ignored;
        };
        if idx == self.registry.root() {
            return Outcome::Ignored;
        }
        match self.delegates.focused.as_mut() {
            None => {
                let next = self.focus.click(&mut SelfManaged, &mut self.registry, idx, true);
                tracing::debug!(message = "tree_grid.focus", id = %id, focused = next.is_some());
                Outcome::Applied
            }
            Some(delegate) => {
                let next = self
                    .focus
                    .click(&mut Delegated::default(), &mut self.registry, idx, false);
                let event = self.focus.proposal(&self.registry, next);
                delegate(&event);
                Outcome::Delegated
            }
        }
    }

    /// Run a row action produced by a [`RowView`](crate::RowView) or [`HeaderView`].
    pub fn dispatch(&mut self, action: &RowAction) -> Outcome {
        match action {
            RowAction::ToggleExpand(id) => self.toggle_expand(id),
            RowAction::ToggleCheck(id) => self.toggle_check(id),
            RowAction::Focus(id) => self.click_focus(id),
            RowAction::CheckAll => self.toggle_check_all(),
        }
    }

    /// Render pass: take delegated state from the host's key inputs.
    ///
    /// Delegated checkboxes are rebuilt from the checked keys with every parent
    /// re-derived from its children; delegated expansion and focus are copied
    /// from the expanded keys and the focused key.
    pub fn sync(&mut self) {
        if self.delegates.checked.is_some() {
            checkbox::reconcile(&mut self.registry, &self.inputs.checked_row_keys);
        }
        if self.delegates.expanded.is_some() {
            expansion::reconcile(&mut self.registry, &self.inputs.expanded_row_keys);
        }
        if self.delegates.focused.is_some() && self.options.allow_focusing {
            self.focus
                .reconcile(&mut self.registry, self.inputs.focused_row_key.as_ref());
        }
        self.dirty = false;
    }

    fn refresh(&mut self) {
        if self.dirty {
            self.sync();
        }
    }

    /// Rows currently visible, depth-first. Call [`TreeGrid::sync`] first after changing inputs.
    pub fn visible_rows(&self) -> VisibleRows<'_, R> {
        VisibleRows::new(&self.registry, self.options.allow_focusing)
    }

    /// Sync, then render every visible row.
    pub fn render<T: RowRenderer<R>>(&mut self, renderer: &mut T) -> Vec<T::Output> {
        self.refresh();
        self.visible_rows()
            .map(|row| renderer.render_row(&row))
            .collect()
    }

    /// The check-all header, when checkboxes and check-all are allowed.
    pub fn header(&self) -> Option<HeaderView<'_>> {
        (self.options.allow_checkboxes && self.options.allow_check_all).then(|| HeaderView {
            title: &self.options.header_title,
            checked: self.registry.node(self.registry.root()).checked,
        })
    }
}

impl<R, E> TreeGrid<R, E> {
    /// The node registry.
    pub fn registry(&self) -> &NodeRegistry<R> {
        &self.registry
    }

    /// Behavior switches.
    pub fn options(&self) -> &TreeOptions {
        &self.options
    }

    /// Replace the checked-key input.
    pub fn set_checked_row_keys(&mut self, keys: impl IntoIterator<Item = RowKey>) {
        self.inputs.checked_row_keys = keys.into_iter().collect();
        self.dirty = true;
    }

    /// Replace the expanded-key input.
    pub fn set_expanded_row_keys(&mut self, keys: impl IntoIterator<Item = RowKey>) {
        self.inputs.expanded_row_keys = keys.into_iter().collect();
        self.dirty = true;
    }

    /// Replace the focused-key input.
    pub fn set_focused_row_key(&mut self, key: Option<RowKey>) {
        self.inputs.focused_row_key = key;
        self.dirty = true;
    }

    /// Current checked-key input, including keys appended by loads.
    pub fn checked_row_keys(&self) -> &[RowKey] {
        &self.inputs.checked_row_keys
    }

    /// Current expanded-key input.
    pub fn expanded_row_keys(&self) -> &[RowKey] {
        &self.inputs.expanded_row_keys
    }

    /// Key of the focused row.
    pub fn focused_row_key(&self) -> Option<&RowKey> {
        self.focus
            .current()
            .filter(|n| self.registry.contains(*n))
            .map(|n| &self.registry.node(n).id)
    }

    /// Keys of every checked node, root included, in registration order.
    pub fn checked_keys(&self) -> impl Iterator<Item = &RowKey> + '_ {
        self.registry
            .iter()
            .filter(|(_, n)| n.checked.is_checked())
            .map(|(_, n)| &n.id)
    }

    /// The last load failure, as shown by the error display.
    pub fn error(&self) -> Option<&LoadError<E>> {
        self.error.as_ref()
    }

    /// Whether the error display has something to show.
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Clear the error display.
    pub fn reset_error(&mut self) -> Option<LoadError<E>> {
        self.error.take()
    }
}
