// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree construction inputs.
//!
//! A [`TreeConfig`] bundles the field accessors, the [`TreeOptions`], the
//! initial key inputs, and the optional delegates. Supplying a delegate switches
//! that concern (expansion, checkboxes, focus) to delegated mode: the engine
//! stops mutating it and reports proposals instead.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::accessor::{Accessor, resolve_root};
use crate::checkbox::CheckedRowKeysChanged;
use crate::error::ConfigurationError;
use crate::expansion::ExpandedRowKeysChanged;
use crate::focus::FocusedRowKeyChanged;
use crate::registry::Fields;
use crate::types::{RowKey, ToggleMode};

/// Host callback receiving a change proposal.
pub type Delegate<E> = Box<dyn FnMut(&E)>;

/// Tree-wide behavior switches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeOptions {
    /// Every interaction becomes a no-op.
    pub disabled: bool,
    /// Nodes show checkboxes unless their checkbox-visible accessor says otherwise.
    pub allow_checkboxes: bool,
    /// Expose the header row that toggles the root's checkbox.
    pub allow_check_all: bool,
    /// Rows can take focus.
    pub allow_focusing: bool,
    /// Title of the check-all header row.
    pub header_title: String,
    /// Direction taken when an undetermined checkbox is clicked.
    pub descendant_toggle_mode: ToggleMode,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            disabled: false,
            allow_checkboxes: false,
            allow_check_all: false,
            allow_focusing: false,
            header_title: String::from("Check all"),
            descendant_toggle_mode: ToggleMode::Deselect,
        }
    }
}

/// Everything needed to build a [`TreeGrid`](crate::TreeGrid).
///
/// `root_id`, `id` and `parent_id` are required. The root has no record, so
/// its id must be a literal or a callback; record ids and parent ids must come
/// from the record, so they cannot be literals.
pub struct TreeConfig<R> {
    /// Identifier of the synthetic root.
    pub root_id: Option<Accessor<R, RowKey>>,
    /// Record identifier.
    pub id: Option<Accessor<R, RowKey>>,
    /// Parent identifier of a record; a null reading is an error.
    pub parent_id: Option<Accessor<R, Option<RowKey>>>,
    /// Whether a record declares children. Defaults to false.
    pub has_children: Option<Accessor<R, bool>>,
    /// Whether a record shows a checkbox when checkboxes are allowed. Defaults to true.
    pub checkbox_visible: Option<Accessor<R, bool>>,
    /// Whether a record renders as disabled. Defaults to false.
    pub disabled: Option<Accessor<R, bool>>,
    /// Row title.
    pub title: Option<Accessor<R, String>>,
    /// Row hint.
    pub hint: Option<Accessor<R, String>>,
    /// Behavior switches.
    pub options: TreeOptions,
    /// Initially checked keys; the authoritative input when checkboxes are delegated.
    pub checked_row_keys: Vec<RowKey>,
    /// Initially expanded keys; the authoritative input when expansion is delegated.
    pub expanded_row_keys: Vec<RowKey>,
    /// Initially focused key; the authoritative input when focus is delegated.
    pub focused_row_key: Option<RowKey>,
    /// Delegates expansion to the host.
    pub on_expanded_row_keys_changed: Option<Delegate<ExpandedRowKeysChanged>>,
    /// Delegates checkbox state to the host.
    pub on_checked_row_keys_changed: Option<Delegate<CheckedRowKeysChanged>>,
    /// Delegates focus to the host.
    pub on_focused_row_key_changed: Option<Delegate<FocusedRowKeyChanged>>,
}

impl<R> Default for TreeConfig<R> {
    fn default() -> Self {
        Self {
            root_id: None,
            id: None,
            parent_id: None,
            has_children: None,
            checkbox_visible: None,
            disabled: None,
            title: None,
            hint: None,
            options: TreeOptions::default(),
            checked_row_keys: Vec::new(),
            expanded_row_keys: Vec::new(),
            focused_row_key: None,
            on_expanded_row_keys_changed: None,
            on_checked_row_keys_changed: None,
            on_focused_row_key_changed: None,
        }
    }
}

impl<R> TreeConfig<R> {
    /// Config with the three required accessors set and everything else defaulted.
    pub fn new(
        root_id: impl Into<RowKey>,
        id: Accessor<R, RowKey>,
        parent_id: Accessor<R, Option<RowKey>>,
    ) -> Self {
        Self {
            root_id: Some(Accessor::literal(root_id.into())),
            id: Some(id),
            parent_id: Some(parent_id),
            ..Self::default()
        }
    }

    /// Set the behavior switches.
    pub fn with_options(mut self, options: TreeOptions) -> Self {
        self.options = options;
        self
    }

    /// Delegate expansion to `f`.
    pub fn on_expanded_row_keys_changed(
        mut self,
        f: impl FnMut(&ExpandedRowKeysChanged) + 'static,
    ) -> Self {
        self.on_expanded_row_keys_changed = Some(Box::new(f));
        self
    }

    /// Delegate checkbox state to `f`.
    pub fn on_checked_row_keys_changed(
        mut self,
        f: impl FnMut(&CheckedRowKeysChanged) + 'static,
    ) -> Self {
        self.on_checked_row_keys_changed = Some(Box::new(f));
        self
    }

    /// Delegate focus to `f`.
    pub fn on_focused_row_key_changed(
        mut self,
        f: impl FnMut(&FocusedRowKeyChanged) + 'static,
    ) -> Self {
        self.on_focused_row_key_changed = Some(Box::new(f));
        self
    }

    /// Check the accessors and split the config into its parts.
    pub(crate) fn validate(self) -> Result<Validated<R>, ConfigurationError> {
        let root_id = resolve_root("root_id", self.root_id.as_ref())?;
        let id = required("id", self.id)?;
        let parent_id = required("parent_id", self.parent_id)?;
        Ok(Validated {
            root_id,
            fields: Fields {
                id,
                parent_id,
                has_children: self.has_children,
                checkbox_visible: self.checkbox_visible,
                disabled: self.disabled,
                title: self.title,
                hint: self.hint,
            },
            options: self.options,
            inputs: Inputs {
                checked_row_keys: self.checked_row_keys,
                expanded_row_keys: self.expanded_row_keys,
                focused_row_key: self.focused_row_key,
            },
            delegates: Delegates {
                expanded: self.on_expanded_row_keys_changed,
                checked: self.on_checked_row_keys_changed,
                focused: self.on_focused_row_key_changed,
            },
        })
    }
}

impl<R> fmt::Debug for TreeConfig<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeConfig")
            .field("root_id", &self.root_id)
            .field("id", &self.id)
            .field("parent_id", &self.parent_id)
            .field("options", &self.options)
            .field("checked_row_keys", &self.checked_row_keys)
            .field("expanded_row_keys", &self.expanded_row_keys)
            .field("focused_row_key", &self.focused_row_key)
            .finish_non_exhaustive()
    }
}

fn required<R, T>(
    field: &'static str,
    accessor: Option<Accessor<R, T>>,
) -> Result<Accessor<R, T>, ConfigurationError> {
    match accessor {
        None => Err(ConfigurationError::MissingAccessor { field }),
        Some(a) if a.is_literal() => Err(ConfigurationError::LiteralNotAllowed { field }),
        Some(a) => Ok(a),
    }
}

/// Host-owned key inputs.
#[derive(Clone, Debug, Default)]
pub(crate) struct Inputs {
    pub(crate) checked_row_keys: Vec<RowKey>,
    pub(crate) expanded_row_keys: Vec<RowKey>,
    pub(crate) focused_row_key: Option<RowKey>,
}

pub(crate) struct Delegates {
    pub(crate) expanded: Option<Delegate<ExpandedRowKeysChanged>>,
    pub(crate) checked: Option<Delegate<CheckedRowKeysChanged>>,
    pub(crate) focused: Option<Delegate<FocusedRowKeyChanged>>,
}

impl fmt::Debug for Delegates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delegates")
            .field("expanded", &self.expanded.is_some())
            .field("checked", &self.checked.is_some())
            .field("focused", &self.focused.is_some())
            .finish()
    }
}

#[derive(Debug)]
pub(crate) struct Validated<R> {
    pub(crate) root_id: RowKey,
    pub(crate) fields: Fields<R>,
    pub(crate) options: TreeOptions,
    pub(crate) inputs: Inputs,
    pub(crate) delegates: Delegates,
}
