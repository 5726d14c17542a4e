// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core value types: row keys, tri-state check values, toggle policy, and node flags.
//!
//! ## Overview
//!
//! These types describe node identity and per-node state.
//! They are shared by the [registry](crate::registry), the interaction engines, and the
//! [row snapshots](crate::rows) handed to renderers.

use alloc::string::String;
use core::fmt;

use bitflags::bitflags;

/// Identifier of a row (node) in the tree.
///
/// Identifiers are either integers or strings, as supplied by the records.
/// They are totally ordered so they can key ordered collections; an integer key
/// never equals a string key, even when they print the same (`1` vs `"1"`).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RowKey {
    /// Numeric identifier.
    Int(i64),
    /// String identifier.
    Str(String),
}

impl RowKey {
    /// Returns the string form if this is a string key.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            Self::Int(_) => None,
        }
    }

    /// Returns the integer form if this is a numeric key.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Str(_) => None,
        }
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RowKey {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for RowKey {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for RowKey {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<&str> for RowKey {
    fn from(value: &str) -> Self {
        Self::Str(String::from(value))
    }
}

impl From<String> for RowKey {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&String> for RowKey {
    fn from(value: &String) -> Self {
        Self::Str(value.clone())
    }
}

/// Tri-state checkbox value.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum CheckState {
    /// The node and all of its loaded descendants are checked.
    Checked,
    /// Neither the node nor any loaded descendant is checked.
    #[default]
    Unchecked,
    /// Some, but not all, loaded descendants are checked.
    Undetermined,
}

impl CheckState {
    /// Returns true for [`CheckState::Checked`].
    #[inline]
    pub fn is_checked(self) -> bool {
        self == Self::Checked
    }

    /// Returns true for [`CheckState::Checked`] or [`CheckState::Undetermined`].
    #[inline]
    pub fn is_partially_checked(self) -> bool {
        self != Self::Unchecked
    }
}

/// Direction taken when an [`Undetermined`](CheckState::Undetermined) node is clicked.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ToggleMode {
    /// Check the whole subtree.
    Select,
    /// Uncheck the whole subtree.
    #[default]
    Deselect,
}

/// Progress of the children load for one node.
///
/// `NotLoaded → Loading → Loaded` on success, `NotLoaded → Loading → Failed` on failure.
/// A failed node can be loaded again by a later toggle.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum LoadState {
    /// No load has been issued yet.
    #[default]
    NotLoaded,
    /// A load request is outstanding.
    Loading,
    /// The last load completed successfully (possibly with no children).
    Loaded,
    /// The last load was rejected or its records could not be materialized.
    Failed,
}

bitflags! {
    /// Per-node boolean state.
    ///
    /// `EXPANDED` and `FOCUSED` are owned by the engine in self-managed mode and
    /// recomputed from the host's key inputs on every render pass in delegated mode.
    /// The remaining bits are resolved once when the node is materialized, except
    /// `CHILDREN_LOADED` and `HAS_EXPANDABLE_CHILDREN`, which follow the loads.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// The record declares that the node has children.
        const HAS_CHILDREN            = 0b0000_0001;
        /// A load populated the node's children.
        const CHILDREN_LOADED         = 0b0000_0010;
        /// The node is expanded.
        const EXPANDED                = 0b0000_0100;
        /// The node holds focus.
        const FOCUSED                 = 0b0000_1000;
        /// The record marks the node as disabled.
        const DISABLED                = 0b0001_0000;
        /// The node shows a checkbox.
        const HAS_CHECKBOX            = 0b0010_0000;
        /// At least one loaded child declares children of its own.
        const HAS_EXPANDABLE_CHILDREN = 0b0100_0000;
    }
}

/// Slot of a node in the registry arena.
///
/// Back-references (`parent`, `children`, the focused node) are stored as slots,
/// never as owning pointers. Slots are only valid for the registry epoch they
/// were handed out in; a reset invalidates all of them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeIndex(u32);

impl NodeIndex {
    pub(crate) fn new(idx: usize) -> Self {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Registries hold fewer than u32::MAX nodes."
        )]
        Self(idx as u32)
    }

    pub(crate) fn idx(self) -> usize {
        self.0 as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn int_and_str_keys_never_collide() {
        assert_ne!(RowKey::from(1_i64), RowKey::from("1"));
        assert_eq!(RowKey::from(1_i64).to_string(), RowKey::from("1").to_string());
    }

    #[test]
    fn key_ordering_is_total() {
        let mut keys = alloc::vec![
            RowKey::from("b"),
            RowKey::from(2_i64),
            RowKey::from("a"),
            RowKey::from(1_i64),
        ];
        keys.sort();
        assert_eq!(
            keys,
            alloc::vec![
                RowKey::from(1_i64),
                RowKey::from(2_i64),
                RowKey::from("a"),
                RowKey::from("b"),
            ],
            "integers order before strings, then by value"
        );
    }

    #[test]
    fn check_state_predicates() {
        assert!(CheckState::Checked.is_checked());
        assert!(!CheckState::Undetermined.is_checked());
        assert!(CheckState::Undetermined.is_partially_checked());
        assert!(!CheckState::Unchecked.is_partially_checked());
        assert_eq!(CheckState::default(), CheckState::Unchecked);
        assert_eq!(ToggleMode::default(), ToggleMode::Deselect);
    }
}
