// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_tree_grid --heading-base-level=0

//! Understory Tree Grid: the state engine behind a lazily populated tree view.
//!
//! ## Overview
//!
//! This crate owns the node state of a hierarchical list whose items arrive on demand.
//! It does not draw anything and performs no I/O.
//! Instead, it keeps a registry of nodes materialized from your records, decides when a node's
//! children must be fetched, and maintains expansion, tri-state checkbox and focus state.
//! A renderer walks [`TreeGrid::visible_rows`] and dispatches [`RowAction`]s back.
//!
//! ## Records and accessors
//!
//! Records are any type implementing [`Record`].
//! Each per-record value (id, parent id, has-children, checkbox visibility, disabled, title, hint)
//! is read through an [`Accessor`]: a property name, a callback, or (for the root id) a literal.
//! With the `serde_json` feature, `serde_json::Value` objects are records.
//!
//! ## Loading
//!
//! Loads are sans-IO.
//! [`TreeGrid::start`] and [`TreeGrid::toggle_expand`] hand out [`LoadRequest`]s; fetch the
//! records however you like and return them with [`TreeGrid::complete_load`].
//! Failures land in an error slot ([`TreeGrid::error`]) rather than being returned, and a later
//! toggle retries.
//! Requests issued before a [`TreeGrid::reset`], or answered after [`TreeGrid::deactivate`], are ignored.
//!
//! ## Checkboxes
//!
//! Clicking a checkbox sets the node and its loaded descendants, then re-derives every ancestor:
//! all children checked gives checked, some checked or undetermined gives undetermined,
//! otherwise unchecked. Children that are not loaded yet do not count.
//! An undetermined node resolves according to [`ToggleMode`].
//!
//! ## Self-managed and delegated state
//!
//! Expansion, checkboxes and focus can each be delegated to the host by installing a callback on
//! the [`TreeConfig`]. A delegated concern is never mutated by interactions; the engine computes a
//! proposal ([`ExpandedRowKeysChanged`], [`CheckedRowKeysChanged`], [`FocusedRowKeyChanged`]),
//! hands it to the callback, and takes the host's answer from the key inputs on the next
//! [`TreeGrid::sync`].
//!
//! ## Example
//!
//! ```
//! use understory_tree_grid::{
//!     Accessor, CheckState, FieldValue, LoadOutcome, Outcome, Record, RowKey, ToggleMode,
//!     TreeConfig, TreeGrid, TreeOptions,
//! };
//!
//! struct Item {
//!     id: &'static str,
//!     parent: &'static str,
//!     folder: bool,
//! }
//!
//! impl Record for Item {
//!     fn field(&self, name: &str) -> Option<FieldValue> {
//!         match name {
//!             "id" => Some(self.id.into()),
//!             "parent" => Some(self.parent.into()),
//!             "folder" => Some(self.folder.into()),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let mut config = TreeConfig::new("root", Accessor::field("id"), Accessor::field("parent"))
//!     .with_options(TreeOptions {
//!         allow_checkboxes: true,
//!         descendant_toggle_mode: ToggleMode::Select,
//!         ..TreeOptions::default()
//!     });
//! config.has_children = Some(Accessor::field("folder"));
//! let mut grid: TreeGrid<Item, &str> = TreeGrid::new(config).unwrap();
//!
//! let request = grid.start().unwrap();
//! let children = vec![
//!     Item { id: "docs", parent: "root", folder: true },
//!     Item { id: "todo.txt", parent: "root", folder: false },
//! ];
//! grid.complete_load(request.respond(Ok(children)));
//!
//! let Outcome::Load(request) = grid.toggle_expand(&RowKey::from("docs")) else {
//!     unreachable!()
//! };
//! let outcome = grid.complete_load(request.respond(Ok(vec![
//!     Item { id: "a.md", parent: "docs", folder: false },
//! ])));
//! assert!(matches!(outcome, LoadOutcome::Loaded { .. }));
//!
//! grid.toggle_check(&RowKey::from("docs"));
//! let rows: Vec<_> = grid
//!     .visible_rows()
//!     .map(|row| (row.id().to_string(), row.level(), row.checked()))
//!     .collect();
//! assert_eq!(
//!     rows,
//!     [
//!         ("docs".to_string(), 1, CheckState::Checked),
//!         ("a.md".to_string(), 2, CheckState::Checked),
//!         ("todo.txt".to_string(), 1, CheckState::Unchecked),
//!     ]
//! );
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod accessor;
mod checkbox;
mod config;
mod error;
mod expansion;
mod focus;
mod grid;
mod lazy_load;
mod store;

pub mod registry;
pub mod rows;
pub mod types;

pub use accessor::{Accessor, AccessorContext, ComputeFn, FieldValue, Record};
pub use checkbox::CheckedRowKeysChanged;
pub use config::{Delegate, TreeConfig, TreeOptions};
pub use error::{ConfigurationError, LoadError, MaterializeError};
pub use expansion::ExpandedRowKeysChanged;
pub use focus::FocusedRowKeyChanged;
pub use grid::{Outcome, TreeGrid};
pub use lazy_load::{LoadChildren, LoadOutcome, LoadRequest, LoadResponse, LoadTicket};
pub use registry::{NodeRegistry, NodeState};
pub use rows::{HeaderView, RowAction, RowRenderer, RowView, VisibleRows, default_title};
pub use types::{CheckState, LoadState, NodeFlags, NodeIndex, RowKey, ToggleMode};
