// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lazy children loading.
//!
//! ## Protocol
//!
//! The engine never performs I/O. When an interaction needs a node's children it
//! marks the node [`LoadState::Loading`] and hands the host a [`LoadRequest`].
//! The host fetches the records however it likes and returns them with
//! [`TreeGrid::complete_load`](crate::TreeGrid::complete_load):
//!
//! ```text
//! NotLoaded ──toggle──▶ Loading ──Ok(non-empty)──▶ Loaded (children attached, node expanded)
//!                          │───Ok(empty)────────▶ Loaded (nothing attached, stays collapsed)
//!                          └───Err / bad record──▶ Failed (error displayed, retried by next toggle)
//! ```
//!
//! Every request carries a [`LoadTicket`] stamped with the registry epoch. A
//! completion whose ticket predates the last reset, or that arrives after the
//! tree was deactivated, is dropped.
//!
//! ## Async collaborators
//!
//! Hosts with an async data source can implement [`LoadChildren`] (closures
//! returning futures already do) and drive [`LoadRequest::fetch`] on their
//! executor of choice.
//!
//! ```
//! use understory_tree_grid::{FieldValue, LoadRequest, Record};
//!
//! struct Item(i64);
//! impl Record for Item {
//!     fn field(&self, name: &str) -> Option<FieldValue> {
//!         (name == "id").then_some(FieldValue::Int(self.0))
//!     }
//! }
//!
//! let loader = |req: &LoadRequest| {
//!     let level = req.parent_level;
//!     async move { Ok::<_, ()>(vec![Item(i64::from(level) + 1)]) }
//! };
//! # let _ = loader;
//! ```

use alloc::vec::Vec;
use core::future::Future;

use crate::accessor::Record;
use crate::error::{LoadError, MaterializeError};
use crate::registry::{Fields, NodeRegistry, Seed};
use crate::types::{LoadState, NodeIndex, RowKey};

/// Identifies one issued load.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct LoadTicket {
    epoch: u64,
    node: NodeIndex,
}

impl LoadTicket {
    /// Registry epoch the request was issued in.
    pub fn epoch(self) -> u64 {
        self.epoch
    }

    /// Slot of the node whose children were requested.
    pub fn node(self) -> NodeIndex {
        self.node
    }
}

/// Request for the children of one node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadRequest {
    ticket: LoadTicket,
    /// Node whose children are requested.
    pub parent_id: RowKey,
    /// Depth of that node; the root is level 0.
    pub parent_level: u32,
}

impl LoadRequest {
    /// Ticket to match the completion against.
    pub fn ticket(&self) -> LoadTicket {
        self.ticket
    }

    /// Answer this request with `result`.
    pub fn respond<R, E>(self, result: Result<Vec<R>, E>) -> LoadResponse<R, E> {
        LoadResponse {
            request: self,
            result,
        }
    }

    /// Run `loader` for this request and package its answer.
    pub async fn fetch<R, L: LoadChildren<R>>(self, loader: &L) -> LoadResponse<R, L::Error> {
        let result = loader.load_children(&self).await;
        self.respond(result)
    }
}

/// Answer to a [`LoadRequest`].
#[derive(Debug)]
pub struct LoadResponse<R, E> {
    /// The request being answered.
    pub request: LoadRequest,
    /// Child records in display order, or the collaborator's error.
    pub result: Result<Vec<R>, E>,
}

/// Asynchronous source of child records.
pub trait LoadChildren<R> {
    /// Error value carried to the error display on rejection.
    type Error;

    /// Fetch the children of `request.parent_id`. An empty vector means "no children".
    fn load_children(
        &self,
        request: &LoadRequest,
    ) -> impl Future<Output = Result<Vec<R>, Self::Error>>;
}

impl<R, E, F, Fut> LoadChildren<R> for F
where
    F: Fn(&LoadRequest) -> Fut,
    Fut: Future<Output = Result<Vec<R>, E>>,
{
    type Error = E;

    fn load_children(
        &self,
        request: &LoadRequest,
    ) -> impl Future<Output = Result<Vec<R>, Self::Error>> {
        self(request)
    }
}

/// Result of [`TreeGrid::complete_load`](crate::TreeGrid::complete_load).
#[derive(Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The ticket predates a reset or the tree was deactivated; nothing changed.
    Stale,
    /// The collaborator returned no records; the node stays collapsed.
    Empty,
    /// Children were attached.
    Loaded {
        /// Keys of the attached children, in load order.
        added: Vec<RowKey>,
        /// Attached children that inherited a checked parent.
        inherited_checked: Vec<RowKey>,
        /// What happened to the parent's expansion.
        expansion: crate::Outcome,
    },
    /// The load was rejected or a record could not be materialized.
    Failed,
}

/// Mark `idx` as loading and build its request.
pub(crate) fn begin<R>(reg: &mut NodeRegistry<R>, idx: NodeIndex) -> LoadRequest {
    let epoch = reg.epoch();
    let node = reg.node_mut(idx);
    node.load = LoadState::Loading;
    tracing::debug!(
        message = "tree_grid.load.issue",
        parent_id = %node.id,
        level = node.level,
        epoch,
    );
    LoadRequest {
        ticket: LoadTicket { epoch, node: idx },
        parent_id: node.id.clone(),
        parent_level: node.level,
    }
}

/// Slot the ticket refers to, if it is still awaiting an answer.
pub(crate) fn redeem<R>(reg: &NodeRegistry<R>, ticket: LoadTicket) -> Option<NodeIndex> {
    (ticket.epoch == reg.epoch()
        && reg.contains(ticket.node)
        && reg.node(ticket.node).load == LoadState::Loading)
        .then_some(ticket.node)
}

/// Nodes attached by one batch, and the error that cut it short.
#[derive(Debug)]
pub(crate) struct Batch {
    pub(crate) added: Vec<NodeIndex>,
    pub(crate) error: Option<MaterializeError>,
}

/// Materialize `records` in order under `idx`.
///
/// Stops at the first bad record. Nodes attached before it stay registered.
pub(crate) fn integrate<R: Record>(
    reg: &mut NodeRegistry<R>,
    fields: &Fields<R>,
    seed: Seed<'_>,
    idx: NodeIndex,
    records: Vec<R>,
) -> Batch {
    let parent_id = reg.node(idx).id.clone();
    let mut batch = Batch {
        added: Vec::with_capacity(records.len()),
        error: None,
    };
    for record in records {
        match reg.materialize(fields, seed, &parent_id, record) {
            Ok(child) => batch.added.push(child),
            Err(err) => {
                batch.error = Some(err);
                break;
            }
        }
    }
    batch
}

/// Record a failed load on the node.
pub(crate) fn fail<R, E>(reg: &mut NodeRegistry<R>, idx: NodeIndex, error: &LoadError<E>)
where
    E: core::fmt::Debug,
{
    reg.node_mut(idx).load = LoadState::Failed;
    tracing::warn!(
        message = "tree_grid.load.failed",
        parent_id = %error.parent_id(),
        error = ?error,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::Accessor;
    use crate::accessor::tests::MapRecord;
    use crate::types::CheckState;
    use alloc::vec;

    fn fields() -> Fields<MapRecord> {
        Fields {
            id: Accessor::field("id"),
            parent_id: Accessor::field("parent"),
            has_children: None,
            checkbox_visible: None,
            disabled: None,
            title: None,
            hint: None,
        }
    }

    fn rec(id: i64, parent: i64) -> MapRecord {
        MapRecord::default().with("id", id).with("parent", parent)
    }

    #[test]
    fn begin_marks_loading_and_ticket_redeems_once() {
        let mut reg: NodeRegistry<MapRecord> =
            NodeRegistry::new(RowKey::from(0_i64), CheckState::Unchecked, false);
        let root = reg.root();
        let req = begin(&mut reg, root);
        assert_eq!(req.parent_level, 0);
        assert_eq!(reg.node(reg.root()).load_state(), LoadState::Loading);
        assert_eq!(redeem(&reg, req.ticket()), Some(reg.root()));

        reg.node_mut(reg.root()).load = LoadState::Loaded;
        assert_eq!(redeem(&reg, req.ticket()), None, "already answered");
    }

    #[test]
    fn tickets_from_before_a_reset_are_stale() {
        let mut reg: NodeRegistry<MapRecord> =
            NodeRegistry::new(RowKey::from(0_i64), CheckState::Unchecked, false);
        let root = reg.root();
        let req = begin(&mut reg, root);
        reg.reset(CheckState::Unchecked);
        begin(&mut reg, root);
        assert_eq!(redeem(&reg, req.ticket()), None);
    }

    #[test]
    fn batch_stops_at_first_bad_record_and_keeps_the_rest() {
        let mut reg = NodeRegistry::new(RowKey::from(0_i64), CheckState::Unchecked, false);
        let root = reg.root();
        let batch = integrate(
            &mut reg,
            &fields(),
            Seed::default(),
            root,
            vec![rec(1, 0), rec(1, 0), rec(2, 0)],
        );
        assert_eq!(batch.added.len(), 1);
        assert!(matches!(
            batch.error,
            Some(MaterializeError::DuplicateId { .. })
        ));
        assert_eq!(reg.len(), 2, "record after the failure is not applied");
        assert!(reg.node(root).is_children_loaded());
    }

    #[test]
    fn closures_are_loaders() {
        let mut reg: NodeRegistry<MapRecord> =
            NodeRegistry::new(RowKey::from(0_i64), CheckState::Unchecked, false);
        let root = reg.root();
        let req = begin(&mut reg, root);
        let loader = |req: &LoadRequest| {
            let parent = req.parent_id.as_int().unwrap_or_default();
            async move { Ok::<_, &str>(vec![rec(parent + 1, parent)]) }
        };
        let response = futures::executor::block_on(req.clone().fetch(&loader));
        assert_eq!(response.request, req);
        assert_eq!(response.result.map(|v| v.len()), Ok(1));
    }
}
