// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error taxonomy.
//!
//! - [`ConfigurationError`] is raised by [`TreeGrid::new`](crate::TreeGrid::new) and is fatal.
//! - [`MaterializeError`] is raised while turning a loaded record into a node.
//! - [`LoadError`] wraps either a rejected load or a materialization failure. It is never
//!   propagated out of [`TreeGrid::complete_load`](crate::TreeGrid::complete_load); it lands in
//!   the tree's error display slot instead.

use alloc::string::String;

use thiserror::Error;

use crate::types::RowKey;

/// Invalid tree configuration, detected at construction.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A required accessor was not supplied.
    #[error("accessor for '{field}' is not defined")]
    MissingAccessor {
        /// Name of the configured field (for example `"id"`).
        field: &'static str,
    },
    /// The record id and parent id must be read from the record.
    #[error("accessor for '{field}' cannot be a literal value")]
    LiteralNotAllowed {
        /// Name of the configured field.
        field: &'static str,
    },
    /// The synthetic root has no record to read a property from.
    #[error("root id cannot be read from record property '{name}'")]
    RootIdFromField {
        /// Property name that was configured.
        name: String,
    },
}

/// Failure to materialize a record into a node.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MaterializeError {
    /// The identifier is already registered.
    #[error("duplicated node identifier: '{id}'")]
    DuplicateId {
        /// Offending identifier.
        id: RowKey,
    },
    /// The parent identifier does not name a registered node.
    #[error("unable to find parent node, unknown parent id '{parent_id}' for node '{id}'")]
    UnknownParent {
        /// Identifier of the record being materialized.
        id: RowKey,
        /// Parent identifier the record refers to.
        parent_id: RowKey,
    },
    /// The parent identifier resolved to null.
    #[error("parent id is not defined for node '{id}'")]
    MissingParentId {
        /// Identifier of the record being materialized.
        id: RowKey,
    },
    /// A property-name accessor named a property the record does not have.
    #[error("property '{name}' (accessor '{field}') not found on the provided record")]
    MissingField {
        /// Name of the configured field.
        field: &'static str,
        /// Property name that was looked up.
        name: String,
    },
    /// A property exists but holds a value of the wrong type.
    #[error("property '{name}' (accessor '{field}') holds a value of an unexpected type")]
    FieldType {
        /// Name of the configured field.
        field: &'static str,
        /// Property name that was looked up.
        name: String,
    },
}

/// A failed children load, as shown by the error display.
///
/// `E` is the error type of the load collaborator.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LoadError<E> {
    /// The load collaborator rejected the request.
    #[error("loading children of '{parent_id}' failed: {error}")]
    Rejected {
        /// Node whose children were requested.
        parent_id: RowKey,
        /// Error value returned by the collaborator.
        error: E,
    },
    /// A returned record could not be materialized; the rest of the batch was skipped.
    #[error("loading children of '{parent_id}' failed: {source}")]
    Materialize {
        /// Node whose children were requested.
        parent_id: RowKey,
        /// Materialization failure.
        #[source]
        source: MaterializeError,
    },
}

impl<E> LoadError<E> {
    /// Node whose children load failed.
    pub fn parent_id(&self) -> &RowKey {
        match self {
            Self::Rejected { parent_id, .. } | Self::Materialize { parent_id, .. } => parent_id,
        }
    }

    /// Returns the materialization failure, if that is what aborted the load.
    pub fn materialize_error(&self) -> Option<&MaterializeError> {
        match self {
            Self::Materialize { source, .. } => Some(source),
            Self::Rejected { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn messages_name_the_offender() {
        let err = MaterializeError::DuplicateId {
            id: RowKey::from("a"),
        };
        assert_eq!(err.to_string(), "duplicated node identifier: 'a'");

        let err = MaterializeError::MissingField {
            field: "title",
            name: "caption".into(),
        };
        assert!(err.to_string().contains("'caption'"), "{err}");
        assert!(err.to_string().contains("'title'"), "{err}");
    }

    #[test]
    fn load_error_exposes_parent_and_source() {
        let err: LoadError<&str> = LoadError::Rejected {
            parent_id: RowKey::from(7_i64),
            error: "offline",
        };
        assert_eq!(err.parent_id(), &RowKey::from(7_i64));
        assert!(err.materialize_error().is_none());
        assert_eq!(err.to_string(), "loading children of '7' failed: offline");

        let err: LoadError<&str> = LoadError::Materialize {
            parent_id: RowKey::from("root"),
            source: MaterializeError::MissingParentId {
                id: RowKey::from("x"),
            },
        };
        assert!(matches!(
            err.materialize_error(),
            Some(MaterializeError::MissingParentId { .. })
        ));
    }
}
