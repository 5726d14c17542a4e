// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Field accessors: how identity, flags and presentation values are read off records.
//!
//! ## Overview
//!
//! Records are opaque to the engine. Each per-record value (id, parent id, has-children,
//! checkbox visibility, disabled, title, hint) is configured with an [`Accessor`]:
//!
//! - [`Accessor::Literal`]: a fixed value (used for the root id).
//! - [`Accessor::Field`]: a property name, read through [`Record::field`].
//! - [`Accessor::Compute`]: a callback receiving an [`AccessorContext`].
//!
//! Resolution is a pure function of the accessor and the record.
//!
//! ```
//! use understory_tree_grid::{Accessor, FieldValue, Record, RowKey};
//!
//! struct Item { id: i64 }
//! impl Record for Item {
//!     fn field(&self, name: &str) -> Option<FieldValue> {
//!         (name == "id").then_some(FieldValue::Int(self.id))
//!     }
//! }
//!
//! let by_name: Accessor<Item, RowKey> = Accessor::field("id");
//! let computed: Accessor<Item, RowKey> =
//!     Accessor::compute(|cx| RowKey::from(cx.record.map_or(0, |r: &Item| r.id * 10)));
//! # let _ = (by_name, computed);
//! ```

use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::string::{String, ToString};
use core::fmt;

use crate::error::{ConfigurationError, MaterializeError};
use crate::types::RowKey;

/// Dynamically typed value read from a record property.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    /// Present but null.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// String value.
    Str(String),
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Str(String::from(value))
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<RowKey> for FieldValue {
    fn from(value: RowKey) -> Self {
        match value {
            RowKey::Int(n) => Self::Int(n),
            RowKey::Str(s) => Self::Str(s),
        }
    }
}

impl<T: Into<Self>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Property access on an external record.
///
/// The engine never mutates records; it only reads the properties named by
/// [`Accessor::Field`] accessors.
pub trait Record {
    /// Returns the value of the named property, or `None` if the record has no such property.
    fn field(&self, name: &str) -> Option<FieldValue>;
}

#[cfg(feature = "serde_json")]
impl Record for serde_json::Value {
    fn field(&self, name: &str) -> Option<FieldValue> {
        use serde_json::Value;
        let value = self.as_object()?.get(name)?;
        Some(match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Int(i),
                None => FieldValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => FieldValue::Str(s.clone()),
            // Nested structures have no scalar reading.
            Value::Array(_) | Value::Object(_) => FieldValue::Null,
        })
    }
}

/// Context handed to [`Accessor::Compute`] callbacks.
#[derive(Debug)]
pub struct AccessorContext<'a, R> {
    /// The record being resolved, or `None` for the synthetic root.
    pub record: Option<&'a R>,
}

/// Callback form of an accessor.
pub type ComputeFn<R, T> = Box<dyn Fn(&AccessorContext<'_, R>) -> T>;

/// How one per-record value is obtained.
pub enum Accessor<R, T> {
    /// A fixed value.
    Literal(T),
    /// A property name read through [`Record::field`].
    Field(Cow<'static, str>),
    /// A callback evaluated against the record.
    Compute(ComputeFn<R, T>),
}

impl<R, T> Accessor<R, T> {
    /// Read the value from the named record property.
    pub fn field(name: impl Into<Cow<'static, str>>) -> Self {
        Self::Field(name.into())
    }

    /// Compute the value with a callback.
    pub fn compute(f: impl Fn(&AccessorContext<'_, R>) -> T + 'static) -> Self {
        Self::Compute(Box::new(f))
    }

    /// Use a fixed value.
    pub fn literal(value: T) -> Self {
        Self::Literal(value)
    }

    pub(crate) fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }
}

impl<R, T: fmt::Debug> fmt::Debug for Accessor<R, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(v) => f.debug_tuple("Literal").field(v).finish(),
            Self::Field(name) => f.debug_tuple("Field").field(name).finish(),
            Self::Compute(_) => f.write_str("Compute(..)"),
        }
    }
}

/// Conversion from a raw property value into an accessor's output type.
pub(crate) trait FromField: Sized {
    fn from_field(value: FieldValue) -> Option<Self>;
}

impl FromField for RowKey {
    fn from_field(value: FieldValue) -> Option<Self> {
        Option::<Self>::from_field(value).flatten()
    }
}

// Null is a valid reading for a parent id; it is reported as a missing parent later.
impl FromField for Option<RowKey> {
    fn from_field(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Null => Some(None),
            FieldValue::Int(n) => Some(Some(RowKey::Int(n))),
            FieldValue::Str(s) => Some(Some(RowKey::Str(s))),
            FieldValue::Float(x) => {
                #[allow(
                    clippy::cast_possible_truncation,
                    reason = "The round trip below rejects anything that was truncated."
                )]
                let n = x as i64;
                #[allow(clippy::float_cmp, reason = "Exact integral check.")]
                let integral = n as f64 == x && x < i64::MAX as f64;
                integral.then_some(Some(RowKey::Int(n)))
            }
            FieldValue::Bool(_) => None,
        }
    }
}

impl FromField for bool {
    fn from_field(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Bool(b) => Some(b),
            FieldValue::Null => Some(false),
            _ => None,
        }
    }
}

impl FromField for String {
    fn from_field(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Str(s) => Some(s),
            FieldValue::Int(n) => Some(n.to_string()),
            FieldValue::Float(x) => Some(x.to_string()),
            FieldValue::Bool(b) => Some(b.to_string()),
            FieldValue::Null => None,
        }
    }
}

/// Resolve the root id. The root has no record, so only literals and callbacks apply.
pub(crate) fn resolve_root<R, T: Clone>(
    field: &'static str,
    accessor: Option<&Accessor<R, T>>,
) -> Result<T, ConfigurationError> {
    match accessor {
        None => Err(ConfigurationError::MissingAccessor { field }),
        Some(Accessor::Literal(v)) => Ok(v.clone()),
        Some(Accessor::Compute(f)) => Ok(f(&AccessorContext { record: None })),
        Some(Accessor::Field(name)) => Err(ConfigurationError::RootIdFromField {
            name: name.to_string(),
        }),
    }
}

/// Resolve a per-record value.
pub(crate) fn resolve<R: Record, T: FromField + Clone>(
    field: &'static str,
    accessor: &Accessor<R, T>,
    record: &R,
) -> Result<T, MaterializeError> {
    match accessor {
        Accessor::Literal(v) => Ok(v.clone()),
        Accessor::Compute(f) => Ok(f(&AccessorContext {
            record: Some(record),
        })),
        Accessor::Field(name) => {
            let raw = record
                .field(name)
                .ok_or_else(|| MaterializeError::MissingField {
                    field,
                    name: name.to_string(),
                })?;
            T::from_field(raw).ok_or_else(|| MaterializeError::FieldType {
                field,
                name: name.to_string(),
            })
        }
    }
}

/// Resolve an optional accessor, falling back to `default` when none is configured.
pub(crate) fn resolve_or<R: Record, T: FromField + Clone>(
    field: &'static str,
    accessor: Option<&Accessor<R, T>>,
    record: &R,
    default: T,
) -> Result<T, MaterializeError> {
    match accessor {
        Some(a) => resolve(field, a, record),
        None => Ok(default),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use alloc::collections::BTreeMap;

    /// Minimal map-backed record used across the crate's tests.
    #[derive(Clone, Debug, Default, PartialEq)]
    pub(crate) struct MapRecord(pub(crate) BTreeMap<&'static str, FieldValue>);

    impl MapRecord {
        pub(crate) fn with(mut self, name: &'static str, value: impl Into<FieldValue>) -> Self {
            self.0.insert(name, value.into());
            self
        }
    }

    impl Record for MapRecord {
        fn field(&self, name: &str) -> Option<FieldValue> {
            self.0.get(name).cloned()
        }
    }

    #[test]
    fn field_accessor_reads_property() {
        let rec = MapRecord::default().with("id", 5_i64).with("title", "five");
        let id: Accessor<MapRecord, RowKey> = Accessor::field("id");
        let title: Accessor<MapRecord, String> = Accessor::field("title");
        assert_eq!(resolve("id", &id, &rec), Ok(RowKey::Int(5)));
        assert_eq!(resolve("title", &title, &rec), Ok(String::from("five")));
    }

    #[test]
    fn missing_property_names_field_and_accessor() {
        let rec = MapRecord::default();
        let id: Accessor<MapRecord, RowKey> = Accessor::field("key");
        assert_eq!(
            resolve("id", &id, &rec),
            Err(MaterializeError::MissingField {
                field: "id",
                name: "key".into()
            })
        );
    }

    #[test]
    fn wrong_value_type_is_reported() {
        let rec = MapRecord::default().with("id", true);
        let id: Accessor<MapRecord, RowKey> = Accessor::field("id");
        assert!(matches!(
            resolve("id", &id, &rec),
            Err(MaterializeError::FieldType { field: "id", .. })
        ));
    }

    #[test]
    fn callback_sees_record_and_is_used_verbatim() {
        let rec = MapRecord::default().with("n", 3_i64);
        let acc: Accessor<MapRecord, bool> =
            Accessor::compute(|cx| cx.record.and_then(|r: &MapRecord| r.field("n")) == Some(FieldValue::Int(3)));
        assert_eq!(resolve("has_children", &acc, &rec), Ok(true));
    }

    #[test]
    fn null_parent_reads_as_none() {
        let rec = MapRecord::default().with("parent", FieldValue::Null);
        let acc: Accessor<MapRecord, Option<RowKey>> = Accessor::field("parent");
        assert_eq!(resolve("parent_id", &acc, &rec), Ok(None));
    }

    #[test]
    fn integral_floats_become_int_keys() {
        let rec = MapRecord::default().with("id", FieldValue::Float(4.0));
        let acc: Accessor<MapRecord, RowKey> = Accessor::field("id");
        assert_eq!(resolve("id", &acc, &rec), Ok(RowKey::Int(4)));
        let rec = MapRecord::default().with("id", FieldValue::Float(4.5));
        assert!(resolve("id", &acc, &rec).is_err());
    }

    #[test]
    fn root_resolution_forms() {
        let lit: Accessor<MapRecord, RowKey> = Accessor::literal(RowKey::from("0"));
        assert_eq!(resolve_root("root_id", Some(&lit)), Ok(RowKey::from("0")));

        let cb: Accessor<MapRecord, RowKey> =
            Accessor::compute(|cx| RowKey::from(if cx.record.is_none() { "root" } else { "x" }));
        assert_eq!(resolve_root("root_id", Some(&cb)), Ok(RowKey::from("root")));

        let by_name: Accessor<MapRecord, RowKey> = Accessor::field("id");
        assert!(matches!(
            resolve_root("root_id", Some(&by_name)),
            Err(ConfigurationError::RootIdFromField { .. })
        ));
        assert_eq!(
            resolve_root::<MapRecord, RowKey>("root_id", None),
            Err(ConfigurationError::MissingAccessor { field: "root_id" })
        );
    }

    #[test]
    fn optional_accessor_defaults() {
        let rec = MapRecord::default();
        assert_eq!(resolve_or::<_, bool>("disabled", None, &rec, false), Ok(false));
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn json_objects_are_records() {
        let v = serde_json::json!({ "id": 3, "name": "x", "parent": null, "ok": true });
        assert_eq!(v.field("id"), Some(FieldValue::Int(3)));
        assert_eq!(v.field("name"), Some(FieldValue::Str("x".into())));
        assert_eq!(v.field("parent"), Some(FieldValue::Null));
        assert_eq!(v.field("ok"), Some(FieldValue::Bool(true)));
        assert_eq!(v.field("missing"), None);
        assert_eq!(serde_json::json!([1, 2]).field("id"), None);
    }
}
