//! Extension table for app properties added through `extend_app`.
//!
//! Every key stored here is extension-origin and may be overwritten by a
//! later `extend_app`. Intrinsic properties may never be shadowed.

use std::collections::BTreeMap;

use serde_json::Value;

use nb_core::error::{NbError, NbResult};

/// Built-in properties every app carries, besides its namespace accessors.
///
/// Mirrors the public surface of [`App`](crate::App); keep the two in step.
pub const INTRINSIC_PROPERTIES: &[&str] = &[
    "accessor",
    "created_at",
    "delete",
    "extend_app",
    "extended",
    "extended_keys",
    "id",
    "is_deleted",
    "is_native_originated",
    "is_ready",
    "module",
    "module_as",
    "name",
    "on_ready",
    "on_ready_within",
    "options",
    "ptr_eq",
    "state",
    "summary",
    "to_string",
];

#[derive(Debug, Default)]
pub(crate) struct ExtensionTable {
    values: BTreeMap<String, Value>,
}

impl ExtensionTable {
    /// Merge `props` into the table.
    ///
    /// Nothing is written unless every key is allowed.
    pub(crate) fn merge<F>(&mut self, props: Value, is_intrinsic: F) -> NbResult<Vec<String>>
    where
        F: Fn(&str) -> bool,
    {
        let Value::Object(props) = props else {
            return Err(NbError::InvalidArgument(
                "extend_app expects an object of properties".into(),
            ));
        };

        if let Some(key) = props
            .keys()
            .find(|k| is_intrinsic(k.as_str()) && !self.values.contains_key(k.as_str()))
        {
            return Err(NbError::ProtectedProperty(key.clone()));
        }

        let keys = props.keys().cloned().collect();
        self.values.extend(props);
        Ok(keys)
    }

    pub(crate) fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub(crate) fn keys(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }
}
