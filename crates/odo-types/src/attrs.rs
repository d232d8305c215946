//! Generic attribute representation for the remote partitioned table.
//!
//! The remote table is schemaless: every row is a map from attribute name to
//! a loosely-typed value. Numbers travel as decimal strings (the table's
//! numeric attributes are string-backed), so `N` deliberately wraps a
//! `String` rather than an integer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A row (or nested map) in the remote table: attribute name to value.
pub type AttrMap = BTreeMap<String, AttrValue>;

/// A single loosely-typed attribute value.
///
/// Serde uses external tagging, so the JSON form matches the table's wire
/// encoding: `{"S": "oil"}`, `{"N": "5000"}`, `{"L": [...]}`, `{"M": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    /// String attribute.
    S(String),
    /// Numeric attribute, encoded as a decimal string.
    N(String),
    /// List attribute.
    L(Vec<AttrValue>),
    /// Map attribute.
    M(AttrMap),
}

impl AttrValue {
    /// Build a string attribute.
    pub fn s(value: impl Into<String>) -> Self {
        AttrValue::S(value.into())
    }

    /// Build a numeric attribute from an integer.
    #[must_use]
    pub fn n(value: i64) -> Self {
        AttrValue::N(value.to_string())
    }

    /// The string payload, if this is an `S` attribute.
    #[must_use]
    pub fn as_s(&self) -> Option<&str> {
        match self {
            AttrValue::S(s) => Some(s),
            _ => None,
        }
    }

    /// The raw decimal string, if this is an `N` attribute.
    #[must_use]
    pub fn as_n(&self) -> Option<&str> {
        match self {
            AttrValue::N(n) => Some(n),
            _ => None,
        }
    }

    /// The elements, if this is an `L` attribute.
    #[must_use]
    pub fn as_l(&self) -> Option<&[AttrValue]> {
        match self {
            AttrValue::L(l) => Some(l),
            _ => None,
        }
    }

    /// The nested map, if this is an `M` attribute.
    #[must_use]
    pub fn as_m(&self) -> Option<&AttrMap> {
        match self {
            AttrValue::M(m) => Some(m),
            _ => None,
        }
    }
}
