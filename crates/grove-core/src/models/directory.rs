//! Raw directory records as exchanged with a [`DirectoryClient`].
//!
//! [`DirectoryClient`]: crate::repository::DirectoryClient

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchScope {
    /// Only the base entry itself.
    Base,
    /// The base entry and everything below it.
    Subtree,
}

/// A directory entry: its DN plus multi-valued attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub dn: String,
    pub attrs: BTreeMap<String, Vec<String>>,
}

impl DirectoryEntry {
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            attrs: BTreeMap::new(),
        }
    }

    /// Builder-style attribute setter; replaces any previous values.
    pub fn with_attr<I, S>(mut self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attrs
            .insert(name.to_string(), values.into_iter().map(Into::into).collect());
        self
    }

    /// All values of `name`. Attribute names compare case-insensitively.
    pub fn values(&self, name: &str) -> &[String] {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, values)| values.as_slice())
            .unwrap_or(&[])
    }

    /// The single value of a scalar attribute.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.values(name).first().map(String::as_str)
    }

    pub fn has_value(&self, name: &str, value: &str) -> bool {
        self.values(name).iter().any(|v| v.eq_ignore_ascii_case(value))
    }
}

/// One attribute-level change within a modify request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Modification {
    /// Add `values` to `attr`, creating it if absent.
    Add { attr: String, values: Vec<String> },
    /// Remove `values` from `attr`; an empty list removes the attribute.
    Delete { attr: String, values: Vec<String> },
}
