use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::AttrValue;

/// Ordered attribute store of a task-type descriptor, based on [`BTreeMap`].
///
/// Serializes transparently as a plain JSON object
/// (`{"attr": value, ...}`).
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttrMap(pub BTreeMap<String, AttrValue>);

impl AttrMap {
    /// Create an empty attribute map.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Returns `true` if no attributes are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of attributes in the map.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Insert or overwrite an attribute.
    ///
    /// Returns `self` for chaining.
    pub fn insert<K, V>(&mut self, name: K, value: V) -> &mut Self
    where
        K: Into<String>,
        V: Into<AttrValue>,
    {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Get the value for an attribute, if present.
    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.0.get(name)
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove(&mut self, name: &str) -> Option<AttrValue> {
        self.0.remove(name)
    }

    /// Returns `true` if the attribute is present.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Iterate through all attributes as `(&str, &AttrValue)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, AttrValue)> for AttrMap {
    fn from_iter<I: IntoIterator<Item = (String, AttrValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
