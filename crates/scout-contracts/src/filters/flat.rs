use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry of the loosely typed filter object produced by the generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlatFilterValue {
    Text(String),
    List(Vec<String>),
    /// Numbers, nulls, objects, or arrays holding non-strings.
    Other(Value),
}

/// Flat `{key: string | [string]}` object as published under the `filters`
/// storage key. Key order is preserved.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlatFilters(IndexMap<String, FlatFilterValue>);

impl FlatFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a stored payload. `null` is read as an empty object; any other
    /// non-object JSON is an error.
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        match value {
            Value::Null => Ok(Self::default()),
            other => serde_json::from_value(other),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: FlatFilterValue) {
        self.0.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&FlatFilterValue> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FlatFilterValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, FlatFilterValue)> for FlatFilters {
    fn from_iter<I: IntoIterator<Item = (String, FlatFilterValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
