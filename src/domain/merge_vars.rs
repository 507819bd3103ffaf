use std::collections::BTreeMap;

use serde::Serialize;

/// Merge tag -> value, e.g. `{"FNAME": "John"}`. Serialized as a plain JSON
/// object.
#[derive(Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct MergeVars(BTreeMap<String, String>);

impl MergeVars {
    pub fn insert(
        &mut self,
        tag: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.0.insert(tag.into(), value.into());
    }

    pub fn get(
        &self,
        tag: &str,
    ) -> Option<&str> {
        self.0.get(tag).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}
