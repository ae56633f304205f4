//! Variable domain types

use serde::{Deserialize, Deserializer, Serialize};

/// A named variable as found in Hop configuration documents
///
/// Hop stores variables as `{ "name", "value", "description" }` objects in
/// `hop-config.json`, project configs, environment files and pipeline run
/// configurations. The same shape is used for task parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Variable {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            description: None,
        }
    }

    /// Parses a `NAME=VALUE` assignment
    ///
    /// Only the first `=` separates name from value. Returns `None` when there
    /// is no `=` or the name is empty.
    pub fn parse_assignment(assignment: &str) -> Option<Self> {
        let (name, value) = assignment.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self::new(name, value))
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
