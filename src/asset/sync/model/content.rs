use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Content library as listed by the content service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Library {
    pub id: Uuid,
    pub name: String,
}

/// Named parameter attached to a content record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub value: String,
    /// Family type the parameter belongs to; empty for instance parameters.
    #[serde(default, deserialize_with = "lenient_string")]
    pub type_name: String,
}

impl Parameter {
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            type_name: type_name.into(),
        }
    }
}

/// Design file record held by the content service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    pub repository_file_id: Uuid,
    pub active_revision_id: Uuid,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    /// Populated from the `Manufacturer` parameter after retrieval.
    #[serde(default)]
    pub manufacturer: String,
    /// Populated from the `Model` parameter after retrieval.
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub family_types: BTreeSet<String>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

impl Content {
    pub fn new(repository_file_id: Uuid, active_revision_id: Uuid, title: impl Into<String>) -> Self {
        Self {
            repository_file_id,
            active_revision_id,
            title: title.into(),
            manufacturer: String::new(),
            model: String::new(),
            family_types: BTreeSet::new(),
            parameters: Vec::new(),
        }
    }

    /// Returns the first parameter with exactly the given name.
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|parameter| parameter.name == name)
    }

    /// Value of the named parameter, or an empty string when absent.
    pub fn parameter_value(&self, name: &str) -> &str {
        self.parameter(name)
            .map(|parameter| parameter.value.as_str())
            .unwrap_or("")
    }
}

/// Mutation request accepted by the content service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    #[serde(rename = "BatchId")]
    pub batch_id: String,
}

/// File-level progress of a batch. The service exposes no terminal flag; a
/// batch is finished once nothing is pending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BatchStatus {
    #[serde(default)]
    pub total_files: u32,
    #[serde(default)]
    pub pending_files: u32,
    #[serde(default)]
    pub ok_files: u32,
    #[serde(default)]
    pub failed_files: u32,
}

impl BatchStatus {
    pub fn is_complete(&self) -> bool {
        self.pending_files == 0
    }

    /// One-line progress summary.
    pub fn summary(&self) -> String {
        format!(
            "{} Files | {} Pending | {} Complete | {} Failed",
            self.total_files, self.pending_files, self.ok_files, self.failed_files
        )
    }
}

// The service sends numbers and nulls where text is expected.
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text,
        Some(other) => other.to_string(),
    })
}
