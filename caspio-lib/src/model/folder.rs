//! Folder nodes from the file storage endpoints

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::de::Error as _;
use serde_json::Map;
use serde_json::Value;

use super::Record;
use crate::error::ApiError;

/// One folder from `/v3/files/folders`.
///
/// `Name` and `ExternalKey` may come as any scalar and are read as text.
/// Other attributes are kept as they came.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FolderNode {
    #[serde(default, deserialize_with = "scalar_text")]
    pub name: String,

    #[serde(default, deserialize_with = "scalar_text")]
    pub external_key: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FolderNode {
    pub fn new(name: impl Into<String>, external_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            external_key: external_key.into(),
            extra: Map::new(),
        }
    }

    /// Reads a node out of a raw folder record.
    ///
    /// A record without a usable `ExternalKey` is a malformed response: the
    /// subtree below it could not be reached.
    pub fn from_record(record: &Record) -> Result<Self, ApiError> {
        let malformed = |message: String| {
            ApiError::parse_with_body(message, Value::Object(record.clone()).to_string())
        };

        let node: Self = serde_json::from_value(Value::Object(record.clone()))
            .map_err(|e| malformed(format!("invalid folder record: {e}")))?;
        if node.external_key.is_empty() {
            return Err(malformed(format!(
                "folder {:?} has no ExternalKey",
                node.name
            )));
        }
        Ok(node)
    }
}

/// Strings as-is, numbers and booleans in their JSON form, `null` as empty.
fn scalar_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Null => Ok(String::new()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(D::Error::custom(format!("expected a scalar, got {other}"))),
    }
}
