//! Record attachment metadata

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

/// Metadata of a file stored in a record's attachment field, from
/// `.../attachments/{field}/fileInfo`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AttachmentInfo {
    /// File name without the extension.
    #[serde(default)]
    pub file_name: Option<String>,

    /// Extension, e.g. `pdf`.
    #[serde(default)]
    pub file_type: Option<String>,

    #[serde(default)]
    pub size: Option<u64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AttachmentInfo {
    /// `name.type` when both are known, the bare name otherwise, and `data`
    /// when the backend sent no name.
    pub fn display_name(&self) -> String {
        match (self.file_name.as_deref(), self.file_type.as_deref()) {
            (Some(name), Some(ext)) if !name.is_empty() && !ext.is_empty() => {
                format!("{name}.{ext}")
            }
            (Some(name), _) if !name.is_empty() => name.to_string(),
            _ => "data".to_string(),
        }
    }
}

/// An attachment downloaded from one record.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadedAttachment {
    pub record_id: String,
    pub info: AttachmentInfo,
    pub data: Vec<u8>,
}
