//! File metadata

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

/// Metadata of a stored file, from `/v3/files/{key}/fileInfo`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FileInfo {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub external_key: Option<String>,

    #[serde(default)]
    pub content_type: Option<String>,

    /// Size in bytes.
    #[serde(default)]
    pub size: Option<u64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A downloaded file with its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadedFile {
    pub info: FileInfo,
    pub data: Vec<u8>,
}

impl DownloadedFile {
    /// The file name, or `data` when the backend sent none.
    pub fn file_name(&self) -> &str {
        if self.info.name.is_empty() {
            "data"
        } else {
            &self.info.name
        }
    }
}
