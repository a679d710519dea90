use serde::Deserialize;
use serde::Serialize;

/// A user directory from `/v3/directories`.
///
/// The directory's users live in a table of the same name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Directory {
    #[serde(rename = "Id", alias = "ID")]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,
}
