//! Field schema and field classification

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use super::Record;

/// Field types that never accept free-form input.
pub const FILTERED_FIELD_TYPES: [&str; 7] = [
    "ATTACHMENT",
    "PASSWORD",
    "TIMESTAMP",
    "RANDOM ID",
    "AUTONUMBER",
    "PREFIXED AUTONUMBER",
    "GUID",
];

/// Schema of one table, view or directory field, as returned by
/// `/v3/tables/{name}/fields`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FieldSchema {
    pub name: String,

    /// Backend type name, e.g. `STRING`, `LIST-STRING`, `LIST-DATE/TIME`.
    #[serde(rename = "Type", default)]
    pub field_type: String,

    #[serde(default)]
    pub label: Option<String>,

    #[serde(default)]
    pub required: Option<bool>,

    #[serde(default)]
    pub is_formula: Option<bool>,

    /// For list fields, the id → display value table in backend order.
    #[serde(rename = "ListField", default)]
    pub list_values: Option<Map<String, Value>>,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            ..Default::default()
        }
    }

    /// Attaches a list-value table.
    pub fn with_list_values<I, K, V>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.list_values = Some(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Returns `true` if values of this field are references into `list_values`.
    pub fn is_list(&self) -> bool {
        self.field_type.starts_with("LIST") && self.list_values.is_some()
    }

    /// Returns `true` if the type carries a date component.
    pub fn is_date(&self) -> bool {
        self.field_type.to_uppercase().contains("DATE")
    }

    /// Returns `true` for attachment, password, timestamp and generated-id types.
    pub fn is_filtered_type(&self) -> bool {
        let upper = self.field_type.to_uppercase();
        let no_space: String = upper.split_whitespace().collect();
        let underscored = upper.split_whitespace().collect::<Vec<_>>().join("_");

        FILTERED_FIELD_TYPES
            .iter()
            .any(|pattern| *pattern == upper || *pattern == underscored || *pattern == no_space)
    }

    /// Returns `true` for `UserGUID`, `PK`, `PK_*` and `_*` fields.
    pub fn is_system(&self) -> bool {
        self.name == "UserGUID"
            || self.name.starts_with('_')
            || self.name == "PK"
            || self.name.starts_with("PK_")
    }

    pub fn is_password(&self) -> bool {
        self.field_type.to_lowercase().contains("password")
    }

    pub fn is_formula(&self) -> bool {
        self.is_formula == Some(true)
    }
}

/// Fields a user may supply values for: no filtered types, system fields or formulas.
pub fn fields_for_user_input(fields: &[FieldSchema]) -> Vec<&FieldSchema> {
    fields
        .iter()
        .filter(|f| !f.is_filtered_type() && !f.is_system() && !f.is_formula())
        .collect()
}

/// Fields without password types.
pub fn without_password_fields(fields: &[FieldSchema]) -> Vec<&FieldSchema> {
    fields.iter().filter(|f| !f.is_password()).collect()
}

/// Drops every key of `data` that names a filtered-type field.
pub fn remove_filtered_fields(data: &Record, schema: &[FieldSchema]) -> Record {
    data.iter()
        .filter(|(key, _)| {
            !schema
                .iter()
                .any(|f| f.is_filtered_type() && f.name == **key)
        })
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
