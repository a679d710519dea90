//! Encoding of list-field values as bracketed ids

use serde_json::Value;

use super::FieldSchema;
use super::Record;

/// Rewrites list-field values in `body` to the API's `"[id1], [id2]"` form.
///
/// For each key whose schema entry is a list field:
///
/// - `null`, `""` and strings already in bracketed form are left as they are,
///   so running the transform twice is harmless;
/// - an object contributes its (non-empty) keys as ids;
/// - anything else is read as user-facing values (array elements, or a
///   comma-separated string) and each one is looked up by display value.
///   Date list fields compare only the first 10 characters.
///
/// Values that match no list entry are dropped.
///
/// # Example
///
/// ```
/// use caspio_lib::model::{transform_list_fields, FieldSchema, Record};
/// use serde_json::json;
///
/// let schema = [FieldSchema::new("Color", "LIST-STRING")
///     .with_list_values([("1", "Red"), ("2", "Blue")])];
/// let body: Record = serde_json::from_value(json!({"Color": "Blue, Red"})).unwrap();
///
/// let out = transform_list_fields(&body, &schema);
/// assert_eq!(out["Color"], json!("[2], [1]"));
/// ```
pub fn transform_list_fields(body: &Record, schema: &[FieldSchema]) -> Record {
    body.iter()
        .map(|(name, value)| {
            let field = schema.iter().find(|f| f.name == *name).filter(|f| f.is_list());
            let value = match field {
                Some(field) => encode_list_value(field, value),
                None => value.clone(),
            };
            (name.clone(), value)
        })
        .collect()
}

fn encode_list_value(field: &FieldSchema, value: &Value) -> Value {
    let ids: Vec<String> = match value {
        Value::Null => return Value::Null,
        Value::String(s) if s.is_empty() || is_bracketed(s) => return value.clone(),
        Value::Object(map) => map.keys().filter(|k| !k.is_empty()).cloned().collect(),
        Value::Array(items) => lookup_ids(field, items.iter().map(display_string)),
        other => lookup_ids(
            field,
            display_string(other)
                .split(',')
                .map(|v| v.trim().to_string()),
        ),
    };

    Value::String(
        ids.iter()
            .map(|id| format!("[{}]", id))
            .collect::<Vec<_>>()
            .join(", "),
    )
}

fn lookup_ids(field: &FieldSchema, user_values: impl Iterator<Item = String>) -> Vec<String> {
    let Some(entries) = &field.list_values else {
        return Vec::new();
    };
    let compare_dates = field.is_date();

    user_values
        .filter_map(|wanted| {
            let found = entries.iter().find(|(_, listed)| {
                let listed = display_string(listed);
                if compare_dates {
                    date_part(&listed) == date_part(&wanted)
                } else {
                    listed == wanted
                }
            });

            if found.is_none() {
                log::debug!(
                    "dropping value {:?} for list field {}: no matching entry",
                    wanted,
                    field.name
                );
            }
            found.map(|(id, _)| id.clone())
        })
        .collect()
}

/// `[` at the start with a `]` somewhere after it.
fn is_bracketed(s: &str) -> bool {
    s.strip_prefix('[').is_some_and(|rest| rest.contains(']'))
}

fn date_part(s: &str) -> &str {
    match s.char_indices().nth(10) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}

fn display_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
