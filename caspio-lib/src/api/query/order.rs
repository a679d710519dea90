//! Sort specifications and the ORDER BY clause builder.

use serde::Deserialize;
use serde::Deserializer;

use crate::error::ValidationError;

/// Sort direction for ordering results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    /// Ascending order (A-Z, 0-9).
    #[default]
    Asc,
    /// Descending order (Z-A, 9-0).
    Desc,
}

impl Direction {
    /// Parses a direction; anything other than `"DESC"` is ascending.
    pub fn parse(s: &str) -> Self {
        if s == "DESC" { Self::Desc } else { Self::Asc }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl<'de> Deserialize<'de> for Direction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}

/// One sort key.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortSpec {
    #[serde(default)]
    pub field_name: String,
    #[serde(default)]
    pub direction: Direction,
}

impl SortSpec {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field_name: field.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field_name: field.into(),
            direction: Direction::Desc,
        }
    }
}

/// Builds an ORDER BY clause: `field DIRECTION` pairs joined with `,`.
pub fn build_order_by(sorts: &[SortSpec]) -> Result<String, ValidationError> {
    let mut parts = Vec::with_capacity(sorts.len());

    for (index, sort) in sorts.iter().enumerate() {
        if sort.field_name.is_empty() {
            return Err(ValidationError::MissingSortField { index: index + 1 });
        }
        parts.push(format!("{} {}", sort.field_name, sort.direction.as_str()));
    }

    Ok(parts.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_by() {
        let clause = build_order_by(&[SortSpec::desc("Revenue"), SortSpec::asc("Name")]).unwrap();
        assert_eq!(clause, "Revenue DESC,Name ASC");
        assert_eq!(build_order_by(&[]).unwrap(), "");
    }

    #[test]
    fn test_unknown_direction_defaults_to_asc() {
        let sorts: Vec<SortSpec> =
            serde_json::from_str(r#"[{"fieldName":"Name","direction":"sideways"}]"#).unwrap();
        assert_eq!(build_order_by(&sorts).unwrap(), "Name ASC");
    }

    #[test]
    fn test_missing_field_name() {
        let err = build_order_by(&[SortSpec::asc("A"), SortSpec::asc("")]).unwrap_err();
        assert_eq!(err, ValidationError::MissingSortField { index: 2 });
    }
}
