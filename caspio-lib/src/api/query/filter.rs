//! Filter conditions and the WHERE clause builder.

use serde::Deserialize;
use serde::Deserializer;

use crate::error::ValidationError;

/// A comparison operator for a [`FilterCondition`].
///
/// Parsing never fails: names that are not recognized are kept as
/// [`Operator::Unrecognized`], which renders exactly like [`Operator::Equals`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operator {
    /// `f = 'v'`
    Equals,
    /// `f != 'v'`
    NotEquals,
    /// `f LIKE '%v%'`
    Contains,
    /// `f > v`
    GreaterThan,
    /// `f >= v`
    GreaterThanOrEqual,
    /// `f < v`
    LessThan,
    /// `f <= v`
    LessThanOrEqual,
    /// `(f IS NULL OR f = '')`
    IsEmpty,
    /// `(f IS NOT NULL AND f != '')`
    IsNotEmpty,
    /// `f = 1`
    IsTrue,
    /// `f = 0`
    IsFalse,
    /// Any other name. Rendered as `Equals`.
    Unrecognized(String),
}

impl Operator {
    /// Parses an operator name such as `"greaterThan"`.
    pub fn parse(name: &str) -> Self {
        match name {
            "equals" => Self::Equals,
            "notEquals" => Self::NotEquals,
            "contains" => Self::Contains,
            "greaterThan" => Self::GreaterThan,
            "greaterThanOrEqual" => Self::GreaterThanOrEqual,
            "lessThan" => Self::LessThan,
            "lessThanOrEqual" => Self::LessThanOrEqual,
            "isEmpty" => Self::IsEmpty,
            "isNotEmpty" => Self::IsNotEmpty,
            "isTrue" => Self::IsTrue,
            "isFalse" => Self::IsFalse,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    /// Returns the operator name as callers spell it.
    pub fn name(&self) -> &str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "notEquals",
            Self::Contains => "contains",
            Self::GreaterThan => "greaterThan",
            Self::GreaterThanOrEqual => "greaterThanOrEqual",
            Self::LessThan => "lessThan",
            Self::LessThanOrEqual => "lessThanOrEqual",
            Self::IsEmpty => "isEmpty",
            Self::IsNotEmpty => "isNotEmpty",
            Self::IsTrue => "isTrue",
            Self::IsFalse => "isFalse",
            Self::Unrecognized(name) => name,
        }
    }

    /// Returns `true` for operators that take no value.
    pub fn is_unary(&self) -> bool {
        matches!(
            self,
            Self::IsEmpty | Self::IsNotEmpty | Self::IsTrue | Self::IsFalse
        )
    }

    fn render(&self, field: &str, value: &str) -> String {
        match self {
            Self::Equals | Self::Unrecognized(_) => format!("{} = '{}'", field, value),
            Self::NotEquals => format!("{} != '{}'", field, value),
            Self::Contains => format!("{} LIKE '%{}%'", field, value),
            Self::GreaterThan => format!("{} > {}", field, value),
            Self::GreaterThanOrEqual => format!("{} >= {}", field, value),
            Self::LessThan => format!("{} < {}", field, value),
            Self::LessThanOrEqual => format!("{} <= {}", field, value),
            Self::IsEmpty => format!("({} IS NULL OR {} = '')", field, field),
            Self::IsNotEmpty => format!("({} IS NOT NULL AND {} != '')", field, field),
            Self::IsTrue => format!("{} = 1", field),
            Self::IsFalse => format!("{} = 0", field),
        }
    }
}

impl From<&str> for Operator {
    fn from(name: &str) -> Self {
        Self::parse(name)
    }
}

/// One condition of a WHERE clause.
///
/// Deserializes from caller input shaped like
/// `{"fieldName": "Status", "operator": "equals", "value": "Active"}`.
/// An empty or absent operator is kept as `None` and reported by validation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCondition {
    #[serde(default)]
    pub field_name: String,
    #[serde(default, deserialize_with = "operator_from_name")]
    pub operator: Option<Operator>,
    #[serde(default)]
    pub value: Option<String>,
}

impl FilterCondition {
    /// Creates a condition with a value.
    pub fn new(
        field_name: impl Into<String>,
        operator: impl Into<Operator>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            operator: Some(operator.into()),
            value: Some(value.into()),
        }
    }

    /// Creates a condition without a value (for `isEmpty`, `isTrue`, ...).
    pub fn unary(field_name: impl Into<String>, operator: impl Into<Operator>) -> Self {
        Self {
            field_name: field_name.into(),
            operator: Some(operator.into()),
            value: None,
        }
    }
}

fn operator_from_name<'de, D>(deserializer: D) -> Result<Option<Operator>, D::Error>
where
    D: Deserializer<'de>,
{
    let name: Option<String> = Option::deserialize(deserializer)?;
    Ok(name.filter(|n| !n.is_empty()).map(|n| Operator::parse(&n)))
}

/// Checks a single condition. `index` is 0-based; errors report it 1-based.
pub fn validate_filter(filter: &FilterCondition, index: usize) -> Result<(), ValidationError> {
    let index = index + 1;

    if filter.field_name.is_empty() {
        return Err(ValidationError::MissingFieldName { index });
    }

    let Some(operator) = &filter.operator else {
        return Err(ValidationError::MissingOperator { index });
    };

    let has_value = filter.value.as_deref().is_some_and(|v| !v.is_empty());
    if !operator.is_unary() && !has_value {
        return Err(ValidationError::MissingValue {
            index,
            operator: operator.name().to_string(),
        });
    }

    Ok(())
}

/// Builds a WHERE clause from a list of conditions joined with `AND`.
///
/// Conditions are rendered in the given order. An empty list yields an empty
/// string.
///
/// Values are substituted literally and are **not** escaped: a value
/// containing `'` changes the structure of the resulting clause. Only pass
/// values from trusted sources.
///
/// # Example
///
/// ```
/// use caspio_lib::api::query::{build_where, FilterCondition};
///
/// let clause = build_where(&[
///     FilterCondition::new("Status", "equals", "Active"),
///     FilterCondition::new("Age", "greaterThan", "18"),
/// ]).unwrap();
///
/// assert_eq!(clause, "Status = 'Active' AND Age > 18");
/// ```
pub fn build_where(filters: &[FilterCondition]) -> Result<String, ValidationError> {
    let mut parts = Vec::with_capacity(filters.len());

    for (index, filter) in filters.iter().enumerate() {
        validate_filter(filter, index)?;

        if let Some(operator) = &filter.operator {
            let value = filter.value.as_deref().unwrap_or_default();
            parts.push(operator.render(&filter.field_name, value));
        }
    }

    Ok(parts.join(" AND "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(build_where(&[]).unwrap(), "");
    }

    #[test]
    fn test_equals_and_comparison() {
        assert_eq!(
            build_where(&[FilterCondition::new("Status", "equals", "Active")]).unwrap(),
            "Status = 'Active'"
        );
        assert_eq!(
            build_where(&[FilterCondition::new("Age", "greaterThan", "18")]).unwrap(),
            "Age > 18"
        );
    }

    #[test]
    fn test_every_template() {
        let cases = [
            (FilterCondition::new("F", "notEquals", "x"), "F != 'x'"),
            (FilterCondition::new("F", "contains", "x"), "F LIKE '%x%'"),
            (FilterCondition::new("F", "greaterThanOrEqual", "1"), "F >= 1"),
            (FilterCondition::new("F", "lessThan", "1"), "F < 1"),
            (FilterCondition::new("F", "lessThanOrEqual", "1"), "F <= 1"),
            (FilterCondition::unary("F", "isNotEmpty"), "(F IS NOT NULL AND F != '')"),
            (FilterCondition::unary("F", "isTrue"), "F = 1"),
            (FilterCondition::unary("F", "isFalse"), "F = 0"),
        ];

        for (filter, expected) in cases {
            assert_eq!(build_where(&[filter]).unwrap(), expected);
        }
    }

    #[test]
    fn test_is_empty_needs_no_value_but_equals_does() {
        assert_eq!(
            build_where(&[FilterCondition::unary("Notes", "isEmpty")]).unwrap(),
            "(Notes IS NULL OR Notes = '')"
        );

        let err = build_where(&[FilterCondition::unary("Notes", "equals")]).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingValue {
                index: 1,
                operator: "equals".to_string()
            }
        );
    }

    #[test]
    fn test_zero_counts_as_value() {
        assert_eq!(
            build_where(&[FilterCondition::new("Count", "equals", "0")]).unwrap(),
            "Count = '0'"
        );
    }

    #[test]
    fn test_empty_value_is_missing() {
        let err = build_where(&[FilterCondition::new("Name", "contains", "")]).unwrap_err();
        assert!(matches!(err, ValidationError::MissingValue { index: 1, .. }));
    }

    #[test]
    fn test_unrecognized_operator_renders_as_equals() {
        let filter = FilterCondition::new("Status", "startsWith", "A");
        assert_eq!(
            filter.operator,
            Some(Operator::Unrecognized("startsWith".to_string()))
        );
        assert_eq!(build_where(&[filter]).unwrap(), "Status = 'A'");

        let err = build_where(&[FilterCondition::unary("Status", "startsWith")]).unwrap_err();
        assert!(matches!(err, ValidationError::MissingValue { .. }));
    }

    #[test]
    fn test_joins_in_order() {
        let clause = build_where(&[
            FilterCondition::new("B", "equals", "2"),
            FilterCondition::new("A", "equals", "1"),
            FilterCondition::unary("C", "isTrue"),
        ])
        .unwrap();
        assert_eq!(clause, "B = '2' AND A = '1' AND C = 1");
    }

    #[test]
    fn test_error_cites_position() {
        let filters = [
            FilterCondition::new("A", "equals", "1"),
            FilterCondition::new("", "equals", "1"),
        ];
        assert_eq!(
            build_where(&filters).unwrap_err(),
            ValidationError::MissingFieldName { index: 2 }
        );

        let missing_op = FilterCondition {
            field_name: "A".to_string(),
            operator: None,
            value: Some("1".to_string()),
        };
        assert_eq!(
            build_where(&[missing_op]).unwrap_err(),
            ValidationError::MissingOperator { index: 1 }
        );
    }

    #[test]
    fn test_quotes_are_not_escaped() {
        assert_eq!(
            build_where(&[FilterCondition::new("Name", "equals", "O'Brien")]).unwrap(),
            "Name = 'O'Brien'"
        );
    }

    #[test]
    fn test_deserialize_caller_input() {
        let filters: Vec<FilterCondition> = serde_json::from_str(
            r#"[{"fieldName":"Status","operator":"equals","value":"Active"},
                {"fieldName":"Notes","operator":""}]"#,
        )
        .unwrap();
        assert_eq!(filters[0].operator, Some(Operator::Equals));
        assert_eq!(filters[1].operator, None);
        assert_eq!(
            build_where(&filters).unwrap_err(),
            ValidationError::MissingOperator { index: 2 }
        );
    }
}
