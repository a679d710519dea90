//! Field selection, aggregation and the SELECT / GROUP BY builder.

use serde::Deserialize;
use serde::Deserializer;

/// The aggregation applied to a selected field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Aggregation {
    Sum,
    Avg,
    /// Count of records.
    #[default]
    Count,
    /// Count of distinct values: `COUNT(DISTINCT field)`.
    CountDistinct,
    Min,
    Max,
}

impl Aggregation {
    /// Parses an aggregation name.
    ///
    /// Accepts `COUNT(DISTINCT` (the form emitted by field pickers) as well as
    /// `COUNT_DISTINCT`. Unknown names yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SUM" => Some(Self::Sum),
            "AVG" => Some(Self::Avg),
            "COUNT" => Some(Self::Count),
            "COUNT(DISTINCT" | "COUNT_DISTINCT" => Some(Self::CountDistinct),
            "MIN" => Some(Self::Min),
            "MAX" => Some(Self::Max),
            _ => None,
        }
    }

    fn to_sql(self, field: &str) -> String {
        match self {
            Self::Sum => format!("SUM({})", field),
            Self::Avg => format!("AVG({})", field),
            Self::Count => format!("COUNT({})", field),
            Self::CountDistinct => format!("COUNT(DISTINCT {})", field),
            Self::Min => format!("MIN({})", field),
            Self::Max => format!("MAX({})", field),
        }
    }
}

fn aggregation_from_name<'de, D>(deserializer: D) -> Result<Option<Aggregation>, D::Error>
where
    D: Deserializer<'de>,
{
    let name: Option<String> = Option::deserialize(deserializer)?;
    Ok(name.as_deref().and_then(Aggregation::parse))
}

/// A field to select, optionally aggregated and aliased.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub field_name: String,
    #[serde(default)]
    pub aggregate: bool,
    #[serde(default, rename = "aggregationType", deserialize_with = "aggregation_from_name")]
    pub aggregation: Option<Aggregation>,
    #[serde(default)]
    pub alias: Option<String>,
}

impl FieldSpec {
    /// A plain (non-aggregated) field.
    pub fn field(name: impl Into<String>) -> Self {
        Self {
            field_name: name.into(),
            ..Default::default()
        }
    }

    /// An aggregated field.
    pub fn aggregated(name: impl Into<String>, aggregation: Aggregation) -> Self {
        Self {
            field_name: name.into(),
            aggregate: true,
            aggregation: Some(aggregation),
            alias: None,
        }
    }

    /// Sets the output alias (`AS alias`). Only used for aggregated fields.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

/// Output of [`build_select`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectClause {
    pub select: String,
    pub group_by: Option<String>,
    /// Every field is aggregated: the result is a single summary row and
    /// pagination does not apply.
    pub is_aggregate_only: bool,
}

/// Builds the SELECT list and, when aggregations are mixed with plain fields,
/// the GROUP BY list.
pub fn build_select(fields: &[FieldSpec]) -> SelectClause {
    let mut select_parts = Vec::with_capacity(fields.len());
    let mut group_by_fields = Vec::new();
    let mut has_aggregations = false;

    for field in fields {
        if field.aggregate {
            has_aggregations = true;
            let expression = field.aggregation.unwrap_or_default().to_sql(&field.field_name);

            match field.alias.as_deref().filter(|a| !a.is_empty()) {
                Some(alias) => select_parts.push(format!("{} AS {}", expression, alias)),
                None => select_parts.push(expression),
            }
        } else {
            select_parts.push(field.field_name.clone());
            group_by_fields.push(field.field_name.as_str());
        }
    }

    let mut clause = SelectClause {
        select: select_parts.join(","),
        ..Default::default()
    };

    if has_aggregations {
        if group_by_fields.is_empty() {
            clause.is_aggregate_only = true;
        } else {
            clause.group_by = Some(group_by_fields.join(","));
        }
    }

    clause
}
