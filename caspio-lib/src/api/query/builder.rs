//! Composes the clause builders into record-endpoint query parameters.

use super::build_order_by;
use super::build_select;
use super::build_where;
use super::keys;
use super::FieldSpec;
use super::FilterCondition;
use super::PaginationDirectives;
use super::QueryParams;
use super::SortSpec;
use crate::error::ValidationError;

/// A record query assembled from typed field, filter and sort specifications.
///
/// # Example
///
/// ```
/// use caspio_lib::api::query::{Aggregation, FieldSpec, FilterCondition, RecordQuery, SortSpec};
///
/// let built = RecordQuery::new()
///     .field(FieldSpec::field("Region"))
///     .field(FieldSpec::aggregated("Amount", Aggregation::Sum).alias("Total"))
///     .filter(FilterCondition::new("Status", "equals", "Open"))
///     .sort(SortSpec::desc("Region"))
///     .build()
///     .unwrap();
///
/// assert_eq!(built.params.get("q.select"), Some("Region,SUM(Amount) AS Total"));
/// assert_eq!(built.params.get("q.groupBy"), Some("Region"));
/// assert_eq!(built.params.get("q.where"), Some("Status = 'Open'"));
/// assert_eq!(built.params.get("q.orderBy"), Some("Region DESC"));
/// assert!(!built.is_aggregate_only);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordQuery {
    fields: Vec<FieldSpec>,
    filters: Vec<FilterCondition>,
    sorts: Vec<SortSpec>,
}

/// Parameters produced by [`RecordQuery::build`] or [`RawQuery::build`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuiltQuery {
    pub params: QueryParams,
    /// The SELECT list is aggregations only; fetch with a single request.
    pub is_aggregate_only: bool,
}

impl RecordQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(mut self, fields: impl IntoIterator<Item = FieldSpec>) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn filter(mut self, filter: FilterCondition) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn filters(mut self, filters: impl IntoIterator<Item = FilterCondition>) -> Self {
        self.filters.extend(filters);
        self
    }

    pub fn sort(mut self, sort: SortSpec) -> Self {
        self.sorts.push(sort);
        self
    }

    pub fn sorts(mut self, sorts: impl IntoIterator<Item = SortSpec>) -> Self {
        self.sorts.extend(sorts);
        self
    }

    /// Validates every specification and renders the `q.*` parameters.
    ///
    /// Empty lists produce no parameter at all.
    pub fn build(&self) -> Result<BuiltQuery, ValidationError> {
        let mut built = BuiltQuery::default();

        if let Some(index) = self.fields.iter().position(|f| f.field_name.is_empty()) {
            return Err(ValidationError::MissingSelectField { index: index + 1 });
        }

        if !self.fields.is_empty() {
            let select = build_select(&self.fields);
            built.params.set(keys::SELECT, select.select);
            if let Some(group_by) = select.group_by {
                built.params.set(keys::GROUP_BY, group_by);
            }
            built.is_aggregate_only = select.is_aggregate_only;
        }

        if !self.filters.is_empty() {
            built.params.set(keys::WHERE, build_where(&self.filters)?);
        }

        if !self.sorts.is_empty() {
            built.params.set(keys::ORDER_BY, build_order_by(&self.sorts)?);
        }

        Ok(built)
    }
}

/// A record query written directly in the API's clause syntax.
///
/// Clauses are trimmed and omitted when blank. Nothing is parsed or
/// validated; pagination directives are rendered with
/// [`PaginationDirectives::to_params`].
#[derive(Debug, Clone, Default)]
pub struct RawQuery {
    pub select: String,
    pub where_clause: String,
    pub group_by: String,
    pub order_by: String,
    pub pagination: PaginationDirectives,
}

impl RawQuery {
    pub fn build(&self) -> BuiltQuery {
        let mut params = QueryParams::new();
        params
            .set_trimmed(keys::SELECT, &self.select)
            .set_trimmed(keys::WHERE, &self.where_clause)
            .set_trimmed(keys::GROUP_BY, &self.group_by)
            .set_trimmed(keys::ORDER_BY, &self.order_by)
            .merge(&self.pagination.to_params());

        BuiltQuery {
            params,
            is_aggregate_only: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::query::Aggregation;

    #[test]
    fn test_empty_query_has_no_params() {
        let built = RecordQuery::new().build().unwrap();
        assert!(built.params.is_empty());
        assert!(!built.is_aggregate_only);
    }

    #[test]
    fn test_aggregate_only() {
        let built = RecordQuery::new()
            .field(FieldSpec::aggregated("Amount", Aggregation::Sum))
            .build()
            .unwrap();
        assert!(built.is_aggregate_only);
        assert!(!built.params.contains(keys::GROUP_BY));
    }

    #[test]
    fn test_invalid_filter_fails_before_anything_else() {
        let err = RecordQuery::new()
            .filter(FilterCondition::unary("Status", "equals"))
            .build()
            .unwrap_err();
        assert!(matches!(err, ValidationError::MissingValue { index: 1, .. }));

        let err = RecordQuery::new()
            .field(FieldSpec::field(""))
            .build()
            .unwrap_err();
        assert_eq!(err, ValidationError::MissingSelectField { index: 1 });
    }

    #[test]
    fn test_raw_query_trims_and_skips_blanks() {
        let built = RawQuery {
            select: "  Name, Email ".to_string(),
            where_clause: "   ".to_string(),
            order_by: "Name DESC".to_string(),
            pagination: PaginationDirectives {
                limit: Some(25),
                ..Default::default()
            },
            ..Default::default()
        }
        .build();

        assert_eq!(built.params.get(keys::SELECT), Some("Name, Email"));
        assert!(!built.params.contains(keys::WHERE));
        assert!(!built.params.contains(keys::GROUP_BY));
        assert_eq!(built.params.get(keys::ORDER_BY), Some("Name DESC"));
        assert_eq!(built.params.get(keys::LIMIT), Some("25"));
    }
}
