//! Validation error types

/// Malformed query or selector input, detected before any request is sent.
///
/// Indices are 1-based positions in the caller's list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Field name is required for filter condition {index}")]
    MissingFieldName { index: usize },

    #[error("Operator is required for filter condition {index}")]
    MissingOperator { index: usize },

    #[error("Value is required for filter condition {index} with operator \"{operator}\"")]
    MissingValue { index: usize, operator: String },

    #[error("Field name is required for sort configuration {index}")]
    MissingSortField { index: usize },

    #[error("Field name is required for field configuration {index}")]
    MissingSelectField { index: usize },

    /// Update/delete in basic mode needs at least one filter.
    #[error("At least one filter condition must be defined to identify which {target} to {action}")]
    NoFilters {
        target: &'static str,
        action: &'static str,
    },

    /// Update/delete in advanced mode needs a non-empty WHERE clause.
    #[error("WHERE clause is required in Advanced mode to identify which {target} to {action}")]
    MissingWhere {
        target: &'static str,
        action: &'static str,
    },

    #[error("At least one field must be configured for update")]
    NoUpdateFields,

    /// Directory WHERE clauses may not reference `_`-prefixed system attributes.
    #[error(
        "System attributes starting with underscore (_status, _sign_in_method, etc.) \
         cannot be used in UPDATE/DELETE WHERE clauses. Use regular fields only."
    )]
    SystemAttributeInWhere { attribute: String },

    /// A required identifier (task key, user GUID, record id, ...) is blank.
    #[error("{what} is required")]
    MissingIdentifier { what: &'static str },

    /// Attachments can only be deleted from tables.
    #[error("Attachments of view \"{view}\" are read-only")]
    ReadOnlyAttachments { view: String },
}
