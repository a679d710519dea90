//! Select, create, update and delete for table, view and directory records.

use serde_json::Value;

use super::ApiRequest;
use super::Paginator;
use super::Transport;
use super::directories::fetch_fields;
use super::directories::validate_directory_where;
use super::fetch_list;
use super::query::FilterCondition;
use super::query::QueryParams;
use super::query::RawQuery;
use super::query::RecordQuery;
use super::query::build_where;
use super::query::keys;
use crate::error::Error;
use crate::error::ValidationError;
use crate::model::Record;
use crate::model::remove_filtered_fields;
use crate::model::transform_list_fields;
use crate::response::WriteResponse;

/// Where records live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordSource {
    /// A table, by name.
    Table(String),
    /// A view, by name. Read-only.
    View(String),
    /// A user directory, by id.
    Directory(String),
}

impl RecordSource {
    /// `/v3/tables/{name}/records`, `/v3/views/{name}/records` or
    /// `/v3/directories/{id}/users`.
    pub fn records_path(&self) -> String {
        match self {
            Self::Table(name) => format!("/v3/tables/{}/records", urlencoding::encode(name)),
            Self::View(name) => format!("/v3/views/{}/records", urlencoding::encode(name)),
            Self::Directory(id) => format!("/v3/directories/{}/users", urlencoding::encode(id)),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Table(_) => "table",
            Self::View(_) => "view",
            Self::Directory(_) => "directory",
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Table(name) | Self::View(name) | Self::Directory(name) => name,
        }
    }

    /// Directories take the selector as `Where`, everything else as `where`.
    fn where_key(&self) -> &'static str {
        match self {
            Self::Directory(_) => "Where",
            _ => "where",
        }
    }

    fn target(&self) -> &'static str {
        match self {
            Self::Directory(_) => "users",
            _ => "records",
        }
    }
}

/// How many records a basic select returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnMode {
    /// Every matching record, fetched page by page.
    All,
    /// At most this many records, in one request (`q.limit`).
    Limit(usize),
}

impl Default for ReturnMode {
    fn default() -> Self {
        Self::Limit(50)
    }
}

/// A record select.
#[derive(Debug, Clone)]
pub enum SelectRecords {
    /// Typed fields, filters and sorts.
    Basic {
        query: RecordQuery,
        return_mode: ReturnMode,
    },
    /// Caller-written clauses and explicit pagination, sent as one request.
    Advanced(RawQuery),
}

impl SelectRecords {
    pub fn basic(query: RecordQuery, return_mode: ReturnMode) -> Self {
        Self::Basic { query, return_mode }
    }

    pub fn advanced(query: RawQuery) -> Self {
        Self::Advanced(query)
    }
}

/// Selects records.
///
/// Aggregate-only selections are always a single request. HTTP failures
/// carry a description naming the source.
pub async fn select_records<T: Transport + ?Sized>(
    transport: &T,
    source: &RecordSource,
    select: &SelectRecords,
) -> Result<Vec<Record>, Error> {
    let endpoint = source.records_path();

    let result = match select {
        SelectRecords::Basic { query, return_mode } => {
            let built = query.build()?;
            match return_mode {
                _ if built.is_aggregate_only => {
                    fetch_list(transport, &endpoint, &built.params).await
                }
                ReturnMode::All => {
                    Paginator::new()
                        .fetch_all(transport, &endpoint, &built.params)
                        .await
                }
                ReturnMode::Limit(limit) => {
                    let query = built.params.merged(&QueryParams::new().with(keys::LIMIT, limit));
                    fetch_list(transport, &endpoint, &query).await
                }
            }
        }
        SelectRecords::Advanced(raw) => fetch_list(transport, &endpoint, &raw.build().params).await,
    };

    result.map_err(|e| describe_select_error(e, source))
}

fn describe_select_error(error: Error, source: &RecordSource) -> Error {
    let (kind, name) = (source.kind(), source.name());
    let description = match error.status_code() {
        Some(404) => format!(
            "The specified {kind} \"{name}\" was not found. Please check the name and try again."
        ),
        Some(400) => {
            "Invalid query parameters. Please check your field selections, filters, and syntax."
                .to_string()
        }
        Some(401 | 403) => format!(
            "Authentication failed or insufficient permissions to access {kind} \"{name}\"."
        ),
        _ => return error,
    };
    error.describe(description)
}

/// Identifies the records an update or delete applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordSelector {
    /// Filter conditions, at least one, combined with `AND`.
    Filters(Vec<FilterCondition>),
    /// A caller-written WHERE clause; must not be blank.
    Where(String),
}

impl RecordSelector {
    /// Validates the selector and renders the WHERE clause for `source`.
    pub fn where_clause(
        &self,
        source: &RecordSource,
        action: &'static str,
    ) -> Result<String, ValidationError> {
        let clause = match self {
            Self::Filters(filters) => {
                if filters.is_empty() {
                    return Err(ValidationError::NoFilters {
                        target: source.target(),
                        action,
                    });
                }
                build_where(filters)?
            }
            Self::Where(clause) => {
                let clause = clause.trim();
                if clause.is_empty() {
                    return Err(ValidationError::MissingWhere {
                        target: source.target(),
                        action,
                    });
                }
                clause.to_string()
            }
        };

        if matches!(source, RecordSource::Directory(_)) {
            validate_directory_where(&clause)?;
        }

        Ok(clause)
    }
}

/// One field assignment of an update.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldUpdate {
    pub field_name: String,
    pub value: Value,
}

impl FieldUpdate {
    pub fn new(field_name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field_name: field_name.into(),
            value: value.into(),
        }
    }

    /// Sets the field to `NULL`.
    pub fn null(field_name: impl Into<String>) -> Self {
        Self::new(field_name, Value::Null)
    }
}

/// Options for [`create_record`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreateOptions {
    /// Drop attachment, password, timestamp and generated-id fields from the body.
    pub remove_filtered_fields: bool,
}

/// Inserts one record.
///
/// List fields are encoded against a freshly fetched schema before sending.
pub async fn create_record<T: Transport + ?Sized>(
    transport: &T,
    source: &RecordSource,
    body: &Record,
    options: CreateOptions,
) -> Result<WriteResponse, Error> {
    let schema = fetch_fields(transport, source).await?;

    let body = if options.remove_filtered_fields {
        remove_filtered_fields(body, &schema)
    } else {
        body.clone()
    };
    let body = transform_list_fields(&body, &schema);

    let request = ApiRequest::post(source.records_path())
        .query(QueryParams::new().with("response", "rows"))
        .body(Value::Object(body));
    transport.request(request).await?.into_write()
}

/// Updates every record matching `selector`.
///
/// Blank and `null` values set the field to `NULL`. Everything is validated
/// before the first request is sent.
pub async fn update_records<T: Transport + ?Sized>(
    transport: &T,
    source: &RecordSource,
    selector: &RecordSelector,
    updates: &[FieldUpdate],
) -> Result<WriteResponse, Error> {
    let clause = selector.where_clause(source, "update")?;
    if updates.is_empty() {
        return Err(ValidationError::NoUpdateFields.into());
    }

    let body: Record = updates
        .iter()
        .map(|update| {
            let value = match &update.value {
                Value::String(s) if s.is_empty() => Value::Null,
                other => other.clone(),
            };
            (update.field_name.clone(), value)
        })
        .collect();

    let schema = fetch_fields(transport, source).await?;
    let body = transform_list_fields(&body, &schema);

    let request = ApiRequest::put(source.records_path())
        .query(
            QueryParams::new()
                .with("response", "rows")
                .with(source.where_key(), clause),
        )
        .body(Value::Object(body));
    transport.request(request).await?.into_write()
}

/// Deletes every record matching `selector`.
pub async fn delete_records<T: Transport + ?Sized>(
    transport: &T,
    source: &RecordSource,
    selector: &RecordSelector,
) -> Result<WriteResponse, Error> {
    let clause = selector.where_clause(source, "delete")?;

    let request = ApiRequest::delete(source.records_path())
        .query(QueryParams::new().with(source.where_key(), clause));
    transport.request(request).await?.into_write()
}

#[cfg(test)]
mod tests {
    use reqwest::Method;
    use serde_json::json;

    use super::*;
    use crate::api::mock::MockTransport;
    use crate::api::mock::list;
    use crate::api::mock::query_usize;
    use crate::api::mock::rows;
    use crate::api::query::Aggregation;
    use crate::api::query::FieldSpec;
    use crate::api::query::PaginationDirectives;
    use crate::error::ApiError;
    use crate::response::ApiResponse;

    fn orders() -> RecordSource {
        RecordSource::Table("Orders".into())
    }

    fn color_schema() -> Result<ApiResponse, Error> {
        list(
            vec![
                json!({"Name": "Id", "Type": "AUTONUMBER"}),
                json!({
                    "Name": "Color",
                    "Type": "LIST-STRING",
                    "ListField": {"1": "Red", "2": "Blue"}
                }),
                json!({"Name": "Note", "Type": "STRING"}),
            ],
            None,
        )
    }

    fn written() -> Result<ApiResponse, Error> {
        Ok(ApiResponse::Json(json!({"RecordsAffected": 1, "Result": []})))
    }

    #[test]
    fn test_records_path() {
        assert_eq!(orders().records_path(), "/v3/tables/Orders/records");
        assert_eq!(
            RecordSource::View("Open Orders".into()).records_path(),
            "/v3/views/Open%20Orders/records"
        );
        assert_eq!(
            RecordSource::Directory("d-1".into()).records_path(),
            "/v3/directories/d-1/users"
        );
    }

    #[tokio::test]
    async fn test_select_all_paginates() {
        let transport = MockTransport::new(|req| {
            let page = query_usize(req, keys::PAGE_NUMBER);
            list(rows((page - 1) * 1000, if page == 1 { 1000 } else { 10 }), None)
        });
        let query = RecordQuery::new().filter(FilterCondition::new("Status", "equals", "Open"));

        let select = SelectRecords::basic(query, ReturnMode::All);
        let records = select_records(&transport, &orders(), &select).await.unwrap();

        assert_eq!(records.len(), 1010);
        let calls = transport.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].query.get(keys::WHERE), Some("Status = 'Open'"));
    }

    #[tokio::test]
    async fn test_select_limit_is_one_request() {
        let transport = MockTransport::new(|_| list(rows(0, 50), Some(5000)));

        let select = SelectRecords::basic(RecordQuery::new(), ReturnMode::default());
        let records = select_records(&transport, &orders(), &select).await.unwrap();

        assert_eq!(records.len(), 50);
        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].query.get(keys::LIMIT), Some("50"));
        assert!(!calls[0].query.contains(keys::PAGE_NUMBER));
    }

    #[tokio::test]
    async fn test_aggregate_only_is_one_request() {
        let transport = MockTransport::new(|_| list(vec![json!({"Total": 12})], None));
        let query = RecordQuery::new()
            .field(FieldSpec::aggregated("Amount", Aggregation::Sum).alias("Total"));

        let select = SelectRecords::basic(query, ReturnMode::All);
        let records = select_records(&transport, &orders(), &select).await.unwrap();

        assert_eq!(records.len(), 1);
        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].query.get(keys::SELECT), Some("SUM(Amount) AS Total"));
        assert!(!calls[0].query.contains(keys::PAGE_NUMBER));
        assert!(!calls[0].query.contains(keys::LIMIT));
    }

    #[tokio::test]
    async fn test_advanced_select() {
        let transport = MockTransport::new(|_| list(rows(0, 5), None));
        let raw = RawQuery {
            where_clause: " Total > 5 ".into(),
            pagination: PaginationDirectives {
                page_number: Some(3),
                page_size: Some(2),
                ..Default::default()
            },
            ..Default::default()
        };

        select_records(&transport, &orders(), &SelectRecords::advanced(raw))
            .await
            .unwrap();

        let call = &transport.calls()[0];
        assert_eq!(call.query.get(keys::WHERE), Some("Total > 5"));
        assert_eq!(call.query.get(keys::PAGE_NUMBER), Some("3"));
        assert_eq!(call.query.get(keys::PAGE_SIZE), Some("5"));
    }

    #[tokio::test]
    async fn test_select_errors_are_described() {
        let transport = MockTransport::new(|_| Err(ApiError::http(404, "{}").into()));
        let select = SelectRecords::basic(RecordQuery::new(), ReturnMode::All);
        let err = select_records(&transport, &orders(), &select).await.unwrap_err();

        assert_eq!(err.status_code(), Some(404));
        assert_eq!(
            err.to_string(),
            concat!(
                "HTTP 404: The specified table \"Orders\" was not found. ",
                "Please check the name and try again."
            )
        );
    }

    #[tokio::test]
    async fn test_invalid_filters_send_nothing() {
        let transport = MockTransport::new(|_| list(vec![], None));
        let query = RecordQuery::new().filter(FilterCondition::unary("Status", "equals"));

        let select = SelectRecords::basic(query, ReturnMode::All);
        let err = select_records(&transport, &orders(), &select).await.unwrap_err();

        assert!(err.is_validation());
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_create_filters_and_encodes() {
        let transport = MockTransport::new(|req| match req.method {
            Method::GET => color_schema(),
            _ => written(),
        });
        let body: Record =
            serde_json::from_value(json!({"Id": 7, "Color": "Blue", "Note": "hi"})).unwrap();

        let result = create_record(
            &transport,
            &orders(),
            &body,
            CreateOptions {
                remove_filtered_fields: true,
            },
        )
        .await
        .unwrap();
        assert_eq!(result.records_affected, Some(1));

        let calls = transport.calls();
        assert_eq!(calls[0].path, "/v3/tables/Orders/fields");
        assert_eq!(calls[1].method, Method::POST);
        assert_eq!(calls[1].query.get("response"), Some("rows"));
        assert_eq!(calls[1].body, Some(json!({"Color": "[2]", "Note": "hi"})));
    }

    #[tokio::test]
    async fn test_update_builds_where_and_nulls() {
        let transport = MockTransport::new(|req| match req.method {
            Method::GET => color_schema(),
            _ => written(),
        });
        let selector = RecordSelector::Filters(vec![FilterCondition::new("Id", "equals", "7")]);

        update_records(
            &transport,
            &orders(),
            &selector,
            &[FieldUpdate::new("Color", "Red"), FieldUpdate::new("Note", "")],
        )
        .await
        .unwrap();

        let put = &transport.calls()[1];
        assert_eq!(put.method, Method::PUT);
        assert_eq!(put.query.get("where"), Some("Id = '7'"));
        assert_eq!(put.query.get("response"), Some("rows"));
        assert_eq!(put.body, Some(json!({"Color": "[1]", "Note": null})));
    }

    #[tokio::test]
    async fn test_update_validation_happens_first() {
        let transport = MockTransport::new(|_| written());
        let source = orders();

        let nulls = [FieldUpdate::null("A")];
        let err = update_records(&transport, &source, &RecordSelector::Filters(vec![]), &nulls)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "At least one filter condition must be defined to identify which records to update"
        );

        let err = update_records(&transport, &source, &RecordSelector::Where("  ".into()), &nulls)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::MissingWhere { .. })));

        let err = update_records(&transport, &source, &RecordSelector::Where("A = 1".into()), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(ValidationError::NoUpdateFields)));

        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_directory_delete() {
        let transport = MockTransport::new(|_| Ok(ApiResponse::Empty));
        let users = RecordSource::Directory("d-1".into());

        let locked = RecordSelector::Where("_status = 'Locked'".into());
        let err = delete_records(&transport, &users, &locked).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::SystemAttributeInWhere { .. })
        ));

        let by_email = RecordSelector::Where(" Email = 'a@b.c' ".into());
        let result = delete_records(&transport, &users, &by_email).await.unwrap();
        assert_eq!(result, WriteResponse::default());

        let call = &transport.calls()[0];
        assert_eq!(call.method, Method::DELETE);
        assert_eq!(call.path, "/v3/directories/d-1/users");
        assert_eq!(call.query.get("Where"), Some("Email = 'a@b.c'"));
        assert!(!call.query.contains("where"));
    }
}
