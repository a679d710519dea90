//! Response bodies and the API's result envelopes

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;
use crate::error::Error;
use crate::model::Record;

/// Body of a successful API call.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// A JSON document.
    Json(Value),
    /// Raw bytes of a binary-mode request.
    Binary(Vec<u8>),
    /// No body (e.g. 204 No Content).
    Empty,
}

impl ApiResponse {
    /// Returns the JSON document, if this is one.
    pub fn json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Reads the body as a list envelope.
    ///
    /// An empty body, or a document without `Result`, is an empty list.
    pub fn into_list<T: DeserializeOwned>(self) -> Result<ListResponse<T>, Error> {
        match self {
            Self::Json(value) => Ok(serde_json::from_value(value)?),
            Self::Empty => Ok(ListResponse::default()),
            Self::Binary(_) => Err(ApiError::parse("expected a JSON list, got binary data").into()),
        }
    }

    /// Reads the `Result` of a single-object envelope.
    ///
    /// Returns `None` for an empty body or a missing/`null` `Result`.
    pub fn into_single<T: DeserializeOwned>(self) -> Result<Option<T>, Error> {
        match self {
            Self::Json(value) => {
                let envelope: SingleResponse<T> = serde_json::from_value(value)?;
                Ok(envelope.result)
            }
            Self::Empty => Ok(None),
            Self::Binary(_) => Err(binary_body()),
        }
    }

    /// Reads the body of a write call; an empty body is an empty response.
    pub fn into_write(self) -> Result<WriteResponse, Error> {
        match self {
            Self::Json(value) => Ok(serde_json::from_value(value)?),
            Self::Empty => Ok(WriteResponse::default()),
            Self::Binary(_) => Err(binary_body()),
        }
    }

    /// Returns the JSON document as-is; an empty body is `null`.
    pub fn into_value(self) -> Result<Value, Error> {
        match self {
            Self::Json(value) => Ok(value),
            Self::Empty => Ok(Value::Null),
            Self::Binary(_) => Err(ApiError::parse("expected JSON, got binary data").into()),
        }
    }

    /// Returns the raw bytes of a binary response.
    pub fn into_bytes(self) -> Result<Vec<u8>, Error> {
        match self {
            Self::Binary(bytes) => Ok(bytes),
            Self::Empty => Ok(Vec::new()),
            Self::Json(value) => Err(ApiError::parse_with_body(
                "expected binary data, got JSON",
                value.to_string(),
            )
            .into()),
        }
    }
}

fn binary_body() -> Error {
    ApiError::parse("expected a JSON object, got binary data").into()
}

/// Body of a create, update or delete call made with `response=rows`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WriteResponse {
    #[serde(default)]
    pub records_affected: Option<usize>,

    /// The written rows, when the backend echoed them.
    #[serde(default, rename = "Result")]
    pub rows: Option<Vec<Record>>,
}

/// `{ Result: T[], Pagination?: {...} }`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
#[serde(bound = "T: DeserializeOwned")]
pub struct ListResponse<T = Record> {
    #[serde(default)]
    result: Option<Vec<T>>,

    #[serde(default)]
    pagination: Option<PaginationInfo>,
}

impl<T> Default for ListResponse<T> {
    fn default() -> Self {
        Self {
            result: None,
            pagination: None,
        }
    }
}

impl<T> ListResponse<T> {
    /// The `TotalCount` reported for the whole result set, if any.
    pub fn total_count(&self) -> Option<usize> {
        self.pagination.as_ref().and_then(|p| p.total_count)
    }

    pub fn pagination(&self) -> Option<&PaginationInfo> {
        self.pagination.as_ref()
    }

    pub fn into_items(self) -> Vec<T> {
        self.result.unwrap_or_default()
    }
}

/// The `Pagination` block of a list envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PaginationInfo {
    #[serde(default)]
    pub total_count: Option<usize>,
    #[serde(default)]
    pub page_number: Option<usize>,
    #[serde(default)]
    pub page_size: Option<usize>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
#[serde(bound = "T: DeserializeOwned")]
struct SingleResponse<T> {
    #[serde(default)]
    result: Option<T>,
}
