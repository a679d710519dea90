//! In-memory transport for unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use serde_json::json;

use super::ApiRequest;
use super::Transport;
use crate::error::Error;
use crate::response::ApiResponse;

type Handler = Box<dyn Fn(&ApiRequest) -> Result<ApiResponse, Error> + Send + Sync>;

/// Answers every request with `handler` and records what was sent.
pub(crate) struct MockTransport {
    handler: Handler,
    calls: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new(
        handler: impl Fn(&ApiRequest) -> Result<ApiResponse, Error> + Send + Sync + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn request(&self, request: ApiRequest) -> Result<ApiResponse, Error> {
        let response = (self.handler)(&request);
        self.calls.lock().unwrap().push(request);
        response
    }
}

/// `{ "Result": records }`, with `Pagination.TotalCount` when given.
pub(crate) fn list(records: Vec<Value>, total_count: Option<usize>) -> Result<ApiResponse, Error> {
    let mut body = json!({ "Result": records });
    if let Some(total) = total_count {
        body["Pagination"] = json!({ "TotalCount": total });
    }
    Ok(ApiResponse::Json(body))
}

/// `n` records shaped `{ "Id": start + i }`.
pub(crate) fn rows(start: usize, n: usize) -> Vec<Value> {
    (start..start + n).map(|id| json!({ "Id": id })).collect()
}

/// The numeric value of `key` in the request's query.
pub(crate) fn query_usize(request: &ApiRequest, key: &str) -> usize {
    request
        .query
        .get(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}
