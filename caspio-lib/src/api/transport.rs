//! The request seam every operation goes through

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use super::query::QueryParams;
use crate::error::Error;
use crate::response::ApiResponse;

/// A single call against the REST API, relative to the integration base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path starting with `/`, e.g. `/v3/tables/Orders/records`.
    pub path: String,
    pub query: QueryParams,
    pub body: Option<Value>,
    /// Ask for the raw bytes instead of JSON.
    pub binary: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: QueryParams::new(),
            body: None,
            binary: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn binary(mut self) -> Self {
        self.binary = true;
        self
    }
}

/// Sends [`ApiRequest`]s to the backend.
///
/// [`CaspioClient`](crate::CaspioClient) is the HTTP implementation. Non-2xx
/// responses must come back as [`ApiError::Http`](crate::error::ApiError::Http).
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(&self, request: ApiRequest) -> Result<ApiResponse, Error>;
}
