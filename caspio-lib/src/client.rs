//! Main CaspioClient

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use reqwest::header::HeaderValue;
use url::Url;

use crate::api::ApiRequest;
use crate::api::Transport;
use crate::auth::TokenProvider;
use crate::error::ApiError;
use crate::error::Error;
use crate::rate_limit::RateLimiter;
use crate::rate_limit::RetryConfig;
use crate::response::ApiResponse;

/// HTTP client for one Caspio REST integration.
///
/// Cheap to clone; clones share the HTTP connection pool and rate limiter.
///
/// # Example
///
/// ```ignore
/// use caspio_lib::{CaspioClient, auth::StaticTokenProvider};
///
/// let client = CaspioClient::builder()
///     .integration_url("c1abc123.caspio.com")
///     .token_provider(StaticTokenProvider::new("my-token"))
///     .build()?;
///
/// let rows = Paginator::new()
///     .fetch_all(&client, "/v3/tables/Orders/records", &QueryParams::new())
///     .await?;
/// ```
#[derive(Clone)]
pub struct CaspioClient {
    inner: Arc<CaspioClientInner>,
}

struct CaspioClientInner {
    integration_url: String,
    base_url: Url,
    token_provider: Arc<dyn TokenProvider>,
    http_client: Client,
    timeout: Option<Duration>,
    retry_config: RetryConfig,
    rate_limiter: Option<RateLimiter>,
}

impl CaspioClient {
    /// Creates a new builder for constructing a client.
    pub fn builder() -> CaspioClientBuilder<Missing, Missing> {
        CaspioClientBuilder::new()
    }

    /// The integration host this client talks to.
    pub fn integration_url(&self) -> &str {
        &self.inner.integration_url
    }

    /// `https://{integration_url}/integrations/rest`
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Joins `path` onto the REST base and appends `query`.
    pub(crate) fn build_url(&self, request: &ApiRequest) -> Result<Url, ApiError> {
        let joined = format!(
            "{}{}",
            self.inner.base_url.as_str().trim_end_matches('/'),
            request.path
        );
        let mut url =
            Url::parse(&joined).map_err(|e| ApiError::InvalidUrl(format!("{joined}: {e}")))?;

        if !request.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in request.query.iter() {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    /// Sends one request with rate limiting and the configured retry policy.
    async fn send_with_retry(&self, request: &ApiRequest) -> Result<ApiResponse, Error> {
        let url = self.build_url(request)?;
        let retry_config = &self.inner.retry_config;
        let mut attempts = 0;

        loop {
            if let Some(limiter) = &self.inner.rate_limiter {
                limiter.acquire().await;
            }

            log::trace!("{} {}", request.method, request.path);

            match self.send_once(request, url.clone()).await {
                Ok(response) => return Ok(response),
                Err(Failure::Api { error, retry_after }) => {
                    if !retry_config.should_retry(&error, attempts) {
                        return Err(error.into());
                    }
                    let wait = retry_after.unwrap_or_else(|| retry_config.delay_for(attempts));
                    log::warn!(
                        "{} {} failed ({}), retrying in {:?}",
                        request.method,
                        request.path,
                        error,
                        wait
                    );
                    tokio::time::sleep(wait).await;
                    attempts += 1;
                }
                Err(Failure::Other(error)) => return Err(error),
            }
        }
    }

    /// Sends the request once and reads the body.
    async fn send_once(&self, request: &ApiRequest, url: Url) -> Result<ApiResponse, Failure> {
        let token = self
            .inner
            .token_provider
            .get_token(&self.inner.integration_url)
            .await
            .map_err(|e| Failure::Other(e.into()))?;

        let accept = if request.binary {
            "application/octet-stream"
        } else {
            "application/json"
        };

        let mut builder = self
            .inner
            .http_client
            .request(request.method.clone(), url)
            .header(ACCEPT, HeaderValue::from_static(accept))
            .bearer_auth(&token.access_token);

        if let Some(timeout) = self.inner.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| self.network_failure(e))?;
        let status = response.status();

        if !status.is_success() {
            let retry_after = parse_retry_after(&response);
            let body = response.text().await.unwrap_or_default();
            return Err(Failure::Api {
                error: ApiError::http(status.as_u16(), body),
                retry_after: retry_after.filter(|_| status == StatusCode::TOO_MANY_REQUESTS),
            });
        }

        if request.binary {
            let bytes = response.bytes().await.map_err(|e| self.network_failure(e))?;
            return Ok(ApiResponse::Binary(bytes.to_vec()));
        }

        let text = response.text().await.map_err(|e| self.network_failure(e))?;
        if text.trim().is_empty() {
            return Ok(ApiResponse::Empty);
        }

        serde_json::from_str(&text)
            .map(ApiResponse::Json)
            .map_err(|e| Failure::Other(ApiError::parse_with_body(e.to_string(), text).into()))
    }

    fn network_failure(&self, error: reqwest::Error) -> Failure {
        let error = match self.inner.timeout {
            Some(timeout) if error.is_timeout() => ApiError::Timeout(timeout),
            _ => ApiError::Network(error),
        };
        Failure::Api {
            error,
            retry_after: None,
        }
    }
}

#[async_trait]
impl Transport for CaspioClient {
    async fn request(&self, request: ApiRequest) -> Result<ApiResponse, Error> {
        self.send_with_retry(&request).await
    }
}

/// Outcome of a single send, before the retry decision.
enum Failure {
    Api {
        error: ApiError,
        retry_after: Option<Duration>,
    },
    Other(Error),
}

/// Parses the Retry-After header value (seconds).
fn parse_retry_after(response: &reqwest::Response) -> Option<Duration> {
    response
        .headers()
        .get("Retry-After")?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Builds the REST base URL from an integration host.
///
/// A bare host gets `https://`; an explicit scheme is kept.
fn rest_base_url(integration_url: &str) -> Result<Url, ApiError> {
    let host = integration_url.trim().trim_end_matches('/');
    let raw = if host.starts_with("http://") || host.starts_with("https://") {
        format!("{host}/integrations/rest")
    } else {
        format!("https://{host}/integrations/rest")
    };
    Url::parse(&raw).map_err(|e| ApiError::InvalidUrl(format!("{raw}: {e}")))
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for [`CaspioClient`].
///
/// `integration_url` and `token_provider` must be set before `build` is
/// available.
///
/// # Example
///
/// ```ignore
/// let client = CaspioClient::builder()
///     .integration_url("c1abc123.caspio.com")
///     .token_provider(my_provider)
///     .timeout(Duration::from_secs(30))
///     .retry(RetryConfig::default())
///     .rate_limiter(RateLimiter::per_minute(500))
///     .build()?;
/// ```
pub struct CaspioClientBuilder<U, P> {
    integration_url: U,
    token_provider: P,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    http_client: Option<Client>,
    retry_config: RetryConfig,
    rate_limiter: Option<RateLimiter>,
}

impl CaspioClientBuilder<Missing, Missing> {
    pub fn new() -> Self {
        Self {
            integration_url: Missing,
            token_provider: Missing,
            timeout: None,
            connect_timeout: None,
            http_client: None,
            retry_config: RetryConfig::no_retry(),
            rate_limiter: None,
        }
    }
}

impl Default for CaspioClientBuilder<Missing, Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> CaspioClientBuilder<Missing, P> {
    /// Sets the integration host, e.g. `c1abc123.caspio.com`.
    pub fn integration_url(self, url: impl Into<String>) -> CaspioClientBuilder<Set<String>, P> {
        CaspioClientBuilder {
            integration_url: Set(url.into()),
            token_provider: self.token_provider,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
            retry_config: self.retry_config,
            rate_limiter: self.rate_limiter,
        }
    }
}

impl<U> CaspioClientBuilder<U, Missing> {
    pub fn token_provider<T: TokenProvider + 'static>(
        self,
        provider: T,
    ) -> CaspioClientBuilder<U, Set<Arc<dyn TokenProvider>>> {
        CaspioClientBuilder {
            integration_url: self.integration_url,
            token_provider: Set(Arc::new(provider) as Arc<dyn TokenProvider>),
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
            retry_config: self.retry_config,
            rate_limiter: self.rate_limiter,
        }
    }
}

impl<U, P> CaspioClientBuilder<U, P> {
    /// Per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Applied when the builder creates the HTTP client itself.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Retry policy for 429, 5xx and network failures. Defaults to
    /// [`RetryConfig::no_retry`].
    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.retry_config = config;
        self
    }

    pub fn rate_limiter(mut self, limiter: RateLimiter) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }
}

impl CaspioClientBuilder<Set<String>, Set<Arc<dyn TokenProvider>>> {
    /// Builds the [`CaspioClient`].
    pub fn build(self) -> Result<CaspioClient, Error> {
        let base_url = rest_base_url(&self.integration_url.0)?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder();
                if let Some(timeout) = self.connect_timeout {
                    builder = builder.connect_timeout(timeout);
                }
                builder.build().map_err(ApiError::from)?
            }
        };

        Ok(CaspioClient {
            inner: Arc::new(CaspioClientInner {
                integration_url: self.integration_url.0,
                base_url,
                token_provider: self.token_provider.0,
                http_client,
                timeout: self.timeout,
                retry_config: self.retry_config,
                rate_limiter: self.rate_limiter,
            }),
        })
    }
}
