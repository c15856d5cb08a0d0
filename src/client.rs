use std::future::Future;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response};
use serde::Deserialize;
use url::Url;

use crate::credentials::Credential;
use crate::error::{Error, Result};
use crate::observability::{
    CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUEST_RETRIES, CLIENT_REQUESTS,
    CLIENT_RETRY_BACKOFF,
};
use crate::types::{ChatMessage, ChatRequest, Model, ModelCatalog, ModelList};

pub(crate) const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1/";
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
pub(crate) const DEFAULT_MAX_RETRIES: u32 = 2;
const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_millis(500);
const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(8);
const MAX_RETRY_AFTER_SECS: u64 = 60;

/// One request/response exchange with a chat-completion endpoint.
///
/// Implementations return the raw response body; decoding is left to
/// [`crate::types::decode_completion`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `messages` to `model` and returns the raw response body.
    async fn complete(&self, model: &Model, messages: Vec<ChatMessage>) -> Result<Bytes>;
}

/// Client for OpenRouter-compatible chat-completion APIs.
#[derive(Debug, Clone)]
pub struct OpenRouter {
    client: ReqwestClient,
    headers: HeaderMap,
    base_url: Url,
    timeout: Duration,
    max_retries: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl OpenRouter {
    /// Create a new client against the default endpoint.
    pub fn new(credential: Credential) -> Result<Self> {
        Self::with_options(credential, None, None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(
        credential: Credential,
        base_url: Option<&str>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let base_url = parse_base_url(base_url.unwrap_or(DEFAULT_API_URL))?;
        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            client,
            headers: default_headers(&credential)?,
            base_url,
            timeout,
            max_retries: DEFAULT_MAX_RETRIES,
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
            max_backoff: DEFAULT_MAX_BACKOFF,
        })
    }

    /// Sets how many times a retryable failure is retried.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the exponential backoff bounds.
    pub fn with_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_backoff = initial;
        self.max_backoff = max.max(initial);
        self
    }

    /// Returns the API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the retry budget.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// Process API response errors and convert to our Error type
    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();

        let retry_after = response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|val| val.to_str().ok())
            .and_then(|val| val.trim().parse::<u64>().ok());

        #[derive(Deserialize)]
        struct ErrorResponse {
            error: Option<ErrorDetail>,
        }

        #[derive(Deserialize)]
        struct ErrorDetail {
            #[serde(rename = "type")]
            error_type: Option<String>,
            code: Option<serde_json::Value>,
            message: Option<String>,
        }

        let error_body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Error::http_client(
                    format!("Failed to read error response: {}", e),
                    Some(Box::new(e)),
                );
            }
        };

        let detail = serde_json::from_str::<ErrorResponse>(&error_body)
            .ok()
            .and_then(|parsed| parsed.error);
        let error_type = detail.as_ref().and_then(|d| {
            d.error_type.clone().or_else(|| match &d.code {
                Some(serde_json::Value::String(code)) => Some(code.clone()),
                _ => None,
            })
        });
        let error_message = detail
            .and_then(|d| d.message)
            .unwrap_or_else(|| error_body.clone());

        match status_code {
            401 => Error::authentication(error_message),
            408 => Error::timeout(error_message, None),
            429 => Error::rate_limit(error_message, retry_after),
            500..=599 => Error::service_unavailable(status_code, error_message, retry_after),
            _ => Error::api(status_code, error_type, error_message),
        }
    }

    fn map_send_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::timeout(
                format!("Request timed out: {}", e),
                Some(self.timeout.as_secs_f64()),
            )
        } else if e.is_connect() {
            Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
        } else {
            Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
        }
    }

    async fn send_once(&self, request: &ChatRequest) -> Result<Bytes> {
        let url = self.endpoint("chat/completions")?;

        let response = self
            .client
            .post(url)
            .headers(self.headers.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }

        response.bytes().await.map_err(|e| self.map_send_error(e))
    }

    /// Send a conversation and get the raw response body.
    pub async fn send(&self, request: ChatRequest) -> Result<Bytes> {
        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            "sending chat completion"
        );
        self.with_retries("chat completion", || self.send_once(&request))
            .await
    }

    /// Fetch the model listing.
    pub async fn list_models(&self) -> Result<ModelList> {
        self.with_retries("model listing", move || async move {
            let url = self.endpoint("models")?;
            let response = self
                .client
                .get(url)
                .headers(self.headers.clone())
                .send()
                .await
                .map_err(|e| self.map_send_error(e))?;

            if !response.status().is_success() {
                return Err(Self::process_error_response(response).await);
            }

            response.json::<ModelList>().await.map_err(|e| {
                Error::decode(
                    format!("Failed to parse model listing: {}", e),
                    Some(Box::new(e)),
                )
            })
        })
        .await
    }

    /// Build a catalog of the models that are free for both prompt and completion.
    ///
    /// # Errors
    ///
    /// Fails if the listing cannot be fetched or contains no free model.
    pub async fn free_model_catalog(&self) -> Result<ModelCatalog> {
        let list = self.list_models().await?;
        ModelCatalog::new(list.free_models())
    }

    async fn with_retries<T, F, Fut>(&self, operation: &str, mut attempt_fn: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0u32;
        loop {
            CLIENT_REQUESTS.click();
            let start = Instant::now();
            let result = attempt_fn().await;
            CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());

            let err = match result {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            CLIENT_REQUEST_ERRORS.click();

            if attempt >= self.max_retries || !err.is_retryable() {
                tracing::warn!(operation, attempt, error = %err, "request failed");
                return Err(err);
            }

            let delay = self.backoff_delay(attempt, err.retry_after());
            CLIENT_REQUEST_RETRIES.click();
            CLIENT_RETRY_BACKOFF.add(delay.as_secs_f64());
            tracing::info!(
                operation,
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "retrying request"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Delay before retry number `attempt` (0-based).
    ///
    /// A server-provided `Retry-After` below one minute wins; otherwise the
    /// delay doubles from the initial backoff up to the maximum.
    fn backoff_delay(&self, attempt: u32, retry_after: Option<u64>) -> Duration {
        if let Some(secs) = retry_after {
            if secs > 0 && secs < MAX_RETRY_AFTER_SECS {
                return Duration::from_secs(secs);
            }
        }
        let factor = 1u32 << attempt.min(16);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

#[async_trait]
impl Transport for OpenRouter {
    async fn complete(&self, model: &Model, messages: Vec<ChatMessage>) -> Result<Bytes> {
        self.send(ChatRequest::new(model.clone(), messages)).await
    }
}

fn default_headers(credential: &Credential) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
    let mut auth = HeaderValue::from_str(&format!("Bearer {}", credential.expose()))
        .map_err(|_| Error::authentication("credential contains characters not valid in a header"))?;
    auth.set_sensitive(true);
    headers.insert(header::AUTHORIZATION, auth);
    Ok(headers)
}

fn parse_base_url(base_url: &str) -> Result<Url> {
    let mut base_url = base_url.trim().to_string();
    if !base_url.ends_with('/') {
        base_url.push('/');
    }
    let url = Url::parse(&base_url)?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(Error::config(
            format!("unsupported URL scheme: {scheme}"),
            Some("base-url".to_string()),
        )),
    }
}
