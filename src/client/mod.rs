//! HTTP client for interacting with the PipeRun CRM API.
//!
//! This module provides a synchronous HTTP client that can be used from async contexts
//! via `tokio::task::spawn_blocking`. The client holds only immutable request-shaping
//! configuration (base URL, timeout); the credential travels with every call.

mod async_wrapper;
pub mod pagination;

pub use async_wrapper::{AsyncPipeRunClient, AsyncPipeRunClientImpl};
pub use pagination::{fetch_all, PageBounds};

use crate::config::Config;
use crate::domain::ApiToken;
use crate::error::{PipeRunApiError, PipeRunResult};
use crate::metrics::{HttpTimer, Metrics};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Query string pairs, in the order they are sent.
pub type Query = Vec<(String, String)>;

/// The HTTP verbs the PipeRun API accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = PipeRunApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            _ => Err(PipeRunApiError::invalid(
                "Invalid method. Use GET | POST | PUT | DELETE.",
            )),
        }
    }
}

/// Turn a JSON argument object into query pairs.
///
/// Scalars are rendered as text, `null` is dropped, arrays become repeated
/// `key[]` pairs and nested objects are sent as JSON text.
pub fn query_from_map(map: &Map<String, Value>) -> Query {
    let mut query = Query::new();
    for (key, value) in map {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items.iter().filter(|v| !v.is_null()) {
                    query.push((format!("{}[]", key), scalar_to_string(item)));
                }
            }
            other => query.push((key.clone(), scalar_to_string(other))),
        }
    }
    query
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Validate and normalize a caller-supplied path relative to `/v1`.
///
/// Absolute URLs are refused so the base URL can never be swapped out, and a
/// redundant leading `/v1` segment is removed because the base URL already has it.
pub fn normalize_relative_path(path: &str) -> PipeRunResult<String> {
    let path = path.trim();
    if path.is_empty() {
        return Err(PipeRunApiError::invalid("'path' is required"));
    }
    if path.starts_with("//") || path.contains("://") {
        return Err(PipeRunApiError::invalid(
            "Invalid path. Use a path relative to /v1 (e.g. /deals, /me).",
        ));
    }

    let mut normalized = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };

    if normalized.starts_with("/v1/") {
        normalized = normalized[3..].to_string();
    } else if normalized == "/v1" {
        normalized = "/".to_string();
    }

    Ok(normalized)
}

/// HTTP client for the PipeRun CRM API.
///
/// This client uses `ureq` for synchronous HTTP requests and can be called
/// from async contexts using `tokio::task::spawn_blocking`.
#[derive(Clone)]
pub struct PipeRunClient {
    /// Base URL for the PipeRun API (including `/v1`)
    base_url: String,

    /// HTTP client agent
    agent: Arc<ureq::Agent>,

    /// Metrics collector
    metrics: Metrics,
}

impl PipeRunClient {
    /// Create a new PipeRunClient from configuration.
    pub fn new(config: &Config) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.request_timeout))
            .build();

        Self {
            base_url: config.api_base_url.clone(),
            agent: Arc::new(agent),
            metrics: Metrics::new(),
        }
    }

    /// Create a PipeRunClient with a custom base URL (useful for testing).
    #[doc(hidden)]
    pub fn with_base_url(base_url: String) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(10))
            .build();

        Self {
            base_url,
            agent: Arc::new(agent),
            metrics: Metrics::new(),
        }
    }

    /// Get a reference to the metrics collector.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Build a full URL from a path.
    fn build_url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    /// Execute one authenticated request and decode the response body.
    pub fn request(
        &self,
        token: &ApiToken,
        method: HttpMethod,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> PipeRunResult<Value> {
        let url = self.build_url(path);
        tracing::debug!("{} {}", method, url);

        let mut request = self
            .agent
            .request(method.as_str(), &url)
            .set("token", token.as_str())
            .set("Content-Type", "application/json");
        for (key, value) in query {
            request = request.query(key, value);
        }

        let timer = HttpTimer::new(self.metrics.clone());
        let result = match body {
            Some(body) => request.send_json(body),
            None => request.call(),
        };

        let response = match result {
            Ok(response) => {
                timer.complete();
                response
            }
            Err(e) => {
                timer.complete_with_error();
                let err = self.map_error(e);
                tracing::error!("{} {} - Error: {}", method, url, err);
                return Err(err);
            }
        };

        tracing::debug!("{} {} - Success (status: {})", method, url, response.status());

        let text = response
            .into_string()
            .map_err(|e| PipeRunApiError::HttpError(e.to_string()))?;
        let value = Self::decode_body(&text);

        match method {
            HttpMethod::Get => self.metrics.record_records_fetched(Self::item_count(&value)),
            HttpMethod::Post => self.metrics.record_record_created(),
            _ => {}
        }

        Ok(value)
    }

    /// Empty bodies become `null`; non-JSON bodies are kept as a string.
    fn decode_body(text: &str) -> Value {
        if text.trim().is_empty() {
            return Value::Null;
        }
        serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
    }

    fn item_count(value: &Value) -> usize {
        value
            .get("data")
            .and_then(Value::as_array)
            .or_else(|| value.as_array())
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Map a ureq error to a PipeRunApiError.
    fn map_error(&self, error: ureq::Error) -> PipeRunApiError {
        match error {
            ureq::Error::Status(status, response) => {
                let message = response
                    .into_string()
                    .unwrap_or_else(|_| "Unknown error".to_string());
                PipeRunApiError::ApiError { status, message }
            }
            ureq::Error::Transport(transport) => {
                if transport.kind() == ureq::ErrorKind::ConnectionFailed {
                    PipeRunApiError::HttpError("Connection failed".to_string())
                } else if transport.to_string().contains("timed out") {
                    PipeRunApiError::Timeout
                } else {
                    PipeRunApiError::HttpError(transport.to_string())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_url() {
        let client = PipeRunClient::with_base_url("https://api.pipe.run/v1".to_string());

        assert_eq!(client.build_url("/deals"), "https://api.pipe.run/v1/deals");
        assert_eq!(client.build_url("deals"), "https://api.pipe.run/v1/deals");

        let client_with_slash = PipeRunClient::with_base_url("https://api.pipe.run/v1/".to_string());
        assert_eq!(
            client_with_slash.build_url("/deals/7"),
            "https://api.pipe.run/v1/deals/7"
        );
    }

    #[test]
    fn test_client_creation() {
        let config = Config {
            api_base_url: "https://sandbox.pipe.run/v1".to_string(),
            ..Config::default()
        };

        let client = PipeRunClient::new(&config);
        assert_eq!(client.base_url, "https://sandbox.pipe.run/v1");
        assert_eq!(client.metrics().http_requests_total(), 0);
    }

    #[test]
    fn test_normalize_relative_path() {
        assert_eq!(normalize_relative_path("deals").unwrap(), "/deals");
        assert_eq!(normalize_relative_path(" /deals/1 ").unwrap(), "/deals/1");
        assert_eq!(normalize_relative_path("/v1/deals").unwrap(), "/deals");
        assert_eq!(normalize_relative_path("v1/me").unwrap(), "/me");
        assert_eq!(normalize_relative_path("/v1").unwrap(), "/");
        assert_eq!(normalize_relative_path("/v10/x").unwrap(), "/v10/x");
    }

    #[test]
    fn test_normalize_relative_path_rejects_absolute_urls() {
        for path in ["https://evil.example/v1/deals", "//evil.example/deals", "/x?u=http://a", ""] {
            assert!(
                matches!(
                    normalize_relative_path(path),
                    Err(PipeRunApiError::InvalidParams(_))
                ),
                "{} should be rejected",
                path
            );
        }
    }

    #[test]
    fn test_http_method_parsing() {
        assert_eq!("get".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!(" Delete ".parse::<HttpMethod>().unwrap(), HttpMethod::Delete);
        assert!("PATCH".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn test_query_from_map() {
        let map = json!({
            "page": 2,
            "title": "Acme",
            "desc": true,
            "skip": null,
            "ids": [1, 2]
        });
        let query = query_from_map(map.as_object().unwrap());

        assert!(query.contains(&("page".to_string(), "2".to_string())));
        assert!(query.contains(&("title".to_string(), "Acme".to_string())));
        assert!(query.contains(&("desc".to_string(), "true".to_string())));
        assert!(query.contains(&("ids[]".to_string(), "1".to_string())));
        assert!(query.contains(&("ids[]".to_string(), "2".to_string())));
        assert!(!query.iter().any(|(k, _)| k == "skip"));
    }

    #[test]
    fn test_decode_body() {
        assert_eq!(PipeRunClient::decode_body(""), Value::Null);
        assert_eq!(PipeRunClient::decode_body(r#"{"id":1}"#), json!({"id": 1}));
        assert_eq!(PipeRunClient::decode_body("OK"), json!("OK"));
    }
}
