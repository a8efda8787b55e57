//! Async wrapper around synchronous PipeRunClient.
//!
//! This module provides an async interface to the synchronous PipeRunClient by using
//! `tokio::task::spawn_blocking` to run HTTP operations on a dedicated thread pool,
//! preventing blocking of the async runtime.

use crate::client::{HttpMethod, PipeRunClient, Query};
use crate::domain::{ApiToken, Resource};
use crate::error::{PipeRunApiError, PipeRunResult};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Async trait for PipeRun API operations.
///
/// Implementors only provide `request`; the resource helpers are built on it.
/// Every call carries its own credential, so one implementation can serve
/// concurrent tool calls from different callers.
#[async_trait]
pub trait AsyncPipeRunClient: Send + Sync {
    /// Execute one request against a path relative to the API base URL.
    async fn request(
        &self,
        token: &ApiToken,
        method: HttpMethod,
        path: &str,
        query: &Query,
        body: Option<&Value>,
    ) -> PipeRunResult<Value>;

    /// `GET /<resource>` with query parameters.
    async fn list(&self, token: &ApiToken, resource: Resource, query: &Query) -> PipeRunResult<Value> {
        self.request(
            token,
            HttpMethod::Get,
            &resource.collection_path(),
            query,
            None,
        )
        .await
    }

    /// `GET /<resource>/<id>` with optional query parameters.
    async fn get(
        &self,
        token: &ApiToken,
        resource: Resource,
        id: i64,
        query: &Query,
    ) -> PipeRunResult<Value> {
        self.request(token, HttpMethod::Get, &resource.record_path(id), query, None)
            .await
    }

    /// `POST /<resource>`.
    async fn create(&self, token: &ApiToken, resource: Resource, body: &Value) -> PipeRunResult<Value> {
        self.request(
            token,
            HttpMethod::Post,
            &resource.collection_path(),
            &Query::new(),
            Some(body),
        )
        .await
    }

    /// `PUT /<resource>/<id>`.
    async fn update(
        &self,
        token: &ApiToken,
        resource: Resource,
        id: i64,
        body: &Value,
    ) -> PipeRunResult<Value> {
        self.request(
            token,
            HttpMethod::Put,
            &resource.record_path(id),
            &Query::new(),
            Some(body),
        )
        .await
    }

    /// `DELETE /<resource>/<id>`.
    async fn delete(&self, token: &ApiToken, resource: Resource, id: i64) -> PipeRunResult<Value> {
        self.request(
            token,
            HttpMethod::Delete,
            &resource.record_path(id),
            &Query::new(),
            None,
        )
        .await
    }
}

/// Async wrapper around synchronous PipeRunClient.
///
/// Uses `tokio::task::spawn_blocking` to run synchronous HTTP
/// operations on a dedicated thread pool, preventing blocking
/// the async runtime.
#[derive(Clone)]
pub struct AsyncPipeRunClientImpl {
    client: Arc<PipeRunClient>,
}

impl AsyncPipeRunClientImpl {
    pub fn new(client: PipeRunClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Access the wrapped synchronous client (for metrics).
    pub fn inner(&self) -> &PipeRunClient {
        &self.client
    }
}

#[async_trait]
impl AsyncPipeRunClient for AsyncPipeRunClientImpl {
    async fn request(
        &self,
        token: &ApiToken,
        method: HttpMethod,
        path: &str,
        query: &Query,
        body: Option<&Value>,
    ) -> PipeRunResult<Value> {
        let client = self.client.clone();
        let token = token.clone();
        let path = path.to_string();
        let query = query.clone();
        let body = body.cloned();

        tokio::task::spawn_blocking(move || {
            client.request(&token, method, &path, &query, body.as_ref())
        })
        .await
        .map_err(|e| PipeRunApiError::HttpError(format!("Task join error: {}", e)))?
    }
}
