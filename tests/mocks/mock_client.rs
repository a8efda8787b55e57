use async_trait::async_trait;
use piperun_mcp_server::client::{AsyncPipeRunClient, HttpMethod, Query};
use piperun_mcp_server::domain::ApiToken;
use piperun_mcp_server::error::{PipeRunApiError, PipeRunResult};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// One request seen by the mock.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: HttpMethod,
    pub path: String,
    pub query: Query,
    pub body: Option<Value>,
    pub token: String,
}

#[allow(dead_code)]
impl RecordedCall {
    /// Value of a query parameter, if sent.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

enum Scripted {
    Ok(Value),
    Status(u16, String),
}

/// In-memory PipeRun API.
///
/// Responses are scripted per `"METHOD /path"` and consumed in order. Anything
/// unscripted falls back to a harmless default: an empty listing for GET, a
/// fresh id for POST and `{"success": true}` for PUT/DELETE. Every call is
/// recorded for verification.
#[allow(dead_code)]
#[derive(Clone)]
pub struct MockPipeRunClient {
    scripts: Arc<Mutex<HashMap<String, VecDeque<Scripted>>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    next_id: Arc<Mutex<i64>>,
}

#[allow(dead_code)]
impl MockPipeRunClient {
    pub fn new() -> Self {
        Self {
            scripts: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(Mutex::new(1000)),
        }
    }

    /// Queue a successful response for `"METHOD /path"`.
    pub fn respond(&self, route: &str, response: Value) {
        self.push(route, Scripted::Ok(response));
    }

    /// Queue an upstream error status for `"METHOD /path"`.
    pub fn fail(&self, route: &str, status: u16, message: &str) {
        self.push(route, Scripted::Status(status, message.to_string()));
    }

    /// All recorded calls, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Recorded calls for one `"METHOD /path"` route.
    pub fn calls_to(&self, route: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| Self::route_key(c.method, &c.path) == route)
            .collect()
    }

    /// Get the number of times a route was called.
    pub fn get_call_count(&self, route: &str) -> usize {
        self.calls_to(route).len()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn push(&self, route: &str, scripted: Scripted) {
        let mut scripts = self.scripts.lock().unwrap();
        scripts
            .entry(route.to_string())
            .or_default()
            .push_back(scripted);
    }

    fn route_key(method: HttpMethod, path: &str) -> String {
        format!("{} {}", method, path)
    }

    fn default_response(&self, method: HttpMethod) -> Value {
        match method {
            HttpMethod::Get => json!({ "data": [] }),
            HttpMethod::Post => {
                let mut next_id = self.next_id.lock().unwrap();
                *next_id += 1;
                json!({ "success": true, "data": { "id": *next_id } })
            }
            HttpMethod::Put | HttpMethod::Delete => json!({ "success": true }),
        }
    }
}

impl Default for MockPipeRunClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AsyncPipeRunClient for MockPipeRunClient {
    async fn request(
        &self,
        token: &ApiToken,
        method: HttpMethod,
        path: &str,
        query: &Query,
        body: Option<&Value>,
    ) -> PipeRunResult<Value> {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            path: path.to_string(),
            query: query.clone(),
            body: body.cloned(),
            token: token.as_str().to_string(),
        });

        let scripted = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(&Self::route_key(method, path))
            .and_then(VecDeque::pop_front);

        match scripted {
            Some(Scripted::Ok(value)) => Ok(value),
            Some(Scripted::Status(status, message)) => {
                Err(PipeRunApiError::ApiError { status, message })
            }
            None => Ok(self.default_response(method)),
        }
    }
}
