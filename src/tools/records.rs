//! Record tools: thin pass-throughs over the PipeRun REST resources.
//!
//! Arguments arrive as loose JSON maps. Numeric-looking ids are coerced,
//! the handful of fields each create call depends on are checked locally,
//! and everything else is forwarded to PipeRun untouched.

use crate::client::{
    normalize_relative_path, query_from_map, AsyncPipeRunClient, HttpMethod, Query,
};
use crate::domain::{to_calendar_date, ApiToken, Resource};
use crate::error::{PipeRunApiError, PipeRunResult};
use crate::tools::args::{coerce_numeric_args, map_id, map_text, require_id};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Activity fields that PipeRun only accepts as `YYYY-MM-DD`.
const ACTIVITY_DATE_FIELDS: [&str; 2] = ["start_at", "end_at"];

/// Note linkage fields; a note must carry at least one.
const NOTE_LINK_FIELDS: [&str; 3] = ["deal_id", "person_id", "company_id"];

/// CRUD tools over PipeRun resources.
pub struct RecordTools {
    client: Arc<dyn AsyncPipeRunClient>,
}

impl RecordTools {
    pub fn new(client: Arc<dyn AsyncPipeRunClient>) -> Self {
        Self { client }
    }

    /// `GET /<resource>` with every remaining argument as a query parameter.
    pub async fn list(
        &self,
        token: &ApiToken,
        resource: Resource,
        mut filter: Map<String, Value>,
    ) -> PipeRunResult<Value> {
        coerce_numeric_args(&mut filter);
        self.client
            .list(token, resource, &query_from_map(&filter))
            .await
    }

    /// `GET /<resource>/<id>`; extra arguments are forwarded as query parameters.
    pub async fn get(
        &self,
        token: &ApiToken,
        resource: Resource,
        id: Option<i64>,
        mut query: Map<String, Value>,
    ) -> PipeRunResult<Value> {
        let id = require_id(id, resource.id_field())?;
        coerce_numeric_args(&mut query);
        self.client
            .get(token, resource, id, &query_from_map(&query))
            .await
    }

    /// `POST /<resource>` after resource-specific checks.
    pub async fn create(
        &self,
        token: &ApiToken,
        resource: Resource,
        mut fields: Map<String, Value>,
    ) -> PipeRunResult<Value> {
        coerce_numeric_args(&mut fields);
        let body = prepare_create(resource, fields)?;
        self.client.create(token, resource, &body).await
    }

    /// `PUT /<resource>/<id>` with the remaining arguments as the body.
    pub async fn update(
        &self,
        token: &ApiToken,
        resource: Resource,
        id: Option<i64>,
        mut fields: Map<String, Value>,
    ) -> PipeRunResult<Value> {
        let id = require_id(id, resource.id_field())?;
        coerce_numeric_args(&mut fields);
        if fields.is_empty() {
            return Err(PipeRunApiError::invalid(format!(
                "No fields to update besides '{}'",
                resource.id_field()
            )));
        }
        if resource == Resource::Activities {
            normalize_activity_dates(&mut fields)?;
        }

        self.client
            .update(token, resource, id, &Value::Object(fields))
            .await
    }

    pub async fn delete(
        &self,
        token: &ApiToken,
        resource: Resource,
        id: Option<i64>,
    ) -> PipeRunResult<Value> {
        let id = require_id(id, resource.id_field())?;
        self.client.delete(token, resource, id).await
    }

    /// Escape hatch: any verb against any path relative to `/v1`.
    pub async fn raw_request(
        &self,
        token: &ApiToken,
        method: Option<&str>,
        path: Option<&str>,
        query: Option<&Map<String, Value>>,
        body: Option<Value>,
    ) -> PipeRunResult<Value> {
        let (method, path) = match (method, path) {
            (Some(method), Some(path)) if !method.trim().is_empty() && !path.trim().is_empty() => {
                (method, path)
            }
            _ => return Err(PipeRunApiError::invalid("'method' and 'path' are required")),
        };

        let method: HttpMethod = method.parse()?;
        let path = normalize_relative_path(path)?;
        let query = query.map(query_from_map).unwrap_or_else(Query::new);
        let body = body.filter(|b| !b.is_null());

        self.client
            .request(token, method, &path, &query, body.as_ref())
            .await
    }
}

/// Validate and shape a create body for `resource`.
///
/// # Errors
///
/// Returns `PipeRunApiError::InvalidParams` naming the first missing field.
pub fn prepare_create(
    resource: Resource,
    mut fields: Map<String, Value>,
) -> PipeRunResult<Value> {
    match resource {
        Resource::Deals => {
            require_field_text(&fields, "title")?;
            require_field_number(&fields, "pipeline_id")?;
            require_field_number(&fields, "stage_id")?;
        }
        Resource::Persons | Resource::Companies => {
            require_field_text(&fields, "name")?;
            require_field_number(&fields, "owner_id")?;
            trim_strings(&mut fields, &["name", "email", "phone"]);
        }
        Resource::Activities => {
            require_field_text(&fields, "title")?;
            require_field_number(&fields, "activity_type_id")?;
            require_field_number(&fields, "status")?;
            normalize_activity_dates(&mut fields)?;
        }
        Resource::Notes => {
            require_field_text(&fields, "content")?;
            if !NOTE_LINK_FIELDS.iter().any(|f| map_id(&fields, f).is_some()) {
                return Err(PipeRunApiError::invalid(
                    "A note needs 'content' and at least one of 'deal_id', 'person_id' or 'company_id'",
                ));
            }
        }
        _ => {}
    }

    Ok(Value::Object(fields))
}

/// Rewrite non-blank `start_at`/`end_at` values as calendar dates.
pub fn normalize_activity_dates(fields: &mut Map<String, Value>) -> PipeRunResult<()> {
    for key in ACTIVITY_DATE_FIELDS {
        if let Some(Value::String(raw)) = fields.get(key) {
            if raw.trim().is_empty() {
                continue;
            }
            let date = to_calendar_date(raw)?;
            fields.insert(key.to_string(), Value::String(date));
        }
    }
    Ok(())
}

fn require_field_text(fields: &Map<String, Value>, key: &str) -> PipeRunResult<()> {
    map_text(fields, key)
        .map(|_| ())
        .ok_or_else(|| PipeRunApiError::invalid(format!("'{}' (string) is required", key)))
}

fn require_field_number(fields: &Map<String, Value>, key: &str) -> PipeRunResult<()> {
    require_id(map_id(fields, key), key).map(|_| ())
}

fn trim_strings(fields: &mut Map<String, Value>, keys: &[&str]) {
    for key in keys {
        if let Some(Value::String(s)) = fields.get_mut(*key) {
            *s = s.trim().to_string();
        }
    }
}
