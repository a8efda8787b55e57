//! Per-step results reported by the upsert and workflow services.

use crate::domain::{created_id, record_id};
use serde::Serialize;
use serde_json::Value;

/// What happened to one sub-entity of a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepAction {
    Matched,
    Created,
    Skipped,
}

/// Outcome of one workflow step: the action taken, the id it produced or
/// reused, and the upstream record when there is one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepOutcome {
    pub action: StepAction,
    pub id: Option<i64>,
    pub record: Value,
}

impl StepOutcome {
    /// An existing record found by the matcher.
    pub fn matched(record: Value) -> Self {
        Self {
            action: StepAction::Matched,
            id: record_id(&record),
            record,
        }
    }

    /// A create response; the id is read from the `data` envelope if present.
    pub fn created(response: Value) -> Self {
        Self {
            action: StepAction::Created,
            id: created_id(&response),
            record: response,
        }
    }

    /// Nothing was done. `id` carries a caller-supplied id, if any.
    pub fn skipped(id: Option<i64>) -> Self {
        Self {
            action: StepAction::Skipped,
            id,
            record: Value::Null,
        }
    }

    pub fn is_skipped(&self) -> bool {
        self.action == StepAction::Skipped
    }
}
