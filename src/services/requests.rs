//! Arguments of the workflow tools.
//!
//! Ids are read leniently (numbers or numeric strings); a malformed id reads
//! as absent so the workflow can report which argument it needed.

use crate::tools::args::{lenient_id, lenient_number};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Number, Value};

/// An activity attached to a workflow (meeting or follow-up).
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ActivityArgs {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    #[schemars(with = "Option<i64>")]
    pub owner_id: Option<i64>,
    /// Start date or date-time; sent as YYYY-MM-DD
    #[serde(default)]
    pub start_at: Option<String>,
    /// End date or date-time; sent as YYYY-MM-DD
    #[serde(default)]
    pub end_at: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Activity status (default 0 = open)
    #[serde(default, deserialize_with = "lenient_id")]
    #[schemars(with = "Option<i64>")]
    pub status: Option<i64>,
    #[serde(default, deserialize_with = "lenient_id")]
    #[schemars(with = "Option<i64>")]
    pub activity_type_id: Option<i64>,
}

/// Search window for find-or-create steps.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct SearchArgs {
    /// Max pages to scan (default 5, max 20)
    #[serde(default, deserialize_with = "lenient_id")]
    #[schemars(with = "Option<i64>")]
    pub max_pages: Option<i64>,
    /// Items per page (default 200, max 200)
    #[serde(default, deserialize_with = "lenient_id")]
    #[schemars(with = "Option<i64>")]
    pub show: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct UpsertPersonRequest {
    /// Name, used when the person has to be created
    #[serde(default)]
    pub name: Option<String>,
    /// Owner id, required to create
    #[serde(default, deserialize_with = "lenient_id")]
    #[schemars(with = "Option<i64>")]
    pub owner_id: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    #[schemars(with = "Option<i64>")]
    pub company_id: Option<i64>,
    #[serde(flatten)]
    pub search: SearchArgs,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct UpsertCompanyRequest {
    /// Name, used when the company has to be created
    #[serde(default)]
    pub name: Option<String>,
    /// Website domain (e.g. acme.com)
    #[serde(default)]
    pub domain: Option<String>,
    /// Owner id, required to create
    #[serde(default, deserialize_with = "lenient_id")]
    #[schemars(with = "Option<i64>")]
    pub owner_id: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(flatten)]
    pub search: SearchArgs,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct RouteLeadRequest {
    /// Routing key (e.g. email or domain)
    #[serde(default)]
    pub key: Option<String>,
    /// Eligible owner ids, in a fixed order
    #[serde(default)]
    #[schemars(with = "Option<Vec<i64>>")]
    pub candidates_owner_ids: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct AssignDealOwnerRequest {
    #[serde(default, deserialize_with = "lenient_id")]
    #[schemars(with = "Option<i64>")]
    pub deal_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_id")]
    #[schemars(with = "Option<i64>")]
    pub owner_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct MeetingForDealRequest {
    #[serde(default, deserialize_with = "lenient_id")]
    #[schemars(with = "Option<i64>")]
    pub deal_id: Option<i64>,
    #[serde(flatten)]
    pub activity: ActivityArgs,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct OpportunityBundleRequest {
    /// Deal title
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    #[schemars(with = "Option<i64>")]
    pub pipeline_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_id")]
    #[schemars(with = "Option<i64>")]
    pub stage_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_number")]
    #[schemars(with = "Option<f64>")]
    pub value: Option<Number>,
    /// Deal owner
    #[serde(default, deserialize_with = "lenient_id")]
    #[schemars(with = "Option<i64>")]
    pub owner_id: Option<i64>,

    /// Existing person; skips the person search
    #[serde(default, deserialize_with = "lenient_id")]
    #[schemars(with = "Option<i64>")]
    pub person_id: Option<i64>,
    #[serde(default)]
    pub person_name: Option<String>,
    /// Person owner, required if the person has to be created
    #[serde(default, deserialize_with = "lenient_id")]
    #[schemars(with = "Option<i64>")]
    pub person_owner_id: Option<i64>,
    #[serde(default)]
    pub person_email: Option<String>,
    #[serde(default)]
    pub person_phone: Option<String>,

    /// Existing company; skips the company search
    #[serde(default, deserialize_with = "lenient_id")]
    #[schemars(with = "Option<i64>")]
    pub company_id: Option<i64>,
    #[serde(default)]
    pub company_name: Option<String>,
    /// Company owner, required if the company has to be created
    #[serde(default, deserialize_with = "lenient_id")]
    #[schemars(with = "Option<i64>")]
    pub company_owner_id: Option<i64>,
    #[serde(default)]
    pub company_domain: Option<String>,
    #[serde(default)]
    pub company_email: Option<String>,
    #[serde(default)]
    pub company_phone: Option<String>,

    /// Note attached to the new deal
    #[serde(default)]
    pub note_content: Option<String>,

    #[serde(flatten)]
    pub search: SearchArgs,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct IntakeRequest {
    /// Eligible owners; used for every owner not given explicitly
    #[serde(default)]
    #[schemars(with = "Option<Vec<i64>>")]
    pub candidates_owner_ids: Option<Vec<Value>>,
    /// Routing key; defaults to person email, person phone, company domain, company name, then title
    #[serde(default)]
    pub routing_key: Option<String>,

    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    #[schemars(with = "Option<i64>")]
    pub pipeline_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_id")]
    #[schemars(with = "Option<i64>")]
    pub stage_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_number")]
    #[schemars(with = "Option<f64>")]
    pub value: Option<Number>,
    #[serde(default, deserialize_with = "lenient_id")]
    #[schemars(with = "Option<i64>")]
    pub deal_owner_id: Option<i64>,

    #[serde(default, deserialize_with = "lenient_id")]
    #[schemars(with = "Option<i64>")]
    pub person_id: Option<i64>,
    #[serde(default)]
    pub person_name: Option<String>,
    #[serde(default)]
    pub person_email: Option<String>,
    #[serde(default)]
    pub person_phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    #[schemars(with = "Option<i64>")]
    pub person_owner_id: Option<i64>,

    #[serde(default, deserialize_with = "lenient_id")]
    #[schemars(with = "Option<i64>")]
    pub company_id: Option<i64>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub company_domain: Option<String>,
    #[serde(default)]
    pub company_email: Option<String>,
    #[serde(default)]
    pub company_phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    #[schemars(with = "Option<i64>")]
    pub company_owner_id: Option<i64>,

    #[serde(default)]
    pub note_content: Option<String>,
    /// Call outcome, appended to the note as "Outcome: ..."
    #[serde(default)]
    pub call_outcome: Option<String>,
    /// Raw body for POST /calls
    #[serde(default)]
    pub call_body: Option<Map<String, Value>>,

    /// Meeting linked to the new deal
    #[serde(default)]
    pub meeting: Option<ActivityArgs>,
    /// Follow-up linked to the new deal (default type: call)
    #[serde(default)]
    pub followup: Option<ActivityArgs>,

    #[serde(flatten)]
    pub search: SearchArgs,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct OutboundCallRequest {
    /// Raw body for POST /calls
    #[serde(default)]
    pub call_body: Option<Map<String, Value>>,
    /// Call result, stored as a note
    #[serde(default)]
    pub note_content: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    #[schemars(with = "Option<i64>")]
    pub deal_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_id")]
    #[schemars(with = "Option<i64>")]
    pub person_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_id")]
    #[schemars(with = "Option<i64>")]
    pub company_id: Option<i64>,
    /// Follow-up activity; `title` is required
    #[serde(default)]
    pub followup: Option<ActivityArgs>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct CompleteActivityRequest {
    #[serde(default, deserialize_with = "lenient_id")]
    #[schemars(with = "Option<i64>")]
    pub activity_id: Option<i64>,
    #[serde(default)]
    pub note_content: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    #[schemars(with = "Option<i64>")]
    pub deal_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_id")]
    #[schemars(with = "Option<i64>")]
    pub person_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_id")]
    #[schemars(with = "Option<i64>")]
    pub company_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bundle_request_accepts_string_ids() {
        let request: OpportunityBundleRequest = serde_json::from_value(json!({
            "title": "Acme deal",
            "pipeline_id": "10",
            "stage_id": 20,
            "value": "1500",
            "max_pages": "2"
        }))
        .unwrap();

        assert_eq!(request.pipeline_id, Some(10));
        assert_eq!(request.stage_id, Some(20));
        assert_eq!(request.value, Some(Number::from(1500)));
        assert_eq!(request.search.max_pages, Some(2));
        assert_eq!(request.search.show, None);
    }

    #[test]
    fn test_intake_request_nested_activities() {
        let request: IntakeRequest = serde_json::from_value(json!({
            "title": "Lead",
            "candidates_owner_ids": [11, "22"],
            "meeting": {"start_at": "2024-03-05T14:30:00Z", "owner_id": "5"},
            "call_body": {"duration": 60}
        }))
        .unwrap();

        let meeting = request.meeting.unwrap();
        assert_eq!(meeting.owner_id, Some(5));
        assert_eq!(meeting.title, None);
        assert_eq!(request.candidates_owner_ids.unwrap().len(), 2);
        assert_eq!(request.call_body.unwrap()["duration"], json!(60));
        assert!(request.followup.is_none());
    }

    #[test]
    fn test_meeting_request_flattens_activity() {
        let request: MeetingForDealRequest = serde_json::from_value(json!({
            "deal_id": 7,
            "title": "Kickoff",
            "status": "1"
        }))
        .unwrap();
        assert_eq!(request.deal_id, Some(7));
        assert_eq!(request.activity.title.as_deref(), Some("Kickoff"));
        assert_eq!(request.activity.status, Some(1));
    }
}
