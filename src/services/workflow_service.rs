//! Multi-step RevOps workflows.
//!
//! Every workflow validates all of its arguments first, then runs its steps
//! strictly in order because later steps need ids produced by earlier ones.
//! A failing step aborts the workflow. Records created by earlier steps stay
//! in PipeRun; re-running is safe because people and companies are upserted.

use crate::client::{AsyncPipeRunClient, PageBounds};
use crate::config::{Config, DEFAULT_CALL_ACTIVITY_TYPE_ID, DEFAULT_MEETING_ACTIVITY_TYPE_ID};
use crate::domain::{to_calendar_date, unwrap_data, ApiToken, Resource};
use crate::error::{PipeRunApiError, PipeRunResult};
use crate::routing;
use crate::services::outcome::StepOutcome;
use crate::services::requests::{
    ActivityArgs, AssignDealOwnerRequest, CompleteActivityRequest, IntakeRequest,
    MeetingForDealRequest, OpportunityBundleRequest, OutboundCallRequest, RouteLeadRequest,
    SearchArgs,
};
use crate::services::upsert_service::{ArgumentNames, CompanyUpsert, PersonUpsert, UpsertService};
use crate::tools::args::{non_blank, parse_owner_candidates, require_id, require_text};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Status PipeRun uses for a completed activity.
const ACTIVITY_STATUS_DONE: i64 = 2;

/// Status for newly created activities unless the caller picks one.
const ACTIVITY_STATUS_OPEN: i64 = 0;

/// Defaults shared by every workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowSettings {
    pub meeting_activity_type_id: i64,
    pub call_activity_type_id: i64,
    pub search_bounds: PageBounds,
}

impl WorkflowSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            meeting_activity_type_id: config.meeting_activity_type_id,
            call_activity_type_id: config.call_activity_type_id,
            search_bounds: PageBounds::new(config.search_page_size, config.search_max_pages),
        }
    }

    /// Search bounds for one call, honoring the caller's overrides.
    pub fn bounds(&self, search: &SearchArgs) -> PageBounds {
        PageBounds::from_options(search.show, search.max_pages, self.search_bounds)
    }
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            meeting_activity_type_id: DEFAULT_MEETING_ACTIVITY_TYPE_ID,
            call_activity_type_id: DEFAULT_CALL_ACTIVITY_TYPE_ID,
            search_bounds: PageBounds::default(),
        }
    }
}

/// Result of `create_opportunity_bundle`.
#[derive(Debug, Clone, Serialize)]
pub struct BundleResult {
    pub company: StepOutcome,
    pub person: StepOutcome,
    pub deal: StepOutcome,
    pub deal_id: Option<i64>,
    pub note: StepOutcome,
}

/// Owners picked for each entity of an intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedOwners {
    pub deal_owner_id: Option<i64>,
    pub person_owner_id: Option<i64>,
    pub company_owner_id: Option<i64>,
}

/// Result of `revops_intake`.
#[derive(Debug, Clone, Serialize)]
pub struct IntakeResult {
    pub routing_key: String,
    pub auto_owner_id: Option<i64>,
    pub resolved_owners: ResolvedOwners,
    pub company: StepOutcome,
    pub person: StepOutcome,
    pub deal: StepOutcome,
    pub deal_id: Option<i64>,
    pub call: StepOutcome,
    pub note: StepOutcome,
    pub meeting: StepOutcome,
    pub followup: StepOutcome,
}

/// Result of `log_outbound_call_and_outcome`.
#[derive(Debug, Clone, Serialize)]
pub struct OutboundCallResult {
    pub call: StepOutcome,
    pub note: StepOutcome,
    pub followup: StepOutcome,
}

/// Result of `complete_activity_with_notes`.
#[derive(Debug, Clone, Serialize)]
pub struct CompleteActivityResult {
    pub activity: Value,
    pub note: StepOutcome,
}

/// Result of `route_lead_to_owner`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadRoute {
    pub key: String,
    pub owner_id: i64,
    pub index: usize,
    pub candidates_owner_ids: Vec<i64>,
}

/// Deterministically pick an owner for a lead. No upstream call.
pub fn route_lead(request: &RouteLeadRequest) -> PipeRunResult<LeadRoute> {
    let key = require_text(request.key.as_deref(), "key")?;

    let raw = request.candidates_owner_ids.as_deref().unwrap_or_default();
    if raw.is_empty() {
        return Err(PipeRunApiError::invalid(
            "'candidates_owner_ids' (array of integers) is required and cannot be empty",
        ));
    }
    let candidates = parse_owner_candidates(raw);
    if candidates.is_empty() {
        return Err(PipeRunApiError::invalid(
            "'candidates_owner_ids' must contain at least one valid number",
        ));
    }

    let decision = routing::route(&key, &candidates)?;
    Ok(LeadRoute {
        key,
        owner_id: decision.owner_id,
        index: decision.index,
        candidates_owner_ids: candidates,
    })
}

/// Note body linked to the first available of deal, person, company.
fn note_payload(
    content: &str,
    deal_id: Option<i64>,
    person_id: Option<i64>,
    company_id: Option<i64>,
) -> Option<Value> {
    let (field, id) = match (deal_id, person_id, company_id) {
        (Some(id), _, _) => ("deal_id", id),
        (None, Some(id), _) => ("person_id", id),
        (None, None, Some(id)) => ("company_id", id),
        (None, None, None) => return None,
    };
    let mut note = Map::new();
    note.insert("content".into(), json!(content));
    note.insert(field.into(), json!(id));
    Some(Value::Object(note))
}

/// Per-workflow fallbacks for an activity's title, type and owner.
struct ActivityDefaults<'a> {
    field: &'a str,
    title: Option<&'a str>,
    activity_type_id: i64,
    owner_id: Option<i64>,
}

/// Build an activity body (without linkage) from caller arguments.
///
/// Dates are normalized here so that a bad date fails the workflow before
/// anything is written upstream.
fn activity_payload(
    args: &ActivityArgs,
    defaults: ActivityDefaults<'_>,
) -> PipeRunResult<Map<String, Value>> {
    let title = non_blank(args.title.as_deref())
        .or_else(|| defaults.title.map(str::to_string))
        .ok_or_else(|| {
            PipeRunApiError::invalid(format!("'{}.title' (string) is required", defaults.field))
        })?;

    let mut payload = Map::new();
    payload.insert("title".into(), json!(title));
    payload.insert(
        "activity_type_id".into(),
        json!(args.activity_type_id.unwrap_or(defaults.activity_type_id)),
    );
    payload.insert(
        "status".into(),
        json!(args.status.unwrap_or(ACTIVITY_STATUS_OPEN)),
    );
    if let Some(owner_id) = args.owner_id.or(defaults.owner_id) {
        payload.insert("owner_id".into(), json!(owner_id));
    }
    if let Some(start) = non_blank(args.start_at.as_deref()) {
        payload.insert("start_at".into(), json!(to_calendar_date(&start)?));
    }
    if let Some(end) = non_blank(args.end_at.as_deref()) {
        payload.insert("end_at".into(), json!(to_calendar_date(&end)?));
    }
    if let Some(description) = &args.description {
        payload.insert("description".into(), json!(description));
    }
    Ok(payload)
}

fn link(payload: &mut Map<String, Value>, field: &str, id: Option<i64>) {
    if let Some(id) = id {
        payload.insert(field.to_string(), json!(id));
    }
}

/// Workflow service trait.
#[async_trait]
pub trait WorkflowService: Send + Sync {
    /// Company upsert, person upsert, deal create, then an optional note.
    async fn create_opportunity_bundle(
        &self,
        token: &ApiToken,
        request: OpportunityBundleRequest,
    ) -> PipeRunResult<BundleResult>;

    /// Routed intake: owners, upserts, deal, call, note, meeting and follow-up.
    async fn revops_intake(
        &self,
        token: &ApiToken,
        request: IntakeRequest,
    ) -> PipeRunResult<IntakeResult>;

    /// Optional call record, mandatory note, optional follow-up.
    async fn log_outbound_call_and_outcome(
        &self,
        token: &ApiToken,
        request: OutboundCallRequest,
    ) -> PipeRunResult<OutboundCallResult>;

    /// Mark an activity done and optionally leave a note next to it.
    async fn complete_activity_with_notes(
        &self,
        token: &ApiToken,
        request: CompleteActivityRequest,
    ) -> PipeRunResult<CompleteActivityResult>;

    async fn create_meeting_activity_for_deal(
        &self,
        token: &ApiToken,
        request: MeetingForDealRequest,
    ) -> PipeRunResult<Value>;

    async fn assign_deal_owner(
        &self,
        token: &ApiToken,
        request: AssignDealOwnerRequest,
    ) -> PipeRunResult<Value>;
}

/// Default implementation of WorkflowService.
pub struct WorkflowServiceImpl {
    client: Arc<dyn AsyncPipeRunClient>,
    upserts: Arc<dyn UpsertService>,
    settings: WorkflowSettings,
}

impl WorkflowServiceImpl {
    pub fn new(
        client: Arc<dyn AsyncPipeRunClient>,
        upserts: Arc<dyn UpsertService>,
        settings: WorkflowSettings,
    ) -> Self {
        Self {
            client,
            upserts,
            settings,
        }
    }

    /// Reuse a known company id, upsert when there is something to search by, else skip.
    async fn resolve_company(
        &self,
        token: &ApiToken,
        company_id: Option<i64>,
        upsert: CompanyUpsert,
        bounds: PageBounds,
    ) -> PipeRunResult<StepOutcome> {
        if company_id.is_some() {
            return Ok(StepOutcome::skipped(company_id));
        }
        if non_blank(upsert.name.as_deref()).is_none()
            && non_blank(upsert.domain.as_deref()).is_none()
        {
            return Ok(StepOutcome::skipped(None));
        }
        self.upserts.upsert_company(token, upsert, bounds).await
    }

    async fn resolve_person(
        &self,
        token: &ApiToken,
        person_id: Option<i64>,
        upsert: PersonUpsert,
        bounds: PageBounds,
    ) -> PipeRunResult<StepOutcome> {
        if person_id.is_some() {
            return Ok(StepOutcome::skipped(person_id));
        }
        if non_blank(upsert.name.as_deref()).is_none()
            && non_blank(upsert.email.as_deref()).is_none()
            && non_blank(upsert.phone.as_deref()).is_none()
        {
            return Ok(StepOutcome::skipped(None));
        }
        self.upserts.upsert_person(token, upsert, bounds).await
    }

    async fn create(
        &self,
        token: &ApiToken,
        resource: Resource,
        body: Value,
    ) -> PipeRunResult<StepOutcome> {
        let response = self.client.create(token, resource, &body).await?;
        let outcome = StepOutcome::created(response);
        tracing::info!("Created {} record: id={:?}", resource, outcome.id);
        Ok(outcome)
    }

    async fn create_optional(
        &self,
        token: &ApiToken,
        resource: Resource,
        body: Option<Value>,
    ) -> PipeRunResult<StepOutcome> {
        match body {
            Some(body) => self.create(token, resource, body).await,
            None => Ok(StepOutcome::skipped(None)),
        }
    }

    /// Look up the activity's deal/person/company when the caller gave none.
    ///
    /// A failed lookup is not fatal; the note is then skipped.
    async fn infer_activity_links(
        &self,
        token: &ApiToken,
        activity_id: i64,
    ) -> (Option<i64>, Option<i64>, Option<i64>) {
        match self
            .client
            .get(token, Resource::Activities, activity_id, &Vec::new())
            .await
        {
            Ok(response) => {
                let activity = unwrap_data(&response);
                let id = |key: &str| activity.get(key).and_then(Value::as_i64);
                (id("deal_id"), id("person_id"), id("company_id"))
            }
            Err(e) => {
                tracing::warn!(
                    "Could not load activity {} to infer note linkage: {}",
                    activity_id,
                    e
                );
                (None, None, None)
            }
        }
    }
}

/// Deal title, pipeline and stage, validated together.
fn deal_base(
    title: Option<&str>,
    pipeline_id: Option<i64>,
    stage_id: Option<i64>,
) -> PipeRunResult<Map<String, Value>> {
    let title = require_text(title, "title")?;
    let pipeline_id = require_id(pipeline_id, "pipeline_id")?;
    let stage_id = require_id(stage_id, "stage_id")?;

    let mut deal = Map::new();
    deal.insert("title".into(), json!(title));
    deal.insert("pipeline_id".into(), json!(pipeline_id));
    deal.insert("stage_id".into(), json!(stage_id));
    Ok(deal)
}

#[async_trait]
impl WorkflowService for WorkflowServiceImpl {
    async fn create_opportunity_bundle(
        &self,
        token: &ApiToken,
        request: OpportunityBundleRequest,
    ) -> PipeRunResult<BundleResult> {
        let mut deal = deal_base(
            request.title.as_deref(),
            request.pipeline_id,
            request.stage_id,
        )?;
        let bounds = self.settings.bounds(&request.search);

        let company = self
            .resolve_company(
                token,
                request.company_id,
                CompanyUpsert {
                    name: request.company_name,
                    owner_id: request.company_owner_id,
                    domain: request.company_domain,
                    email: request.company_email,
                    phone: request.company_phone,
                    arguments: ArgumentNames {
                        name: "'company_name'",
                        owner: "'company_owner_id'",
                    },
                },
                bounds,
            )
            .await?;

        let person = self
            .resolve_person(
                token,
                request.person_id,
                PersonUpsert {
                    name: request.person_name,
                    owner_id: request.person_owner_id,
                    email: request.person_email,
                    phone: request.person_phone,
                    company_id: company.id,
                    arguments: ArgumentNames {
                        name: "'person_name'",
                        owner: "'person_owner_id'",
                    },
                },
                bounds,
            )
            .await?;

        if let Some(value) = request.value {
            deal.insert("value".into(), Value::Number(value));
        }
        link(&mut deal, "owner_id", request.owner_id);
        link(&mut deal, "person_id", person.id);
        link(&mut deal, "company_id", company.id);
        let deal = self.create(token, Resource::Deals, Value::Object(deal)).await?;
        let deal_id = deal.id;

        let note_body = non_blank(request.note_content.as_deref())
            .and_then(|content| note_payload(&content, deal_id, None, None));
        let note = self.create_optional(token, Resource::Notes, note_body).await?;

        Ok(BundleResult {
            company,
            person,
            deal,
            deal_id,
            note,
        })
    }

    async fn revops_intake(
        &self,
        token: &ApiToken,
        request: IntakeRequest,
    ) -> PipeRunResult<IntakeResult> {
        let mut deal = deal_base(
            request.title.as_deref(),
            request.pipeline_id,
            request.stage_id,
        )?;
        let bounds = self.settings.bounds(&request.search);

        let routing_key = [
            &request.routing_key,
            &request.person_email,
            &request.person_phone,
            &request.company_domain,
            &request.company_name,
            &request.title,
        ]
        .into_iter()
        .find_map(|value| non_blank(value.as_deref()))
        .unwrap_or_default();

        let candidates = request
            .candidates_owner_ids
            .as_deref()
            .map(parse_owner_candidates)
            .unwrap_or_default();
        let auto_owner_id = if candidates.is_empty() {
            None
        } else {
            Some(routing::route(&routing_key, &candidates)?.owner_id)
        };

        let owners = ResolvedOwners {
            deal_owner_id: request.deal_owner_id.or(auto_owner_id),
            person_owner_id: request.person_owner_id.or(auto_owner_id),
            company_owner_id: request.company_owner_id.or(auto_owner_id),
        };

        let meeting_draft = request
            .meeting
            .as_ref()
            .map(|args| {
                activity_payload(
                    args,
                    ActivityDefaults {
                        field: "meeting",
                        title: Some("Meeting"),
                        activity_type_id: self.settings.meeting_activity_type_id,
                        owner_id: owners.deal_owner_id,
                    },
                )
            })
            .transpose()?;
        let followup_draft = request
            .followup
            .as_ref()
            .map(|args| {
                activity_payload(
                    args,
                    ActivityDefaults {
                        field: "followup",
                        title: Some("Follow-up"),
                        activity_type_id: self.settings.call_activity_type_id,
                        owner_id: owners.deal_owner_id,
                    },
                )
            })
            .transpose()?;

        tracing::debug!(
            "Intake routed: key={:?}, auto_owner_id={:?}",
            routing_key,
            auto_owner_id
        );

        let company = self
            .resolve_company(
                token,
                request.company_id,
                CompanyUpsert {
                    name: request.company_name,
                    owner_id: owners.company_owner_id,
                    domain: request.company_domain,
                    email: request.company_email,
                    phone: request.company_phone,
                    arguments: ArgumentNames {
                        name: "'company_name'",
                        owner: "'company_owner_id' or 'candidates_owner_ids' for routing",
                    },
                },
                bounds,
            )
            .await?;

        let person = self
            .resolve_person(
                token,
                request.person_id,
                PersonUpsert {
                    name: request.person_name,
                    owner_id: owners.person_owner_id,
                    email: request.person_email,
                    phone: request.person_phone,
                    company_id: company.id,
                    arguments: ArgumentNames {
                        name: "'person_name'",
                        owner: "'person_owner_id' or 'candidates_owner_ids' for routing",
                    },
                },
                bounds,
            )
            .await?;

        if let Some(value) = request.value {
            deal.insert("value".into(), Value::Number(value));
        }
        link(&mut deal, "owner_id", owners.deal_owner_id);
        link(&mut deal, "person_id", person.id);
        link(&mut deal, "company_id", company.id);
        let deal = self.create(token, Resource::Deals, Value::Object(deal)).await?;
        let deal_id = deal.id;

        let call = self
            .create_optional(token, Resource::Calls, request.call_body.map(Value::Object))
            .await?;

        let note_text = [
            non_blank(request.note_content.as_deref()),
            non_blank(request.call_outcome.as_deref()).map(|o| format!("Outcome: {}", o)),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join("\n\n");
        let note_body = if note_text.is_empty() {
            None
        } else {
            note_payload(&note_text, deal_id, None, None)
        };
        let note = self.create_optional(token, Resource::Notes, note_body).await?;

        let with_deal = |mut draft: Map<String, Value>| {
            link(&mut draft, "deal_id", deal_id);
            Value::Object(draft)
        };
        let meeting = self
            .create_optional(token, Resource::Activities, meeting_draft.map(with_deal))
            .await?;
        let followup = self
            .create_optional(token, Resource::Activities, followup_draft.map(with_deal))
            .await?;

        Ok(IntakeResult {
            routing_key,
            auto_owner_id,
            resolved_owners: owners,
            company,
            person,
            deal,
            deal_id,
            call,
            note,
            meeting,
            followup,
        })
    }

    async fn log_outbound_call_and_outcome(
        &self,
        token: &ApiToken,
        request: OutboundCallRequest,
    ) -> PipeRunResult<OutboundCallResult> {
        let content = require_text(request.note_content.as_deref(), "note_content")?;
        let note_body = note_payload(
            &content,
            request.deal_id,
            request.person_id,
            request.company_id,
        )
        .ok_or_else(|| {
            PipeRunApiError::invalid(
                "To create the note, provide a link: 'deal_id', 'person_id' or 'company_id'",
            )
        })?;

        let followup_body = request
            .followup
            .as_ref()
            .map(|args| -> PipeRunResult<Value> {
                let mut payload = activity_payload(
                    args,
                    ActivityDefaults {
                        field: "followup",
                        title: None,
                        activity_type_id: self.settings.call_activity_type_id,
                        owner_id: None,
                    },
                )?;
                link(&mut payload, "deal_id", request.deal_id);
                link(&mut payload, "person_id", request.person_id);
                link(&mut payload, "company_id", request.company_id);
                Ok(Value::Object(payload))
            })
            .transpose()?;

        let call = self
            .create_optional(token, Resource::Calls, request.call_body.map(Value::Object))
            .await?;
        let note = self.create(token, Resource::Notes, note_body).await?;
        let followup = self
            .create_optional(token, Resource::Activities, followup_body)
            .await?;

        Ok(OutboundCallResult {
            call,
            note,
            followup,
        })
    }

    async fn complete_activity_with_notes(
        &self,
        token: &ApiToken,
        request: CompleteActivityRequest,
    ) -> PipeRunResult<CompleteActivityResult> {
        let activity_id = require_id(request.activity_id, "activity_id")?;

        let activity = self
            .client
            .update(
                token,
                Resource::Activities,
                activity_id,
                &json!({ "status": ACTIVITY_STATUS_DONE }),
            )
            .await?;
        tracing::info!("Activity {} completed", activity_id);

        let note = match non_blank(request.note_content.as_deref()) {
            None => StepOutcome::skipped(None),
            Some(content) => {
                let (deal_id, person_id, company_id) = if request.deal_id.is_none()
                    && request.person_id.is_none()
                    && request.company_id.is_none()
                {
                    self.infer_activity_links(token, activity_id).await
                } else {
                    (request.deal_id, request.person_id, request.company_id)
                };

                let body = note_payload(&content, deal_id, person_id, company_id);
                if body.is_none() {
                    tracing::info!("No linkage for activity {}, note skipped", activity_id);
                }
                self.create_optional(token, Resource::Notes, body).await?
            }
        };

        Ok(CompleteActivityResult { activity, note })
    }

    async fn create_meeting_activity_for_deal(
        &self,
        token: &ApiToken,
        request: MeetingForDealRequest,
    ) -> PipeRunResult<Value> {
        let deal_id = require_id(request.deal_id, "deal_id")?;
        require_text(request.activity.title.as_deref(), "title")?;

        let mut payload = activity_payload(
            &request.activity,
            ActivityDefaults {
                field: "meeting",
                title: None,
                activity_type_id: self.settings.meeting_activity_type_id,
                owner_id: None,
            },
        )?;
        link(&mut payload, "deal_id", Some(deal_id));

        self.client
            .create(token, Resource::Activities, &Value::Object(payload))
            .await
    }

    async fn assign_deal_owner(
        &self,
        token: &ApiToken,
        request: AssignDealOwnerRequest,
    ) -> PipeRunResult<Value> {
        let deal_id = require_id(request.deal_id, "deal_id")?;
        let owner_id = require_id(request.owner_id, "owner_id")?;

        self.client
            .update(token, Resource::Deals, deal_id, &json!({ "owner_id": owner_id }))
            .await
    }
}
