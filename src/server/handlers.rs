//! MCP tool handlers for the PipeRun server.
//!
//! This module implements all the MCP tools using the rmcp SDK's tool_router pattern.

use crate::client::AsyncPipeRunClient;
use crate::config::Config;
use crate::domain::{resolve_token, ApiToken, Resource};
use crate::error::{ErrorClass, PipeRunApiError};
use crate::services::{
    route_lead, AssignDealOwnerRequest, CompanyUpsert, CompleteActivityRequest, IntakeRequest,
    MeetingForDealRequest, OpportunityBundleRequest, OutboundCallRequest, PersonUpsert,
    RouteLeadRequest, UpsertCompanyRequest, UpsertPersonRequest, UpsertService,
    UpsertServiceImpl, WorkflowService, WorkflowServiceImpl, WorkflowSettings,
};
use crate::tools::args::lenient_id;
use crate::tools::RecordTools;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::sync::Arc;

/// The PipeRun MCP server that exposes PipeRun CRM resources and RevOps workflows.
#[derive(Clone)]
pub struct PipeRunMcpServer {
    default_token: Option<ApiToken>,
    records: Arc<RecordTools>,
    upsert_service: Arc<dyn UpsertService>,
    workflow_service: Arc<dyn WorkflowService>,
    settings: WorkflowSettings,
    tool_router: ToolRouter<Self>,
}

// Implement ServerHandler using the tool_handler macro
#[tool_handler]
impl ServerHandler for PipeRunMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities {
                tools: Some(Default::default()),
                ..Default::default()
            },
            server_info: Implementation {
                name: "piperun-mcp-server".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                icons: None,
                title: None,
                website_url: None,
            },
            instructions: Some("MCP server for the PipeRun CRM - CRUD over deals, people, companies, activities, calls and notes, plus RevOps workflows (upserts, lead routing, intake bundles). Every tool accepts an optional 'api_token'; PIPERUN_API_TOKEN is used when it is omitted.".into()),
        }
    }
}

/// Tool arguments plus the optional per-call credential.
#[derive(Debug, Deserialize, JsonSchema)]
struct Authed<T> {
    /// PipeRun API token. Falls back to PIPERUN_API_TOKEN when omitted.
    #[serde(default)]
    api_token: Option<String>,
    #[serde(flatten)]
    args: T,
}

/// Free-form fields forwarded to PipeRun.
#[derive(Debug, Deserialize, JsonSchema)]
struct Fields {
    #[serde(flatten)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct DealRef {
    #[serde(default, deserialize_with = "lenient_id")]
    #[schemars(with = "Option<i64>")]
    deal_id: Option<i64>,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct PersonRef {
    #[serde(default, deserialize_with = "lenient_id")]
    #[schemars(with = "Option<i64>")]
    person_id: Option<i64>,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct CompanyRef {
    #[serde(default, deserialize_with = "lenient_id")]
    #[schemars(with = "Option<i64>")]
    company_id: Option<i64>,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct ActivityRef {
    #[serde(default, deserialize_with = "lenient_id")]
    #[schemars(with = "Option<i64>")]
    activity_id: Option<i64>,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct CallRef {
    #[serde(default, deserialize_with = "lenient_id")]
    #[schemars(with = "Option<i64>")]
    call_id: Option<i64>,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct NoteRef {
    #[serde(default, deserialize_with = "lenient_id")]
    #[schemars(with = "Option<i64>")]
    note_id: Option<i64>,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct RawRequestParams {
    /// GET | POST | PUT | DELETE
    #[serde(default)]
    method: Option<String>,
    /// Path relative to /v1, e.g. /deals or /me
    #[serde(default)]
    path: Option<String>,
    /// Query string parameters
    #[serde(default)]
    query: Option<Map<String, Value>>,
    /// JSON body for POST/PUT
    #[serde(default)]
    body: Option<Value>,
}

// Helper function to convert errors to MCP errors
fn to_mcp_error(e: PipeRunApiError) -> McpError {
    tracing::error!("Tool call failed: {}", e);
    let code = match e.class() {
        ErrorClass::InvalidParams => ErrorCode::INVALID_PARAMS,
        ErrorClass::InvalidRequest => ErrorCode::INVALID_REQUEST,
        ErrorClass::Internal => ErrorCode::INTERNAL_ERROR,
    };
    McpError {
        code,
        message: Cow::from(e.to_string()),
        data: None,
    }
}

fn json_response<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| to_mcp_error(PipeRunApiError::from(e)))?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

// Shared plumbing for the pass-through tools
impl PipeRunMcpServer {
    /// Resolve the credential for one call, before anything goes upstream.
    fn token(&self, explicit: Option<&str>) -> Result<ApiToken, McpError> {
        resolve_token(explicit, self.default_token.as_ref()).map_err(to_mcp_error)
    }

    async fn list(
        &self,
        resource: Resource,
        params: Authed<Fields>,
    ) -> Result<CallToolResult, McpError> {
        let token = self.token(params.api_token.as_deref())?;
        let response = self
            .records
            .list(&token, resource, params.args.fields)
            .await
            .map_err(to_mcp_error)?;
        json_response(&response)
    }

    async fn get(
        &self,
        token: Option<&str>,
        resource: Resource,
        id: Option<i64>,
        query: Map<String, Value>,
    ) -> Result<CallToolResult, McpError> {
        let token = self.token(token)?;
        let response = self
            .records
            .get(&token, resource, id, query)
            .await
            .map_err(to_mcp_error)?;
        json_response(&response)
    }

    async fn create(
        &self,
        resource: Resource,
        params: Authed<Fields>,
    ) -> Result<CallToolResult, McpError> {
        let token = self.token(params.api_token.as_deref())?;
        let response = self
            .records
            .create(&token, resource, params.args.fields)
            .await
            .map_err(to_mcp_error)?;
        json_response(&response)
    }

    async fn update(
        &self,
        token: Option<&str>,
        resource: Resource,
        id: Option<i64>,
        fields: Map<String, Value>,
    ) -> Result<CallToolResult, McpError> {
        let token = self.token(token)?;
        let response = self
            .records
            .update(&token, resource, id, fields)
            .await
            .map_err(to_mcp_error)?;
        json_response(&response)
    }

    async fn delete(
        &self,
        token: Option<&str>,
        resource: Resource,
        id: Option<i64>,
    ) -> Result<CallToolResult, McpError> {
        let token = self.token(token)?;
        let response = self
            .records
            .delete(&token, resource, id)
            .await
            .map_err(to_mcp_error)?;
        json_response(&response)
    }
}

// Tool router implementation
#[tool_router]
impl PipeRunMcpServer {
    /// Create a new PipeRun MCP server.
    pub fn new(client: Arc<dyn AsyncPipeRunClient>, config: &Config) -> Self {
        let settings = WorkflowSettings::from_config(config);

        let upsert_service =
            Arc::new(UpsertServiceImpl::new(client.clone())) as Arc<dyn UpsertService>;

        let workflow_service = Arc::new(WorkflowServiceImpl::new(
            client.clone(),
            upsert_service.clone(),
            settings,
        )) as Arc<dyn WorkflowService>;

        Self {
            default_token: config.default_token.clone(),
            records: Arc::new(RecordTools::new(client)),
            upsert_service,
            workflow_service,
            settings,
            tool_router: Self::tool_router(),
        }
    }

    // ===== Deals =====

    #[tool(
        description = "List deals (opportunities). Extra arguments are sent as query filters (page, show, pipeline_id, stage_id, ...)."
    )]
    async fn list_deals(
        &self,
        params: Parameters<Authed<Fields>>,
    ) -> Result<CallToolResult, McpError> {
        self.list(Resource::Deals, params.0).await
    }

    #[tool(description = "Alias of list_deals.")]
    async fn list_opportunities(
        &self,
        params: Parameters<Authed<Fields>>,
    ) -> Result<CallToolResult, McpError> {
        self.list(Resource::Deals, params.0).await
    }

    #[tool(description = "Get one deal by 'deal_id'.")]
    async fn get_deal(
        &self,
        params: Parameters<Authed<DealRef>>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        self.get(
            params.api_token.as_deref(),
            Resource::Deals,
            params.args.deal_id,
            params.args.fields,
        )
        .await
    }

    #[tool(description = "Alias of get_deal.")]
    async fn get_opportunity(
        &self,
        params: Parameters<Authed<DealRef>>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        self.get(
            params.api_token.as_deref(),
            Resource::Deals,
            params.args.deal_id,
            params.args.fields,
        )
        .await
    }

    #[tool(
        description = "Create a deal. Requires 'title', 'pipeline_id' and 'stage_id'; other fields (value, owner_id, person_id, company_id, ...) are forwarded."
    )]
    async fn create_deal(
        &self,
        params: Parameters<Authed<Fields>>,
    ) -> Result<CallToolResult, McpError> {
        self.create(Resource::Deals, params.0).await
    }

    #[tool(description = "Alias of create_deal.")]
    async fn create_opportunity(
        &self,
        params: Parameters<Authed<Fields>>,
    ) -> Result<CallToolResult, McpError> {
        self.create(Resource::Deals, params.0).await
    }

    #[tool(description = "Update a deal. Requires 'deal_id' and at least one field to change.")]
    async fn update_deal(
        &self,
        params: Parameters<Authed<DealRef>>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        self.update(
            params.api_token.as_deref(),
            Resource::Deals,
            params.args.deal_id,
            params.args.fields,
        )
        .await
    }

    #[tool(description = "Alias of update_deal.")]
    async fn update_opportunity(
        &self,
        params: Parameters<Authed<DealRef>>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        self.update(
            params.api_token.as_deref(),
            Resource::Deals,
            params.args.deal_id,
            params.args.fields,
        )
        .await
    }

    #[tool(description = "Delete a deal by 'deal_id'.")]
    async fn delete_deal(
        &self,
        params: Parameters<Authed<DealRef>>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        self.delete(params.api_token.as_deref(), Resource::Deals, params.args.deal_id)
            .await
    }

    #[tool(description = "Alias of delete_deal.")]
    async fn delete_opportunity(
        &self,
        params: Parameters<Authed<DealRef>>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        self.delete(params.api_token.as_deref(), Resource::Deals, params.args.deal_id)
            .await
    }

    // ===== People =====

    #[tool(description = "List people. Extra arguments are sent as query filters.")]
    async fn list_persons(
        &self,
        params: Parameters<Authed<Fields>>,
    ) -> Result<CallToolResult, McpError> {
        self.list(Resource::Persons, params.0).await
    }

    #[tool(description = "Get one person by 'person_id'.")]
    async fn get_person(
        &self,
        params: Parameters<Authed<PersonRef>>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        self.get(
            params.api_token.as_deref(),
            Resource::Persons,
            params.args.person_id,
            params.args.fields,
        )
        .await
    }

    #[tool(
        description = "Create a person. Requires 'name' and 'owner_id'; name, email and phone are trimmed."
    )]
    async fn create_person(
        &self,
        params: Parameters<Authed<Fields>>,
    ) -> Result<CallToolResult, McpError> {
        self.create(Resource::Persons, params.0).await
    }

    #[tool(description = "Update a person. Requires 'person_id' and at least one field to change.")]
    async fn update_person(
        &self,
        params: Parameters<Authed<PersonRef>>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        self.update(
            params.api_token.as_deref(),
            Resource::Persons,
            params.args.person_id,
            params.args.fields,
        )
        .await
    }

    #[tool(description = "Delete a person by 'person_id'.")]
    async fn delete_person(
        &self,
        params: Parameters<Authed<PersonRef>>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        self.delete(
            params.api_token.as_deref(),
            Resource::Persons,
            params.args.person_id,
        )
        .await
    }

    // ===== Companies =====

    #[tool(description = "List companies. Extra arguments are sent as query filters.")]
    async fn list_companies(
        &self,
        params: Parameters<Authed<Fields>>,
    ) -> Result<CallToolResult, McpError> {
        self.list(Resource::Companies, params.0).await
    }

    #[tool(
        description = "Get one company by 'company_id'. Extra arguments are sent as query parameters."
    )]
    async fn get_company(
        &self,
        params: Parameters<Authed<CompanyRef>>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        self.get(
            params.api_token.as_deref(),
            Resource::Companies,
            params.args.company_id,
            params.args.fields,
        )
        .await
    }

    #[tool(description = "Create a company. Requires 'name' and 'owner_id'.")]
    async fn create_company(
        &self,
        params: Parameters<Authed<Fields>>,
    ) -> Result<CallToolResult, McpError> {
        self.create(Resource::Companies, params.0).await
    }

    #[tool(
        description = "Update a company. Requires 'company_id' and at least one field to change."
    )]
    async fn update_company(
        &self,
        params: Parameters<Authed<CompanyRef>>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        self.update(
            params.api_token.as_deref(),
            Resource::Companies,
            params.args.company_id,
            params.args.fields,
        )
        .await
    }

    // ===== Activities =====

    #[tool(description = "List activities. Extra arguments are sent as query filters.")]
    async fn list_activities(
        &self,
        params: Parameters<Authed<Fields>>,
    ) -> Result<CallToolResult, McpError> {
        self.list(Resource::Activities, params.0).await
    }

    #[tool(description = "Get one activity by 'activity_id'.")]
    async fn get_activity(
        &self,
        params: Parameters<Authed<ActivityRef>>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        self.get(
            params.api_token.as_deref(),
            Resource::Activities,
            params.args.activity_id,
            params.args.fields,
        )
        .await
    }

    #[tool(
        description = "Create an activity. Requires 'title', 'activity_type_id' and 'status'; 'start_at'/'end_at' are sent as YYYY-MM-DD."
    )]
    async fn create_activity(
        &self,
        params: Parameters<Authed<Fields>>,
    ) -> Result<CallToolResult, McpError> {
        self.create(Resource::Activities, params.0).await
    }

    #[tool(
        description = "Update an activity. Requires 'activity_id' and at least one field; 'start_at'/'end_at' are sent as YYYY-MM-DD."
    )]
    async fn update_activity(
        &self,
        params: Parameters<Authed<ActivityRef>>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        self.update(
            params.api_token.as_deref(),
            Resource::Activities,
            params.args.activity_id,
            params.args.fields,
        )
        .await
    }

    #[tool(description = "Delete an activity by 'activity_id'.")]
    async fn delete_activity(
        &self,
        params: Parameters<Authed<ActivityRef>>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        self.delete(
            params.api_token.as_deref(),
            Resource::Activities,
            params.args.activity_id,
        )
        .await
    }

    // ===== Calls =====

    #[tool(description = "List call history. Extra arguments are sent as query filters.")]
    async fn list_calls(
        &self,
        params: Parameters<Authed<Fields>>,
    ) -> Result<CallToolResult, McpError> {
        self.list(Resource::Calls, params.0).await
    }

    #[tool(description = "Get one call record by 'call_id'.")]
    async fn get_call(
        &self,
        params: Parameters<Authed<CallRef>>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        self.get(
            params.api_token.as_deref(),
            Resource::Calls,
            params.args.call_id,
            params.args.fields,
        )
        .await
    }

    #[tool(description = "Create a call record. The arguments are sent as the body unchanged.")]
    async fn create_call(
        &self,
        params: Parameters<Authed<Fields>>,
    ) -> Result<CallToolResult, McpError> {
        self.create(Resource::Calls, params.0).await
    }

    #[tool(description = "Update a call record. Requires 'call_id' and at least one field.")]
    async fn update_call(
        &self,
        params: Parameters<Authed<CallRef>>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        self.update(
            params.api_token.as_deref(),
            Resource::Calls,
            params.args.call_id,
            params.args.fields,
        )
        .await
    }

    #[tool(description = "Delete a call record by 'call_id'.")]
    async fn delete_call(
        &self,
        params: Parameters<Authed<CallRef>>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        self.delete(params.api_token.as_deref(), Resource::Calls, params.args.call_id)
            .await
    }

    // ===== Notes =====

    #[tool(description = "List notes. Extra arguments are sent as query filters.")]
    async fn list_notes(
        &self,
        params: Parameters<Authed<Fields>>,
    ) -> Result<CallToolResult, McpError> {
        self.list(Resource::Notes, params.0).await
    }

    #[tool(description = "Get one note by 'note_id'.")]
    async fn get_note(
        &self,
        params: Parameters<Authed<NoteRef>>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        self.get(
            params.api_token.as_deref(),
            Resource::Notes,
            params.args.note_id,
            params.args.fields,
        )
        .await
    }

    #[tool(
        description = "Create a note. Requires 'content' and at least one of 'deal_id', 'person_id' or 'company_id'."
    )]
    async fn create_note(
        &self,
        params: Parameters<Authed<Fields>>,
    ) -> Result<CallToolResult, McpError> {
        self.create(Resource::Notes, params.0).await
    }

    #[tool(description = "Update a note. Requires 'note_id' and at least one field.")]
    async fn update_note(
        &self,
        params: Parameters<Authed<NoteRef>>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        self.update(
            params.api_token.as_deref(),
            Resource::Notes,
            params.args.note_id,
            params.args.fields,
        )
        .await
    }

    #[tool(description = "Delete a note by 'note_id'.")]
    async fn delete_note(
        &self,
        params: Parameters<Authed<NoteRef>>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        self.delete(params.api_token.as_deref(), Resource::Notes, params.args.note_id)
            .await
    }

    // ===== Catalogues =====

    #[tool(description = "List pipelines.")]
    async fn list_pipelines(
        &self,
        params: Parameters<Authed<Fields>>,
    ) -> Result<CallToolResult, McpError> {
        self.list(Resource::Pipelines, params.0).await
    }

    #[tool(description = "List pipeline stages. Filter with 'pipeline_id'.")]
    async fn list_stages(
        &self,
        params: Parameters<Authed<Fields>>,
    ) -> Result<CallToolResult, McpError> {
        self.list(Resource::Stages, params.0).await
    }

    #[tool(description = "List products (items).")]
    async fn list_items(
        &self,
        params: Parameters<Authed<Fields>>,
    ) -> Result<CallToolResult, McpError> {
        self.list(Resource::Items, params.0).await
    }

    #[tool(description = "List users (sales reps).")]
    async fn list_users(
        &self,
        params: Parameters<Authed<Fields>>,
    ) -> Result<CallToolResult, McpError> {
        self.list(Resource::Users, params.0).await
    }

    #[tool(description = "List tags.")]
    async fn list_tags(
        &self,
        params: Parameters<Authed<Fields>>,
    ) -> Result<CallToolResult, McpError> {
        self.list(Resource::Tags, params.0).await
    }

    #[tool(description = "List loss reasons.")]
    async fn list_loss_reasons(
        &self,
        params: Parameters<Authed<Fields>>,
    ) -> Result<CallToolResult, McpError> {
        self.list(Resource::LossReasons, params.0).await
    }

    #[tool(description = "List deal sources.")]
    async fn list_deal_sources(
        &self,
        params: Parameters<Authed<Fields>>,
    ) -> Result<CallToolResult, McpError> {
        self.list(Resource::DealSources, params.0).await
    }

    #[tool(description = "List activity types.")]
    async fn list_activity_types(
        &self,
        params: Parameters<Authed<Fields>>,
    ) -> Result<CallToolResult, McpError> {
        self.list(Resource::ActivityTypes, params.0).await
    }

    #[tool(description = "List custom fields.")]
    async fn list_custom_fields(
        &self,
        params: Parameters<Authed<Fields>>,
    ) -> Result<CallToolResult, McpError> {
        self.list(Resource::CustomFields, params.0).await
    }

    // ===== Escape hatch =====

    #[tool(
        description = "Call any PipeRun endpoint. 'method' is GET, POST, PUT or DELETE; 'path' is relative to /v1 (absolute URLs are refused)."
    )]
    async fn piperun_request(
        &self,
        params: Parameters<Authed<RawRequestParams>>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        let token = self.token(params.api_token.as_deref())?;
        let raw = params.args;

        tracing::debug!("piperun_request: method={:?}, path={:?}", raw.method, raw.path);

        let response = self
            .records
            .raw_request(
                &token,
                raw.method.as_deref(),
                raw.path.as_deref(),
                raw.query.as_ref(),
                raw.body,
            )
            .await
            .map_err(to_mcp_error)?;
        json_response(&response)
    }

    // ===== RevOps workflows =====

    #[tool(
        description = "Find a person by email or phone; create one if none matches (creation needs 'name' and 'owner_id')."
    )]
    async fn upsert_person_by_email_or_phone(
        &self,
        params: Parameters<Authed<UpsertPersonRequest>>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        let token = self.token(params.api_token.as_deref())?;
        let request = params.args;
        let bounds = self.settings.bounds(&request.search);

        let outcome = self
            .upsert_service
            .upsert_person(
                &token,
                PersonUpsert {
                    name: request.name,
                    owner_id: request.owner_id,
                    email: request.email,
                    phone: request.phone,
                    company_id: request.company_id,
                    ..Default::default()
                },
                bounds,
            )
            .await
            .map_err(to_mcp_error)?;
        json_response(&outcome)
    }

    #[tool(
        description = "Find a company by website domain or name; create one if none matches (creation needs 'name' and 'owner_id')."
    )]
    async fn upsert_company_by_domain_or_name(
        &self,
        params: Parameters<Authed<UpsertCompanyRequest>>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        let token = self.token(params.api_token.as_deref())?;
        let request = params.args;
        let bounds = self.settings.bounds(&request.search);

        let outcome = self
            .upsert_service
            .upsert_company(
                &token,
                CompanyUpsert {
                    name: request.name,
                    owner_id: request.owner_id,
                    domain: request.domain,
                    email: request.email,
                    phone: request.phone,
                    ..Default::default()
                },
                bounds,
            )
            .await
            .map_err(to_mcp_error)?;
        json_response(&outcome)
    }

    #[tool(
        description = "Deterministically pick an owner_id for a routing key (email, phone, domain) from a list of candidate owners. The same key and list always give the same owner."
    )]
    async fn route_lead_to_owner(
        &self,
        params: Parameters<RouteLeadRequest>,
    ) -> Result<CallToolResult, McpError> {
        let route = route_lead(&params.0).map_err(to_mcp_error)?;
        json_response(&route)
    }

    #[tool(description = "Set the owner_id of a deal.")]
    async fn assign_deal_owner(
        &self,
        params: Parameters<Authed<AssignDealOwnerRequest>>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        let token = self.token(params.api_token.as_deref())?;

        let response = self
            .workflow_service
            .assign_deal_owner(&token, params.args)
            .await
            .map_err(to_mcp_error)?;
        json_response(&response)
    }

    #[tool(
        description = "Create a meeting activity linked to a deal. Requires 'deal_id' and 'title'; type defaults to the configured meeting type, status to 0."
    )]
    async fn create_meeting_activity_for_deal(
        &self,
        params: Parameters<Authed<MeetingForDealRequest>>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        let token = self.token(params.api_token.as_deref())?;

        let response = self
            .workflow_service
            .create_meeting_activity_for_deal(&token, params.args)
            .await
            .map_err(to_mcp_error)?;
        json_response(&response)
    }

    #[tool(
        description = "Create a deal with optional company and person upserts and an optional note. Requires 'title', 'pipeline_id' and 'stage_id'."
    )]
    async fn create_opportunity_bundle(
        &self,
        params: Parameters<Authed<OpportunityBundleRequest>>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        let token = self.token(params.api_token.as_deref())?;

        tracing::info!("MCP Handler: create_opportunity_bundle called");

        let result = self
            .workflow_service
            .create_opportunity_bundle(&token, params.args)
            .await
            .map_err(to_mcp_error)?;
        json_response(&result)
    }

    #[tool(
        description = "Log an outbound call: optional call record, a note (needs 'note_content' and one of deal_id/person_id/company_id) and an optional follow-up activity."
    )]
    async fn log_outbound_call_and_outcome(
        &self,
        params: Parameters<Authed<OutboundCallRequest>>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        let token = self.token(params.api_token.as_deref())?;

        let result = self
            .workflow_service
            .log_outbound_call_and_outcome(&token, params.args)
            .await
            .map_err(to_mcp_error)?;
        json_response(&result)
    }

    #[tool(
        description = "Mark an activity as completed (status=2) and optionally add a note linked to its deal, person or company."
    )]
    async fn complete_activity_with_notes(
        &self,
        params: Parameters<Authed<CompleteActivityRequest>>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        let token = self.token(params.api_token.as_deref())?;

        let result = self
            .workflow_service
            .complete_activity_with_notes(&token, params.args)
            .await
            .map_err(to_mcp_error)?;
        json_response(&result)
    }

    #[tool(
        description = "RevOps intake: route owners from 'candidates_owner_ids', upsert company and person, create the deal, then optionally log a call, a note (with call outcome), a meeting and a follow-up. Untitled meeting and follow-up activities are titled \"Meeting\" and \"Follow-up\" and owned by the deal owner."
    )]
    async fn revops_intake(
        &self,
        params: Parameters<Authed<IntakeRequest>>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        let token = self.token(params.api_token.as_deref())?;

        tracing::info!("MCP Handler: revops_intake called");

        let result = self
            .workflow_service
            .revops_intake(&token, params.args)
            .await
            .map_err(to_mcp_error)?;
        json_response(&result)
    }
}
