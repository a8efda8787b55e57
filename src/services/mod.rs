//! Application service layer.
//!
//! Services hold the composite behavior of the server: find-or-create for
//! people and companies, and the multi-step workflows built on top of it.
//! They sit between the MCP handlers and the PipeRun client.

mod outcome;
mod requests;
mod upsert_service;
mod workflow_service;

pub use outcome::{StepAction, StepOutcome};
pub use requests::{
    ActivityArgs, AssignDealOwnerRequest, CompleteActivityRequest, IntakeRequest,
    MeetingForDealRequest, OpportunityBundleRequest, OutboundCallRequest, RouteLeadRequest,
    SearchArgs, UpsertCompanyRequest, UpsertPersonRequest,
};
pub use upsert_service::{
    ArgumentNames, CompanyUpsert, PersonUpsert, UpsertService, UpsertServiceImpl,
};
pub use workflow_service::{
    route_lead, BundleResult, CompleteActivityResult, IntakeResult, LeadRoute, OutboundCallResult,
    ResolvedOwners, WorkflowService, WorkflowServiceImpl, WorkflowSettings,
};
