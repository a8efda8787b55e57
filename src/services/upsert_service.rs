//! Find-or-create for people and companies.
//!
//! PipeRun has no reliable server-side filter for emails, phones or
//! websites, so a bounded window of records is fetched and matched locally.
//! Creation happens only when nothing matches and enough data was supplied.

use crate::client::{fetch_all, AsyncPipeRunClient, PageBounds};
use crate::domain::{record_id, ApiToken, Resource};
use crate::error::{PipeRunApiError, PipeRunResult};
use crate::matching::{CompanyMatcher, PersonMatcher};
use crate::services::outcome::StepOutcome;
use crate::tools::args::non_blank;
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// How the calling tool spells the name and owner arguments, quoted, for
/// error messages on the create path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgumentNames {
    pub name: &'static str,
    pub owner: &'static str,
}

impl Default for ArgumentNames {
    fn default() -> Self {
        Self {
            name: "'name'",
            owner: "'owner_id'",
        }
    }
}

/// Input for a person find-or-create.
#[derive(Debug, Clone, Default)]
pub struct PersonUpsert {
    pub name: Option<String>,
    pub owner_id: Option<i64>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company_id: Option<i64>,
    pub arguments: ArgumentNames,
}

/// Input for a company find-or-create.
#[derive(Debug, Clone, Default)]
pub struct CompanyUpsert {
    pub name: Option<String>,
    pub owner_id: Option<i64>,
    pub domain: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub arguments: ArgumentNames,
}

/// Upsert service trait.
#[async_trait]
pub trait UpsertService: Send + Sync {
    /// Match a person by email or phone, or create one.
    ///
    /// Returns a `matched` or `created` outcome.
    async fn upsert_person(
        &self,
        token: &ApiToken,
        request: PersonUpsert,
        bounds: PageBounds,
    ) -> PipeRunResult<StepOutcome>;

    /// Match a company by website domain or name, or create one.
    async fn upsert_company(
        &self,
        token: &ApiToken,
        request: CompanyUpsert,
        bounds: PageBounds,
    ) -> PipeRunResult<StepOutcome>;
}

/// Default implementation of UpsertService.
pub struct UpsertServiceImpl {
    client: Arc<dyn AsyncPipeRunClient>,
}

impl UpsertServiceImpl {
    pub fn new(client: Arc<dyn AsyncPipeRunClient>) -> Self {
        Self { client }
    }

    /// Name and owner are only mandatory once the search came up empty.
    fn creation_fields(
        entity: &str,
        name: Option<String>,
        owner_id: Option<i64>,
        arguments: ArgumentNames,
    ) -> PipeRunResult<(String, i64)> {
        let name = name.ok_or_else(|| {
            PipeRunApiError::invalid(format!(
                "{} not found. To create it, provide {}",
                entity, arguments.name
            ))
        })?;
        let owner_id = owner_id.ok_or_else(|| {
            PipeRunApiError::invalid(format!(
                "{} not found. To create it, provide {}",
                entity, arguments.owner
            ))
        })?;
        Ok((name, owner_id))
    }
}

#[async_trait]
impl UpsertService for UpsertServiceImpl {
    async fn upsert_person(
        &self,
        token: &ApiToken,
        request: PersonUpsert,
        bounds: PageBounds,
    ) -> PipeRunResult<StepOutcome> {
        let name = non_blank(request.name.as_deref());
        let email = non_blank(request.email.as_deref());
        let phone = non_blank(request.phone.as_deref());

        if name.is_none() && email.is_none() && phone.is_none() {
            return Err(PipeRunApiError::invalid(
                "Provide at least 'email', 'phone' or 'name' to search for a person",
            ));
        }

        let people = fetch_all(
            self.client.as_ref(),
            token,
            Resource::Persons,
            &Map::new(),
            bounds,
        )
        .await?;

        let matcher = PersonMatcher::new(email.as_deref(), phone.as_deref());
        if let Some(found) = matcher.find(&people).filter(|p| record_id(p).is_some()) {
            tracing::info!("Person matched: id={:?}", record_id(found));
            return Ok(StepOutcome::matched(found.clone()));
        }

        let (name, owner_id) =
            Self::creation_fields("Person", name, request.owner_id, request.arguments)?;

        let mut payload = json!({ "name": name, "owner_id": owner_id });
        if let Some(email) = email {
            payload["email"] = Value::String(email);
        }
        if let Some(phone) = phone {
            payload["phone"] = Value::String(phone);
        }
        if let Some(company_id) = request.company_id {
            payload["company_id"] = json!(company_id);
        }

        let response = self
            .client
            .create(token, Resource::Persons, &payload)
            .await?;
        let outcome = StepOutcome::created(response);
        tracing::info!("Person created: id={:?}", outcome.id);
        Ok(outcome)
    }

    async fn upsert_company(
        &self,
        token: &ApiToken,
        request: CompanyUpsert,
        bounds: PageBounds,
    ) -> PipeRunResult<StepOutcome> {
        let name = non_blank(request.name.as_deref());
        let domain = non_blank(request.domain.as_deref());

        if name.is_none() && domain.is_none() {
            return Err(PipeRunApiError::invalid(
                "Provide 'name' and/or 'domain' to search for a company",
            ));
        }

        let companies = fetch_all(
            self.client.as_ref(),
            token,
            Resource::Companies,
            &Map::new(),
            bounds,
        )
        .await?;

        let matcher = CompanyMatcher::new(domain.as_deref(), name.as_deref());
        if let Some(found) = matcher.find(&companies).filter(|c| record_id(c).is_some()) {
            tracing::info!("Company matched: id={:?}", record_id(found));
            return Ok(StepOutcome::matched(found.clone()));
        }

        let (name, owner_id) =
            Self::creation_fields("Company", name, request.owner_id, request.arguments)?;

        let mut payload = json!({ "name": name, "owner_id": owner_id });
        if let Some(email) = non_blank(request.email.as_deref()) {
            payload["email"] = Value::String(email);
        }
        if let Some(phone) = non_blank(request.phone.as_deref()) {
            payload["phone"] = Value::String(phone);
        }
        if let Some(domain) = domain {
            payload["website"] = Value::String(domain);
        }

        let response = self
            .client
            .create(token, Resource::Companies, &payload)
            .await?;
        let outcome = StepOutcome::created(response);
        tracing::info!("Company created: id={:?}", outcome.id);
        Ok(outcome)
    }
}
