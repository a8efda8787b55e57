//! PipeRun REST resources exposed by the server.

use std::fmt;

/// A collection endpoint under the `/v1` base path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Deals,
    Persons,
    Companies,
    Activities,
    Calls,
    Notes,
    Pipelines,
    Stages,
    Items,
    Users,
    Tags,
    LossReasons,
    DealSources,
    ActivityTypes,
    CustomFields,
}

impl Resource {
    /// Path segment as PipeRun spells it (mixed conventions are upstream's).
    pub fn as_path(&self) -> &'static str {
        match self {
            Resource::Deals => "deals",
            Resource::Persons => "persons",
            Resource::Companies => "companies",
            Resource::Activities => "activities",
            Resource::Calls => "calls",
            Resource::Notes => "notes",
            Resource::Pipelines => "pipelines",
            Resource::Stages => "stages",
            Resource::Items => "items",
            Resource::Users => "users",
            Resource::Tags => "tags",
            Resource::LossReasons => "loss-reasons",
            Resource::DealSources => "deal-sources",
            Resource::ActivityTypes => "activityTypes",
            Resource::CustomFields => "customFields",
        }
    }

    /// Name of the argument that carries a record id of this resource.
    pub fn id_field(&self) -> &'static str {
        match self {
            Resource::Deals => "deal_id",
            Resource::Persons => "person_id",
            Resource::Companies => "company_id",
            Resource::Activities => "activity_id",
            Resource::Calls => "call_id",
            Resource::Notes => "note_id",
            Resource::Pipelines => "pipeline_id",
            Resource::Stages => "stage_id",
            Resource::Items => "item_id",
            Resource::Users => "user_id",
            Resource::Tags => "tag_id",
            Resource::LossReasons => "loss_reason_id",
            Resource::DealSources => "deal_source_id",
            Resource::ActivityTypes => "activity_type_id",
            Resource::CustomFields => "custom_field_id",
        }
    }

    /// `/<resource>`
    pub fn collection_path(&self) -> String {
        format!("/{}", self.as_path())
    }

    /// `/<resource>/<id>`
    pub fn record_path(&self, id: i64) -> String {
        format!("/{}/{}", self.as_path(), id)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(Resource::Deals.collection_path(), "/deals");
        assert_eq!(Resource::Activities.record_path(12), "/activities/12");
        assert_eq!(Resource::LossReasons.collection_path(), "/loss-reasons");
        assert_eq!(Resource::ActivityTypes.collection_path(), "/activityTypes");
        assert_eq!(Resource::CustomFields.to_string(), "customFields");
    }

    #[test]
    fn test_id_fields() {
        assert_eq!(Resource::Deals.id_field(), "deal_id");
        assert_eq!(Resource::Companies.id_field(), "company_id");
        assert_eq!(Resource::Notes.id_field(), "note_id");
    }
}
