//! Domain value objects and pure helpers.
//!
//! Holds the credential value object, the canonical forms used for matching
//! and the activity date normalizer, plus the resource catalogue and the
//! extractors for the untyped records returned by PipeRun.

pub mod calendar_date;
pub mod credential;
pub mod normalize;
pub mod record;
pub mod resource;

pub use calendar_date::to_calendar_date;
pub use credential::{resolve_token, ApiToken};
pub use normalize::{normalize_domain, normalize_email, normalize_name, normalize_phone};
pub use record::{
    created_id, first_text, record_id, unwrap_data, FieldFamily, EMAIL_FIELDS, PHONE_FIELDS,
};
pub use resource::Resource;
