//! Matching utilities for find-or-create workflows.
//!
//! This module decides whether a fetched person or company record is the
//! one a workflow is looking for.

pub mod entity_matcher;

pub use entity_matcher::{CompanyMatcher, PersonMatcher};
