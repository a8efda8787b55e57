//! PipeRun MCP Server - a Model Context Protocol server for the PipeRun CRM.
//!
//! The server exposes PipeRun's REST resources as CRUD tools and layers a
//! handful of RevOps workflows on top: find-or-create for people and
//! companies, opportunity bundles, lead intake with deterministic owner
//! routing, and activity bookkeeping.
//!
//! # Architecture
//!
//! - **config**: Configuration from environment variables
//! - **error**: Error types and their MCP error classes
//! - **domain**: Credentials, resources, normalizers and record helpers
//! - **client**: Blocking HTTP client, async wrapper and pagination
//! - **matching**: Person and company matchers for upserts
//! - **routing**: Deterministic owner selection
//! - **metrics**: Upstream request counters
//! - **tools**: Argument coercion and single-resource operations
//! - **services**: Upserts and multi-step workflows
//! - **server**: MCP protocol server and tool registry

pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod matching;
pub mod metrics;
pub mod routing;
pub mod server;
pub mod services;
pub mod tools;

pub use client::{AsyncPipeRunClient, AsyncPipeRunClientImpl, PipeRunClient};
pub use config::Config;
pub use domain::{ApiToken, Resource};
pub use error::{ConfigError, ErrorClass, PipeRunApiError, PipeRunResult};
pub use matching::{CompanyMatcher, PersonMatcher};
pub use metrics::{HttpTimer, Metrics, MetricsSummary};
pub use server::PipeRunMcpServer;
pub use tools::RecordTools;
