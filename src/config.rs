//! Configuration management for the PipeRun MCP Server.
//!
//! This module handles loading and validating configuration from environment variables.
//! It avoids polluting stdout (which MCP uses for communication) by loading the
//! .env file through `dotenvy`, which never prints.

use crate::domain::ApiToken;
use crate::error::{ConfigError, ConfigResult};
use std::env;

/// Default upstream base URL (already includes the `/v1` segment).
pub const DEFAULT_API_BASE_URL: &str = "https://api.pipe.run/v1";

/// Activity type used for meetings when the caller does not pick one.
pub const DEFAULT_MEETING_ACTIVITY_TYPE_ID: i64 = 243787;

/// Activity type used for call follow-ups when the caller does not pick one.
pub const DEFAULT_CALL_ACTIVITY_TYPE_ID: i64 = 243785;

/// Configuration for the PipeRun MCP Server.
#[derive(Debug, Clone)]
pub struct Config {
    /// PipeRun API base URL
    pub api_base_url: String,

    /// Process-wide fallback credential, used when a tool call carries none
    pub default_token: Option<ApiToken>,

    /// HTTP request timeout in seconds (default: 30)
    pub request_timeout: u64,

    /// Activity type id for "Meeting" activities
    pub meeting_activity_type_id: i64,

    /// Activity type id for "Call" follow-ups
    pub call_activity_type_id: i64,

    /// Default page-count ceiling for upsert scans (default: 5)
    pub search_max_pages: usize,

    /// Default page size for upsert scans (default: 200)
    pub search_page_size: usize,

    /// Log level (default: "error")
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Every variable is optional:
    /// - `PIPERUN_API_BASE_URL`: Base URL for the PipeRun API
    /// - `PIPERUN_API_TOKEN`: Fallback API token
    /// - `REQUEST_TIMEOUT`: HTTP timeout in seconds (default: 30)
    /// - `PIPERUN_MEETING_ACTIVITY_TYPE_ID` / `PIPERUN_CALL_ACTIVITY_TYPE_ID`
    /// - `SEARCH_MAX_PAGES` (default: 5) / `SEARCH_PAGE_SIZE` (default: 200)
    /// - `LOG_LEVEL`: Logging level (default: "error")
    pub fn from_env() -> ConfigResult<Self> {
        // Try to load .env file if it exists (but don't fail if it doesn't)
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(ConfigError::DotenvError(e.to_string()));
            }
        }

        let api_base_url =
            env::var("PIPERUN_API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());

        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                var: "PIPERUN_API_BASE_URL".to_string(),
                reason: "Must start with http:// or https://".to_string(),
            });
        }

        // A blank token is treated the same as a missing one
        let default_token = env::var("PIPERUN_API_TOKEN")
            .ok()
            .and_then(|t| ApiToken::new(t).ok());

        let request_timeout = Self::parse_env_u64("REQUEST_TIMEOUT", 30)?;
        let meeting_activity_type_id = Self::parse_env_i64(
            "PIPERUN_MEETING_ACTIVITY_TYPE_ID",
            DEFAULT_MEETING_ACTIVITY_TYPE_ID,
        )?;
        let call_activity_type_id =
            Self::parse_env_i64("PIPERUN_CALL_ACTIVITY_TYPE_ID", DEFAULT_CALL_ACTIVITY_TYPE_ID)?;
        let search_max_pages = Self::parse_env_usize("SEARCH_MAX_PAGES", 5)?;
        let search_page_size = Self::parse_env_usize("SEARCH_PAGE_SIZE", 200)?;

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "error".to_string());

        Ok(Config {
            api_base_url,
            default_token,
            request_timeout,
            meeting_activity_type_id,
            call_activity_type_id,
            search_max_pages,
            search_page_size,
            log_level,
        })
    }

    /// Parse an environment variable as u64 with a default value.
    fn parse_env_u64(var_name: &str, default: u64) -> ConfigResult<u64> {
        match env::var(var_name) {
            Ok(val) => val.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                var: var_name.to_string(),
                reason: format!("Must be a positive number, got: {}", val),
            }),
            Err(_) => Ok(default),
        }
    }

    /// Parse an environment variable as usize with a default value.
    fn parse_env_usize(var_name: &str, default: usize) -> ConfigResult<usize> {
        match env::var(var_name) {
            Ok(val) => val.parse::<usize>().map_err(|_| ConfigError::InvalidValue {
                var: var_name.to_string(),
                reason: format!("Must be a positive number, got: {}", val),
            }),
            Err(_) => Ok(default),
        }
    }

    /// Parse an environment variable as a positive i64 id with a default value.
    fn parse_env_i64(var_name: &str, default: i64) -> ConfigResult<i64> {
        match env::var(var_name) {
            Ok(val) => match val.parse::<i64>() {
                Ok(id) if id > 0 => Ok(id),
                _ => Err(ConfigError::InvalidValue {
                    var: var_name.to_string(),
                    reason: format!("Must be a positive integer id, got: {}", val),
                }),
            },
            Err(_) => Ok(default),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            default_token: None,
            request_timeout: 30,
            meeting_activity_type_id: DEFAULT_MEETING_ACTIVITY_TYPE_ID,
            call_activity_type_id: DEFAULT_CALL_ACTIVITY_TYPE_ID,
            search_max_pages: 5,
            search_page_size: 200,
            log_level: "error".to_string(),
        }
    }
}
