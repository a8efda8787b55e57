//! ApiToken value object and the two-tier credential resolution.

use crate::error::{PipeRunApiError, PipeRunResult};
use std::fmt;

/// An opaque PipeRun API token.
///
/// The token is trimmed and guaranteed non-empty. Its `Debug` output is
/// redacted so it can sit inside logged structs without leaking.
///
/// # Example
///
/// ```
/// use piperun_mcp_server::domain::ApiToken;
///
/// let token = ApiToken::new(" abc123 ").unwrap();
/// assert_eq!(token.as_str(), "abc123");
/// assert_eq!(format!("{:?}", token), "ApiToken(***)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    /// Create a new ApiToken from a possibly padded string.
    ///
    /// # Errors
    ///
    /// Returns `PipeRunApiError::InvalidParams` if the token is blank.
    pub fn new(token: impl Into<String>) -> PipeRunResult<Self> {
        let token = token.into();
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(PipeRunApiError::invalid("API token cannot be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Get the raw token for the `token` request header.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiToken(***)")
    }
}

/// Pick the credential for one tool call.
///
/// A non-blank explicit token wins; otherwise the process-wide fallback is
/// used. When neither exists the call fails before reaching the network.
pub fn resolve_token(
    explicit: Option<&str>,
    fallback: Option<&ApiToken>,
) -> PipeRunResult<ApiToken> {
    if let Some(token) = explicit.and_then(|t| ApiToken::new(t).ok()) {
        return Ok(token);
    }

    fallback.cloned().ok_or_else(|| {
        PipeRunApiError::invalid(
            "Missing token: pass 'api_token' in the tool arguments or set PIPERUN_API_TOKEN",
        )
    })
}
