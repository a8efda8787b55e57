//! Canonical forms used when comparing emails, phones, domains and names.
//!
//! All functions are total: empty or blank input yields an empty string,
//! and an empty key never matches anything.

/// Trim and lowercase an email address.
pub fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Keep only digits and `+`, then turn a leading `00` into `+`.
///
/// ```
/// use piperun_mcp_server::domain::normalize_phone;
///
/// assert_eq!(normalize_phone("0041 79 123-45-67"), "+41791234567");
/// ```
pub fn normalize_phone(value: &str) -> String {
    let digits: String = value
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();

    match digits.strip_prefix("00") {
        Some(rest) => format!("+{}", rest),
        None => digits,
    }
}

/// Lowercase a website and strip the scheme, a leading `www.` and one trailing `/`.
pub fn normalize_domain(value: &str) -> String {
    let lowered = value.trim().to_lowercase();
    let without_scheme = lowered
        .strip_prefix("https://")
        .or_else(|| lowered.strip_prefix("http://"))
        .unwrap_or(&lowered);
    let without_www = without_scheme
        .strip_prefix("www.")
        .unwrap_or(without_scheme);

    without_www
        .strip_suffix('/')
        .unwrap_or(without_www)
        .to_string()
}

/// Trim and lowercase a display name.
pub fn normalize_name(value: &str) -> String {
    value.trim().to_lowercase()
}
