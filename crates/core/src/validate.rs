//! Field validation helpers shared by the request drafts.

use crate::error::{DomainError, DomainResult};

/// Trimmed, non-empty text or a validation error naming the field.
pub fn require_text(field: &str, value: Option<&str>) -> DomainResult<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(DomainError::validation(format!("{field} is required"))),
    }
}

/// Trim an optional value; blank strings collapse to `None`.
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Minimal shape check: `local@domain.tld`, no whitespace.
pub fn is_plausible_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !value.chars().any(char::is_whitespace)
}

/// Required, trimmed e-mail address.
pub fn require_email(value: Option<&str>) -> DomainResult<String> {
    let email = require_text("email", value)?;
    if !is_plausible_email(&email) {
        return Err(DomainError::validation("email is not a valid address"));
    }
    Ok(email)
}
