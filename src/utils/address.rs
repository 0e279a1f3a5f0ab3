//! Address validation helpers
//!
//! Validation runs before any network call. Only the length rule of the
//! deployed front end is enforced; the backend owns deeper checks.

use crate::models::errors::AnalysisError;

/// Validate a user-entered address exactly as given.
///
/// Whitespace counts toward the length; callers that want trimming do it
/// before validating.
pub fn validate_address(address: &str, expected_len: usize) -> Result<&str, AnalysisError> {
    if address.chars().count() != expected_len {
        return Err(AnalysisError::invalid_address(address, expected_len));
    }
    Ok(address)
}

/// Shorten an address for logs and labels (`AGPZnBZU...FvmTU`)
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 13 {
        return address.to_string();
    }
    let head: String = chars[..8].iter().collect();
    let tail: String = chars[chars.len() - 5..].iter().collect();
    format!("{}...{}", head, tail)
}
