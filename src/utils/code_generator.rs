//! Short code generation and validation utilities.
//!
//! Generated codes use the alphabet `[A-Za-z0-9]`. The collision retry in
//! [`generate_unique_code`] is advisory: uniqueness is finally enforced by the
//! `links_code_key` constraint in storage.

use std::future::Future;

use crate::error::AppError;
use rand::Rng;
use rand::distr::Alphanumeric;
use serde_json::json;

/// Length of generated short codes.
pub const CODE_LENGTH: usize = 7;

/// Attempts at [`CODE_LENGTH`] before falling back to a longer code.
const MAX_ATTEMPTS: usize = 2;

/// Reserved codes that cannot be used as short links.
///
/// These codes are reserved for system endpoints to prevent routing conflicts.
const RESERVED_CODES: &[&str] = &["api", "health", "admin", "static"];

/// Generates a random alphanumeric code of the given length.
///
/// # Examples
///
/// ```ignore
/// let code = generate_code(7);
/// assert_eq!(code.len(), 7);
/// assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn generate_code(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Generates a short code, checking each candidate with `exists`.
///
/// Tries [`CODE_LENGTH`] twice; if both candidates are taken, returns a code
/// one character longer without checking it.
///
/// # Errors
///
/// Propagates errors returned by `exists`.
pub async fn generate_unique_code<F, Fut>(mut exists: F) -> Result<String, AppError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<bool, AppError>>,
{
    for _ in 0..MAX_ATTEMPTS {
        let code = generate_code(CODE_LENGTH);

        if !exists(code.clone()).await? {
            return Ok(code);
        }
    }

    Ok(generate_code(CODE_LENGTH + 1))
}

/// Validates a user-provided custom short code.
///
/// # Rules
///
/// - Length: 4-32 characters
/// - Allowed characters: ASCII letters, digits, hyphens
/// - Cannot start or end with a hyphen
/// - Cannot be a reserved system code
///
/// # Errors
///
/// Returns [`AppError::Validation`] if any validation rule is violated.
///
/// # Examples
///
/// ```ignore
/// assert!(validate_custom_code("my-Link-2024").is_ok());
/// assert!(validate_custom_code("abc").is_err());       // Too short
/// assert!(validate_custom_code("-invalid").is_err());  // Starts with hyphen
/// assert!(validate_custom_code("health").is_err());    // Reserved
/// ```
pub fn validate_custom_code(code: &str) -> Result<(), AppError> {
    if code.len() < 4 || code.len() > 32 {
        return Err(AppError::bad_request(
            "Custom code must be 4-32 characters",
            json!({ "provided_length": code.len() }),
        ));
    }

    if !code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(AppError::bad_request(
            "Custom code can only contain letters, digits, and hyphens",
            json!({ "code": code }),
        ));
    }

    if code.starts_with('-') || code.ends_with('-') {
        return Err(AppError::bad_request(
            "Custom code cannot start or end with a hyphen",
            json!({ "code": code }),
        ));
    }

    if RESERVED_CODES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(code))
    {
        return Err(AppError::bad_request(
            "This code is reserved",
            json!({ "code": code }),
        ));
    }

    Ok(())
}
