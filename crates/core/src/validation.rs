//! Input checks run before any hashing or store access.
//!
//! Usernames and emails are compared after trimming surrounding whitespace;
//! callers should pass the trimmed values on to the store as well. Passwords
//! are never trimmed.

use validator::ValidateEmail;

use crate::error::CoreError;

/// Column width of `users.username`.
pub const MAX_USERNAME_LEN: usize = 50;

/// Column width of `users.email`.
pub const MAX_EMAIL_LEN: usize = 100;

/// Check the fields of a registration request.
///
/// All three fields must be non-empty, the username and email must fit their
/// columns and be free of control characters, and the email must be
/// syntactically valid.
pub fn validate_registration(username: &str, email: &str, password: &str) -> Result<(), CoreError> {
    require("username", username)?;
    require("email", email)?;
    require("password", password)?;
    printable("username", username)?;
    printable("email", email)?;

    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(CoreError::Validation(format!(
            "username must be at most {MAX_USERNAME_LEN} characters"
        )));
    }
    if email.chars().count() > MAX_EMAIL_LEN {
        return Err(CoreError::Validation(format!(
            "email must be at most {MAX_EMAIL_LEN} characters"
        )));
    }
    if !email.validate_email() {
        return Err(CoreError::Validation("email is not a valid address".into()));
    }
    Ok(())
}

/// Check the fields of a login request. Only presence is checked here; any
/// other mismatch is an authentication failure, not a validation one.
pub fn validate_login(username: &str, password: &str) -> Result<(), CoreError> {
    require("username", username)?;
    require("password", password)?;
    printable("username", username)
}

/// Non-empty and NUL-free. Postgres text columns cannot hold `\0`.
fn require(field: &str, value: &str) -> Result<(), CoreError> {
    if value.is_empty() {
        return Err(CoreError::Validation(format!("{field} is required")));
    }
    if value.contains('\0') {
        return Err(CoreError::Validation(format!(
            "{field} must not contain NUL bytes"
        )));
    }
    Ok(())
}

fn printable(field: &str, value: &str) -> Result<(), CoreError> {
    if value.chars().any(char::is_control) {
        return Err(CoreError::Validation(format!(
            "{field} must not contain control characters"
        )));
    }
    Ok(())
}
