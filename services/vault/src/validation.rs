//! Input validation utilities

use crate::models::{LoginRequest, RegisterRequest};

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Maximum accepted email length
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Validate email. Any non-empty address is accepted up to the length cap.
pub fn validate_email(email: &str) -> Result<(), String> {
    if is_blank(email) {
        return Err("Email is required".to_string());
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(format!(
            "Email must be at most {} characters long",
            MAX_EMAIL_LENGTH
        ));
    }

    Ok(())
}

/// Validate a registration payload
pub fn validate_registration(req: &RegisterRequest) -> Result<(), String> {
    if is_blank(&req.username) || is_blank(&req.email) || req.password.is_empty() {
        return Err("All fields are required".to_string());
    }

    validate_email(&req.email)
}

/// Validate a login payload
pub fn validate_login(req: &LoginRequest) -> Result<(), String> {
    if is_blank(&req.username) || req.password.is_empty() {
        return Err("Username and password are required".to_string());
    }

    Ok(())
}
