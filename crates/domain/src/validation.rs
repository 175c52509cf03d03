// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::types::User;

/// Validates a user's name and email before registration.
///
/// This function checks field shape only. It does NOT check for email
/// uniqueness (that requires a store lookup, see [`validate_email_unique`]).
///
/// # Errors
///
/// Returns an error if:
/// - The name is empty or whitespace
/// - The email is empty, contains whitespace, or lacks a local part or domain
pub fn validate_user_fields(name: &str, email: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::InvalidName(String::from(
            "Name cannot be empty",
        )));
    }

    validate_email(email)
}

/// Validates the shape of an email address.
///
/// # Errors
///
/// Returns `DomainError::InvalidEmail` if the address is empty, contains
/// whitespace, or is not of the form `local@domain`.
pub fn validate_email(email: &str) -> Result<(), DomainError> {
    if email.is_empty() {
        return Err(DomainError::InvalidEmail(String::from(
            "Email cannot be empty",
        )));
    }

    if email.chars().any(char::is_whitespace) {
        return Err(DomainError::InvalidEmail(format!(
            "'{email}' must not contain whitespace"
        )));
    }

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(())
        }
        _ => Err(DomainError::InvalidEmail(format!(
            "'{email}' is not of the form local@domain"
        ))),
    }
}

/// Validates that no existing user holds the email.
///
/// Lookup is case-sensitive, matching the store's email lookup.
///
/// # Arguments
///
/// * `existing` - The result of looking the email up in the users table
/// * `email` - The email being registered
///
/// # Errors
///
/// Returns `DomainError::DuplicateEmail` if `existing` is `Some`.
pub fn validate_email_unique(existing: Option<&User>, email: &str) -> Result<(), DomainError> {
    if existing.is_some() {
        return Err(DomainError::DuplicateEmail {
            email: email.to_string(),
        });
    }
    Ok(())
}

/// Validates an organization's name and code.
///
/// Codes are short identifiers: non-empty, no whitespace.
///
/// # Errors
///
/// Returns an error if the name is empty or the code is empty or contains whitespace.
pub fn validate_organization_fields(name: &str, code: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::InvalidName(String::from(
            "Organization name cannot be empty",
        )));
    }

    if code.is_empty() || code.chars().any(char::is_whitespace) {
        return Err(DomainError::InvalidOrganizationCode(format!(
            "'{code}' must be non-empty and contain no whitespace"
        )));
    }

    Ok(())
}

/// Validates the required descriptive fields of a scorecard.
///
/// # Errors
///
/// Returns `DomainError::InvalidScorecard` naming the first empty field.
pub fn validate_scorecard_fields(name: &str, product: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::InvalidScorecard {
            field: "name",
            reason: String::from("cannot be empty"),
        });
    }

    if product.trim().is_empty() {
        return Err(DomainError::InvalidScorecard {
            field: "product",
            reason: String::from("cannot be empty"),
        });
    }

    Ok(())
}

/// Validates that a score lies on the 0-100 scale.
///
/// # Errors
///
/// Returns `DomainError::InvalidScore` for NaN, infinite or out-of-range values.
pub fn validate_score(score: f64) -> Result<(), DomainError> {
    if !score.is_finite() || !(0.0..=100.0).contains(&score) {
        return Err(DomainError::InvalidScore(format!(
            "{score} is outside the 0-100 scale"
        )));
    }
    Ok(())
}
