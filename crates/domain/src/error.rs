// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A user already exists with this email.
    DuplicateEmail {
        /// The email that is already registered.
        email: String,
    },
    /// Email is empty or malformed.
    InvalidEmail(String),
    /// A display name is empty or invalid.
    InvalidName(String),
    /// Organization code is empty or invalid.
    InvalidOrganizationCode(String),
    /// Role name is not one of the known roles.
    InvalidRole(String),
    /// Grade letter is not one of A, B, C or D.
    InvalidGrade(String),
    /// A scorecard field is empty or invalid.
    InvalidScorecard {
        /// The offending field.
        field: &'static str,
        /// A human-readable reason.
        reason: String,
    },
    /// Score lies outside the 0-100 scale.
    InvalidScore(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateEmail { email } => {
                write!(f, "User already exists with email '{email}'")
            }
            Self::InvalidEmail(msg) => write!(f, "Invalid email: {msg}"),
            Self::InvalidName(msg) => write!(f, "Invalid name: {msg}"),
            Self::InvalidOrganizationCode(msg) => write!(f, "Invalid organization code: {msg}"),
            Self::InvalidRole(role) => {
                write!(
                    f,
                    "Invalid role: {role}. Must be one of Admin, Power User, Approver, User"
                )
            }
            Self::InvalidGrade(grade) => {
                write!(f, "Invalid grade: {grade}. Must be one of A, B, C, D")
            }
            Self::InvalidScorecard { field, reason } => {
                write!(f, "Invalid scorecard {field}: {reason}")
            }
            Self::InvalidScore(msg) => write!(f, "Invalid score: {msg}"),
        }
    }
}

impl std::error::Error for DomainError {}
