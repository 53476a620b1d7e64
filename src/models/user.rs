// src/models/user.rs

use std::fmt;

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::personality::{AnswerSet, Stream};

/// Account role. Students take the quiz, parents read a linked student's share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Parent,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Parent => "parent",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Private profile record: `users/{uid}/profile/info`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub uid: String,
    pub email: String,
    pub name: String,
    pub role: Role,

    /// Stream chosen by the last classification (students only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<Stream>,

    /// Set only after the result and share records are written.
    #[serde(default)]
    pub test_taken: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_student_uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_student_email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<String>,
}

/// Public lookup entry: `public/data/user_map/{normalizedEmail}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMapEntry {
    pub email: String,
    pub uid: String,
    pub name: String,
    pub role: Role,
}

/// Login credentials, keyed by normalized email.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub uid: String,
    pub email: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    pub role: Role,
}

/// Lower-cased, trimmed email used as a lookup key.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Display name used when none is given: the local part of the email.
pub fn default_name(email: &str) -> String {
    email.split('@').next().unwrap_or_default().trim().to_string()
}

/// DTO for creating a new account (Registration).
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "A valid email address is required."))]
    pub email: String,
    #[validate(length(
        min = 4,
        max = 128,
        message = "Password length must be between 4 and 128 characters."
    ))]
    pub password: String,
    #[validate(length(max = 80, message = "Name must be at most 80 characters."))]
    pub name: Option<String>,
    pub role: Role,
    /// Parent accounts may name the student to link at signup.
    #[validate(email)]
    pub student_email: Option<String>,
    /// Quiz answers collected before the account existed.
    pub pending_answers: Option<AnswerSet>,
}

/// DTO for login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 254))]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
    #[validate(length(max = 80))]
    pub name: Option<String>,
    #[validate(email)]
    pub student_email: Option<String>,
    pub pending_answers: Option<AnswerSet>,
}

/// DTO for linking a parent to a student by email.
#[derive(Debug, Deserialize, Validate)]
pub struct LinkStudentRequest {
    #[validate(length(min = 1, max = 254))]
    pub email: String,
}
