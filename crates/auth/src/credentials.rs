//! Username/password pairs as entered at registration and login.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CredentialsError {
    #[error("username and password cannot be empty")]
    Empty,
}

/// Opaque password.
///
/// Stored as entered (after trimming). `Debug` never prints the secret.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn matches(&self, candidate: &str) -> bool {
        self.0 == candidate
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl core::fmt::Debug for Password {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Validated credentials.
///
/// # Invariants
/// - Neither field is empty.
/// - Neither field has leading or trailing whitespace.
///
/// Serialization only carries the username; the password never leaves the
/// process in serialized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    username: String,
    #[serde(skip)]
    password: Password,
}

impl Credentials {
    /// Trim both fields and reject blanks.
    pub fn new(username: &str, password: &str) -> Result<Self, CredentialsError> {
        let username = username.trim();
        let password = password.trim();

        if username.is_empty() || password.is_empty() {
            return Err(CredentialsError::Empty);
        }

        Ok(Self {
            username: username.to_string(),
            password: Password::new(password),
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &Password {
        &self.password
    }

    /// Exact, case-sensitive comparison of both fields.
    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password.matches(password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_both_fields() {
        let creds = Credentials::new("  alice ", "\tsecret\n").unwrap();
        assert_eq!(creds.username(), "alice");
        assert!(creds.password().matches("secret"));
    }

    #[test]
    fn rejects_blank_fields() {
        assert_eq!(Credentials::new("", "pw"), Err(CredentialsError::Empty));
        assert_eq!(Credentials::new("bob", "   "), Err(CredentialsError::Empty));
    }

    #[test]
    fn matching_is_exact_and_case_sensitive() {
        let creds = Credentials::new("Alice", "pw").unwrap();
        assert!(creds.matches("Alice", "pw"));
        assert!(!creds.matches("alice", "pw"));
        assert!(!creds.matches("Alice", "PW"));
    }

    #[test]
    fn password_is_never_printed_or_serialized() {
        let creds = Credentials::new("carol", "hunter2").unwrap();
        assert!(!format!("{creds:?}").contains("hunter2"));

        let json = serde_json::to_string(&creds).unwrap();
        assert!(!json.contains("hunter2"));
        assert!(json.contains("carol"));
    }
}
