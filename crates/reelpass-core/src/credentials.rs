//! Login form type.

use std::fmt;

use crate::error::FieldErrors;

/// Username and password as submitted by a login view.
///
/// # Security
///
/// The password is never exposed in Debug output to prevent accidental logging.
///
/// # Example
///
/// ```
/// use reelpass_core::LoginForm;
///
/// let form = LoginForm::new("  alice ", "hunter2");
/// let valid = form.validate().unwrap();
/// assert_eq!(valid.username(), "alice");
///
/// let errors = LoginForm::new("", " ").validate().unwrap_err();
/// assert_eq!(errors.get("username"), ["Username is required"]);
/// ```
#[derive(Clone)]
pub struct LoginForm {
    username: String,
    password: String,
}

impl LoginForm {
    /// Create a new form from raw input.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Trim both fields and check that neither is empty.
    ///
    /// Validation is local: a failing form never reaches the network.
    pub fn validate(&self) -> Result<Credentials, FieldErrors> {
        let username = self.username.trim();
        let password = self.password.trim();

        let mut errors = FieldErrors::new();
        if username.is_empty() {
            errors.add("username", "Username is required");
        }
        if password.is_empty() {
            errors.add("password", "Password is required");
        }

        if errors.is_empty() {
            Ok(Credentials {
                username: username.to_string(),
                password: password.to_string(),
            })
        } else {
            Err(errors)
        }
    }
}

impl fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Validated login credentials, ready to send to the login endpoint.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Returns the trimmed username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the password.
    ///
    /// # Security
    ///
    /// Use this only when constructing authentication requests.
    /// Never log or display this value.
    pub fn password(&self) -> &str {
        &self.password
    }
}

// Intentionally hide password in Debug output
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_hides_password_in_debug() {
        let creds = LoginForm::new("alice", "secret123").validate().unwrap();
        let debug = format!("{:?}", creds);
        assert!(debug.contains("alice"));
        assert!(!debug.contains("secret123"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn form_hides_password_in_debug() {
        let debug = format!("{:?}", LoginForm::new("alice", "secret123"));
        assert!(!debug.contains("secret123"));
    }

    #[test]
    fn whitespace_only_fields_are_missing() {
        let errors = LoginForm::new("   ", "\t").validate().unwrap_err();
        assert_eq!(errors.get("username"), ["Username is required"]);
        assert_eq!(errors.get("password"), ["Password is required"]);
    }

    #[test]
    fn only_password_missing() {
        let errors = LoginForm::new("alice", "").validate().unwrap_err();
        assert!(errors.get("username").is_empty());
        assert_eq!(errors.get("password"), ["Password is required"]);
    }

    #[test]
    fn fields_are_trimmed() {
        let creds = LoginForm::new(" alice ", " pw ").validate().unwrap();
        assert_eq!(creds.username(), "alice");
        assert_eq!(creds.password(), "pw");
    }
}
