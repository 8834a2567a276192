//! Password Value Object
//!
//! Plain-text password on its way to the identity provider. Hashing happens
//! there; this type only checks the minimum length and keeps the value out
//! of logs.

use kernel::error::app_error::{AppError, AppResult};
use std::fmt;

/// Minimum length enforced by the hosted identity provider
pub const PASSWORD_MIN_CHARS: usize = 6;
const PASSWORD_MAX_BYTES: usize = 72;

#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    pub fn new(raw: impl Into<String>) -> AppResult<Self> {
        let raw = raw.into();

        if raw.chars().count() < PASSWORD_MIN_CHARS {
            return Err(AppError::bad_request(format!(
                "Password must be at least {PASSWORD_MIN_CHARS} characters"
            )));
        }
        if raw.len() > PASSWORD_MAX_BYTES {
            return Err(AppError::bad_request(format!(
                "Password must be at most {PASSWORD_MAX_BYTES} bytes"
            )));
        }

        Ok(Self(raw))
    }

    /// Wrap a credential for a sign-in attempt without policy checks
    pub fn for_sign_in(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimum_length() {
        assert!(Password::new("12345").is_err());
        assert!(Password::new("123456").is_ok());
    }

    #[test]
    fn test_maximum_length() {
        assert!(Password::new("x".repeat(72)).is_ok());
        assert!(Password::new("x".repeat(73)).is_err());
    }

    #[test]
    fn test_debug_is_redacted() {
        let password = Password::new("hunter22").unwrap();
        assert_eq!(format!("{password:?}"), "Password(***)");
        assert_eq!(password.expose(), "hunter22");
    }
}
