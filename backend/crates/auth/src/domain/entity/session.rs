//! Session Entity
//!
//! Proof of authentication issued by the identity provider. Its lifecycle is
//! owned by the provider; the application only holds the current one.

use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;

use super::identity::Identity;

macro_rules! secret_token {
    ($name:ident) => {
        #[derive(Clone, PartialEq, Eq)]
        pub struct $name(String);

        impl $name {
            pub fn new(token: impl Into<String>) -> Self {
                Self(token.into())
            }

            pub fn expose(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(concat!(stringify!($name), "(***)"))
            }
        }
    };
}

secret_token!(AccessToken);
secret_token!(RefreshToken);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub identity: Identity,
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Time left until expiry, zero once expired
    pub fn remaining(&self) -> Duration {
        (self.expires_at - Utc::now()).to_std().unwrap_or(Duration::ZERO)
    }

    /// Delay before the session should be refreshed
    pub fn refresh_in(&self, margin: Duration) -> Duration {
        self.remaining().saturating_sub(margin)
    }
}

/// Result of creating an account. The provider only issues a session when
/// email confirmation is disabled.
#[derive(Debug, Clone)]
pub struct AccountCreated {
    pub identity: Identity,
    pub session: Option<Session>,
}
