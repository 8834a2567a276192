//! Application Configuration
//!
//! Configuration for the Auth application layer.

use platform::config::{env_duration_ms, env_flag, env_parse, env_var};
use platform::cookie::CookieConfig;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// How the session listener and manual sign-in/sign-up calls share state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionSyncPolicy {
    /// Changes carry a sequence number; older changes and profile results
    /// for a superseded session are discarded
    #[default]
    ConvergeOnLatest,
    /// The listener ignores changes while a manual call is in flight; the
    /// call applies its own result
    SuppressListenerDuringCalls,
    /// Every writer applies whatever it has, in completion order
    LastWriteWins,
}

/// What to do when the profile insert fails after the identity was created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegistrationRecovery {
    /// Keep the identity; it will have no profile
    #[default]
    LeaveOrphan,
    /// Delete the identity again (needs the privileged key)
    Compensate,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {what}: {value}")]
pub struct ParseSettingError {
    what: &'static str,
    value: String,
}

impl FromStr for SessionSyncPolicy {
    type Err = ParseSettingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "converge_on_latest" | "latest" => Ok(Self::ConvergeOnLatest),
            "suppress_listener_during_calls" | "suppress" => Ok(Self::SuppressListenerDuringCalls),
            "last_write_wins" => Ok(Self::LastWriteWins),
            _ => Err(ParseSettingError {
                what: "session sync policy",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for RegistrationRecovery {
    type Err = ParseSettingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "leave_orphan" | "leave" => Ok(Self::LeaveOrphan),
            "compensate" => Ok(Self::Compensate),
            _ => Err(ParseSettingError {
                what: "registration recovery",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for SessionSyncPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ConvergeOnLatest => "converge_on_latest",
            Self::SuppressListenerDuringCalls => "suppress_listener_during_calls",
            Self::LastWriteWins => "last_write_wins",
        })
    }
}

impl fmt::Display for RegistrationRecovery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::LeaveOrphan => "leave_orphan",
            Self::Compensate => "compensate",
        })
    }
}

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Cookie that identifies a browser client
    pub client_cookie_name: String,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
    pub session_sync: SessionSyncPolicy,
    pub registration_recovery: RegistrationRecovery,
    /// Refresh this long before the access token expires
    pub refresh_margin: Duration,
    /// How long a guarded request may wait for an in-flight auth operation
    pub guard_settle_timeout: Duration,
    /// Client contexts unused for this long are evicted
    pub client_idle_ttl: Duration,
    /// Upper bound on live client contexts; the least recently seen is evicted
    pub max_clients: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            client_cookie_name: "civguard_client".to_string(),
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
            session_sync: SessionSyncPolicy::default(),
            registration_recovery: RegistrationRecovery::default(),
            refresh_margin: Duration::from_secs(60),
            guard_settle_timeout: Duration::from_secs(3),
            client_idle_ttl: Duration::from_secs(2 * 3600), // 2 hours
            max_clients: 10_000,
        }
    }
}

impl AuthConfig {
    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Default::default()
        }
    }

    /// Apply `AUTH_*` environment overrides
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(raw) = env_var("AUTH_SESSION_SYNC") {
            match raw.parse() {
                Ok(policy) => self.session_sync = policy,
                Err(e) => tracing::warn!(error = %e, "Ignoring AUTH_SESSION_SYNC"),
            }
        }
        if let Some(raw) = env_var("AUTH_REGISTRATION_RECOVERY") {
            match raw.parse() {
                Ok(recovery) => self.registration_recovery = recovery,
                Err(e) => tracing::warn!(error = %e, "Ignoring AUTH_REGISTRATION_RECOVERY"),
            }
        }
        self.cookie_secure = env_flag("AUTH_COOKIE_SECURE", self.cookie_secure);
        self.refresh_margin = env_duration_ms("AUTH_REFRESH_MARGIN_MS", self.refresh_margin);
        self.guard_settle_timeout =
            env_duration_ms("AUTH_GUARD_SETTLE_MS", self.guard_settle_timeout);
        self.client_idle_ttl = env_duration_ms("AUTH_CLIENT_IDLE_TTL_MS", self.client_idle_ttl);
        self.max_clients = env_parse("AUTH_MAX_CLIENTS", self.max_clients).max(1);
        self
    }

    /// Cookie settings for the client identifier
    pub fn client_cookie(&self) -> CookieConfig {
        CookieConfig {
            name: self.client_cookie_name.clone(),
            secure: self.cookie_secure,
            http_only: true,
            same_site: self.cookie_same_site,
            path: "/".to_string(),
            max_age_secs: i64::try_from(self.client_idle_ttl.as_secs()).ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AuthConfig::default();
        assert_eq!(config.session_sync, SessionSyncPolicy::ConvergeOnLatest);
        assert_eq!(config.registration_recovery, RegistrationRecovery::LeaveOrphan);
        assert!(config.cookie_secure);
        assert!(!AuthConfig::development().cookie_secure);
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!(
            "last-write-wins".parse::<SessionSyncPolicy>().unwrap(),
            SessionSyncPolicy::LastWriteWins
        );
        assert_eq!(
            "SUPPRESS".parse::<SessionSyncPolicy>().unwrap(),
            SessionSyncPolicy::SuppressListenerDuringCalls
        );
        assert_eq!(
            "compensate".parse::<RegistrationRecovery>().unwrap(),
            RegistrationRecovery::Compensate
        );
        assert!("sometimes".parse::<RegistrationRecovery>().is_err());
    }

    #[test]
    fn test_display_parses_back() {
        for policy in [
            SessionSyncPolicy::ConvergeOnLatest,
            SessionSyncPolicy::SuppressListenerDuringCalls,
            SessionSyncPolicy::LastWriteWins,
        ] {
            assert_eq!(policy.to_string().parse::<SessionSyncPolicy>().unwrap(), policy);
        }
    }

    #[test]
    fn test_client_cookie() {
        let cookie = AuthConfig::development().client_cookie();
        assert_eq!(cookie.name, "civguard_client");
        assert!(!cookie.secure);
        assert_eq!(cookie.max_age_secs, Some(7200));
    }
}
