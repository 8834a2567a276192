//! Hosted Backend Implementation
//!
//! Identity calls go to the auth API (`/auth/v1/*`), profile calls to the
//! data API (`/rest/v1/users`). Both share one [`ServiceClient`].

use chrono::{DateTime, Utc};
use platform::config::{env_duration_ms, env_var};
use platform::http::{ServiceClient, ServiceClientError};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::entity::{
    AccessToken, AccountCreated, Identity, NewProfile, Profile, RefreshToken, Session,
};
use crate::domain::repository::{IdentityProvider, ProfileRepository};
use crate::domain::value_object::{Email, IdentityId, Password, Role};
use crate::error::{AuthError, AuthResult};

/// Local development stack defaults
pub const DEV_PLACEHOLDER_URL: &str = "http://localhost:54321";
pub const DEV_PLACEHOLDER_ANON_KEY: &str = "dev-placeholder-anon-key";

const PROFILE_COLUMNS: &str = "id,email,role,name,created_at";
/// Ask the data API for a single object instead of an array
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";
/// Data API code for "no rows" with a single-object request
const NO_ROWS: &str = "PGRST116";

/// Connection settings for the hosted backend
#[derive(Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
    /// Privileged key; only needed to delete identities
    pub service_role_key: Option<String>,
    pub request_timeout: Duration,
}

impl std::fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url)
            .field("anon_key", &"***")
            .field("service_role_key", &self.service_role_key.as_ref().map(|_| "***"))
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Required settings missing from the environment
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Missing backend configuration: {}", missing.join(", "))]
pub struct MissingConfig {
    pub missing: Vec<&'static str>,
}

impl SupabaseConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Read `SUPABASE_URL`, `SUPABASE_ANON_KEY`, and the optional
    /// `SUPABASE_SERVICE_ROLE_KEY` / `SUPABASE_TIMEOUT_MS`
    pub fn from_env() -> Result<Self, MissingConfig> {
        let url = env_var("SUPABASE_URL");
        let anon_key = env_var("SUPABASE_ANON_KEY");

        match (url, anon_key) {
            (Some(url), Some(anon_key)) => Ok(Self {
                url,
                anon_key,
                service_role_key: env_var("SUPABASE_SERVICE_ROLE_KEY"),
                request_timeout: env_duration_ms("SUPABASE_TIMEOUT_MS", Self::DEFAULT_TIMEOUT),
            }),
            (url, anon_key) => Err(MissingConfig {
                missing: [
                    url.is_none().then_some("SUPABASE_URL"),
                    anon_key.is_none().then_some("SUPABASE_ANON_KEY"),
                ]
                .into_iter()
                .flatten()
                .collect(),
            }),
        }
    }

    /// Placeholder values pointing at a local development stack
    pub fn development_placeholder() -> Self {
        Self {
            url: DEV_PLACEHOLDER_URL.to_string(),
            anon_key: DEV_PLACEHOLDER_ANON_KEY.to_string(),
            service_role_key: None,
            request_timeout: Self::DEFAULT_TIMEOUT,
        }
    }
}

/// Backend talking to the hosted auth and data APIs
#[derive(Debug, Clone)]
pub struct SupabaseBackend {
    client: ServiceClient,
    service_role_key: Option<String>,
}

impl SupabaseBackend {
    pub fn new(config: SupabaseConfig) -> AuthResult<Self> {
        let client = ServiceClient::new(config.url, config.anon_key, config.request_timeout)?;
        Ok(Self {
            client,
            service_role_key: config.service_role_key,
        })
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    async fn session_request(&self, path: &str, body: &impl Serialize) -> AuthResult<Session> {
        let request = self.client.request(Method::POST, path, None).json(body);
        let response = self.client.send(request).await.map_err(map_sign_in_error)?;
        let payload: SessionPayload = response.json().await.map_err(ServiceClientError::from)?;
        payload.into_session()
    }

    async fn fetch_profile_row<T>(
        &self,
        id: &IdentityId,
        columns: &str,
        token: Option<&AccessToken>,
    ) -> AuthResult<Option<T>>
    where
        T: for<'de> Deserialize<'de>,
    {
        let path = format!("/rest/v1/users?id=eq.{id}&select={columns}");
        let request = self
            .client
            .request(Method::GET, &path, token.map(AccessToken::expose))
            .header(reqwest::header::ACCEPT, SINGLE_OBJECT);

        match self.client.send(request).await {
            Ok(response) => {
                let row = response.json().await.map_err(ServiceClientError::from)?;
                Ok(Some(row))
            }
            Err(ServiceClientError::Upstream(e))
                if e.status == StatusCode::NOT_ACCEPTABLE || e.code.as_deref() == Some(NO_ROWS) =>
            {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshGrant<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

impl UserPayload {
    fn into_identity(self) -> AuthResult<Identity> {
        let id = IdentityId::parse_str(&self.id)
            .map_err(|e| AuthError::Internal(format!("identity id from backend: {e}")))?;
        Ok(Identity::new(id, self.email.unwrap_or_default()))
    }
}

#[derive(Debug, Deserialize)]
struct SessionPayload {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    /// Unix seconds
    #[serde(default)]
    expires_at: Option<i64>,
    user: UserPayload,
}

impl SessionPayload {
    fn into_session(self) -> AuthResult<Session> {
        let expires_at = self
            .expires_at
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .unwrap_or_else(|| Utc::now() + chrono::Duration::seconds(self.expires_in.unwrap_or(3600)));

        Ok(Session {
            identity: self.user.into_identity()?,
            access_token: AccessToken::new(self.access_token),
            refresh_token: RefreshToken::new(self.refresh_token),
            expires_at,
        })
    }
}

/// Sign-up answers with a session when auto-confirm is on, otherwise with
/// the bare user
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpPayload {
    Session(SessionPayload),
    User(UserPayload),
}

#[derive(Serialize)]
struct ProfileInsert<'a> {
    id: IdentityId,
    email: &'a str,
    role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ProfileRow {
    id: IdentityId,
    email: String,
    role: String,
    name: Option<String>,
    created_at: DateTime<Utc>,
}

impl ProfileRow {
    fn into_profile(self) -> AuthResult<Profile> {
        Ok(Profile {
            id: self.id,
            email: self.email,
            role: Role::from_code(&self.role)?,
            name: self.name,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Deserialize)]
struct RoleRow {
    role: String,
}

fn map_sign_in_error(err: ServiceClientError) -> AuthError {
    match err {
        ServiceClientError::Upstream(e)
            if e.status == StatusCode::BAD_REQUEST
                && matches!(e.code.as_deref(), Some("invalid_grant" | "invalid_credentials")) =>
        {
            AuthError::InvalidCredentials
        }
        other => other.into(),
    }
}

fn map_sign_up_error(err: ServiceClientError) -> AuthError {
    match err {
        ServiceClientError::Upstream(e)
            if e.code.as_deref() == Some("user_already_exists")
                || e.message.contains("already registered") =>
        {
            AuthError::AccountExists(e.message)
        }
        ServiceClientError::Upstream(e) if e.status == StatusCode::UNPROCESSABLE_ENTITY => {
            AuthError::Validation(e.message)
        }
        other => other.into(),
    }
}

// ============================================================================
// Identity Provider Implementation
// ============================================================================

impl IdentityProvider for SupabaseBackend {
    async fn create_account(&self, email: &Email, password: &Password) -> AuthResult<AccountCreated> {
        let body = Credentials {
            email: email.as_str(),
            password: password.expose(),
        };
        let request = self.client.request(Method::POST, "/auth/v1/signup", None).json(&body);
        let response = self.client.send(request).await.map_err(map_sign_up_error)?;
        let payload: SignUpPayload = response.json().await.map_err(ServiceClientError::from)?;

        match payload {
            SignUpPayload::Session(session) => {
                let session = session.into_session()?;
                Ok(AccountCreated {
                    identity: session.identity.clone(),
                    session: Some(session),
                })
            }
            SignUpPayload::User(user) => Ok(AccountCreated {
                identity: user.into_identity()?,
                session: None,
            }),
        }
    }

    async fn sign_in_with_password(&self, email: &Email, password: &Password) -> AuthResult<Session> {
        let body = Credentials {
            email: email.as_str(),
            password: password.expose(),
        };
        self.session_request("/auth/v1/token?grant_type=password", &body)
            .await
    }

    async fn sign_out(&self, access_token: &AccessToken) -> AuthResult<()> {
        let request = self
            .client
            .request(Method::POST, "/auth/v1/logout", Some(access_token.expose()));
        match self.client.send(request).await {
            Ok(_) => Ok(()),
            // Already revoked or expired
            Err(ServiceClientError::Upstream(e)) if e.status == StatusCode::UNAUTHORIZED => {
                tracing::debug!("Remote session already gone");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn refresh_session(&self, refresh_token: &RefreshToken) -> AuthResult<Session> {
        let body = RefreshGrant {
            refresh_token: refresh_token.expose(),
        };
        self.session_request("/auth/v1/token?grant_type=refresh_token", &body)
            .await
            .map_err(|e| match e {
                AuthError::InvalidCredentials => AuthError::SessionInvalid,
                other => other,
            })
    }

    async fn delete_account(&self, id: &IdentityId) -> AuthResult<()> {
        let Some(key) = self.service_role_key.as_deref() else {
            return Err(AuthError::NotConfigured("SUPABASE_SERVICE_ROLE_KEY"));
        };
        let path = format!("/auth/v1/admin/users/{id}");
        let request = self.client.request(Method::DELETE, &path, Some(key));
        self.client.send(request).await?;
        Ok(())
    }
}

// ============================================================================
// Profile Repository Implementation
// ============================================================================

impl ProfileRepository for SupabaseBackend {
    async fn find_by_id(
        &self,
        id: &IdentityId,
        token: Option<&AccessToken>,
    ) -> AuthResult<Option<Profile>> {
        self.fetch_profile_row::<ProfileRow>(id, PROFILE_COLUMNS, token)
            .await?
            .map(ProfileRow::into_profile)
            .transpose()
    }

    async fn find_role(&self, id: &IdentityId, token: Option<&AccessToken>) -> AuthResult<Option<Role>> {
        self.fetch_profile_row::<RoleRow>(id, "role", token)
            .await?
            .map(|row| Role::from_code(&row.role).map_err(AuthError::from))
            .transpose()
    }

    async fn insert(&self, profile: &NewProfile, token: Option<&AccessToken>) -> AuthResult<()> {
        let body = ProfileInsert {
            id: profile.id,
            email: profile.email.as_str(),
            role: profile.role,
            name: profile.name.as_ref().map(|n| n.as_str()),
        };
        let request = self
            .client
            .request(Method::POST, "/rest/v1/users", token.map(AccessToken::expose))
            .header("Prefer", "return=minimal")
            .json(&body);

        match self.client.send(request).await {
            Ok(_) => Ok(()),
            Err(ServiceClientError::Upstream(e)) if e.status == StatusCode::CONFLICT => {
                Err(AuthError::AccountExists(e.message))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_payload() {
        let json = r#"{
            "access_token": "at",
            "token_type": "bearer",
            "expires_in": 3600,
            "expires_at": 1893456000,
            "refresh_token": "rt",
            "user": {"id": "3f2b6c1e-8a4d-4c1b-9d3e-2a7f5b6c8d9e", "email": "ana@city.gov", "aud": "authenticated"}
        }"#;
        let payload: SessionPayload = serde_json::from_str(json).unwrap();
        let session = payload.into_session().unwrap();
        assert_eq!(session.identity.email, "ana@city.gov");
        assert_eq!(session.access_token.expose(), "at");
        assert_eq!(session.expires_at.timestamp(), 1893456000);
    }

    #[test]
    fn test_sign_up_payload_variants() {
        let with_session = r#"{
            "access_token": "at", "refresh_token": "rt", "expires_in": 3600,
            "user": {"id": "3f2b6c1e-8a4d-4c1b-9d3e-2a7f5b6c8d9e", "email": "a@city.gov"}
        }"#;
        assert!(matches!(
            serde_json::from_str::<SignUpPayload>(with_session).unwrap(),
            SignUpPayload::Session(_)
        ));

        let user_only = r#"{"id": "3f2b6c1e-8a4d-4c1b-9d3e-2a7f5b6c8d9e", "email": "a@city.gov", "confirmation_sent_at": "2024-01-01T00:00:00Z"}"#;
        assert!(matches!(
            serde_json::from_str::<SignUpPayload>(user_only).unwrap(),
            SignUpPayload::User(_)
        ));
    }

    #[test]
    fn test_profile_row_accepts_legacy_role() {
        let json = r#"{
            "id": "3f2b6c1e-8a4d-4c1b-9d3e-2a7f5b6c8d9e",
            "email": "officer@city.gov",
            "role": "municipal",
            "name": null,
            "created_at": "2024-03-01T10:00:00+00:00"
        }"#;
        let row: ProfileRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.into_profile().unwrap().role, Role::Officer);
    }

    #[test]
    fn test_profile_insert_body() {
        let body = ProfileInsert {
            id: IdentityId::parse_str("3f2b6c1e-8a4d-4c1b-9d3e-2a7f5b6c8d9e").unwrap(),
            email: "a@city.gov",
            role: Role::Officer,
            name: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["role"], "officer");
        assert!(json.get("name").is_none());
    }

    #[test]
    fn test_invalid_grant_maps_to_invalid_credentials() {
        let upstream = platform::http::UpstreamError::from_body(
            StatusCode::BAD_REQUEST,
            r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
        );
        let err = map_sign_in_error(ServiceClientError::Upstream(upstream));
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[test]
    fn test_existing_account_maps_to_conflict() {
        let upstream = platform::http::UpstreamError::from_body(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"code":422,"error_code":"user_already_exists","msg":"User already registered"}"#,
        );
        let err = map_sign_up_error(ServiceClientError::Upstream(upstream));
        assert!(matches!(err, AuthError::AccountExists(ref m) if m == "User already registered"));
    }

    #[test]
    fn test_missing_config_lists_variables() {
        let err = MissingConfig {
            missing: vec!["SUPABASE_URL", "SUPABASE_ANON_KEY"],
        };
        assert_eq!(
            err.to_string(),
            "Missing backend configuration: SUPABASE_URL, SUPABASE_ANON_KEY"
        );
    }

    #[test]
    fn test_config_debug_hides_keys() {
        let debug = format!("{:?}", SupabaseConfig::development_placeholder());
        assert!(!debug.contains(DEV_PLACEHOLDER_ANON_KEY));
    }
}
