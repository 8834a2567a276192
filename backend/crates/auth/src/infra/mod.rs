//! Infrastructure Layer
//!
//! Backend implementations and runtime selection between them.

pub mod memory;
pub mod supabase;
pub mod unconfigured;

pub use memory::{BackendOperation, InMemoryBackend};
pub use supabase::{SupabaseBackend, SupabaseConfig};
pub use unconfigured::UnconfiguredBackend;

use platform::config::env_var;

use crate::domain::entity::{
    AccessToken, AccountCreated, NewProfile, Profile, RefreshToken, Session,
};
use crate::domain::repository::{IdentityProvider, ProfileRepository};
use crate::domain::value_object::{Email, IdentityId, Password, Role};
use crate::error::AuthResult;

/// Backend chosen at startup
#[derive(Debug, Clone)]
pub enum AnyBackend {
    Supabase(SupabaseBackend),
    Memory(InMemoryBackend),
    Unconfigured(UnconfiguredBackend),
}

impl AnyBackend {
    /// `CIVGUARD_BACKEND=memory` selects the in-memory backend. Otherwise the
    /// hosted backend is configured from the environment; when settings are
    /// missing, development builds fall back to local placeholders and
    /// release builds to [`UnconfiguredBackend`].
    pub fn from_env(development: bool) -> Self {
        if env_var("CIVGUARD_BACKEND").is_some_and(|v| v.eq_ignore_ascii_case("memory")) {
            tracing::info!("Using in-memory backend with demo accounts");
            return AnyBackend::Memory(InMemoryBackend::with_demo_accounts());
        }

        let config = match SupabaseConfig::from_env() {
            Ok(config) => config,
            Err(e) if development => {
                tracing::error!(error = %e, "Falling back to local development placeholders");
                SupabaseConfig::development_placeholder()
            }
            Err(e) => {
                tracing::error!(error = %e, "Authentication backend disabled");
                return AnyBackend::Unconfigured(UnconfiguredBackend);
            }
        };

        match SupabaseBackend::new(config) {
            Ok(backend) => {
                tracing::info!(url = backend.base_url(), "Using hosted backend");
                AnyBackend::Supabase(backend)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to create backend client");
                AnyBackend::Unconfigured(UnconfiguredBackend)
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AnyBackend::Supabase(_) => "supabase",
            AnyBackend::Memory(_) => "memory",
            AnyBackend::Unconfigured(_) => "unconfigured",
        }
    }
}

impl IdentityProvider for AnyBackend {
    async fn create_account(&self, email: &Email, password: &Password) -> AuthResult<AccountCreated> {
        match self {
            AnyBackend::Supabase(b) => b.create_account(email, password).await,
            AnyBackend::Memory(b) => b.create_account(email, password).await,
            AnyBackend::Unconfigured(b) => b.create_account(email, password).await,
        }
    }

    async fn sign_in_with_password(&self, email: &Email, password: &Password) -> AuthResult<Session> {
        match self {
            AnyBackend::Supabase(b) => b.sign_in_with_password(email, password).await,
            AnyBackend::Memory(b) => b.sign_in_with_password(email, password).await,
            AnyBackend::Unconfigured(b) => b.sign_in_with_password(email, password).await,
        }
    }

    async fn sign_out(&self, access_token: &AccessToken) -> AuthResult<()> {
        match self {
            AnyBackend::Supabase(b) => b.sign_out(access_token).await,
            AnyBackend::Memory(b) => b.sign_out(access_token).await,
            AnyBackend::Unconfigured(b) => b.sign_out(access_token).await,
        }
    }

    async fn refresh_session(&self, refresh_token: &RefreshToken) -> AuthResult<Session> {
        match self {
            AnyBackend::Supabase(b) => b.refresh_session(refresh_token).await,
            AnyBackend::Memory(b) => b.refresh_session(refresh_token).await,
            AnyBackend::Unconfigured(b) => b.refresh_session(refresh_token).await,
        }
    }

    async fn delete_account(&self, id: &IdentityId) -> AuthResult<()> {
        match self {
            AnyBackend::Supabase(b) => b.delete_account(id).await,
            AnyBackend::Memory(b) => b.delete_account(id).await,
            AnyBackend::Unconfigured(b) => b.delete_account(id).await,
        }
    }
}

impl ProfileRepository for AnyBackend {
    async fn find_by_id(
        &self,
        id: &IdentityId,
        token: Option<&AccessToken>,
    ) -> AuthResult<Option<Profile>> {
        match self {
            AnyBackend::Supabase(b) => b.find_by_id(id, token).await,
            AnyBackend::Memory(b) => b.find_by_id(id, token).await,
            AnyBackend::Unconfigured(b) => b.find_by_id(id, token).await,
        }
    }

    async fn find_role(&self, id: &IdentityId, token: Option<&AccessToken>) -> AuthResult<Option<Role>> {
        match self {
            AnyBackend::Supabase(b) => b.find_role(id, token).await,
            AnyBackend::Memory(b) => b.find_role(id, token).await,
            AnyBackend::Unconfigured(b) => b.find_role(id, token).await,
        }
    }

    async fn insert(&self, profile: &NewProfile, token: Option<&AccessToken>) -> AuthResult<()> {
        match self {
            AnyBackend::Supabase(b) => b.insert(profile, token).await,
            AnyBackend::Memory(b) => b.insert(profile, token).await,
            AnyBackend::Unconfigured(b) => b.insert(profile, token).await,
        }
    }
}
