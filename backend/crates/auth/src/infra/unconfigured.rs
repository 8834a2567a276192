//! Backend used when connection settings are missing in a release build.
//! Every call fails; the application still starts and renders public pages.

use crate::domain::entity::{
    AccessToken, AccountCreated, NewProfile, Profile, RefreshToken, Session,
};
use crate::domain::repository::{IdentityProvider, ProfileRepository};
use crate::domain::value_object::{Email, IdentityId, Password, Role};
use crate::error::{AuthError, AuthResult};

#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredBackend;

const MISSING: &str = "SUPABASE_URL / SUPABASE_ANON_KEY";

impl IdentityProvider for UnconfiguredBackend {
    async fn create_account(&self, _email: &Email, _password: &Password) -> AuthResult<AccountCreated> {
        Err(AuthError::NotConfigured(MISSING))
    }

    async fn sign_in_with_password(&self, _email: &Email, _password: &Password) -> AuthResult<Session> {
        Err(AuthError::NotConfigured(MISSING))
    }

    async fn sign_out(&self, _access_token: &AccessToken) -> AuthResult<()> {
        Err(AuthError::NotConfigured(MISSING))
    }

    async fn refresh_session(&self, _refresh_token: &RefreshToken) -> AuthResult<Session> {
        Err(AuthError::NotConfigured(MISSING))
    }

    async fn delete_account(&self, _id: &IdentityId) -> AuthResult<()> {
        Err(AuthError::NotConfigured(MISSING))
    }
}

impl ProfileRepository for UnconfiguredBackend {
    async fn find_by_id(
        &self,
        _id: &IdentityId,
        _token: Option<&AccessToken>,
    ) -> AuthResult<Option<Profile>> {
        Err(AuthError::NotConfigured(MISSING))
    }

    async fn find_role(&self, _id: &IdentityId, _token: Option<&AccessToken>) -> AuthResult<Option<Role>> {
        Err(AuthError::NotConfigured(MISSING))
    }

    async fn insert(&self, _profile: &NewProfile, _token: Option<&AccessToken>) -> AuthResult<()> {
        Err(AuthError::NotConfigured(MISSING))
    }
}
