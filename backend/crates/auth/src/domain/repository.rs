//! Backend Boundary Traits
//!
//! Interfaces to the hosted backend. Implementations are in the
//! infrastructure layer. Calls that act on behalf of a signed-in user take
//! that user's access token; `None` means the anonymous project key.

use crate::domain::entity::{
    AccessToken, AccountCreated, NewProfile, Profile, RefreshToken, Session,
};
use crate::domain::value_object::{Email, IdentityId, Password, Role};
use crate::error::AuthResult;

/// Hosted authentication service
#[trait_variant::make(IdentityProvider: Send)]
pub trait LocalIdentityProvider {
    /// Create an identity. A session comes back only when the provider
    /// does not require email confirmation.
    async fn create_account(&self, email: &Email, password: &Password)
    -> AuthResult<AccountCreated>;

    /// Exchange credentials for a session
    async fn sign_in_with_password(&self, email: &Email, password: &Password)
    -> AuthResult<Session>;

    /// Revoke the session behind `access_token`
    async fn sign_out(&self, access_token: &AccessToken) -> AuthResult<()>;

    /// Exchange a refresh token for a new session
    async fn refresh_session(&self, refresh_token: &RefreshToken) -> AuthResult<Session>;

    /// Remove an identity (privileged)
    async fn delete_account(&self, id: &IdentityId) -> AuthResult<()>;
}

/// `users` table in the hosted data API
#[trait_variant::make(ProfileRepository: Send)]
pub trait LocalProfileRepository {
    /// Find a profile by identity ID
    async fn find_by_id(
        &self,
        id: &IdentityId,
        token: Option<&AccessToken>,
    ) -> AuthResult<Option<Profile>>;

    /// Fetch only the role column
    async fn find_role(&self, id: &IdentityId, token: Option<&AccessToken>)
    -> AuthResult<Option<Role>>;

    /// Insert a new profile
    async fn insert(&self, profile: &NewProfile, token: Option<&AccessToken>) -> AuthResult<()>;
}
