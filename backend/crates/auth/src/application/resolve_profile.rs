//! Resolve Profile Use Case
//!
//! Loads the profile row for an identity.

use std::sync::Arc;

use crate::domain::entity::{AccessToken, Profile};
use crate::domain::repository::ProfileRepository;
use crate::domain::value_object::{IdentityId, Role};
use crate::error::AuthResult;

pub struct ResolveProfileUseCase<P>
where
    P: ProfileRepository,
{
    profile_repo: Arc<P>,
}

impl<P> ResolveProfileUseCase<P>
where
    P: ProfileRepository,
{
    pub fn new(profile_repo: Arc<P>) -> Self {
        Self { profile_repo }
    }

    /// `Ok(None)` means the identity has no profile row
    pub async fn execute(
        &self,
        id: &IdentityId,
        token: Option<&AccessToken>,
    ) -> AuthResult<Option<Profile>> {
        match self.profile_repo.find_by_id(id, token).await {
            Ok(Some(profile)) => {
                tracing::debug!(identity_id = %id, role = %profile.role, "Profile resolved");
                Ok(Some(profile))
            }
            Ok(None) => {
                tracing::warn!(identity_id = %id, "Identity has no profile");
                Ok(None)
            }
            Err(e) => {
                tracing::warn!(identity_id = %id, error = %e, "Profile fetch failed");
                Err(e)
            }
        }
    }

    /// Fetch only the role column
    pub async fn role(&self, id: &IdentityId, token: Option<&AccessToken>) -> AuthResult<Option<Role>> {
        self.profile_repo.find_role(id, token).await
    }
}
