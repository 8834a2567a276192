//! Sign Out Use Case
//!
//! Revokes the session with the identity provider.

use std::sync::Arc;

use crate::domain::entity::Session;
use crate::domain::repository::IdentityProvider;
use crate::error::AuthResult;

/// Sign out use case
pub struct SignOutUseCase<I>
where
    I: IdentityProvider,
{
    identity_provider: Arc<I>,
}

impl<I> SignOutUseCase<I>
where
    I: IdentityProvider,
{
    pub fn new(identity_provider: Arc<I>) -> Self {
        Self { identity_provider }
    }

    /// Nothing to revoke without a session
    pub async fn execute(&self, session: Option<&Session>) -> AuthResult<()> {
        let Some(session) = session else {
            tracing::debug!("Sign out without a session");
            return Ok(());
        };

        self.identity_provider
            .sign_out(&session.access_token)
            .await?;

        tracing::info!(identity_id = %session.identity.id, "User signed out");
        Ok(())
    }
}
