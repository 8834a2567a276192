//! Sign In Use Case
//!
//! Authenticates with email and password and works out where the user
//! should land.

use std::sync::Arc;

use crate::application::resolve_profile::ResolveProfileUseCase;
use crate::domain::entity::Session;
use crate::domain::repository::{IdentityProvider, ProfileRepository};
use crate::domain::value_object::{Email, Password, Route};
use crate::error::{AuthError, AuthResult};

/// Sign in input
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

/// Sign in output
#[derive(Debug)]
pub struct SignInOutput {
    pub session: Session,
    pub destination: Route,
}

/// Sign in use case
pub struct SignInUseCase<B>
where
    B: IdentityProvider + ProfileRepository,
{
    backend: Arc<B>,
}

impl<B> SignInUseCase<B>
where
    B: IdentityProvider + ProfileRepository,
{
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    pub async fn execute(&self, input: SignInInput) -> AuthResult<SignInOutput> {
        let email = Email::new(&input.email).map_err(|_| AuthError::InvalidCredentials)?;
        if input.password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }
        let password = Password::for_sign_in(input.password);

        let session = self
            .backend
            .sign_in_with_password(&email, &password)
            .await?;

        tracing::info!(identity_id = %session.identity.id, "User signed in");

        let destination = self.destination(&session).await;
        Ok(SignInOutput {
            session,
            destination,
        })
    }

    /// Dashboard for the stored role. Only the role column is fetched;
    /// any failure falls back to the citizen dashboard.
    async fn destination(&self, session: &Session) -> Route {
        let id = &session.identity.id;
        let resolver = ResolveProfileUseCase::new(self.backend.clone());
        match resolver.role(id, Some(&session.access_token)).await {
            Ok(Some(role)) => role.dashboard(),
            Ok(None) => {
                tracing::warn!(identity_id = %id, "No profile for signed-in identity");
                Route::Dashboard
            }
            Err(e) => {
                tracing::warn!(identity_id = %id, error = %e, "Role lookup failed");
                Route::Dashboard
            }
        }
    }
}
