//! Sign Up Use Case
//!
//! Creates the identity, then the profile row. The two steps are not
//! atomic; [`RegistrationRecovery`] decides what happens to an identity
//! whose profile insert failed.

use std::sync::Arc;

use crate::application::config::{AuthConfig, RegistrationRecovery};
use crate::domain::entity::{Identity, NewProfile, Session};
use crate::domain::repository::{IdentityProvider, ProfileRepository};
use crate::domain::value_object::{DisplayName, Email, Password, Role};
use crate::error::AuthResult;

/// Sign up input
pub struct SignUpInput {
    pub email: String,
    pub password: String,
    pub role: Role,
    pub name: Option<String>,
}

/// Sign up output
#[derive(Debug)]
pub struct SignUpOutput {
    pub identity: Identity,
    pub role: Role,
    /// Present when the provider signed the new account in right away
    pub session: Option<Session>,
}

/// Sign up use case
pub struct SignUpUseCase<B>
where
    B: IdentityProvider + ProfileRepository,
{
    backend: Arc<B>,
    config: Arc<AuthConfig>,
}

impl<B> SignUpUseCase<B>
where
    B: IdentityProvider + ProfileRepository,
{
    pub fn new(backend: Arc<B>, config: Arc<AuthConfig>) -> Self {
        Self { backend, config }
    }

    pub async fn execute(&self, input: SignUpInput) -> AuthResult<SignUpOutput> {
        let email = Email::new(&input.email)?;
        let password = Password::new(input.password)?;
        let name = DisplayName::parse(input.name.as_deref())?;

        let created = self.backend.create_account(&email, &password).await?;
        let identity = created.identity;

        let profile = NewProfile {
            id: identity.id,
            email,
            role: input.role,
            name,
        };
        let token = created.session.as_ref().map(|s| &s.access_token);

        if let Err(err) = self.backend.insert(&profile, token).await {
            self.recover(&identity, &err.to_string()).await;
            return Err(err);
        }

        tracing::info!(
            identity_id = %identity.id,
            role = %input.role,
            signed_in = created.session.is_some(),
            "Account registered"
        );

        Ok(SignUpOutput {
            identity,
            role: input.role,
            session: created.session,
        })
    }

    async fn recover(&self, identity: &Identity, reason: &str) {
        match self.config.registration_recovery {
            RegistrationRecovery::LeaveOrphan => {
                tracing::warn!(
                    identity_id = %identity.id,
                    reason,
                    "Profile insert failed; identity left without profile"
                );
            }
            RegistrationRecovery::Compensate => {
                match self.backend.delete_account(&identity.id).await {
                    Ok(()) => tracing::info!(
                        identity_id = %identity.id,
                        reason,
                        "Profile insert failed; identity removed"
                    ),
                    Err(e) => tracing::error!(
                        identity_id = %identity.id,
                        error = %e,
                        "Profile insert failed and identity could not be removed"
                    ),
                }
            }
        }
    }
}
