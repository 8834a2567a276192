//! Route Guard
//!
//! Pure decision over an [`AuthState`]: wait, redirect, or render. The HTTP
//! wrapper lives in `presentation::middleware`.

use serde::Serialize;
use std::fmt;

use crate::application::state::AuthState;
use crate::domain::value_object::{Role, Route};

/// Roles allowed on a route
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct AllowedRoles {
    mask: u8,
}

impl AllowedRoles {
    pub const fn all() -> Self {
        Self { mask: 0b111 }
    }

    pub fn only(roles: &[Role]) -> Self {
        Self {
            mask: roles.iter().fold(0, |mask, role| mask | role.bit()),
        }
    }

    pub fn contains(&self, role: Role) -> bool {
        self.mask & role.bit() != 0
    }

    pub fn roles(&self) -> impl Iterator<Item = Role> + '_ {
        Role::ALL.into_iter().filter(|role| self.contains(*role))
    }
}

impl Default for AllowedRoles {
    fn default() -> Self {
        Self::all()
    }
}

impl fmt::Debug for AllowedRoles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.roles()).finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectReason {
    NotAuthenticated,
    /// Identity without a profile row
    ProfileMissing,
    RoleNotAllowed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Auth state still resolving; no decision yet
    Wait,
    Redirect { to: Route, reason: RedirectReason },
    Render,
}

/// Checks run in order; the first match wins
pub fn evaluate(state: &AuthState, allowed: AllowedRoles) -> GuardDecision {
    if state.is_loading() {
        return GuardDecision::Wait;
    }

    if state.user.is_none() {
        return GuardDecision::Redirect {
            to: Route::Login,
            reason: RedirectReason::NotAuthenticated,
        };
    }

    let Some(profile) = &state.profile else {
        return GuardDecision::Redirect {
            to: Route::Login,
            reason: RedirectReason::ProfileMissing,
        };
    };

    if !allowed.contains(profile.role) {
        return GuardDecision::Redirect {
            to: profile.role.dashboard(),
            reason: RedirectReason::RoleNotAllowed,
        };
    }

    GuardDecision::Render
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{Identity, Profile};
    use crate::domain::value_object::IdentityId;
    use chrono::Utc;

    fn user() -> Identity {
        Identity::new(IdentityId::new(), "resident@city.gov")
    }

    fn profile_for(identity: &Identity, role: Role) -> Profile {
        Profile {
            id: identity.id,
            email: identity.email.clone(),
            role,
            name: None,
            created_at: Utc::now(),
        }
    }

    fn signed_in(role: Role) -> AuthState {
        let identity = user();
        let profile = profile_for(&identity, role);
        AuthState::new(Some(identity), Some(profile), None)
    }

    #[test]
    fn test_loading_always_waits() {
        let allowed = AllowedRoles::only(&[Role::Admin]);
        for state in [
            AuthState::default().loading(),
            signed_in(Role::Citizen).loading(),
            AuthState::new(Some(user()), None, None).loading(),
        ] {
            assert_eq!(evaluate(&state, allowed), GuardDecision::Wait);
        }
    }

    #[test]
    fn test_no_user_goes_to_login() {
        let decision = evaluate(&AuthState::default(), AllowedRoles::all());
        assert_eq!(
            decision,
            GuardDecision::Redirect {
                to: Route::Login,
                reason: RedirectReason::NotAuthenticated
            }
        );
    }

    #[test]
    fn test_missing_profile_goes_to_login() {
        let state = AuthState::new(Some(user()), None, None);
        for allowed in [AllowedRoles::all(), AllowedRoles::only(&[Role::Citizen])] {
            assert_eq!(
                evaluate(&state, allowed),
                GuardDecision::Redirect {
                    to: Route::Login,
                    reason: RedirectReason::ProfileMissing
                }
            );
        }
    }

    #[test]
    fn test_wrong_role_goes_to_own_dashboard_never_login() {
        for role in Role::ALL {
            let others: Vec<Role> = Role::ALL.into_iter().filter(|r| *r != role).collect();
            let decision = evaluate(&signed_in(role), AllowedRoles::only(&others));
            assert_eq!(
                decision,
                GuardDecision::Redirect {
                    to: role.dashboard(),
                    reason: RedirectReason::RoleNotAllowed
                }
            );
        }
    }

    #[test]
    fn test_allowed_role_renders() {
        for role in Role::ALL {
            assert_eq!(
                evaluate(&signed_in(role), AllowedRoles::all()),
                GuardDecision::Render
            );
            assert_eq!(
                evaluate(&signed_in(role), AllowedRoles::only(&[role])),
                GuardDecision::Render
            );
        }
    }

    #[test]
    fn test_citizen_visiting_admin_dashboard() {
        let decision = evaluate(
            &signed_in(Role::Citizen),
            AllowedRoles::only(&[Role::Admin]),
        );
        assert_eq!(
            decision,
            GuardDecision::Redirect {
                to: Route::Dashboard,
                reason: RedirectReason::RoleNotAllowed
            }
        );
    }

    #[test]
    fn test_officer_on_analytics() {
        let allowed = AllowedRoles::only(&[Role::Officer, Role::Admin]);
        assert_eq!(evaluate(&signed_in(Role::Officer), allowed), GuardDecision::Render);
        assert!(!allowed.contains(Role::Citizen));
        assert_eq!(allowed.roles().collect::<Vec<_>>(), vec![Role::Officer, Role::Admin]);
    }
}
