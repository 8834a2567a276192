//! View models and form payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::{AuthPhase, AuthState, Notification};
use crate::domain::entity::{Identity, Profile};
use crate::domain::value_object::{IdentityId, Role, Route};

// ============================================================================
// Shared
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub id: IdentityId,
    pub email: String,
    pub role: Role,
    pub role_label: &'static str,
    pub name: Option<String>,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Profile> for ProfileView {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id,
            email: profile.email.clone(),
            role: profile.role,
            role_label: profile.role.label(),
            name: profile.name.clone(),
            display_name: profile.display_name().to_string(),
            created_at: profile.created_at,
        }
    }
}

/// Returned with `202 Accepted` while the auth state is still resolving
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadingView {
    pub view: &'static str,
    pub phase: AuthPhase,
    pub retry_after_secs: u64,
}

impl LoadingView {
    pub fn new(phase: AuthPhase, retry_after_secs: u64) -> Self {
        Self {
            view: "loading",
            phase,
            retry_after_secs,
        }
    }
}

// ============================================================================
// Login
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginView {
    pub view: &'static str,
    pub title: &'static str,
    pub subtitle: &'static str,
    pub register_link: Route,
    pub notifications: Vec<Notification>,
}

impl LoginView {
    pub fn new(notifications: Vec<Notification>) -> Self {
        Self {
            view: "login",
            title: "Welcome back",
            subtitle: "Sign in to your CivGuard account",
            register_link: Route::Register,
            notifications,
        }
    }
}

// ============================================================================
// Register
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: Option<String>,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    /// Role code; citizen when omitted
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleOption {
    pub value: Role,
    pub label: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterView {
    pub view: &'static str,
    pub title: &'static str,
    pub roles: Vec<RoleOption>,
    pub login_link: Route,
    pub notifications: Vec<Notification>,
}

impl RegisterView {
    pub fn new(notifications: Vec<Notification>) -> Self {
        let roles = Role::ALL
            .into_iter()
            .filter(Role::is_self_registrable)
            .map(|role| RoleOption {
                value: role,
                label: role.label(),
            })
            .collect();

        Self {
            view: "register",
            title: "Create an account",
            roles,
            login_link: Route::Login,
            notifications,
        }
    }
}

// ============================================================================
// Auth state
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStateResponse {
    pub phase: AuthPhase,
    pub is_loading: bool,
    pub user: Option<Identity>,
    pub profile: Option<ProfileView>,
    pub redirect_path: Route,
}

impl From<&AuthState> for AuthStateResponse {
    fn from(state: &AuthState) -> Self {
        Self {
            phase: state.phase(),
            is_loading: state.is_loading(),
            user: state.user.clone(),
            profile: state.profile.as_ref().map(ProfileView::from),
            redirect_path: state.redirect_path(),
        }
    }
}
