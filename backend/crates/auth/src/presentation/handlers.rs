//! HTTP Handlers
//!
//! Login, registration, logout, and the auth state endpoint. Every handler
//! works on the client's own [`AuthContext`](crate::application::AuthContext),
//! attached by [`attach_context`](super::middleware::attach_context).

use axum::extract::Extension;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::application::{Notification, SignUpInput};
use crate::domain::repository::{IdentityProvider, ProfileRepository};
use crate::domain::value_object::{Role, Route};
use crate::error::AuthError;
use crate::presentation::dto::{
    AuthStateResponse, LoginRequest, LoginView, RegisterRequest, RegisterView,
};
use crate::presentation::middleware::{ClientContext, redirect};

// ============================================================================
// Login
// ============================================================================

/// GET /login
pub async fn login_page<B>(Extension(ClientContext(context)): Extension<ClientContext<B>>) -> Response
where
    B: IdentityProvider + ProfileRepository + Send + Sync + 'static,
{
    let state = context.settled(context.config().guard_settle_timeout).await;
    if state.profile.is_some() {
        return redirect(state.redirect_path());
    }
    Json(LoginView::new(context.notifier().drain())).into_response()
}

/// POST /login
pub async fn login<B>(
    Extension(ClientContext(context)): Extension<ClientContext<B>>,
    Json(req): Json<LoginRequest>,
) -> Response
where
    B: IdentityProvider + ProfileRepository + Send + Sync + 'static,
{
    match context.sign_in(&req.email, &req.password).await {
        Ok(destination) => {
            let to = context.navigator().take().unwrap_or(destination);
            redirect(to)
        }
        Err(err) => (
            err.status_code(),
            Json(LoginView::new(context.notifier().drain())),
        )
            .into_response(),
    }
}

// ============================================================================
// Register
// ============================================================================

/// GET /register
pub async fn register_page<B>(
    Extension(ClientContext(context)): Extension<ClientContext<B>>,
) -> Response
where
    B: IdentityProvider + ProfileRepository + Send + Sync + 'static,
{
    Json(RegisterView::new(context.notifier().drain())).into_response()
}

/// POST /register
pub async fn register<B>(
    Extension(ClientContext(context)): Extension<ClientContext<B>>,
    Json(req): Json<RegisterRequest>,
) -> Response
where
    B: IdentityProvider + ProfileRepository + Send + Sync + 'static,
{
    let rejected = |err: AuthError, notification: Notification| {
        err.log();
        context.notifier().push(notification);
        (
            err.status_code(),
            Json(RegisterView::new(context.notifier().drain())),
        )
            .into_response()
    };

    if req.password != req.confirm_password {
        return rejected(
            AuthError::PasswordMismatch,
            Notification::error(
                "Passwords do not match",
                Some("Please ensure both passwords are identical.".to_string()),
            ),
        );
    }

    let code = req.role.as_deref().unwrap_or(Role::Citizen.code());
    let role = match Role::from_code(code) {
        Ok(role) if role.is_self_registrable() => role,
        Ok(role) => {
            let err = AuthError::RoleNotSelectable(role.label().to_string());
            let message = err.user_message();
            return rejected(err, Notification::error("Registration failed", Some(message)));
        }
        Err(e) => {
            let err = AuthError::from(e);
            let message = err.user_message();
            return rejected(err, Notification::error("Registration failed", Some(message)));
        }
    };

    let input = SignUpInput {
        email: req.email,
        password: req.password,
        role,
        name: req.name,
    };

    match context.sign_up(input).await {
        Ok(output) if output.session.is_some() => redirect(output.role.dashboard()),
        Ok(_) => redirect(Route::Login),
        Err(err) => (
            err.status_code(),
            Json(RegisterView::new(context.notifier().drain())),
        )
            .into_response(),
    }
}

// ============================================================================
// Logout
// ============================================================================

/// POST /logout
pub async fn logout<B>(Extension(ClientContext(context)): Extension<ClientContext<B>>) -> Response
where
    B: IdentityProvider + ProfileRepository + Send + Sync + 'static,
{
    // Local state is already cleared on failure
    let _ = context.sign_out().await;
    let to = context.navigator().take().unwrap_or(Route::Index);
    redirect(to)
}

// ============================================================================
// Auth State
// ============================================================================

/// GET /api/auth/state
pub async fn auth_state<B>(
    Extension(ClientContext(context)): Extension<ClientContext<B>>,
) -> Json<AuthStateResponse>
where
    B: IdentityProvider + ProfileRepository + Send + Sync + 'static,
{
    Json(AuthStateResponse::from(&context.state()))
}
