//! Auth Middleware
//!
//! `attach_context` binds every request to its client's [`AuthContext`];
//! `require_roles` runs the route guard in front of protected handlers.

use axum::Json;
use axum::body::Body;
use axum::http::{HeaderValue, Request, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use platform::cookie::{extract_cookie, set_cookie_header};
use std::sync::Arc;
use std::time::Duration;

use crate::application::{
    AllowedRoles, AuthContext, GuardDecision, Notification, Notifier, RedirectReason, evaluate,
};
use crate::domain::entity::Profile;
use crate::domain::repository::{IdentityProvider, ProfileRepository};
use crate::domain::value_object::{Role, Route};
use crate::error::AuthError;
use crate::presentation::dto::LoadingView;
use crate::presentation::registry::ContextRegistry;

/// Seconds a client should wait before retrying a loading page
const RETRY_AFTER_SECS: u64 = 1;

/// Request extension holding the client's context
pub struct ClientContext<B>(pub Arc<AuthContext<B>>);

impl<B> Clone for ClientContext<B> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

/// Signed-in viewer of a guarded page
#[derive(Clone)]
pub struct Viewer {
    pub profile: Profile,
    pub path: String,
    notifier: Arc<Notifier>,
}

impl Viewer {
    pub fn role(&self) -> Role {
        self.profile.role
    }

    /// Queue a notification for the next rendered view
    pub fn notify(&self, notification: Notification) {
        self.notifier.push(notification);
    }

    /// Take the notifications pending for this client
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifier.drain()
    }
}

/// Resolve (or create) the client context and expose it to handlers
pub async fn attach_context<B>(
    registry: Arc<ContextRegistry<B>>,
    mut req: Request<Body>,
    next: Next,
) -> Response
where
    B: IdentityProvider + ProfileRepository + Send + Sync + 'static,
{
    let cookie_name = &registry.config().client_cookie_name;
    let client_id = extract_cookie(req.headers(), cookie_name);
    let resolved = registry.resolve(client_id.as_deref());

    req.extensions_mut()
        .insert(ClientContext(resolved.context.clone()));

    let mut response = next.run(req).await;

    if resolved.is_new {
        match set_cookie_header(&registry.config().client_cookie(), &resolved.id) {
            Some(cookie) => {
                response.headers_mut().append(header::SET_COOKIE, cookie);
            }
            None => tracing::error!("Client cookie could not be encoded"),
        }
    }

    response
}

/// Guard settings for one group of routes
#[derive(Debug, Clone, Copy)]
pub struct RouteGuard {
    pub allowed: AllowedRoles,
    /// How long to wait for an in-flight auth operation before answering
    pub settle_timeout: Duration,
}

impl RouteGuard {
    pub fn new(allowed: AllowedRoles, settle_timeout: Duration) -> Self {
        Self {
            allowed,
            settle_timeout,
        }
    }
}

/// Middleware that renders, redirects, or asks the client to retry
pub async fn require_roles<B>(guard: RouteGuard, mut req: Request<Body>, next: Next) -> Response
where
    B: IdentityProvider + ProfileRepository + Send + Sync + 'static,
{
    let Some(ClientContext(context)) = req.extensions().get::<ClientContext<B>>().cloned() else {
        tracing::error!(path = %req.uri().path(), "Guarded route without client context");
        return AuthError::Internal("client context missing".to_string()).into_response();
    };

    let state = context.settled(guard.settle_timeout).await;

    match evaluate(&state, guard.allowed) {
        GuardDecision::Wait => {
            let view = LoadingView::new(state.phase(), RETRY_AFTER_SECS);
            (
                StatusCode::ACCEPTED,
                [(header::RETRY_AFTER, HeaderValue::from(RETRY_AFTER_SECS))],
                Json(view),
            )
                .into_response()
        }
        GuardDecision::Redirect { to, reason } => {
            if reason == RedirectReason::ProfileMissing {
                tracing::warn!(
                    identity_id = ?state.user.as_ref().map(|u| u.id),
                    "Signed in without a profile"
                );
                context.notifier().push(Notification::error(
                    "Profile not found",
                    Some("Your user profile could not be found. Please sign in again.".to_string()),
                ));
            }
            tracing::debug!(path = %req.uri().path(), to = %to, reason = ?reason, "Guard redirect");
            redirect(to)
        }
        GuardDecision::Render => {
            let Some(profile) = state.profile else {
                return AuthError::ProfileNotFound.into_response();
            };
            let viewer = Viewer {
                profile,
                path: req.uri().path().to_string(),
                notifier: context.notifier().clone(),
            };
            req.extensions_mut().insert(viewer);
            next.run(req).await
        }
    }
}

/// `303 See Other` to a route
pub fn redirect(to: Route) -> Response {
    Redirect::to(to.path()).into_response()
}
