//! Auth Router

use axum::{
    Router,
    body::Body,
    http::Request,
    middleware::{self, Next},
    routing::get,
};
use std::sync::Arc;

use crate::domain::repository::{IdentityProvider, ProfileRepository};
use crate::presentation::handlers;
use crate::presentation::middleware::{RouteGuard, attach_context, require_roles};
use crate::presentation::registry::ContextRegistry;

/// Login, registration, logout, and auth state routes.
/// Needs [`with_client_context`] applied on the composed router.
pub fn auth_router<B>() -> Router
where
    B: IdentityProvider + ProfileRepository + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/login",
            get(handlers::login_page::<B>).post(handlers::login::<B>),
        )
        .route(
            "/register",
            get(handlers::register_page::<B>).post(handlers::register::<B>),
        )
        .route("/logout", axum::routing::post(handlers::logout::<B>))
        .route("/api/auth/state", get(handlers::auth_state::<B>))
}

/// Bind every request of `router` to its client's auth context
pub fn with_client_context<B>(router: Router, registry: Arc<ContextRegistry<B>>) -> Router
where
    B: IdentityProvider + ProfileRepository + Send + Sync + 'static,
{
    router.layer(middleware::from_fn(move |req: Request<Body>, next: Next| {
        attach_context(registry.clone(), req, next)
    }))
}

/// Put every route of `router` behind the route guard
pub fn guarded<B>(router: Router, guard: RouteGuard) -> Router
where
    B: IdentityProvider + ProfileRepository + Send + Sync + 'static,
{
    router.route_layer(middleware::from_fn(move |req: Request<Body>, next: Next| {
        require_roles::<B>(guard, req, next)
    }))
}
