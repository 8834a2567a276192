//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, backend traits
//! - `application/` - Use cases, the per-client auth context, route guard
//! - `infra/` - Hosted backend, in-memory backend, runtime selection
//! - `presentation/` - HTTP handlers, view models, router, middleware
//!
//! ## Features
//! - Email + password registration with a role (citizen or officer)
//! - Sign in with a redirect to the role's dashboard
//! - One explicitly owned auth context per browser client
//! - Background token refresh and session change tracking
//! - Role-based route guard (wait / redirect / render)
//!
//! ## Security Model
//! - Credentials and sessions are managed by the hosted auth service
//! - Browsers only hold an opaque client identifier cookie
//! - Passwords and tokens are never logged or serialised

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use application::context::AuthContext;
pub use error::{AuthError, AuthResult};
pub use infra::AnyBackend;
pub use presentation::registry::ContextRegistry;
pub use presentation::router::{auth_router, guarded, with_client_context};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod guard {
    pub use crate::application::route_guard::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
