//! Presentation Layer
//!
//! HTTP handlers, view models, router, middleware, and the client registry.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod registry;
pub mod router;

#[cfg(test)]
mod tests;

pub use middleware::{ClientContext, RouteGuard, Viewer, attach_context, redirect, require_roles};
pub use registry::{ContextRegistry, ResolvedClient};
pub use router::{auth_router, guarded, with_client_context};
