//! Presentation Layer
//!
//! HTTP handlers, view models, and the router.

pub mod dto;
pub mod handlers;
pub mod router;

pub use router::{portal_router, portal_router_generic};
