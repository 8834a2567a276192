//! Portal Backend Module
//!
//! Everything a signed-in CivGuard user sees besides the auth pages.
//!
//! Clean Architecture structure:
//! - `domain/` - Navigation table, issue categories, sample statistics, classifier trait
//! - `application/` - Dashboard shell, role dashboards, report use cases
//! - `infra/` - Simulated image classifier
//! - `presentation/` - HTTP handlers, view models, router
//!
//! Every page except `/` sits behind the auth route guard with the roles of
//! the navigation table. Reports are validated and acknowledged but not
//! stored; dashboard figures are static.

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::PortalConfig;
pub use error::{PortalError, PortalResult};
pub use infra::SimulatedClassifier;
pub use presentation::router::{portal_router, portal_router_generic};

pub mod models {
    pub use crate::domain::report::*;
    pub use crate::presentation::dto::*;
}
