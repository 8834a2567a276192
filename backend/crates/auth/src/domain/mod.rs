//! Domain Layer
//!
//! Contains entities, value objects, and the backend boundary traits.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{Identity, NewProfile, Profile, Session};
pub use repository::{IdentityProvider, ProfileRepository};
pub use value_object::{Role, Route};
