//! Entity Module

pub mod identity;
pub mod profile;
pub mod session;

pub use identity::Identity;
pub use profile::{NewProfile, Profile};
pub use session::{AccessToken, AccountCreated, RefreshToken, Session};
