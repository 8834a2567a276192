//! Value Object Module

pub mod display_name;
pub mod email;
pub mod password;
pub mod role;
pub mod route;

pub use display_name::DisplayName;
pub use email::Email;
pub use kernel::id::IdentityId;
pub use password::Password;
pub use role::Role;
pub use route::Route;
