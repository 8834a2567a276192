//! Application Layer
//!
//! Use cases and the per-client auth context.

pub mod config;
pub mod context;
pub mod navigation;
pub mod notification;
pub mod resolve_profile;
pub mod route_guard;
pub mod session_store;
pub mod sign_in;
pub mod sign_out;
pub mod sign_up;
pub mod state;

// Re-exports
pub use config::{AuthConfig, RegistrationRecovery, SessionSyncPolicy};
pub use context::AuthContext;
pub use navigation::Navigator;
pub use notification::{Notification, NotificationVariant, Notifier};
pub use resolve_profile::ResolveProfileUseCase;
pub use route_guard::{AllowedRoles, GuardDecision, RedirectReason, evaluate};
pub use session_store::{AuthEvent, SessionChange, SessionStore};
pub use sign_in::{SignInInput, SignInOutput, SignInUseCase};
pub use sign_out::SignOutUseCase;
pub use sign_up::{SignUpInput, SignUpOutput, SignUpUseCase};
pub use state::{AuthPhase, AuthState, LoadingGuard};
