//! Observable auth state of one client

use serde::Serialize;
use tokio::sync::watch;

use crate::domain::entity::{Identity, Profile, Session};
use crate::domain::value_object::{Role, Route};

#[derive(Debug, Clone, Default)]
pub struct AuthState {
    pub user: Option<Identity>,
    pub profile: Option<Profile>,
    pub session: Option<Session>,
    /// Operations in flight; see [`LoadingGuard`]
    pending: u32,
    /// Sequence number of the session change this state reflects
    applied_seq: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthPhase {
    Initializing,
    Unauthenticated,
    AuthenticatedNoProfile,
    AuthenticatedWithProfile,
}

impl AuthState {
    /// Settled state
    pub fn new(user: Option<Identity>, profile: Option<Profile>, session: Option<Session>) -> Self {
        Self {
            user,
            profile,
            session,
            ..Default::default()
        }
    }

    #[cfg(test)]
    pub(crate) fn loading(mut self) -> Self {
        self.pending += 1;
        self
    }

    pub fn is_loading(&self) -> bool {
        self.pending > 0
    }

    /// A known user keeps its authenticated phase while work is in flight
    pub fn phase(&self) -> AuthPhase {
        match (&self.user, &self.profile) {
            (None, _) if self.is_loading() => AuthPhase::Initializing,
            (None, _) => AuthPhase::Unauthenticated,
            (Some(_), None) => AuthPhase::AuthenticatedNoProfile,
            (Some(_), Some(_)) => AuthPhase::AuthenticatedWithProfile,
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.profile.as_ref().map(|p| p.role)
    }

    /// Landing page for the current profile; `/` without one
    pub fn redirect_path(&self) -> Route {
        self.role().map_or(Route::Index, |role| role.dashboard())
    }

    pub(crate) fn applied_seq(&self) -> u64 {
        self.applied_seq
    }

    pub(crate) fn set_applied_seq(&mut self, seq: u64) {
        self.applied_seq = seq;
    }
}

/// Keeps `is_loading` raised for as long as it lives
pub struct LoadingGuard<'a> {
    state: &'a watch::Sender<AuthState>,
}

impl<'a> LoadingGuard<'a> {
    pub fn new(state: &'a watch::Sender<AuthState>) -> Self {
        state.send_modify(|s| s.pending += 1);
        Self { state }
    }

    /// Take over a pending count raised elsewhere
    pub(crate) fn adopt(state: &'a watch::Sender<AuthState>) -> Self {
        Self { state }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state
            .send_modify(|s| s.pending = s.pending.saturating_sub(1));
    }
}

pub(crate) fn initial_state() -> AuthState {
    AuthState {
        pending: 1,
        ..Default::default()
    }
}
