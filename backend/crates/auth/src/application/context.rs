//! Auth Context
//!
//! Single source of truth for who is signed in on one browser client.
//!
//! The context is the only writer of its [`AuthState`]; readers subscribe
//! through a `watch` channel. A background listener follows the
//! [`SessionStore`], re-derives user and session on every change, loads the
//! matching profile, and refreshes the access token before it expires. The
//! listener only holds a weak reference and stops once the context is
//! dropped.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::application::config::{AuthConfig, SessionSyncPolicy};
use crate::application::navigation::Navigator;
use crate::application::notification::{Notification, Notifier};
use crate::application::resolve_profile::ResolveProfileUseCase;
use crate::application::session_store::{AuthEvent, SessionChange, SessionStore};
use crate::application::sign_in::{SignInInput, SignInUseCase};
use crate::application::sign_out::SignOutUseCase;
use crate::application::sign_up::{SignUpInput, SignUpOutput, SignUpUseCase};
use crate::application::state::{AuthState, LoadingGuard, initial_state};
use crate::domain::entity::Session;
use crate::domain::repository::{IdentityProvider, ProfileRepository};
use crate::domain::value_object::Route;
use crate::error::AuthResult;

/// Never refresh more often than this, even for very short-lived tokens
const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Listener,
    Manual,
}

/// Counts manual calls in flight for [`SessionSyncPolicy::SuppressListenerDuringCalls`]
struct ManualCall<'a>(&'a AtomicUsize);

impl<'a> ManualCall<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for ManualCall<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct AuthContext<B> {
    backend: Arc<B>,
    config: Arc<AuthConfig>,
    store: SessionStore,
    state: watch::Sender<AuthState>,
    manual_calls: AtomicUsize,
    notifier: Arc<Notifier>,
    navigator: Navigator,
}

impl<B> AuthContext<B>
where
    B: IdentityProvider + ProfileRepository + Send + Sync + 'static,
{
    /// Create a context with no session and start its listener.
    /// Must be called inside a tokio runtime.
    pub fn new(backend: Arc<B>, config: Arc<AuthConfig>) -> Arc<Self> {
        Self::with_session(backend, config, None)
    }

    /// Create a context seeded with an existing session
    pub fn with_session(
        backend: Arc<B>,
        config: Arc<AuthConfig>,
        initial: Option<Session>,
    ) -> Arc<Self> {
        let (state, _rx) = watch::channel(initial_state());
        let context = Arc::new(Self {
            backend,
            config,
            store: SessionStore::new(initial),
            state,
            manual_calls: AtomicUsize::new(0),
            notifier: Arc::new(Notifier::new()),
            navigator: Navigator::default(),
        });

        let listener = run_listener(Arc::downgrade(&context), context.store.subscribe());
        tokio::spawn(listener);
        context
    }

    // ------------------------------------------------------------------
    // Readers
    // ------------------------------------------------------------------

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// Wait until no operation is in flight, or `timeout` elapses
    pub async fn settled(&self, timeout: Duration) -> AuthState {
        let mut rx = self.state.subscribe();
        if tokio::time::timeout(timeout, rx.wait_for(|s| !s.is_loading()))
            .await
            .is_err()
        {
            tracing::debug!(timeout_ms = timeout.as_millis() as u64, "Auth state still loading");
        }
        self.state()
    }

    /// Landing page for the current profile; `/` without one
    pub fn redirect_path(&self) -> Route {
        self.state.borrow().redirect_path()
    }

    pub fn session_store(&self) -> &SessionStore {
        &self.store
    }

    pub fn notifier(&self) -> &Arc<Notifier> {
        &self.notifier
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Manual operations
    // ------------------------------------------------------------------

    /// Register an identity and its profile
    pub async fn sign_up(&self, input: SignUpInput) -> AuthResult<SignUpOutput> {
        let _loading = LoadingGuard::new(&self.state);
        let _manual = ManualCall::enter(&self.manual_calls);

        let use_case = SignUpUseCase::new(self.backend.clone(), self.config.clone());
        match use_case.execute(input).await {
            Ok(output) => {
                if let Some(session) = &output.session {
                    let change = self.store.publish(AuthEvent::SignedIn, Some(session.clone()));
                    self.apply_change(change, Origin::Manual).await;
                }
                self.notifier.push(Notification::success(
                    "Registration successful",
                    "Your account has been created.",
                ));
                Ok(output)
            }
            Err(err) => {
                err.log();
                self.notifier.push(Notification::error(
                    "Registration failed",
                    Some(err.user_message()),
                ));
                Err(err)
            }
        }
    }

    /// Authenticate, then navigate to the role's dashboard
    pub async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Route> {
        let _loading = LoadingGuard::new(&self.state);
        let _manual = ManualCall::enter(&self.manual_calls);

        let use_case = SignInUseCase::new(self.backend.clone());
        let input = SignInInput {
            email: email.to_string(),
            password: password.to_string(),
        };

        match use_case.execute(input).await {
            Ok(output) => {
                let change = self
                    .store
                    .publish(AuthEvent::SignedIn, Some(output.session));
                self.apply_change(change, Origin::Manual).await;

                self.notifier.push(Notification::success(
                    "Login successful",
                    "Welcome back to CivGuard.",
                ));
                self.navigator.navigate(output.destination);
                Ok(output.destination)
            }
            Err(err) => {
                err.log();
                self.notifier.push(Notification::error(
                    "Login failed",
                    Some(err.user_message()),
                ));
                Err(err)
            }
        }
    }

    /// Revoke the remote session, clear local state, navigate to `/`.
    /// Local state is cleared even when the remote call fails.
    pub async fn sign_out(&self) -> AuthResult<()> {
        let _loading = LoadingGuard::new(&self.state);
        let _manual = ManualCall::enter(&self.manual_calls);

        let session = self.store.session();
        let use_case = SignOutUseCase::new(self.backend.clone());
        let remote = use_case.execute(session.as_ref()).await;

        let change = self.store.publish(AuthEvent::SignedOut, None);
        self.apply_change(change, Origin::Manual).await;

        match &remote {
            Ok(()) => self.notifier.push(Notification::success(
                "Logged out",
                "You have been successfully logged out.",
            )),
            Err(err) => {
                err.log();
                self.notifier
                    .push(Notification::error("Logout error", Some(err.user_message())));
            }
        }

        self.navigator.navigate(Route::Index);
        remote
    }

    /// Exchange the refresh token for a new session. A failed refresh ends
    /// the session.
    pub async fn refresh_session(&self) -> AuthResult<()> {
        let Some(session) = self.store.session() else {
            return Ok(());
        };

        match self.backend.refresh_session(&session.refresh_token).await {
            Ok(refreshed) => {
                tracing::debug!(identity_id = %refreshed.identity.id, "Session refreshed");
                self.store.publish(AuthEvent::TokenRefreshed, Some(refreshed));
                Ok(())
            }
            Err(err) => {
                tracing::warn!(
                    identity_id = %session.identity.id,
                    error = %err,
                    "Session refresh failed"
                );
                self.store.publish(AuthEvent::SignedOut, None);
                self.notifier.push(Notification::error(
                    "Session expired",
                    Some("Please sign in again.".to_string()),
                ));
                Err(err)
            }
        }
    }

    // ------------------------------------------------------------------
    // State derivation
    // ------------------------------------------------------------------

    fn converges(&self) -> bool {
        self.config.session_sync == SessionSyncPolicy::ConvergeOnLatest
    }

    /// Re-derive user and session from a change, then load the profile
    async fn apply_change(&self, change: SessionChange, origin: Origin) {
        if origin == Origin::Listener {
            match self.config.session_sync {
                SessionSyncPolicy::SuppressListenerDuringCalls
                    if self.manual_calls.load(Ordering::SeqCst) > 0 =>
                {
                    tracing::debug!(seq = change.seq, "Listener suppressed during manual call");
                    return;
                }
                SessionSyncPolicy::ConvergeOnLatest
                    if change.seq <= self.state.borrow().applied_seq() =>
                {
                    tracing::debug!(seq = change.seq, "Change already applied");
                    return;
                }
                _ => {}
            }
        }

        let _loading = LoadingGuard::new(&self.state);
        let converge = self.converges();
        let user = change.session.as_ref().map(|s| s.identity.clone());

        let mut superseded = false;
        self.state.send_modify(|state| {
            if converge && change.seq < state.applied_seq() {
                superseded = true;
                return;
            }
            let same_user = matches!(
                (&state.profile, &user),
                (Some(profile), Some(identity)) if profile.id == identity.id
            );
            if !same_user {
                state.profile = None;
            }
            state.user = user;
            state.session = change.session.clone();
            state.set_applied_seq(change.seq);
        });

        if superseded {
            tracing::debug!(seq = change.seq, "Discarding superseded session change");
            return;
        }

        tracing::debug!(seq = change.seq, event = ?change.event, origin = ?origin, "Session change applied");

        let Some(session) = change.session else {
            return;
        };

        let resolver = ResolveProfileUseCase::new(self.backend.clone());
        let result = resolver
            .execute(&session.identity.id, Some(&session.access_token))
            .await;

        self.state.send_modify(|state| {
            if converge && state.applied_seq() != change.seq {
                tracing::debug!(seq = change.seq, "Discarding stale profile result");
                return;
            }
            match result {
                Ok(profile) => state.profile = profile,
                Err(_) => state.profile = None,
            }
        });
    }

    /// When the listener should refresh the current session
    fn refresh_deadline(&self) -> Option<Instant> {
        let state = self.state.borrow();
        let session = state.session.as_ref()?;
        let wait = session
            .refresh_in(self.config.refresh_margin)
            .max(MIN_REFRESH_INTERVAL);
        Some(Instant::now() + wait)
    }
}

async fn run_listener<B>(context: Weak<AuthContext<B>>, mut changes: watch::Receiver<SessionChange>)
where
    B: IdentityProvider + ProfileRepository + Send + Sync + 'static,
{
    // Initial session resolution; takes over the pending count the state
    // was created with.
    {
        let Some(ctx) = context.upgrade() else {
            return;
        };
        let change = changes.borrow_and_update().clone();
        let _initial = LoadingGuard::adopt(&ctx.state);
        ctx.apply_change(change, Origin::Listener).await;
    }

    loop {
        let deadline = match context.upgrade() {
            Some(ctx) => ctx.refresh_deadline(),
            None => break,
        };
        let refresh_due = async {
            match deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                let change = changes.borrow_and_update().clone();
                let Some(ctx) = context.upgrade() else {
                    break;
                };
                ctx.apply_change(change, Origin::Listener).await;
            }
            _ = refresh_due => {
                let Some(ctx) = context.upgrade() else {
                    break;
                };
                // Errors are logged and surfaced as a notification
                let _ = ctx.refresh_session().await;
            }
        }
    }

    tracing::debug!("Session listener stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::config::RegistrationRecovery;
    use crate::application::notification::NotificationVariant;
    use crate::application::state::AuthPhase;
    use crate::domain::value_object::{Email, Password, Role};
    use crate::error::AuthError;
    use crate::infra::{BackendOperation, InMemoryBackend};

    const WAIT: Duration = Duration::from_secs(2);

    fn context_with(backend: &InMemoryBackend, config: AuthConfig) -> Arc<AuthContext<InMemoryBackend>> {
        AuthContext::new(Arc::new(backend.clone()), Arc::new(config))
    }

    fn context(backend: &InMemoryBackend) -> Arc<AuthContext<InMemoryBackend>> {
        context_with(backend, AuthConfig::development())
    }

    fn registration(email: &str, role: Role, name: Option<&str>) -> SignUpInput {
        SignUpInput {
            email: email.to_string(),
            password: "secret1".to_string(),
            role,
            name: name.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_initial_state_resolves_to_unauthenticated() {
        let backend = InMemoryBackend::new();
        let ctx = context(&backend);

        let state = ctx.settled(WAIT).await;
        assert_eq!(state.phase(), AuthPhase::Unauthenticated);
        assert_eq!(ctx.redirect_path(), Route::Index);
    }

    #[tokio::test]
    async fn test_initial_session_loads_profile() {
        let backend = InMemoryBackend::new();
        backend.seed_account("alex@city.gov", "secret1", Some(Role::Admin), Some("Alex"));
        let session = backend
            .sign_in_with_password(
                &Email::new("alex@city.gov").unwrap(),
                &Password::for_sign_in("secret1"),
            )
            .await
            .unwrap();

        let ctx = AuthContext::with_session(
            Arc::new(backend),
            Arc::new(AuthConfig::development()),
            Some(session),
        );

        let state = ctx.settled(WAIT).await;
        assert_eq!(state.phase(), AuthPhase::AuthenticatedWithProfile);
        assert_eq!(ctx.redirect_path(), Route::AdminDashboard);
    }

    #[tokio::test]
    async fn test_sign_up_then_profile_has_role_and_name() {
        let backend = InMemoryBackend::new();
        let ctx = context(&backend);
        ctx.settled(WAIT).await;

        ctx.sign_up(registration("morgan@city.gov", Role::Officer, Some("  Morgan ")))
            .await
            .unwrap();

        let profile = ctx.settled(WAIT).await.profile.unwrap();
        assert_eq!(profile.role, Role::Officer);
        assert_eq!(profile.name.as_deref(), Some("  Morgan "));
        assert_eq!(profile.display_name(), "Morgan");
        assert_eq!(ctx.redirect_path(), Route::MunicipalDashboard);

        let titles: Vec<_> = ctx.notifier().drain().into_iter().map(|n| n.title).collect();
        assert_eq!(titles, vec!["Registration successful"]);
    }

    #[tokio::test]
    async fn test_sign_up_without_session_stays_signed_out() {
        let backend = InMemoryBackend::with_options(false, Duration::from_secs(3600));
        let ctx = context(&backend);
        ctx.settled(WAIT).await;

        let output = ctx
            .sign_up(registration("casey@city.gov", Role::Citizen, None))
            .await
            .unwrap();

        assert!(output.session.is_none());
        assert!(backend.profile(&output.identity.id).is_some());
        assert_eq!(ctx.settled(WAIT).await.phase(), AuthPhase::Unauthenticated);
    }

    #[tokio::test]
    async fn test_sign_up_profile_failure_is_reported() {
        let backend = InMemoryBackend::new();
        backend.set_failing(BackendOperation::InsertProfile, true);
        let config = AuthConfig {
            registration_recovery: RegistrationRecovery::Compensate,
            ..AuthConfig::development()
        };
        let ctx = context_with(&backend, config);
        ctx.settled(WAIT).await;

        let result = ctx
            .sign_up(registration("casey@city.gov", Role::Citizen, None))
            .await;

        assert!(result.is_err());
        assert!(!backend.has_account("casey@city.gov"));
        let notifications = ctx.notifier().drain();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].title, "Registration failed");
        assert_eq!(ctx.state().phase(), AuthPhase::Unauthenticated);
    }

    #[tokio::test]
    async fn test_sign_in_success_navigates_to_dashboard() {
        let backend = InMemoryBackend::new();
        backend.seed_account("casey@city.gov", "secret1", Some(Role::Citizen), Some("Casey"));
        let ctx = context(&backend);
        ctx.settled(WAIT).await;

        let destination = ctx.sign_in("casey@city.gov", "secret1").await.unwrap();

        assert_eq!(destination, Route::Dashboard);
        assert_eq!(ctx.navigator().peek(), Some(Route::Dashboard));
        let state = ctx.settled(WAIT).await;
        assert_eq!(state.phase(), AuthPhase::AuthenticatedWithProfile);
        assert_eq!(state.profile.unwrap().display_name(), "Casey");
    }

    #[tokio::test]
    async fn test_sign_in_rejected_credentials() {
        let backend = InMemoryBackend::new();
        backend.seed_account("casey@city.gov", "secret1", Some(Role::Citizen), None);
        let ctx = context(&backend);
        ctx.settled(WAIT).await;

        backend.pause();
        let call = tokio::spawn({
            let ctx = ctx.clone();
            async move { ctx.sign_in("casey@city.gov", "wrong-password").await }
        });

        let mut rx = ctx.subscribe();
        tokio::time::timeout(WAIT, rx.wait_for(|s| s.is_loading()))
            .await
            .expect("sign in never started loading")
            .unwrap();
        assert!(ctx.state().is_loading());

        backend.resume();
        let result = call.await.unwrap();

        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
        assert!(!ctx.state().is_loading());
        assert_eq!(ctx.navigator().peek(), None);

        let notifications = ctx.notifier().drain();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].title, "Login failed");
        assert_eq!(notifications[0].variant, NotificationVariant::Destructive);
    }

    #[tokio::test]
    async fn test_sign_out_clears_state_even_when_remote_fails() {
        let backend = InMemoryBackend::new();
        backend.seed_account("casey@city.gov", "secret1", Some(Role::Citizen), None);
        let ctx = context(&backend);
        ctx.sign_in("casey@city.gov", "secret1").await.unwrap();
        ctx.settled(WAIT).await;
        ctx.notifier().drain();

        backend.set_failing(BackendOperation::SignOut, true);
        assert!(ctx.sign_out().await.is_err());

        let state = ctx.settled(WAIT).await;
        assert!(state.user.is_none());
        assert!(state.profile.is_none());
        assert!(state.session.is_none());
        assert_eq!(ctx.navigator().take(), Some(Route::Index));
        assert_eq!(ctx.notifier().drain()[0].title, "Logout error");
    }

    #[tokio::test]
    async fn test_sign_out_revokes_remote_session() {
        let backend = InMemoryBackend::new();
        backend.seed_account("casey@city.gov", "secret1", Some(Role::Citizen), None);
        let ctx = context(&backend);
        ctx.sign_in("casey@city.gov", "secret1").await.unwrap();
        assert_eq!(backend.active_sessions(), 1);

        ctx.sign_out().await.unwrap();
        assert_eq!(backend.active_sessions(), 0);
        assert_eq!(ctx.settled(WAIT).await.phase(), AuthPhase::Unauthenticated);
    }

    #[tokio::test]
    async fn test_listener_follows_external_session_changes() {
        let backend = InMemoryBackend::new();
        backend.seed_account("casey@city.gov", "secret1", Some(Role::Citizen), None);
        let ctx = context(&backend);
        ctx.sign_in("casey@city.gov", "secret1").await.unwrap();
        ctx.settled(WAIT).await;

        // Another tab signs out through the shared store
        ctx.session_store().publish(AuthEvent::SignedOut, None);

        let mut rx = ctx.subscribe();
        tokio::time::timeout(WAIT, rx.wait_for(|s| s.user.is_none() && !s.is_loading()))
            .await
            .expect("listener never applied the change")
            .unwrap();
    }

    #[tokio::test]
    async fn test_stale_listener_change_is_discarded() {
        let backend = InMemoryBackend::new();
        backend.seed_account("casey@city.gov", "secret1", Some(Role::Citizen), None);
        let ctx = context(&backend);
        ctx.settled(WAIT).await;

        ctx.sign_in("casey@city.gov", "secret1").await.unwrap();
        let applied = ctx.state().applied_seq();
        assert_eq!(applied, ctx.session_store().latest_seq());

        // Replaying the already-applied change must not reset the profile
        let change = ctx.session_store().current();
        ctx.apply_change(change, Origin::Listener).await;
        assert!(ctx.state().profile.is_some());
        assert_eq!(ctx.state().applied_seq(), applied);
    }

    #[tokio::test]
    async fn test_suppressed_listener_skips_during_manual_call() {
        let backend = InMemoryBackend::new();
        let config = AuthConfig {
            session_sync: SessionSyncPolicy::SuppressListenerDuringCalls,
            ..AuthConfig::development()
        };
        let ctx = context_with(&backend, config);
        ctx.settled(WAIT).await;

        let _manual = ManualCall::enter(&ctx.manual_calls);
        let change = ctx.session_store().publish(AuthEvent::SignedOut, None);
        let before = ctx.state().applied_seq();
        ctx.apply_change(change, Origin::Listener).await;
        assert_eq!(ctx.state().applied_seq(), before);
    }

    #[tokio::test]
    async fn test_failed_refresh_ends_session() {
        let backend = InMemoryBackend::new();
        backend.seed_account("casey@city.gov", "secret1", Some(Role::Citizen), None);
        let ctx = context(&backend);
        ctx.sign_in("casey@city.gov", "secret1").await.unwrap();
        ctx.settled(WAIT).await;
        ctx.notifier().drain();

        backend.revoke_all_sessions();
        assert!(ctx.refresh_session().await.is_err());

        let mut rx = ctx.subscribe();
        tokio::time::timeout(WAIT, rx.wait_for(|s| s.user.is_none() && !s.is_loading()))
            .await
            .expect("sign out never applied")
            .unwrap();
        assert_eq!(ctx.notifier().drain()[0].title, "Session expired");
    }

    #[tokio::test]
    async fn test_refresh_keeps_profile() {
        let backend = InMemoryBackend::new();
        backend.seed_account("casey@city.gov", "secret1", Some(Role::Citizen), None);
        let ctx = context(&backend);
        ctx.sign_in("casey@city.gov", "secret1").await.unwrap();
        let before = ctx.settled(WAIT).await.session.unwrap();

        ctx.refresh_session().await.unwrap();

        let mut rx = ctx.subscribe();
        let state = tokio::time::timeout(
            WAIT,
            rx.wait_for(|s| {
                !s.is_loading()
                    && s.session
                        .as_ref()
                        .is_some_and(|s| s.access_token != before.access_token)
            }),
        )
        .await
        .expect("refreshed session never applied")
        .unwrap()
        .clone();
        assert!(state.profile.is_some());
    }

    #[tokio::test]
    async fn test_listener_stops_when_context_dropped() {
        let backend = InMemoryBackend::new();
        let ctx = context(&backend);
        ctx.settled(WAIT).await;
        let weak = Arc::downgrade(&ctx);

        drop(ctx);
        tokio::task::yield_now().await;
        assert!(weak.upgrade().is_none());
    }
}
