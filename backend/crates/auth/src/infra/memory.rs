//! In-Memory Backend
//!
//! Process-local stand-in for the hosted backend, used for local
//! development and tests. Supports failure injection per operation and a
//! gate that holds every call until released.

use chrono::Utc;
use platform::crypto::random_token;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;

use crate::domain::entity::{
    AccessToken, AccountCreated, Identity, NewProfile, Profile, RefreshToken, Session,
};
use crate::domain::repository::{IdentityProvider, ProfileRepository};
use crate::domain::value_object::{Email, IdentityId, Password, Role};
use crate::error::{AuthError, AuthResult};

/// Only the most recent operations are kept in the call log
pub const MAX_RECORDED_CALLS: usize = 256;

/// Backend operations that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendOperation {
    CreateAccount,
    SignIn,
    SignOut,
    RefreshSession,
    DeleteAccount,
    FindProfile,
    FindRole,
    InsertProfile,
}

impl fmt::Display for BackendOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

struct Account {
    identity: Identity,
    password: String,
}

#[derive(Default)]
struct Store {
    accounts: HashMap<String, Account>,
    profiles: HashMap<IdentityId, Profile>,
    access_tokens: HashMap<String, IdentityId>,
    refresh_tokens: HashMap<String, IdentityId>,
}

struct Inner {
    store: Mutex<Store>,
    failing: Mutex<HashSet<BackendOperation>>,
    calls: Mutex<VecDeque<BackendOperation>>,
    paused: watch::Sender<bool>,
    auto_confirm: bool,
    session_ttl: Duration,
}

/// Cheap to clone; clones share state
#[derive(Clone)]
pub struct InMemoryBackend {
    inner: Arc<Inner>,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InMemoryBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryBackend")
            .field("auto_confirm", &self.inner.auto_confirm)
            .field("session_ttl", &self.inner.session_ttl)
            .finish_non_exhaustive()
    }
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::with_options(true, Duration::from_secs(3600))
    }

    /// `auto_confirm = false` behaves like a provider that requires email
    /// confirmation: sign-up returns no session
    pub fn with_options(auto_confirm: bool, session_ttl: Duration) -> Self {
        let (paused, _rx) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                store: Mutex::new(Store::default()),
                failing: Mutex::new(HashSet::new()),
                calls: Mutex::new(VecDeque::with_capacity(MAX_RECORDED_CALLS)),
                paused,
                auto_confirm,
                session_ttl,
            }),
        }
    }

    /// Backend pre-populated with one account per role
    /// (`citizen@civguard.local`, `officer@civguard.local`,
    /// `admin@civguard.local`; password `civguard`)
    pub fn with_demo_accounts() -> Self {
        let backend = Self::new();
        for (email, role, name) in [
            ("citizen@civguard.local", Role::Citizen, "Casey Citizen"),
            ("officer@civguard.local", Role::Officer, "Morgan Officer"),
            ("admin@civguard.local", Role::Admin, "Alex Admin"),
        ] {
            backend.seed_account(email, "civguard", Some(role), Some(name));
        }
        backend
    }

    // ------------------------------------------------------------------
    // Test and development controls
    // ------------------------------------------------------------------

    /// Create an identity directly. `role = None` leaves it without a profile.
    pub fn seed_account(
        &self,
        email: &str,
        password: &str,
        role: Option<Role>,
        name: Option<&str>,
    ) -> IdentityId {
        let identity = Identity::new(IdentityId::new(), email.trim().to_lowercase());
        let id = identity.id;

        let mut store = self.lock_store();
        if let Some(role) = role {
            store.profiles.insert(
                id,
                Profile {
                    id,
                    email: identity.email.clone(),
                    role,
                    name: name.map(str::to_string),
                    created_at: Utc::now(),
                },
            );
        }
        store.accounts.insert(
            identity.email.clone(),
            Account {
                identity,
                password: password.to_string(),
            },
        );
        id
    }

    /// Make every call of `operation` fail until cleared
    pub fn set_failing(&self, operation: BackendOperation, failing: bool) {
        let mut set = self.inner.failing.lock().unwrap_or_else(PoisonError::into_inner);
        if failing {
            set.insert(operation);
        } else {
            set.remove(&operation);
        }
    }

    /// Hold every call until [`resume`](Self::resume)
    pub fn pause(&self) {
        self.inner.paused.send_replace(true);
    }

    pub fn resume(&self) {
        self.inner.paused.send_replace(false);
    }

    /// Most recent operations invoked, oldest first
    pub fn calls(&self) -> Vec<BackendOperation> {
        let calls = self.inner.calls.lock().unwrap_or_else(PoisonError::into_inner);
        calls.iter().copied().collect()
    }

    pub fn profile(&self, id: &IdentityId) -> Option<Profile> {
        self.lock_store().profiles.get(id).cloned()
    }

    pub fn has_account(&self, email: &str) -> bool {
        self.lock_store().accounts.contains_key(&email.trim().to_lowercase())
    }

    pub fn active_sessions(&self) -> usize {
        self.lock_store().access_tokens.len()
    }

    /// Forget every issued token, as if they had all expired
    pub fn revoke_all_sessions(&self) {
        let mut store = self.lock_store();
        store.access_tokens.clear();
        store.refresh_tokens.clear();
    }

    /// Change a stored role behind the application's back
    pub fn set_role(&self, id: &IdentityId, role: Role) {
        if let Some(profile) = self.lock_store().profiles.get_mut(id) {
            profile.role = role;
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn lock_store(&self) -> std::sync::MutexGuard<'_, Store> {
        self.inner.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the call, wait while paused, apply injected failures
    async fn enter(&self, operation: BackendOperation) -> AuthResult<()> {
        {
            let mut calls = self.inner.calls.lock().unwrap_or_else(PoisonError::into_inner);
            if calls.len() >= MAX_RECORDED_CALLS {
                calls.pop_front();
            }
            calls.push_back(operation);
        }

        let mut paused = self.inner.paused.subscribe();
        // The sender lives in `self`, so this only fails if it was dropped
        let _ = paused.wait_for(|paused| !*paused).await;

        let failing = self
            .inner
            .failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&operation);
        if failing {
            return Err(AuthError::Unavailable(format!("{operation} failed (injected)")));
        }
        Ok(())
    }

    fn issue_session(&self, store: &mut Store, identity: &Identity) -> Session {
        let access = random_token(24);
        let refresh = random_token(24);
        store.access_tokens.insert(access.clone(), identity.id);
        store.refresh_tokens.insert(refresh.clone(), identity.id);

        let ttl = chrono::Duration::from_std(self.inner.session_ttl)
            .unwrap_or_else(|_| chrono::Duration::hours(1));
        Session {
            identity: identity.clone(),
            access_token: AccessToken::new(access),
            refresh_token: RefreshToken::new(refresh),
            expires_at: Utc::now() + ttl,
        }
    }
}

impl IdentityProvider for InMemoryBackend {
    async fn create_account(&self, email: &Email, password: &Password) -> AuthResult<AccountCreated> {
        self.enter(BackendOperation::CreateAccount).await?;

        let mut store = self.lock_store();
        if store.accounts.contains_key(email.as_str()) {
            return Err(AuthError::AccountExists("User already registered".to_string()));
        }

        let identity = Identity::new(IdentityId::new(), email.as_str());
        store.accounts.insert(
            email.as_str().to_string(),
            Account {
                identity: identity.clone(),
                password: password.expose().to_string(),
            },
        );

        let session = self
            .inner
            .auto_confirm
            .then(|| self.issue_session(&mut store, &identity));
        Ok(AccountCreated { identity, session })
    }

    async fn sign_in_with_password(&self, email: &Email, password: &Password) -> AuthResult<Session> {
        self.enter(BackendOperation::SignIn).await?;

        let mut store = self.lock_store();
        let identity = match store.accounts.get(email.as_str()) {
            Some(account) if account.password == password.expose() => account.identity.clone(),
            _ => return Err(AuthError::InvalidCredentials),
        };
        Ok(self.issue_session(&mut store, &identity))
    }

    async fn sign_out(&self, access_token: &AccessToken) -> AuthResult<()> {
        self.enter(BackendOperation::SignOut).await?;

        let mut store = self.lock_store();
        if let Some(id) = store.access_tokens.remove(access_token.expose()) {
            store.refresh_tokens.retain(|_, owner| *owner != id);
        }
        Ok(())
    }

    async fn refresh_session(&self, refresh_token: &RefreshToken) -> AuthResult<Session> {
        self.enter(BackendOperation::RefreshSession).await?;

        let mut store = self.lock_store();
        let id = store
            .refresh_tokens
            .remove(refresh_token.expose())
            .ok_or(AuthError::SessionInvalid)?;
        let identity = store
            .accounts
            .values()
            .find(|account| account.identity.id == id)
            .map(|account| account.identity.clone())
            .ok_or(AuthError::SessionInvalid)?;
        Ok(self.issue_session(&mut store, &identity))
    }

    async fn delete_account(&self, id: &IdentityId) -> AuthResult<()> {
        self.enter(BackendOperation::DeleteAccount).await?;

        let mut store = self.lock_store();
        store.accounts.retain(|_, account| account.identity.id != *id);
        store.profiles.remove(id);
        store.access_tokens.retain(|_, owner| owner != id);
        store.refresh_tokens.retain(|_, owner| owner != id);
        Ok(())
    }
}

impl ProfileRepository for InMemoryBackend {
    async fn find_by_id(
        &self,
        id: &IdentityId,
        _token: Option<&AccessToken>,
    ) -> AuthResult<Option<Profile>> {
        self.enter(BackendOperation::FindProfile).await?;
        Ok(self.lock_store().profiles.get(id).cloned())
    }

    async fn find_role(&self, id: &IdentityId, _token: Option<&AccessToken>) -> AuthResult<Option<Role>> {
        self.enter(BackendOperation::FindRole).await?;
        Ok(self.lock_store().profiles.get(id).map(|p| p.role))
    }

    async fn insert(&self, profile: &NewProfile, _token: Option<&AccessToken>) -> AuthResult<()> {
        self.enter(BackendOperation::InsertProfile).await?;

        let mut store = self.lock_store();
        if store.profiles.contains_key(&profile.id) {
            return Err(AuthError::AccountExists("Profile already exists".to_string()));
        }
        store
            .profiles
            .insert(profile.id, profile.clone().into_profile(Utc::now()));
        Ok(())
    }
}
