//! Client Context Registry
//!
//! Maps the client cookie to that browser's [`AuthContext`]. Identifiers
//! are always issued here; an unknown identifier presented by a browser is
//! replaced, never adopted.

use platform::crypto::random_token;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

use crate::application::{AuthConfig, AuthContext};
use crate::domain::repository::{IdentityProvider, ProfileRepository};

/// Random bytes behind a client identifier
const CLIENT_ID_BYTES: usize = 24;

struct ClientEntry<B> {
    context: Arc<AuthContext<B>>,
    last_seen: Instant,
}

/// Context looked up (or created) for one request
pub struct ResolvedClient<B> {
    pub id: String,
    pub context: Arc<AuthContext<B>>,
    /// A new identifier was issued and must be sent back as a cookie
    pub is_new: bool,
}

pub struct ContextRegistry<B> {
    backend: Arc<B>,
    config: Arc<AuthConfig>,
    clients: Mutex<HashMap<String, ClientEntry<B>>>,
}

impl<B> ContextRegistry<B>
where
    B: IdentityProvider + ProfileRepository + Send + Sync + 'static,
{
    pub fn new(backend: Arc<B>, config: Arc<AuthConfig>) -> Self {
        Self {
            backend,
            config,
            clients: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &Arc<AuthConfig> {
        &self.config
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Existing context for `client_id`, marking it as used
    pub fn get(&self, client_id: &str) -> Option<Arc<AuthContext<B>>> {
        let mut clients = self.clients.lock().unwrap_or_else(PoisonError::into_inner);
        clients.get_mut(client_id).map(|entry| {
            entry.last_seen = Instant::now();
            entry.context.clone()
        })
    }

    /// Context for the presented identifier, or a fresh one
    pub fn resolve(&self, client_id: Option<&str>) -> ResolvedClient<B> {
        if let Some(id) = client_id
            && let Some(context) = self.get(id)
        {
            return ResolvedClient {
                id: id.to_string(),
                context,
                is_new: false,
            };
        }

        let id = random_token(CLIENT_ID_BYTES);
        let context = AuthContext::new(self.backend.clone(), self.config.clone());
        {
            let mut clients = self.clients.lock().unwrap_or_else(PoisonError::into_inner);
            while clients.len() >= self.config.max_clients.max(1) {
                if !evict_least_recent(&mut clients) {
                    break;
                }
            }
            clients.insert(
                id.clone(),
                ClientEntry {
                    context: context.clone(),
                    last_seen: Instant::now(),
                },
            );
        }

        tracing::debug!(replaced_unknown = client_id.is_some(), "Client context created");
        ResolvedClient {
            id,
            context,
            is_new: true,
        }
    }

    /// Drop contexts idle for longer than `client_idle_ttl`
    pub fn sweep_idle(&self) -> usize {
        let ttl = self.config.client_idle_ttl;
        let mut clients = self.clients.lock().unwrap_or_else(PoisonError::into_inner);
        let before = clients.len();
        clients.retain(|_, entry| entry.last_seen.elapsed() <= ttl);
        let evicted = before - clients.len();
        if evicted > 0 {
            tracing::info!(evicted, remaining = clients.len(), "Evicted idle client contexts");
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.clients.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Periodically sweep idle contexts until the registry is dropped
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let registry: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.tick().await;
            loop {
                interval.tick().await;
                let Some(registry) = registry.upgrade() else {
                    break;
                };
                registry.sweep_idle();
            }
        })
    }
}

/// Remove the entry seen longest ago; `false` when there is none
fn evict_least_recent<B>(clients: &mut HashMap<String, ClientEntry<B>>) -> bool {
    let Some(oldest) = clients
        .iter()
        .min_by_key(|(_, entry)| entry.last_seen)
        .map(|(id, _)| id.clone())
    else {
        return false;
    };
    clients.remove(&oldest);
    tracing::debug!(remaining = clients.len(), "Client registry full, evicted oldest context");
    true
}
