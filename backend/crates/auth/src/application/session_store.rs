//! Session Store
//!
//! Holds the current session of one client and broadcasts every change.
//! Each change carries a monotonically increasing sequence number so
//! writers can tell which change is the latest.

use tokio::sync::watch;

use crate::domain::entity::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    InitialSession,
    SignedIn,
    TokenRefreshed,
    SignedOut,
}

#[derive(Debug, Clone)]
pub struct SessionChange {
    pub seq: u64,
    pub event: AuthEvent,
    pub session: Option<Session>,
}

pub struct SessionStore {
    tx: watch::Sender<SessionChange>,
}

impl SessionStore {
    pub fn new(initial: Option<Session>) -> Self {
        let (tx, _rx) = watch::channel(SessionChange {
            seq: 1,
            event: AuthEvent::InitialSession,
            session: initial,
        });
        Self { tx }
    }

    /// Replace the current session and notify subscribers
    pub fn publish(&self, event: AuthEvent, session: Option<Session>) -> SessionChange {
        let mut published = None;
        self.tx.send_modify(|current| {
            *current = SessionChange {
                seq: current.seq + 1,
                event,
                session,
            };
            published = Some(current.clone());
        });

        let change = published.unwrap_or_else(|| self.current());
        tracing::debug!(seq = change.seq, event = ?change.event, "Session change published");
        change
    }

    pub fn current(&self) -> SessionChange {
        self.tx.borrow().clone()
    }

    pub fn session(&self) -> Option<Session> {
        self.tx.borrow().session.clone()
    }

    pub fn latest_seq(&self) -> u64 {
        self.tx.borrow().seq
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionChange> {
        self.tx.subscribe()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_change() {
        let store = SessionStore::default();
        let change = store.current();
        assert_eq!(change.seq, 1);
        assert_eq!(change.event, AuthEvent::InitialSession);
        assert!(change.session.is_none());
    }

    #[test]
    fn test_publish_increments_seq() {
        let store = SessionStore::default();
        let first = store.publish(AuthEvent::SignedOut, None);
        let second = store.publish(AuthEvent::SignedOut, None);
        assert_eq!(first.seq, 2);
        assert_eq!(second.seq, 3);
        assert_eq!(store.latest_seq(), 3);
    }

    #[tokio::test]
    async fn test_subscribers_see_latest_change() {
        let store = SessionStore::default();
        let mut rx = store.subscribe();

        store.publish(AuthEvent::SignedOut, None);
        store.publish(AuthEvent::TokenRefreshed, None);

        rx.changed().await.unwrap();
        let seen = rx.borrow_and_update().clone();
        assert_eq!(seen.seq, 3);
        assert_eq!(seen.event, AuthEvent::TokenRefreshed);
    }
}
