use std::sync::{Mutex, PoisonError};

use crate::domain::value_object::Route;

/// Pending navigation request of one client
#[derive(Debug, Default)]
pub struct Navigator {
    target: Mutex<Option<Route>>,
}

impl Navigator {
    pub fn navigate(&self, route: Route) {
        tracing::debug!(to = %route, "Navigation requested");
        *self.target.lock().unwrap_or_else(PoisonError::into_inner) = Some(route);
    }

    /// Consume the pending request
    pub fn take(&self) -> Option<Route> {
        self.target.lock().unwrap_or_else(PoisonError::into_inner).take()
    }

    pub fn peek(&self) -> Option<Route> {
        *self.target.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
