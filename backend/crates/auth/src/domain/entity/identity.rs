//! Identity Entity
//!
//! Authentication principal issued by the identity provider. The
//! application only keeps a reference to it.

use serde::Serialize;

use crate::domain::value_object::IdentityId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub id: IdentityId,
    pub email: String,
}

impl Identity {
    pub fn new(id: IdentityId, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
        }
    }
}
