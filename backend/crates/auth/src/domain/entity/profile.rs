//! Profile Entity
//!
//! Application-owned row in the `users` table. One-to-one with an
//! [`Identity`](super::identity::Identity) through `id`; created by the
//! registration flow and never deleted here.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{DisplayName, Email, IdentityId, Role};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: IdentityId,
    pub email: String,
    pub role: Role,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// Name for the dashboard header, falling back to the email's local part
    pub fn display_name(&self) -> &str {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => self.email.split('@').next().unwrap_or(&self.email),
        }
    }
}

/// Profile row to insert after the identity was created
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub id: IdentityId,
    pub email: Email,
    pub role: Role,
    pub name: Option<DisplayName>,
}

impl NewProfile {
    /// Materialise the stored row
    pub fn into_profile(self, created_at: DateTime<Utc>) -> Profile {
        Profile {
            id: self.id,
            email: self.email.into_inner(),
            role: self.role,
            name: self.name.map(|n| n.as_str().to_string()),
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: Option<&str>) -> Profile {
        Profile {
            id: IdentityId::new(),
            email: "ana@city.gov".to_string(),
            role: Role::Citizen,
            name: name.map(str::to_string),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_display_name_prefers_name() {
        assert_eq!(profile(Some("Ana Ruiz")).display_name(), "Ana Ruiz");
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        assert_eq!(profile(None).display_name(), "ana");
        assert_eq!(profile(Some("  ")).display_name(), "ana");
    }
}
