//! Dashboard Shell
//!
//! Chrome around every signed-in page: brand, viewer badge, role-filtered
//! navigation, and the logout action.

use auth::models::{Profile, Role, Route};
use serde::Serialize;

use crate::domain::navigation::{NavEntry, navigation_for};

pub const BRAND: &str = "CivGuard";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Shell {
    pub brand: &'static str,
    pub display_name: String,
    pub role: Role,
    pub role_label: &'static str,
    /// Avatar initial for the role
    pub badge: char,
    pub navigation: Vec<NavEntry>,
    /// Submit a POST here to sign out
    pub logout_action: &'static str,
    pub home: Route,
}

impl Shell {
    pub fn build(profile: &Profile, current_path: &str) -> Self {
        let role = profile.role;
        Self {
            brand: BRAND,
            display_name: profile.display_name().to_string(),
            role,
            role_label: role.label(),
            badge: role.badge(),
            navigation: navigation_for(role, current_path),
            logout_action: "/logout",
            home: role.dashboard(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auth::models::IdentityId;
    use chrono::Utc;

    fn profile(role: Role, name: Option<&str>) -> Profile {
        Profile {
            id: IdentityId::new(),
            email: "sam@city.gov".to_string(),
            role,
            name: name.map(str::to_string),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_shell_for_officer() {
        let shell = Shell::build(&profile(Role::Officer, Some("Sam Rivera")), "/analytics");

        assert_eq!(shell.brand, "CivGuard");
        assert_eq!(shell.badge, 'M');
        assert_eq!(shell.display_name, "Sam Rivera");
        assert_eq!(shell.home, Route::MunicipalDashboard);
        let active: Vec<_> = shell.navigation.iter().filter(|e| e.active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].label, "Analytics");
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let shell = Shell::build(&profile(Role::Citizen, None), "/dashboard");
        assert_eq!(shell.display_name, "sam");
        assert_eq!(shell.badge, 'C');
    }
}
