//! Dashboard navigation table
//!
//! An entry is shown iff the viewer's role is in its allowed set.

use auth::guard::AllowedRoles;
use auth::models::{Role, Route};
use serde::Serialize;

use Role::{Admin, Citizen, Officer};

#[derive(Debug, Clone, Copy)]
pub struct NavItem {
    pub label: &'static str,
    /// `None` links to the viewer's own dashboard
    pub route: Option<Route>,
    pub roles: &'static [Role],
}

impl NavItem {
    pub fn allowed(&self) -> AllowedRoles {
        AllowedRoles::only(self.roles)
    }

    pub fn target(&self, role: Role) -> Route {
        self.route.unwrap_or_else(|| role.dashboard())
    }
}

pub const NAV_ITEMS: [NavItem; 9] = [
    NavItem {
        label: "Dashboard",
        route: None,
        roles: &[Citizen, Officer, Admin],
    },
    NavItem {
        label: "Report Issue",
        route: Some(Route::ReportIssue),
        roles: &[Citizen],
    },
    NavItem {
        label: "My Reports",
        route: Some(Route::MyReports),
        roles: &[Citizen],
    },
    NavItem {
        label: "Assigned Issues",
        route: Some(Route::AssignedIssues),
        roles: &[Officer],
    },
    NavItem {
        label: "Live Map",
        route: Some(Route::LiveMap),
        roles: &[Citizen, Officer, Admin],
    },
    NavItem {
        label: "Analytics",
        route: Some(Route::Analytics),
        roles: &[Officer, Admin],
    },
    NavItem {
        label: "Notifications",
        route: Some(Route::Notifications),
        roles: &[Citizen, Officer, Admin],
    },
    NavItem {
        label: "User Management",
        route: Some(Route::Users),
        roles: &[Admin],
    },
    NavItem {
        label: "Settings",
        route: Some(Route::Settings),
        roles: &[Citizen, Officer, Admin],
    },
];

/// Navigation entry as rendered for one viewer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavEntry {
    pub label: &'static str,
    pub path: Route,
    pub active: bool,
}

/// Entries visible to `role`, with the one matching `current` marked active
pub fn navigation_for(role: Role, current: &str) -> Vec<NavEntry> {
    let current = Route::from_path(current);
    NAV_ITEMS
        .iter()
        .filter(|item| item.allowed().contains(role))
        .map(|item| {
            let path = item.target(role);
            NavEntry {
                label: item.label,
                path,
                active: current == Some(path),
            }
        })
        .collect()
}

/// Roles that may open `route`; routes outside the table (and `/profile`)
/// are open to every role
pub fn allowed_roles(route: Route) -> AllowedRoles {
    match route {
        Route::Dashboard => AllowedRoles::only(&[Citizen]),
        Route::MunicipalDashboard => AllowedRoles::only(&[Officer]),
        Route::AdminDashboard => AllowedRoles::only(&[Admin]),
        route => NAV_ITEMS
            .iter()
            .find(|item| item.route == Some(route))
            .map_or_else(AllowedRoles::all, NavItem::allowed),
    }
}
