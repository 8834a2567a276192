//! Route Value Object
//!
//! Every navigation destination the application knows about.

use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Index,
    Login,
    Register,
    Dashboard,
    MunicipalDashboard,
    AdminDashboard,
    ReportIssue,
    MyReports,
    AssignedIssues,
    LiveMap,
    Analytics,
    Users,
    Notifications,
    Settings,
    Profile,
}

impl Route {
    pub const ALL: [Route; 15] = [
        Route::Index,
        Route::Login,
        Route::Register,
        Route::Dashboard,
        Route::MunicipalDashboard,
        Route::AdminDashboard,
        Route::ReportIssue,
        Route::MyReports,
        Route::AssignedIssues,
        Route::LiveMap,
        Route::Analytics,
        Route::Users,
        Route::Notifications,
        Route::Settings,
        Route::Profile,
    ];

    pub const fn path(&self) -> &'static str {
        use Route::*;
        match self {
            Index => "/",
            Login => "/login",
            Register => "/register",
            Dashboard => "/dashboard",
            MunicipalDashboard => "/municipal-dashboard",
            AdminDashboard => "/admin-dashboard",
            ReportIssue => "/report-issue",
            MyReports => "/my-reports",
            AssignedIssues => "/assigned-issues",
            LiveMap => "/live-map",
            Analytics => "/analytics",
            Users => "/users",
            Notifications => "/notifications",
            Settings => "/settings",
            Profile => "/profile",
        }
    }

    /// Exact path match; a trailing slash is ignored
    pub fn from_path(path: &str) -> Option<Self> {
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };
        Self::ALL.into_iter().find(|route| route.path() == path)
    }

    /// Reachable without a session
    pub const fn is_public(&self) -> bool {
        matches!(self, Route::Index | Route::Login | Route::Register)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl Serialize for Route {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.path())
    }
}
