//! Role dashboards

use auth::models::{Role, Route};
use serde::Serialize;

use crate::domain::stats::{
    CATEGORY_DISTRIBUTION, CategoryShare, IssueStats, MONTHLY_TREND, MonthlyTrend,
    PerformanceMetric, RECENT_ISSUES, RecentIssue, SYSTEM_PERFORMANCE, USER_ACTIVITY,
    UserActivity,
};

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Link {
    pub label: &'static str,
    pub to: Route,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub title: &'static str,
    pub stats: IssueStats,
    /// Caption under the total count
    pub total_caption: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_action: Option<Link>,
    pub recent_issues: &'static [RecentIssue],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_all: Option<Link>,
    pub categories: &'static [CategoryShare],
    /// Officers and admins only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_trend: Option<&'static [MonthlyTrend]>,
    /// Admins only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_activity: Option<UserActivity>,
    /// Admins only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_performance: Option<&'static [PerformanceMetric]>,
}

impl Dashboard {
    pub fn for_role(role: Role) -> Self {
        let (title, total_caption) = match role {
            Role::Citizen => ("Citizen Dashboard", "Issues you've reported"),
            Role::Officer => ("Municipal Officer Dashboard", "Issues assigned to you"),
            Role::Admin => ("Admin Dashboard", "Total reported issues"),
        };

        let primary_action = (role == Role::Citizen).then_some(Link {
            label: "Report New Issue",
            to: Route::ReportIssue,
        });

        let view_all = match role {
            Role::Citizen => Some(Route::MyReports),
            Role::Officer => Some(Route::AssignedIssues),
            Role::Admin => Some(Route::Analytics),
        }
        .map(|to| Link {
            label: "View All Issues",
            to,
        });

        let is_staff = matches!(role, Role::Officer | Role::Admin);
        let is_admin = role == Role::Admin;

        Self {
            title,
            stats: IssueStats::for_role(role),
            total_caption,
            primary_action,
            recent_issues: &RECENT_ISSUES,
            view_all,
            categories: &CATEGORY_DISTRIBUTION,
            monthly_trend: is_staff.then_some(&MONTHLY_TREND[..]),
            user_activity: is_admin.then_some(USER_ACTIVITY),
            system_performance: is_admin.then_some(&SYSTEM_PERFORMANCE[..]),
        }
    }
}
