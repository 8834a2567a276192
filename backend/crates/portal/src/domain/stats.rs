//! Dashboard figures
//!
//! Static sample data; nothing here is computed from stored reports.

use auth::models::Role;
use serde::Serialize;

use crate::domain::report::{IssueCategory, IssueStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueStats {
    pub total: u32,
    pub pending: u32,
    pub in_progress: u32,
    pub resolved: u32,
    /// Percent, rounded to nearest
    pub resolution_rate: u8,
}

impl IssueStats {
    pub const fn for_role(role: Role) -> Self {
        match role {
            Role::Citizen => Self {
                total: 12,
                pending: 5,
                in_progress: 3,
                resolved: 4,
                resolution_rate: 33,
            },
            Role::Officer => Self {
                total: 45,
                pending: 18,
                in_progress: 12,
                resolved: 15,
                resolution_rate: 33,
            },
            Role::Admin => Self {
                total: 320,
                pending: 85,
                in_progress: 95,
                resolved: 140,
                resolution_rate: 44,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentIssue {
    pub id: u32,
    pub title: &'static str,
    pub status: IssueStatus,
    pub category: IssueCategory,
    /// RFC 3339
    pub created_at: &'static str,
}

pub static RECENT_ISSUES: [RecentIssue; 4] = [
    RecentIssue {
        id: 1,
        title: "Pothole on Main Street",
        status: IssueStatus::Pending,
        category: IssueCategory::RoadDamage,
        created_at: "2025-05-14T10:30:00Z",
    },
    RecentIssue {
        id: 2,
        title: "Broken Street Light",
        status: IssueStatus::InProgress,
        category: IssueCategory::BrokenStreetLight,
        created_at: "2025-05-13T14:20:00Z",
    },
    RecentIssue {
        id: 3,
        title: "Graffiti on Park Wall",
        status: IssueStatus::Resolved,
        category: IssueCategory::Graffiti,
        created_at: "2025-05-12T09:45:00Z",
    },
    RecentIssue {
        id: 4,
        title: "Garbage Pile at 5th Avenue",
        status: IssueStatus::Pending,
        category: IssueCategory::Garbage,
        created_at: "2025-05-11T16:10:00Z",
    },
];

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CategoryShare {
    pub category: IssueCategory,
    /// Percent of all issues
    pub value: u8,
}

pub static CATEGORY_DISTRIBUTION: [CategoryShare; 5] = [
    CategoryShare {
        category: IssueCategory::RoadDamage,
        value: 35,
    },
    CategoryShare {
        category: IssueCategory::Garbage,
        value: 25,
    },
    CategoryShare {
        category: IssueCategory::BrokenStreetLight,
        value: 15,
    },
    CategoryShare {
        category: IssueCategory::Graffiti,
        value: 10,
    },
    CategoryShare {
        category: IssueCategory::WaterLeak,
        value: 15,
    },
];

#[derive(Debug, Clone, Copy, Serialize)]
pub struct MonthlyTrend {
    pub month: &'static str,
    pub issues: u32,
    pub resolved: u32,
}

pub static MONTHLY_TREND: [MonthlyTrend; 5] = [
    MonthlyTrend {
        month: "Jan",
        issues: 30,
        resolved: 25,
    },
    MonthlyTrend {
        month: "Feb",
        issues: 40,
        resolved: 35,
    },
    MonthlyTrend {
        month: "Mar",
        issues: 45,
        resolved: 38,
    },
    MonthlyTrend {
        month: "Apr",
        issues: 55,
        resolved: 48,
    },
    MonthlyTrend {
        month: "May",
        issues: 65,
        resolved: 52,
    },
];

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserActivity {
    pub active_citizens: u32,
    pub active_officers: u32,
    pub daily_active_users: u32,
    pub new_registrations_this_week: u32,
}

pub const USER_ACTIVITY: UserActivity = UserActivity {
    active_citizens: 248,
    active_officers: 32,
    daily_active_users: 45,
    new_registrations_this_week: 18,
};

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetric {
    pub label: &'static str,
    pub value: &'static str,
    /// 0..=100, for the progress bar
    pub progress: u8,
}

pub static SYSTEM_PERFORMANCE: [PerformanceMetric; 4] = [
    PerformanceMetric {
        label: "Average Response Time",
        value: "2.3 days",
        progress: 65,
    },
    PerformanceMetric {
        label: "Average Resolution Time",
        value: "5.7 days",
        progress: 42,
    },
    PerformanceMetric {
        label: "AI Classification Accuracy",
        value: "89%",
        progress: 89,
    },
    PerformanceMetric {
        label: "Citizen Satisfaction Rate",
        value: "78%",
        progress: 78,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_add_up() {
        for role in Role::ALL {
            let s = IssueStats::for_role(role);
            assert_eq!(s.pending + s.in_progress + s.resolved, s.total, "{role}");
            let rounded = (s.resolved * 100 + s.total / 2) / s.total;
            assert_eq!(u32::from(s.resolution_rate), rounded, "{role}");
        }
    }

    #[test]
    fn test_distribution_sums_to_100() {
        let sum: u32 = CATEGORY_DISTRIBUTION.iter().map(|c| u32::from(c.value)).sum();
        assert_eq!(sum, 100);
    }
}
