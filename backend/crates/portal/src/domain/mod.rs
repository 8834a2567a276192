//! Domain Layer
//!
//! Navigation table, reports, dashboard figures, and the classifier boundary.

pub mod classifier;
pub mod navigation;
pub mod report;
pub mod stats;

// Re-exports
pub use classifier::{ImageClassifier, category_for_digest};
pub use navigation::{NAV_ITEMS, NavEntry, NavItem, allowed_roles, navigation_for};
pub use report::{IssueCategory, IssueStatus, ReportDraft, ReportId, ValidatedReport};
pub use stats::IssueStats;
