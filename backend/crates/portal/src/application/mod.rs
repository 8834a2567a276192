//! Application Layer
//!
//! Dashboard shell, role dashboards, and the report use cases.

pub mod classify;
pub mod config;
pub mod dashboard;
pub mod shell;
pub mod submit_report;

// Re-exports
pub use classify::{ClassifyImageUseCase, ClassifyOutput};
pub use config::PortalConfig;
pub use dashboard::Dashboard;
pub use shell::Shell;
pub use submit_report::{ReportReceipt, SubmitReportInput, SubmitReportUseCase};
