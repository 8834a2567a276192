//! API DTOs (Data Transfer Objects)

use auth::application::Notification;
use auth::models::Route;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::classify::ClassifyOutput;
use crate::application::dashboard::{Dashboard, Link};
use crate::application::shell::{BRAND, Shell};
use crate::application::submit_report::{ReportReceipt, SubmitReportInput};
use crate::domain::report::{IssueCategory, ReportDraft, ReportId};

#[derive(Debug, Clone, Copy, Serialize)]
pub struct FeatureCard {
    pub title: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Step {
    pub number: u8,
    pub title: &'static str,
    pub description: &'static str,
}

/// Response for GET /
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexView {
    pub view: &'static str,
    pub brand: &'static str,
    pub headline: &'static str,
    pub tagline: &'static str,
    pub features: &'static [FeatureCard],
    pub steps: &'static [Step],
    pub calls_to_action: [Link; 2],
}

const FEATURES: [FeatureCard; 4] = [
    FeatureCard {
        title: "Live City Map",
        description: "See reported issues across the city in real time.",
    },
    FeatureCard {
        title: "AI Classification",
        description: "Photos are categorised automatically so reports reach the right team.",
    },
    FeatureCard {
        title: "Analytics Dashboard",
        description: "Track response times and resolution rates by category.",
    },
    FeatureCard {
        title: "Notifications",
        description: "Get updates as your reports move from pending to resolved.",
    },
];

const STEPS: [Step; 3] = [
    Step {
        number: 1,
        title: "Report",
        description: "Snap a photo and describe the issue with its location.",
    },
    Step {
        number: 2,
        title: "Classify",
        description: "AI identifies the issue type and routes it to the responsible department.",
    },
    Step {
        number: 3,
        title: "Resolve",
        description: "Municipal officers act on the report and you follow its progress.",
    },
];

impl Default for IndexView {
    fn default() -> Self {
        Self {
            view: "index",
            brand: BRAND,
            headline: "AI-Powered Urban Issue Reporting & Response",
            tagline: "Report potholes, garbage, graffiti and other city issues in seconds. \
                      Our AI classifies them and the right team takes it from there.",
            features: &FEATURES,
            steps: &STEPS,
            calls_to_action: [
                Link {
                    label: "Get Started",
                    to: Route::Register,
                },
                Link {
                    label: "Sign In",
                    to: Route::Login,
                },
            ],
        }
    }
}

/// Response for the role dashboards
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub view: &'static str,
    pub shell: Shell,
    pub dashboard: Dashboard,
    pub notifications: Vec<Notification>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CategoryOption {
    pub value: &'static str,
    pub label: &'static str,
}

/// Response for GET /report-issue
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFormView {
    pub view: &'static str,
    pub shell: Shell,
    pub categories: Vec<CategoryOption>,
    pub classify_action: &'static str,
    pub notifications: Vec<Notification>,
}

impl ReportFormView {
    pub fn new(shell: Shell, notifications: Vec<Notification>) -> Self {
        Self {
            view: "report-issue",
            shell,
            categories: IssueCategory::ALL
                .into_iter()
                .map(|c| CategoryOption {
                    value: c.code(),
                    label: c.label(),
                })
                .collect(),
            classify_action: "/report-issue/classify",
            notifications,
        }
    }
}

/// Request for POST /report-issue/classify
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifyRequest {
    /// Base64 or `data:` URL
    pub image: String,
}

/// Response for POST /report-issue/classify
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyResponse {
    pub category: IssueCategory,
    pub label: &'static str,
    pub size_bytes: usize,
    pub progress: Vec<u8>,
}

impl From<ClassifyOutput> for ClassifyResponse {
    fn from(output: ClassifyOutput) -> Self {
        Self {
            category: output.category,
            label: output.category.label(),
            size_bytes: output.size_bytes,
            progress: output.progress,
        }
    }
}

/// Request for POST /report-issue
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReportRequest {
    pub title: String,
    pub description: String,
    pub location: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub ai_classification: Option<String>,
}

impl From<SubmitReportRequest> for SubmitReportInput {
    fn from(req: SubmitReportRequest) -> Self {
        Self {
            draft: ReportDraft {
                title: req.title,
                description: req.description,
                location: req.location,
                category: req.category,
            },
            image: req.image,
            ai_classification: req.ai_classification,
        }
    }
}

/// Response for a submitted report
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptView {
    pub view: &'static str,
    pub id: ReportId,
    pub title: String,
    pub location: String,
    pub category: IssueCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_classification: Option<IssueCategory>,
    pub has_image: bool,
    pub submitted_at: DateTime<Utc>,
    pub notifications: Vec<Notification>,
}

impl ReceiptView {
    pub fn new(receipt: ReportReceipt, notifications: Vec<Notification>) -> Self {
        Self {
            view: "report-submitted",
            id: receipt.id,
            title: receipt.title,
            location: receipt.location,
            category: receipt.category,
            ai_classification: receipt.ai_classification,
            has_image: receipt.has_image,
            submitted_at: receipt.submitted_at,
            notifications,
        }
    }
}

/// Response for pages that only carry the shell and a title
#[derive(Debug, Clone, Serialize)]
pub struct PlaceholderView {
    pub view: &'static str,
    pub title: &'static str,
    pub shell: Shell,
    pub notifications: Vec<Notification>,
}
