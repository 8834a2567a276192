//! Issue reports
//!
//! Categories, status, and the validated report a citizen submits.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{PortalError, PortalResult};

pub use kernel::id::ReportId;

const TITLE_MAX_CHARS: usize = 120;
const DESCRIPTION_MAX_CHARS: usize = 2000;
const LOCATION_MAX_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    RoadDamage,
    Garbage,
    Graffiti,
    WaterLeak,
    #[serde(rename = "street_light")]
    BrokenStreetLight,
    Other,
}

impl IssueCategory {
    /// Choices offered by the report form
    pub const ALL: [IssueCategory; 6] = [
        IssueCategory::RoadDamage,
        IssueCategory::Garbage,
        IssueCategory::Graffiti,
        IssueCategory::WaterLeak,
        IssueCategory::BrokenStreetLight,
        IssueCategory::Other,
    ];

    /// Categories the image classifier can produce
    pub const CLASSIFIABLE: [IssueCategory; 5] = [
        IssueCategory::RoadDamage,
        IssueCategory::Garbage,
        IssueCategory::Graffiti,
        IssueCategory::WaterLeak,
        IssueCategory::BrokenStreetLight,
    ];

    pub const fn code(&self) -> &'static str {
        match self {
            IssueCategory::RoadDamage => "road_damage",
            IssueCategory::Garbage => "garbage",
            IssueCategory::Graffiti => "graffiti",
            IssueCategory::WaterLeak => "water_leak",
            IssueCategory::BrokenStreetLight => "street_light",
            IssueCategory::Other => "other",
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            IssueCategory::RoadDamage => "Road Damage",
            IssueCategory::Garbage => "Garbage",
            IssueCategory::Graffiti => "Graffiti",
            IssueCategory::WaterLeak => "Water Leak",
            IssueCategory::BrokenStreetLight => "Broken Street Light",
            IssueCategory::Other => "Other",
        }
    }
}

impl FromStr for IssueCategory {
    type Err = PortalError;

    /// Accepts form codes and display labels
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.code() == s || c.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| PortalError::UnknownCategory(s.to_string()))
    }
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    Pending,
    InProgress,
    Resolved,
}

impl IssueStatus {
    pub const fn label(&self) -> &'static str {
        match self {
            IssueStatus::Pending => "Pending",
            IssueStatus::InProgress => "In Progress",
            IssueStatus::Resolved => "Resolved",
        }
    }
}

/// Report form as submitted
#[derive(Debug, Clone, Default)]
pub struct ReportDraft {
    pub title: String,
    pub description: String,
    pub location: String,
    pub category: Option<String>,
}

/// Report that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedReport {
    pub title: String,
    pub description: String,
    pub location: String,
    pub category: Option<IssueCategory>,
}

fn required(field: &str, value: &str, max_chars: usize) -> PortalResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(PortalError::Validation(format!("{field} is required")));
    }
    if value.chars().count() > max_chars {
        return Err(PortalError::Validation(format!(
            "{field} must be at most {max_chars} characters"
        )));
    }
    Ok(value.to_string())
}

impl ReportDraft {
    pub fn validate(self) -> PortalResult<ValidatedReport> {
        let category = match self.category.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(code) => Some(code.parse()?),
        };

        Ok(ValidatedReport {
            title: required("Title", &self.title, TITLE_MAX_CHARS)?,
            description: required("Description", &self.description, DESCRIPTION_MAX_CHARS)?,
            location: required("Location", &self.location, LOCATION_MAX_CHARS)?,
            category,
        })
    }
}
