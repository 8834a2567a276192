use kernel::error::app_error::{AppError, AppResult};
use serde::Serialize;
use std::fmt;

const DISPLAY_NAME_MAX_CHARS: usize = 100;

/// Optional name shown in the dashboard header
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DisplayName(String);

impl DisplayName {
    /// Blank input means "no name"; anything else is kept exactly as given
    pub fn parse(raw: Option<&str>) -> AppResult<Option<Self>> {
        let Some(name) = raw.filter(|n| !n.trim().is_empty()) else {
            return Ok(None);
        };

        if name.chars().count() > DISPLAY_NAME_MAX_CHARS {
            return Err(AppError::bad_request(format!(
                "Name must be at most {DISPLAY_NAME_MAX_CHARS} characters"
            )));
        }
        if name.chars().any(char::is_control) {
            return Err(AppError::bad_request("Name contains invalid characters"));
        }

        Ok(Some(Self(name.to_string())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
