use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::route::Route;

/// Access role stored on a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Role {
    #[default]
    Citizen,
    Officer,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Citizen, Role::Officer, Role::Admin];

    #[inline]
    pub const fn code(&self) -> &'static str {
        use Role::*;
        match self {
            Citizen => "citizen",
            Officer => "officer",
            Admin => "admin",
        }
    }

    /// Parse a stored role code. `municipal` is the legacy code for officers.
    pub fn from_code(code: &str) -> AppResult<Self> {
        use Role::*;
        match code.trim().to_ascii_lowercase().as_str() {
            "citizen" => Ok(Citizen),
            "officer" | "municipal" => Ok(Officer),
            "admin" => Ok(Admin),
            other => {
                tracing::warn!(code = other, "Unknown role code");
                Err(AppError::bad_request(format!("Unknown role: {other}")))
            }
        }
    }

    /// Landing page after sign-in
    #[inline]
    pub const fn dashboard(&self) -> Route {
        use Role::*;
        match self {
            Citizen => Route::Dashboard,
            Officer => Route::MunicipalDashboard,
            Admin => Route::AdminDashboard,
        }
    }

    #[inline]
    pub const fn label(&self) -> &'static str {
        use Role::*;
        match self {
            Citizen => "Citizen",
            Officer => "Municipal Officer",
            Admin => "Administrator",
        }
    }

    /// Single-letter badge shown in the dashboard header
    #[inline]
    pub const fn badge(&self) -> char {
        use Role::*;
        match self {
            Citizen => 'C',
            Officer => 'M',
            Admin => 'A',
        }
    }

    /// Admins are provisioned out of band
    #[inline]
    pub const fn is_self_registrable(&self) -> bool {
        !matches!(self, Role::Admin)
    }

    #[inline]
    pub(crate) const fn bit(&self) -> u8 {
        1 << (*self as u8)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        Role::from_code(s)
    }
}

impl TryFrom<String> for Role {
    type Error = AppError;

    fn try_from(value: String) -> AppResult<Self> {
        Role::from_code(&value)
    }
}

impl From<Role> for &'static str {
    fn from(role: Role) -> Self {
        role.code()
    }
}
