//! Environment configuration helpers

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Read an environment variable, treating empty or whitespace values as unset
pub fn env_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse an environment variable, falling back to `default` when it is
/// missing or malformed. Malformed values are logged.
pub fn env_parse<T: FromStr>(name: &str, default: T) -> T {
    match env_var(name) {
        Some(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(variable = name, value = %raw, "Ignoring malformed environment value");
                default
            }
        },
        None => default,
    }
}

/// Milliseconds from the environment as a [`Duration`]
pub fn env_duration_ms(name: &str, default: Duration) -> Duration {
    let default_ms = u64::try_from(default.as_millis()).unwrap_or(u64::MAX);
    Duration::from_millis(env_parse(name, default_ms))
}

/// Parse a boolean flag: `1/true/yes/on` and `0/false/no/off`
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Boolean flag from the environment
pub fn env_flag(name: &str, default: bool) -> bool {
    env_var(name).and_then(|v| parse_flag(&v)).unwrap_or(default)
}
