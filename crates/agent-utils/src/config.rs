//! Environment-based configuration helpers

use std::str::FromStr;
use thiserror::Error;

/// Failure to read a configuration value from the environment
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvError {
    /// A required variable is unset or blank
    #[error("{0} not set")]
    Missing(String),

    /// A variable is set but does not parse
    #[error("{name} has invalid value {value:?}: {reason}")]
    Invalid {
        name: String,
        value: String,
        reason: String,
    },
}

/// Read a variable, treating blank values as unset
pub fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read a variable that must be present
pub fn require_env(name: &str) -> Result<String, EnvError> {
    env_var(name).ok_or_else(|| EnvError::Missing(name.to_string()))
}

/// Read and parse an optional variable
pub fn env_parse<T>(name: &str) -> Result<Option<T>, EnvError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_var(name)
        .map(|value| {
            value.parse::<T>().map_err(|e| EnvError::Invalid {
                name: name.to_string(),
                reason: e.to_string(),
                value,
            })
        })
        .transpose()
}

/// Split a comma-separated variable into trimmed, non-empty items
pub fn env_list(name: &str) -> Vec<String> {
    env_var(name)
        .map(|v| split_list(&v))
        .unwrap_or_default()
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
