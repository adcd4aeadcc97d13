//! Configuration utility functions
//!
//! Helpers for reading typed overrides from environment variables. Unset or
//! empty variables leave the current value alone.

use std::path::PathBuf;

fn get_env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get a path value from an environment variable
pub fn get_env_path(key: &str) -> Option<PathBuf> {
    get_env_nonempty(key).map(PathBuf::from)
}

/// Get a f64 value from an environment variable, ignoring unparseable values
pub fn get_env_f64(key: &str) -> Option<f64> {
    match get_env_nonempty(key) {
        Some(val) => match val.trim().parse::<f64>() {
            Ok(parsed) if parsed.is_finite() && parsed >= 0.0 => Some(parsed),
            _ => {
                log::warn!("Ignoring invalid value for {key}: {val}");
                None
            }
        },
        None => None,
    }
}

/// Get a u32 value from an environment variable or use the default
pub fn get_env_u32(key: &str, default: u32) -> u32 {
    match get_env_nonempty(key) {
        Some(val) => val.trim().parse().unwrap_or_else(|_| {
            log::warn!("Ignoring invalid value for {key}: {val}");
            default
        }),
        None => default,
    }
}
