//! Environment variable parsing utilities.
//!
//! ```
//! use module_resolver::env_utils::{env_string_or, env_var};
//!
//! let marker = env_string_or("MODULE_LOADER_MARKER", "Upgrade");
//! let custom: Option<String> = env_var("MODULE_LOADER_BASE_TYPE");
//! # let _ = (marker, custom);
//! ```

use std::str::FromStr;

/// Parse an environment variable into a type that implements `FromStr`.
///
/// Returns `None` if the variable is not set, is blank, or cannot be parsed.
pub fn env_var<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .and_then(|v| v.trim().parse().ok())
}

/// Get an environment variable as a string with a default value.
pub fn env_string_or(key: &str, default: &str) -> String {
    env_var(key).unwrap_or_else(|| default.to_string())
}
