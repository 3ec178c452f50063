//! Loader configuration.
//!
//! Defaults match the conventions of the actor runtime: the descriptor
//! attribute is `Upgrade-Classes`, the wildcard is `*`, the capability marker
//! is `Upgrade`, and wildcard classification looks for subtypes of `Actor`.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::env_utils::env_string_or;
use module_package::{DESCRIPTOR_PATH, UNIT_EXTENSION};

pub const DEFAULT_UPGRADE_ATTRIBUTE: &str = "Upgrade-Classes";
pub const DEFAULT_WILDCARD: &str = "*";
pub const DEFAULT_MARKER: &str = "Upgrade";
pub const DEFAULT_BASE_TYPE: &str = "Actor";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderConfig {
    /// Descriptor attribute holding the declared upgrade list.
    pub upgrade_attribute: String,
    /// Attribute value that requests a subtype scan instead of a literal list.
    pub wildcard: String,
    /// Capability marker that makes a unit upgrade-eligible on its own.
    pub marker: String,
    /// Base type for the wildcard subtype scan.
    pub base_type: String,
    pub descriptor_path: String,
    pub unit_extension: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            upgrade_attribute: DEFAULT_UPGRADE_ATTRIBUTE.to_string(),
            wildcard: DEFAULT_WILDCARD.to_string(),
            marker: DEFAULT_MARKER.to_string(),
            base_type: DEFAULT_BASE_TYPE.to_string(),
            descriptor_path: DESCRIPTOR_PATH.to_string(),
            unit_extension: UNIT_EXTENSION.to_string(),
        }
    }
}

impl LoaderConfig {
    /// Defaults overridden by `MODULE_LOADER_*` environment variables.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            upgrade_attribute: env_string_or("MODULE_LOADER_UPGRADE_ATTRIBUTE", &d.upgrade_attribute),
            wildcard: env_string_or("MODULE_LOADER_WILDCARD", &d.wildcard),
            marker: env_string_or("MODULE_LOADER_MARKER", &d.marker),
            base_type: env_string_or("MODULE_LOADER_BASE_TYPE", &d.base_type),
            descriptor_path: env_string_or("MODULE_LOADER_DESCRIPTOR", &d.descriptor_path),
            unit_extension: env_string_or("MODULE_LOADER_UNIT_EXTENSION", &d.unit_extension),
        }
    }

    /// Load from a JSON file; missing fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("upgrade_attribute", &self.upgrade_attribute),
            ("wildcard", &self.wildcard),
            ("marker", &self.marker),
            ("base_type", &self.base_type),
            ("descriptor_path", &self.descriptor_path),
            ("unit_extension", &self.unit_extension),
        ] {
            if value.trim().is_empty() {
                return Err(anyhow!("{} must not be empty", field));
            }
        }
        if self.wildcard.contains(char::is_whitespace) {
            return Err(anyhow!("wildcard {:?} must be a single token", self.wildcard));
        }
        if self.unit_extension.starts_with('.') {
            return Err(anyhow!(
                "unit_extension {:?} must not start with '.'",
                self.unit_extension
            ));
        }
        Ok(())
    }
}
