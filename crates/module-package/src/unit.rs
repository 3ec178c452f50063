//! Compiled unit format.
//!
//! A unit is one loadable type inside a package, stored as a JSON header under
//! an entry named after the type (`com/x/Foo.unit` holds `com.x.Foo`). The
//! header carries only what loading and classification need: the supertype
//! edges and the declared markers. `body` is opaque to this crate.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Default file extension for unit entries.
pub const UNIT_EXTENSION: &str = "unit";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitHeader {
    /// Fully-qualified type name, dot separated.
    pub name: String,
    /// Direct supertype, `None` for a root type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub implements: Vec<String>,
    /// Declarative capability markers, e.g. `Upgrade`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub markers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

impl UnitHeader {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extends: None,
            implements: Vec::new(),
            markers: Vec::new(),
            body: None,
        }
    }

    pub fn extends(mut self, supertype: impl Into<String>) -> Self {
        self.extends = Some(supertype.into());
        self
    }

    pub fn implements(mut self, iface: impl Into<String>) -> Self {
        self.implements.push(iface.into());
        self
    }

    pub fn marker(mut self, marker: impl Into<String>) -> Self {
        self.markers.push(marker.into());
        self
    }

    pub fn has_marker(&self, marker: &str) -> bool {
        self.markers.iter().any(|m| m == marker)
    }

    /// Direct supertypes: the `extends` edge followed by `implements`.
    pub fn supertypes(&self) -> impl Iterator<Item = &str> {
        self.extends
            .as_deref()
            .into_iter()
            .chain(self.implements.iter().map(String::as_str))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self).context("serialize unit header")
    }
}

pub fn parse_unit(bytes: &[u8]) -> Result<UnitHeader> {
    let header: UnitHeader = serde_json::from_slice(bytes).context("parse unit header")?;
    if header.name.trim().is_empty() {
        return Err(anyhow!("unit header has an empty name"));
    }
    Ok(header)
}

pub fn read_unit(reader: &mut dyn Read) -> Result<UnitHeader> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .context("read unit bytes")?;
    parse_unit(&bytes)
}

/// Map an entry path to the type it holds, if it is a unit entry.
///
/// `com/x/Foo.unit` -> `com.x.Foo`
pub fn entry_to_type_name(entry: &str, extension: &str) -> Option<String> {
    let stem = entry.strip_suffix(extension)?.strip_suffix('.')?;
    let stem = stem.trim_start_matches('/');
    if stem.is_empty() || stem.ends_with('/') {
        return None;
    }
    Some(stem.replace('/', "."))
}

/// Inverse of [`entry_to_type_name`].
pub fn type_name_to_entry(name: &str, extension: &str) -> String {
    format!("{}.{}", name.replace('.', "/"), extension)
}
