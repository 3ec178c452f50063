//! Package locations.
//!
//! A package is identified by a URL. Filesystem paths are converted to `file://`
//! URLs so that every location has a single canonical string form, which is
//! what diagnostics and origin tracking print.

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// Scheme used for archives that only live in memory.
pub const MEMORY_SCHEME: &str = "memory";

/// Where a module package lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PackageLocation {
    url: Url,
}

impl PackageLocation {
    pub fn from_url(url: Url) -> Self {
        Self { url }
    }

    /// Build a location from a filesystem path. Relative paths are resolved
    /// against the current directory.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .context("resolve current directory")?
                .join(path)
        };
        let url = if absolute.is_dir() {
            Url::from_directory_path(&absolute)
        } else {
            Url::from_file_path(&absolute)
        }
        .map_err(|_| anyhow!("cannot express {} as a URL", absolute.display()))?;
        Ok(Self { url })
    }

    /// Location of an in-memory archive, e.g. `memory:runtime`.
    pub fn memory(name: &str) -> Result<Self> {
        let url = Url::parse(&format!("{}:{}", MEMORY_SCHEME, name))
            .with_context(|| format!("invalid memory package name {:?}", name))?;
        Ok(Self { url })
    }

    /// Parse a user-supplied locator: anything with a known URL scheme is taken
    /// as a URL, everything else as a path.
    pub fn parse(locator: &str) -> Result<Self> {
        if let Ok(url) = Url::parse(locator) {
            // Single-letter schemes are Windows drive letters, not URLs.
            if url.scheme().len() > 1 {
                return Ok(Self { url });
            }
        }
        Self::from_path(locator)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn is_memory(&self) -> bool {
        self.url.scheme() == MEMORY_SCHEME
    }

    /// The filesystem path for `file://` locations.
    pub fn to_file_path(&self) -> Option<PathBuf> {
        if self.url.scheme() != "file" {
            return None;
        }
        self.url.to_file_path().ok()
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

impl fmt::Display for PackageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}
