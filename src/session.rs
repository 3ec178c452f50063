//! Opening module packages with a shared configuration.

use anyhow::{Context, Result};
use module_package::PackageLocation;
use module_resolver::{LoaderConfig, ModuleLoader, TypeScope};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Configuration plus the package opening logic used by every CLI command.
#[derive(Debug, Clone, Default)]
pub struct Session {
    config: LoaderConfig,
}

impl Session {
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    /// Config from `path` when given, otherwise defaults with `MODULE_LOADER_*`
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => LoaderConfig::from_json_file(path)?,
            None => {
                let config = LoaderConfig::from_env();
                config.validate().context("invalid MODULE_LOADER_* environment")?;
                config
            }
        };
        debug!(?config, "loader config");
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Open `package`, optionally on top of the package `parent`.
    ///
    /// The parent is itself opened as a module without a parent of its own.
    pub fn open(&self, package: &str, parent: Option<&str>) -> Result<ModuleLoader> {
        let parent = match parent {
            Some(locator) => {
                let loader = self.open_one(locator, None)?;
                Some(Arc::new(loader) as Arc<dyn TypeScope>)
            }
            None => None,
        };
        self.open_one(package, parent)
    }

    fn open_one(&self, locator: &str, parent: Option<Arc<dyn TypeScope>>) -> Result<ModuleLoader> {
        let location = PackageLocation::parse(locator)
            .with_context(|| format!("invalid package locator {:?}", locator))?;
        let loader = ModuleLoader::builder(location)
            .parent_opt(parent)
            .config(self.config.clone())
            .build()
            .with_context(|| format!("failed to load module package {}", locator))?;
        Ok(loader)
    }
}
