//! # Module Loader
//!
//! Loads one module package in isolation, with optional fallback to a parent
//! scope, and computes the package's upgrade set at construction.
//!
//! ## Construction order
//!
//! 1. Open the archive behind the location.
//! 2. Classify upgrade types against the package alone ([`LocalScope`]).
//! 3. Attach the parent scope.
//!
//! The parent is attached last on purpose: classification must never see it,
//! so the upgrade set depends only on the package contents. If classification
//! fails, no loader exists.
//!
//! ## Usage
//!
//! ```no_run
//! use module_resolver::{ModuleLoader, StaticScope, TypeScope};
//! use module_package::{PackageLocation, UnitHeader};
//! use std::sync::Arc;
//!
//! # fn main() -> anyhow::Result<()> {
//! let runtime = StaticScope::new(PackageLocation::memory("runtime")?)
//!     .with_type(UnitHeader::new("Actor"));
//! let loader = ModuleLoader::open(
//!     PackageLocation::parse("./modules/counter.tar.gz")?,
//!     Some(Arc::new(runtime)),
//! )?;
//!
//! for name in loader.upgrade_types().iter() {
//!     println!("upgradable: {}", name);
//! }
//! let actor = loader.resolve_type("Actor")?; // falls back to the runtime
//! # let _ = actor;
//! # Ok(())
//! # }
//! ```

use module_package::{
    open_archive, package_digest, MarkerScanner, PackageArchive, PackageLocation,
    UnitMarkerScanner,
};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::classifier::{ClassificationReport, UpgradeClassifier, UpgradeSet};
use crate::config::LoaderConfig;
use crate::definer::{TypeDefiner, UnitDefiner};
use crate::error::{LoadError, ResolveError};
use crate::oracle::{HierarchyOracle, SubtypeOracle};
use crate::scope::{LocalScope, TypeScope};
use crate::types::{LoadedType, Resource};

pub struct ModuleLoader {
    local: LocalScope,
    upgrade_types: UpgradeSet,
    classification: ClassificationReport,
    parent: Option<Arc<dyn TypeScope>>,
}

impl ModuleLoader {
    pub fn builder(location: PackageLocation) -> ModuleLoaderBuilder {
        ModuleLoaderBuilder::new(PackageSource::Location(location))
    }

    /// Build from an already opened archive, e.g. a [`module_package::MemoryArchive`].
    pub fn builder_for_archive(archive: Box<dyn PackageArchive>) -> ModuleLoaderBuilder {
        ModuleLoaderBuilder::new(PackageSource::Archive(archive))
    }

    /// Open a package with the default collaborators and configuration.
    pub fn open(
        location: PackageLocation,
        parent: Option<Arc<dyn TypeScope>>,
    ) -> Result<Self, LoadError> {
        Self::builder(location).parent_opt(parent).build()
    }

    pub fn from_archive(
        archive: Box<dyn PackageArchive>,
        parent: Option<Arc<dyn TypeScope>>,
    ) -> Result<Self, LoadError> {
        Self::builder_for_archive(archive).parent_opt(parent).build()
    }

    pub fn location(&self) -> &PackageLocation {
        self.local.location()
    }

    pub fn upgrade_types(&self) -> &UpgradeSet {
        &self.upgrade_types
    }

    pub fn is_upgrade_type(&self, name: &str) -> bool {
        self.upgrade_types.contains(name)
    }

    pub fn classification(&self) -> &ClassificationReport {
        &self.classification
    }

    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }

    /// Type already materialized by this module, if any. Never loads.
    pub fn find_loaded_in_module(&self, name: &str) -> Option<Arc<LoadedType>> {
        self.local.find_loaded(name)
    }

    /// Resolve strictly from this module's package; the parent is never
    /// consulted. Use this when the type must come from this module.
    pub fn find_in_module(&self, name: &str) -> Result<Arc<LoadedType>, ResolveError> {
        self.local.find(name)
    }

    /// Number of types this module has materialized so far.
    pub fn loaded_count(&self) -> usize {
        self.local.loaded_count()
    }

    pub fn package_digest(&self) -> anyhow::Result<String> {
        package_digest(self.local.archive())
    }

    /// The package's isolated content.
    pub fn local_scope(&self) -> &LocalScope {
        &self.local
    }
}

impl TypeScope for ModuleLoader {
    /// Module content first; the parent only when the module does not hold the
    /// name. A unit that exists but fails to materialize is reported as is.
    fn resolve_type(&self, name: &str) -> Result<Arc<LoadedType>, ResolveError> {
        match self.local.find(name) {
            Ok(loaded) => Ok(loaded),
            Err(err) if err.is_not_found() => match &self.parent {
                Some(parent) => {
                    trace!(type_name = name, module = %self.location(), parent = %parent.describe(), "delegating to parent");
                    parent.resolve_type(name)
                }
                None => Err(ResolveError::not_found(name, self.describe())),
            },
            Err(err) => Err(err),
        }
    }

    fn resolve_resource(&self, name: &str) -> anyhow::Result<Option<Resource>> {
        if let Some(found) = self.local.resource(name)? {
            return Ok(Some(found));
        }
        match &self.parent {
            Some(parent) => {
                trace!(resource = name, module = %self.location(), "resource delegated to parent");
                parent.resolve_resource(name)
            }
            None => Ok(None),
        }
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ModuleLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModuleLoader{{url={}}}", self.location())
    }
}

impl fmt::Debug for ModuleLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleLoader")
            .field("location", self.location())
            .field("upgrade_types", &self.upgrade_types)
            .field("parent", &self.parent.as_ref().map(|p| p.describe()))
            .finish()
    }
}

// =============================================================================
// Builder
// =============================================================================

enum PackageSource {
    Location(PackageLocation),
    Archive(Box<dyn PackageArchive>),
}

/// Configures and constructs a [`ModuleLoader`].
pub struct ModuleLoaderBuilder {
    source: PackageSource,
    parent: Option<Arc<dyn TypeScope>>,
    config: LoaderConfig,
    scanner: Arc<dyn MarkerScanner>,
    oracle: Arc<dyn SubtypeOracle>,
    definer: Arc<dyn TypeDefiner>,
}

impl ModuleLoaderBuilder {
    fn new(source: PackageSource) -> Self {
        Self {
            source,
            parent: None,
            config: LoaderConfig::default(),
            scanner: Arc::new(UnitMarkerScanner),
            oracle: Arc::new(HierarchyOracle),
            definer: Arc::new(UnitDefiner),
        }
    }

    pub fn parent(mut self, parent: Arc<dyn TypeScope>) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn parent_opt(mut self, parent: Option<Arc<dyn TypeScope>>) -> Self {
        self.parent = parent;
        self
    }

    pub fn config(mut self, config: LoaderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn marker_scanner(mut self, scanner: Arc<dyn MarkerScanner>) -> Self {
        self.scanner = scanner;
        self
    }

    pub fn subtype_oracle(mut self, oracle: Arc<dyn SubtypeOracle>) -> Self {
        self.oracle = oracle;
        self
    }

    pub fn definer(mut self, definer: Arc<dyn TypeDefiner>) -> Self {
        self.definer = definer;
        self
    }

    pub fn build(self) -> Result<ModuleLoader, LoadError> {
        let ModuleLoaderBuilder {
            source,
            parent,
            config,
            scanner,
            oracle,
            definer,
        } = self;

        config
            .validate()
            .map_err(|source| LoadError::Config { source })?;

        let archive = match source {
            PackageSource::Archive(archive) => archive,
            PackageSource::Location(location) => {
                open_archive(&location).map_err(|source| LoadError::Archive { location, source })?
            }
        };
        let local = LocalScope::new(archive, definer, &config.unit_extension);
        debug!(package = %local.location(), "classifying module package");

        let (upgrade_types, classification) =
            UpgradeClassifier::new(&config, scanner.as_ref(), oracle.as_ref()).classify(&local)?;

        // Must stay last: nothing above may resolve through the parent.
        Ok(ModuleLoader {
            local,
            upgrade_types,
            classification,
            parent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::StaticScope;
    use module_package::{MemoryArchive, UnitHeader};

    fn runtime() -> Arc<dyn TypeScope> {
        Arc::new(
            StaticScope::new(PackageLocation::memory("runtime").unwrap())
                .with_type(UnitHeader::new("Actor"))
                .with_type(UnitHeader::new("com.x.Shared"))
                .with_resource("shared.txt", "from parent"),
        )
    }

    fn module() -> MemoryArchive {
        MemoryArchive::new(PackageLocation::memory("module").unwrap())
            .with_manifest("Upgrade-Classes: com.x.Foo\n")
            .with_unit(&UnitHeader::new("com.x.Foo").extends("Actor"))
            .unwrap()
            .with_unit(&UnitHeader::new("com.x.Shared"))
            .unwrap()
            .with_entry("shared.txt", "from module")
    }

    #[test]
    fn test_display_names_location() {
        let loader = ModuleLoader::from_archive(Box::new(module()), None).unwrap();
        assert_eq!(loader.to_string(), "ModuleLoader{url=memory:module}");
        assert_eq!(loader.describe(), loader.to_string());
    }

    #[test]
    fn test_module_shadows_parent() {
        let loader = ModuleLoader::from_archive(Box::new(module()), Some(runtime())).unwrap();
        let shared = loader.resolve_type("com.x.Shared").unwrap();
        assert_eq!(shared.origin().as_str(), "memory:module");
        let res = loader.resolve_resource("shared.txt").unwrap().unwrap();
        assert_eq!(res.bytes(), b"from module");
    }

    #[test]
    fn test_fallback_only_on_delegated_path() {
        let loader = ModuleLoader::from_archive(Box::new(module()), Some(runtime())).unwrap();
        let actor = loader.resolve_type("Actor").unwrap();
        assert_eq!(actor.origin().as_str(), "memory:runtime");
        assert!(loader.find_in_module("Actor").unwrap_err().is_not_found());
        assert!(loader.find_loaded_in_module("Actor").is_none());
    }

    #[test]
    fn test_no_parent_final_not_found() {
        let loader = ModuleLoader::from_archive(Box::new(module()), None).unwrap();
        let err = loader.resolve_type("Actor").unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("ModuleLoader{url=memory:module}"));
        assert!(loader.resolve_resource("missing.txt").unwrap().is_none());
    }

    #[test]
    fn test_invalid_local_unit_does_not_fall_back() {
        // Broken local copy of a type the parent also has. The marker scan
        // would reject the unit, so classification is swapped for one that
        // ignores it.
        struct NoMarkers;
        impl MarkerScanner for NoMarkers {
            fn has_marker(&self, _: &mut dyn std::io::Read, _: &str) -> anyhow::Result<bool> {
                Ok(false)
            }
        }
        let archive = MemoryArchive::new(PackageLocation::memory("broken").unwrap())
            .with_entry("Actor.unit", "{ not json");
        let loader = ModuleLoader::builder_for_archive(Box::new(archive))
            .marker_scanner(Arc::new(NoMarkers))
            .parent(runtime())
            .build()
            .unwrap();
        let err = loader.resolve_type("Actor").unwrap_err();
        assert!(matches!(err, ResolveError::Invalid { .. }));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let err = ModuleLoader::builder_for_archive(Box::new(module()))
            .config(LoaderConfig {
                marker: String::new(),
                ..LoaderConfig::default()
            })
            .build()
            .unwrap_err();
        assert!(matches!(err, LoadError::Config { .. }));
    }

    #[test]
    fn test_parent_result_not_cached_locally() {
        let loader = ModuleLoader::from_archive(Box::new(module()), Some(runtime())).unwrap();
        let a = loader.resolve_type("Actor").unwrap();
        let b = loader.resolve_type("Actor").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(loader.loaded_count(), 0);
    }
}
