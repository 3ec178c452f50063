//! # Resolution Scopes
//!
//! A scope answers "which type is `name`?" and "what are the bytes of resource
//! `name`?". Scopes chain: a [`ModuleLoader`](crate::ModuleLoader) looks in its
//! own package first and asks its parent scope only when the package does not
//! hold the name.
//!
//! ```text
//! ┌──────────────────────┐   miss   ┌──────────────────────┐
//! │ ModuleLoader         │ ───────► │ parent: TypeScope    │
//! │  └─ LocalScope       │          │ (StaticScope, or     │
//! │      archive + cache │          │  another loader)     │
//! └──────────────────────┘          └──────────────────────┘
//! ```
//!
//! [`LocalScope`] is the isolated half on its own. It never sees a parent,
//! which is what upgrade classification runs against.

use anyhow::Result;
use module_package::{
    loadable_entries, type_name_to_entry, LoadableEntry, PackageArchive, PackageLocation,
    UnitHeader,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

use crate::cache::TypeCache;
use crate::definer::TypeDefiner;
use crate::error::ResolveError;
use crate::types::{normalize_resource_name, LoadedType, Resource};

/// A scope that types and resources can be resolved against.
pub trait TypeScope: Send + Sync {
    /// Resolve a type, including any fallback this scope performs.
    fn resolve_type(&self, name: &str) -> Result<Arc<LoadedType>, ResolveError>;

    /// Look up a resource. `Ok(None)` is a definitive miss.
    fn resolve_resource(&self, name: &str) -> Result<Option<Resource>>;

    /// Short human-readable identification, used in errors and logs.
    fn describe(&self) -> String;
}

// =============================================================================
// LocalScope
// =============================================================================

/// The isolated content of one package: its archive, its unit extension, and
/// the cache of types materialized from it.
pub struct LocalScope {
    archive: Box<dyn PackageArchive>,
    definer: Arc<dyn TypeDefiner>,
    cache: TypeCache,
    extension: String,
}

impl LocalScope {
    pub fn new(
        archive: Box<dyn PackageArchive>,
        definer: Arc<dyn TypeDefiner>,
        extension: &str,
    ) -> Self {
        Self {
            archive,
            definer,
            cache: TypeCache::new(),
            extension: extension.to_string(),
        }
    }

    pub fn location(&self) -> &PackageLocation {
        self.archive.location()
    }

    pub fn archive(&self) -> &dyn PackageArchive {
        self.archive.as_ref()
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn loadable_entries(&self) -> Vec<LoadableEntry> {
        loadable_entries(self.archive.as_ref(), &self.extension)
    }

    pub fn contains_type(&self, name: &str) -> bool {
        self.archive.contains(&self.entry_for(name))
    }

    /// Raw unit bytes for `name`, without materializing it.
    pub fn unit_bytes(&self, name: &str) -> Result<Option<Vec<u8>>> {
        self.archive.read_entry(&self.entry_for(name))
    }

    /// Cache-only lookup.
    pub fn find_loaded(&self, name: &str) -> Option<Arc<LoadedType>> {
        self.cache.get(name)
    }

    /// Cached type, or materialize it from this package. Never consults
    /// anything outside the package.
    pub fn find(&self, name: &str) -> Result<Arc<LoadedType>, ResolveError> {
        if let Some(loaded) = self.cache.get(name) {
            return Ok(loaded);
        }
        // The entry listing is fixed, so absent names never get a cache slot.
        if !self.contains_type(name) {
            trace!(type_name = name, package = %self.location(), "type not in package");
            return Err(ResolveError::not_found(name, self.describe()));
        }
        self.cache.get_or_try_insert(name, || self.materialize(name))
    }

    /// Number of types materialized from this package so far.
    pub fn loaded_count(&self) -> usize {
        self.cache.len()
    }

    pub fn resource(&self, name: &str) -> Result<Option<Resource>> {
        let name = normalize_resource_name(name);
        Ok(self
            .archive
            .read_entry(name)?
            .map(|bytes| Resource::new(name, self.location().clone(), bytes)))
    }

    pub fn describe(&self) -> String {
        format!("package {}", self.location())
    }

    fn entry_for(&self, name: &str) -> String {
        type_name_to_entry(name, &self.extension)
    }

    fn materialize(&self, name: &str) -> Result<Arc<LoadedType>, ResolveError> {
        let invalid = |source: anyhow::Error| ResolveError::Invalid {
            name: name.to_string(),
            scope: self.describe(),
            source,
        };
        let bytes = self
            .unit_bytes(name)
            .map_err(invalid)?
            .ok_or_else(|| ResolveError::not_found(name, self.describe()))?;
        let loaded = self
            .definer
            .define(name, &bytes, self.location())
            .map_err(invalid)?;
        trace!(type_name = name, serial = loaded.serial().get(), "materialized type");
        Ok(Arc::new(loaded))
    }
}

impl std::fmt::Debug for LocalScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalScope")
            .field("location", self.location())
            .field("extension", &self.extension)
            .field("cache", &self.cache)
            .finish()
    }
}

// =============================================================================
// StaticScope
// =============================================================================

/// A fixed set of types and resources supplied by the host, typically the
/// runtime's own types (`Actor`, ...) that modules link against.
#[derive(Debug, Clone)]
pub struct StaticScope {
    location: PackageLocation,
    types: HashMap<String, Arc<LoadedType>>,
    resources: HashMap<String, Resource>,
}

impl StaticScope {
    pub fn new(location: PackageLocation) -> Self {
        Self {
            location,
            types: HashMap::new(),
            resources: HashMap::new(),
        }
    }

    pub fn with_type(mut self, header: UnitHeader) -> Self {
        let name = header.name.clone();
        let loaded = LoadedType::from_header(header, self.location.clone());
        self.types.insert(name, Arc::new(loaded));
        self
    }

    pub fn with_resource(mut self, name: &str, bytes: impl Into<Vec<u8>>) -> Self {
        let name = normalize_resource_name(name).to_string();
        let bytes: Vec<u8> = bytes.into();
        let resource = Resource::new(name.clone(), self.location.clone(), bytes);
        self.resources.insert(name, resource);
        self
    }

    pub fn location(&self) -> &PackageLocation {
        &self.location
    }
}

impl TypeScope for StaticScope {
    fn resolve_type(&self, name: &str) -> Result<Arc<LoadedType>, ResolveError> {
        self.types
            .get(name)
            .cloned()
            .ok_or_else(|| ResolveError::not_found(name, self.describe()))
    }

    fn resolve_resource(&self, name: &str) -> Result<Option<Resource>> {
        Ok(self.resources.get(normalize_resource_name(name)).cloned())
    }

    fn describe(&self) -> String {
        format!("StaticScope{{url={}}}", self.location)
    }
}
