//! Loader error types.
//!
//! Construction and resolution fail in different ways and callers treat them
//! differently: a [`LoadError`] means the package is unusable, while a
//! [`ResolveError::NotFound`] is ordinary control flow that drives parent
//! fallback.

use module_package::PackageLocation;

/// A module loader could not be constructed.
#[derive(Debug)]
pub enum LoadError {
    /// The package could not be opened or enumerated.
    Archive {
        location: PackageLocation,
        source: anyhow::Error,
    },

    /// The metadata descriptor exists but could not be read or parsed.
    Descriptor {
        location: PackageLocation,
        source: anyhow::Error,
    },

    /// A unit could not be read while scanning for the capability marker.
    Scan {
        type_name: String,
        marker: String,
        source: anyhow::Error,
    },

    /// The subtype check for a unit failed, e.g. a supertype outside the package.
    Subtype {
        type_name: String,
        base: String,
        source: anyhow::Error,
    },

    /// The loader configuration is unusable.
    Config { source: anyhow::Error },
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Archive { location, source } => {
                write!(f, "cannot open module package {}: {:#}", location, source)
            }
            LoadError::Descriptor { location, source } => {
                write!(f, "invalid descriptor in {}: {:#}", location, source)
            }
            LoadError::Scan {
                type_name,
                marker,
                source,
            } => write!(
                f,
                "error scanning {} for {} marker: {:#}",
                type_name, marker, source
            ),
            LoadError::Subtype {
                type_name,
                base,
                source,
            } => write!(
                f,
                "cannot decide whether {} is a subtype of {}: {:#}",
                type_name, base, source
            ),
            LoadError::Config { source } => write!(f, "invalid loader config: {:#}", source),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Archive { source, .. }
            | LoadError::Descriptor { source, .. }
            | LoadError::Scan { source, .. }
            | LoadError::Subtype { source, .. }
            | LoadError::Config { source } => Some(&**source),
        }
    }
}

/// A type could not be resolved.
#[derive(Debug)]
pub enum ResolveError {
    /// No scope that was consulted holds the type.
    NotFound {
        name: String,
        /// Description of the scope that gave the final answer.
        scope: String,
    },

    /// The type exists in the scope but could not be materialized.
    Invalid {
        name: String,
        scope: String,
        source: anyhow::Error,
    },
}

impl ResolveError {
    pub fn not_found(name: &str, scope: impl Into<String>) -> Self {
        ResolveError::NotFound {
            name: name.to_string(),
            scope: scope.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ResolveError::NotFound { .. })
    }

    pub fn name(&self) -> &str {
        match self {
            ResolveError::NotFound { name, .. } | ResolveError::Invalid { name, .. } => name,
        }
    }
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveError::NotFound { name, scope } => {
                write!(f, "type {} not found (searched {})", name, scope)
            }
            ResolveError::Invalid {
                name,
                scope,
                source,
            } => write!(f, "cannot load {} from {}: {:#}", name, scope, source),
        }
    }
}

impl std::error::Error for ResolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResolveError::NotFound { .. } => None,
            ResolveError::Invalid { source, .. } => Some(&**source),
        }
    }
}
