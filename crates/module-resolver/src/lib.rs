//! Module Resolver
//!
//! Isolated module loading with parent fallback and hot-upgrade classification.
//!
//! This crate provides:
//! - [`loader`]: [`ModuleLoader`], one loaded module package
//! - [`scope`]: The [`TypeScope`] trait and the isolated/static scopes
//! - [`classifier`]: Computing the [`UpgradeSet`] of a package
//! - [`oracle`]: Subtype checks used by wildcard classification
//! - [`cache`]: Per-name keyed cache of materialized types
//!
//! # Resolution order
//!
//! A module always answers from its own package first. Only when the package
//! does not contain a name is the parent scope asked, and the parent's answer is
//! returned unchanged. A module can therefore redefine a type that the parent
//! also provides.
//!
//! # Upgrade classification
//!
//! Types become upgrade-eligible by being listed in the package descriptor
//! (`Upgrade-Classes`), by being a subtype of the base actor type when the
//! descriptor says `*`, or by declaring the `Upgrade` marker. The set is
//! computed once while the loader is built and never changes afterwards.

pub mod cache;
pub mod classifier;
pub mod config;
pub mod definer;
pub mod env_utils;
pub mod error;
pub mod loader;
pub mod oracle;
pub mod scope;
pub mod types;

pub use cache::TypeCache;
pub use classifier::{ClassificationReport, UpgradeClassifier, UpgradeSet};
pub use config::LoaderConfig;
pub use definer::{TypeDefiner, UnitDefiner};
pub use error::{LoadError, ResolveError};
pub use loader::{ModuleLoader, ModuleLoaderBuilder};
pub use oracle::{HierarchyOracle, SubtypeOracle};
pub use scope::{LocalScope, StaticScope, TypeScope};
pub use types::{LoadedType, Resource, TypeSerial};
