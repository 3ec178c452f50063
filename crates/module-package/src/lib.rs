//! Module Package
//!
//! Storage-side building blocks for loadable module packages.
//!
//! This crate provides:
//! - [`location`]: Package locators (paths and URLs)
//! - [`archive`]: Directory, tar and in-memory package archives, plus the
//!   enumeration of loadable entries
//! - [`manifest`]: The package metadata descriptor
//! - [`unit`]: The compiled unit header format
//! - [`scan`]: Capability marker scanning over raw unit bytes
//!
//! Nothing here resolves or materializes types; that lives in `module-resolver`.

pub mod archive;
pub mod location;
pub mod manifest;
pub mod scan;
pub mod unit;
pub mod utils;

pub use archive::{
    loadable_entries, open_archive, DirectoryArchive, LoadableEntry, MemoryArchive,
    PackageArchive, TarArchive,
};
pub use location::PackageLocation;
pub use manifest::{Manifest, DESCRIPTOR_PATH};
pub use scan::{MarkerScanner, UnitMarkerScanner};
pub use unit::{
    entry_to_type_name, parse_unit, read_unit, type_name_to_entry, UnitHeader, UNIT_EXTENSION,
};
pub use utils::package_digest;
