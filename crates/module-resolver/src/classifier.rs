//! # Upgrade Classification
//!
//! Decides, once per package, which of its types may be hot-swapped into
//! running actors. Two sources contribute and their results are unioned:
//!
//! | Source | Trigger | Contribution |
//! |--------|---------|--------------|
//! | Descriptor list | `Upgrade-Classes: a.B c.D` | the listed names, verbatim |
//! | Descriptor wildcard | `Upgrade-Classes: *` | every unit that is a subtype of the base type |
//! | Marker scan | always | every unit declaring the `Upgrade` marker |
//!
//! Listed names are not checked against the package. Any read or parse
//! failure aborts classification; a partial set is never produced.

use module_package::MarkerScanner;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, info};

use crate::config::LoaderConfig;
use crate::error::LoadError;
use crate::oracle::SubtypeOracle;
use crate::scope::LocalScope;

/// The frozen set of upgrade-eligible type names of one package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct UpgradeSet {
    names: BTreeSet<String>,
}

impl UpgradeSet {
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl<'a> IntoIterator for &'a UpgradeSet {
    type Item = &'a String;
    type IntoIter = std::collections::btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.iter()
    }
}

/// Accumulates names during classification; only [`UpgradeSet`] escapes.
#[derive(Debug, Default)]
struct UpgradeSetBuilder {
    names: BTreeSet<String>,
}

impl UpgradeSetBuilder {
    fn add(&mut self, name: &str) {
        self.names.insert(name.to_string());
    }

    fn build(self) -> UpgradeSet {
        UpgradeSet { names: self.names }
    }
}

/// How the upgrade set was put together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassificationReport {
    /// Whether the package has a metadata descriptor at all.
    pub has_descriptor: bool,
    /// Whether the descriptor requested a wildcard subtype scan.
    pub wildcard: bool,
    /// Names listed explicitly in the descriptor.
    pub declared: usize,
    /// Units matched by the wildcard subtype scan.
    pub subtype_matches: usize,
    /// Units carrying the capability marker.
    pub marker_matches: usize,
    /// Loadable units in the package.
    pub loadable_entries: usize,
}

pub struct UpgradeClassifier<'a> {
    config: &'a LoaderConfig,
    scanner: &'a dyn MarkerScanner,
    oracle: &'a dyn SubtypeOracle,
}

impl<'a> UpgradeClassifier<'a> {
    pub fn new(
        config: &'a LoaderConfig,
        scanner: &'a dyn MarkerScanner,
        oracle: &'a dyn SubtypeOracle,
    ) -> Self {
        Self {
            config,
            scanner,
            oracle,
        }
    }

    pub fn classify(
        &self,
        scope: &LocalScope,
    ) -> Result<(UpgradeSet, ClassificationReport), LoadError> {
        let mut builder = UpgradeSetBuilder::default();
        let mut report = ClassificationReport::default();
        let entries = scope.loadable_entries();
        report.loadable_entries = entries.len();

        let manifest = scope
            .archive()
            .manifest_at(&self.config.descriptor_path)
            .map_err(|source| LoadError::Descriptor {
                location: scope.location().clone(),
                source,
            })?;
        report.has_descriptor = manifest.is_some();

        let declared = manifest
            .as_ref()
            .and_then(|m| m.get(&self.config.upgrade_attribute))
            .map(str::trim)
            .filter(|v| !v.is_empty());

        match declared {
            Some(value) if value == self.config.wildcard => {
                report.wildcard = true;
                for entry in &entries {
                    let is_subtype = self
                        .oracle
                        .is_subtype(scope, &entry.type_name, &self.config.base_type)
                        .map_err(|source| LoadError::Subtype {
                            type_name: entry.type_name.clone(),
                            base: self.config.base_type.clone(),
                            source,
                        })?;
                    if is_subtype {
                        debug!(type_name = %entry.type_name, base = %self.config.base_type, "upgrade type by subtype");
                        builder.add(&entry.type_name);
                        report.subtype_matches += 1;
                    }
                }
            }
            Some(value) => {
                for name in value.split_whitespace() {
                    debug!(type_name = name, "upgrade type by declaration");
                    builder.add(name);
                    report.declared += 1;
                }
            }
            None => {}
        }

        for entry in &entries {
            let scan_error = |source: anyhow::Error| LoadError::Scan {
                type_name: entry.type_name.clone(),
                marker: self.config.marker.clone(),
                source,
            };
            let mut reader = scope
                .archive()
                .open_entry(&entry.entry)
                .map_err(scan_error)?
                .ok_or_else(|| {
                    scan_error(anyhow::anyhow!(
                        "entry {} disappeared from {}",
                        entry.entry,
                        scope.location()
                    ))
                })?;
            if self
                .scanner
                .has_marker(&mut reader, &self.config.marker)
                .map_err(scan_error)?
            {
                debug!(type_name = %entry.type_name, marker = %self.config.marker, "upgrade type by marker");
                builder.add(&entry.type_name);
                report.marker_matches += 1;
            }
        }

        let upgrade_types = builder.build();
        info!(
            package = %scope.location(),
            declared = report.declared,
            wildcard = report.wildcard,
            subtype_matches = report.subtype_matches,
            marker_matches = report.marker_matches,
            total = upgrade_types.len(),
            "classified upgrade types"
        );
        Ok((upgrade_types, report))
    }
}
