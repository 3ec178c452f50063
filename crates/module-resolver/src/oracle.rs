//! Subtype checks for wildcard classification.
//!
//! The oracle decides whether a unit in a package is a subtype of a base type
//! by looking only at that package. It is handed a [`LocalScope`], never a
//! loader with a parent, so its answer cannot depend on what else happens to
//! be loaded in the process.

use anyhow::{anyhow, Context, Result};
use module_package::parse_unit;
use std::collections::HashSet;

use crate::scope::LocalScope;

pub trait SubtypeOracle: Send + Sync {
    /// Whether `type_name` is `base` or a (transitive) subtype of it.
    fn is_subtype(&self, scope: &LocalScope, type_name: &str, base: &str) -> Result<bool>;
}

/// Walks `extends` and `implements` edges through unit headers without
/// materializing anything.
///
/// Reaching `base` by name answers yes; the base type itself need not be in the
/// package. A supertype that is neither `base` nor present in the package is
/// an error, as is a cycle.
#[derive(Debug, Default, Clone, Copy)]
pub struct HierarchyOracle;

impl HierarchyOracle {
    fn walk(
        &self,
        scope: &LocalScope,
        name: &str,
        base: &str,
        path: &mut Vec<String>,
        cleared: &mut HashSet<String>,
    ) -> Result<bool> {
        if name == base {
            return Ok(true);
        }
        if cleared.contains(name) {
            return Ok(false);
        }
        if path.iter().any(|p| p == name) {
            return Err(anyhow!(
                "cyclic type hierarchy: {} -> {}",
                path.join(" -> "),
                name
            ));
        }

        let bytes = scope.unit_bytes(name)?.ok_or_else(|| {
            anyhow!(
                "supertype {} of {} is not in package {}",
                name,
                path.last().map(String::as_str).unwrap_or("?"),
                scope.location()
            )
        })?;
        let header = parse_unit(&bytes).with_context(|| format!("read header of {}", name))?;
        if header.name != name {
            return Err(anyhow!(
                "unit for {} declares type {} (wrong name)",
                name,
                header.name
            ));
        }

        path.push(name.to_string());
        for parent in header.supertypes() {
            if self.walk(scope, parent, base, path, cleared)? {
                path.pop();
                return Ok(true);
            }
        }
        path.pop();
        cleared.insert(name.to_string());
        Ok(false)
    }
}

impl SubtypeOracle for HierarchyOracle {
    fn is_subtype(&self, scope: &LocalScope, type_name: &str, base: &str) -> Result<bool> {
        self.walk(scope, type_name, base, &mut Vec::new(), &mut HashSet::new())
    }
}
