//! Type materialization.
//!
//! A [`TypeDefiner`] turns the raw bytes of one unit into a [`LoadedType`]. The
//! loader calls it at most once per name; caching and identity are handled by
//! the caller.

use anyhow::{anyhow, Result};
use module_package::{parse_unit, PackageLocation};

use crate::types::LoadedType;

pub trait TypeDefiner: Send + Sync {
    fn define(&self, name: &str, bytes: &[u8], origin: &PackageLocation) -> Result<LoadedType>;
}

/// Definer for the JSON unit header format.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnitDefiner;

impl TypeDefiner for UnitDefiner {
    fn define(&self, name: &str, bytes: &[u8], origin: &PackageLocation) -> Result<LoadedType> {
        let header = parse_unit(bytes)?;
        if header.name != name {
            return Err(anyhow!(
                "unit for {} declares type {} (wrong name)",
                name,
                header.name
            ));
        }
        Ok(LoadedType::from_header(header, origin.clone()))
    }
}
