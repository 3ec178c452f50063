//! Marker scanning.
//!
//! A marker scanner answers one question about one unit: does it declare a
//! given capability marker? It reads the raw entry bytes, so a host that stores
//! units in a different encoding only has to swap the scanner.

use anyhow::Result;
use std::io::Read;

use crate::unit::read_unit;

pub trait MarkerScanner: Send + Sync {
    /// Report whether the unit read from `reader` declares `marker`.
    fn has_marker(&self, reader: &mut dyn Read, marker: &str) -> Result<bool>;
}

/// Scanner for the JSON unit header format.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnitMarkerScanner;

impl MarkerScanner for UnitMarkerScanner {
    fn has_marker(&self, reader: &mut dyn Read, marker: &str) -> Result<bool> {
        let header = read_unit(reader)?;
        Ok(header.has_marker(marker))
    }
}
