use module_package::{PackageLocation, UnitHeader};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_SERIAL: AtomicU64 = AtomicU64::new(1);

/// Process-unique number assigned to every materialization.
///
/// Two handles with the same serial are the same type; two materializations of
/// the same name from different scopes get different serials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TypeSerial(u64);

impl TypeSerial {
    fn next() -> Self {
        TypeSerial(NEXT_SERIAL.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// A materialized type.
#[derive(Debug, Serialize)]
pub struct LoadedType {
    serial: TypeSerial,
    name: String,
    supertype: Option<String>,
    interfaces: Vec<String>,
    markers: Vec<String>,
    origin: PackageLocation,
}

impl LoadedType {
    pub fn from_header(header: UnitHeader, origin: PackageLocation) -> Self {
        Self {
            serial: TypeSerial::next(),
            name: header.name,
            supertype: header.extends,
            interfaces: header.implements,
            markers: header.markers,
            origin,
        }
    }

    pub fn serial(&self) -> TypeSerial {
        self.serial
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn supertype(&self) -> Option<&str> {
        self.supertype.as_deref()
    }

    pub fn interfaces(&self) -> &[String] {
        &self.interfaces
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    pub fn has_marker(&self, marker: &str) -> bool {
        self.markers.iter().any(|m| m == marker)
    }

    /// Package the type was materialized from.
    pub fn origin(&self) -> &PackageLocation {
        &self.origin
    }

    /// Identity comparison.
    pub fn same_type(a: &Arc<LoadedType>, b: &Arc<LoadedType>) -> bool {
        Arc::ptr_eq(a, b)
    }
}

impl fmt::Display for LoadedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{} ({})", self.name, self.serial.0, self.origin)
    }
}

/// A named byte resource found in some scope.
#[derive(Debug, Clone)]
pub struct Resource {
    name: String,
    origin: PackageLocation,
    bytes: Arc<[u8]>,
}

impl Resource {
    pub fn new(name: impl Into<String>, origin: PackageLocation, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            origin,
            bytes: bytes.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn origin(&self) -> &PackageLocation {
        &self.origin
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Resource names are looked up without a leading `/`.
pub(crate) fn normalize_resource_name(name: &str) -> &str {
    name.strip_prefix('/').unwrap_or(name)
}
