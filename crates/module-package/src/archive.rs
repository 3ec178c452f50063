//! Package archives.
//!
//! A package is a read-only tree of named entries. Three storage formats are
//! supported:
//!
//! | Type | Source |
//! |------|--------|
//! | [`DirectoryArchive`] | An unpacked directory; entries are read lazily |
//! | [`TarArchive`] | A `.tar` or gzip-compressed tar file, read fully at open |
//! | [`MemoryArchive`] | Entries supplied in memory (tests, embedded runtimes) |
//!
//! Entry names always use `/` separators and never start with `/`.

use anyhow::{anyhow, Context, Result};
use flate2::read::GzDecoder;
use std::collections::BTreeMap;
use std::fs;
use std::io::{Cursor, Read};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::location::PackageLocation;
use crate::manifest::{Manifest, DESCRIPTOR_PATH};
use crate::unit::{entry_to_type_name, type_name_to_entry, UnitHeader, UNIT_EXTENSION};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Read access to the entries of one package.
pub trait PackageArchive: Send + Sync {
    fn location(&self) -> &PackageLocation;

    /// Every file entry, sorted.
    fn entry_names(&self) -> Vec<String>;

    fn contains(&self, entry: &str) -> bool;

    /// Open an entry for reading. `Ok(None)` means the entry does not exist;
    /// an error means it exists but could not be read.
    fn open_entry(&self, entry: &str) -> Result<Option<Box<dyn Read + Send + '_>>>;

    fn read_entry(&self, entry: &str) -> Result<Option<Vec<u8>>> {
        let Some(mut reader) = self.open_entry(entry)? else {
            return Ok(None);
        };
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .with_context(|| format!("read {} from {}", entry, self.location()))?;
        Ok(Some(bytes))
    }

    /// Parse the descriptor at `path`. An absent descriptor is `Ok(None)`.
    fn manifest_at(&self, path: &str) -> Result<Option<Manifest>> {
        let Some(bytes) = self.read_entry(path)? else {
            return Ok(None);
        };
        let text = String::from_utf8(bytes)
            .with_context(|| format!("{} in {} is not UTF-8", path, self.location()))?;
        let manifest = Manifest::parse(&text)
            .with_context(|| format!("parse {} in {}", path, self.location()))?;
        Ok(Some(manifest))
    }

    fn manifest(&self) -> Result<Option<Manifest>> {
        self.manifest_at(DESCRIPTOR_PATH)
    }
}

/// A unit entry and the type name it maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadableEntry {
    pub type_name: String,
    pub entry: String,
}

/// Enumerate the loadable entries of a package, in entry order.
pub fn loadable_entries(archive: &dyn PackageArchive, extension: &str) -> Vec<LoadableEntry> {
    archive
        .entry_names()
        .into_iter()
        .filter_map(|entry| {
            entry_to_type_name(&entry, extension).map(|type_name| LoadableEntry { type_name, entry })
        })
        .collect()
}

/// Open the archive behind a location.
pub fn open_archive(location: &PackageLocation) -> Result<Box<dyn PackageArchive>> {
    if location.is_memory() {
        return Err(anyhow!(
            "{} is an in-memory package; supply the archive directly",
            location
        ));
    }
    let path = location
        .to_file_path()
        .ok_or_else(|| anyhow!("unsupported package location {}", location))?;
    let meta = fs::metadata(&path).with_context(|| format!("open package {}", path.display()))?;
    if meta.is_dir() {
        Ok(Box::new(DirectoryArchive::open(location.clone(), &path)?))
    } else {
        Ok(Box::new(TarArchive::open(location.clone(), &path)?))
    }
}

fn normalize_entry(name: &str) -> &str {
    let name = name.strip_prefix("./").unwrap_or(name);
    name.trim_start_matches('/')
}

// =============================================================================
// DirectoryArchive
// =============================================================================

/// An unpacked package on disk. The entry listing is taken once at open; entry
/// bytes are read on demand.
#[derive(Debug)]
pub struct DirectoryArchive {
    location: PackageLocation,
    root: PathBuf,
    entries: Vec<String>,
}

impl DirectoryArchive {
    pub fn open(location: PackageLocation, root: &Path) -> Result<Self> {
        let mut entries = Vec::new();
        collect_files(root, root, &mut entries)?;
        entries.sort();
        debug!(root = %root.display(), entries = entries.len(), "opened directory package");
        Ok(Self {
            location,
            root: root.to_path_buf(),
            entries,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn collect_files(root: &Path, dir: &Path, out: &mut Vec<String>) -> Result<()> {
    let listing = fs::read_dir(dir).with_context(|| format!("read {}", dir.display()))?;
    for entry in listing {
        let entry = entry.with_context(|| format!("list {}", dir.display()))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .with_context(|| format!("stat {}", path.display()))?;
        if file_type.is_dir() {
            collect_files(root, &path, out)?;
        } else if file_type.is_file() {
            out.push(entry_name(root, &path)?);
        } else if file_type.is_symlink() {
            // Linked files are entries; linked directories are not walked.
            match fs::metadata(&path) {
                Ok(meta) if meta.is_file() => out.push(entry_name(root, &path)?),
                Ok(_) => debug!(path = %path.display(), "skipping symlinked directory"),
                Err(e) => debug!(path = %path.display(), error = %e, "skipping broken symlink"),
            }
        } else {
            debug!(path = %path.display(), "skipping special file");
        }
    }
    Ok(())
}

fn entry_name(root: &Path, path: &Path) -> Result<String> {
    let rel = path
        .strip_prefix(root)
        .with_context(|| format!("{} escapes {}", path.display(), root.display()))?;
    let mut parts = Vec::new();
    for component in rel.components() {
        if let Component::Normal(s) = component {
            let part = s
                .to_str()
                .ok_or_else(|| anyhow!("non UTF-8 entry path {}", path.display()))?;
            parts.push(part);
        }
    }
    Ok(parts.join("/"))
}

impl PackageArchive for DirectoryArchive {
    fn location(&self) -> &PackageLocation {
        &self.location
    }

    fn entry_names(&self) -> Vec<String> {
        self.entries.clone()
    }

    fn contains(&self, entry: &str) -> bool {
        self.entries
            .binary_search_by(|e| e.as_str().cmp(normalize_entry(entry)))
            .is_ok()
    }

    fn open_entry(&self, entry: &str) -> Result<Option<Box<dyn Read + Send + '_>>> {
        if !self.contains(entry) {
            return Ok(None);
        }
        let path = self.root.join(normalize_entry(entry));
        let file = fs::File::open(&path).with_context(|| format!("open {}", path.display()))?;
        Ok(Some(Box::new(file)))
    }
}

// =============================================================================
// TarArchive
// =============================================================================

/// A tar package, optionally gzip-compressed. Entries are held in memory.
#[derive(Debug)]
pub struct TarArchive {
    location: PackageLocation,
    entries: BTreeMap<String, Arc<[u8]>>,
}

impl TarArchive {
    pub fn open(location: PackageLocation, path: &Path) -> Result<Self> {
        let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
        let archive = Self::from_bytes(location, &bytes)
            .with_context(|| format!("unpack {}", path.display()))?;
        debug!(path = %path.display(), entries = archive.entries.len(), "opened tar package");
        Ok(archive)
    }

    /// Decode a tar stream; gzip is detected from the magic bytes.
    pub fn from_bytes(location: PackageLocation, bytes: &[u8]) -> Result<Self> {
        if bytes.starts_with(&GZIP_MAGIC) {
            Self::from_reader(location, GzDecoder::new(bytes))
        } else {
            Self::from_reader(location, bytes)
        }
    }

    fn from_reader<R: Read>(location: PackageLocation, reader: R) -> Result<Self> {
        let mut tar = tar::Archive::new(reader);
        let mut entries = BTreeMap::new();
        for entry in tar.entries().context("read tar entries")? {
            let mut entry = entry.context("read tar entry")?;
            if !entry.header().entry_type().is_file() {
                continue;
            }
            let name = {
                let path = entry.path().context("tar entry path")?;
                let text = path
                    .to_str()
                    .ok_or_else(|| anyhow!("non UTF-8 tar entry path {}", path.display()))?;
                normalize_entry(text).to_string()
            };
            let mut data = Vec::new();
            entry
                .read_to_end(&mut data)
                .with_context(|| format!("read tar entry {}", name))?;
            entries.insert(name, Arc::from(data));
        }
        Ok(Self { location, entries })
    }
}

impl PackageArchive for TarArchive {
    fn location(&self) -> &PackageLocation {
        &self.location
    }

    fn entry_names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    fn contains(&self, entry: &str) -> bool {
        self.entries.contains_key(normalize_entry(entry))
    }

    fn open_entry(&self, entry: &str) -> Result<Option<Box<dyn Read + Send + '_>>> {
        Ok(self
            .entries
            .get(normalize_entry(entry))
            .map(|data| Box::new(Cursor::new(data.clone())) as Box<dyn Read + Send + '_>))
    }
}

// =============================================================================
// MemoryArchive
// =============================================================================

/// Entries held in memory, built up with the `with_*` methods.
#[derive(Debug, Clone)]
pub struct MemoryArchive {
    location: PackageLocation,
    entries: BTreeMap<String, Arc<[u8]>>,
}

impl MemoryArchive {
    pub fn new(location: PackageLocation) -> Self {
        Self {
            location,
            entries: BTreeMap::new(),
        }
    }

    pub fn with_entry(mut self, name: &str, bytes: impl Into<Vec<u8>>) -> Self {
        let bytes: Vec<u8> = bytes.into();
        self.entries
            .insert(normalize_entry(name).to_string(), Arc::from(bytes));
        self
    }

    /// Add a unit under its conventional entry name.
    pub fn with_unit(self, header: &UnitHeader) -> Result<Self> {
        let entry = type_name_to_entry(&header.name, UNIT_EXTENSION);
        Ok(self.with_entry(&entry, header.to_bytes()?))
    }

    pub fn with_manifest(self, text: &str) -> Self {
        self.with_entry(DESCRIPTOR_PATH, text.as_bytes())
    }
}

impl PackageArchive for MemoryArchive {
    fn location(&self) -> &PackageLocation {
        &self.location
    }

    fn entry_names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    fn contains(&self, entry: &str) -> bool {
        self.entries.contains_key(normalize_entry(entry))
    }

    fn open_entry(&self, entry: &str) -> Result<Option<Box<dyn Read + Send + '_>>> {
        Ok(self
            .entries
            .get(normalize_entry(entry))
            .map(|data| Box::new(Cursor::new(data.clone())) as Box<dyn Read + Send + '_>))
    }
}
