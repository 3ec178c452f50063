#![allow(dead_code)]
//! Shared test utilities for loader integration tests.
//!
//! - `PackageFixture`: builds a package as a directory or a `.tar.gz` on disk
//! - `runtime_scope`: the host scope modules fall back to
//! - assertion helpers with readable failure messages

use flate2::write::GzEncoder;
use flate2::Compression;
use module_package::{type_name_to_entry, PackageLocation, UnitHeader, DESCRIPTOR_PATH};
use module_resolver::{StaticScope, TypeScope};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Entries of a package under construction.
#[derive(Default, Clone)]
pub struct PackageFixture {
    entries: Vec<(String, Vec<u8>)>,
}

impl PackageFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn manifest(self, text: &str) -> Self {
        self.entry(DESCRIPTOR_PATH, text.as_bytes())
    }

    pub fn unit(self, header: UnitHeader) -> Self {
        let entry = type_name_to_entry(&header.name, "unit");
        let bytes = header.to_bytes().expect("serialize unit");
        self.entry(&entry, &bytes)
    }

    pub fn entry(mut self, name: &str, bytes: &[u8]) -> Self {
        self.entries.push((name.to_string(), bytes.to_vec()));
        self
    }

    /// Write as an unpacked directory under `tmp`.
    pub fn write_dir(&self, tmp: &TempDir, name: &str) -> PathBuf {
        let root = tmp.path().join(name);
        fs::create_dir_all(&root).expect("create package dir");
        for (entry, bytes) in &self.entries {
            let path = root.join(entry);
            fs::create_dir_all(path.parent().expect("entry parent")).expect("create entry dir");
            fs::write(&path, bytes).expect("write entry");
        }
        root
    }

    /// Write as a gzip-compressed tar under `tmp`.
    pub fn write_tar_gz(&self, tmp: &TempDir, name: &str) -> PathBuf {
        let mut builder = tar::Builder::new(Vec::new());
        for (entry, bytes) in &self.entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(bytes.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(&mut header, entry, bytes.as_slice())
                .expect("append tar entry");
        }
        let tar_bytes = builder.into_inner().expect("finish tar");
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&tar_bytes).expect("gzip tar");
        let path = tmp.path().join(format!("{}.tar.gz", name));
        fs::write(&path, encoder.finish().expect("finish gzip")).expect("write tar.gz");
        path
    }
}

pub fn location(path: &Path) -> PackageLocation {
    PackageLocation::from_path(path).expect("package location")
}

/// Host runtime types that modules link against.
pub fn runtime_scope() -> Arc<dyn TypeScope> {
    Arc::new(
        StaticScope::new(PackageLocation::memory("runtime").expect("memory location"))
            .with_type(UnitHeader::new("Actor"))
            .with_type(UnitHeader::new("com.rt.Mailbox"))
            .with_type(UnitHeader::new("com.x.Shared").marker("RuntimeCopy"))
            .with_resource("runtime.properties", "version=1")
            .with_resource("shared.txt", "from runtime"),
    )
}

pub fn assert_error_contains<E: std::fmt::Display>(error: E, expected_text: &str, context: &str) {
    let error_str = error.to_string().to_lowercase();
    let expected_lower = expected_text.to_lowercase();

    assert!(
        error_str.contains(&expected_lower),
        "{}: error message should contain '{}', got: {}",
        context,
        expected_text,
        error
    );
}

pub fn sorted_names(set: &module_resolver::UpgradeSet) -> Vec<String> {
    set.iter().map(str::to_string).collect()
}
