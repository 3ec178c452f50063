use assert_cmd::Command;
use flate2::write::GzEncoder;
use flate2::Compression;
use module_package::{type_name_to_entry, UnitHeader, DESCRIPTOR_PATH};
use predicates::prelude::*;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn sandbox() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("module-sandbox").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

fn write_unit(root: &Path, header: UnitHeader) {
    let path = root.join(type_name_to_entry(&header.name, "unit"));
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, header.to_bytes().unwrap()).unwrap();
}

fn write_manifest(root: &Path, text: &str) {
    let path = root.join(DESCRIPTOR_PATH);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

/// Actor module with a wildcard descriptor, one marked helper and a resource.
fn app_package(tmp: &TempDir) -> PathBuf {
    let root = tmp.path().join("app");
    write_manifest(&root, "Manifest-Version: 1.0\nUpgrade-Classes: *\n");
    write_unit(&root, UnitHeader::new("com.app.Counter").extends("com.app.Base"));
    write_unit(&root, UnitHeader::new("com.app.Base").extends("Actor"));
    write_unit(&root, UnitHeader::new("com.app.Codec").marker("Upgrade"));
    write_unit(&root, UnitHeader::new("com.app.Util"));
    fs::write(root.join("app.properties"), "name=counter").unwrap();
    root
}

fn lib_package(tmp: &TempDir) -> PathBuf {
    let root = tmp.path().join("lib");
    write_unit(&root, UnitHeader::new("com.lib.Mailbox"));
    write_unit(&root, UnitHeader::new("com.app.Util").marker("FromLib"));
    fs::write(root.join("lib.properties"), "version=2").unwrap();
    root
}

fn tar_gz_of(dir: &Path, out: &Path) {
    let mut builder = tar::Builder::new(Vec::new());
    builder.append_dir_all(".", dir).unwrap();
    let tar_bytes = builder.into_inner().unwrap();
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&tar_bytes).unwrap();
    fs::write(out, encoder.finish().unwrap()).unwrap();
}

#[test]
fn test_inspect_lists_upgrade_types() {
    let tmp = TempDir::new().unwrap();
    let app = app_package(&tmp);

    sandbox()
        .arg("inspect")
        .arg(&app)
        .assert()
        .success()
        .stdout(predicate::str::contains("Upgrade types (3):"))
        .stdout(predicate::str::contains("com.app.Base"))
        .stdout(predicate::str::contains("com.app.Codec"))
        .stdout(predicate::str::contains("com.app.Counter"))
        .stdout(predicate::str::contains("com.app.Util").not());
}

#[test]
fn test_inspect_json() {
    let tmp = TempDir::new().unwrap();
    let app = app_package(&tmp);

    let output = sandbox()
        .arg("inspect")
        .arg(&app)
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        json["upgrade_types"],
        serde_json::json!(["com.app.Base", "com.app.Codec", "com.app.Counter"])
    );
    assert_eq!(json["classification"]["wildcard"], true);
    assert_eq!(json["classification"]["loadable_entries"], 4);
    assert_eq!(json["digest"].as_str().unwrap().len(), 64);
}

#[test]
fn test_inspect_tar_gz_matches_directory() {
    let tmp = TempDir::new().unwrap();
    let app = app_package(&tmp);
    let archive = tmp.path().join("app.tar.gz");
    tar_gz_of(&app, &archive);

    let from_dir = sandbox().args(["inspect", "--json"]).arg(&app).output().unwrap();
    let from_tar = sandbox().args(["inspect", "--json"]).arg(&archive).output().unwrap();
    assert!(from_tar.status.success());

    let dir_json: serde_json::Value = serde_json::from_slice(&from_dir.stdout).unwrap();
    let tar_json: serde_json::Value = serde_json::from_slice(&from_tar.stdout).unwrap();
    assert_eq!(dir_json["upgrade_types"], tar_json["upgrade_types"]);
    assert_eq!(dir_json["digest"], tar_json["digest"]);
}

#[test]
fn test_inspect_with_config_file() {
    let tmp = TempDir::new().unwrap();
    let app = app_package(&tmp);
    let config = tmp.path().join("loader.json");
    fs::write(&config, r#"{ "upgrade_attribute": "Hot-Types", "marker": "NoSuchMarker" }"#).unwrap();

    sandbox()
        .arg("--config")
        .arg(&config)
        .arg("inspect")
        .arg(&app)
        .assert()
        .success()
        .stdout(predicate::str::contains("No upgrade types"));
}

#[test]
fn test_inspect_corrupt_descriptor_fails() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("broken");
    write_manifest(&root, "this line has no separator\n");

    sandbox()
        .arg("inspect")
        .arg(&root)
        .assert()
        .failure()
        .stderr(predicate::str::contains("descriptor"));
}

#[test]
fn test_resolve_local_type() {
    let tmp = TempDir::new().unwrap();
    let app = app_package(&tmp);

    sandbox()
        .args(["resolve"])
        .arg(&app)
        .arg("com.app.Counter")
        .assert()
        .success()
        .stdout(predicate::str::contains("Extends:    com.app.Base"))
        .stdout(predicate::str::contains("Upgradable: yes"));
}

#[test]
fn test_resolve_prefers_module_over_parent() {
    let tmp = TempDir::new().unwrap();
    let app = app_package(&tmp);
    let lib = lib_package(&tmp);

    let output = sandbox()
        .args(["resolve", "--json"])
        .arg(&app)
        .arg("com.app.Util")
        .arg("--parent")
        .arg(&lib)
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["from_module"], true);
    assert_eq!(json["type"]["markers"], serde_json::json!([]));
}

#[test]
fn test_resolve_falls_back_to_parent() {
    let tmp = TempDir::new().unwrap();
    let app = app_package(&tmp);
    let lib = lib_package(&tmp);

    sandbox()
        .arg("resolve")
        .arg(&app)
        .arg("com.lib.Mailbox")
        .arg("--parent")
        .arg(&lib)
        .assert()
        .success()
        .stdout(predicate::str::contains("(parent)"))
        .stdout(predicate::str::contains("Upgradable: no"));
}

#[test]
fn test_resolve_with_same_package_as_parent() {
    let tmp = TempDir::new().unwrap();
    let app = app_package(&tmp);

    sandbox()
        .arg("resolve")
        .arg(&app)
        .arg("com.app.Counter")
        .arg("--parent")
        .arg(&app)
        .assert()
        .success()
        .stdout(predicate::str::contains("(parent)").not())
        .stdout(predicate::str::contains("Upgradable: yes"));
}

#[test]
fn test_resolve_declared_name_held_by_parent_is_not_upgradable() {
    let tmp = TempDir::new().unwrap();
    let lib = lib_package(&tmp);
    let app = tmp.path().join("declaring");
    write_manifest(&app, "Upgrade-Classes: com.lib.Mailbox\n");
    write_unit(&app, UnitHeader::new("com.app.Base"));

    let output = sandbox()
        .args(["resolve", "--json"])
        .arg(&app)
        .arg("com.lib.Mailbox")
        .arg("--parent")
        .arg(&lib)
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["from_module"], false);
    assert_eq!(json["upgradable"], false);

    sandbox()
        .arg("resolve")
        .arg(&app)
        .arg("com.lib.Mailbox")
        .arg("--parent")
        .arg(&lib)
        .assert()
        .success()
        .stdout(predicate::str::contains("(parent)"))
        .stdout(predicate::str::contains("Upgradable: no"));
}

#[test]
fn test_resolve_module_only_skips_parent() {
    let tmp = TempDir::new().unwrap();
    let app = app_package(&tmp);
    let lib = lib_package(&tmp);

    sandbox()
        .arg("resolve")
        .arg(&app)
        .arg("com.lib.Mailbox")
        .arg("--parent")
        .arg(&lib)
        .arg("--module-only")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_resolve_missing_type_fails() {
    let tmp = TempDir::new().unwrap();
    let app = app_package(&tmp);

    sandbox()
        .arg("resolve")
        .arg(&app)
        .arg("com.app.Ghost")
        .assert()
        .failure()
        .stderr(predicate::str::contains("com.app.Ghost"));
}

#[test]
fn test_resource_lookup() {
    let tmp = TempDir::new().unwrap();
    let app = app_package(&tmp);
    let lib = lib_package(&tmp);

    sandbox()
        .arg("resource")
        .arg(&app)
        .arg("app.properties")
        .assert()
        .success()
        .stdout(predicate::str::contains("Bytes:    12"));

    sandbox()
        .arg("resource")
        .arg(&app)
        .arg("lib.properties")
        .arg("--parent")
        .arg(&lib)
        .assert()
        .success()
        .stdout(predicate::str::contains("lib"));
}

#[test]
fn test_missing_resource_without_parent_fails() {
    let tmp = TempDir::new().unwrap();
    let app = app_package(&tmp);

    sandbox()
        .arg("resource")
        .arg(&app)
        .arg("missing.txt")
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.txt"));
}
