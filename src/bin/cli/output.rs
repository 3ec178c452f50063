//! Output formatting for module-sandbox
//!
//! Every command builds one serializable report and either pretty-prints it
//! as JSON or renders it for humans here.

use anyhow::Result;
use module_package::PackageLocation;
use module_resolver::{ClassificationReport, LoadedType, UpgradeSet};
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct InspectReport<'a> {
    pub location: &'a PackageLocation,
    pub digest: String,
    pub classification: &'a ClassificationReport,
    pub upgrade_types: &'a UpgradeSet,
}

pub fn format_inspect(report: &InspectReport<'_>) -> String {
    let c = report.classification;
    let mut out = String::new();
    out.push_str(&format!("Package:  {}\n", report.location));
    out.push_str(&format!("Digest:   {}\n", report.digest));
    out.push_str(&format!("Units:    {}\n", c.loadable_entries));
    out.push_str(&format!(
        "Descriptor: {}\n",
        if c.has_descriptor { "present" } else { "absent" }
    ));
    if c.wildcard {
        out.push_str(&format!("  wildcard scan: {} subtype(s)\n", c.subtype_matches));
    } else if c.declared > 0 {
        out.push_str(&format!("  declared: {}\n", c.declared));
    }
    out.push_str(&format!("  marked:   {}\n", c.marker_matches));

    if report.upgrade_types.is_empty() {
        out.push_str("\nNo upgrade types\n");
    } else {
        out.push_str(&format!("\nUpgrade types ({}):\n", report.upgrade_types.len()));
        for name in report.upgrade_types.iter() {
            out.push_str(&format!("  {}\n", name));
        }
    }
    out
}

#[derive(Debug, Serialize)]
pub struct ResolveReport<'a> {
    #[serde(rename = "type")]
    pub loaded: &'a LoadedType,
    /// Whether the type came from the module itself rather than its parent.
    pub from_module: bool,
    pub upgradable: bool,
}

pub fn format_resolve(report: &ResolveReport<'_>) -> String {
    let ty = report.loaded;
    let mut out = String::new();
    out.push_str(&format!("Type:       {}\n", ty.name()));
    out.push_str(&format!("Origin:     {}", ty.origin()));
    if !report.from_module {
        out.push_str(" (parent)");
    }
    out.push('\n');
    if let Some(supertype) = ty.supertype() {
        out.push_str(&format!("Extends:    {}\n", supertype));
    }
    if !ty.interfaces().is_empty() {
        out.push_str(&format!("Implements: {}\n", ty.interfaces().join(", ")));
    }
    if !ty.markers().is_empty() {
        out.push_str(&format!("Markers:    {}\n", ty.markers().join(", ")));
    }
    out.push_str(&format!(
        "Upgradable: {}\n",
        if report.upgradable { "yes" } else { "no" }
    ));
    out
}

#[derive(Debug, Serialize)]
pub struct ResourceReport<'a> {
    pub name: &'a str,
    pub origin: &'a PackageLocation,
    pub len: usize,
}

pub fn format_resource(report: &ResourceReport<'_>) -> String {
    format!(
        "Resource: {}\nOrigin:   {}\nBytes:    {}\n",
        report.name, report.origin, report.len
    )
}
