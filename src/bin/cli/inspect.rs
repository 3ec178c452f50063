//! Inspect command - digest, entries and upgrade classification of a package

use anyhow::Result;
use clap::Parser;
use module_sandbox::Session;

use super::output::{format_inspect, print_json, InspectReport};

#[derive(Parser, Debug)]
pub struct InspectCmd {
    /// Package directory, tar/tar.gz file, or file:// URL
    pub package: String,
}

impl InspectCmd {
    pub fn execute(&self, session: &Session, json_output: bool) -> Result<()> {
        let loader = session.open(&self.package, None)?;
        let report = InspectReport {
            location: loader.location(),
            digest: loader.package_digest()?,
            classification: loader.classification(),
            upgrade_types: loader.upgrade_types(),
        };

        if json_output {
            print_json(&report)
        } else {
            print!("{}", format_inspect(&report));
            Ok(())
        }
    }
}
