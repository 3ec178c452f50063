//! Resource command - look up a resource through a module

use anyhow::{anyhow, Result};
use clap::Parser;
use module_resolver::TypeScope;
use module_sandbox::Session;

use super::output::{format_resource, print_json, ResourceReport};

#[derive(Parser, Debug)]
pub struct ResourceCmd {
    /// Package directory, tar/tar.gz file, or file:// URL
    pub package: String,

    /// Resource path inside the package, e.g. config/app.properties
    pub name: String,

    /// Package to fall back to when the module does not hold the resource
    #[arg(long)]
    pub parent: Option<String>,
}

impl ResourceCmd {
    pub fn execute(&self, session: &Session, json_output: bool) -> Result<()> {
        let loader = session.open(&self.package, self.parent.as_deref())?;
        let resource = loader
            .resolve_resource(&self.name)?
            .ok_or_else(|| anyhow!("resource {} not found (searched {})", self.name, loader))?;

        let report = ResourceReport {
            name: resource.name(),
            origin: resource.origin(),
            len: resource.len(),
        };

        if json_output {
            print_json(&report)
        } else {
            print!("{}", format_resource(&report));
            Ok(())
        }
    }
}
