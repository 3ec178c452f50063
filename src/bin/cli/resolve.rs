//! Resolve command - resolve a type through a module

use anyhow::Result;
use clap::Parser;
use module_resolver::TypeScope;
use module_sandbox::Session;
use std::sync::Arc;

use super::output::{format_resolve, print_json, ResolveReport};

#[derive(Parser, Debug)]
pub struct ResolveCmd {
    /// Package directory, tar/tar.gz file, or file:// URL
    pub package: String,

    /// Fully qualified type name, e.g. com.x.Counter
    pub type_name: String,

    /// Package to fall back to when the module does not hold the type
    #[arg(long)]
    pub parent: Option<String>,

    /// Resolve inside the module only, never consulting the parent
    #[arg(long)]
    pub module_only: bool,
}

impl ResolveCmd {
    pub fn execute(&self, session: &Session, json_output: bool) -> Result<()> {
        let loader = session.open(&self.package, self.parent.as_deref())?;
        let loaded = if self.module_only {
            loader.find_in_module(&self.type_name)?
        } else {
            loader.resolve_type(&self.type_name)?
        };

        // A parent built from the same package shares its location, so compare instances.
        let from_module = loader
            .find_loaded_in_module(loaded.name())
            .is_some_and(|local| Arc::ptr_eq(&local, &loaded));
        let report = ResolveReport {
            loaded: &loaded,
            from_module,
            upgradable: from_module && loader.is_upgrade_type(loaded.name()),
        };

        if json_output {
            print_json(&report)
        } else {
            print!("{}", format_resolve(&report));
            Ok(())
        }
    }
}
