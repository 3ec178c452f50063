//! module-sandbox: inspect and resolve against module packages
//!
//! ## Features
//!
//! - **inspect**: Show a package's digest, entries and upgrade classification
//! - **resolve**: Resolve a type the way a running module would
//! - **resource**: Look up a resource through the module and its parent
//!
//! ## Example Usage
//!
//! ```bash
//! # Which types of this package may be hot-swapped?
//! module-sandbox inspect ./counter.tar.gz --json
//!
//! # Resolve a type, falling back to a library package
//! module-sandbox resolve ./app com.lib.BasicActor --parent ./lib
//!
//! # Only look inside the module itself
//! module-sandbox resolve ./app com.app.Main --module-only
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use module_sandbox::logging::init_tracing;
use module_sandbox::Session;

mod cli;

use cli::{inspect::InspectCmd, resolve::ResolveCmd, resource::ResourceCmd};

#[derive(Parser)]
#[command(
    name = "module-sandbox",
    author,
    version,
    about = "Inspect isolated module packages",
    long_about = "Load module packages the way the actor runtime does: module content first, \
                  parent package second.\n\n\
                  Reports upgrade classification, type resolution and resource lookup."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Loader configuration file (JSON); defaults come from MODULE_LOADER_* env vars
    #[arg(long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Output as JSON instead of human-readable format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (info-level logs on stderr)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a package's contents and upgrade classification
    Inspect(InspectCmd),

    /// Resolve a type through a module
    Resolve(ResolveCmd),

    /// Look up a resource through a module
    Resource(ResourceCmd),
}

fn main() -> Result<()> {
    let Cli {
        command,
        config,
        json,
        verbose,
    } = Cli::parse();
    init_tracing(verbose);

    let session = Session::load(config.as_deref())?;

    match command {
        Commands::Inspect(cmd) => cmd.execute(&session, json),
        Commands::Resolve(cmd) => cmd.execute(&session, json),
        Commands::Resource(cmd) => cmd.execute(&session, json),
    }
}
