//! Module Sandbox
//!
//! Load module packages in isolation and inspect what they contain:
//!
//! - **Packages**: directory and tar/tar.gz archives, see [`module_package`]
//! - **Loading**: module-first resolution with parent fallback, see [`module_resolver`]
//! - **Upgrade classification**: which types of a package may be hot-swapped
//!
//! [`session`] ties configuration and package opening together for the
//! `module-sandbox` CLI; [`logging`] installs its tracing subscriber.

pub mod logging;
pub mod session;

pub use module_package;
pub use module_resolver;

pub use session::Session;
