//! CLI subcommand implementations for module-sandbox

pub mod inspect;
pub mod output;
pub mod resolve;
pub mod resource;
