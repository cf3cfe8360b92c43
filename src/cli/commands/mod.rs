//! CLI command implementations

pub mod bom;
pub mod calc;
pub mod completions;
pub mod config;
pub mod init;
pub mod project;
pub mod standards;
