//! Core module - fundamental types and utilities

pub mod config;
pub mod error;
pub mod fraction;
pub mod identity;
pub mod project;
pub mod store;

pub use config::{Config, PricingConfig};
pub use error::{CalcError, ErrorKind, ErrorReport};
pub use fraction::{Derived, Measure};
pub use identity::{EntityId, EntityPrefix, IdParseError};
pub use project::{Project, ProjectError};
pub use store::BomStore;
