//! Calculation engine
//!
//! Pure functions from inputs plus construction standards to results.
//! Nothing here performs I/O or logs; errors are returned as [`CalcError`].
//!
//! [`CalcError`]: crate::core::error::CalcError

pub mod bom;
pub mod cabinet;
pub mod cut_list;
pub mod drawer;
pub mod standards;
pub mod stretcher;

pub use bom::{consolidate, BomGenerator, UnitCosts};
pub use cabinet::{CabinetDimensionCalculator, CalculationResult};
pub use cut_list::CutListItem;
pub use drawer::{DrawerBoxResult, DrawerConfigurator, QuickQuoteRequest, SlideCatalog, StackRequest};
pub use standards::{ConstructionStandards, StandardsRegistry, DEFAULT_STANDARDS_ID};
pub use stretcher::{StretcherCalculator, StretcherPlan};
