//! Domain record types
//!
//! - [`CabinetInput`] - exterior dimensions, type and vertical components of one cabinet
//! - [`DrawerOpening`] - an opening handed to the drawer configurator
//! - [`ProjectTree`] - project → room → location → run → cabinet hierarchy
//! - [`BomLineItem`] - a priced material line with its procurement status

pub mod bom;
pub mod cabinet;
pub mod project;

pub use bom::{BomLineItem, BomStatus, MaterialType, Uom};
pub use cabinet::{
    CabinetInput, CabinetType, Component, ComponentKind, ComponentShape, DrawerOpening, Exterior,
    FaceFrameStyle, SlideLength, TopConstruction,
};
pub use project::{CabinetRecord, CabinetRun, Location, ProjectTree, Room};
