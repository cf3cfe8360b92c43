//! cabkit: cabinet geometry and bill-of-materials toolkit
//!
//! Turns exterior cabinet dimensions, a list of vertical components and a
//! face-frame style into box, face-frame, drawer-box and stretcher
//! dimensions, a cut list, and a priced materials list per project.

pub mod cli;
pub mod core;
pub mod engine;
pub mod entities;
