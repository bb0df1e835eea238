//! Terrain analysis algorithms
//!
//! Per-cell derivatives of a DEM used as hillslope metrics:
//! - Gradient: steepest downhill gradient to the eight neighbors
//! - Local relief: elevation range within a circular window

mod gradient;
mod relief;

pub use gradient::{gradient8, Gradient8};
pub use relief::{local_relief, LocalRelief, LocalReliefParams};
