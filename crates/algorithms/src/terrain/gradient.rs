//! Steepest-descent gradient
//!
//! The gradient of a cell is the largest downhill drop to any of its eight
//! neighbors divided by the distance to that neighbor. Unlike a 3x3
//! finite-difference slope it is defined on the grid border, and it is the
//! gradient D8 routing actually follows.

use crate::hydrology::d8::{D8_DIST, D8_OFFSETS};
use crate::maybe_rayon::*;
use ridgeline_core::raster::Raster;
use ridgeline_core::{Algorithm, Error, Result};

/// Steepest-descent gradient algorithm
#[derive(Debug, Clone, Default)]
pub struct Gradient8;

impl Algorithm for Gradient8 {
    type Input = Raster<f64>;
    type Output = Raster<f64>;
    type Params = ();
    type Error = Error;

    fn name(&self) -> &'static str {
        "Gradient (D8)"
    }

    fn description(&self) -> &'static str {
        "Calculate the steepest downhill gradient to any of the eight neighbors"
    }

    fn execute(&self, input: Self::Input, _params: Self::Params) -> Result<Self::Output> {
        gradient8(&input)
    }
}

/// Calculate the steepest-descent gradient of a DEM as rise over run.
///
/// Pits and flats get 0; nodata cells get NaN.
pub fn gradient8(dem: &Raster<f64>) -> Result<Raster<f64>> {
    let (rows, cols) = dem.shape();
    let cell_size = dem.cell_size();

    let output_data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];

            for (col, out) in row_data.iter_mut().enumerate() {
                let center = unsafe { dem.get_unchecked(row, col) };
                if dem.is_nodata(center) {
                    continue;
                }

                let mut steepest = 0.0_f64;
                for (idx, &(dr, dc)) in D8_OFFSETS.iter().enumerate() {
                    let nr = row as isize + dr;
                    let nc = col as isize + dc;
                    if nr < 0 || nc < 0 || nr >= rows as isize || nc >= cols as isize {
                        continue;
                    }
                    let neighbor = unsafe { dem.get_unchecked(nr as usize, nc as usize) };
                    if dem.is_nodata(neighbor) {
                        continue;
                    }
                    let drop = (center - neighbor) / (D8_DIST[idx] * cell_size);
                    steepest = steepest.max(drop);
                }

                *out = steepest;
            }

            row_data
        })
        .collect();

    dem.derive(output_data, Some(f64::NAN))
}
