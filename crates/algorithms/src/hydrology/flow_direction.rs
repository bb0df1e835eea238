//! D8 flow direction algorithm
//!
//! Calculates the direction of flow from each cell to its steepest
//! downslope neighbor using the D8 (deterministic eight-node) method.
//! See [`super::d8`] for the direction encoding.

use crate::maybe_rayon::*;
use super::d8::{D8_DIST, D8_OFFSETS};
use ridgeline_core::raster::Raster;
use ridgeline_core::{Algorithm, Error, Result};

/// Flow direction algorithm (D8)
#[derive(Debug, Clone, Default)]
pub struct FlowDirection;

impl Algorithm for FlowDirection {
    type Input = Raster<f64>;
    type Output = Raster<u8>;
    type Params = ();
    type Error = Error;

    fn name(&self) -> &'static str {
        "Flow Direction (D8)"
    }

    fn description(&self) -> &'static str {
        "Calculate D8 flow direction from a filled DEM"
    }

    fn execute(&self, input: Self::Input, _params: Self::Params) -> Result<Self::Output> {
        flow_direction(&input)
    }
}

/// Calculate D8 flow direction from a DEM.
///
/// The input DEM should be hydrologically conditioned (see
/// [`priority_flood`](super::priority_flood)), otherwise interior pits
/// become outlets of their own small networks.
///
/// Nodata cells get code 0 and are never chosen as receivers.
///
/// # Returns
/// Raster<u8> with flow direction codes
pub fn flow_direction(dem: &Raster<f64>) -> Result<Raster<u8>> {
    let (rows, cols) = dem.shape();
    let cell_size = dem.cell_size();

    if rows == 0 || cols == 0 {
        return Err(Error::InvalidDimensions { width: cols, height: rows });
    }

    let output_data: Vec<u8> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![0u8; cols];

            for (col, out) in row_data.iter_mut().enumerate() {
                let center = unsafe { dem.get_unchecked(row, col) };
                if dem.is_nodata(center) {
                    continue;
                }

                let mut max_drop = 0.0_f64;
                let mut best_dir: u8 = 0;

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

                    if drop > max_drop {
                        max_drop = drop;
                        best_dir = (idx + 1) as u8;
                    }
                }

                *out = best_dir;
            }

            row_data
        })
        .collect();

    dem.derive(output_data, Some(0))
}
