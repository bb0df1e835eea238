//! Local relief
//!
//! Elevation range (max - min) within a circular moving window around each
//! cell. The window radius is a length in map units and is converted to
//! whole cells from the DEM cell size.

use crate::maybe_rayon::*;
use ridgeline_core::raster::Raster;
use ridgeline_core::{Algorithm, Error, Result};

/// Parameters for local relief
#[derive(Debug, Clone)]
pub struct LocalReliefParams {
    /// Window radius in map units
    pub radius: f64,
}

impl Default for LocalReliefParams {
    fn default() -> Self {
        Self { radius: 500.0 }
    }
}

impl LocalReliefParams {
    /// Window radius in cells for a grid of `cell_size`, never less than one
    pub fn radius_cells(&self, cell_size: f64) -> usize {
        ((self.radius / cell_size).round() as usize).max(1)
    }
}

/// Local relief algorithm
#[derive(Debug, Clone, Default)]
pub struct LocalRelief;

impl Algorithm for LocalRelief {
    type Input = Raster<f64>;
    type Output = Raster<f64>;
    type Params = LocalReliefParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Local Relief"
    }

    fn description(&self) -> &'static str {
        "Elevation range within a circular window"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        local_relief(&input, params)
    }
}

/// Offsets of every cell within `r` cells of the center (Euclidean)
fn disk_offsets(r: usize) -> Vec<(isize, isize)> {
    let ri = r as isize;
    let r_sq = ri * ri;
    let mut offs = Vec::new();
    for dr in -ri..=ri {
        for dc in -ri..=ri {
            if dr * dr + dc * dc <= r_sq {
                offs.push((dr, dc));
            }
        }
    }
    offs
}

/// Compute local relief of a DEM.
///
/// Nodata cells inside the window are ignored; nodata centers stay NaN.
/// Windows are clipped at the grid border.
pub fn local_relief(dem: &Raster<f64>, params: LocalReliefParams) -> Result<Raster<f64>> {
    if !(params.radius > 0.0) {
        return Err(Error::InvalidParameter {
            name: "radius",
            value: params.radius.to_string(),
            reason: "must be > 0".into(),
        });
    }

    let (rows, cols) = dem.shape();
    let offsets = disk_offsets(params.radius_cells(dem.cell_size()));

    let output_data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];

            for (col, out) in row_data.iter_mut().enumerate() {
                let center = unsafe { dem.get_unchecked(row, col) };
                if dem.is_nodata(center) {
                    continue;
                }

                let mut lo = center;
                let mut hi = center;
                for &(dr, dc) in &offsets {
                    let nr = row as isize + dr;
                    let nc = col as isize + dc;
                    if nr < 0 || nc < 0 || nr >= rows as isize || nc >= cols as isize {
                        continue;
                    }
                    let v = unsafe { dem.get_unchecked(nr as usize, nc as usize) };
                    if dem.is_nodata(v) {
                        continue;
                    }
                    lo = lo.min(v);
                    hi = hi.max(v);
                }

                *out = hi - lo;
            }

            row_data
        })
        .collect();

    dem.derive(output_data, Some(f64::NAN))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ridgeline_core::GeoTransform;

    #[test]
    fn test_disk_offsets() {
        assert_eq!(disk_offsets(1).len(), 5);
        assert_eq!(disk_offsets(2).len(), 13);
    }

    #[test]
    fn test_radius_in_cells() {
        let p = LocalReliefParams { radius: 95.0 };
        assert_eq!(p.radius_cells(30.0), 3);
        assert_eq!(LocalReliefParams { radius: 1.0 }.radius_cells(30.0), 1);
    }

    #[test]
    fn test_relief_of_single_peak() {
        let mut dem = Raster::filled(7, 7, 10.0);
        dem.set_transform(GeoTransform::new(0.0, 7.0, 1.0, -1.0));
        dem.set(3, 3, 50.0).unwrap();

        let relief = local_relief(&dem, LocalReliefParams { radius: 1.0 }).unwrap();
        assert_relative_eq!(relief.get(3, 3).unwrap(), 40.0);
        assert_relative_eq!(relief.get(2, 3).unwrap(), 40.0);
        // Diagonal neighbor is outside a radius-1 disk
        assert_relative_eq!(relief.get(2, 2).unwrap(), 0.0);
        assert_relative_eq!(relief.get(0, 0).unwrap(), 0.0);
    }

    #[test]
    fn test_relief_ignores_nodata() {
        let mut dem = Raster::filled(3, 3, 10.0);
        dem.set(1, 0, f64::NAN).unwrap();
        dem.set(1, 2, 13.0).unwrap();

        let relief = local_relief(&dem, LocalReliefParams { radius: 1.0 }).unwrap();
        assert_relative_eq!(relief.get(1, 1).unwrap(), 3.0);
        assert!(relief.get(1, 0).unwrap().is_nan());
    }

    #[test]
    fn test_relief_rejects_zero_radius() {
        let dem: Raster<f64> = Raster::filled(3, 3, 1.0);
        assert!(local_relief(&dem, LocalReliefParams { radius: 0.0 }).is_err());
    }
}
