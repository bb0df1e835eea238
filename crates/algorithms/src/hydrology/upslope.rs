//! Upslope statistics
//!
//! Aggregates a raster over the upstream catchment of every cell: the
//! value at a cell summarizes the input over all cells that drain through
//! it, the cell itself included. The catchments follow the D8 graph, so a
//! single downstream sweep in topological order is enough.

use super::d8::{receiver_index, topological_order};
use ridgeline_core::raster::Raster;
use ridgeline_core::Result;

/// Mean of `raster` over the upstream catchment of every cell.
///
/// Nodata (NaN) input cells are left out of both the sum and the count;
/// a cell whose whole catchment is nodata gets NaN.
pub fn upslope_mean(flow_dir: &Raster<u8>, raster: &Raster<f64>) -> Result<Raster<f64>> {
    flow_dir.ensure_same_shape(raster)?;

    let n = flow_dir.len();
    let mut sum = vec![0.0_f64; n];
    let mut count = vec![0u64; n];

    for (i, v) in raster.data().iter().enumerate() {
        if !raster.is_nodata(*v) {
            sum[i] = *v;
            count[i] = 1;
        }
    }

    for i in topological_order(flow_dir) {
        if let Some(r) = receiver_index(flow_dir, i) {
            sum[r] += sum[i];
            count[r] += count[i];
        }
    }

    let mean: Vec<f64> = sum
        .iter()
        .zip(&count)
        .map(|(&s, &c)| if c > 0 { s / c as f64 } else { f64::NAN })
        .collect();

    raster.derive(mean, Some(f64::NAN))
}
