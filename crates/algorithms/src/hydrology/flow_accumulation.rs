//! Flow accumulation and drainage area
//!
//! Calculates the number of upstream cells flowing into each cell
//! based on D8 flow direction, and the drainage area derived from it.

use super::d8::{receiver_index, topological_order};
use ridgeline_core::raster::Raster;
use ridgeline_core::{Algorithm, Error, Result};

/// Flow accumulation algorithm
#[derive(Debug, Clone, Default)]
pub struct FlowAccumulation;

impl Algorithm for FlowAccumulation {
    type Input = Raster<u8>;
    type Output = Raster<f64>;
    type Params = ();
    type Error = Error;

    fn name(&self) -> &'static str {
        "Flow Accumulation"
    }

    fn description(&self) -> &'static str {
        "Calculate upstream contributing cells from D8 flow direction"
    }

    fn execute(&self, input: Self::Input, _params: Self::Params) -> Result<Self::Output> {
        flow_accumulation(&input)
    }
}

/// Calculate flow accumulation from a D8 flow direction raster.
///
/// Each cell receives a count of all upstream cells that flow into it,
/// not counting itself: headwater cells have accumulation = 0.
///
/// Cells are visited in topological order (donors before receivers), so
/// each cell passes its final count downstream exactly once.
pub fn flow_accumulation(flow_dir: &Raster<u8>) -> Result<Raster<f64>> {
    let mut accumulation = vec![0.0_f64; flow_dir.len()];

    for i in topological_order(flow_dir) {
        if let Some(r) = receiver_index(flow_dir, i) {
            accumulation[r] += accumulation[i] + 1.0;
        }
    }

    flow_dir.derive(accumulation, None)
}

/// Drainage area of every cell in map units squared.
///
/// Counts the cell itself plus everything upstream, times the cell area,
/// so a headwater cell has the area of one cell.
pub fn drainage_area(flow_dir: &Raster<u8>) -> Result<Raster<f64>> {
    let cell_area = flow_dir.cell_area();
    let acc = flow_accumulation(flow_dir)?;
    let area: Vec<f64> = acc.data().iter().map(|&a| (a + 1.0) * cell_area).collect();
    flow_dir.derive(area, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hydrology::flow_direction::flow_direction;
    use approx::assert_relative_eq;
    use ridgeline_core::GeoTransform;

    #[test]
    fn test_flow_accumulation_linear() {
        // 1x5 strip sloping east: 0 -> 1 -> 2 -> 3 -> 4
        let mut dem = Raster::new(1, 5);
        dem.set_transform(GeoTransform::new(0.0, 1.0, 1.0, -1.0));
        for col in 0..5 {
            dem.set(0, col, (5 - col) as f64).unwrap();
        }

        let fdir = flow_direction(&dem).unwrap();
        let acc = flow_accumulation(&fdir).unwrap();

        for col in 0..5 {
            assert_eq!(acc.get(0, col).unwrap(), col as f64);
        }
    }

    #[test]
    fn test_flow_accumulation_convergent() {
        //  5 5 5
        //  5 1 5
        //  5 5 5
        let mut dem = Raster::filled(3, 3, 5.0);
        dem.set_transform(GeoTransform::new(0.0, 3.0, 1.0, -1.0));
        dem.set(1, 1, 1.0).unwrap();

        let fdir = flow_direction(&dem).unwrap();
        let acc = flow_accumulation(&fdir).unwrap();

        assert_eq!(acc.get(1, 1).unwrap(), 8.0, "center collects all 8 neighbors");
    }

    #[test]
    fn test_drainage_area_includes_self() {
        let mut fdir = Raster::from_vec(vec![1u8, 1, 0], 1, 3).unwrap();
        fdir.set_transform(GeoTransform::new(0.0, 0.0, 10.0, -10.0));

        let area = drainage_area(&fdir).unwrap();
        assert_relative_eq!(area.get(0, 0).unwrap(), 100.0);
        assert_relative_eq!(area.get(0, 1).unwrap(), 200.0);
        assert_relative_eq!(area.get(0, 2).unwrap(), 300.0);
    }
}
