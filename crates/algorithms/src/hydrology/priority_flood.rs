//! Priority-Flood depression filling
//!
//! Conditions a DEM before D8 routing so that every cell has a downslope
//! path to the grid border. Cells are processed in elevation order from a
//! min-heap seeded with the border; each unvisited neighbor is raised to
//! at least the popped elevation (plus `epsilon`).
//!
//! Reference:
//! Barnes, R., Lehman, C., & Mulla, D. (2014). Priority-Flood: An optimal
//! depression-filling and watershed-labeling algorithm for digital elevation
//! models. *Computers & Geosciences*, 62, 117–127.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::d8::D8_OFFSETS;
use ridgeline_core::raster::Raster;
use ridgeline_core::{Algorithm, Error, Result};

/// A heap entry. Ties in elevation are broken by insertion order so the
/// fill is reproducible.
#[derive(Debug, Clone, Copy)]
struct Cell {
    elevation: f64,
    seq: u64,
    index: usize,
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Cell {}

impl PartialOrd for Cell {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Reversed so BinaryHeap (a max-heap) pops the lowest, oldest cell first
impl Ord for Cell {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .elevation
            .total_cmp(&self.elevation)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Parameters for Priority-Flood filling
#[derive(Debug, Clone)]
pub struct PriorityFloodParams {
    /// Minimum elevation increment enforced along filled flow paths.
    /// A small epsilon (e.g. 1e-5) leaves no flats, so D8 routing drains
    /// every filled depression. 0.0 fills depressions perfectly flat.
    pub epsilon: f64,
}

impl Default for PriorityFloodParams {
    fn default() -> Self {
        Self { epsilon: 1e-5 }
    }
}

/// Priority-Flood fill algorithm
#[derive(Debug, Clone, Default)]
pub struct PriorityFlood;

impl Algorithm for PriorityFlood {
    type Input = Raster<f64>;
    type Output = Raster<f64>;
    type Params = PriorityFloodParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Priority-Flood"
    }

    fn description(&self) -> &'static str {
        "Fill depressions using Priority-Flood (Barnes 2014)"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        priority_flood(&input, params)
    }
}

/// Fill depressions in a DEM using the Priority-Flood algorithm.
///
/// Nodata cells are preserved and act like the border: cells next to them
/// are free to drain into them.
pub fn priority_flood(dem: &Raster<f64>, params: PriorityFloodParams) -> Result<Raster<f64>> {
    let (rows, cols) = dem.shape();
    let n = rows * cols;
    let epsilon = params.epsilon;

    if epsilon < 0.0 {
        return Err(Error::InvalidParameter {
            name: "epsilon",
            value: epsilon.to_string(),
            reason: "must be >= 0".into(),
        });
    }

    let mut output: Vec<f64> = dem.data().iter().copied().collect();
    let mut visited = vec![false; n];
    let mut heap = BinaryHeap::new();
    let mut seq: u64 = 0;

    let is_nodata = |i: usize| dem.get_index(i).is_none_or(|v| dem.is_nodata(v));

    for i in 0..n {
        if is_nodata(i) {
            visited[i] = true;
            continue;
        }
        let (row, col) = dem.row_col(i);
        let on_border = row == 0 || row == rows - 1 || col == 0 || col == cols - 1;
        let touches_nodata = D8_OFFSETS.iter().any(|&(dr, dc)| {
            let nr = row as isize + dr;
            let nc = col as isize + dc;
            nr >= 0
                && nc >= 0
                && (nr as usize) < rows
                && (nc as usize) < cols
                && is_nodata(nr as usize * cols + nc as usize)
        });
        if on_border || touches_nodata {
            visited[i] = true;
            heap.push(Cell { elevation: output[i], seq, index: i });
            seq += 1;
        }
    }

    while let Some(cell) = heap.pop() {
        let (row, col) = dem.row_col(cell.index);
        for &(dr, dc) in &D8_OFFSETS {
            let nr = row as isize + dr;
            let nc = col as isize + dc;
            if nr < 0 || nc < 0 || (nr as usize) >= rows || (nc as usize) >= cols {
                continue;
            }
            let ni = nr as usize * cols + nc as usize;
            if visited[ni] {
                continue;
            }
            visited[ni] = true;

            let floor = cell.elevation + epsilon;
            if output[ni] < floor {
                output[ni] = floor;
            }
            heap.push(Cell { elevation: output[ni], seq, index: ni });
            seq += 1;
        }
    }

    dem.derive(output, dem.nodata())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hydrology::flow_direction;
    use ridgeline_core::GeoTransform;

    fn create_dem_with_sink() -> Raster<f64> {
        #[rustfmt::skip]
        let values = vec![
            9.0, 9.0, 9.0, 9.0, 9.0, 9.0, 9.0,
            9.0, 8.0, 8.0, 8.0, 8.0, 8.0, 9.0,
            9.0, 8.0, 7.0, 7.0, 7.0, 8.0, 9.0,
            9.0, 8.0, 7.0, 3.0, 7.0, 8.0, 9.0,
            9.0, 8.0, 7.0, 7.0, 7.0, 8.0, 9.0,
            9.0, 8.0, 8.0, 8.0, 8.0, 8.0, 9.0,
            9.0, 9.0, 9.0, 9.0, 9.0, 9.0, 9.0,
        ];
        let mut dem = Raster::from_vec(values, 7, 7).unwrap();
        dem.set_transform(GeoTransform::new(0.0, 7.0, 1.0, -1.0));
        dem
    }

    #[test]
    fn test_priority_flood_fills_sink_flat() {
        let dem = create_dem_with_sink();
        let filled = priority_flood(&dem, PriorityFloodParams { epsilon: 0.0 }).unwrap();

        // The whole bowl spills over the 9.0 rim
        assert_eq!(filled.get(3, 3).unwrap(), 9.0);
        assert_eq!(filled.get(0, 0).unwrap(), 9.0);
    }

    #[test]
    fn test_priority_flood_never_lowers_elevation() {
        let dem = create_dem_with_sink();
        let filled = priority_flood(&dem, PriorityFloodParams::default()).unwrap();

        for (orig, fill) in dem.data().iter().zip(filled.data().iter()) {
            assert!(fill >= orig, "fill lowered a cell: {} -> {}", orig, fill);
        }
    }

    #[test]
    fn test_epsilon_fill_drains_every_cell() {
        let dem = create_dem_with_sink();
        let filled = priority_flood(&dem, PriorityFloodParams::default()).unwrap();
        let fdir = flow_direction(&filled).unwrap();

        for row in 1..6 {
            for col in 1..6 {
                assert_ne!(fdir.get(row, col).unwrap(), 0, "interior pit at ({}, {})", row, col);
            }
        }
    }

    #[test]
    fn test_priority_flood_outlet_respects_low_border() {
        let mut dem = Raster::filled(5, 5, 10.0);
        for row in 1..4 {
            for col in 1..4 {
                dem.set(row, col, 5.0).unwrap();
            }
        }
        dem.set(2, 2, 1.0).unwrap();
        dem.set(4, 2, 2.0).unwrap();

        let filled = priority_flood(&dem, PriorityFloodParams { epsilon: 0.0 }).unwrap();
        let center = filled.get(2, 2).unwrap();
        assert!((2.0..=5.0).contains(&center), "got {}", center);
    }

    #[test]
    fn test_negative_epsilon_rejected() {
        let dem = create_dem_with_sink();
        assert!(priority_flood(&dem, PriorityFloodParams { epsilon: -1.0 }).is_err());
    }
}
