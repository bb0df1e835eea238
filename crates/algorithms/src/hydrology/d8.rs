//! D8 direction encoding shared by the routing algorithms
//!
//! ```text
//!   4  3  2
//!   5  0  1
//!   6  7  8
//! ```
//! 0 = pit/flat/outlet (no receiver), 1-8 = direction to the receiver.
//! A code that points off the grid also marks an outlet.

use ridgeline_core::raster::Raster;

/// D8 neighbor offsets: (row_offset, col_offset)
/// Indexed to match the direction encoding (1=E, 2=NE, ..., 8=SE)
pub(crate) const D8_OFFSETS: [(isize, isize); 8] = [
    (0, 1),   // 1: E
    (-1, 1),  // 2: NE
    (-1, 0),  // 3: N
    (-1, -1), // 4: NW
    (0, -1),  // 5: W
    (1, -1),  // 6: SW
    (1, 0),   // 7: S
    (1, 1),   // 8: SE
];

/// Distance factors for each D8 direction
pub(crate) const D8_DIST: [f64; 8] = [
    1.0, std::f64::consts::SQRT_2, 1.0, std::f64::consts::SQRT_2,
    1.0, std::f64::consts::SQRT_2, 1.0, std::f64::consts::SQRT_2,
];

/// Receiver of (row, col) under a D8 code, if it lies on the grid
#[inline]
pub(crate) fn receiver_of(code: u8, row: usize, col: usize, rows: usize, cols: usize) -> Option<(usize, usize)> {
    if code == 0 || code as usize > D8_OFFSETS.len() {
        return None;
    }
    let (dr, dc) = D8_OFFSETS[(code - 1) as usize];
    let nr = row as isize + dr;
    let nc = col as isize + dc;
    if nr < 0 || nc < 0 || nr >= rows as isize || nc >= cols as isize {
        return None;
    }
    Some((nr as usize, nc as usize))
}

/// Linear index of the receiver of the cell at linear index `index`
#[inline]
pub(crate) fn receiver_index(flow_dir: &Raster<u8>, index: usize) -> Option<usize> {
    let (rows, cols) = flow_dir.shape();
    let (row, col) = flow_dir.row_col(index);
    let code = flow_dir.get_index(index)?;
    receiver_of(code, row, col, rows, cols).map(|(r, c)| r * cols + c)
}

/// Linear indices of all cells ordered so that every donor precedes its
/// receiver (Kahn's algorithm over the D8 graph).
///
/// Cells caught in a flow cycle never reach in-degree zero and are left out.
pub(crate) fn topological_order(flow_dir: &Raster<u8>) -> Vec<usize> {
    let n = flow_dir.len();
    let receivers: Vec<Option<usize>> = (0..n).map(|i| receiver_index(flow_dir, i)).collect();

    let mut in_degree = vec![0u32; n];
    for r in receivers.iter().flatten() {
        in_degree[*r] += 1;
    }

    let mut stack: Vec<usize> = (0..n).filter(|&i| in_degree[i] == 0).rev().collect();
    let mut order = Vec::with_capacity(n);

    while let Some(i) = stack.pop() {
        order.push(i);
        if let Some(r) = receivers[i] {
            in_degree[r] -= 1;
            if in_degree[r] == 0 {
                stack.push(r);
            }
        }
    }

    order
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receiver_off_grid_is_none() {
        // East from the last column leaves the grid
        assert_eq!(receiver_of(1, 0, 4, 5, 5), None);
        assert_eq!(receiver_of(1, 0, 3, 5, 5), Some((0, 4)));
        assert_eq!(receiver_of(0, 2, 2, 5, 5), None);
        assert_eq!(receiver_of(8, 2, 2, 5, 5), Some((3, 3)));
    }

    #[test]
    fn test_topological_order_donors_first() {
        // 1x4 strip flowing east: 0 -> 1 -> 2 -> 3
        let fdir = Raster::from_vec(vec![1u8, 1, 1, 0], 1, 4).unwrap();
        let order = topological_order(&fdir);
        assert_eq!(order, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_topological_order_skips_cycles() {
        // Cells 0 and 1 point at each other
        let fdir = Raster::from_vec(vec![1u8, 5, 0], 1, 3).unwrap();
        let order = topological_order(&fdir);
        assert_eq!(order, vec![2]);
    }
}
