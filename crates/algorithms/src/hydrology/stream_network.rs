//! Stream network extraction
//!
//! A stream network is derived from a D8 flow direction raster and a
//! channel mask. The mask usually comes from thresholding drainage area
//! ([`channel_mask`]), but any binary raster works: base-level adjustment
//! rebuilds networks from masks of retained cells.
//!
//! Inside the network, a cell's receiver is its D8 receiver when that
//! receiver is also a channel cell. Channel cells whose receiver is not a
//! channel cell (or that have none) are outlets, which makes every network
//! a forest of trees rooted at its outlets.

use std::collections::HashMap;

use super::d8::{receiver_index, topological_order};
use super::flow_accumulation::drainage_area;
use ridgeline_core::raster::{GeoTransform, Raster};
use ridgeline_core::{Error, Result, CRS};

/// Parameters for channel mask extraction
#[derive(Debug, Clone)]
pub struct StreamNetworkParams {
    /// Minimum drainage area (map units squared).
    /// Cells draining at least this area are channel cells.
    /// Default: 1e6 (1 km² for metric grids)
    pub min_area: f64,
}

impl Default for StreamNetworkParams {
    fn default() -> Self {
        Self { min_area: 1e6 }
    }
}

/// Threshold a drainage area raster into a channel mask.
///
/// # Returns
/// Raster<u8> with 1 = channel cell, 0 = hillslope cell
pub fn channel_mask(drainage_area: &Raster<f64>, params: &StreamNetworkParams) -> Result<Raster<u8>> {
    let data: Vec<u8> = drainage_area
        .data()
        .iter()
        .map(|&a| u8::from(!a.is_nan() && a >= params.min_area))
        .collect();
    drainage_area.derive(data, Some(0))
}

/// A channel network over a raster grid.
///
/// Cells are stored by linear grid index in topological order: every cell
/// comes before its receiver. Positions into [`cells`](Self::cells) are what
/// per-cell attributes (elevation samples, chi, ...) are aligned with.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamNetwork {
    rows: usize,
    cols: usize,
    transform: GeoTransform,
    crs: Option<CRS>,
    cells: Vec<usize>,
    receivers: Vec<Option<usize>>,
    positions: HashMap<usize, usize>,
}

impl StreamNetwork {
    /// Derive the network of all cells draining at least `min_area`.
    pub fn from_area_threshold(flow_dir: &Raster<u8>, min_area: f64) -> Result<Self> {
        let area = drainage_area(flow_dir)?;
        let mask = channel_mask(&area, &StreamNetworkParams { min_area })?;
        Self::from_mask(flow_dir, &mask)
    }

    /// Derive the network made of the non-zero cells of `mask`.
    ///
    /// Fails with [`Error::EmptyNetwork`] when the mask selects nothing.
    pub fn from_mask(flow_dir: &Raster<u8>, mask: &Raster<u8>) -> Result<Self> {
        flow_dir.ensure_same_shape(mask)?;

        let in_mask = |i: usize| mask.get_index(i).is_some_and(|v| v != 0);

        let cells: Vec<usize> = topological_order(flow_dir)
            .into_iter()
            .filter(|&i| in_mask(i))
            .collect();

        if cells.is_empty() {
            return Err(Error::EmptyNetwork("the channel mask selects no cells".into()));
        }

        let positions: HashMap<usize, usize> =
            cells.iter().enumerate().map(|(pos, &i)| (i, pos)).collect();

        let receivers = cells
            .iter()
            .map(|&i| receiver_index(flow_dir, i).and_then(|r| positions.get(&r).copied()))
            .collect();

        let (rows, cols) = flow_dir.shape();
        Ok(Self {
            rows,
            cols,
            transform: *flow_dir.transform(),
            crs: flow_dir.crs().cloned(),
            cells,
            receivers,
            positions,
        })
    }

    /// Number of channel cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false; an empty network cannot be built
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Grid dimensions (rows, cols) the network was derived on
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    pub fn crs(&self) -> Option<&CRS> {
        self.crs.as_ref()
    }

    /// Linear grid indices of the channel cells, donors before receivers
    pub fn cells(&self) -> &[usize] {
        &self.cells
    }

    /// Receiver position of each channel cell, `None` for outlets
    pub fn receivers(&self) -> &[Option<usize>] {
        &self.receivers
    }

    /// Position of a linear grid index within the network
    pub fn position(&self, index: usize) -> Option<usize> {
        self.positions.get(&index).copied()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.positions.contains_key(&index)
    }

    /// Number of in-network donors of every channel cell
    pub fn donor_counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.cells.len()];
        for r in self.receivers.iter().flatten() {
            counts[*r] += 1;
        }
        counts
    }

    /// Positions of outlets (cells without an in-network receiver)
    pub fn outlets(&self) -> Vec<usize> {
        (0..self.cells.len())
            .filter(|&p| self.receivers[p].is_none())
            .collect()
    }

    /// Positions of channel heads (cells without an in-network donor)
    pub fn channel_heads(&self) -> Vec<usize> {
        self.donor_counts()
            .iter()
            .enumerate()
            .filter(|&(_, &n)| n == 0)
            .map(|(p, _)| p)
            .collect()
    }

    /// Map coordinates of the center of the cell at `pos`
    pub fn coordinates(&self, pos: usize) -> (f64, f64) {
        let i = self.cells[pos];
        self.transform.pixel_to_geo(i % self.cols, i / self.cols)
    }

    /// Planar distance from the cell at `pos` to its receiver (0 at outlets)
    pub fn step_length(&self, pos: usize) -> f64 {
        match self.receivers[pos] {
            Some(r) => {
                let (x0, y0) = self.coordinates(pos);
                let (x1, y1) = self.coordinates(r);
                (x1 - x0).hypot(y1 - y0)
            }
            None => 0.0,
        }
    }

    /// Values of `raster` at every channel cell, in network order.
    /// Nodata cells come back as NaN.
    pub fn sample(&self, raster: &Raster<f64>) -> Result<Vec<f64>> {
        self.ensure_grid(raster)?;
        Ok(self
            .cells
            .iter()
            .map(|&i| {
                raster
                    .get_index(i)
                    .filter(|&v| !raster.is_nodata(v))
                    .unwrap_or(f64::NAN)
            })
            .collect())
    }

    /// Binary mask of the channel cells (1 = channel)
    pub fn to_mask(&self) -> Result<Raster<u8>> {
        let mut data = vec![0u8; self.rows * self.cols];
        for &i in &self.cells {
            data[i] = 1;
        }
        let mut mask = Raster::from_vec(data, self.rows, self.cols)?;
        mask.set_transform(self.transform);
        mask.set_crs(self.crs.clone());
        mask.set_nodata(Some(0));
        Ok(mask)
    }

    /// Scatter per-cell `values` onto a grid, NaN off the network
    pub fn to_raster(&self, values: &[f64]) -> Result<Raster<f64>> {
        if values.len() != self.cells.len() {
            return Err(Error::Algorithm(format!(
                "expected {} network values, got {}",
                self.cells.len(),
                values.len()
            )));
        }
        let mut data = vec![f64::NAN; self.rows * self.cols];
        for (&i, &v) in self.cells.iter().zip(values) {
            data[i] = v;
        }
        let mut raster = Raster::from_vec(data, self.rows, self.cols)?;
        raster.set_transform(self.transform);
        raster.set_crs(self.crs.clone());
        raster.set_nodata(Some(f64::NAN));
        Ok(raster)
    }

    fn ensure_grid(&self, raster: &Raster<f64>) -> Result<()> {
        let (ar, ac) = raster.shape();
        if (ar, ac) != (self.rows, self.cols) {
            return Err(Error::SizeMismatch {
                er: self.rows,
                ec: self.cols,
                ar,
                ac,
            });
        }
        Ok(())
    }
}
