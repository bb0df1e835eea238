//! Base-level control
//!
//! Channels are only comparable across a divide when they drain to a common
//! base level. Each policy picks a threshold (fixed, or derived from the
//! outlets of the network) and keeps the channel cells on the right side of
//! it. The kept cells are rebuilt into a new network, so outlets move up to
//! wherever the threshold cuts the channels.

use super::observer::Advisory;
use super::params::BaseLevel;
use crate::hydrology::StreamNetwork;
use ridgeline_core::raster::Raster;
use ridgeline_core::{Error, Result};

/// Network after base-level control
#[derive(Debug, Clone)]
pub struct BaseLevelOutcome {
    pub network: StreamNetwork,
    /// Threshold the network was cut at (elevation or drainage area)
    pub threshold: f64,
    pub advisory: Option<Advisory>,
}

/// Apply a base-level policy to `network`.
///
/// `dem` and `drainage_area` must share the grid of `flow_dir`. The input
/// network is left untouched.
pub fn adjust_base_level(
    dem: &Raster<f64>,
    flow_dir: &Raster<u8>,
    drainage_area: &Raster<f64>,
    network: &StreamNetwork,
    policy: BaseLevel,
) -> Result<BaseLevelOutcome> {
    flow_dir.ensure_same_shape(dem)?;
    flow_dir.ensure_same_shape(drainage_area)?;

    let outlet_values = |raster: &Raster<f64>| -> Result<Vec<f64>> {
        let sampled = network.sample(raster)?;
        Ok(network
            .outlets()
            .into_iter()
            .map(|p| sampled[p])
            .filter(|v| !v.is_nan())
            .collect())
    };

    let (threshold, advisory, keep_above, source) = match policy {
        BaseLevel::Elevation { min_elevation } => {
            let above: Vec<f64> = outlet_values(dem)?
                .into_iter()
                .filter(|&z| z > min_elevation)
                .collect();
            let advisory = (!above.is_empty()).then(|| Advisory::OutletsAboveBaseLevel {
                outlets: above.len(),
                highest: above.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                min_elevation,
            });
            (min_elevation, advisory, true, dem)
        }
        BaseLevel::DrainArea { max_drainage_area } => {
            let below: Vec<f64> = outlet_values(drainage_area)?
                .into_iter()
                .filter(|&a| a < max_drainage_area)
                .collect();
            let advisory = (!below.is_empty()).then(|| Advisory::OutletsBelowDrainageArea {
                outlets: below.len(),
                smallest: below.iter().copied().fold(f64::INFINITY, f64::min),
                max_drainage_area,
            });
            (max_drainage_area, advisory, false, drainage_area)
        }
        BaseLevel::MaxOutElevation => {
            let highest = outlet_values(dem)?
                .into_iter()
                .fold(f64::NEG_INFINITY, f64::max);
            (require_defined(highest, "outlet elevation")?, None, true, dem)
        }
        BaseLevel::MinOutDrainArea => {
            let smallest = outlet_values(drainage_area)?
                .into_iter()
                .fold(f64::INFINITY, f64::min);
            (require_defined(smallest, "outlet drainage area")?, None, false, drainage_area)
        }
    };

    let values = network.sample(source)?;
    let (rows, cols) = flow_dir.shape();
    let mut keep = vec![0u8; rows * cols];
    for (&i, &v) in network.cells().iter().zip(&values) {
        let retained = if keep_above { v >= threshold } else { v <= threshold };
        if retained {
            keep[i] = 1;
        }
    }
    let mask = flow_dir.derive(keep, Some(0))?;

    let network = StreamNetwork::from_mask(flow_dir, &mask).map_err(|e| match e {
        Error::EmptyNetwork(_) => Error::EmptyNetwork(format!(
            "base level control {} at {threshold} retains no channel cells",
            policy.kind()
        )),
        other => other,
    })?;

    Ok(BaseLevelOutcome {
        network,
        threshold,
        advisory,
    })
}

fn require_defined(value: f64, what: &str) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::Algorithm(format!("no outlet has a defined {what}")))
    }
}
