//! Channel heads and their metrics
//!
//! Divide stability is read off the channel heads on either side of a
//! divide: the side with higher heads, steeper and higher-relief hillslopes,
//! or larger chi is the one losing area.

use geo_types::Point;

use crate::hydrology::StreamNetwork;
use ridgeline_core::vector::{Feature, FeatureCollection};
use ridgeline_core::{Error, Result};

/// Channel heads of a network with raw metrics, as parallel arrays.
///
/// Entry `k` of every array describes the same head. Heads are listed in
/// network order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelHeads {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// Linear grid indices
    pub indices: Vec<usize>,
    pub elevation: Vec<f64>,
    /// Mean upslope gradient
    pub gradient: Vec<f64>,
    /// Mean upslope local relief
    pub relief: Vec<f64>,
    pub chi: Vec<f64>,
}

/// One channel head, borrowed out of [`ChannelHeads`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelHead {
    pub x: f64,
    pub y: f64,
    pub index: usize,
    pub elevation: f64,
    pub gradient: f64,
    pub relief: f64,
    pub chi: f64,
}

impl ChannelHeads {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn get(&self, k: usize) -> Option<ChannelHead> {
        (k < self.len()).then(|| ChannelHead {
            x: self.x[k],
            y: self.y[k],
            index: self.indices[k],
            elevation: self.elevation[k],
            gradient: self.gradient[k],
            relief: self.relief[k],
            chi: self.chi[k],
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = ChannelHead> + '_ {
        (0..self.len()).filter_map(|k| self.get(k))
    }

    /// Heads as point features carrying their raw metrics
    pub fn to_features(&self, crs: Option<ridgeline_core::CRS>) -> FeatureCollection {
        let mut fc = FeatureCollection::with_crs(crs);
        for (k, head) in self.iter().enumerate() {
            let mut feature = Feature::new(Point::new(head.x, head.y)).with_id(format!("head-{k}"));
            feature.set_property("index", head.index as i64);
            feature.set_property("elevation", head.elevation);
            feature.set_property("gradient", head.gradient);
            feature.set_property("relief", head.relief);
            feature.set_property("chi", head.chi);
            fc.push(feature);
        }
        fc
    }
}

/// Collect the heads of `network` with their metrics.
///
/// `elevation`, `gradient`, `relief` and `chi` are per-cell attributes
/// aligned with `network.cells()`.
pub fn extract_channel_heads(
    network: &StreamNetwork,
    elevation: &[f64],
    gradient: &[f64],
    relief: &[f64],
    chi: &[f64],
) -> Result<ChannelHeads> {
    for (name, values) in [
        ("elevation", elevation),
        ("gradient", gradient),
        ("relief", relief),
        ("chi", chi),
    ] {
        if values.len() != network.len() {
            return Err(Error::Algorithm(format!(
                "{name} has {} values for a network of {} cells",
                values.len(),
                network.len()
            )));
        }
    }

    let positions = network.channel_heads();
    let mut heads = ChannelHeads::default();
    for p in positions {
        let (x, y) = network.coordinates(p);
        heads.x.push(x);
        heads.y.push(y);
        heads.indices.push(network.cells()[p]);
        heads.elevation.push(elevation[p]);
        heads.gradient.push(gradient[p]);
        heads.relief.push(relief[p]);
        heads.chi.push(chi[p]);
    }
    Ok(heads)
}
