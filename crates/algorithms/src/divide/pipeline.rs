//! The divide-stability pipeline
//!
//! Stages run in order and hand immutable values forward:
//!
//! 1. stream network from a drainage area threshold
//! 2. optional base-level control
//! 3. mean upslope gradient and relief (full grid)
//! 4. chi along the network
//! 5. min-max normalization of elevation, gradient and relief on the network
//! 6. channel heads with raw metrics
//! 7. channel segments carrying the normalized metrics and chi
//!
//! Parameters are validated before the first stage starts, so a
//! configuration error never leaves partial work behind.

use super::base_level::adjust_base_level;
use super::channel_heads::{extract_channel_heads, ChannelHeads};
use super::normalize::normalize;
use super::observer::{Advisory, SilentObserver, Stage, StabilityObserver};
use super::params::{StabilityParams, ValidatedParams};
use super::segments::network_segments;
use crate::hydrology::{
    channel_mask, chi_transform, drainage_area, upslope_mean, StreamNetwork, StreamNetworkParams,
};
use crate::maybe_rayon::join;
use crate::terrain::{gradient8, local_relief, LocalReliefParams};
use ridgeline_core::raster::Raster;
use ridgeline_core::vector::FeatureCollection;
use ridgeline_core::{Algorithm, Error, Result};

/// Segment attribute names, in export order
pub const SEGMENT_ATTRIBUTES: [&str; 4] = ["chan_elev", "slope", "relief", "chi"];

/// Output of a divide-stability run.
///
/// Per-cell vectors are aligned with `network.cells()`.
#[derive(Debug, Clone)]
pub struct StabilityResult {
    /// Network the metrics were computed on (after base-level control)
    pub network: StreamNetwork,
    /// Normalized channel elevation
    pub elevation: Vec<f64>,
    /// Normalized mean upslope gradient
    pub gradient: Vec<f64>,
    /// Normalized mean upslope relief
    pub relief: Vec<f64>,
    /// Raw chi
    pub chi: Vec<f64>,
    /// Reference drainage area chi was computed with
    pub reference_area: f64,
    pub heads: ChannelHeads,
    /// Line features ready for export
    pub segments: FeatureCollection,
    pub advisories: Vec<Advisory>,
    /// Threshold applied by base-level control, if any
    pub base_level_threshold: Option<f64>,
}

impl StabilityResult {
    /// Chi scattered onto the grid, NaN off the network
    pub fn chi_raster(&self) -> Result<Raster<f64>> {
        self.network.to_raster(&self.chi)
    }

    /// Channel heads as point features
    pub fn head_features(&self) -> FeatureCollection {
        self.heads.to_features(self.network.crs().cloned())
    }
}

fn run_stage<T>(
    observer: &mut dyn StabilityObserver,
    stage: Stage,
    f: impl FnOnce() -> Result<T>,
) -> Result<T> {
    observer.stage_started(stage);
    let out = f()?;
    observer.stage_finished(stage);
    Ok(out)
}

fn advise(observer: &mut dyn StabilityObserver, advisories: &mut Vec<Advisory>, advisory: Advisory) {
    observer.advisory(&advisory);
    advisories.push(advisory);
}

/// Compute divide-stability metrics for a DEM.
///
/// `dem` should be hydrologically conditioned and `flow_dir` its D8 flow
/// direction. Advisories are both reported to `observer` and returned.
pub fn divide_stability(
    dem: &Raster<f64>,
    flow_dir: &Raster<u8>,
    params: &StabilityParams,
    observer: &mut dyn StabilityObserver,
) -> Result<StabilityResult> {
    let params: ValidatedParams = params.validate()?;
    dem.ensure_same_shape(flow_dir)?;
    if dem.is_empty() {
        return Err(Error::InvalidDimensions {
            width: dem.cols(),
            height: dem.rows(),
        });
    }

    let mut advisories = Vec::new();

    let hillslope_length = params.hillslope_length();
    if params.relief_radius > hillslope_length {
        advise(
            observer,
            &mut advisories,
            Advisory::ReliefRadiusExceedsHillslopeLength {
                relief_radius: params.relief_radius,
                hillslope_length,
            },
        );
    }

    let (area, network) = run_stage(observer, Stage::BuildNetwork, || {
        let area = drainage_area(flow_dir)?;
        let mask = channel_mask(
            &area,
            &StreamNetworkParams {
                min_area: params.min_channel_area,
            },
        )?;
        let network = StreamNetwork::from_mask(flow_dir, &mask)?;
        Ok((area, network))
    })?;

    let (network, base_level_threshold) = match params.base_level {
        Some(policy) => {
            let outcome = run_stage(observer, Stage::AdjustBaseLevel, || {
                adjust_base_level(dem, flow_dir, &area, &network, policy)
            })?;
            if let Some(advisory) = outcome.advisory {
                advise(observer, &mut advisories, advisory);
            }
            (outcome.network, Some(outcome.threshold))
        }
        None => (network, None),
    };

    let (upslope_gradient, upslope_relief) = run_stage(observer, Stage::HillslopeStatistics, || {
        let (gradient, relief) = join(
            || gradient8(dem).and_then(|g| upslope_mean(flow_dir, &g)),
            || {
                local_relief(
                    dem,
                    LocalReliefParams {
                        radius: params.relief_radius,
                    },
                )
                .and_then(|r| upslope_mean(flow_dir, &r))
            },
        );
        Ok((gradient?, relief?))
    })?;

    let chi = run_stage(observer, Stage::Chi, || {
        chi_transform(&network, &area, params.chi)
    })?;

    let (raw_elevation, raw_gradient, raw_relief) =
        (network.sample(dem)?, network.sample(&upslope_gradient)?, network.sample(&upslope_relief)?);

    let (elevation, gradient, relief) = run_stage(observer, Stage::Normalize, || {
        Ok((
            normalize(&raw_elevation),
            normalize(&raw_gradient),
            normalize(&raw_relief),
        ))
    })?;

    let heads = run_stage(observer, Stage::ChannelHeads, || {
        extract_channel_heads(&network, &raw_elevation, &raw_gradient, &raw_relief, &chi)
    })?;

    let segment_length = params
        .segment_length
        .unwrap_or_else(|| 10.0 * dem.cell_size());
    let segments = run_stage(observer, Stage::Segments, || {
        let columns: [&[f64]; 4] = [&elevation, &gradient, &relief, &chi];
        let attributes: Vec<(&str, &[f64])> = SEGMENT_ATTRIBUTES.into_iter().zip(columns).collect();
        network_segments(&network, segment_length, &attributes)
    })?;

    Ok(StabilityResult {
        network,
        elevation,
        gradient,
        relief,
        chi,
        reference_area: params.chi.reference_area,
        heads,
        segments,
        advisories,
        base_level_threshold,
    })
}

/// Divide-stability analysis as an [`Algorithm`].
///
/// Input is the conditioned DEM and its D8 flow direction. Runs silently;
/// call [`divide_stability`] directly to observe progress.
#[derive(Debug, Clone, Default)]
pub struct DivideStability;

impl Algorithm for DivideStability {
    type Input = (Raster<f64>, Raster<u8>);
    type Output = StabilityResult;
    type Params = StabilityParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "Divide Stability"
    }

    fn description(&self) -> &'static str {
        "Channel-head and segment metrics for assessing drainage divide stability"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        let (dem, flow_dir) = input;
        divide_stability(&dem, &flow_dir, &params, &mut SilentObserver)
    }
}
