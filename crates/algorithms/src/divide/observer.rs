//! Progress reporting for the divide-stability pipeline
//!
//! The pipeline never logs. Callers that want progress or warnings pass a
//! [`StabilityObserver`]; the CLI forwards events to `tracing`.

use std::fmt;

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    BuildNetwork,
    AdjustBaseLevel,
    HillslopeStatistics,
    Chi,
    Normalize,
    ChannelHeads,
    Segments,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::BuildNetwork => "building stream network",
            Stage::AdjustBaseLevel => "adjusting base level",
            Stage::HillslopeStatistics => "computing upslope gradient and relief",
            Stage::Chi => "computing chi",
            Stage::Normalize => "normalizing metrics",
            Stage::ChannelHeads => "extracting channel heads",
            Stage::Segments => "building channel segments",
        };
        f.write_str(s)
    }
}

/// Non-fatal conditions worth telling the user about
#[derive(Debug, Clone, PartialEq)]
pub enum Advisory {
    /// The relief window is wider than a typical hillslope
    ReliefRadiusExceedsHillslopeLength {
        relief_radius: f64,
        hillslope_length: f64,
    },
    /// Some outlets sit above the elevation floor, so their basins are cut
    /// off from the comparison
    OutletsAboveBaseLevel {
        outlets: usize,
        highest: f64,
        min_elevation: f64,
    },
    /// Some outlets drain less than the area ceiling
    OutletsBelowDrainageArea {
        outlets: usize,
        smallest: f64,
        max_drainage_area: f64,
    },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::ReliefRadiusExceedsHillslopeLength {
                relief_radius,
                hillslope_length,
            } => write!(
                f,
                "relief radius {relief_radius} exceeds the hillslope length {hillslope_length:.1} \
                 implied by the channel area threshold; consider a smaller radius"
            ),
            Advisory::OutletsAboveBaseLevel {
                outlets,
                highest,
                min_elevation,
            } => write!(
                f,
                "{outlets} outlet(s) lie above min_elevation {min_elevation} (highest {highest}); \
                 their channels are not comparable to the rest of the network"
            ),
            Advisory::OutletsBelowDrainageArea {
                outlets,
                smallest,
                max_drainage_area,
            } => write!(
                f,
                "{outlets} outlet(s) drain less than max_drainage_area {max_drainage_area} \
                 (smallest {smallest}); their channels are not comparable to the rest of the network"
            ),
        }
    }
}

/// Receives pipeline events. Every method defaults to doing nothing.
pub trait StabilityObserver {
    fn stage_started(&mut self, _stage: Stage) {}

    fn stage_finished(&mut self, _stage: Stage) {}

    fn advisory(&mut self, _advisory: &Advisory) {}
}

/// Observer that ignores every event
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentObserver;

impl StabilityObserver for SilentObserver {}

/// Observer that keeps every event, mostly useful in tests
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    pub started: Vec<Stage>,
    pub finished: Vec<Stage>,
    pub advisories: Vec<Advisory>,
}

impl StabilityObserver for RecordingObserver {
    fn stage_started(&mut self, stage: Stage) {
        self.started.push(stage);
    }

    fn stage_finished(&mut self, stage: Stage) {
        self.finished.push(stage);
    }

    fn advisory(&mut self, advisory: &Advisory) {
        self.advisories.push(advisory.clone());
    }
}
