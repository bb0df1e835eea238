//! # Ridgeline Algorithms
//!
//! Drainage-divide stability analysis for Digital Elevation Models.
//!
//! ## Modules
//!
//! - **hydrology**: Depression filling, D8 flow direction, drainage area,
//!   stream networks, upslope statistics, chi transform
//! - **terrain**: Steepest-descent gradient, local relief
//! - **divide**: The divide-stability pipeline: base-level control,
//!   normalization, channel heads and segment export

pub mod divide;
pub mod hydrology;
pub mod terrain;

mod maybe_rayon;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::divide::{
        divide_stability, Advisory, BaseLevel, BaseLevelKind, ChannelHeads, DivideStability,
        SilentObserver, StabilityObserver, StabilityParams, StabilityResult, Stage,
    };
    pub use crate::hydrology::{
        chi_transform, drainage_area, flow_accumulation, flow_direction, priority_flood,
        upslope_mean, ChiParams, PriorityFloodParams, StreamNetwork,
    };
    pub use crate::terrain::{gradient8, local_relief, LocalReliefParams};
    pub use ridgeline_core::prelude::*;
}
