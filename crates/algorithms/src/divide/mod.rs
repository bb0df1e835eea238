//! Drainage divide stability
//!
//! Compares channels across drainage divides using metrics that respond to
//! divide migration (Forte & Whipple, 2018): channel-head elevation, mean
//! upslope gradient, mean upslope local relief and chi. The side of a divide
//! with higher values is the aggressor.
//!
//! - [`divide_stability`]: the full pipeline
//! - [`adjust_base_level`]: restrict the network to a common base level
//! - [`normalize`]: min-max normalization
//! - [`extract_channel_heads`], [`network_segments`]: outputs

mod base_level;
mod channel_heads;
mod normalize;
mod observer;
mod params;
mod pipeline;
mod segments;

pub use base_level::{adjust_base_level, BaseLevelOutcome};
pub use channel_heads::{extract_channel_heads, ChannelHead, ChannelHeads};
pub use normalize::{normalize, value_range};
pub use observer::{Advisory, RecordingObserver, SilentObserver, Stage, StabilityObserver};
pub use params::{BaseLevel, BaseLevelKind, StabilityParams, ValidatedParams};
pub use pipeline::{divide_stability, DivideStability, StabilityResult, SEGMENT_ATTRIBUTES};
pub use segments::{network_segments, reaches};
