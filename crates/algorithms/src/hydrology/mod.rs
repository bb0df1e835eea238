//! Hydrological analysis algorithms
//!
//! The routing engine behind divide-stability analysis:
//! - Priority-Flood: depression filling (Barnes 2014)
//! - Flow direction: D8 single flow direction
//! - Flow accumulation and drainage area
//! - Stream network: channel masks and the network graph
//! - Upslope statistics: catchment means of any raster
//! - Chi transform along a stream network

mod chi;
pub(crate) mod d8;
mod flow_accumulation;
mod flow_direction;
mod priority_flood;
mod stream_network;
mod upslope;

pub use chi::{chi_transform, ChiParams};
pub use flow_accumulation::{drainage_area, flow_accumulation, FlowAccumulation};
pub use flow_direction::{flow_direction, FlowDirection};
pub use priority_flood::{priority_flood, PriorityFlood, PriorityFloodParams};
pub use stream_network::{channel_mask, StreamNetwork, StreamNetworkParams};
pub use upslope::upslope_mean;
