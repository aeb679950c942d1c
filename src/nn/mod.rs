//! GCN layers on top of candle.
//!
//! - [`adjacency`]: dense normalized propagation matrix from an edge list
//! - [`conv`]: the graph convolution layer
//! - [`model`]: the two-layer GCN and the [`GraphModule`](model::GraphModule) seam

pub mod adjacency;
pub mod conv;
pub mod model;
