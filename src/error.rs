//! Error types for graph partitioning and training.

use thiserror::Error;

use crate::data::model::Split;

/// Library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Mask length does not match the node count.
    #[error("invalid mask: expected length {expected}, got {got}")]
    InvalidMask { expected: usize, got: usize },

    /// An edge endpoint lies outside `[0, num_nodes)`.
    #[error("invalid edge #{index} ({src}, {dst}): graph has {num_nodes} nodes")]
    InvalidEdge {
        index: usize,
        src: i64,
        dst: i64,
        num_nodes: usize,
    },

    /// A class id at or beyond the number of classes the dataset can have.
    #[error("invalid label {label} at node {node}: expected a class id below {num_classes}")]
    InvalidLabel {
        node: usize,
        label: u32,
        num_classes: usize,
    },

    /// Two split masks select the same node.
    #[error("{first} and {second} masks overlap at node {node}")]
    OverlappingMasks {
        first: Split,
        second: Split,
        node: usize,
    },

    /// Dimension mismatch.
    #[error("dimension mismatch in {what}: expected {expected}, got {got}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    /// A split has no nodes to train or score on.
    #[error("split has no nodes")]
    EmptySplit,

    /// Invalid configuration.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Candle tensor error.
    #[error("tensor error: {0}")]
    Tensor(#[from] candle_core::Error),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
