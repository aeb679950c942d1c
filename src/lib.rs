//! Leakage-free train/validation/test splits of citation graphs, and a small
//! GCN trained through a `fit` / `predict` / `score` interface.
//!
//! Each split is an induced subgraph: its own nodes, the edges among them,
//! and node ids renumbered from zero. Training never sees validation or test
//! nodes, not even as neighbours.
//!
//! ```rust,ignore
//! use cora_split::data::loader::load_file;
//! use cora_split::data::split::SplitStrategy;
//! use cora_split::pipeline::split_dataset;
//!
//! let dataset = load_file("cora.content".as_ref(), &SplitStrategy::default())?;
//! let partition = split_dataset(&dataset, true)?;
//! println!("{} training nodes", partition.train.num_nodes());
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod nn;
pub mod pipeline;
pub mod train;

pub use error::{Error, Result};
