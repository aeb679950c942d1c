//! Training layer: single-item dataset adapter, estimator-style classifier, metrics.
//!
//! ```text
//!   InducedSubgraph
//!        │  from_subgraph
//!        ▼
//!   ┌────────────────────┐
//!   │ SingleGraphDataset │  exactly one (GraphInput, target) pair
//!   └────────────────────┘
//!        │  fit / predict / score
//!        ▼
//!   ┌─────────────────┐
//!   │ GraphClassifier │  AdamW + cross-entropy, full batch
//!   └─────────────────┘
//! ```

pub mod classifier;
pub mod dataset;
pub mod metrics;
