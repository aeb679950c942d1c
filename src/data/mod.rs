/// Data layer: graph types, loading, split masks and induced subgraphs.
///
/// Architecture:
/// ```text
///  .parquet / .json / .content+.cites
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → GraphDataset (masks from file or SplitStrategy)
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ GraphDataset  │  Graph + SplitMasks
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ subgraph  │  one mask → InducedSubgraph, three masks → Partition
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  export   │  Partition → train/validation/test .json
///   └──────────┘
/// ```

pub mod export;
pub mod loader;
pub mod mask;
pub mod model;
pub mod split;
pub mod subgraph;
