use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A directed edge `(src, dst)`; messages flow from `src` to `dst`.
pub type Edge = (usize, usize);

// ---------------------------------------------------------------------------
// FeatureMatrix – dense N × F node features
// ---------------------------------------------------------------------------

/// Row-major node feature matrix.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureMatrix {
    data: Vec<f32>,
    num_rows: usize,
    num_cols: usize,
}

impl FeatureMatrix {
    /// Wrap a flat row-major buffer.
    pub fn new(data: Vec<f32>, num_rows: usize, num_cols: usize) -> Result<Self> {
        if data.len() != num_rows * num_cols {
            return Err(Error::DimensionMismatch {
                what: "feature buffer",
                expected: num_rows * num_cols,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            num_rows,
            num_cols,
        })
    }

    /// Build from one `Vec` per node. All rows must share a width.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let num_cols = rows.first().map_or(0, Vec::len);
        let num_rows = rows.len();
        let mut data = Vec::with_capacity(num_rows * num_cols);
        for row in rows {
            if row.len() != num_cols {
                return Err(Error::DimensionMismatch {
                    what: "feature row",
                    expected: num_cols,
                    got: row.len(),
                });
            }
            data.extend(row);
        }
        Ok(Self {
            data,
            num_rows,
            num_cols,
        })
    }

    /// A matrix with no rows and `num_cols` columns.
    pub fn empty(num_cols: usize) -> Self {
        Self {
            data: Vec::new(),
            num_rows: 0,
            num_cols,
        }
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    /// Features of node `i`.
    pub fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.num_cols..(i + 1) * self.num_cols]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        (0..self.num_rows).map(move |i| self.row(i))
    }

    /// Flat row-major view.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Copy the given rows, in the given order, into a new matrix.
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        let mut data = Vec::with_capacity(indices.len() * self.num_cols);
        for &i in indices {
            data.extend_from_slice(self.row(i));
        }
        Self {
            data,
            num_rows: indices.len(),
            num_cols: self.num_cols,
        }
    }
}

// ---------------------------------------------------------------------------
// Graph – features, edges, labels
// ---------------------------------------------------------------------------

/// An attributed, labelled graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    pub features: FeatureMatrix,
    pub edges: Vec<Edge>,
    pub labels: Vec<u32>,
}

impl Graph {
    /// Build a graph, checking that labels cover every node and every edge
    /// endpoint is a valid node index.
    pub fn new(features: FeatureMatrix, edges: Vec<Edge>, labels: Vec<u32>) -> Result<Self> {
        let n = features.num_rows();
        if labels.len() != n {
            return Err(Error::DimensionMismatch {
                what: "labels",
                expected: n,
                got: labels.len(),
            });
        }
        validate_edges(&edges, n)?;
        Ok(Self {
            features,
            edges,
            labels,
        })
    }

    pub fn num_nodes(&self) -> usize {
        self.features.num_rows()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn num_features(&self) -> usize {
        self.features.num_cols()
    }

    /// Number of classes, taken as `max(label) + 1`.
    pub fn num_classes(&self) -> usize {
        self.labels.iter().max().map_or(0, |&m| m as usize + 1)
    }

    /// Add the reverse of every edge and drop duplicates. Self loops are kept once.
    pub fn to_undirected(&self) -> Self {
        let mut edges: Vec<Edge> = self
            .edges
            .iter()
            .flat_map(|&(s, d)| [(s, d), (d, s)])
            .collect();
        edges.sort_unstable();
        edges.dedup();
        Self {
            features: self.features.clone(),
            edges,
            labels: self.labels.clone(),
        }
    }
}

/// Check that every endpoint lies in `[0, num_nodes)`.
pub fn validate_edges(edges: &[Edge], num_nodes: usize) -> Result<()> {
    match edges
        .iter()
        .enumerate()
        .find(|(_, &(s, d))| s >= num_nodes || d >= num_nodes)
    {
        Some((index, &(src, dst))) => Err(Error::InvalidEdge {
            index,
            src: src as i64,
            dst: dst as i64,
            num_nodes,
        }),
        None => Ok(()),
    }
}

/// Check that every label is below `num_classes`.
///
/// Loaders without class names pass the node count: a graph cannot use more
/// classes than it has nodes, and this keeps class-sized allocations bounded.
pub fn validate_labels(labels: &[u32], num_classes: usize) -> Result<()> {
    match labels.iter().position(|&l| l as u64 >= num_classes as u64) {
        Some(node) => Err(Error::InvalidLabel {
            node,
            label: labels[node],
            num_classes,
        }),
        None => Ok(()),
    }
}

/// Convert raw signed endpoints, as they appear in input files, to edges.
pub fn edges_from_signed(raw: &[(i64, i64)], num_nodes: usize) -> Result<Vec<Edge>> {
    raw.iter()
        .enumerate()
        .map(|(index, &(src, dst))| {
            let in_range = |v: i64| v >= 0 && (v as u64) < num_nodes as u64;
            if in_range(src) && in_range(dst) {
                Ok((src as usize, dst as usize))
            } else {
                Err(Error::InvalidEdge {
                    index,
                    src,
                    dst,
                    num_nodes,
                })
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Split – which partition a mask selects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Validation,
    Test,
}

impl Split {
    pub const ALL: [Split; 3] = [Split::Train, Split::Validation, Split::Test];

    /// File stem used when exporting.
    pub fn as_str(self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Validation => "validation",
            Split::Test => "test",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// GraphDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// A loaded graph with its split masks.
#[derive(Debug, Clone)]
pub struct GraphDataset {
    pub graph: Graph,
    pub masks: super::mask::SplitMasks,
    /// Class names indexed by label id, when the source file provides them.
    pub class_names: Vec<String>,
}

impl GraphDataset {
    /// Output width for a classifier: the named classes, or `max(label) + 1`.
    pub fn num_classes(&self) -> usize {
        self.class_names.len().max(self.graph.num_classes())
    }

    /// Class names, falling back to the decimal class ids.
    pub fn class_labels(&self) -> Vec<String> {
        if self.class_names.is_empty() {
            (0..self.num_classes()).map(|c| c.to_string()).collect()
        } else {
            self.class_names.clone()
        }
    }
}
