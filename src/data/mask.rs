use crate::error::{Error, Result};

use super::model::Split;

// ---------------------------------------------------------------------------
// NodeMask – boolean selector for one split
// ---------------------------------------------------------------------------

/// Boolean vector of length N; `true` selects the node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodeMask(Vec<bool>);

impl NodeMask {
    pub fn new(bits: Vec<bool>) -> Self {
        Self(bits)
    }

    /// A mask of length `len` with nothing selected.
    pub fn none(len: usize) -> Self {
        Self(vec![false; len])
    }

    /// A mask of length `len` selecting `indices`. Out-of-range indices are ignored.
    pub fn from_indices(len: usize, indices: impl IntoIterator<Item = usize>) -> Self {
        let mut bits = vec![false; len];
        for i in indices {
            if let Some(b) = bits.get_mut(i) {
                *b = true;
            }
        }
        Self(bits)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, i: usize) -> bool {
        self.0.get(i).copied().unwrap_or(false)
    }

    /// Number of selected nodes.
    pub fn count(&self) -> usize {
        self.0.iter().filter(|&&b| b).count()
    }

    /// Selected node indices in ascending order.
    pub fn indices(&self) -> Vec<usize> {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(i, &b)| b.then_some(i))
            .collect()
    }

    /// First node selected by both masks, if any.
    pub fn overlap(&self, other: &NodeMask) -> Option<usize> {
        self.0
            .iter()
            .zip(&other.0)
            .position(|(&a, &b)| a && b)
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }
}

impl From<Vec<bool>> for NodeMask {
    fn from(bits: Vec<bool>) -> Self {
        Self(bits)
    }
}

// ---------------------------------------------------------------------------
// SplitMasks – train / validation / test
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SplitMasks {
    pub train: NodeMask,
    pub validation: NodeMask,
    pub test: NodeMask,
}

impl SplitMasks {
    pub fn new(train: NodeMask, validation: NodeMask, test: NodeMask) -> Self {
        Self {
            train,
            validation,
            test,
        }
    }

    pub fn get(&self, split: Split) -> &NodeMask {
        match split {
            Split::Train => &self.train,
            Split::Validation => &self.validation,
            Split::Test => &self.test,
        }
    }

    /// Check every mask has length `num_nodes` and no node is in two splits.
    pub fn validate(&self, num_nodes: usize) -> Result<()> {
        for split in Split::ALL {
            let got = self.get(split).len();
            if got != num_nodes {
                return Err(Error::InvalidMask {
                    expected: num_nodes,
                    got,
                });
            }
        }
        let pairs = [
            (Split::Train, Split::Validation),
            (Split::Train, Split::Test),
            (Split::Validation, Split::Test),
        ];
        for (first, second) in pairs {
            if let Some(node) = self.get(first).overlap(self.get(second)) {
                return Err(Error::OverlappingMasks {
                    first,
                    second,
                    node,
                });
            }
        }
        Ok(())
    }
}
