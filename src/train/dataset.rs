use std::iter::{self, Once};

use candle_core::{Device, Tensor};

use crate::data::subgraph::InducedSubgraph;
use crate::error::Result;
use crate::nn::adjacency::adjacency_tensor;

/// Everything a graph module needs for one forward pass.
#[derive(Debug, Clone)]
pub struct GraphInput {
    /// `(N, F)` node features.
    pub features: Tensor,
    /// `(N, N)` normalized adjacency.
    pub adjacency: Tensor,
}

/// One whole subgraph presented as a dataset of exactly one
/// `(input, target)` pair. Graph convolution needs every node and edge at
/// once, so the subgraph is never split into smaller batches.
#[derive(Debug, Clone)]
pub struct SingleGraphDataset {
    input: GraphInput,
    /// `(N,)` class ids as `u32`.
    target: Tensor,
    num_nodes: usize,
}

impl SingleGraphDataset {
    pub fn new(input: GraphInput, target: Tensor) -> Result<Self> {
        let num_nodes = target.dims1()?;
        Ok(Self {
            input,
            target,
            num_nodes,
        })
    }

    /// Move an induced subgraph onto `device`.
    pub fn from_subgraph(sub: &InducedSubgraph, device: &Device) -> Result<Self> {
        let n = sub.num_nodes();
        let features = Tensor::from_slice(
            sub.features.as_slice(),
            (n, sub.features.num_cols()),
            device,
        )?;
        let adjacency = adjacency_tensor(n, &sub.edges, device)?;
        let target = Tensor::from_slice(&sub.labels, n, device)?;
        Self::new(
            GraphInput {
                features,
                adjacency,
            },
            target,
        )
    }

    /// Always 1.
    pub fn len(&self) -> usize {
        1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Nodes in the wrapped subgraph.
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    pub fn get(&self, index: usize) -> Option<(&GraphInput, &Tensor)> {
        (index == 0).then_some((&self.input, &self.target))
    }

    /// A fresh iterator over the single item; may be called once per epoch.
    pub fn iter(&self) -> Once<(&GraphInput, &Tensor)> {
        iter::once((&self.input, &self.target))
    }

    pub fn target(&self) -> &Tensor {
        &self.target
    }
}

impl<'a> IntoIterator for &'a SingleGraphDataset {
    type Item = (&'a GraphInput, &'a Tensor);
    type IntoIter = Once<(&'a GraphInput, &'a Tensor)>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::mask::NodeMask;
    use crate::data::model::{FeatureMatrix, Graph};

    fn dataset() -> SingleGraphDataset {
        let features = FeatureMatrix::from_rows(vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]]).unwrap();
        let g = Graph::new(features, vec![(0, 1), (1, 2)], vec![0, 1, 1]).unwrap();
        let sub = g
            .induced_subgraph(&NodeMask::new(vec![true, true, false]))
            .unwrap();
        SingleGraphDataset::from_subgraph(&sub, &Device::Cpu).unwrap()
    }

    #[test]
    fn yields_exactly_one_pair() {
        let ds = dataset();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.iter().count(), 1);
        assert!(ds.get(0).is_some());
        assert!(ds.get(1).is_none());
    }

    #[test]
    fn iteration_restarts() {
        let ds = dataset();
        for _ in 0..3 {
            let items: Vec<_> = (&ds).into_iter().collect();
            assert_eq!(items.len(), 1);
        }
    }

    #[test]
    fn pair_covers_whole_subgraph() {
        let ds = dataset();
        let (input, target) = ds.get(0).unwrap();
        assert_eq!(input.features.dims(), &[2, 2]);
        assert_eq!(input.adjacency.dims(), &[2, 2]);
        assert_eq!(target.to_vec1::<u32>().unwrap(), vec![0, 1]);
        assert_eq!(ds.num_nodes(), 2);
    }
}
