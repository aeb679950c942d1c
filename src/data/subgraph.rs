use log::debug;

use crate::error::{Error, Result};

use super::mask::{NodeMask, SplitMasks};
use super::model::{validate_edges, Edge, FeatureMatrix, Graph, Split};

// ---------------------------------------------------------------------------
// InducedSubgraph – one split, re-indexed
// ---------------------------------------------------------------------------

/// The nodes selected by a mask and the edges among them, with node ids
/// remapped to `0..num_nodes()` in original order.
#[derive(Debug, Clone, PartialEq)]
pub struct InducedSubgraph {
    pub features: FeatureMatrix,
    pub edges: Vec<Edge>,
    pub labels: Vec<u32>,
    /// `original_ids[new] == old`.
    pub original_ids: Vec<usize>,
}

impl InducedSubgraph {
    pub fn num_nodes(&self) -> usize {
        self.labels.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Extract the subgraph induced by `mask`.
///
/// Edges with only one selected endpoint are dropped. Fails with
/// [`Error::InvalidMask`] when `mask.len() != N`, and with
/// [`Error::InvalidEdge`] when any edge, selected or not, leaves `[0, N)`.
pub fn extract_induced_subgraph(
    features: &FeatureMatrix,
    edges: &[Edge],
    labels: &[u32],
    mask: &NodeMask,
) -> Result<InducedSubgraph> {
    let n = features.num_rows();
    if mask.len() != n {
        return Err(Error::InvalidMask {
            expected: n,
            got: mask.len(),
        });
    }
    if labels.len() != n {
        return Err(Error::DimensionMismatch {
            what: "labels",
            expected: n,
            got: labels.len(),
        });
    }
    validate_edges(edges, n)?;

    let selected = mask.indices();

    // old index -> new index, None when unselected
    let mut remap: Vec<Option<usize>> = vec![None; n];
    for (new, &old) in selected.iter().enumerate() {
        remap[old] = Some(new);
    }

    let sub_edges: Vec<Edge> = edges
        .iter()
        .filter_map(|&(s, d)| Some((remap[s]?, remap[d]?)))
        .collect();

    Ok(InducedSubgraph {
        features: features.select_rows(&selected),
        edges: sub_edges,
        labels: selected.iter().map(|&i| labels[i]).collect(),
        original_ids: selected,
    })
}

impl Graph {
    /// [`extract_induced_subgraph`] on this graph.
    pub fn induced_subgraph(&self, mask: &NodeMask) -> Result<InducedSubgraph> {
        extract_induced_subgraph(&self.features, &self.edges, &self.labels, mask)
    }
}

// ---------------------------------------------------------------------------
// Partition – all three splits
// ---------------------------------------------------------------------------

/// Three independent induced subgraphs built from one graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    pub train: InducedSubgraph,
    pub validation: InducedSubgraph,
    pub test: InducedSubgraph,
}

impl Partition {
    pub fn get(&self, split: Split) -> &InducedSubgraph {
        match split {
            Split::Train => &self.train,
            Split::Validation => &self.validation,
            Split::Test => &self.test,
        }
    }

    /// Edges of the source graph that did not survive in any split.
    pub fn dropped_edges(&self, source_edges: usize) -> usize {
        let kept: usize = Split::ALL.iter().map(|&s| self.get(s).num_edges()).sum();
        source_edges.saturating_sub(kept)
    }
}

/// Validate `masks` against `graph` and extract one subgraph per split.
pub fn partition(graph: &Graph, masks: &SplitMasks) -> Result<Partition> {
    masks.validate(graph.num_nodes())?;

    let extract = |split: Split| -> Result<InducedSubgraph> {
        let sub = graph.induced_subgraph(masks.get(split))?;
        debug!(
            "{split} subgraph: {} nodes, {} edges",
            sub.num_nodes(),
            sub.num_edges()
        );
        Ok(sub)
    };

    Ok(Partition {
        train: extract(Split::Train)?,
        validation: extract(Split::Validation)?,
        test: extract(Split::Test)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 4 nodes, identity features, edges (0,1) (1,2) (2,3) (0,3), labels 0 1 0 1.
    fn square() -> Graph {
        let features = FeatureMatrix::from_rows(
            (0..4)
                .map(|i| (0..4).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
                .collect(),
        )
        .unwrap();
        Graph::new(features, vec![(0, 1), (1, 2), (2, 3), (0, 3)], vec![0, 1, 0, 1]).unwrap()
    }

    #[test]
    fn non_adjacent_nodes_keep_no_edges() {
        let g = square();
        let sub = g
            .induced_subgraph(&NodeMask::new(vec![true, false, true, false]))
            .unwrap();
        assert_eq!(sub.num_nodes(), 2);
        assert_eq!(sub.features.row(0), &[1.0, 0.0, 0.0, 0.0]);
        assert_eq!(sub.features.row(1), &[0.0, 0.0, 1.0, 0.0]);
        assert!(sub.edges.is_empty());
        assert_eq!(sub.labels, vec![0, 0]);
        assert_eq!(sub.original_ids, vec![0, 2]);
    }

    #[test]
    fn adjacent_nodes_keep_their_edge() {
        let g = square();
        let sub = g
            .induced_subgraph(&NodeMask::new(vec![true, true, false, false]))
            .unwrap();
        assert_eq!(sub.num_nodes(), 2);
        assert_eq!(sub.edges, vec![(0, 1)]);
        assert_eq!(sub.labels, vec![0, 1]);
    }

    #[test]
    fn endpoints_are_remapped() {
        let g = square();
        let sub = g
            .induced_subgraph(&NodeMask::new(vec![false, false, true, true]))
            .unwrap();
        assert_eq!(sub.edges, vec![(0, 1)]);
        assert_eq!(sub.original_ids, vec![2, 3]);
    }

    #[test]
    fn empty_mask_gives_empty_subgraph() {
        let g = square();
        let sub = g.induced_subgraph(&NodeMask::none(4)).unwrap();
        assert!(sub.is_empty());
        assert!(sub.edges.is_empty());
        assert_eq!(sub.features.num_rows(), 0);
        assert_eq!(sub.features.num_cols(), 4);
    }

    #[test]
    fn mask_length_is_checked_first() {
        let g = square();
        let err = extract_induced_subgraph(&g.features, &[(0, 9)], &g.labels, &NodeMask::none(3))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidMask {
                expected: 4,
                got: 3
            }
        ));
    }

    #[test]
    fn unselected_bad_edge_still_fails() {
        let g = square();
        let err = extract_induced_subgraph(
            &g.features,
            &[(0, 1), (3, 4)],
            &g.labels,
            &NodeMask::new(vec![true, true, false, false]),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidEdge { index: 1, dst: 4, .. }));
    }

    #[test]
    fn partition_splits_square() {
        let g = square();
        let masks = SplitMasks::new(
            NodeMask::from_indices(4, [0, 1]),
            NodeMask::from_indices(4, [2]),
            NodeMask::from_indices(4, [3]),
        );
        let p = partition(&g, &masks).unwrap();
        assert_eq!(p.train.edges, vec![(0, 1)]);
        assert_eq!(p.validation.num_nodes(), 1);
        assert_eq!(p.test.original_ids, vec![3]);
        assert_eq!(p.dropped_edges(g.num_edges()), 3);
    }

    #[test]
    fn partition_rejects_overlap() {
        let g = square();
        let masks = SplitMasks::new(
            NodeMask::from_indices(4, [0, 1]),
            NodeMask::from_indices(4, [1]),
            NodeMask::from_indices(4, [3]),
        );
        assert!(matches!(
            partition(&g, &masks),
            Err(Error::OverlappingMasks { node: 1, .. })
        ));
    }
}
