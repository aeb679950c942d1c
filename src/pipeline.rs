use candle_core::Device;
use log::info;

use crate::config::RunConfig;
use crate::data::model::{validate_labels, GraphDataset, Split};
use crate::data::subgraph::{partition, Partition};
use crate::error::Result;
use crate::train::classifier::GraphClassifier;
use crate::train::dataset::SingleGraphDataset;

// ---------------------------------------------------------------------------
// Partitioning
// ---------------------------------------------------------------------------

/// Node and edge counts of one split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitSummary {
    pub split: Split,
    pub nodes: usize,
    pub edges: usize,
}

/// Partition the dataset's graph by its masks, symmetrizing edges first
/// when `undirected` is set.
pub fn split_dataset(dataset: &GraphDataset, undirected: bool) -> Result<Partition> {
    let partition = if undirected {
        partition(&dataset.graph.to_undirected(), &dataset.masks)?
    } else {
        partition(&dataset.graph, &dataset.masks)?
    };
    for s in summarize(&partition) {
        info!("{:<10} {:>6} nodes {:>7} edges", s.split, s.nodes, s.edges);
    }
    Ok(partition)
}

pub fn summarize(partition: &Partition) -> Vec<SplitSummary> {
    Split::ALL
        .iter()
        .map(|&split| {
            let sub = partition.get(split);
            SplitSummary {
                split,
                nodes: sub.num_nodes(),
                edges: sub.num_edges(),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Full run
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub splits: Vec<SplitSummary>,
    pub epochs: usize,
    pub final_train_loss: Option<f32>,
    pub test_accuracy: f64,
}

/// Split, fit on the train subgraph (validating on the validation subgraph)
/// and score the test subgraph.
pub fn run(dataset: &GraphDataset, config: &RunConfig, device: &Device) -> Result<RunReport> {
    let class_bound = if dataset.class_names.is_empty() {
        dataset.graph.num_nodes()
    } else {
        dataset.class_names.len()
    };
    validate_labels(&dataset.graph.labels, class_bound)?;
    let partition = split_dataset(dataset, config.undirected)?;

    let train = SingleGraphDataset::from_subgraph(&partition.train, device)?;
    let valid = SingleGraphDataset::from_subgraph(&partition.validation, device)?;
    let test = SingleGraphDataset::from_subgraph(&partition.test, device)?;

    let mut clf = GraphClassifier::gcn(
        dataset.graph.num_features(),
        dataset.num_classes(),
        &config.model,
        config.train.clone(),
        device,
    )?;

    let history = clf.fit(&train, Some(&valid))?;
    let epochs = history.len();
    let final_train_loss = history.last().map(|r| r.train_loss);

    let test_accuracy = clf.score(&test)?;
    info!("test accuracy {test_accuracy:.4} after {epochs} epochs");

    Ok(RunReport {
        splits: summarize(&partition),
        epochs,
        final_train_loss,
        test_accuracy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::mask::{NodeMask, SplitMasks};
    use crate::data::model::{FeatureMatrix, Graph};
    use crate::error::Error;
    use crate::train::classifier::TrainConfig;

    fn dataset() -> GraphDataset {
        // two cliques of 6 nodes, class = clique, features = noisy one-hot
        let n = 12;
        let labels: Vec<u32> = (0..n).map(|i| (i / 6) as u32).collect();
        let rows = labels
            .iter()
            .enumerate()
            .map(|(i, &l)| {
                let jitter = (i % 3) as f32 * 0.1;
                if l == 0 {
                    vec![1.0, jitter]
                } else {
                    vec![jitter, 1.0]
                }
            })
            .collect();
        let mut edges = Vec::new();
        for c in 0..2 {
            for a in c * 6..c * 6 + 6 {
                for b in c * 6..c * 6 + 6 {
                    if a < b {
                        edges.push((a, b));
                    }
                }
            }
        }
        let graph = Graph::new(FeatureMatrix::from_rows(rows).unwrap(), edges, labels).unwrap();
        let masks = SplitMasks::new(
            NodeMask::from_indices(n, [0, 1, 2, 6, 7, 8]),
            NodeMask::from_indices(n, [3, 9]),
            NodeMask::from_indices(n, [4, 5, 10, 11]),
        );
        GraphDataset {
            graph,
            masks,
            class_names: vec![],
        }
    }

    #[test]
    fn split_dataset_symmetrizes_edges() {
        let ds = dataset();
        let directed = split_dataset(&ds, false).unwrap();
        let undirected = split_dataset(&ds, true).unwrap();
        // train holds 3 nodes per clique: 3 directed edges each
        assert_eq!(directed.train.num_edges(), 6);
        assert_eq!(undirected.train.num_edges(), 12);
    }

    #[test]
    fn run_scores_test_split() {
        let mut config = RunConfig::default();
        config.model.dropout = 0.0;
        config.train = TrainConfig {
            max_epochs: 100,
            lr: 0.05,
            weight_decay: 0.0,
            patience: None,
        };
        let report = run(&dataset(), &config, &Device::Cpu).unwrap();
        assert_eq!(report.epochs, 100);
        assert_eq!(report.splits[2].nodes, 4);
        assert_eq!(report.test_accuracy, 1.0);
    }

    #[test]
    fn run_rejects_label_beyond_node_count() {
        let mut ds = dataset();
        ds.graph.labels[5] = 3_000_000_000;
        let err = run(&ds, &RunConfig::default(), &Device::Cpu).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidLabel {
                node: 5,
                num_classes: 12,
                ..
            }
        ));
    }
}
