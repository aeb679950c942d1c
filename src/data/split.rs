//! Generating split masks for datasets that ship without them.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::mask::{NodeMask, SplitMasks};

/// How to assign nodes to train / validation / test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SplitStrategy {
    /// `per_class` nodes of each class for training, then `num_val` and
    /// `num_test` of the remaining nodes, all in node order.
    Planetoid {
        per_class: usize,
        num_val: usize,
        num_test: usize,
    },
    /// Seeded shuffle followed by contiguous slices; the test split gets
    /// whatever is left.
    Random {
        train_fraction: f64,
        val_fraction: f64,
        seed: u64,
    },
}

impl Default for SplitStrategy {
    fn default() -> Self {
        SplitStrategy::Planetoid {
            per_class: 20,
            num_val: 500,
            num_test: 1000,
        }
    }
}

impl SplitStrategy {
    /// Build masks for a graph with the given labels.
    pub fn masks(&self, labels: &[u32]) -> Result<SplitMasks> {
        match *self {
            SplitStrategy::Planetoid {
                per_class,
                num_val,
                num_test,
            } => Ok(planetoid_split(labels, per_class, num_val, num_test)),
            SplitStrategy::Random {
                train_fraction,
                val_fraction,
                seed,
            } => random_split(labels.len(), train_fraction, val_fraction, seed),
        }
    }
}

/// The Planetoid-style split. Short splits are returned when the graph runs
/// out of nodes.
pub fn planetoid_split(
    labels: &[u32],
    per_class: usize,
    num_val: usize,
    num_test: usize,
) -> SplitMasks {
    let n = labels.len();
    // Keyed by label so sparse class ids cost nothing.
    let mut taken: BTreeMap<u32, usize> = BTreeMap::new();
    let mut train = Vec::new();
    let mut rest = Vec::new();

    for (i, &label) in labels.iter().enumerate() {
        let slot = taken.entry(label).or_default();
        if *slot < per_class {
            *slot += 1;
            train.push(i);
        } else {
            rest.push(i);
        }
    }

    let val_end = num_val.min(rest.len());
    let test_end = (val_end + num_test).min(rest.len());

    SplitMasks::new(
        NodeMask::from_indices(n, train),
        NodeMask::from_indices(n, rest[..val_end].iter().copied()),
        NodeMask::from_indices(n, rest[val_end..test_end].iter().copied()),
    )
}

/// Shuffle node ids with a seeded RNG and cut them into three slices.
pub fn random_split(
    num_nodes: usize,
    train_fraction: f64,
    val_fraction: f64,
    seed: u64,
) -> Result<SplitMasks> {
    let valid = |f: f64| (0.0..=1.0).contains(&f);
    if !valid(train_fraction) || !valid(val_fraction) || train_fraction + val_fraction > 1.0 {
        return Err(Error::InvalidConfig(format!(
            "split fractions must be in [0, 1] and sum to at most 1, got train={train_fraction} val={val_fraction}"
        )));
    }

    let mut order: Vec<usize> = (0..num_nodes).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    order.shuffle(&mut rng);

    let train_end = (num_nodes as f64 * train_fraction).round() as usize;
    let val_end = (train_end + (num_nodes as f64 * val_fraction).round() as usize).min(num_nodes);

    Ok(SplitMasks::new(
        NodeMask::from_indices(num_nodes, order[..train_end].iter().copied()),
        NodeMask::from_indices(num_nodes, order[train_end..val_end].iter().copied()),
        NodeMask::from_indices(num_nodes, order[val_end..].iter().copied()),
    ))
}
