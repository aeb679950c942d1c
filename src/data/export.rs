use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;

use super::loader::GraphRecord;
use super::model::Split;
use super::subgraph::{InducedSubgraph, Partition};

/// A subgraph in the JSON loader layout, without masks.
pub fn to_record(sub: &InducedSubgraph, class_names: &[String]) -> GraphRecord {
    GraphRecord {
        x: sub.features.rows().map(<[f32]>::to_vec).collect(),
        edges: sub
            .edges
            .iter()
            .map(|&(s, d)| (s as i64, d as i64))
            .collect(),
        y: sub.labels.clone(),
        train_mask: None,
        val_mask: None,
        test_mask: None,
        classes: class_names.to_vec(),
        original_ids: Some(sub.original_ids.clone()),
    }
}

/// Write `train.json`, `validation.json` and `test.json` into `dir`.
pub fn write_partition(dir: &Path, partition: &Partition, class_names: &[String]) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    Split::ALL
        .iter()
        .map(|&split| {
            let path = dir.join(format!("{}.json", split.as_str()));
            let file = std::fs::File::create(&path)
                .with_context(|| format!("creating {}", path.display()))?;
            let record = to_record(partition.get(split), class_names);
            serde_json::to_writer(std::io::BufWriter::new(file), &record)
                .with_context(|| format!("writing {}", path.display()))?;
            info!("wrote {split} subgraph to {}", path.display());
            Ok(path)
        })
        .collect()
}
