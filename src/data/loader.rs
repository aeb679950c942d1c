use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array, LargeListArray, ListArray};
use arrow::datatypes::DataType;
use log::{info, warn};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::{Deserialize, Serialize};

use super::mask::{NodeMask, SplitMasks};
use super::model::{edges_from_signed, validate_labels, FeatureMatrix, Graph, GraphDataset};
use super::split::SplitStrategy;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a graph dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – one row per node: `x`, `y`, `neighbors`, optional masks
/// * `.json`    – a single [`GraphRecord`] object
/// * `.content` – raw Cora layout, citations read from the sibling `.cites`
///
/// Masks missing from the file are generated with `strategy`.
pub fn load_file(path: &Path, strategy: &SplitStrategy) -> Result<GraphDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path)?,
        "json" => load_json(path)?,
        "content" => load_cora_content(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };

    let masks = match parsed.masks {
        Some(masks) => masks,
        None => {
            info!("{} has no split masks, using {strategy:?}", path.display());
            strategy.masks(&parsed.graph.labels)?
        }
    };

    info!(
        "Loaded {}: {} nodes, {} edges, {} features",
        path.display(),
        parsed.graph.num_nodes(),
        parsed.graph.num_edges(),
        parsed.graph.num_features()
    );

    Ok(GraphDataset {
        graph: parsed.graph,
        masks,
        class_names: parsed.class_names,
    })
}

/// What a single loader produces before split generation.
struct Parsed {
    graph: Graph,
    masks: Option<SplitMasks>,
    class_names: Vec<String>,
}

/// Combine optional per-split masks. `None` when the file carried none of them.
fn collect_masks(
    num_nodes: usize,
    train: Option<Vec<bool>>,
    validation: Option<Vec<bool>>,
    test: Option<Vec<bool>>,
) -> Option<SplitMasks> {
    if train.is_none() && validation.is_none() && test.is_none() {
        return None;
    }
    let or_none = |m: Option<Vec<bool>>| m.map_or_else(|| NodeMask::none(num_nodes), NodeMask::new);
    Some(SplitMasks::new(or_none(train), or_none(validation), or_none(test)))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema:
///
/// ```json
/// {
///   "x": [[0.0, 1.0, ...], ...],
///   "edges": [[0, 1], [1, 2], ...],
///   "y": [3, 0, ...],
///   "train_mask": [true, false, ...],
///   "val_mask": [...],
///   "test_mask": [...],
///   "classes": ["Neural_Networks", ...]
/// }
/// ```
///
/// Masks and class names are optional. `original_ids` is written by the
/// partition exporter and ignored when loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphRecord {
    pub x: Vec<Vec<f32>>,
    pub edges: Vec<(i64, i64)>,
    pub y: Vec<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub train_mask: Option<Vec<bool>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub val_mask: Option<Vec<bool>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_mask: Option<Vec<bool>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_ids: Option<Vec<usize>>,
}

fn load_json(path: &Path) -> Result<Parsed> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let record: GraphRecord = serde_json::from_str(&text).context("parsing JSON")?;

    let num_nodes = record.x.len();
    let features = FeatureMatrix::from_rows(record.x).context("reading 'x'")?;
    let edges = edges_from_signed(&record.edges, num_nodes).context("reading 'edges'")?;
    let class_bound = if record.classes.is_empty() {
        num_nodes
    } else {
        record.classes.len()
    };
    validate_labels(&record.y, class_bound)?;
    let graph = Graph::new(features, edges, record.y)?;

    Ok(Parsed {
        graph,
        masks: collect_masks(num_nodes, record.train_mask, record.val_mask, record.test_mask),
        class_names: record.classes,
    })
}

// ---------------------------------------------------------------------------
// Raw Cora loader
// ---------------------------------------------------------------------------

/// `<paper_id> <f_1> ... <f_F> <class>` per line, tab-separated. Citations
/// come from `<stem>.cites` with lines `<cited> <citing>`; each becomes the
/// edge `citing → cited`.
fn load_cora_content(path: &Path) -> Result<Parsed> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_path(path)
        .context("opening .content file")?;

    let mut paper_ids: Vec<String> = Vec::new();
    let mut rows: Vec<Vec<f32>> = Vec::new();
    let mut raw_classes: Vec<String> = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("content row {row_no}"))?;
        if record.len() < 2 {
            bail!("content row {row_no}: expected id, features and class");
        }
        let last = record.len() - 1;
        let features = record
            .iter()
            .enumerate()
            .take(last)
            .skip(1)
            .map(|(j, tok)| {
                tok.trim()
                    .parse::<f32>()
                    .with_context(|| format!("Row {row_no}, feature {j}: '{tok}' is not a number"))
            })
            .collect::<Result<Vec<f32>>>()?;

        paper_ids.push(record[0].to_string());
        rows.push(features);
        raw_classes.push(record[last].to_string());
    }

    let class_names: Vec<String> = raw_classes
        .iter()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let class_of: HashMap<&str, u32> = class_names
        .iter()
        .enumerate()
        .map(|(i, c)| (c.as_str(), i as u32))
        .collect();
    let labels: Vec<u32> = raw_classes.iter().map(|c| class_of[c.as_str()]).collect();

    let index_of: HashMap<&str, usize> = paper_ids
        .iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), i))
        .collect();

    let cites_path = path.with_extension("cites");
    let mut cites = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_path(&cites_path)
        .with_context(|| format!("opening {}", cites_path.display()))?;

    let mut edges = Vec::new();
    let mut skipped = 0usize;
    for (row_no, result) in cites.records().enumerate() {
        let record = result.with_context(|| format!("cites row {row_no}"))?;
        let (Some(cited), Some(citing)) = (record.get(0), record.get(1)) else {
            bail!("cites row {row_no}: expected two paper ids");
        };
        match (index_of.get(citing.trim()), index_of.get(cited.trim())) {
            (Some(&src), Some(&dst)) => edges.push((src, dst)),
            _ => skipped += 1,
        }
    }
    if skipped > 0 {
        warn!("{skipped} citations reference unknown papers and were skipped");
    }

    let features = FeatureMatrix::from_rows(rows).context("reading features")?;
    let graph = Graph::new(features, edges, labels)?;

    Ok(Parsed {
        graph,
        masks: None,
        class_names,
    })
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet node table.
///
/// Expected schema:
/// - `x`: List<Float64|Float32> – node features
/// - `y`: Int32|Int64 – class id
/// - `neighbors`: List<Int64|Int32> – targets of the node's outgoing edges
/// - `train_mask`, `val_mask`, `test_mask`: Boolean, optional
fn load_parquet(path: &Path) -> Result<Parsed> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut rows: Vec<Vec<f32>> = Vec::new();
    let mut labels: Vec<u32> = Vec::new();
    let mut raw_edges: Vec<(i64, i64)> = Vec::new();
    let mut mask_bits: [Option<Vec<bool>>; 3] = [None, None, None];
    const MASK_COLUMNS: [&str; 3] = ["train_mask", "val_mask", "test_mask"];

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        let offset = rows.len();

        let column = |name: &str| {
            schema
                .index_of(name)
                .map(|i| batch.column(i))
                .map_err(|_| anyhow::anyhow!("Parquet file missing '{name}' column"))
        };
        let x_col = column("x")?;
        let y_col = column("y")?;
        let nb_col = column("neighbors")?;

        for row in 0..batch.num_rows() {
            let node = offset + row;
            rows.push(
                extract_f32_list(x_col, row)
                    .with_context(|| format!("Row {node}: failed to read 'x'"))?,
            );
            labels.push(
                extract_label(y_col, row)
                    .with_context(|| format!("Row {node}: failed to read 'y'"))?,
            );
            let neighbors = extract_i64_list(nb_col, row)
                .with_context(|| format!("Row {node}: failed to read 'neighbors'"))?;
            raw_edges.extend(neighbors.into_iter().map(|dst| (node as i64, dst)));
        }

        for (slot, name) in mask_bits.iter_mut().zip(MASK_COLUMNS) {
            let Some((idx, _)) = schema.column_with_name(name) else {
                continue;
            };
            let arr = batch
                .column(idx)
                .as_any()
                .downcast_ref::<BooleanArray>()
                .with_context(|| format!("'{name}' is not a boolean column"))?;
            let bits = slot.get_or_insert_with(|| vec![false; offset]);
            bits.resize(offset, false);
            bits.extend((0..arr.len()).map(|r| arr.is_valid(r) && arr.value(r)));
        }
    }

    let num_nodes = rows.len();
    for bits in mask_bits.iter_mut().flatten() {
        bits.resize(num_nodes, false);
    }
    let [train, validation, test] = mask_bits;

    let features = FeatureMatrix::from_rows(rows).context("reading 'x'")?;
    let edges = edges_from_signed(&raw_edges, num_nodes).context("reading 'neighbors'")?;
    validate_labels(&labels, num_nodes)?;
    let graph = Graph::new(features, edges, labels)?;

    Ok(Parsed {
        graph,
        masks: collect_masks(num_nodes, train, validation, test),
        class_names: Vec::new(),
    })
}

// -- Parquet / Arrow helpers --

/// The inner values array of a List or LargeList column at the given row.
fn list_values(col: &Arc<dyn Array>, row: usize) -> Result<Arc<dyn Array>> {
    if col.is_null(row) {
        bail!("null value in list column");
    }
    match col.data_type() {
        DataType::List(_) => Ok(col
            .as_any()
            .downcast_ref::<ListArray>()
            .context("expected ListArray")?
            .value(row)),
        DataType::LargeList(_) => Ok(col
            .as_any()
            .downcast_ref::<LargeListArray>()
            .context("expected LargeListArray")?
            .value(row)),
        other => bail!("Expected List or LargeList column, got {other:?}"),
    }
}

fn extract_f32_list(col: &Arc<dyn Array>, row: usize) -> Result<Vec<f32>> {
    let values = list_values(col, row)?;
    if let Some(arr) = values.as_any().downcast_ref::<Float64Array>() {
        Ok(arr.iter().map(|v| v.unwrap_or(f64::NAN) as f32).collect())
    } else if let Some(arr) = values.as_any().downcast_ref::<Float32Array>() {
        Ok(arr.iter().map(|v| v.unwrap_or(f32::NAN)).collect())
    } else {
        bail!(
            "List inner type is {:?}, expected Float64 or Float32",
            values.data_type()
        )
    }
}

fn extract_i64_list(col: &Arc<dyn Array>, row: usize) -> Result<Vec<i64>> {
    let values = list_values(col, row)?;
    if let Some(arr) = values.as_any().downcast_ref::<Int64Array>() {
        arr.iter()
            .map(|v| v.context("null neighbor id"))
            .collect()
    } else if let Some(arr) = values.as_any().downcast_ref::<Int32Array>() {
        arr.iter()
            .map(|v| v.map(i64::from).context("null neighbor id"))
            .collect()
    } else {
        bail!(
            "List inner type is {:?}, expected Int64 or Int32",
            values.data_type()
        )
    }
}

fn extract_label(col: &Arc<dyn Array>, row: usize) -> Result<u32> {
    if col.is_null(row) {
        bail!("null label");
    }
    let value = match col.data_type() {
        DataType::Int32 => i64::from(
            col.as_any()
                .downcast_ref::<Int32Array>()
                .context("expected Int32Array")?
                .value(row),
        ),
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .context("expected Int64Array")?
            .value(row),
        other => bail!("Expected Int32 or Int64 label column, got {other:?}"),
    };
    u32::try_from(value).with_context(|| format!("label {value} is not a valid class id"))
}
