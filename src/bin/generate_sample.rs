use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{BooleanArray, Float64Builder, Int64Array, Int64Builder, ListBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use cora_split::data::split::planetoid_split;

const NUM_CLASSES: usize = 7;
const NODES_PER_CLASS: usize = 70;
const NUM_FEATURES: usize = 64;
/// Edge probability inside a class and across classes.
const P_IN: f64 = 0.06;
const P_OUT: f64 = 0.003;
/// Word probability for a class's own vocabulary slice and for any other word.
const P_WORD_OWN: f64 = 0.3;
const P_WORD_OTHER: f64 = 0.02;

/// Write a planted-partition citation graph to Parquet: nodes cite mostly
/// within their class and use mostly their class's words.
#[derive(Parser)]
#[command(name = "generate_sample")]
struct Args {
    /// Output Parquet file
    #[arg(default_value = "sample_graph.parquet")]
    output: PathBuf,

    /// RNG seed for features and edges
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let output_path = args.output;
    let mut rng = StdRng::seed_from_u64(args.seed);

    let n = NUM_CLASSES * NODES_PER_CLASS;
    let labels: Vec<usize> = (0..n).map(|i| i % NUM_CLASSES).collect();
    let words_per_class = NUM_FEATURES / NUM_CLASSES;

    let features: Vec<Vec<f64>> = labels
        .iter()
        .map(|&class| {
            let own = class * words_per_class..(class + 1) * words_per_class;
            (0..NUM_FEATURES)
                .map(|w| {
                    let p = if own.contains(&w) { P_WORD_OWN } else { P_WORD_OTHER };
                    if rng.gen_bool(p) { 1.0 } else { 0.0 }
                })
                .collect()
        })
        .collect();

    // one direction per pair; readers symmetrize when they need to
    let mut neighbors: Vec<Vec<i64>> = vec![Vec::new(); n];
    let mut num_edges = 0usize;
    for a in 0..n {
        for b in a + 1..n {
            let p = if labels[a] == labels[b] { P_IN } else { P_OUT };
            if rng.gen_bool(p) {
                neighbors[a].push(b as i64);
                num_edges += 1;
            }
        }
    }

    let class_ids: Vec<u32> = labels.iter().map(|&l| l as u32).collect();
    let masks = planetoid_split(&class_ids, 10, 70, 200);

    // Build Arrow arrays
    let mut x_builder = ListBuilder::new(Float64Builder::new());
    for row in &features {
        x_builder.values().append_slice(row);
        x_builder.append(true);
    }
    let x_array = x_builder.finish();

    let mut nb_builder = ListBuilder::new(Int64Builder::new());
    for row in &neighbors {
        nb_builder.values().append_slice(row);
        nb_builder.append(true);
    }
    let nb_array = nb_builder.finish();

    let y_array = Int64Array::from(labels.iter().map(|&l| l as i64).collect::<Vec<_>>());
    let mask_array = |bits: &[bool]| BooleanArray::from(bits.to_vec());

    let schema = Arc::new(Schema::new(vec![
        Field::new("x", DataType::List(Arc::new(Field::new("item", DataType::Float64, true))), false),
        Field::new("y", DataType::Int64, false),
        Field::new("neighbors", DataType::List(Arc::new(Field::new("item", DataType::Int64, true))), false),
        Field::new("train_mask", DataType::Boolean, false),
        Field::new("val_mask", DataType::Boolean, false),
        Field::new("test_mask", DataType::Boolean, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(x_array),
            Arc::new(y_array),
            Arc::new(nb_array),
            Arc::new(mask_array(masks.train.as_slice())),
            Arc::new(mask_array(masks.validation.as_slice())),
            Arc::new(mask_array(masks.test.as_slice())),
        ],
    )
    .context("building record batch")?;

    // Write Parquet
    let file = std::fs::File::create(&output_path)
        .with_context(|| format!("creating {}", output_path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;

    println!(
        "Wrote {n} nodes, {num_edges} edges, {NUM_FEATURES} features, {NUM_CLASSES} classes to {}",
        output_path.display()
    );
    Ok(())
}
