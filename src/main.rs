//! cora-split - induced-subgraph splits and GCN training from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Dataset statistics and split sizes
//! cora-split stats cora/cora.content
//!
//! # Partition into train/validation/test subgraphs and export them
//! cora-split split cora/cora.content --out-dir splits/
//!
//! # Fit a GCN on the train split and report test accuracy
//! cora-split train cora/cora.content --epochs 200 --lr 0.01
//! ```

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use candle_core::Device;
use clap::{Parser, Subcommand};

use cora_split::config::RunConfig;
use cora_split::data::export::write_partition;
use cora_split::data::loader::load_file;
use cora_split::data::model::{GraphDataset, Split};
use cora_split::pipeline::{run, split_dataset, summarize};

#[derive(Parser)]
#[command(name = "cora-split")]
#[command(about = "Leakage-free graph splits and GCN training", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show statistics about a graph dataset
    Stats {
        /// Input file (.parquet, .json or .content)
        input: PathBuf,

        /// JSON run configuration
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Partition a dataset into induced train/validation/test subgraphs
    Split {
        /// Input file (.parquet, .json or .content)
        input: PathBuf,

        /// Directory to write train.json, validation.json and test.json into
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// JSON run configuration
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Keep edge directions as they are in the file
        #[arg(long)]
        directed: bool,
    },

    /// Fit a GCN on the train split and score it on the test split
    Train {
        /// Input file (.parquet, .json or .content)
        input: PathBuf,

        /// JSON run configuration
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Maximum number of epochs
        #[arg(long)]
        epochs: Option<usize>,

        /// Learning rate
        #[arg(long)]
        lr: Option<f64>,

        /// Hidden layer width
        #[arg(long)]
        hidden: Option<usize>,

        /// Early-stopping patience on validation loss
        #[arg(long)]
        patience: Option<usize>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Stats { input, config } => {
            let config = load_config(config.as_deref())?;
            let dataset = load(&input, &config)?;
            let g = &dataset.graph;
            dataset.masks.validate(g.num_nodes())?;

            println!("Nodes:          {}", g.num_nodes());
            println!("Edges:          {}", g.num_edges());
            println!("Features:       {}", g.num_features());
            println!("Classes:        {}", dataset.num_classes());
            for split in Split::ALL {
                println!(
                    "{:<16}{}",
                    format!("{}:", capitalize(split.as_str())),
                    dataset.masks.get(split).count()
                );
            }
        }

        Commands::Split {
            input,
            out_dir,
            config,
            directed,
        } => {
            let config = load_config(config.as_deref())?;
            let dataset = load(&input, &config)?;
            let undirected = config.undirected && !directed;
            let partition = split_dataset(&dataset, undirected)?;

            for s in summarize(&partition) {
                println!("{:<12}{:>6} nodes {:>7} edges", s.split, s.nodes, s.edges);
            }
            let source_edges = if undirected {
                dataset.graph.to_undirected().num_edges()
            } else {
                dataset.graph.num_edges()
            };
            println!(
                "Dropped edges: {}",
                partition.dropped_edges(source_edges)
            );

            if let Some(dir) = out_dir {
                for path in write_partition(&dir, &partition, &dataset.class_labels())? {
                    println!("Wrote {}", path.display());
                }
            }
        }

        Commands::Train {
            input,
            config,
            epochs,
            lr,
            hidden,
            patience,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(epochs) = epochs {
                config.train.max_epochs = epochs;
            }
            if let Some(lr) = lr {
                config.train.lr = lr;
            }
            if let Some(hidden) = hidden {
                config.model.hidden = hidden;
            }
            if patience.is_some() {
                config.train.patience = patience;
            }

            let dataset = load(&input, &config)?;
            let start = Instant::now();
            let report = run(&dataset, &config, &Device::Cpu)?;

            println!("Epochs:         {}", report.epochs);
            if let Some(loss) = report.final_train_loss {
                println!("Train loss:     {loss:.4}");
            }
            println!("Time:           {:.2?}", start.elapsed());
            println!("Test accuracy: {:.4}", report.test_accuracy);
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<RunConfig> {
    match path {
        Some(p) => RunConfig::from_file(p),
        None => Ok(RunConfig::default()),
    }
}

fn load(input: &Path, config: &RunConfig) -> Result<GraphDataset> {
    load_file(input, &config.split).with_context(|| format!("loading {}", input.display()))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
