use std::time::{Duration, Instant};

use candle_core::{DType, Device, D};
use candle_nn::{loss, AdamW, Optimizer, ParamsAdamW, VarBuilder, VarMap};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::nn::model::{Gcn, GraphModule, ModelConfig};

use super::dataset::SingleGraphDataset;
use super::metrics::accuracy;

// ---------------------------------------------------------------------------
// Training configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub max_epochs: usize,
    pub lr: f64,
    pub weight_decay: f64,
    /// Stop after this many epochs without a lower validation loss. Must be
    /// at least 1; `None` disables early stopping.
    pub patience: Option<usize>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            max_epochs: 200,
            lr: 0.01,
            weight_decay: 5e-4,
            patience: None,
        }
    }
}

impl TrainConfig {
    pub fn validate(&self) -> Result<()> {
        if self.patience == Some(0) {
            return Err(Error::InvalidConfig("patience must be at least 1 epoch".into()));
        }
        Ok(())
    }
}

/// One line of the training history.
#[derive(Debug, Clone, PartialEq)]
pub struct EpochRecord {
    pub epoch: usize,
    pub train_loss: f32,
    pub valid_loss: Option<f32>,
    pub valid_acc: Option<f64>,
    pub duration: Duration,
}

// ---------------------------------------------------------------------------
// GraphClassifier – fit / predict / score
// ---------------------------------------------------------------------------

/// Node classifier with an estimator-style interface over a [`GraphModule`].
///
/// Every epoch is one full-batch step on the single item of the training
/// dataset.
pub struct GraphClassifier<M: GraphModule = Gcn> {
    module: M,
    varmap: VarMap,
    config: TrainConfig,
    history: Vec<EpochRecord>,
}

impl GraphClassifier<Gcn> {
    /// A freshly initialised two-layer GCN.
    pub fn gcn(
        num_features: usize,
        num_classes: usize,
        model: &ModelConfig,
        config: TrainConfig,
        device: &Device,
    ) -> Result<Self> {
        if num_classes == 0 {
            return Err(Error::InvalidConfig("graph has no classes".into()));
        }
        config.validate()?;
        if !(0.0..1.0).contains(&model.dropout) {
            return Err(Error::InvalidConfig(format!(
                "dropout must be in [0, 1), got {}",
                model.dropout
            )));
        }
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);
        let module = Gcn::new(num_features, num_classes, model, vb)?;
        Ok(Self::from_module(module, varmap, config))
    }
}

impl<M: GraphModule> GraphClassifier<M> {
    /// Wrap a module whose trainable variables live in `varmap`.
    pub fn from_module(module: M, varmap: VarMap, config: TrainConfig) -> Self {
        Self {
            module,
            varmap,
            config,
            history: Vec::new(),
        }
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    pub fn history(&self) -> &[EpochRecord] {
        &self.history
    }

    pub fn module(&self) -> &M {
        &self.module
    }

    /// Train on `train`, reporting loss and accuracy on `valid` after every epoch.
    pub fn fit(
        &mut self,
        train: &SingleGraphDataset,
        valid: Option<&SingleGraphDataset>,
    ) -> Result<&[EpochRecord]> {
        self.config.validate()?;
        if train.num_nodes() == 0 {
            return Err(Error::EmptySplit);
        }
        let valid = valid.filter(|v| v.num_nodes() > 0);

        let mut optimizer = AdamW::new(
            self.varmap.all_vars(),
            ParamsAdamW {
                lr: self.config.lr,
                weight_decay: self.config.weight_decay,
                ..Default::default()
            },
        )?;

        self.history.clear();
        let mut best_valid = f32::INFINITY;
        let mut stale = 0usize;

        info!(
            "fitting on {} nodes for up to {} epochs",
            train.num_nodes(),
            self.config.max_epochs
        );

        for epoch in 1..=self.config.max_epochs {
            let start = Instant::now();

            let mut train_loss = 0f32;
            for (input, target) in train {
                let logits = self
                    .module
                    .forward_t(&input.features, &input.adjacency, true)?;
                let loss = loss::cross_entropy(&logits, target)?;
                optimizer.backward_step(&loss)?;
                train_loss = loss.to_scalar::<f32>()?;
            }

            let (valid_loss, valid_acc) = match valid {
                Some(v) => {
                    let (l, a) = self.evaluate(v)?;
                    (Some(l), Some(a))
                }
                None => (None, None),
            };

            let record = EpochRecord {
                epoch,
                train_loss,
                valid_loss,
                valid_acc,
                duration: start.elapsed(),
            };
            log_epoch(&record);
            self.history.push(record);

            if let (Some(patience), Some(loss)) = (self.config.patience, valid_loss) {
                if loss < best_valid {
                    best_valid = loss;
                    stale = 0;
                } else {
                    stale += 1;
                    if stale >= patience {
                        info!("no validation improvement for {patience} epochs, stopping at epoch {epoch}");
                        break;
                    }
                }
            }
        }

        Ok(&self.history)
    }

    /// Predicted class id per node.
    pub fn predict(&self, dataset: &SingleGraphDataset) -> Result<Vec<u32>> {
        let mut predictions = Vec::with_capacity(dataset.num_nodes());
        if dataset.num_nodes() == 0 {
            return Ok(predictions);
        }
        for (input, _) in dataset {
            let logits = self.module.forward(&input.features, &input.adjacency)?;
            predictions.extend(logits.argmax(D::Minus1)?.to_vec1::<u32>()?);
        }
        Ok(predictions)
    }

    /// Accuracy of [`predict`](Self::predict) against the dataset's labels.
    pub fn score(&self, dataset: &SingleGraphDataset) -> Result<f64> {
        if dataset.num_nodes() == 0 {
            return Err(Error::EmptySplit);
        }
        let y_pred = self.predict(dataset)?;
        let y_true = dataset.target().to_vec1::<u32>()?;
        accuracy(&y_true, &y_pred)
    }

    /// Loss and accuracy without dropout.
    fn evaluate(&self, dataset: &SingleGraphDataset) -> Result<(f32, f64)> {
        let mut result = (0f32, 0f64);
        for (input, target) in dataset {
            let logits = self.module.forward(&input.features, &input.adjacency)?;
            let loss = loss::cross_entropy(&logits, target)?.to_scalar::<f32>()?;
            let y_pred = logits.argmax(D::Minus1)?.to_vec1::<u32>()?;
            let y_true = target.to_vec1::<u32>()?;
            result = (loss, accuracy(&y_true, &y_pred)?);
        }
        Ok(result)
    }
}

fn log_epoch(r: &EpochRecord) {
    match (r.valid_loss, r.valid_acc) {
        (Some(vl), Some(va)) => info!(
            "epoch {:>4}  train_loss {:.4}  valid_loss {:.4}  valid_acc {:.4}  dur {:.3}s",
            r.epoch,
            r.train_loss,
            vl,
            va,
            r.duration.as_secs_f64()
        ),
        _ => debug!(
            "epoch {:>4}  train_loss {:.4}  dur {:.3}s",
            r.epoch,
            r.train_loss,
            r.duration.as_secs_f64()
        ),
    }
}
