use candle_core::{Result, Tensor};
use candle_nn::{ops, VarBuilder};
use serde::{Deserialize, Serialize};

use super::conv::GcnConv;

/// A model that consumes a whole graph at once.
pub trait GraphModule {
    fn forward_t(&self, xs: &Tensor, adj: &Tensor, train: bool) -> Result<Tensor>;

    fn forward(&self, xs: &Tensor, adj: &Tensor) -> Result<Tensor> {
        self.forward_t(xs, adj, false)
    }
}

/// Shape of the two-layer GCN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub hidden: usize,
    /// Dropout probability applied to the input and hidden layer while training.
    pub dropout: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            hidden: 16,
            dropout: 0.5,
        }
    }
}

/// `conv1 → ReLU → dropout → conv2`, returning unnormalized class logits.
pub struct Gcn {
    conv1: GcnConv,
    conv2: GcnConv,
    dropout: f32,
}

impl Gcn {
    pub fn new(
        num_features: usize,
        num_classes: usize,
        config: &ModelConfig,
        vb: VarBuilder,
    ) -> Result<Self> {
        Ok(Self {
            conv1: GcnConv::new(num_features, config.hidden, true, vb.pp("conv1"))?,
            conv2: GcnConv::new(config.hidden, num_classes, true, vb.pp("conv2"))?,
            dropout: config.dropout,
        })
    }

    fn maybe_dropout(&self, xs: Tensor, train: bool) -> Result<Tensor> {
        if train && self.dropout > 0.0 {
            ops::dropout(&xs, self.dropout)
        } else {
            Ok(xs)
        }
    }
}

impl GraphModule for Gcn {
    fn forward_t(&self, xs: &Tensor, adj: &Tensor, train: bool) -> Result<Tensor> {
        let xs = self.maybe_dropout(xs.clone(), train)?;
        let xs = self.conv1.forward(&xs, adj)?.relu()?;
        let xs = self.maybe_dropout(xs, train)?;
        self.conv2.forward(&xs, adj)
    }
}
