//! Graph convolution.
//!
//! ```text
//! H' = Â H W + b,   Â = D^{-1/2} (A + I) D^{-1/2}
//! ```
//!
//! `Â` is precomputed once per subgraph by
//! [`adjacency_tensor`](super::adjacency::adjacency_tensor).

use candle_core::{Result, Tensor};
use candle_nn::{linear_no_bias, Init, Linear, Module, VarBuilder};

/// Graph Convolutional Network layer.
///
/// # Reference
///
/// Kipf & Welling, "Semi-Supervised Classification with Graph Convolutional
/// Networks", ICLR 2017.
pub struct GcnConv {
    linear: Linear,
    bias: Option<Tensor>,
}

impl GcnConv {
    /// Create a new GCN layer.
    ///
    /// # Arguments
    /// - `in_features`: Input feature dimension
    /// - `out_features`: Output feature dimension
    /// - `bias`: Whether to add a bias after aggregation
    /// - `vb`: Variable builder for parameter initialization
    pub fn new(in_features: usize, out_features: usize, bias: bool, vb: VarBuilder) -> Result<Self> {
        let linear = linear_no_bias(in_features, out_features, vb.pp("lin"))?;
        let bias = if bias {
            Some(vb.get_with_hints(out_features, "bias", Init::Const(0.0))?)
        } else {
            None
        };
        Ok(Self { linear, bias })
    }

    /// Forward pass.
    ///
    /// # Arguments
    /// - `x`: Node features (N x in_features)
    /// - `adj`: Normalized adjacency (N x N) with self loops
    ///
    /// # Returns
    /// - Node embeddings (N x out_features)
    pub fn forward(&self, x: &Tensor, adj: &Tensor) -> Result<Tensor> {
        let h = self.linear.forward(x)?;
        let h = adj.matmul(&h)?;
        match &self.bias {
            Some(b) => h.broadcast_add(b),
            None => Ok(h),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{DType, Device};
    use candle_nn::VarMap;

    #[test]
    fn forward_shape() {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);

        let gcn = GcnConv::new(8, 3, true, vb).unwrap();

        let x = Tensor::randn(0f32, 1f32, (5, 8), &device).unwrap();
        let adj = Tensor::eye(5, DType::F32, &device).unwrap();

        let out = gcn.forward(&x, &adj).unwrap();
        assert_eq!(out.dims(), &[5, 3]);
    }

    #[test]
    fn identity_adjacency_is_a_linear_map() {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let gcn = GcnConv::new(4, 2, false, vb).unwrap();

        let x = Tensor::randn(0f32, 1f32, (3, 4), &device).unwrap();
        let adj = Tensor::eye(3, DType::F32, &device).unwrap();

        let out = gcn.forward(&x, &adj).unwrap().to_vec2::<f32>().unwrap();
        let direct = gcn.linear.forward(&x).unwrap().to_vec2::<f32>().unwrap();
        assert_eq!(out, direct);
    }
}
