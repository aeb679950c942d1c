use candle_core::{Device, Tensor};

use crate::data::model::Edge;
use crate::error::Result;

/// Dense GCN propagation matrix `D^{-1/2} (A + I) D^{-1/2}`, row-major `n × n`.
///
/// An edge `(src, dst)` sets entry `[dst, src]`, so row `i` aggregates the
/// messages node `i` receives. Duplicate edges and explicit self loops
/// collapse to a single unit weight. Degrees are taken over incoming edges
/// (row sums), which equals the symmetric normalization for undirected graphs.
pub fn normalized_adjacency(num_nodes: usize, edges: &[Edge]) -> Vec<f32> {
    let n = num_nodes;
    let mut a = vec![0f32; n * n];
    for i in 0..n {
        a[i * n + i] = 1.0;
    }
    for &(src, dst) in edges {
        a[dst * n + src] = 1.0;
    }

    let inv_sqrt_deg: Vec<f32> = (0..n)
        .map(|i| {
            let deg: f32 = a[i * n..(i + 1) * n].iter().sum();
            1.0 / deg.sqrt()
        })
        .collect();

    for i in 0..n {
        for j in 0..n {
            a[i * n + j] *= inv_sqrt_deg[i] * inv_sqrt_deg[j];
        }
    }
    a
}

/// [`normalized_adjacency`] as an `(n, n)` tensor.
pub fn adjacency_tensor(num_nodes: usize, edges: &[Edge], device: &Device) -> Result<Tensor> {
    let a = normalized_adjacency(num_nodes, edges);
    Ok(Tensor::from_vec(a, (num_nodes, num_nodes), device)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn isolated_nodes_get_identity() {
        let a = normalized_adjacency(3, &[]);
        assert_eq!(a, vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn undirected_pair_is_symmetric() {
        // deg = 2 for both nodes, every entry 1/2
        let a = normalized_adjacency(2, &[(0, 1), (1, 0)]);
        assert!(a.iter().all(|&v| close(v, 0.5)));
    }

    #[test]
    fn directed_edge_fills_receiver_row() {
        let a = normalized_adjacency(2, &[(0, 1)]);
        // row-major [a00, a01, a10, a11]; node 1 receives from 0: deg(1) = 2, deg(0) = 1
        assert!(close(a[0], 1.0));
        assert!(close(a[1], 0.0));
        assert!(close(a[2], 1.0 / 2f32.sqrt()));
        assert!(close(a[3], 0.5));
    }

    #[test]
    fn duplicates_and_self_loops_collapse() {
        let a = normalized_adjacency(2, &[(0, 1), (0, 1), (1, 0), (0, 0)]);
        let b = normalized_adjacency(2, &[(0, 1), (1, 0)]);
        assert_eq!(a, b);
    }

    #[test]
    fn tensor_has_square_shape() {
        let t = adjacency_tensor(4, &[(0, 1)], &Device::Cpu).unwrap();
        assert_eq!(t.dims(), &[4, 4]);
    }
}
