use crate::error::{Error, Result};

/// Fraction of positions where `y_pred` equals `y_true`.
pub fn accuracy(y_true: &[u32], y_pred: &[u32]) -> Result<f64> {
    if y_true.len() != y_pred.len() {
        return Err(Error::DimensionMismatch {
            what: "predictions",
            expected: y_true.len(),
            got: y_pred.len(),
        });
    }
    if y_true.is_empty() {
        return Err(Error::EmptySplit);
    }
    let hits = y_true.iter().zip(y_pred).filter(|(a, b)| a == b).count();
    Ok(hits as f64 / y_true.len() as f64)
}
