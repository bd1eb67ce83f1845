//! Evaluation helpers.
//!
//! Metrics do not participate in backprop; they score a prediction matrix
//! against a target matrix after the fact.

use crate::{Error, Result};

/// Fraction of rows where the prediction matches the target exactly.
///
/// Both buffers are flat row-major `(rows, dim)`. Exact equality makes this
/// meaningful for thresholded binary predictions and one-hot rows; raw
/// activations should be thresholded or arg-maxed first.
///
/// Fails with [`Error::DimensionMismatch`] if the row counts differ.
pub fn accuracy_score(predicted: &[f64], targets: &[f64], dim: usize) -> Result<f64> {
    if dim == 0 {
        return Err(Error::InvalidParameter("row width must be > 0".to_owned()));
    }
    if predicted.len() % dim != 0 || targets.len() % dim != 0 {
        return Err(Error::DimensionMismatch(format!(
            "prediction/target lengths {}/{} are not multiples of the row width {dim}",
            predicted.len(),
            targets.len()
        )));
    }
    if predicted.len() != targets.len() {
        return Err(Error::DimensionMismatch(format!(
            "prediction has {} rows, targets have {}",
            predicted.len() / dim,
            targets.len() / dim
        )));
    }
    if predicted.is_empty() {
        return Err(Error::InvalidParameter(
            "cannot score zero rows".to_owned(),
        ));
    }

    let rows = predicted.len() / dim;
    let mut correct = 0;
    for idx in 0..rows {
        let start = idx * dim;
        if predicted[start..start + dim] == targets[start..start + dim] {
            correct += 1;
        }
    }
    Ok(correct as f64 / rows as f64)
}

/// Index of the largest value in `row` (first one wins on ties).
///
/// This is the caller-side step that turns a softmax distribution into a
/// class index. Panics on an empty row.
pub fn argmax(row: &[f64]) -> usize {
    assert!(!row.is_empty(), "argmax of an empty row");
    let mut best = 0;
    for (i, &v) in row.iter().enumerate().skip(1) {
        if v > row[best] {
            best = i;
        }
    }
    best
}

/// Replace each `(rows, dim)` row with the one-hot vector of its arg-max.
///
/// Convenience for scoring multi-class predictions with
/// [`accuracy_score`].
pub fn one_hot_argmax(predicted: &[f64], dim: usize) -> Result<Vec<f64>> {
    if dim == 0 {
        return Err(Error::InvalidParameter("row width must be > 0".to_owned()));
    }
    if predicted.len() % dim != 0 {
        return Err(Error::DimensionMismatch(format!(
            "prediction length {} is not a multiple of the row width {dim}",
            predicted.len()
        )));
    }

    let mut out = vec![0.0; predicted.len()];
    for idx in 0..predicted.len() / dim {
        let start = idx * dim;
        out[start + argmax(&predicted[start..start + dim])] = 1.0;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accuracy_counts_exactly_matching_rows() {
        let predicted = [1.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        let targets = [1.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        let score = accuracy_score(&predicted, &targets, 2).unwrap();
        assert!((score - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn accuracy_rejects_mismatched_row_counts() {
        let err = accuracy_score(&[1.0, 0.0], &[1.0], 1);
        assert!(matches!(err, Err(Error::DimensionMismatch(_))));
    }

    #[test]
    fn argmax_picks_the_first_largest() {
        assert_eq!(argmax(&[0.1, 0.7, 0.2]), 1);
        assert_eq!(argmax(&[0.5, 0.5]), 0);
    }

    #[test]
    fn one_hot_argmax_rewrites_rows() {
        let rows = [0.1, 0.7, 0.2, 0.6, 0.3, 0.1];
        let one_hot = one_hot_argmax(&rows, 3).unwrap();
        assert_eq!(one_hot, vec![0.0, 1.0, 0.0, 1.0, 0.0, 0.0]);
    }
}
