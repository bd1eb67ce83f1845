//! Dataset plumbing: validated row-major storage, train/test splitting, and
//! min-max feature scaling.
//!
//! The engine itself only consumes flat numeric tables; these helpers are the
//! glue that produces them. Splitting is contiguous and order-preserving (no
//! shuffling), matching the fixed-order training loop.

use crate::{Error, Result};

/// A matrix of input samples (X).
///
/// Stored contiguously in row-major layout: `values.len() == len * dim`.
#[derive(Debug, Clone)]
pub struct Inputs {
    values: Vec<f64>,
    len: usize,
    dim: usize,
}

impl Inputs {
    /// Build inputs from a flat `(len, dim)` buffer.
    pub fn from_flat(values: Vec<f64>, dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(Error::InvalidParameter("input dim must be > 0".to_owned()));
        }
        if values.len() % dim != 0 {
            return Err(Error::DimensionMismatch(format!(
                "input length {} is not divisible by dim {dim}",
                values.len()
            )));
        }

        let len = values.len() / dim;
        Ok(Self { values, len, dim })
    }

    /// Build inputs from per-sample rows (copies into contiguous storage).
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let dim = rows.first().map(|r| r.len()).unwrap_or(0);
        if dim == 0 {
            return Err(Error::InvalidParameter(
                "inputs must have at least one row and one column".to_owned(),
            ));
        }

        let mut values = Vec::with_capacity(rows.len() * dim);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != dim {
                return Err(Error::DimensionMismatch(format!(
                    "input row {i} has length {}, expected {dim}",
                    row.len()
                )));
            }
            values.extend_from_slice(row);
        }

        Ok(Self {
            values,
            len: rows.len(),
            dim,
        })
    }

    /// Number of samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Per-sample width.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// The `idx`-th row. Panics if `idx >= len`.
    #[inline]
    pub fn row(&self, idx: usize) -> &[f64] {
        let start = idx * self.dim;
        &self.values[start..start + self.dim]
    }
}

/// A supervised dataset: inputs (X) paired with targets (Y), row for row.
#[derive(Debug, Clone)]
pub struct Dataset {
    inputs: Inputs,
    targets: Vec<f64>,
    target_dim: usize,
}

impl Dataset {
    /// Build a dataset from flat `(len, input_dim)` / `(len, target_dim)`
    /// buffers.
    pub fn from_flat(
        inputs: Vec<f64>,
        targets: Vec<f64>,
        input_dim: usize,
        target_dim: usize,
    ) -> Result<Self> {
        let inputs = Inputs::from_flat(inputs, input_dim)?;
        if target_dim == 0 {
            return Err(Error::InvalidParameter("target dim must be > 0".to_owned()));
        }
        if targets.len() != inputs.len() * target_dim {
            return Err(Error::DimensionMismatch(format!(
                "target length {} does not match {} rows of width {target_dim}",
                targets.len(),
                inputs.len()
            )));
        }

        Ok(Self {
            inputs,
            targets,
            target_dim,
        })
    }

    /// Build a dataset from per-sample rows (copies into contiguous storage).
    pub fn from_rows(inputs: &[Vec<f64>], targets: &[Vec<f64>]) -> Result<Self> {
        if inputs.len() != targets.len() {
            return Err(Error::DimensionMismatch(format!(
                "input and target row counts differ: {} != {}",
                inputs.len(),
                targets.len()
            )));
        }

        let inputs = Inputs::from_rows(inputs)?;
        let target_dim = targets.first().map(|r| r.len()).unwrap_or(0);
        if target_dim == 0 {
            return Err(Error::InvalidParameter("target dim must be > 0".to_owned()));
        }

        let mut flat = Vec::with_capacity(targets.len() * target_dim);
        for (i, row) in targets.iter().enumerate() {
            if row.len() != target_dim {
                return Err(Error::DimensionMismatch(format!(
                    "target row {i} has length {}, expected {target_dim}",
                    row.len()
                )));
            }
            flat.extend_from_slice(row);
        }

        Ok(Self {
            inputs,
            targets: flat,
            target_dim,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    #[inline]
    pub fn input_dim(&self) -> usize {
        self.inputs.dim()
    }

    #[inline]
    pub fn target_dim(&self) -> usize {
        self.target_dim
    }

    /// The inputs (X) of this dataset.
    #[inline]
    pub fn inputs(&self) -> &Inputs {
        &self.inputs
    }

    /// The `idx`-th input row. Panics if `idx >= len`.
    #[inline]
    pub fn input(&self, idx: usize) -> &[f64] {
        self.inputs.row(idx)
    }

    /// The `idx`-th target row. Panics if `idx >= len`.
    #[inline]
    pub fn target(&self, idx: usize) -> &[f64] {
        let start = idx * self.target_dim;
        &self.targets[start..start + self.target_dim]
    }
}

/// Split a dataset into a training and a test part.
///
/// The cut is at `floor(len * train_fraction)`; rows keep their order and the
/// two parts are contiguous. Fails with [`Error::InvalidParameter`] if the
/// fraction is outside `[0, 1]`.
pub fn train_test_split(data: &Dataset, train_fraction: f64) -> Result<(Dataset, Dataset)> {
    if !(0.0..=1.0).contains(&train_fraction) {
        return Err(Error::InvalidParameter(format!(
            "train fraction must be within [0, 1], got {train_fraction}"
        )));
    }

    let split = (data.len() as f64 * train_fraction) as usize;
    let in_dim = data.input_dim();
    let out_dim = data.target_dim();

    let train = Dataset::from_flat(
        data.inputs.values[..split * in_dim].to_vec(),
        data.targets[..split * out_dim].to_vec(),
        in_dim,
        out_dim,
    )?;
    let test = Dataset::from_flat(
        data.inputs.values[split * in_dim..].to_vec(),
        data.targets[split * out_dim..].to_vec(),
        in_dim,
        out_dim,
    )?;
    Ok((train, test))
}

/// Rescales each feature column to `[0, 1]` using the min/max observed during
/// [`MinMaxScaler::fit`].
///
/// Fit on the training inputs, then transform both training and test inputs
/// with the recorded ranges.
#[derive(Debug, Clone, Default)]
pub struct MinMaxScaler {
    /// Per-column `(min, max)`; `None` until fitted.
    ranges: Option<Vec<(f64, f64)>>,
}

impl MinMaxScaler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the per-column minimum and maximum of `inputs`.
    pub fn fit(&mut self, inputs: &Inputs) -> Result<()> {
        if inputs.is_empty() {
            return Err(Error::InvalidParameter(
                "cannot fit a scaler on an empty input matrix".to_owned(),
            ));
        }

        let mut ranges = vec![(f64::INFINITY, f64::NEG_INFINITY); inputs.dim()];
        for idx in 0..inputs.len() {
            for (r, &v) in ranges.iter_mut().zip(inputs.row(idx)) {
                if v < r.0 {
                    r.0 = v;
                }
                if v > r.1 {
                    r.1 = v;
                }
            }
        }
        self.ranges = Some(ranges);
        Ok(())
    }

    /// Rescale every column of `inputs` into `[0, 1]`.
    ///
    /// Columns that were constant during `fit` map to 0. Fails with
    /// [`Error::InvalidParameter`] if the scaler has not been fitted and with
    /// [`Error::DimensionMismatch`] if the column count differs from the
    /// fitted one.
    pub fn transform(&self, inputs: &Inputs) -> Result<Inputs> {
        let ranges = self.ranges.as_ref().ok_or_else(|| {
            Error::InvalidParameter("scaler must be fitted before transform".to_owned())
        })?;
        if inputs.dim() != ranges.len() {
            return Err(Error::DimensionMismatch(format!(
                "input has {} features, scaler was fitted on {}",
                inputs.dim(),
                ranges.len()
            )));
        }

        let mut values = Vec::with_capacity(inputs.len() * inputs.dim());
        for idx in 0..inputs.len() {
            for (&(min, max), &v) in ranges.iter().zip(inputs.row(idx)) {
                let span = max - min;
                values.push(if span == 0.0 { 0.0 } else { (v - min) / span });
            }
        }
        Inputs::from_flat(values, inputs.dim())
    }

    /// Fit on `inputs` and transform them in one step.
    pub fn fit_transform(&mut self, inputs: &Inputs) -> Result<Inputs> {
        self.fit(inputs)?;
        self.transform(inputs)
    }
}
