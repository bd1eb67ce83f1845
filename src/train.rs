//! Training loop and inference entry points.
//!
//! These are the shape-checked, `Result`-returning APIs over the engine's
//! `forward`/`backward`/`update_weights` core. Training visits examples in
//! dataset order (no shuffling), accumulates gradients for `batch_size`
//! examples at a time, and flushes any remainder at the end of each epoch, so
//! `batch_size = 1` is stochastic gradient descent and `batch_size = len` is
//! full-batch gradient descent.

use crate::{Dataset, Error, Inputs, Network, Result};

/// Per-epoch training record returned by [`Network::fit`].
#[derive(Debug, Clone)]
pub struct FitReport {
    /// Average loss (`total loss / example count`) per epoch, in order.
    pub epoch_losses: Vec<f64>,
}

impl FitReport {
    /// Average loss of the last epoch, if any epoch ran.
    #[inline]
    pub fn final_loss(&self) -> Option<f64> {
        self.epoch_losses.last().copied()
    }
}

impl Network {
    /// Train on `train` for the configured number of epochs.
    ///
    /// Runs strictly `epochs` passes; there is no convergence-based early
    /// stop. The per-epoch average loss is logged and collected into the
    /// returned [`FitReport`].
    pub fn fit(&mut self, train: &Dataset) -> Result<FitReport> {
        if train.is_empty() {
            return Err(Error::InvalidParameter(
                "training dataset must not be empty".to_owned(),
            ));
        }
        self.check_input_dim(train.input_dim())?;
        if train.target_dim() != self.config().no {
            return Err(Error::DimensionMismatch(format!(
                "dataset target dim {} does not match network output units {}",
                train.target_dim(),
                self.config().no
            )));
        }

        let epochs = self.config().epochs;
        let batch_size = self.config().batch_size;
        let loss_fn = self.loss_function();
        let mut epoch_losses = Vec::with_capacity(epochs);

        for epoch in 1..=epochs {
            let mut total_loss = 0.0;
            let mut n_samples = 0;

            for idx in 0..train.len() {
                self.forward(train.input(idx))?;
                total_loss += loss_fn.calculate(self.output(), train.target(idx));
                self.backward(train.target(idx))?;

                n_samples += 1;
                if n_samples == batch_size {
                    self.update_weights(n_samples);
                    n_samples = 0;
                }
            }
            // The last batch of an epoch may be short when the dataset size
            // is not a multiple of the batch size.
            if n_samples != 0 {
                self.update_weights(n_samples);
            }

            let avg_loss = total_loss / train.len() as f64;
            log::info!("epoch {epoch}/{epochs}: loss = {avg_loss:.6}");
            epoch_losses.push(avg_loss);
        }

        Ok(FitReport { epoch_losses })
    }

    /// Run the forward pass over every row of `inputs`.
    ///
    /// Returns a flat row-major `(rows, no)` buffer of raw output
    /// activations. For a multi-class network each row is the softmax
    /// distribution; turning it into a class index (arg-max) is the caller's
    /// job. Rows are independent; no state carries over between them.
    pub fn predict(&mut self, inputs: &Inputs) -> Result<Vec<f64>> {
        self.check_input_dim(inputs.dim())?;

        let no = self.config().no;
        let mut preds = vec![0.0; inputs.len() * no];
        for idx in 0..inputs.len() {
            let out = self.forward(inputs.row(idx))?;
            preds[idx * no..(idx + 1) * no].copy_from_slice(out);
        }
        Ok(preds)
    }

    /// Like [`Network::predict`], but with every output thresholded at 0.5
    /// into `{0, 1}`.
    ///
    /// This is the explicit opt-in for binary/multi-label classification;
    /// `predict` never thresholds on its own.
    pub fn predict_binary(&mut self, inputs: &Inputs) -> Result<Vec<f64>> {
        let mut preds = self.predict(inputs)?;
        for p in preds.iter_mut() {
            *p = if *p >= 0.5 { 1.0 } else { 0.0 };
        }
        Ok(preds)
    }

    /// Average per-row loss of `predicted` against `targets` under the
    /// configured loss function.
    ///
    /// Both are flat row-major `(rows, no)` buffers. Fails with
    /// [`Error::DimensionMismatch`] if the row counts differ; no state is
    /// touched.
    pub fn loss(&self, predicted: &[f64], targets: &[f64]) -> Result<f64> {
        let no = self.config().no;
        if predicted.len() % no != 0 || targets.len() % no != 0 {
            return Err(Error::DimensionMismatch(format!(
                "prediction/target lengths {}/{} are not multiples of the output width {no}",
                predicted.len(),
                targets.len()
            )));
        }
        if predicted.len() != targets.len() {
            return Err(Error::DimensionMismatch(format!(
                "prediction has {} rows, targets have {}",
                predicted.len() / no,
                targets.len() / no
            )));
        }
        if predicted.is_empty() {
            return Err(Error::InvalidParameter(
                "cannot average the loss of zero rows".to_owned(),
            ));
        }

        let rows = predicted.len() / no;
        let loss_fn = self.loss_function();
        let mut total = 0.0;
        for idx in 0..rows {
            let start = idx * no;
            total += loss_fn.calculate(
                &predicted[start..start + no],
                &targets[start..start + no],
            );
        }
        Ok(total / rows as f64)
    }

    fn check_input_dim(&self, dim: usize) -> Result<()> {
        if dim != self.config().ni {
            return Err(Error::DimensionMismatch(format!(
                "input dim {dim} does not match network input units {}",
                self.config().ni
            )));
        }
        Ok(())
    }
}
