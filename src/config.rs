//! Network hyper-parameters.

use crate::{Activation, Error, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
/// Immutable configuration for a [`crate::Network`].
///
/// The output activation and loss are not set directly; they are derived from
/// `classification`/`multi_class` at construction:
///
/// - regression (`classification: false`): linear output + squared error
/// - multi-class (`classification: true, multi_class: true`): softmax output
///   + categorical cross-entropy
/// - binary/multi-label (`classification: true, multi_class: false`): sigmoid
///   output + binary cross-entropy
pub struct NetworkConfig {
    /// Input units.
    pub ni: usize,
    /// Hidden units.
    pub nh: usize,
    /// Output units.
    pub no: usize,
    /// Step size for the gradient descent update.
    pub learning_rate: f64,
    /// Number of full passes over the training data.
    pub epochs: usize,
    /// Examples per gradient accumulation window. `1` is stochastic gradient
    /// descent; the dataset length is full-batch gradient descent.
    pub batch_size: usize,
    /// Activation used by the hidden layer. `Softmax` is rejected here; it is
    /// only valid as the derived output activation of a multi-class network.
    pub hidden_activation: Activation,
    /// Classification problem (selects a cross-entropy pairing).
    pub classification: bool,
    /// Multi-class (one-hot target) classification; only read when
    /// `classification` is set.
    pub multi_class: bool,
    /// Whether the network carries bias vectors. An early revision of this
    /// engine had none, and some experiments still train without them; with
    /// `false` the biases stay zero, consume nothing from the seeded random
    /// stream, and are skipped by the update step.
    pub biases: bool,
    /// Seed for the weight-initialization stream. Identical config and seed
    /// reproduce bit-identical initial weights.
    pub seed: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            ni: 1,
            nh: 1,
            no: 1,
            learning_rate: 0.01,
            epochs: 100,
            batch_size: 1,
            hidden_activation: Activation::Sigmoid,
            classification: false,
            multi_class: false,
            biases: true,
            seed: 0,
        }
    }
}

impl NetworkConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.ni == 0 || self.nh == 0 || self.no == 0 {
            return Err(Error::InvalidConfig(format!(
                "all layer sizes must be > 0, got {} x {} x {}",
                self.ni, self.nh, self.no
            )));
        }
        if self.batch_size == 0 {
            return Err(Error::InvalidConfig("batch size must be > 0".to_owned()));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "learning rate must be finite and >= 0, got {}",
                self.learning_rate
            )));
        }
        if self.hidden_activation == Activation::Softmax {
            return Err(Error::InvalidConfig(
                "softmax cannot be applied as a hidden layer activation".to_owned(),
            ));
        }
        self.hidden_activation.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(NetworkConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_layer_sizes_are_rejected() {
        for cfg in [
            NetworkConfig {
                ni: 0,
                ..Default::default()
            },
            NetworkConfig {
                nh: 0,
                ..Default::default()
            },
            NetworkConfig {
                no: 0,
                ..Default::default()
            },
        ] {
            assert!(matches!(cfg.validate(), Err(Error::InvalidConfig(_))));
        }
    }

    #[test]
    fn bad_hyper_parameters_are_rejected() {
        let cfg = NetworkConfig {
            batch_size: 0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = NetworkConfig {
            learning_rate: -0.1,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = NetworkConfig {
            learning_rate: f64::NAN,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn softmax_hidden_activation_is_a_config_error() {
        let cfg = NetworkConfig {
            hidden_activation: Activation::Softmax,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(Error::InvalidConfig(_))));
    }
}
