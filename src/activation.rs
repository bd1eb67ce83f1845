//! Activation functions.
//!
//! A layer computes a pre-activation vector `z = x W + b` and then squashes it:
//! `y = activation(z)`. Activations are applied element-wise, except `Softmax`,
//! which normalizes over the whole vector and is only valid at the output layer
//! of a multi-class network.
//!
//! Derivatives are evaluated at the *pre-activation* values `z`, which the
//! network caches during the forward pass. `Softmax` has no usable element-wise
//! derivative here: the only supported use pairs it with categorical
//! cross-entropy, where the output delta simplifies to `target - output` and
//! the derivative never has to be formed (see `Network::backward`). Calling
//! [`Activation::derivative`] on `Softmax` is therefore an error by contract.

use crate::{Error, Result};

/// Default negative-side slope for [`Activation::LeakyRelu`].
pub const LEAKY_RELU_SLOPE: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
/// Vector squashing function.
pub enum Activation {
    Linear,
    Sigmoid,
    Tanh,
    Relu,
    LeakyRelu { slope: f64 },
    Softmax,
}

impl Activation {
    /// Leaky ReLU with the conventional 0.01 slope.
    #[inline]
    pub fn leaky_relu() -> Self {
        Activation::LeakyRelu {
            slope: LEAKY_RELU_SLOPE,
        }
    }

    /// Validate activation parameters.
    pub fn validate(self) -> Result<()> {
        match self {
            Activation::LeakyRelu { slope } => {
                if !(slope.is_finite() && slope >= 0.0) {
                    return Err(Error::InvalidConfig(format!(
                        "leaky ReLU slope must be finite and >= 0, got {slope}"
                    )));
                }
            }
            Activation::Linear
            | Activation::Sigmoid
            | Activation::Tanh
            | Activation::Relu
            | Activation::Softmax => {}
        }

        Ok(())
    }

    /// Squash a pre-activation vector element-wise into `out`.
    ///
    /// Shape contract: `z.len() == out.len()`.
    pub fn squash(self, z: &[f64], out: &mut [f64]) {
        debug_assert_eq!(z.len(), out.len());

        if let Activation::Softmax = self {
            softmax(z, out);
            return;
        }

        for (o, &x) in out.iter_mut().zip(z) {
            *o = self.apply(x);
        }
    }

    /// Derivative with respect to the pre-activation input, element-wise
    /// into `out`.
    ///
    /// `Softmax` returns [`Error::UnsupportedOperation`]: it is only valid as
    /// the output activation of a multi-class network, where the paired
    /// cross-entropy folds the derivative into the output delta.
    ///
    /// Shape contract: `z.len() == out.len()`.
    pub fn derivative(self, z: &[f64], out: &mut [f64]) -> Result<()> {
        debug_assert_eq!(z.len(), out.len());

        if let Activation::Softmax = self {
            return Err(Error::UnsupportedOperation(
                "softmax has no explicit derivative; it is folded into the output delta \
                 when paired with categorical cross-entropy"
                    .to_owned(),
            ));
        }

        for (o, &x) in out.iter_mut().zip(z) {
            *o = self.apply_derivative(x);
        }
        Ok(())
    }

    #[inline]
    fn apply(self, x: f64) -> f64 {
        match self {
            Activation::Linear => x,
            Activation::Sigmoid => sigmoid(x),
            Activation::Tanh => x.tanh(),
            Activation::Relu => x.max(0.0),
            Activation::LeakyRelu { slope } => {
                if x > 0.0 {
                    x
                } else {
                    slope * x
                }
            }
            Activation::Softmax => unreachable!("softmax is squashed as a whole vector"),
        }
    }

    #[inline]
    fn apply_derivative(self, x: f64) -> f64 {
        match self {
            Activation::Linear => 1.0,
            Activation::Sigmoid => {
                let s = sigmoid(x);
                s * (1.0 - s)
            }
            Activation::Tanh => {
                let t = x.tanh();
                1.0 - t * t
            }
            Activation::Relu => {
                if x > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Activation::LeakyRelu { slope } => {
                if x > 0.0 {
                    1.0
                } else {
                    slope
                }
            }
            Activation::Softmax => unreachable!("softmax derivative is rejected in derivative()"),
        }
    }
}

#[inline]
fn sigmoid(x: f64) -> f64 {
    // Numerically stable sigmoid.
    if x >= 0.0 {
        let z = (-x).exp();
        1.0 / (1.0 + z)
    } else {
        let z = x.exp();
        z / (1.0 + z)
    }
}

/// Softmax over the whole vector, with the usual max subtraction so large
/// pre-activations cannot overflow `exp`.
fn softmax(z: &[f64], out: &mut [f64]) {
    debug_assert!(!z.is_empty(), "softmax requires at least one unit");

    let mut max_z = z[0];
    for &x in z.iter().skip(1) {
        if x > max_z {
            max_z = x;
        }
    }

    let mut sum = 0.0;
    for (o, &x) in out.iter_mut().zip(z) {
        let e = (x - max_z).exp();
        *o = e;
        sum += e;
    }

    let inv_sum = 1.0 / sum;
    for o in out.iter_mut() {
        *o *= inv_sum;
    }
}
