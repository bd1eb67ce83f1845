//! A small single-hidden-layer neural network crate.
//!
//! `shallownet` is a from-scratch implementation of a feed-forward network
//! with one hidden layer, trained by backpropagation with mini-batch gradient
//! descent. It is designed to be easy to read while keeping the per-sample
//! hot path allocation-free.
//!
//! # Design goals
//!
//! - Predictable performance: weights, gradients, and the forward cache are
//!   allocated once at construction and reused across steps.
//! - Clear contracts: shapes are explicit and validated at the API boundary.
//! - Hand-derived gradients: each output activation is paired with the loss
//!   whose delta simplifies to `target - output` (no autodiff).
//!
//! # Problem kinds
//!
//! The output activation and loss are derived from the configuration:
//!
//! - regression: linear output + squared error
//! - binary/multi-label classification: sigmoid output + binary cross-entropy
//! - multi-class classification: softmax output + categorical cross-entropy
//!
//! # Panics vs `Result`
//!
//! Public entry points (`Network::new`, `forward`, `backward`, `fit`,
//! `predict`, `loss`, the data helpers) validate shapes and return
//! [`Result`]. Per-row internals (`Loss::calculate`, `Activation::squash`)
//! treat shape mismatches as programmer error and assert.
//!
//! # Data layout and shapes
//!
//! - Scalars are `f64`.
//! - [`Dataset`] and [`Inputs`] store samples contiguously in row-major
//!   layout; predictions come back as flat row-major `(rows, no)` buffers.
//! - `w1` has shape `(ni, nh)` and `w2` has shape `(nh, no)`, row-major, so
//!   `w1[j][i]` is the weight from input unit `j` to hidden unit `i`.
//!
//! # Concurrency
//!
//! Strictly single-threaded. `forward`/`backward` share a single-sample cache
//! on the network, so a [`Network`] is not reentrant; wrap it in a mutex if it
//! must be shared across threads.
//!
//! # Quick start
//!
//! ```rust
//! use shallownet::{Activation, Dataset, Network, NetworkConfig};
//!
//! # fn main() -> shallownet::Result<()> {
//! let xs = vec![
//!     vec![0.0, 0.0],
//!     vec![0.0, 1.0],
//!     vec![1.0, 0.0],
//!     vec![1.0, 1.0],
//! ];
//! let ys = vec![vec![0.0], vec![1.0], vec![1.0], vec![0.0]];
//! let train = Dataset::from_rows(&xs, &ys)?;
//!
//! let mut net = Network::new(NetworkConfig {
//!     ni: 2,
//!     nh: 4,
//!     no: 1,
//!     learning_rate: 0.5,
//!     epochs: 200,
//!     batch_size: 1,
//!     hidden_activation: Activation::Tanh,
//!     classification: true,
//!     seed: 0,
//!     ..Default::default()
//! })?;
//!
//! let _report = net.fit(&train)?;
//! let _preds = net.predict_binary(train.inputs())?;
//! # Ok(())
//! # }
//! ```

pub mod activation;
pub mod config;
pub mod data;
pub mod error;
pub mod loss;
pub mod metrics;
pub mod network;
pub mod train;

pub use activation::Activation;
pub use config::NetworkConfig;
pub use data::{train_test_split, Dataset, Inputs, MinMaxScaler};
pub use error::{Error, Result};
pub use loss::Loss;
pub use metrics::{accuracy_score, argmax, one_hot_argmax};
pub use network::Network;
pub use train::FitReport;
