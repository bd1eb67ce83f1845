//! The network engine: weight state, forward propagation, backpropagation,
//! and the gradient-descent weight update.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{Activation, Error, Loss, NetworkConfig, Result};

/// A single-hidden-layer feed-forward network trained by backpropagation.
///
/// The network exclusively owns its weights, biases, gradient accumulators,
/// and a single-sample forward cache. `forward` and `backward` write into that
/// cache, so they take `&mut self` and are **not reentrant**: callers must
/// serialize all access to one instance. (A concurrent-safe variant would
/// return the cache from `forward` and pass it back into `backward` instead of
/// keeping it as owned state.)
///
/// Weights change in exactly one place, [`Network::update_weights`], which the
/// training loop calls once per full batch and once more for any remainder at
/// the end of an epoch.
#[derive(Debug, Clone)]
pub struct Network {
    config: NetworkConfig,
    output_activation: Activation,
    loss_fn: Loss,

    /// Row-major (ni, nh): `w1[j * nh + i]` connects input unit `j` to hidden
    /// unit `i`.
    w1: Vec<f64>,
    b1: Vec<f64>,
    /// Row-major (nh, no): `w2[i * no + k]` connects hidden unit `i` to output
    /// unit `k`.
    w2: Vec<f64>,
    b2: Vec<f64>,

    grads: Gradients,
    cache: ForwardCache,
}

/// Gradient accumulators, plus the backprop intermediates (`delta1`/`delta2`)
/// so the per-sample hot path stays allocation-free.
///
/// Weight and bias gradients all use the same accumulate-then-reset
/// semantics: `backward` adds into them, `update_weights` consumes and zeroes
/// them.
#[derive(Debug, Clone)]
struct Gradients {
    dw1: Vec<f64>,
    db1: Vec<f64>,
    dw2: Vec<f64>,
    db2: Vec<f64>,

    delta1: Vec<f64>,
    delta2: Vec<f64>,
}

/// Scratch state of the most recent forward pass, kept for `backward`.
///
/// Single-sample: every `forward` call overwrites it, so its lifetime is one
/// example's forward+backward pair.
#[derive(Debug, Clone)]
struct ForwardCache {
    input: Vec<f64>,
    z1: Vec<f64>,
    h: Vec<f64>,
    z2: Vec<f64>,
    o: Vec<f64>,
}

impl Gradients {
    fn new(ni: usize, nh: usize, no: usize) -> Self {
        Self {
            dw1: vec![0.0; ni * nh],
            db1: vec![0.0; nh],
            dw2: vec![0.0; nh * no],
            db2: vec![0.0; no],
            delta1: vec![0.0; nh],
            delta2: vec![0.0; no],
        }
    }

    fn reset(&mut self) {
        self.dw1.fill(0.0);
        self.db1.fill(0.0);
        self.dw2.fill(0.0);
        self.db2.fill(0.0);
    }
}

impl ForwardCache {
    fn new(ni: usize, nh: usize, no: usize) -> Self {
        Self {
            input: vec![0.0; ni],
            z1: vec![0.0; nh],
            h: vec![0.0; nh],
            z2: vec![0.0; no],
            o: vec![0.0; no],
        }
    }
}

impl Network {
    /// Build a network with freshly initialized weights.
    ///
    /// The output activation and loss are derived from the config: regression
    /// pairs a linear output with squared error, multi-class classification
    /// pairs softmax with categorical cross-entropy, and binary/multi-label
    /// classification pairs sigmoid with binary cross-entropy.
    ///
    /// Weights use a Glorot-style uniform initialization: each layer draws
    /// from `[-bound, bound)` with `bound = sqrt(factor / (fan_in + fan_out))`
    /// and `factor = 2` for a sigmoid hidden activation, `6` otherwise. All
    /// draws come from a single stream seeded with `config.seed`, consumed in
    /// a fixed order (`w1` row-major, `b1` if biases are enabled, `w2`
    /// row-major, `b2`), so identical configs reproduce bit-identical
    /// weights.
    pub fn new(config: NetworkConfig) -> Result<Self> {
        config.validate()?;

        let (output_activation, loss_fn) = derive_output_pairing(&config);
        let (ni, nh, no) = (config.ni, config.nh, config.no);

        let mut net = Self {
            config,
            output_activation,
            loss_fn,
            w1: vec![0.0; ni * nh],
            b1: vec![0.0; nh],
            w2: vec![0.0; nh * no],
            b2: vec![0.0; no],
            grads: Gradients::new(ni, nh, no),
            cache: ForwardCache::new(ni, nh, no),
        };
        net.randomise();
        Ok(net)
    }

    /// Build a network from pre-set weights and biases.
    ///
    /// This is the construction path for tests and for callers that manage
    /// initialization themselves; no random draws happen. Shape contract:
    /// `w1.len() == ni * nh` (row-major), `b1.len() == nh`,
    /// `w2.len() == nh * no` (row-major), `b2.len() == no`, all values
    /// finite.
    pub fn from_parts(
        config: NetworkConfig,
        w1: Vec<f64>,
        b1: Vec<f64>,
        w2: Vec<f64>,
        b2: Vec<f64>,
    ) -> Result<Self> {
        config.validate()?;

        let (ni, nh, no) = (config.ni, config.nh, config.no);
        if w1.len() != ni * nh {
            return Err(Error::DimensionMismatch(format!(
                "w1 length {} does not match ni * nh ({ni} * {nh})",
                w1.len()
            )));
        }
        if b1.len() != nh {
            return Err(Error::DimensionMismatch(format!(
                "b1 length {} does not match nh {nh}",
                b1.len()
            )));
        }
        if w2.len() != nh * no {
            return Err(Error::DimensionMismatch(format!(
                "w2 length {} does not match nh * no ({nh} * {no})",
                w2.len()
            )));
        }
        if b2.len() != no {
            return Err(Error::DimensionMismatch(format!(
                "b2 length {} does not match no {no}",
                b2.len()
            )));
        }
        for v in w1.iter().chain(&b1).chain(&w2).chain(&b2) {
            if !v.is_finite() {
                return Err(Error::InvalidParameter(
                    "weights and biases must be finite".to_owned(),
                ));
            }
        }

        let (output_activation, loss_fn) = derive_output_pairing(&config);
        Ok(Self {
            config,
            output_activation,
            loss_fn,
            w1,
            b1,
            w2,
            b2,
            grads: Gradients::new(ni, nh, no),
            cache: ForwardCache::new(ni, nh, no),
        })
    }

    /// Seeded Glorot initialization.
    ///
    /// REF: Glorot & Bengio, "Understanding the difficulty of training deep
    /// feedforward neural networks" (AISTATS 2010).
    fn randomise(&mut self) {
        let factor = if self.config.hidden_activation == Activation::Sigmoid {
            2.0
        } else {
            6.0
        };
        let mut rng = StdRng::seed_from_u64(self.config.seed);

        let bound = (factor / (self.config.ni + self.config.nh) as f64).sqrt();
        for w in self.w1.iter_mut() {
            *w = rng.gen_range(-bound..bound);
        }
        if self.config.biases {
            for b in self.b1.iter_mut() {
                *b = rng.gen_range(-bound..bound);
            }
        }

        let bound = (factor / (self.config.nh + self.config.no) as f64).sqrt();
        for w in self.w2.iter_mut() {
            *w = rng.gen_range(-bound..bound);
        }
        if self.config.biases {
            for b in self.b2.iter_mut() {
                *b = rng.gen_range(-bound..bound);
            }
        }
    }

    #[inline]
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    #[inline]
    pub fn output_activation(&self) -> Activation {
        self.output_activation
    }

    /// The loss paired with the output activation at construction.
    #[inline]
    pub fn loss_function(&self) -> Loss {
        self.loss_fn
    }

    /// Lower-layer weights, row-major (ni, nh).
    #[inline]
    pub fn w1(&self) -> &[f64] {
        &self.w1
    }

    /// Upper-layer weights, row-major (nh, no).
    #[inline]
    pub fn w2(&self) -> &[f64] {
        &self.w2
    }

    #[inline]
    pub fn b1(&self) -> &[f64] {
        &self.b1
    }

    #[inline]
    pub fn b2(&self) -> &[f64] {
        &self.b2
    }

    /// Hidden activations of the most recent forward pass.
    #[inline]
    pub fn hidden(&self) -> &[f64] {
        &self.cache.h
    }

    /// Output vector of the most recent forward pass.
    #[inline]
    pub fn output(&self) -> &[f64] {
        &self.cache.o
    }

    /// Accumulated lower-layer weight gradients, row-major (ni, nh).
    #[inline]
    pub fn dw1(&self) -> &[f64] {
        &self.grads.dw1
    }

    /// Accumulated upper-layer weight gradients, row-major (nh, no).
    #[inline]
    pub fn dw2(&self) -> &[f64] {
        &self.grads.dw2
    }

    #[inline]
    pub fn db1(&self) -> &[f64] {
        &self.grads.db1
    }

    #[inline]
    pub fn db2(&self) -> &[f64] {
        &self.grads.db2
    }

    /// Forward pass for a single example.
    ///
    /// Computes `z1 = input * w1 + b1`, squashes it with the hidden
    /// activation into `h`, then `z2 = h * w2 + b2` squashed with the output
    /// activation into the returned output vector. Overwrites the forward
    /// cache as a side effect.
    ///
    /// Fails with [`Error::DimensionMismatch`] if `input.len() != ni`.
    pub fn forward(&mut self, input: &[f64]) -> Result<&[f64]> {
        let (ni, nh, no) = (self.config.ni, self.config.nh, self.config.no);
        if input.len() != ni {
            return Err(Error::DimensionMismatch(format!(
                "expected {ni} input units, got {}",
                input.len()
            )));
        }

        // Keep the input around for the weight gradients in `backward`.
        self.cache.input.copy_from_slice(input);

        self.cache.z1.copy_from_slice(&self.b1);
        for (j, &x) in input.iter().enumerate() {
            let row = &self.w1[j * nh..(j + 1) * nh];
            for (z, &w) in self.cache.z1.iter_mut().zip(row) {
                *z = w.mul_add(x, *z);
            }
        }
        self.config
            .hidden_activation
            .squash(&self.cache.z1, &mut self.cache.h);

        self.cache.z2.copy_from_slice(&self.b2);
        for (i, &hi) in self.cache.h.iter().enumerate() {
            let row = &self.w2[i * no..(i + 1) * no];
            for (z, &w) in self.cache.z2.iter_mut().zip(row) {
                *z = w.mul_add(hi, *z);
            }
        }
        self.output_activation
            .squash(&self.cache.z2, &mut self.cache.o);

        Ok(&self.cache.o)
    }

    /// Backpropagate one example's error and accumulate its gradients.
    ///
    /// Requires a prior [`Network::forward`] call on the same example (uses
    /// the cached `input`, `z1`, `h`, and `o`). Gradients accumulate into the
    /// owned accumulators until [`Network::update_weights`] consumes them;
    /// bias gradients accumulate exactly like weight gradients.
    ///
    /// Fails with [`Error::DimensionMismatch`] if `target.len() != no`.
    pub fn backward(&mut self, target: &[f64]) -> Result<()> {
        let (ni, nh, no) = (self.config.ni, self.config.nh, self.config.no);
        if target.len() != no {
            return Err(Error::DimensionMismatch(format!(
                "expected {no} target units, got {}",
                target.len()
            )));
        }

        // Output-layer delta. For each pairing this engine constructs
        // (linear + squared error, sigmoid + binary cross-entropy,
        // softmax + categorical cross-entropy) the delta simplifies
        // analytically to `target - output`; this is also why softmax never
        // needs an explicit derivative. The conventional minus sign is folded
        // in here, so `update_weights` adds rather than subtracts.
        // Ref: https://www.ics.uci.edu/~pjsadows/notes.pdf
        for (d, (&t, &o)) in self
            .grads
            .delta2
            .iter_mut()
            .zip(target.iter().zip(&self.cache.o))
        {
            *d = t - o;
        }

        for (i, &hi) in self.cache.h.iter().enumerate() {
            let row = &mut self.grads.dw2[i * no..(i + 1) * no];
            for (dw, &d) in row.iter_mut().zip(&self.grads.delta2) {
                *dw = hi.mul_add(d, *dw);
            }
        }
        if self.config.biases {
            for (db, &d) in self.grads.db2.iter_mut().zip(&self.grads.delta2) {
                *db += d;
            }
        }

        // Hidden-layer delta: the derivative of the hidden activation at the
        // cached pre-activations, scaled by each hidden unit's share of the
        // output error. The derivative lands in `delta1` and is scaled in
        // place. The hidden activation is never softmax (rejected at
        // construction), so the derivative cannot fail here.
        self.config
            .hidden_activation
            .derivative(&self.cache.z1, &mut self.grads.delta1)?;
        for i in 0..nh {
            let row = &self.w2[i * no..(i + 1) * no];
            let mut sum = 0.0;
            for (&w, &d) in row.iter().zip(&self.grads.delta2) {
                sum = w.mul_add(d, sum);
            }
            self.grads.delta1[i] *= sum;
        }

        for j in 0..ni {
            let x = self.cache.input[j];
            let row = &mut self.grads.dw1[j * nh..(j + 1) * nh];
            for (dw, &d) in row.iter_mut().zip(&self.grads.delta1) {
                *dw = x.mul_add(d, *dw);
            }
        }
        if self.config.biases {
            for (db, &d) in self.grads.db1.iter_mut().zip(&self.grads.delta1) {
                *db += d;
            }
        }

        Ok(())
    }

    /// Apply the accumulated gradients, averaged over `n_samples`, then reset
    /// the accumulators.
    ///
    /// `n_samples` is the number of examples backpropagated since the last
    /// update (a full batch, or the remainder at the end of an epoch). The
    /// update is additive because the minus sign of gradient descent was
    /// folded into the deltas in [`Network::backward`].
    pub fn update_weights(&mut self, n_samples: usize) {
        assert!(n_samples > 0, "n_samples must be > 0");
        let scale = self.config.learning_rate / n_samples as f64;

        for (w, &d) in self.w1.iter_mut().zip(&self.grads.dw1) {
            *w = d.mul_add(scale, *w);
        }
        for (w, &d) in self.w2.iter_mut().zip(&self.grads.dw2) {
            *w = d.mul_add(scale, *w);
        }
        if self.config.biases {
            for (b, &d) in self.b1.iter_mut().zip(&self.grads.db1) {
                *b = d.mul_add(scale, *b);
            }
            for (b, &d) in self.b2.iter_mut().zip(&self.grads.db2) {
                *b = d.mul_add(scale, *b);
            }
        }

        self.grads.reset();
    }
}

#[inline]
fn derive_output_pairing(config: &NetworkConfig) -> (Activation, Loss) {
    if !config.classification {
        (Activation::Linear, Loss::SquaredError)
    } else if config.multi_class {
        (Activation::Softmax, Loss::CategoricalCrossEntropy)
    } else {
        (Activation::Sigmoid, Loss::BinaryCrossEntropy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_2_2_1() -> NetworkConfig {
        NetworkConfig {
            ni: 2,
            nh: 2,
            no: 1,
            learning_rate: 0.1,
            hidden_activation: Activation::Sigmoid,
            seed: 7,
            ..Default::default()
        }
    }

    fn assert_close(analytic: f64, numeric: f64, abs_tol: f64, rel_tol: f64) {
        let diff = (analytic - numeric).abs();
        let scale = analytic.abs().max(numeric.abs()).max(1.0);
        assert!(
            diff <= abs_tol || diff / scale <= rel_tol,
            "analytic={analytic} numeric={numeric} diff={diff}"
        );
    }

    #[test]
    fn seeded_init_is_deterministic() {
        let a = Network::new(config_2_2_1()).unwrap();
        let b = Network::new(config_2_2_1()).unwrap();
        assert_eq!(a.w1(), b.w1());
        assert_eq!(a.b1(), b.b1());
        assert_eq!(a.w2(), b.w2());
        assert_eq!(a.b2(), b.b2());

        let c = Network::new(NetworkConfig {
            seed: 8,
            ..config_2_2_1()
        })
        .unwrap();
        assert_ne!(a.w1(), c.w1());
    }

    #[test]
    fn init_respects_the_glorot_bounds() {
        let cfg = NetworkConfig {
            ni: 4,
            nh: 8,
            no: 3,
            hidden_activation: Activation::Tanh,
            seed: 3,
            ..Default::default()
        };
        let net = Network::new(cfg).unwrap();

        let bound1 = (6.0_f64 / (4 + 8) as f64).sqrt();
        for &w in net.w1().iter().chain(net.b1()) {
            assert!(w.abs() <= bound1, "w1/b1 entry {w} outside bound {bound1}");
        }

        let bound2 = (6.0_f64 / (8 + 3) as f64).sqrt();
        for &w in net.w2().iter().chain(net.b2()) {
            assert!(w.abs() <= bound2, "w2/b2 entry {w} outside bound {bound2}");
        }
    }

    #[test]
    fn disabling_biases_skips_their_random_draws() {
        let with = Network::new(config_2_2_1()).unwrap();
        let without = Network::new(NetworkConfig {
            biases: false,
            ..config_2_2_1()
        })
        .unwrap();

        // w1 is drawn first, so it is identical; b1/b2 stay zero and the
        // stream position for w2 shifts.
        assert_eq!(with.w1(), without.w1());
        assert!(without.b1().iter().all(|&b| b == 0.0));
        assert!(without.b2().iter().all(|&b| b == 0.0));
        assert_ne!(with.w2(), without.w2());
    }

    #[test]
    fn biases_stay_zero_through_training_when_disabled() {
        let mut net = Network::new(NetworkConfig {
            biases: false,
            ..config_2_2_1()
        })
        .unwrap();

        net.forward(&[0.2, 0.8]).unwrap();
        net.backward(&[0.5]).unwrap();
        net.update_weights(1);

        assert!(net.b1().iter().all(|&b| b == 0.0));
        assert!(net.b2().iter().all(|&b| b == 0.0));
    }

    #[test]
    fn forward_with_known_weights_matches_hand_computation() {
        let cfg = NetworkConfig {
            ni: 2,
            nh: 2,
            no: 1,
            hidden_activation: Activation::Linear,
            ..Default::default()
        };
        let mut net = Network::from_parts(
            cfg,
            vec![1.0, 0.0, 0.0, 1.0],
            vec![0.5, -0.5],
            vec![2.0, 3.0],
            vec![1.0],
        )
        .unwrap();

        let out = net.forward(&[0.1, 0.2]).unwrap();
        // z1 = [0.6, -0.3]; z2 = 0.6*2 + (-0.3)*3 + 1 = 1.3
        assert!((out[0] - 1.3).abs() < 1e-12);
    }

    #[test]
    fn forward_rejects_wrong_input_width() {
        let mut net = Network::new(config_2_2_1()).unwrap();
        let err = net.forward(&[0.0, 0.0, 0.0]);
        assert!(matches!(err, Err(Error::DimensionMismatch(_))));
    }

    #[test]
    fn backward_rejects_wrong_target_width() {
        let mut net = Network::new(config_2_2_1()).unwrap();
        net.forward(&[0.1, 0.9]).unwrap();
        let err = net.backward(&[0.0, 1.0]);
        assert!(matches!(err, Err(Error::DimensionMismatch(_))));
    }

    #[test]
    fn bias_gradients_accumulate_like_weight_gradients() {
        let mut net = Network::new(config_2_2_1()).unwrap();
        net.forward(&[0.3, 0.4]).unwrap();
        net.backward(&[1.0]).unwrap();
        let once = (net.db2()[0], net.dw2()[0]);

        net.backward(&[1.0]).unwrap();
        assert_close(net.db2()[0], 2.0 * once.0, 1e-12, 1e-12);
        assert_close(net.dw2()[0], 2.0 * once.1, 1e-12, 1e-12);
    }

    #[test]
    fn update_consumes_and_resets_the_accumulators() {
        let mut net = Network::new(config_2_2_1()).unwrap();
        net.forward(&[0.3, 0.4]).unwrap();
        net.backward(&[1.0]).unwrap();
        assert!(net.dw1().iter().any(|&d| d != 0.0));

        net.update_weights(1);
        assert!(net.dw1().iter().all(|&d| d == 0.0));
        assert!(net.dw2().iter().all(|&d| d == 0.0));
        assert!(net.db1().iter().all(|&d| d == 0.0));
        assert!(net.db2().iter().all(|&d| d == 0.0));
    }

    #[test]
    fn backward_matches_numeric_gradients() {
        // Regression config so the loss is plain squared error.
        let cfg = NetworkConfig {
            ni: 2,
            nh: 3,
            no: 2,
            hidden_activation: Activation::Tanh,
            seed: 11,
            ..Default::default()
        };
        let input = [0.3, -0.7];
        let target = [0.2, -0.1];

        let mut net = Network::new(cfg).unwrap();
        net.forward(&input).unwrap();
        net.backward(&target).unwrap();
        // The deltas carry the minus sign of gradient descent, so the
        // accumulated gradients are the negated loss gradients.
        let dw1: Vec<f64> = net.dw1().iter().map(|d| -d).collect();
        let dw2: Vec<f64> = net.dw2().iter().map(|d| -d).collect();
        let db1: Vec<f64> = net.db1().iter().map(|d| -d).collect();
        let db2: Vec<f64> = net.db2().iter().map(|d| -d).collect();

        let eps = 1e-6;
        let loss_at = |net: &mut Network| {
            net.forward(&input).unwrap();
            net.loss_function().calculate(net.output(), &target)
        };

        for p in 0..net.w1.len() {
            let orig = net.w1[p];
            net.w1[p] = orig + eps;
            let plus = loss_at(&mut net);
            net.w1[p] = orig - eps;
            let minus = loss_at(&mut net);
            net.w1[p] = orig;
            assert_close(dw1[p], (plus - minus) / (2.0 * eps), 1e-8, 1e-6);
        }
        for p in 0..net.w2.len() {
            let orig = net.w2[p];
            net.w2[p] = orig + eps;
            let plus = loss_at(&mut net);
            net.w2[p] = orig - eps;
            let minus = loss_at(&mut net);
            net.w2[p] = orig;
            assert_close(dw2[p], (plus - minus) / (2.0 * eps), 1e-8, 1e-6);
        }
        for p in 0..net.b1.len() {
            let orig = net.b1[p];
            net.b1[p] = orig + eps;
            let plus = loss_at(&mut net);
            net.b1[p] = orig - eps;
            let minus = loss_at(&mut net);
            net.b1[p] = orig;
            assert_close(db1[p], (plus - minus) / (2.0 * eps), 1e-8, 1e-6);
        }
        for p in 0..net.b2.len() {
            let orig = net.b2[p];
            net.b2[p] = orig + eps;
            let plus = loss_at(&mut net);
            net.b2[p] = orig - eps;
            let minus = loss_at(&mut net);
            net.b2[p] = orig;
            assert_close(db2[p], (plus - minus) / (2.0 * eps), 1e-8, 1e-6);
        }
    }

    #[test]
    fn from_parts_validates_shapes() {
        let cfg = config_2_2_1();
        let err = Network::from_parts(cfg, vec![0.0; 3], vec![0.0; 2], vec![0.0; 2], vec![0.0]);
        assert!(matches!(err, Err(Error::DimensionMismatch(_))));

        let err = Network::from_parts(
            cfg,
            vec![0.0; 4],
            vec![0.0; 2],
            vec![f64::INFINITY, 0.0],
            vec![0.0],
        );
        assert!(matches!(err, Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn output_pairing_follows_the_problem_kind() {
        let regression = Network::new(config_2_2_1()).unwrap();
        assert_eq!(regression.output_activation(), Activation::Linear);
        assert_eq!(regression.loss_function(), Loss::SquaredError);

        let binary = Network::new(NetworkConfig {
            classification: true,
            ..config_2_2_1()
        })
        .unwrap();
        assert_eq!(binary.output_activation(), Activation::Sigmoid);
        assert_eq!(binary.loss_function(), Loss::BinaryCrossEntropy);

        let multi = Network::new(NetworkConfig {
            classification: true,
            multi_class: true,
            no: 3,
            ..config_2_2_1()
        })
        .unwrap();
        assert_eq!(multi.output_activation(), Activation::Softmax);
        assert_eq!(multi.loss_function(), Loss::CategoricalCrossEntropy);
    }
}
