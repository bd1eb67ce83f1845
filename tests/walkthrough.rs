//! Regression test against the classic two-input/two-hidden/two-output
//! backpropagation walk-through (sigmoid everywhere, squared error).
//!
//! The engine pairs a sigmoid output with binary cross-entropy, whose output
//! delta is `target - output`. The historical walk-through instead used
//! squared error at the sigmoid output, so its delta carries an extra
//! `o * (1 - o)` factor. The backward section below folds that factor into
//! the target (`t' = o + (t - o) * o * (1 - o)`) so that `t' - o` reproduces
//! the walk-through's gradients exactly, without reaching into the engine.

use shallownet::loss::squared_error;
use shallownet::{Activation, Network, NetworkConfig};

const INPUT: [f64; 2] = [0.05, 0.1];
const TARGET: [f64; 2] = [0.01, 0.99];

fn walkthrough_network() -> Network {
    let config = NetworkConfig {
        ni: 2,
        nh: 2,
        no: 2,
        learning_rate: 0.5,
        epochs: 1,
        batch_size: 1,
        hidden_activation: Activation::Sigmoid,
        classification: true,
        multi_class: false,
        biases: true,
        seed: 20,
    };
    Network::from_parts(
        config,
        vec![0.15, 0.25, 0.2, 0.3],
        vec![0.35, 0.35],
        vec![0.4, 0.5, 0.45, 0.55],
        vec![0.6, 0.6],
    )
    .unwrap()
}

fn assert_near(actual: &[f64], expected: &[f64], tol: f64) {
    assert_eq!(actual.len(), expected.len());
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            (a - e).abs() < tol,
            "index {i}: actual {a} expected {e} (tol {tol})"
        );
    }
}

/// Fold the sigmoid output derivative into the target so the engine's
/// `target - output` delta matches the walk-through's squared-error delta.
fn folded_target(output: &[f64]) -> Vec<f64> {
    output
        .iter()
        .zip(TARGET)
        .map(|(&o, t)| o + (t - o) * o * (1.0 - o))
        .collect()
}

#[test]
fn forward_matches_the_walkthrough_to_nine_decimals() {
    let mut net = walkthrough_network();
    let output = net.forward(&INPUT).unwrap().to_vec();

    assert_near(&output, &[0.75136507, 0.772928465], 1e-9);

    // The walk-through scores this state with squared error.
    let loss = squared_error(&output, &TARGET);
    assert!((loss - 0.298371109).abs() < 1e-9);
}

#[test]
fn hidden_activations_match_the_walkthrough() {
    let mut net = walkthrough_network();
    net.forward(&INPUT).unwrap();
    assert_near(net.hidden(), &[0.593269992, 0.596884378], 1e-9);
}

#[test]
fn backward_accumulates_the_walkthrough_gradients() {
    let mut net = walkthrough_network();
    let output = net.forward(&INPUT).unwrap().to_vec();
    net.backward(&folded_target(&output)).unwrap();

    // Row-major (nh, no) and (ni, nh); printed precisions from the original
    // walk-through (3 decimals for dw2, 6 for the rest).
    assert_near(net.dw2(), &[-0.082, 0.023, -0.083, 0.023], 5e-4);
    assert_near(
        net.dw1(),
        &[-0.000439, -0.000498, -0.000877, -0.000995],
        1e-6,
    );
    assert_near(net.db2(), &[-0.138499, 0.038099], 1e-6);
    assert_near(net.db1(), &[-0.008771, -0.009954], 1e-6);
}

#[test]
fn update_applies_the_walkthrough_weight_changes() {
    let mut net = walkthrough_network();
    let output = net.forward(&INPUT).unwrap().to_vec();
    net.backward(&folded_target(&output)).unwrap();
    net.update_weights(1);

    assert_near(net.w1(), &[0.14978, 0.249751, 0.199562, 0.299503], 1e-6);
    assert_near(net.w2(), &[0.359, 0.511, 0.409, 0.562], 1e-3);
    assert_near(net.b1(), &[0.345615, 0.345023], 1e-6);
    assert_near(net.b2(), &[0.530751, 0.61905], 1e-6);

    // The update consumed the accumulators.
    assert!(net.dw1().iter().all(|&d| d == 0.0));
    assert!(net.db2().iter().all(|&d| d == 0.0));
}
