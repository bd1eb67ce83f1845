use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use shallownet::{train_test_split, Activation, Dataset, Network, NetworkConfig};

/// Regression target: the sine of an alternating sum of the input vector.
fn alternating_sin(row: &[f64]) -> f64 {
    let mut sum = row[0];
    let mut positive = false;
    for &x in &row[1..] {
        sum = if positive { sum + x } else { sum - x };
        positive = !positive;
    }
    sum.sin()
}

fn main() -> shallownet::Result<()> {
    env_logger::init();

    // Random input vectors in [-1, 1).
    let mut rng = StdRng::seed_from_u64(20);
    let count = 200;
    let dim = 4;
    let xs: Vec<Vec<f64>> = (0..count)
        .map(|_| (0..dim).map(|_| rng.gen_range(-1.0..1.0)).collect())
        .collect();
    let ys: Vec<Vec<f64>> = xs.iter().map(|row| vec![alternating_sin(row)]).collect();

    let data = Dataset::from_rows(&xs, &ys)?;
    let (train, test) = train_test_split(&data, 0.75)?;

    let mut net = Network::new(NetworkConfig {
        ni: dim,
        nh: 5,
        no: 1,
        learning_rate: 0.05,
        epochs: 500,
        batch_size: 10,
        hidden_activation: Activation::Tanh,
        seed: 20,
        ..Default::default()
    })?;

    let report = net.fit(&train)?;
    println!("final_train_loss={:?}", report.final_loss());

    let train_preds = net.predict(train.inputs())?;
    let train_targets: Vec<f64> = (0..train.len()).flat_map(|i| train.target(i).to_vec()).collect();
    println!("train_loss={}", net.loss(&train_preds, &train_targets)?);

    let test_preds = net.predict(test.inputs())?;
    let test_targets: Vec<f64> = (0..test.len()).flat_map(|i| test.target(i).to_vec()).collect();
    println!("test_loss={}", net.loss(&test_preds, &test_targets)?);

    Ok(())
}
