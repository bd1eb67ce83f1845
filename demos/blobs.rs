use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use shallownet::{
    accuracy_score, one_hot_argmax, train_test_split, Activation, Dataset, MinMaxScaler,
    Network, NetworkConfig,
};

fn main() -> shallownet::Result<()> {
    env_logger::init();

    // Tiny synthetic 3-class dataset in 2D: one noisy blob per class.
    let mut rng = StdRng::seed_from_u64(0);
    let centers = [[-1.0, -1.0], [1.0, -1.0], [0.0, 1.0]];
    let n_per_class = 100;

    let mut xs = Vec::with_capacity(3 * n_per_class);
    let mut ys = Vec::with_capacity(3 * n_per_class);
    for (class, center) in centers.iter().enumerate() {
        for _ in 0..n_per_class {
            xs.push(vec![
                center[0] + rng.gen_range(-0.4..0.4),
                center[1] + rng.gen_range(-0.4..0.4),
            ]);
            let mut one_hot = vec![0.0; 3];
            one_hot[class] = 1.0;
            ys.push(one_hot);
        }
    }

    let data = Dataset::from_rows(&xs, &ys)?;
    let (train, test) = train_test_split(&data, 0.8)?;

    // Scale features to [0, 1] with ranges recorded on the training part only.
    let mut scaler = MinMaxScaler::new();
    let train_inputs = scaler.fit_transform(train.inputs())?;
    let test_inputs = scaler.transform(test.inputs())?;

    let flatten = |data: &Dataset, scaled: &shallownet::Inputs| {
        let inputs: Vec<f64> = (0..scaled.len())
            .flat_map(|i| scaled.row(i).to_vec())
            .collect();
        let targets: Vec<f64> = (0..data.len())
            .flat_map(|i| data.target(i).to_vec())
            .collect();
        (inputs, targets)
    };
    let (train_flat, train_targets) = flatten(&train, &train_inputs);
    let (_, test_targets) = flatten(&test, &test_inputs);
    let train_scaled = Dataset::from_flat(train_flat, train_targets.clone(), 2, 3)?;

    // Softmax output + categorical cross-entropy (multi-class).
    let mut net = Network::new(NetworkConfig {
        ni: 2,
        nh: 8,
        no: 3,
        learning_rate: 0.1,
        epochs: 300,
        batch_size: 16,
        hidden_activation: Activation::Relu,
        classification: true,
        multi_class: true,
        seed: 0,
        ..Default::default()
    })?;

    let report = net.fit(&train_scaled)?;
    println!("final_train_loss={:?}", report.final_loss());

    let train_preds = net.predict(&train_inputs)?;
    println!(
        "train_accuracy={}",
        accuracy_score(&one_hot_argmax(&train_preds, 3)?, &train_targets, 3)?
    );

    let test_preds = net.predict(&test_inputs)?;
    println!(
        "test_accuracy={}",
        accuracy_score(&one_hot_argmax(&test_preds, 3)?, &test_targets, 3)?
    );
    println!("test_loss={}", net.loss(&test_preds, &test_targets)?);

    Ok(())
}
