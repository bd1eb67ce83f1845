use shallownet::{accuracy_score, Activation, Dataset, Network, NetworkConfig};

fn main() -> shallownet::Result<()> {
    env_logger::init();

    // Classic XOR dataset.
    let xs = vec![
        vec![0.0, 0.0],
        vec![0.0, 1.0],
        vec![1.0, 0.0],
        vec![1.0, 1.0],
    ];
    let ys = vec![vec![0.0], vec![1.0], vec![1.0], vec![0.0]];
    let train = Dataset::from_rows(&xs, &ys)?;

    // 2 -> 4 -> 1 network: sigmoid hidden layer, sigmoid output for a
    // probability-like prediction.
    let mut net = Network::new(NetworkConfig {
        ni: 2,
        nh: 4,
        no: 1,
        learning_rate: 0.5,
        epochs: 5_000,
        batch_size: 1,
        hidden_activation: Activation::Sigmoid,
        classification: true,
        seed: 20,
        ..Default::default()
    })?;

    let report = net.fit(&train)?;
    println!("final_loss={:?}", report.final_loss());

    let raw = net.predict(train.inputs())?;
    let thresholded = net.predict_binary(train.inputs())?;
    for (i, x) in xs.iter().enumerate() {
        println!("x={x:?} raw={:.4} predicted={}", raw[i], thresholded[i]);
    }

    let targets: Vec<f64> = ys.iter().flatten().copied().collect();
    println!(
        "accuracy={}",
        accuracy_score(&thresholded, &targets, 1)?
    );

    Ok(())
}
