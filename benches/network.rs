use criterion::{black_box, criterion_group, criterion_main, Criterion};

use shallownet::{Activation, Network, NetworkConfig};

fn bench_network() -> Network {
    Network::new(NetworkConfig {
        ni: 64,
        nh: 128,
        no: 10,
        learning_rate: 0.01,
        hidden_activation: Activation::Tanh,
        classification: true,
        multi_class: true,
        seed: 0,
        ..Default::default()
    })
    .unwrap()
}

fn forward_bench(c: &mut Criterion) {
    let mut net = bench_network();
    let input = vec![0.1; net.config().ni];

    c.bench_function("forward_64_128_10", |b| {
        b.iter(|| {
            let out = net.forward(black_box(&input)).unwrap();
            black_box(out);
        })
    });
}

fn forward_backward_bench(c: &mut Criterion) {
    let mut net = bench_network();
    let input = vec![0.1; net.config().ni];
    let mut target = vec![0.0; net.config().no];
    target[3] = 1.0;

    c.bench_function("forward_backward_64_128_10", |b| {
        b.iter(|| {
            net.forward(black_box(&input)).unwrap();
            net.backward(black_box(&target)).unwrap();
        })
    });
}

criterion_group!(benches, forward_bench, forward_backward_bench);
criterion_main!(benches);
