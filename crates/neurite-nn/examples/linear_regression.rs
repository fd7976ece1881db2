use neurite_nn::init;
use neurite_nn::layers::{Dense, ReLU};
use neurite_nn::losses::MSELoss;
use neurite_nn::math::Tensor;
use neurite_nn::network::NeuralNetwork;
use neurite_nn::optimizers::SGD;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

fn main() {
    env_logger::init();

    // 100 noisy samples of y = 2x + 3 over [-10, 10]
    let n = 100;
    let mut rng = StdRng::seed_from_u64(42);
    let noise = Normal::new(0.0f32, 1.0f32).expect("valid noise distribution");
    let mut xs = Vec::with_capacity(n);
    let mut ys = Vec::with_capacity(n);
    for _ in 0..n {
        let x: f32 = rng.gen_range(-10.0..10.0);
        xs.push(x);
        ys.push(2.0 * x + 3.0 + noise.sample(&mut rng));
    }
    let x = Tensor::from_shape_vec([n, 1], xs).expect("input tensor");
    let y = Tensor::from_shape_vec([n, 1], ys).expect("target tensor");

    let mut net = NeuralNetwork::new();
    net.add_layer(Dense::new(
        1,
        10,
        init::uniform(-0.1, 0.1, 123),
        init::zeros(),
    ));
    net.add_layer(ReLU::new());
    net.add_layer(Dense::new(
        10,
        1,
        init::uniform(-0.1, 0.1, 123),
        init::zeros(),
    ));

    let losses = net
        .train::<MSELoss, SGD>(&x, &y, 100, 10, 0.01)
        .expect("training failed");

    for (epoch, loss) in losses.iter().enumerate() {
        if (epoch + 1) % 10 == 0 {
            println!("Epoch {:>3}: loss = {:.6}", epoch + 1, loss);
        }
    }

    // Predictions on a few held-out points against the clean line
    let probes = vec![-8.0f32, -3.0, 0.0, 3.0, 8.0];
    let probe = Tensor::from_shape_vec([probes.len(), 1], probes.clone()).expect("probe tensor");
    let pred = net.predict(&probe).expect("prediction failed");
    for (i, xv) in probes.iter().enumerate() {
        println!(
            "x = {:>5.1}  predicted = {:>8.4}  true = {:>8.4}",
            xv,
            pred[[i, 0]],
            2.0 * xv + 3.0
        );
    }
}
