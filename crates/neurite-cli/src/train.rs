use std::time::Instant;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use neurite_nn::config::{LossKind, OptimizerKind};
use neurite_nn::init;
use neurite_nn::layers::{Dense, ReLU, Sigmoid};
use neurite_nn::losses::{BCELoss, MSELoss};
use neurite_nn::math::Tensor;
use neurite_nn::network::NeuralNetwork;
use neurite_nn::optimizers::{Adam, SGD};

use crate::config::TrainConfig;

/// What a finished demo run reports back to the caller.
#[derive(Debug, Clone)]
pub struct TrainSummary {
    pub epochs: usize,
    pub initial_loss: f32,
    pub final_loss: f32,
}

/// Noisy samples of `y = 2x + 3` with inputs drawn from `[-10, 10)`.
pub fn synth_regression(
    samples: usize,
    noise: f32,
    seed: u64,
) -> Result<(Tensor<f32, 2>, Tensor<f32, 2>)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let dist =
        Normal::new(0.0f32, noise).map_err(|e| anyhow::anyhow!("Invalid noise level: {}", e))?;

    let mut xs = Vec::with_capacity(samples);
    let mut ys = Vec::with_capacity(samples);
    for _ in 0..samples {
        let x: f32 = rng.gen_range(-10.0..10.0);
        xs.push(x);
        ys.push(2.0 * x + 3.0 + dist.sample(&mut rng));
    }

    Ok((
        Tensor::from_shape_vec([samples, 1], xs)?,
        Tensor::from_shape_vec([samples, 1], ys)?,
    ))
}

/// Two 1-D gaussian blobs around -2 and +2 with alternating 0/1 labels,
/// the smallest dataset a sigmoid head can separate.
pub fn synth_blobs(
    samples: usize,
    noise: f32,
    seed: u64,
) -> Result<(Tensor<f32, 2>, Tensor<f32, 2>)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let dist =
        Normal::new(0.0f32, noise).map_err(|e| anyhow::anyhow!("Invalid noise level: {}", e))?;

    let mut xs = Vec::with_capacity(samples);
    let mut ys = Vec::with_capacity(samples);
    for i in 0..samples {
        let center = if i % 2 == 0 { -2.0 } else { 2.0 };
        xs.push(center + dist.sample(&mut rng));
        ys.push((i % 2) as f32);
    }

    Ok((
        Tensor::from_shape_vec([samples, 1], xs)?,
        Tensor::from_shape_vec([samples, 1], ys)?,
    ))
}

/// Dense layers over the `1 -> hidden... -> 1` widths with ReLU between
/// them; classification runs get a sigmoid head so the output is a
/// probability.
fn build_network(hidden: &[usize], attach_sigmoid: bool) -> NeuralNetwork {
    let mut widths = Vec::with_capacity(hidden.len() + 2);
    widths.push(1);
    widths.extend_from_slice(hidden);
    widths.push(1);

    let mut net = NeuralNetwork::new();
    for (i, pair) in widths.windows(2).enumerate() {
        net.add_layer(Dense::new(
            pair[0],
            pair[1],
            init::uniform(-0.1, 0.1, 123),
            init::zeros(),
        ));
        if i + 2 < widths.len() {
            net.add_layer(ReLU::new());
        }
    }
    if attach_sigmoid {
        net.add_layer(Sigmoid::new());
    }
    net
}

pub fn run_train(config: &TrainConfig) -> Result<TrainSummary> {
    let (x, y) = match config.loss {
        LossKind::Mse => synth_regression(config.samples, config.noise, config.seed)?,
        LossKind::Bce => synth_blobs(config.samples, config.noise, config.seed)?,
    };
    log::info!(
        "Generated {} samples for the {} demo",
        config.samples,
        config.loss.as_str()
    );

    let mut net = build_network(&config.hidden, config.loss == LossKind::Bce);
    log::info!(
        "Built a {}-layer network ({} optimizer, learning rate {})",
        net.num_layers(),
        config.optimizer.as_str(),
        config.learning_rate
    );

    let start_time = Instant::now();
    let losses = match (config.loss, config.optimizer) {
        (LossKind::Mse, OptimizerKind::Sgd) => net.train::<MSELoss, SGD>(
            &x,
            &y,
            config.epochs,
            config.batch_size,
            config.learning_rate,
        ),
        (LossKind::Mse, OptimizerKind::Adam) => net.train::<MSELoss, Adam>(
            &x,
            &y,
            config.epochs,
            config.batch_size,
            config.learning_rate,
        ),
        (LossKind::Bce, OptimizerKind::Sgd) => net.train::<BCELoss, SGD>(
            &x,
            &y,
            config.epochs,
            config.batch_size,
            config.learning_rate,
        ),
        (LossKind::Bce, OptimizerKind::Adam) => net.train::<BCELoss, Adam>(
            &x,
            &y,
            config.epochs,
            config.batch_size,
            config.learning_rate,
        ),
    }
    .with_context(|| "an error occurred during the demo training loop")?;
    log::info!("Training completed in {:?}", start_time.elapsed());

    let stride = (losses.len() / 10).max(1);
    for (epoch, loss) in losses.iter().enumerate() {
        if (epoch + 1) % stride == 0 || epoch + 1 == losses.len() {
            println!("Epoch {:>4}: loss = {:.6}", epoch + 1, loss);
        }
    }

    match config.loss {
        LossKind::Mse => {
            let probes = vec![-8.0f32, -3.0, 0.0, 3.0, 8.0];
            let probe = Tensor::from_shape_vec([probes.len(), 1], probes.clone())?;
            let pred = net.predict(&probe)?;
            for (i, xv) in probes.iter().enumerate() {
                println!(
                    "x = {:>5.1}  predicted = {:>8.4}  true = {:>8.4}",
                    xv,
                    pred[[i, 0]],
                    2.0 * xv + 3.0
                );
            }
        }
        LossKind::Bce => {
            let probe = Tensor::from_shape_vec([2, 1], vec![-2.0f32, 2.0])?;
            let pred = net.predict(&probe)?;
            println!("p(class 1 | x = -2) = {:.4}", pred[[0, 0]]);
            println!("p(class 1 | x = +2) = {:.4}", pred[[1, 0]]);
        }
    }

    Ok(TrainSummary {
        epochs: losses.len(),
        initial_loss: losses.first().copied().unwrap_or(0.0),
        final_loss: losses.last().copied().unwrap_or(0.0),
    })
}
