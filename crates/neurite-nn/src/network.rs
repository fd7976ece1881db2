//! Feed-forward network orchestration.

use crate::layers::Layer;
use crate::losses::Loss;
use crate::math::{Tensor, TensorError};
use crate::optimizers::Optimizer;

/// An ordered stack of layers trained by plain backpropagation.
///
/// Layers are owned exclusively and their order is fixed by the sequence
/// of `add_layer` calls. Training runs forward over all layers, backward
/// in reverse, then a parameter update on every layer, batch by batch.
pub struct NeuralNetwork {
    layers: Vec<Box<dyn Layer>>,
}

impl NeuralNetwork {
    pub fn new() -> Self {
        NeuralNetwork { layers: Vec::new() }
    }

    pub fn add_layer<L: Layer + 'static>(&mut self, layer: L) {
        self.layers.push(Box::new(layer));
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// Run the input through every layer and return the final activation.
    pub fn predict(&mut self, input: &Tensor<f32, 2>) -> Result<Tensor<f32, 2>, TensorError> {
        let mut activation = input.clone();
        for layer in &mut self.layers {
            activation = layer.forward(&activation)?;
        }
        Ok(activation)
    }

    /// Train on `x`/`y` for `epochs` epochs and return the per-epoch mean
    /// loss.
    ///
    /// Rows are consumed in contiguous windows of `batch_size`; a batch
    /// size of 0 (or one at least as large as the sample count) trains on
    /// the full set at once. A fresh optimizer is constructed for every
    /// epoch, so stateful rules like Adam restart their moment estimates
    /// at epoch boundaries.
    pub fn train<L, O>(
        &mut self,
        x: &Tensor<f32, 2>,
        y: &Tensor<f32, 2>,
        epochs: usize,
        batch_size: usize,
        learning_rate: f32,
    ) -> Result<Vec<f32>, TensorError>
    where
        L: Loss,
        O: Optimizer,
    {
        assert_eq!(
            x.nrows(),
            y.nrows(),
            "training requires matching sample counts for inputs and targets"
        );

        let n_samples = x.nrows();
        if n_samples == 0 {
            return Ok(Vec::new());
        }
        let batch = if batch_size == 0 || batch_size > n_samples {
            n_samples
        } else {
            batch_size
        };

        log::info!(
            "training [{}] on {} samples for {} epochs (batch size {})",
            self.layers
                .iter()
                .map(|l| l.name())
                .collect::<Vec<_>>()
                .join(" -> "),
            n_samples,
            epochs,
            batch
        );

        let mut epoch_losses = Vec::with_capacity(epochs);
        for epoch in 0..epochs {
            let mut optimizer = O::with_learning_rate(learning_rate);
            let mut total_loss = 0.0f32;

            let mut start = 0;
            while start < n_samples {
                let end = (start + batch).min(n_samples);
                let x_batch = x.select_rows(start..end);
                let y_batch = y.select_rows(start..end);

                let mut activation = x_batch;
                for layer in &mut self.layers {
                    activation = layer.forward(&activation)?;
                }

                let loss_obj = L::new(activation, y_batch);
                total_loss += loss_obj.loss() * (end - start) as f32;

                let mut grad = loss_obj.loss_gradient();
                for layer in self.layers.iter_mut().rev() {
                    grad = layer.backward(&grad)?;
                }

                for layer in &mut self.layers {
                    layer.update_params(&mut optimizer);
                }

                log::trace!("epoch {} rows {}..{} done", epoch + 1, start, end);
                start = end;
            }

            let epoch_loss = total_loss / n_samples as f32;
            log::debug!("epoch {}: loss {}", epoch + 1, epoch_loss);
            epoch_losses.push(epoch_loss);
        }

        Ok(epoch_losses)
    }
}

impl Default for NeuralNetwork {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::Dense;
    use crate::losses::MSELoss;
    use crate::optimizers::SGD;

    #[test]
    fn predict_chains_layers_in_order() {
        let mut net = NeuralNetwork::new();
        net.add_layer(Dense::new(
            1,
            1,
            |w: &mut Tensor<f32, 2>| w.fill(2.0),
            |b: &mut Tensor<f32, 2>| b.fill(1.0),
        ));
        net.add_layer(Dense::new(
            1,
            1,
            |w: &mut Tensor<f32, 2>| w.fill(3.0),
            |b: &mut Tensor<f32, 2>| b.fill(0.0),
        ));

        let x = Tensor::from_shape_vec([1, 1], vec![4.0]).unwrap();
        let out = net.predict(&x).unwrap();
        // (4 * 2 + 1) * 3
        assert_eq!(out[[0, 0]], 27.0);
    }

    #[test]
    fn empty_input_trains_to_no_epochs() {
        let mut net = NeuralNetwork::new();
        net.add_layer(Dense::new(
            1,
            1,
            |w: &mut Tensor<f32, 2>| w.fill(0.0),
            |b: &mut Tensor<f32, 2>| b.fill(0.0),
        ));

        let x = Tensor::zeros([0, 1]);
        let y = Tensor::zeros([0, 1]);
        let losses = net.train::<MSELoss, SGD>(&x, &y, 5, 2, 0.1).unwrap();
        assert!(losses.is_empty());
    }

    #[test]
    fn single_layer_regression_converges() {
        // y = 3x is exactly representable, so full-batch gradient descent
        // with a stable step must reduce the loss every epoch.
        let mut net = NeuralNetwork::new();
        net.add_layer(Dense::new(
            1,
            1,
            |w: &mut Tensor<f32, 2>| w.fill(0.0),
            |b: &mut Tensor<f32, 2>| b.fill(0.0),
        ));

        let x = Tensor::from_shape_vec([4, 1], vec![-1.0, 0.0, 1.0, 2.0]).unwrap();
        let y = Tensor::from_shape_vec([4, 1], vec![-3.0, 0.0, 3.0, 6.0]).unwrap();

        let losses = net.train::<MSELoss, SGD>(&x, &y, 50, 0, 0.05).unwrap();
        assert_eq!(losses.len(), 50);
        assert!(losses[0] > losses[1]);
        assert!(losses[49] < losses[0] * 0.01);
    }
}
