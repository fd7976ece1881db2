use crate::layers::layer_trait::Layer;
use crate::math::{matrix_product, Tensor, TensorError};
use crate::optimizers::{Optimizer, ParamId};

/// Fully connected layer computing `x . W + b` with a `[in, out]` weight
/// matrix and a `[1, out]` bias row broadcast over the batch.
pub struct Dense {
    in_features: usize,
    out_features: usize,
    weights: Tensor<f32, 2>,
    bias: Tensor<f32, 2>,
    weight_id: ParamId,
    bias_id: ParamId,
    last_input: Tensor<f32, 2>,
    grad_weights: Tensor<f32, 2>,
    grad_bias: Tensor<f32, 2>,
}

impl Dense {
    /// Create a layer and run the injected initializers over the freshly
    /// zeroed weight and bias tensors.
    pub fn new<FW, FB>(
        in_features: usize,
        out_features: usize,
        init_weights: FW,
        init_bias: FB,
    ) -> Self
    where
        FW: FnOnce(&mut Tensor<f32, 2>),
        FB: FnOnce(&mut Tensor<f32, 2>),
    {
        let mut weights = Tensor::zeros([in_features, out_features]);
        let mut bias = Tensor::zeros([1, out_features]);
        init_weights(&mut weights);
        init_bias(&mut bias);
        log::trace!("dense layer created: {} -> {}", in_features, out_features);
        Dense {
            in_features,
            out_features,
            weights,
            bias,
            weight_id: ParamId::new(),
            bias_id: ParamId::new(),
            last_input: Tensor::zeros([0, in_features]),
            grad_weights: Tensor::zeros([in_features, out_features]),
            grad_bias: Tensor::zeros([1, out_features]),
        }
    }

    pub fn in_features(&self) -> usize {
        self.in_features
    }

    pub fn out_features(&self) -> usize {
        self.out_features
    }

    pub fn weights(&self) -> &Tensor<f32, 2> {
        &self.weights
    }

    pub fn bias(&self) -> &Tensor<f32, 2> {
        &self.bias
    }
}

impl Layer for Dense {
    fn forward(&mut self, input: &Tensor<f32, 2>) -> Result<Tensor<f32, 2>, TensorError> {
        self.last_input = input.clone();
        let z = matrix_product(input, &self.weights)?;
        // bias is [1, out]; broadcasting repeats it over every batch row
        z.broadcast_op(&self.bias, |a, b| a + b)
    }

    fn backward(&mut self, grad_output: &Tensor<f32, 2>) -> Result<Tensor<f32, 2>, TensorError> {
        let input_t = self.last_input.transpose_2d()?;
        self.grad_weights = matrix_product(&input_t, grad_output)?;

        let mut grad_bias = Tensor::zeros([1, self.out_features]);
        let [rows, cols] = grad_output.shape();
        for i in 0..rows {
            for j in 0..cols {
                grad_bias[[0, j]] += grad_output[[i, j]];
            }
        }
        self.grad_bias = grad_bias;

        let weights_t = self.weights.transpose_2d()?;
        matrix_product(grad_output, &weights_t)
    }

    fn update_params(&mut self, optimizer: &mut dyn Optimizer) {
        optimizer.update(self.weight_id, &mut self.weights, &self.grad_weights);
        optimizer.update(self.bias_id, &mut self.bias, &self.grad_bias);
    }

    fn name(&self) -> &str {
        "dense"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_applies_weights_and_bias() {
        let mut layer = Dense::new(
            2,
            2,
            |w: &mut Tensor<f32, 2>| {
                w.set_data(&[1.0, 2.0, 3.0, 4.0]).unwrap();
            },
            |b: &mut Tensor<f32, 2>| {
                b.set_data(&[10.0, 20.0]).unwrap();
            },
        );

        let x = Tensor::from_shape_vec([1, 2], vec![1.0, 1.0]).unwrap();
        let z = layer.forward(&x).unwrap();
        assert_eq!(z.as_slice(), &[14.0, 26.0]);
    }

    #[test]
    fn backward_produces_input_gradient_and_caches_param_gradients() {
        let mut layer = Dense::new(
            2,
            2,
            |w: &mut Tensor<f32, 2>| {
                w.set_data(&[1.0, 2.0, 3.0, 4.0]).unwrap();
            },
            |b: &mut Tensor<f32, 2>| {
                b.set_data(&[0.0, 0.0]).unwrap();
            },
        );

        let x = Tensor::from_shape_vec([1, 2], vec![1.0, 1.0]).unwrap();
        layer.forward(&x).unwrap();

        let grad_out = Tensor::from_shape_vec([1, 2], vec![1.0, 1.0]).unwrap();
        let grad_in = layer.backward(&grad_out).unwrap();

        // dX = dZ . W^T = [1*1 + 1*2, 1*3 + 1*4]
        assert_eq!(grad_in.as_slice(), &[3.0, 7.0]);
        assert_eq!(layer.grad_weights.as_slice(), &[1.0, 1.0, 1.0, 1.0]);
        assert_eq!(layer.grad_bias.as_slice(), &[1.0, 1.0]);
    }

    #[test]
    fn bias_column_sum_accumulates_over_batch_rows() {
        let mut layer = Dense::new(
            1,
            2,
            |w: &mut Tensor<f32, 2>| {
                w.set_data(&[1.0, 1.0]).unwrap();
            },
            |b: &mut Tensor<f32, 2>| b.fill(0.0),
        );

        let x = Tensor::from_shape_vec([3, 1], vec![1.0, 2.0, 3.0]).unwrap();
        layer.forward(&x).unwrap();

        let grad_out =
            Tensor::from_shape_vec([3, 2], vec![1.0, 10.0, 2.0, 20.0, 3.0, 30.0]).unwrap();
        layer.backward(&grad_out).unwrap();

        assert_eq!(layer.grad_bias.as_slice(), &[6.0, 60.0]);
    }
}
