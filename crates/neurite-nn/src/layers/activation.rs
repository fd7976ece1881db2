use crate::layers::layer_trait::Layer;
use crate::math::{Tensor, TensorError};

/// Rectified linear unit. Caches the pre-activation input so the backward
/// pass can zero gradients wherever the input was not positive.
pub struct ReLU {
    last_input: Tensor<f32, 2>,
}

impl ReLU {
    pub fn new() -> Self {
        ReLU {
            last_input: Tensor::default(),
        }
    }
}

impl Default for ReLU {
    fn default() -> Self {
        Self::new()
    }
}

impl Layer for ReLU {
    fn forward(&mut self, input: &Tensor<f32, 2>) -> Result<Tensor<f32, 2>, TensorError> {
        self.last_input = input.clone();
        Ok(input.mapv(|v| if *v > 0.0 { *v } else { 0.0 }))
    }

    fn backward(&mut self, grad_output: &Tensor<f32, 2>) -> Result<Tensor<f32, 2>, TensorError> {
        let mut grad = grad_output.clone();
        for (g, z) in grad.iter_mut().zip(self.last_input.iter()) {
            if *z <= 0.0 {
                *g = 0.0;
            }
        }
        Ok(grad)
    }

    fn name(&self) -> &str {
        "relu"
    }
}

/// Logistic sigmoid. Caches the activation output, not the input: the
/// derivative `out * (1 - out)` only needs the output.
pub struct Sigmoid {
    last_output: Tensor<f32, 2>,
}

impl Sigmoid {
    pub fn new() -> Self {
        Sigmoid {
            last_output: Tensor::default(),
        }
    }
}

impl Default for Sigmoid {
    fn default() -> Self {
        Self::new()
    }
}

impl Layer for Sigmoid {
    fn forward(&mut self, input: &Tensor<f32, 2>) -> Result<Tensor<f32, 2>, TensorError> {
        let out = input.mapv(|v| 1.0 / (1.0 + (-*v).exp()));
        self.last_output = out.clone();
        Ok(out)
    }

    fn backward(&mut self, grad_output: &Tensor<f32, 2>) -> Result<Tensor<f32, 2>, TensorError> {
        let mut grad = grad_output.clone();
        for (g, o) in grad.iter_mut().zip(self.last_output.iter()) {
            *g *= *o * (1.0 - *o);
        }
        Ok(grad)
    }

    fn name(&self) -> &str {
        "sigmoid"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relu_zeroes_negatives_and_keeps_positives() {
        let mut relu = ReLU::new();
        let z = Tensor::from_shape_vec([1, 4], vec![-2.0, -0.5, 0.0, 3.0]).unwrap();
        let out = relu.forward(&z).unwrap();
        assert_eq!(out.as_slice(), &[0.0, 0.0, 0.0, 3.0]);
    }

    #[test]
    fn relu_backward_masks_on_cached_input() {
        let mut relu = ReLU::new();
        let z = Tensor::from_shape_vec([1, 4], vec![-1.0, 2.0, 0.0, 5.0]).unwrap();
        relu.forward(&z).unwrap();

        let grad_out = Tensor::from_shape_vec([1, 4], vec![10.0, 10.0, 10.0, 10.0]).unwrap();
        let grad_in = relu.backward(&grad_out).unwrap();
        assert_eq!(grad_in.as_slice(), &[0.0, 10.0, 0.0, 10.0]);
    }

    #[test]
    fn sigmoid_midpoint_and_derivative() {
        let mut sigmoid = Sigmoid::new();
        let z = Tensor::from_shape_vec([1, 1], vec![0.0]).unwrap();
        let out = sigmoid.forward(&z).unwrap();
        assert!((out[[0, 0]] - 0.5).abs() < 1e-6);

        let grad_out = Tensor::from_shape_vec([1, 1], vec![1.0]).unwrap();
        let grad_in = sigmoid.backward(&grad_out).unwrap();
        assert!((grad_in[[0, 0]] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn sigmoid_saturates_towards_zero_and_one() {
        let mut sigmoid = Sigmoid::new();
        let z = Tensor::from_shape_vec([1, 2], vec![-20.0, 20.0]).unwrap();
        let out = sigmoid.forward(&z).unwrap();
        assert!(out[[0, 0]] < 1e-6);
        assert!(out[[0, 1]] > 1.0 - 1e-6);
    }

    #[test]
    fn activations_report_their_names() {
        assert_eq!(ReLU::new().name(), "relu");
        assert_eq!(Sigmoid::new().name(), "sigmoid");
    }
}
