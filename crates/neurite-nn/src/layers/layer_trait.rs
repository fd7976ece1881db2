use crate::math::{Tensor, TensorError};
use crate::optimizers::Optimizer;

/// Contract for a network layer. The network drives each batch through
/// `forward` on every layer in order, then `backward` in reverse order,
/// then `update_params` on every layer; `backward` may rely on state
/// cached by the immediately preceding `forward` call.
pub trait Layer {
    /// Run the layer on a `[batch, features]` activation and return the
    /// next activation.
    fn forward(&mut self, input: &Tensor<f32, 2>) -> Result<Tensor<f32, 2>, TensorError>;

    /// Take the loss gradient with respect to this layer's output and
    /// return the gradient with respect to its input, accumulating any
    /// parameter gradients on the side.
    fn backward(&mut self, grad_output: &Tensor<f32, 2>) -> Result<Tensor<f32, 2>, TensorError>;

    /// Apply the gradients accumulated by `backward`. Stateless layers
    /// keep the default no-op.
    fn update_params(&mut self, _optimizer: &mut dyn Optimizer) {}

    /// Short layer name, reported in the training log.
    fn name(&self) -> &str;
}
