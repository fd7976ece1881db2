//! Loss functions over `[batch, outputs]` predictions.
//!
//! A loss captures the prediction and target pair at construction and
//! exposes the scalar loss and its gradient with respect to the
//! prediction. Both reduce by the total element count, so the gradient is
//! already averaged over the batch.

use crate::math::Tensor;

/// Clamp offset keeping `ln` away from zero in the cross-entropy terms.
const EPS: f32 = 1e-12;

pub trait Loss {
    /// Capture a prediction/target pair. Panics when the shapes differ.
    fn new(prediction: Tensor<f32, 2>, target: Tensor<f32, 2>) -> Self
    where
        Self: Sized;

    fn loss(&self) -> f32;

    /// Gradient of the loss with respect to the prediction, shaped like it.
    fn loss_gradient(&self) -> Tensor<f32, 2>;
}

/// Mean squared error.
pub struct MSELoss {
    prediction: Tensor<f32, 2>,
    target: Tensor<f32, 2>,
}

impl Loss for MSELoss {
    fn new(prediction: Tensor<f32, 2>, target: Tensor<f32, 2>) -> Self {
        assert_eq!(
            prediction.shape(),
            target.shape(),
            "loss requires prediction and target of equal shape"
        );
        MSELoss { prediction, target }
    }

    fn loss(&self) -> f32 {
        let n = self.prediction.len() as f32;
        let sum: f32 = self
            .prediction
            .iter()
            .zip(self.target.iter())
            .map(|(p, t)| {
                let diff = p - t;
                diff * diff
            })
            .sum();
        sum / n
    }

    fn loss_gradient(&self) -> Tensor<f32, 2> {
        let scale = 2.0 / self.prediction.len() as f32;
        let mut grad = self.prediction.clone();
        for (g, t) in grad.iter_mut().zip(self.target.iter()) {
            *g = (*g - *t) * scale;
        }
        grad
    }
}

/// Binary cross-entropy over probabilities in `[0, 1]`.
pub struct BCELoss {
    prediction: Tensor<f32, 2>,
    target: Tensor<f32, 2>,
}

impl Loss for BCELoss {
    fn new(prediction: Tensor<f32, 2>, target: Tensor<f32, 2>) -> Self {
        assert_eq!(
            prediction.shape(),
            target.shape(),
            "loss requires prediction and target of equal shape"
        );
        BCELoss { prediction, target }
    }

    fn loss(&self) -> f32 {
        let n = self.prediction.len() as f32;
        let sum: f32 = self
            .prediction
            .iter()
            .zip(self.target.iter())
            .map(|(p, y)| {
                let (p, y) = (*p, *y);
                -(y * (p + EPS).ln() + (1.0 - y) * (1.0 - p + EPS).ln())
            })
            .sum();
        sum / n
    }

    fn loss_gradient(&self) -> Tensor<f32, 2> {
        let inv_n = 1.0 / self.prediction.len() as f32;
        let mut grad = self.prediction.clone();
        for (g, y) in grad.iter_mut().zip(self.target.iter()) {
            let (p, y) = (*g, *y);
            *g = inv_n * (-(y / (p + EPS)) + (1.0 - y) / (1.0 - p + EPS));
        }
        grad
    }
}
