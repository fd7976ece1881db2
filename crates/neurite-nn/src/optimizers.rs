//! Gradient-descent parameter update rules.
//!
//! Optimizers are driven by the layers: each trainable tensor is
//! registered under a [`ParamId`] and updated in place from its gradient.
//! Stateful rules key their buffers by that id, so one optimizer instance
//! can serve every parameter in a network regardless of shape.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::math::Tensor;

static PARAM_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Process-wide unique identity of a trainable tensor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ParamId(usize);

impl ParamId {
    pub fn new() -> Self {
        ParamId(PARAM_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ParamId {
    fn default() -> Self {
        Self::new()
    }
}

pub trait Optimizer {
    /// Apply one update step to `value` in place using `grad`.
    fn update(&mut self, param: ParamId, value: &mut Tensor<f32, 2>, grad: &Tensor<f32, 2>);

    /// Construct an instance with the given learning rate and default
    /// hyper-parameters for everything else.
    fn with_learning_rate(learning_rate: f32) -> Self
    where
        Self: Sized;
}

/// Plain stochastic gradient descent: `p -= lr * g`.
pub struct SGD {
    learning_rate: f32,
}

impl SGD {
    pub fn new(learning_rate: f32) -> Self {
        SGD { learning_rate }
    }
}

impl Default for SGD {
    fn default() -> Self {
        SGD::new(0.01)
    }
}

impl Optimizer for SGD {
    fn with_learning_rate(learning_rate: f32) -> Self {
        SGD::new(learning_rate)
    }

    fn update(&mut self, _param: ParamId, value: &mut Tensor<f32, 2>, grad: &Tensor<f32, 2>) {
        for (p, g) in value.iter_mut().zip(grad.iter()) {
            *p -= self.learning_rate * *g;
        }
    }
}

struct AdamState {
    m: Tensor<f32, 2>,
    v: Tensor<f32, 2>,
    step: usize,
}

/// Adam with first and second moment estimates kept per parameter.
///
/// Each parameter owns its moment tensors and step counter, created lazily
/// on first sight and shaped to that parameter.
pub struct Adam {
    learning_rate: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    state: HashMap<ParamId, AdamState>,
}

impl Adam {
    pub fn new(learning_rate: f32, beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Adam {
            learning_rate,
            beta1,
            beta2,
            epsilon,
            state: HashMap::new(),
        }
    }
}

impl Default for Adam {
    fn default() -> Self {
        Adam::new(0.001, 0.9, 0.999, 1e-8)
    }
}

impl Optimizer for Adam {
    fn with_learning_rate(learning_rate: f32) -> Self {
        Adam::new(learning_rate, 0.9, 0.999, 1e-8)
    }

    fn update(&mut self, param: ParamId, value: &mut Tensor<f32, 2>, grad: &Tensor<f32, 2>) {
        let entry = self.state.entry(param).or_insert_with(|| AdamState {
            m: Tensor::zeros(value.shape()),
            v: Tensor::zeros(value.shape()),
            step: 0,
        });
        entry.step += 1;

        for (m, g) in entry.m.iter_mut().zip(grad.iter()) {
            *m = self.beta1 * *m + (1.0 - self.beta1) * *g;
        }
        for (v, g) in entry.v.iter_mut().zip(grad.iter()) {
            *v = self.beta2 * *v + (1.0 - self.beta2) * *g * *g;
        }

        let bc1 = 1.0 - self.beta1.powi(entry.step as i32);
        let bc2 = 1.0 - self.beta2.powi(entry.step as i32);
        for ((p, m), v) in value
            .iter_mut()
            .zip(entry.m.iter())
            .zip(entry.v.iter())
        {
            let m_hat = *m / bc1;
            let v_hat = *v / bc2;
            *p -= self.learning_rate * m_hat / (v_hat.sqrt() + self.epsilon);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sgd_step_arithmetic() {
        let mut opt = SGD::with_learning_rate(0.5);
        let id = ParamId::new();
        let mut param = Tensor::from_shape_vec([1, 2], vec![1.0, -2.0]).unwrap();
        let grad = Tensor::from_shape_vec([1, 2], vec![2.0, 4.0]).unwrap();

        opt.update(id, &mut param, &grad);
        assert_eq!(param.as_slice(), &[0.0, -4.0]);
    }

    #[test]
    fn adam_first_step_magnitude_is_learning_rate() {
        // On the first step m_hat = g and v_hat = g^2, so the update is
        // lr * g / (|g| + eps), i.e. lr in magnitude for any nonzero g.
        let mut opt = Adam::with_learning_rate(0.1);
        let id = ParamId::new();
        let mut param = Tensor::from_shape_vec([1, 1], vec![5.0]).unwrap();
        let grad = Tensor::from_shape_vec([1, 1], vec![3.0]).unwrap();

        opt.update(id, &mut param, &grad);
        assert!((param[[0, 0]] - 4.9).abs() < 1e-4);
    }

    #[test]
    fn adam_keeps_independent_state_per_parameter() {
        let mut opt = Adam::with_learning_rate(0.1);
        let id_a = ParamId::new();
        let id_b = ParamId::new();

        let mut a = Tensor::from_shape_vec([2, 2], vec![1.0; 4]).unwrap();
        let mut b = Tensor::from_shape_vec([1, 3], vec![1.0; 3]).unwrap();
        let grad_a = Tensor::from_shape_vec([2, 2], vec![2.0; 4]).unwrap();
        let grad_b = Tensor::from_shape_vec([1, 3], vec![-2.0; 3]).unwrap();

        // Interleave updates of two differently shaped parameters.
        opt.update(id_a, &mut a, &grad_a);
        opt.update(id_b, &mut b, &grad_b);
        opt.update(id_a, &mut a, &grad_a);
        opt.update(id_b, &mut b, &grad_b);

        // With a per-parameter step counter each update has magnitude
        // close to lr; a shared counter would shrink the second one.
        for v in a.iter() {
            assert!((v - (1.0 - 0.2)).abs() < 1e-3);
        }
        for v in b.iter() {
            assert!((v - (1.0 + 0.2)).abs() < 1e-3);
        }
    }

    #[test]
    fn param_ids_are_unique() {
        let a = ParamId::new();
        let b = ParamId::new();
        assert_ne!(a, b);
    }
}
