//! Weight initializer factories for [`crate::layers::Dense`].
//!
//! Each factory returns a closure that fills a tensor in place. The
//! uniform initializer seeds its own generator, so two layers built with
//! the same seed receive the same values.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::math::Tensor;

/// Fill with samples drawn uniformly from `[low, high)`.
pub fn uniform(low: f32, high: f32, seed: u64) -> impl Fn(&mut Tensor<f32, 2>) {
    move |t: &mut Tensor<f32, 2>| {
        let mut rng = StdRng::seed_from_u64(seed);
        for v in t.iter_mut() {
            *v = rng.gen_range(low..high);
        }
    }
}

/// Fill with zeros.
pub fn zeros() -> impl Fn(&mut Tensor<f32, 2>) {
    |t: &mut Tensor<f32, 2>| t.fill(0.0)
}

/// Fill with a constant.
pub fn constant(value: f32) -> impl Fn(&mut Tensor<f32, 2>) {
    move |t: &mut Tensor<f32, 2>| t.fill(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_is_deterministic_per_seed() {
        let mut a = Tensor::zeros([2, 3]);
        let mut b = Tensor::zeros([2, 3]);
        uniform(-0.1, 0.1, 123)(&mut a);
        uniform(-0.1, 0.1, 123)(&mut b);
        assert_eq!(a, b);

        let mut c = Tensor::zeros([2, 3]);
        uniform(-0.1, 0.1, 124)(&mut c);
        assert_ne!(a, c);
    }

    #[test]
    fn uniform_respects_bounds() {
        let mut t = Tensor::zeros([10, 10]);
        uniform(-0.5, 0.5, 7)(&mut t);
        assert!(t.iter().all(|v| (-0.5..0.5).contains(v)));
    }

    #[test]
    fn constant_fills_every_element() {
        let mut t = Tensor::zeros([3, 2]);
        constant(4.25)(&mut t);
        assert!(t.iter().all(|v| *v == 4.25));
    }
}
