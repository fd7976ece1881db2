use std::ops::Mul;

use num_traits::Zero;

use crate::math::tensor::{Tensor, TensorError};

/// Matrix multiplication dispatched on tensor rank.
///
/// Rank 2 multiplies `[m, k] x [k, n]` into `[m, n]`. Rank 3 treats the
/// leading axis as a batch and multiplies slice by slice.
pub trait MatrixProduct: Sized {
    fn matrix_product(&self, rhs: &Self) -> Result<Self, TensorError>;
}

impl<T> MatrixProduct for Tensor<T, 2>
where
    T: Clone + Zero + Mul<Output = T>,
{
    fn matrix_product(&self, rhs: &Self) -> Result<Self, TensorError> {
        let [m, k] = self.shape();
        let [k2, n] = rhs.shape();
        if k != k2 {
            return Err(TensorError::InnerDimension { left: k, right: k2 });
        }
        let mut result = Tensor::zeros([m, n]);
        for i in 0..m {
            for j in 0..n {
                let mut sum = T::zero();
                for p in 0..k {
                    sum = sum + self[[i, p]].clone() * rhs[[p, j]].clone();
                }
                result[[i, j]] = sum;
            }
        }
        Ok(result)
    }
}

impl<T> MatrixProduct for Tensor<T, 3>
where
    T: Clone + Zero + Mul<Output = T>,
{
    fn matrix_product(&self, rhs: &Self) -> Result<Self, TensorError> {
        let [b, m, k] = self.shape();
        let [b2, k2, n] = rhs.shape();
        if k != k2 {
            return Err(TensorError::InnerDimension { left: k, right: k2 });
        }
        if b != b2 {
            return Err(TensorError::BatchCount { left: b, right: b2 });
        }
        let mut result = Tensor::zeros([b, m, n]);
        for batch in 0..b {
            for i in 0..m {
                for j in 0..n {
                    let mut sum = T::zero();
                    for p in 0..k {
                        sum = sum + self[[batch, i, p]].clone() * rhs[[batch, p, j]].clone();
                    }
                    result[[batch, i, j]] = sum;
                }
            }
        }
        Ok(result)
    }
}

pub fn matrix_product<M>(a: &M, b: &M) -> Result<M, TensorError>
where
    M: MatrixProduct,
{
    a.matrix_product(b)
}

pub fn transpose_2d<T, const R: usize>(t: &Tensor<T, R>) -> Result<Tensor<T, R>, TensorError>
where
    T: Clone,
{
    t.transpose_2d()
}
