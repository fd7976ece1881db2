//! Fixed-rank strided tensor container and the matrix helpers built on it.
//!
//! `Tensor<T, R>` is a small row-major container with broadcasting
//! arithmetic, resize-style reshape, and 2D/3D matrix products.
pub mod ops;
pub mod tensor;

pub use ops::{matrix_product, transpose_2d, MatrixProduct};
pub use tensor::{Tensor, TensorError};
