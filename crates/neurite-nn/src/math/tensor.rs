use std::error::Error;
use std::fmt;
use std::ops::{Add, Div, Index, IndexMut, Mul, RangeBounds, Sub};
use std::slice::{Iter, IterMut};

use num_traits::{One, Zero};

/// A fixed-rank tensor backed by a flat row-major buffer.
///
/// The rank is part of the type, so mixing tensors of different rank is a
/// compile error. Strides are always derived from the shape and never stored
/// independently; `reshape` recomputes them and resizes the buffer in place.
#[derive(Clone, Debug, PartialEq)]
pub struct Tensor<T, const R: usize> {
    data: Vec<T>,
    shape: [usize; R],
    strides: [usize; R],
}

impl<T, const R: usize> Tensor<T, R> {
    pub fn from_shape_vec(shape: [usize; R], data: Vec<T>) -> Result<Self, TensorError> {
        let expected = Self::num_elems(&shape);
        if data.len() != expected {
            return Err(TensorError::DataSize {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            shape,
            strides: Self::make_strides(&shape),
        })
    }

    /// Zero-filled tensor whose dimensions arrive at runtime, e.g. from a
    /// flag or a config file. Errors when the number of dimensions does not
    /// match the rank `R`.
    pub fn from_shape_slice(dims: &[usize]) -> Result<Self, TensorError>
    where
        T: Clone + Zero,
    {
        if dims.len() != R {
            return Err(TensorError::DimensionMismatch {
                expected: R,
                got: dims.len(),
            });
        }
        let mut shape = [0usize; R];
        shape.copy_from_slice(dims);
        Ok(Self::zeros(shape))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn shape(&self) -> [usize; R] {
        self.shape
    }

    pub fn iter(&self) -> Iter<'_, T> {
        self.data.iter()
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        self.data.iter_mut()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.data.clone()
    }

    pub fn fill(&mut self, value: T)
    where
        T: Clone,
    {
        for v in self.data.iter_mut() {
            *v = value.clone();
        }
    }

    /// Overwrite the buffer with a flat list of values in row-major order.
    pub fn set_data(&mut self, values: &[T]) -> Result<(), TensorError>
    where
        T: Clone,
    {
        if values.len() != self.data.len() {
            return Err(TensorError::DataSize {
                expected: self.data.len(),
                got: values.len(),
            });
        }
        self.data.clone_from_slice(values);
        Ok(())
    }

    /// Change the shape, resizing the buffer to the new element count.
    ///
    /// This is a resize, not a reinterpretation: surviving elements keep
    /// their flat positions, growth zero-fills, shrinking truncates.
    pub fn reshape(&mut self, shape: [usize; R])
    where
        T: Clone + Zero,
    {
        self.shape = shape;
        self.strides = Self::make_strides(&shape);
        self.data.resize(Self::num_elems(&shape), T::zero());
    }

    pub fn mapv<U, F>(&self, mut f: F) -> Tensor<U, R>
    where
        F: FnMut(&T) -> U,
    {
        Tensor {
            data: self.data.iter().map(|v| f(v)).collect(),
            shape: self.shape,
            strides: self.strides,
        }
    }

    /// Combine two tensors element by element under the broadcasting rule:
    /// along every axis the sizes must be equal, or one of them must be 1
    /// and is then repeated to match the other.
    pub fn broadcast_op<F>(&self, other: &Self, mut op: F) -> Result<Self, TensorError>
    where
        T: Clone,
        F: FnMut(&T, &T) -> T,
    {
        let mut rshape = [0usize; R];
        for i in 0..R {
            let (s1, s2) = (self.shape[i], other.shape[i]);
            rshape[i] = if s1 == s2 {
                s1
            } else if s1 == 1 {
                s2
            } else if s2 == 1 {
                s1
            } else {
                return Err(TensorError::Broadcast {
                    left: self.shape.to_vec(),
                    right: other.shape.to_vec(),
                });
            };
        }

        let strides = Self::make_strides(&rshape);
        let total = Self::num_elems(&rshape);
        let mut data = Vec::with_capacity(total);
        for lin in 0..total {
            // Decompose the output index, then project it onto each operand,
            // pinning axes of size 1 to index 0.
            let mut rem = lin;
            let mut off1 = 0;
            let mut off2 = 0;
            for i in 0..R {
                let idx = rem / strides[i];
                rem %= strides[i];
                if self.shape[i] != 1 {
                    off1 += idx * self.strides[i];
                }
                if other.shape[i] != 1 {
                    off2 += idx * other.strides[i];
                }
            }
            data.push(op(&self.data[off1], &other.data[off2]));
        }

        Ok(Tensor {
            data,
            shape: rshape,
            strides,
        })
    }

    /// Copy into a new tensor with the last two axes swapped.
    pub fn transpose_2d(&self) -> Result<Self, TensorError>
    where
        T: Clone,
    {
        if R < 2 {
            return Err(TensorError::RankTooLow { rank: R });
        }
        let mut nshape = self.shape;
        nshape.swap(R - 2, R - 1);
        let strides = Self::make_strides(&nshape);
        // Every source cell maps to exactly one target cell, so starting
        // from a clone and overwriting each slot is sound.
        let mut data = self.data.clone();
        for lin in 0..self.data.len() {
            let mut rem = lin;
            let mut idx = [0usize; R];
            for i in 0..R {
                idx[i] = rem / self.strides[i];
                rem %= self.strides[i];
            }
            idx.swap(R - 2, R - 1);
            let mut off = 0;
            for i in 0..R {
                off += idx[i] * strides[i];
            }
            data[off] = self.data[lin].clone();
        }
        Ok(Tensor {
            data,
            shape: nshape,
            strides,
        })
    }

    #[inline]
    fn offset(&self, idx: [usize; R]) -> usize {
        let mut off = 0;
        for i in 0..R {
            off += idx[i] * self.strides[i];
        }
        off
    }

    fn num_elems(shape: &[usize; R]) -> usize {
        shape.iter().product()
    }

    fn make_strides(shape: &[usize; R]) -> [usize; R] {
        let mut strides = [0usize; R];
        let mut acc = 1;
        for i in (0..R).rev() {
            strides[i] = acc;
            acc *= shape[i];
        }
        strides
    }
}

impl<T, const R: usize> Tensor<T, R>
where
    T: Clone,
{
    pub fn from_elem(shape: [usize; R], value: T) -> Self {
        Self {
            data: vec![value; Self::num_elems(&shape)],
            shape,
            strides: Self::make_strides(&shape),
        }
    }
}

impl<T, const R: usize> Tensor<T, R>
where
    T: Clone + Zero,
{
    pub fn zeros(shape: [usize; R]) -> Self {
        Self::from_elem(shape, T::zero())
    }
}

impl<T, const R: usize> Tensor<T, R>
where
    T: Clone + One,
{
    pub fn ones(shape: [usize; R]) -> Self {
        Self::from_elem(shape, T::one())
    }
}

impl<T> Tensor<T, 2> {
    pub fn nrows(&self) -> usize {
        self.shape[0]
    }

    pub fn ncols(&self) -> usize {
        self.shape[1]
    }

    pub fn row_slice(&self, row: usize) -> &[T] {
        let start = row * self.strides[0];
        &self.data[start..start + self.shape[1]]
    }

    /// A contiguous window of rows as a new tensor.
    pub fn select_rows<B>(&self, range: B) -> Tensor<T, 2>
    where
        B: RangeBounds<usize>,
        T: Clone,
    {
        use std::ops::Bound;

        let start = match range.start_bound() {
            Bound::Unbounded => 0,
            Bound::Included(&s) => s,
            Bound::Excluded(&s) => s + 1,
        };

        let end = match range.end_bound() {
            Bound::Unbounded => self.nrows(),
            Bound::Included(&e) => e + 1,
            Bound::Excluded(&e) => e,
        };

        assert!(
            start <= end && end <= self.nrows(),
            "row slice out of bounds"
        );

        let cols = self.ncols();
        let mut data = Vec::with_capacity((end - start) * cols);
        for row in start..end {
            data.extend_from_slice(self.row_slice(row));
        }
        Tensor {
            data,
            shape: [end - start, cols],
            strides: Self::make_strides(&[end - start, cols]),
        }
    }
}

impl<T, const R: usize> Default for Tensor<T, R> {
    fn default() -> Self {
        let shape = [0usize; R];
        Tensor {
            data: Vec::new(),
            strides: Self::make_strides(&shape),
            shape,
        }
    }
}

/// Axis indices are not validated against the shape; an out-of-range axis
/// index addresses the wrong element or panics on the flat buffer bound.
impl<T, const R: usize> Index<[usize; R]> for Tensor<T, R> {
    type Output = T;

    fn index(&self, index: [usize; R]) -> &Self::Output {
        let offset = self.offset(index);
        &self.data[offset]
    }
}

impl<T, const R: usize> IndexMut<[usize; R]> for Tensor<T, R> {
    fn index_mut(&mut self, index: [usize; R]) -> &mut Self::Output {
        let offset = self.offset(index);
        &mut self.data[offset]
    }
}

impl<'a, T, const R: usize> IntoIterator for &'a Tensor<T, R> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, const R: usize> IntoIterator for &'a mut Tensor<T, R> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<'a, 'b, T, const R: usize> Add<&'b Tensor<T, R>> for &'a Tensor<T, R>
where
    T: Clone + Add<Output = T>,
{
    type Output = Tensor<T, R>;

    fn add(self, rhs: &'b Tensor<T, R>) -> Tensor<T, R> {
        self.broadcast_op(rhs, |a, b| a.clone() + b.clone())
            .unwrap_or_else(|e| panic!("{}", e))
    }
}

impl<'a, 'b, T, const R: usize> Sub<&'b Tensor<T, R>> for &'a Tensor<T, R>
where
    T: Clone + Sub<Output = T>,
{
    type Output = Tensor<T, R>;

    fn sub(self, rhs: &'b Tensor<T, R>) -> Tensor<T, R> {
        self.broadcast_op(rhs, |a, b| a.clone() - b.clone())
            .unwrap_or_else(|e| panic!("{}", e))
    }
}

impl<'a, 'b, T, const R: usize> Mul<&'b Tensor<T, R>> for &'a Tensor<T, R>
where
    T: Clone + Mul<Output = T>,
{
    type Output = Tensor<T, R>;

    fn mul(self, rhs: &'b Tensor<T, R>) -> Tensor<T, R> {
        self.broadcast_op(rhs, |a, b| a.clone() * b.clone())
            .unwrap_or_else(|e| panic!("{}", e))
    }
}

impl<'a, T, const R: usize> Add<T> for &'a Tensor<T, R>
where
    T: Clone + Add<Output = T>,
{
    type Output = Tensor<T, R>;

    fn add(self, rhs: T) -> Tensor<T, R> {
        self.mapv(|v| v.clone() + rhs.clone())
    }
}

impl<'a, T, const R: usize> Sub<T> for &'a Tensor<T, R>
where
    T: Clone + Sub<Output = T>,
{
    type Output = Tensor<T, R>;

    fn sub(self, rhs: T) -> Tensor<T, R> {
        self.mapv(|v| v.clone() - rhs.clone())
    }
}

impl<'a, T, const R: usize> Mul<T> for &'a Tensor<T, R>
where
    T: Clone + Mul<Output = T>,
{
    type Output = Tensor<T, R>;

    fn mul(self, rhs: T) -> Tensor<T, R> {
        self.mapv(|v| v.clone() * rhs.clone())
    }
}

impl<'a, T, const R: usize> Div<T> for &'a Tensor<T, R>
where
    T: Clone + Div<Output = T>,
{
    type Output = Tensor<T, R>;

    fn div(self, rhs: T) -> Tensor<T, R> {
        self.mapv(|v| v.clone() / rhs.clone())
    }
}

impl<T: fmt::Display, const R: usize> fmt::Display for Tensor<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if R == 0 {
            return match self.data.first() {
                Some(v) => write!(f, "{}", v),
                None => Ok(()),
            };
        }
        print_recursive(f, self, 0, 0)
    }
}

fn print_recursive<T: fmt::Display, const R: usize>(
    f: &mut fmt::Formatter<'_>,
    t: &Tensor<T, R>,
    dim: usize,
    offset: usize,
) -> fmt::Result {
    if dim + 1 < R {
        writeln!(f, "{{")?;
        for i in 0..t.shape[dim] {
            print_recursive(f, t, dim + 1, offset + i * t.strides[dim])?;
        }
        if dim > 0 {
            writeln!(f, "}}")
        } else {
            write!(f, "}}")
        }
    } else {
        for j in 0..t.shape[dim] {
            write!(f, "{}", t.data[offset + j * t.strides[dim]])?;
            if j + 1 < t.shape[dim] {
                write!(f, " ")?;
            }
        }
        writeln!(f)
    }
}

/// Shape and rank failures raised by tensor operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TensorError {
    /// A runtime dimension list had the wrong number of entries for the rank.
    DimensionMismatch { expected: usize, got: usize },
    /// A flat value buffer had the wrong length for the shape.
    DataSize { expected: usize, got: usize },
    /// Two shapes disagree on an axis and neither side is 1 there.
    Broadcast { left: Vec<usize>, right: Vec<usize> },
    /// The operation needs at least two axes.
    RankTooLow { rank: usize },
    /// Inner dimensions disagree in a matrix product.
    InnerDimension { left: usize, right: usize },
    /// Batch counts disagree in a batched matrix product.
    BatchCount { left: usize, right: usize },
}

impl fmt::Display for TensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TensorError::DimensionMismatch { expected, got } => write!(
                f,
                "number of dimensions do not match with {} (got {})",
                expected, got
            ),
            TensorError::DataSize { expected, got } => write!(
                f,
                "data size {} does not match tensor size {}",
                got, expected
            ),
            TensorError::Broadcast { left, right } => write!(
                f,
                "shapes {:?} and {:?} do not match and are not compatible for broadcasting",
                left, right
            ),
            TensorError::RankTooLow { rank } => write!(
                f,
                "cannot transpose rank-{} tensor: need at least 2 dimensions",
                rank
            ),
            TensorError::InnerDimension { left, right } => write!(
                f,
                "matrix dimensions are incompatible for multiplication ({} vs {})",
                left, right
            ),
            TensorError::BatchCount { left, right } => write!(
                f,
                "batch dimensions do not match for multiplication ({} vs {})",
                left, right
            ),
        }
    }
}

impl Error for TensorError {}
