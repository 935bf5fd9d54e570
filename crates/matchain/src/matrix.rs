//! Dense row-major matrix with shared copy-on-write storage.

use matchain_core::{Element, Error, MatrixView, MatrixViewMut, Result, Shape};
use matchain_kernels::try_filled;
use std::sync::Arc;

/// Dense row-major matrix.
///
/// Clones share storage; the first write through a shared handle copies it.
#[derive(Debug, Clone)]
pub struct Matrix<T> {
    shape: Shape,
    data: Arc<Vec<T>>,
}

impl<T: Element> Matrix<T> {
    /// `height x width` zeros, dynamically shaped.
    #[must_use]
    pub fn zeros(height: usize, width: usize) -> Self {
        Self {
            shape: Shape::dynamic(height, width),
            data: Arc::new(vec![T::zero(); height * width]),
        }
    }

    /// `height x width` zeros whose dimensions are pinned.
    #[must_use]
    pub fn fixed(height: usize, width: usize) -> Self {
        Self {
            shape: Shape::fixed(height, width),
            data: Arc::new(vec![T::zero(); height * width]),
        }
    }

    /// Like [`Matrix::zeros`] but reports allocation failure.
    pub fn try_zeros(height: usize, width: usize) -> Result<Self> {
        let len = height
            .checked_mul(width)
            .ok_or(Error::Allocation { elements: usize::MAX })?;
        Ok(Self {
            shape: Shape::dynamic(height, width),
            data: Arc::new(try_filled(len, T::zero())?),
        })
    }

    pub fn from_vec(height: usize, width: usize, data: Vec<T>) -> Result<Self> {
        Self::from_parts(Shape::dynamic(height, width), data)
    }

    /// Builds from row vectors; all rows must have the same length.
    pub fn from_rows<R: AsRef<[T]>>(rows: &[R]) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.as_ref().len());
        let mut data = Vec::with_capacity(height * width);
        for row in rows {
            let row = row.as_ref();
            if row.len() != width {
                return Err(Error::BufferLength {
                    len: row.len(),
                    height: 1,
                    width,
                });
            }
            data.extend_from_slice(row);
        }
        Self::from_vec(height, width, data)
    }

    /// Copies any view into fresh storage, keeping its shape tag.
    pub fn from_view<V: MatrixView<Elem = T> + ?Sized>(view: &V) -> Result<Self> {
        let shape = view.shape();
        let mut data = Vec::new();
        data.try_reserve_exact(shape.len())
            .map_err(|_| Error::Allocation {
                elements: shape.len(),
            })?;
        view.get_block_into(0, shape.height(), 0, shape.width(), &mut data);
        Self::from_parts(shape, data)
    }

    pub(crate) fn from_parts(shape: Shape, data: Vec<T>) -> Result<Self> {
        if data.len() != shape.len() {
            return Err(Error::BufferLength {
                len: data.len(),
                height: shape.height(),
                width: shape.width(),
            });
        }
        Ok(Self {
            shape,
            data: Arc::new(data),
        })
    }

    /// Swaps the shape tag; dimensions must already agree.
    pub(crate) fn retag(mut self, shape: Shape) -> Self {
        debug_assert_eq!(self.shape.dims(), shape.dims());
        self.shape = shape;
        self
    }

    /// Pins the dimensions to `height x width`.
    ///
    /// # Errors
    /// `Error::ShapeMismatch` if the matrix has other dimensions.
    pub fn into_sized(self, height: usize, width: usize) -> Result<Self> {
        if self.shape.dims() != (height, width) {
            return Err(Error::ShapeMismatch {
                expected: (height, width),
                actual: self.shape.dims(),
            });
        }
        Ok(Self {
            shape: Shape::fixed(height, width),
            data: self.data,
        })
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Mutable access to the elements, unsharing the storage first.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        Arc::make_mut(&mut self.data).as_mut_slice()
    }

    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<T>> {
        let width = self.shape.width();
        if width == 0 {
            return vec![Vec::new(); self.shape.height()];
        }
        self.data.chunks(width).map(<[T]>::to_vec).collect()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        Arc::try_unwrap(self.data).unwrap_or_else(|shared| (*shared).clone())
    }

    /// Whether both handles still point at the same storage.
    #[must_use]
    pub fn shares_storage(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    #[inline]
    fn offset(&self, i: usize, j: usize) -> usize {
        debug_assert!(
            i < self.shape.height() && j < self.shape.width(),
            "index ({i}, {j}) outside {:?}",
            self.shape.dims()
        );
        i * self.shape.width() + j
    }
}

impl<T: Element> MatrixView for Matrix<T> {
    type Elem = T;

    #[inline]
    fn shape(&self) -> Shape {
        self.shape
    }

    #[inline]
    fn get(&self, i: usize, j: usize) -> T {
        self.data[self.offset(i, j)]
    }

    fn get_block_into(&self, r0: usize, r1: usize, c0: usize, c1: usize, buf: &mut Vec<T>) {
        debug_assert!(r1 <= self.shape.height() && c1 <= self.shape.width());
        let width = self.shape.width();
        buf.clear();
        buf.reserve((r1 - r0) * (c1 - c0));
        for i in r0..r1 {
            buf.extend_from_slice(&self.data[i * width + c0..i * width + c1]);
        }
    }
}

impl<T: Element> MatrixViewMut for Matrix<T> {
    #[inline]
    fn set(&mut self, i: usize, j: usize, v: T) {
        let at = self.offset(i, j);
        Arc::make_mut(&mut self.data)[at] = v;
    }
}

/// Equal when the dimensions and elements match; the shape tag is ignored.
impl<T: Element> PartialEq for Matrix<T> {
    fn eq(&self, other: &Self) -> bool {
        self.shape.dims() == other.shape.dims() && self.data == other.data
    }
}
