//! View adapters over any [`MatrixView`].
//!
//! Adapters own their base, so `&m`, `&mut m` (write-through) and shared
//! handles all work as bases.

use crate::matrix::Matrix;
use matchain_core::{Element, Error, MatrixView, MatrixViewMut, Result, Shape, SharedView};
use std::sync::Arc;

/// Rows and columns swapped.
#[derive(Debug, Clone)]
pub struct Transpose<V> {
    base: V,
}

impl<V> Transpose<V> {
    pub const fn new(base: V) -> Self {
        Self { base }
    }

    pub fn into_inner(self) -> V {
        self.base
    }
}

impl<V: MatrixView> MatrixView for Transpose<V> {
    type Elem = V::Elem;

    #[inline]
    fn shape(&self) -> Shape {
        self.base.shape().transposed()
    }

    #[inline]
    fn get(&self, i: usize, j: usize) -> V::Elem {
        self.base.get(j, i)
    }
}

impl<V: MatrixViewMut> MatrixViewMut for Transpose<V> {
    #[inline]
    fn set(&mut self, i: usize, j: usize, v: V::Elem) {
        self.base.set(j, i, v);
    }
}

/// Half-open row and column ranges selecting a sub-rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSpec {
    pub row_start: usize,
    pub row_end: usize,
    pub col_start: usize,
    pub col_end: usize,
}

impl WindowSpec {
    #[must_use]
    pub const fn new(row_start: usize, row_end: usize, col_start: usize, col_end: usize) -> Self {
        Self {
            row_start,
            row_end,
            col_start,
            col_end,
        }
    }

    fn check(&self, shape: &Shape) -> Result<()> {
        let rows_ok = self.row_start <= self.row_end && self.row_end <= shape.height();
        let cols_ok = self.col_start <= self.col_end && self.col_end <= shape.width();
        if rows_ok && cols_ok {
            Ok(())
        } else {
            Err(Error::OutOfBounds {
                rows: (self.row_start, self.row_end),
                cols: (self.col_start, self.col_end),
                height: shape.height(),
                width: shape.width(),
            })
        }
    }
}

/// A rectangular sub-region of a base view.
#[derive(Debug, Clone)]
pub struct Window<V> {
    base: V,
    spec: WindowSpec,
}

impl<V: MatrixView> Window<V> {
    /// # Errors
    /// `Error::OutOfBounds` if `spec` is inverted or leaves the base.
    pub fn new(base: V, spec: WindowSpec) -> Result<Self> {
        spec.check(&base.shape())?;
        Ok(Self { base, spec })
    }

    pub const fn spec(&self) -> WindowSpec {
        self.spec
    }
}

impl<V: MatrixView> MatrixView for Window<V> {
    type Elem = V::Elem;

    #[inline]
    fn shape(&self) -> Shape {
        Shape::dynamic(
            self.spec.row_end - self.spec.row_start,
            self.spec.col_end - self.spec.col_start,
        )
    }

    #[inline]
    fn get(&self, i: usize, j: usize) -> V::Elem {
        self.base.get(i + self.spec.row_start, j + self.spec.col_start)
    }

    fn get_block_into(&self, r0: usize, r1: usize, c0: usize, c1: usize, buf: &mut Vec<V::Elem>) {
        let (dr, dc) = (self.spec.row_start, self.spec.col_start);
        self.base.get_block_into(r0 + dr, r1 + dr, c0 + dc, c1 + dc, buf);
    }
}

impl<V: MatrixViewMut> MatrixViewMut for Window<V> {
    #[inline]
    fn set(&mut self, i: usize, j: usize, v: V::Elem) {
        self.base.set(i + self.spec.row_start, j + self.spec.col_start, v);
    }
}

/// The main diagonal of a base view as an `n x 1` column, `n = min(h, w)`.
#[derive(Debug, Clone)]
pub struct Diagonal<V> {
    base: V,
}

impl<V> Diagonal<V> {
    pub const fn new(base: V) -> Self {
        Self { base }
    }
}

impl<V: MatrixView> MatrixView for Diagonal<V> {
    type Elem = V::Elem;

    fn shape(&self) -> Shape {
        let base = self.base.shape();
        Shape::new(base.height().min(base.width()), 1, base.is_static())
    }

    #[inline]
    fn get(&self, i: usize, j: usize) -> V::Elem {
        debug_assert_eq!(j, 0);
        self.base.get(i, i)
    }
}

impl<V: MatrixViewMut> MatrixViewMut for Diagonal<V> {
    #[inline]
    fn set(&mut self, i: usize, j: usize, v: V::Elem) {
        debug_assert_eq!(j, 0);
        self.base.set(i, i, v);
    }
}

/// An `n x 1` or `1 x n` base spread on the diagonal of an `n x n` matrix.
/// Off-diagonal reads are zero; read only.
#[derive(Debug, Clone)]
pub struct DiagonalMatrix<V> {
    base: V,
    column: bool,
}

impl<V: MatrixView> DiagonalMatrix<V> {
    /// # Errors
    /// `Error::NotAVector` unless the base has a single row or column.
    pub fn new(base: V) -> Result<Self> {
        let (height, width) = base.shape().dims();
        if width == 1 {
            Ok(Self { base, column: true })
        } else if height == 1 {
            Ok(Self {
                base,
                column: false,
            })
        } else {
            Err(Error::NotAVector { height, width })
        }
    }

    #[inline]
    fn entry(&self, k: usize) -> V::Elem {
        if self.column {
            self.base.get(k, 0)
        } else {
            self.base.get(0, k)
        }
    }
}

impl<V: MatrixView> MatrixView for DiagonalMatrix<V> {
    type Elem = V::Elem;

    fn shape(&self) -> Shape {
        let base = self.base.shape();
        let n = if self.column {
            base.height()
        } else {
            base.width()
        };
        Shape::new(n, n, base.is_static())
    }

    #[inline]
    fn get(&self, i: usize, j: usize) -> V::Elem {
        if i == j {
            self.entry(i)
        } else {
            <V::Elem as Element>::zero()
        }
    }
}

/// Adapter constructors available on every view.
pub trait ViewExt: MatrixView + Sized {
    fn transpose(self) -> Transpose<Self> {
        Transpose::new(self)
    }

    fn window(self, spec: WindowSpec) -> Result<Window<Self>> {
        Window::new(self, spec)
    }

    fn diagonal(self) -> Diagonal<Self> {
        Diagonal::new(self)
    }

    fn diagonal_matrix(self) -> Result<DiagonalMatrix<Self>> {
        DiagonalMatrix::new(self)
    }

    /// Copies the view into a dense matrix.
    fn to_matrix(&self) -> Result<Matrix<Self::Elem>> {
        Matrix::from_view(self)
    }

    fn shared(self) -> SharedView<Self::Elem>
    where
        Self: 'static,
    {
        Arc::new(self)
    }
}

impl<V: MatrixView> ViewExt for V {}
