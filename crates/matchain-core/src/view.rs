//! The view capability consumed by the kernels and the reducer.

use crate::element::Element;
use crate::shape::Shape;
use std::sync::Arc;

/// Read access to a rectangular grid of elements.
///
/// Implementations may alias storage with other views. Callers keep indices
/// in range; out-of-range access may panic.
pub trait MatrixView: Send + Sync {
    type Elem: Element;

    fn shape(&self) -> Shape;

    fn get(&self, i: usize, j: usize) -> Self::Elem;

    #[inline]
    fn height(&self) -> usize {
        self.shape().height()
    }

    #[inline]
    fn width(&self) -> usize {
        self.shape().width()
    }

    /// Copies rows `r0..r1`, columns `c0..c1` into `buf` (row-major),
    /// replacing its contents.
    fn get_block_into(&self, r0: usize, r1: usize, c0: usize, c1: usize, buf: &mut Vec<Self::Elem>) {
        debug_assert!(r0 <= r1 && c0 <= c1);
        buf.clear();
        buf.reserve((r1 - r0) * (c1 - c0));
        for i in r0..r1 {
            for j in c0..c1 {
                buf.push(self.get(i, j));
            }
        }
    }

    /// Rows `r0..r1`, columns `c0..c1` as a contiguous row-major buffer.
    fn get_block(&self, r0: usize, r1: usize, c0: usize, c1: usize) -> Vec<Self::Elem> {
        let mut buf = Vec::new();
        self.get_block_into(r0, r1, c0, c1, &mut buf);
        buf
    }
}

/// Write access on top of [`MatrixView`].
pub trait MatrixViewMut: MatrixView {
    fn set(&mut self, i: usize, j: usize, v: Self::Elem);
}

/// Type-erased view shared between chain slots and reduction tasks.
pub type SharedView<T> = Arc<dyn MatrixView<Elem = T>>;

impl<V: MatrixView + ?Sized> MatrixView for Arc<V> {
    type Elem = V::Elem;

    #[inline]
    fn shape(&self) -> Shape {
        (**self).shape()
    }

    #[inline]
    fn get(&self, i: usize, j: usize) -> Self::Elem {
        (**self).get(i, j)
    }

    #[inline]
    fn get_block_into(&self, r0: usize, r1: usize, c0: usize, c1: usize, buf: &mut Vec<Self::Elem>) {
        (**self).get_block_into(r0, r1, c0, c1, buf);
    }
}

impl<V: MatrixView + ?Sized> MatrixView for &V {
    type Elem = V::Elem;

    #[inline]
    fn shape(&self) -> Shape {
        (**self).shape()
    }

    #[inline]
    fn get(&self, i: usize, j: usize) -> Self::Elem {
        (**self).get(i, j)
    }

    #[inline]
    fn get_block_into(&self, r0: usize, r1: usize, c0: usize, c1: usize, buf: &mut Vec<Self::Elem>) {
        (**self).get_block_into(r0, r1, c0, c1, buf);
    }
}

impl<V: MatrixView + ?Sized> MatrixView for &mut V {
    type Elem = V::Elem;

    #[inline]
    fn shape(&self) -> Shape {
        (**self).shape()
    }

    #[inline]
    fn get(&self, i: usize, j: usize) -> Self::Elem {
        (**self).get(i, j)
    }

    #[inline]
    fn get_block_into(&self, r0: usize, r1: usize, c0: usize, c1: usize, buf: &mut Vec<Self::Elem>) {
        (**self).get_block_into(r0, r1, c0, c1, buf);
    }
}

impl<V: MatrixViewMut + ?Sized> MatrixViewMut for &mut V {
    #[inline]
    fn set(&mut self, i: usize, j: usize, v: Self::Elem) {
        (**self).set(i, j, v);
    }
}
