//! Shape tag: dimensions known when an operand was built versus dimensions
//! only known at run time. Both go through the same checks; the tag only
//! travels along so sized results and errors can report it.

use crate::error::{Error, OpKind, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Static { height: usize, width: usize },
    Dynamic { height: usize, width: usize },
}

impl Shape {
    #[inline]
    #[must_use]
    pub const fn new(height: usize, width: usize, fixed: bool) -> Self {
        if fixed {
            Self::Static { height, width }
        } else {
            Self::Dynamic { height, width }
        }
    }

    #[inline]
    #[must_use]
    pub const fn dynamic(height: usize, width: usize) -> Self {
        Self::Dynamic { height, width }
    }

    #[inline]
    #[must_use]
    pub const fn fixed(height: usize, width: usize) -> Self {
        Self::Static { height, width }
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        match *self {
            Self::Static { height, .. } | Self::Dynamic { height, .. } => height,
        }
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> usize {
        match *self {
            Self::Static { width, .. } | Self::Dynamic { width, .. } => width,
        }
    }

    #[inline]
    #[must_use]
    pub const fn dims(&self) -> (usize, usize) {
        (self.height(), self.width())
    }

    #[inline]
    #[must_use]
    pub const fn is_static(&self) -> bool {
        matches!(self, Self::Static { .. })
    }

    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.height() * self.width()
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Same dimensions with the rows and columns swapped; keeps the tag.
    #[inline]
    #[must_use]
    pub const fn transposed(&self) -> Self {
        Self::new(self.width(), self.height(), self.is_static())
    }

    /// Checks `self + rhs` and returns the shape of the sum. The sum is
    /// static as soon as one side pins the dimensions.
    pub fn check_sum(&self, rhs: &Self) -> Result<Self> {
        if self.dims() != rhs.dims() {
            return Err(Error::Dimension {
                op: OpKind::Add,
                left: self.dims(),
                right: rhs.dims(),
                fixed: self.is_static() && rhs.is_static(),
            });
        }
        Ok(Self::new(
            self.height(),
            self.width(),
            self.is_static() || rhs.is_static(),
        ))
    }

    /// Checks `self * rhs` and returns the shape of the product.
    pub fn check_product(&self, rhs: &Self) -> Result<Self> {
        if self.width() != rhs.height() {
            return Err(Error::Dimension {
                op: OpKind::Mul,
                left: self.dims(),
                right: rhs.dims(),
                fixed: self.is_static() && rhs.is_static(),
            });
        }
        Ok(Self::new(
            self.height(),
            rhs.width(),
            self.is_static() && rhs.is_static(),
        ))
    }
}
