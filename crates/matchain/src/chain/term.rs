use super::{ProductChain, SumChain};
use crate::config::Config;
use crate::matrix::Matrix;
use crate::views::{Diagonal, DiagonalMatrix, Transpose, Window};
use matchain_core::{MatrixView, Result, Scalar, Shape, SharedView};
use std::fmt;
use std::sync::Arc;

/// Anything that can stand on either side of `+` or `*`.
pub enum Term<T> {
    View(SharedView<T>),
    Sum(SumChain<T>),
    Product(ProductChain<T>),
}

impl<T: Scalar> Term<T> {
    /// Shape of the operand, or of the chain's eventual result.
    pub fn shape(&self) -> Shape {
        match self {
            Self::View(view) => view.shape(),
            Self::Sum(chain) => chain.shape(),
            Self::Product(chain) => chain.shape(),
        }
    }

    pub fn is_chain(&self) -> bool {
        !matches!(self, Self::View(_))
    }

    pub(crate) fn config(&self) -> Option<Config> {
        match self {
            Self::View(_) => None,
            Self::Sum(chain) => Some(chain.config()),
            Self::Product(chain) => Some(chain.config()),
        }
    }

    pub fn materialize(self) -> Result<Matrix<T>> {
        match self {
            Self::View(view) => Matrix::from_view(&*view),
            Self::Sum(chain) => chain.materialize(),
            Self::Product(chain) => chain.materialize(),
        }
    }

    /// Views pass through; chains are materialized.
    pub(crate) fn into_view(self) -> Result<SharedView<T>> {
        match self {
            Self::View(view) => Ok(view),
            chain => Ok(Arc::new(chain.materialize()?)),
        }
    }
}

impl<T: Scalar> fmt::Debug for Term<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::View(view) => f.debug_tuple("View").field(&view.shape()).finish(),
            Self::Sum(chain) => f.debug_tuple("Sum").field(chain).finish(),
            Self::Product(chain) => f.debug_tuple("Product").field(chain).finish(),
        }
    }
}

impl<T: Scalar> From<SharedView<T>> for Term<T> {
    fn from(view: SharedView<T>) -> Self {
        Self::View(view)
    }
}

impl<T: Scalar> From<Matrix<T>> for Term<T> {
    fn from(m: Matrix<T>) -> Self {
        Self::View(Arc::new(m))
    }
}

/// Shares the storage; a later write to the source matrix copies it first.
impl<T: Scalar> From<&Matrix<T>> for Term<T> {
    fn from(m: &Matrix<T>) -> Self {
        Self::View(Arc::new(m.clone()))
    }
}

impl<T: Scalar> From<SumChain<T>> for Term<T> {
    fn from(chain: SumChain<T>) -> Self {
        Self::Sum(chain)
    }
}

impl<T: Scalar> From<ProductChain<T>> for Term<T> {
    fn from(chain: ProductChain<T>) -> Self {
        Self::Product(chain)
    }
}

macro_rules! view_terms {
    ($($adapter:ident),* $(,)?) => {$(
        impl<T, V> From<$adapter<V>> for Term<T>
        where
            T: Scalar,
            V: MatrixView<Elem = T> + 'static,
        {
            fn from(view: $adapter<V>) -> Self {
                Self::View(Arc::new(view))
            }
        }
    )*};
}

view_terms!(Transpose, Window, Diagonal, DiagonalMatrix);

/// Fallible `+` and `*` on every operand kind.
pub trait Operand<T: Scalar>: Into<Term<T>> {
    /// # Errors
    /// `Error::Dimension` if the shapes differ.
    fn try_add(self, rhs: impl Into<Term<T>>) -> Result<SumChain<T>> {
        SumChain::new(self, rhs)
    }

    /// # Errors
    /// `Error::Dimension` if the inner dimensions differ.
    fn try_mul(self, rhs: impl Into<Term<T>>) -> Result<ProductChain<T>> {
        ProductChain::new(self, rhs)
    }
}

impl<T: Scalar, X: Into<Term<T>>> Operand<T> for X {}
