//! `+` and `*` for views and chains.
//!
//! The operator traits cannot return `Result`, so a shape mismatch panics
//! with the dimension error; use [`Operand::try_add`] /
//! [`Operand::try_mul`] to get it as a value.
//!
//! [`Operand::try_add`]: super::Operand::try_add
//! [`Operand::try_mul`]: super::Operand::try_mul

use super::{ProductChain, SumChain, Term};
use crate::matrix::Matrix;
use crate::views::{Diagonal, DiagonalMatrix, Transpose, Window};
use matchain_core::{MatrixView, Scalar};
use std::ops::{Add, Mul};

macro_rules! chain_operators {
    ($([$($gen:tt)*] $ty:ty => $elem:ty;)*) => {$(
        impl<$($gen)*, Rhs: Into<Term<$elem>>> Add<Rhs> for $ty {
            type Output = SumChain<$elem>;

            #[track_caller]
            fn add(self, rhs: Rhs) -> SumChain<$elem> {
                SumChain::new(self, rhs).unwrap_or_else(|err| panic!("{err}"))
            }
        }

        impl<$($gen)*, Rhs: Into<Term<$elem>>> Mul<Rhs> for $ty {
            type Output = ProductChain<$elem>;

            #[track_caller]
            fn mul(self, rhs: Rhs) -> ProductChain<$elem> {
                ProductChain::new(self, rhs).unwrap_or_else(|err| panic!("{err}"))
            }
        }
    )*};
}

chain_operators! {
    [T: Scalar] Matrix<T> => T;
    ['a, T: Scalar] &'a Matrix<T> => T;
    [T: Scalar] SumChain<T> => T;
    [T: Scalar] ProductChain<T> => T;
    [T: Scalar, V: MatrixView<Elem = T> + 'static] Transpose<V> => T;
    [T: Scalar, V: MatrixView<Elem = T> + 'static] Window<V> => T;
    [T: Scalar, V: MatrixView<Elem = T> + 'static] Diagonal<V> => T;
    [T: Scalar, V: MatrixView<Elem = T> + 'static] DiagonalMatrix<V> => T;
}
