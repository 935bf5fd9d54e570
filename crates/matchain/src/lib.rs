//! Deferred matrix sum and product chains.
//!
//! `a + b + c` and `a * b * c * d` over [`Matrix`] and view adapters build
//! a [`SumChain`] / [`ProductChain`]; nothing is computed until
//! [`Chain::materialize`]. Materializing collapses the operand list pair by
//! pair on the rayon pool, using the blocked multiply and parallel add
//! kernels from `matchain-kernels`.
//!
//! ```no_run
//! use matchain::prelude::*;
//!
//! let a = Matrix::from_rows(&[[1, 2], [3, 4]])?;
//! let b = Matrix::from_rows(&[[0, 1], [1, 0]])?;
//! let product = (&a * &b * &a).materialize()?;
//! assert_eq!(product.to_rows(), vec![vec![5, 8], vec![13, 20]]);
//! # Ok::<(), matchain::Error>(())
//! ```

pub mod chain;
pub mod config;
pub mod handoff;
pub mod matrix;
pub mod reduce;
pub mod views;

pub use chain::{
    add_promoted, mul_promoted, Chain, ChainKind, Operand, Product, ProductChain, Sum, SumChain,
    Term,
};
pub use config::Config;
pub use handoff::Handoff;
pub use matchain_core::{
    Element, Error, FailureKind, MatrixView, MatrixViewMut, OpKind, Promote, Promoted, Result,
    Scalar, Shape, SharedView, TaskFailure,
};
pub use matrix::Matrix;
pub use reduce::pairing::{LargestContraction, PairingStrategy, SlotInfo, Strided};
pub use views::{Diagonal, DiagonalMatrix, Transpose, ViewExt, Window, WindowSpec};

pub mod prelude {
    pub use crate::chain::{add_promoted, mul_promoted, Operand, ProductChain, SumChain};
    pub use crate::config::Config;
    pub use crate::matrix::Matrix;
    pub use crate::views::{ViewExt, WindowSpec};
    pub use matchain_core::{MatrixView, MatrixViewMut};
}
