//! Deferred sum and product chains.
//!
//! `a + b + c` and `a * b * c` build a [`Chain`] instead of computing
//! anything; only the shapes are checked as operands join. The chain is
//! collapsed by the pairwise reducer when it is materialized.

mod ops;
mod promote;
mod term;

pub use promote::{add_promoted, mul_promoted};
pub use term::{Operand, Term};

use crate::config::Config;
use crate::matrix::Matrix;
use crate::reduce::pairing::{LargestContraction, PairingStrategy, Strided};
use crate::reduce::PairReducer;
use matchain_core::{Error, MatrixView, OpKind, Result, Scalar, Shape, SharedView};
use matchain_kernels::{add, matmul};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

mod sealed {
    pub trait Sealed {}
}

/// The operator a chain defers.
pub trait ChainKind: sealed::Sealed + Send + Sync + 'static {
    const OP: OpKind;

    fn default_strategy() -> Arc<dyn PairingStrategy>;
}

/// Marker for `+` chains.
#[derive(Debug)]
pub enum Sum {}

/// Marker for `*` chains.
#[derive(Debug)]
pub enum Product {}

impl sealed::Sealed for Sum {}
impl sealed::Sealed for Product {}

impl ChainKind for Sum {
    const OP: OpKind = OpKind::Add;

    fn default_strategy() -> Arc<dyn PairingStrategy> {
        Arc::new(Strided)
    }
}

impl ChainKind for Product {
    const OP: OpKind = OpKind::Mul;

    fn default_strategy() -> Arc<dyn PairingStrategy> {
        Arc::new(LargestContraction)
    }
}

/// An ordered, never-empty list of operands joined by one operator.
pub struct Chain<T, K> {
    reducer: PairReducer<T>,
    shape: Shape,
    config: Config,
    kind: PhantomData<K>,
}

pub type SumChain<T> = Chain<T, Sum>;
pub type ProductChain<T> = Chain<T, Product>;

impl<T: Scalar, K: ChainKind> Chain<T, K> {
    /// Joins two operands.
    ///
    /// A chain of the same kind on the left is extended in place. A chain of
    /// the other kind is materialized first; if both sides are such chains
    /// they are materialized concurrently.
    ///
    /// # Errors
    /// `Error::Dimension` if the shapes do not fit the operator; nothing is
    /// computed in that case.
    pub fn new(lhs: impl Into<Term<T>>, rhs: impl Into<Term<T>>) -> Result<Self> {
        let (lhs, rhs) = (lhs.into(), rhs.into());
        let shape = Self::check(&lhs.shape(), &rhs.shape())?;
        let config = lhs.config().or_else(|| rhs.config()).unwrap_or_default();

        let mut chain = match Self::try_from_term(lhs) {
            Ok(chain) => chain,
            Err(Term::View(view)) => Self::single(view, config),
            Err(lhs) if Self::is_foreign(&rhs) => {
                let (a, b) = promote::resolve_both(lhs, rhs)?;
                let mut chain = Self::single(a, config);
                chain.reducer.push(b);
                chain.shape = shape;
                return Ok(chain);
            }
            Err(lhs) => Self::single(lhs.into_view()?, config),
        };
        chain.push(rhs)?;
        Ok(chain)
    }

    /// Appends `rhs`: a view is pushed, a chain of this kind contributes
    /// all of its operands, a chain of the other kind is materialized.
    ///
    /// # Errors
    /// `Error::Dimension` if `rhs` does not fit after the current operands.
    pub fn push(&mut self, rhs: impl Into<Term<T>>) -> Result<()> {
        let rhs = rhs.into();
        let shape = Self::check(&self.shape, &rhs.shape())?;
        match Self::try_from_term(rhs) {
            Ok(other) => self.reducer.append(other.reducer),
            Err(Term::View(view)) => self.reducer.push(view),
            Err(other) => self.reducer.push(other.into_view()?),
        }
        self.shape = shape;
        Ok(())
    }

    /// Collapses the chain into a dense matrix.
    ///
    /// # Errors
    /// `Error::TaskFailed` if any pair computation failed or panicked.
    pub fn materialize(self) -> Result<Matrix<T>> {
        let Self {
            reducer,
            shape,
            config,
            ..
        } = self;
        log::debug!(
            "materializing {} of {} operands into {}x{}",
            K::OP,
            reducer.len(),
            shape.height(),
            shape.width()
        );
        let out = reducer.reduce(|lhs, rhs| combine::<T, K>(lhs, rhs, &config))?;
        log::debug!("{} chain resolved", K::OP);
        Ok(out.retag(shape))
    }

    /// [`materialize`](Self::materialize) into a matrix pinned to
    /// `height x width`.
    ///
    /// # Errors
    /// `Error::ShapeMismatch` before any work if the chain has other
    /// dimensions.
    pub fn materialize_sized(self, height: usize, width: usize) -> Result<Matrix<T>> {
        if self.shape.dims() != (height, width) {
            return Err(Error::ShapeMismatch {
                expected: (height, width),
                actual: self.shape.dims(),
            });
        }
        self.materialize()?.into_sized(height, width)
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.shape.height()
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.shape.width()
    }

    /// Shape of the materialized result.
    #[inline]
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Number of pending operands.
    pub fn len(&self) -> usize {
        self.reducer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn config(&self) -> Config {
        self.config
    }

    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Replaces the pair selection policy used when materializing.
    #[must_use]
    pub fn with_strategy(mut self, strategy: Arc<dyn PairingStrategy>) -> Self {
        self.reducer.set_strategy(strategy);
        self
    }

    fn single(view: SharedView<T>, config: Config) -> Self {
        let shape = view.shape();
        let mut reducer = PairReducer::new(K::default_strategy());
        reducer.push(view);
        Self {
            reducer,
            shape,
            config,
            kind: PhantomData,
        }
    }

    fn check(lhs: &Shape, rhs: &Shape) -> Result<Shape> {
        match K::OP {
            OpKind::Add => lhs.check_sum(rhs),
            OpKind::Mul => lhs.check_product(rhs),
        }
    }

    /// Reinterprets `term` as a chain of this kind, or hands it back.
    fn try_from_term(term: Term<T>) -> std::result::Result<Self, Term<T>> {
        match (K::OP, term) {
            (OpKind::Add, Term::Sum(chain)) => Ok(chain.rekind()),
            (OpKind::Mul, Term::Product(chain)) => Ok(chain.rekind()),
            (_, other) => Err(other),
        }
    }

    /// Whether `term` is a chain that must be materialized to join this kind.
    fn is_foreign(term: &Term<T>) -> bool {
        matches!(
            (K::OP, term),
            (OpKind::Add, Term::Product(_)) | (OpKind::Mul, Term::Sum(_))
        )
    }

    fn rekind<J: ChainKind>(self) -> Chain<T, J> {
        Chain {
            reducer: self.reducer,
            shape: self.shape,
            config: self.config,
            kind: PhantomData,
        }
    }
}

fn combine<T: Scalar, K: ChainKind>(
    lhs: &SharedView<T>,
    rhs: &SharedView<T>,
    config: &Config,
) -> Result<Matrix<T>> {
    match K::OP {
        OpKind::Add => {
            let shape = lhs.shape().check_sum(&rhs.shape())?;
            Matrix::from_parts(shape, add(&**lhs, &**rhs)?)
        }
        OpKind::Mul => {
            let shape = lhs.shape().check_product(&rhs.shape())?;
            Matrix::from_parts(shape, matmul(&**lhs, &**rhs, config.block)?)
        }
    }
}

impl<T, K: ChainKind> fmt::Debug for Chain<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("op", &K::OP)
            .field("shape", &self.shape)
            .field("reducer", &self.reducer)
            .field("config", &self.config)
            .finish()
    }
}
