//! Combinations across element types, and concurrent resolution of two
//! chain operands.
//!
//! Each chain side is materialized on its own scoped thread and delivered
//! through a [`Handoff`]. Plain views are used as they are.

use super::Term;
use crate::handoff::Handoff;
use crate::matrix::Matrix;
use matchain_core::{
    Error, FailureKind, Promote, Promoted, Result, Scalar, SharedView, TaskFailure,
};
use matchain_kernels::{add, matmul};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread::{self, Scope};

type Slot<T> = Handoff<Result<SharedView<T>>>;

/// `lhs + rhs` with element promotion, e.g. `i32` chain plus `f64` view.
///
/// # Errors
/// `Error::Dimension` before any work if the shapes differ, otherwise the
/// first failure of either side.
pub fn add_promoted<L, R>(
    lhs: impl Into<Term<L>>,
    rhs: impl Into<Term<R>>,
) -> Result<Matrix<Promoted<L, R>>>
where
    L: Scalar + Promote<R>,
    R: Scalar,
{
    let (lhs, rhs) = (lhs.into(), rhs.into());
    let shape = lhs.shape().check_sum(&rhs.shape())?;
    let (l, r) = resolve_both(lhs, rhs)?;
    log::debug!(
        "promoted addition {} + {} -> {}",
        L::type_name(),
        R::type_name(),
        <Promoted<L, R> as matchain_core::Element>::type_name()
    );
    Matrix::from_parts(shape, add(&*l, &*r)?)
}

/// `lhs * rhs` with element promotion.
///
/// # Errors
/// `Error::Dimension` before any work if the inner dimensions differ,
/// otherwise the first failure of either side.
pub fn mul_promoted<L, R>(
    lhs: impl Into<Term<L>>,
    rhs: impl Into<Term<R>>,
) -> Result<Matrix<Promoted<L, R>>>
where
    L: Scalar + Promote<R>,
    R: Scalar,
{
    let (lhs, rhs) = (lhs.into(), rhs.into());
    let shape = lhs.shape().check_product(&rhs.shape())?;
    let block = lhs.config().or_else(|| rhs.config()).unwrap_or_default().block;
    let (l, r) = resolve_both(lhs, rhs)?;
    log::debug!(
        "promoted multiplication {} * {} -> {}",
        L::type_name(),
        R::type_name(),
        <Promoted<L, R> as matchain_core::Element>::type_name()
    );
    Matrix::from_parts(shape, matmul(&*l, &*r, block)?)
}

/// Turns both terms into views, materializing chain sides concurrently.
pub(crate) fn resolve_both<L: Scalar, R: Scalar>(
    lhs: Term<L>,
    rhs: Term<R>,
) -> Result<(SharedView<L>, SharedView<R>)> {
    if let (Term::View(l), Term::View(r)) = (&lhs, &rhs) {
        return Ok((l.clone(), r.clone()));
    }
    let left: Slot<L> = Handoff::new();
    let right: Slot<R> = Handoff::new();
    thread::scope(|s| {
        let l = produce(s, lhs, &left);
        let r = produce(s, rhs, &right);
        let l = match l {
            Some(view) => view,
            None => receive(&left)?,
        };
        let r = match r {
            Some(view) => view,
            None => receive(&right)?,
        };
        Ok((l, r))
    })
}

/// Returns views directly; spawns a producer for chains.
fn produce<'scope, 'env, T: Scalar>(
    s: &'scope Scope<'scope, 'env>,
    term: Term<T>,
    slot: &'env Slot<T>,
) -> Option<SharedView<T>> {
    let chain = match term {
        Term::View(view) => return Some(view),
        chain => chain,
    };
    s.spawn(move || {
        let outcome = match catch_unwind(AssertUnwindSafe(|| chain.into_view())) {
            Ok(outcome) => outcome,
            Err(payload) => {
                let failure = TaskFailure::from_panic(&*payload);
                log::error!("operand producer: {failure}");
                Err(Error::TaskFailed {
                    first: failure,
                    total: 1,
                })
            }
        };
        if slot.put(outcome).is_err() {
            log::warn!("operand handoff already written, result dropped");
        }
    });
    None
}

fn receive<T>(slot: &Slot<T>) -> Result<SharedView<T>> {
    slot.take().unwrap_or_else(|| {
        Err(Error::TaskFailed {
            first: TaskFailure::new(FailureKind::Logic, "operand handoff already consumed"),
            total: 1,
        })
    })
}
