//! Elementwise addition of two views with element promotion.
//!
//! Rows are independent tasks on the rayon pool; each task lifts its two
//! source rows into per-worker scratch and combines them with the element's
//! slice-add (SIMD lanes for `f32`/`f64`). Small problems stay on the
//! calling thread.

use crate::utility::task::run_task;
use crate::utility::util::{check_out_len, try_filled, SMALL_ADD_LIMIT};
use matchain_core::{Element, Error, MatrixView, Promote, Promoted, Result, TaskFailure};
use rayon::prelude::*;
use std::cell::RefCell;
use thread_local::ThreadLocal;

type RowScratch<L, R, O> = (Vec<L>, Vec<R>, Vec<O>);

/// Writes `left[i] + right[i]` (promoted) into row `i` of `out`.
fn add_row<L, R, A, B>(
    out_row: &mut [Promoted<L, R>],
    i: usize,
    left: &A,
    right: &B,
    scratch: &mut RowScratch<L, R, Promoted<L, R>>,
) where
    L: Promote<R>,
    R: Element,
    A: MatrixView<Elem = L> + ?Sized,
    B: MatrixView<Elem = R> + ?Sized,
{
    let width = out_row.len();
    let (lbuf, rbuf, obuf) = scratch;
    left.get_block_into(i, i + 1, 0, width, lbuf);
    right.get_block_into(i, i + 1, 0, width, rbuf);
    for (d, &l) in out_row.iter_mut().zip(lbuf.iter()) {
        *d = <L as Promote<R>>::lift(l);
    }
    obuf.clear();
    obuf.extend(rbuf.iter().map(|&r| <L as Promote<R>>::lift_rhs(r)));
    <Promoted<L, R> as Element>::add_assign_slice(out_row, obuf);
}

/// `out = left + right`, `out` row-major with the operands' shape.
///
/// # Errors
/// - `Error::Dimension` if the operand shapes differ
/// - `Error::BufferLength` if `out` does not match the shape
/// - `Error::TaskFailed` if any row task faulted (the other rows still ran)
pub fn add_into<L, R, A, B>(out: &mut [Promoted<L, R>], left: &A, right: &B) -> Result<()>
where
    L: Promote<R>,
    R: Element,
    A: MatrixView<Elem = L> + ?Sized,
    B: MatrixView<Elem = R> + ?Sized,
{
    let shape = left.shape().check_sum(&right.shape())?;
    let (height, width) = shape.dims();
    check_out_len(out.len(), height, width)?;
    if width == 0 || height == 0 {
        return Ok(());
    }

    if out.len() <= SMALL_ADD_LIMIT {
        return run_task("add", || {
            let mut scratch = (Vec::new(), Vec::new(), Vec::new());
            for (i, row) in out.chunks_mut(width).enumerate() {
                add_row(row, i, left, right, &mut scratch);
            }
            Ok(())
        })
        .map_err(|failure| Error::TaskFailed {
            first: failure,
            total: 1,
        });
    }

    let tls: ThreadLocal<RefCell<RowScratch<L, R, Promoted<L, R>>>> = ThreadLocal::new();
    let failures: Vec<TaskFailure> = out
        .par_chunks_mut(width)
        .enumerate()
        .filter_map(|(i, row)| {
            run_task("add row", || {
                let cell = tls.get_or(|| RefCell::new((Vec::new(), Vec::new(), Vec::new())));
                add_row(row, i, left, right, &mut cell.borrow_mut());
                Ok(())
            })
            .err()
        })
        .collect();
    Error::from_failures(failures)
}

/// Allocating form of [`add_into`]; returns the row-major sum.
pub fn add<L, R, A, B>(left: &A, right: &B) -> Result<Vec<Promoted<L, R>>>
where
    L: Promote<R>,
    R: Element,
    A: MatrixView<Elem = L> + ?Sized,
    B: MatrixView<Elem = R> + ?Sized,
{
    let shape = left.shape().check_sum(&right.shape())?;
    let mut out = try_filled(shape.len(), <Promoted<L, R> as Element>::zero())?;
    add_into(&mut out, left, right)?;
    Ok(out)
}
