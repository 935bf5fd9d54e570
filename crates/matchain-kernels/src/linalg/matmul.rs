//! Dense matrix multiplication over views: a direct reference loop and a
//! cache-blocked, tile-parallel kernel.
//!
//! The blocked kernel:
//! - Splits the row-major output into `block x block` tiles, each tile owning
//!   a disjoint set of `&mut` row segments
//! - Runs one task per tile on the rayon pool
//! - Walks the contraction dimension in `block`-wide chunks, fetching the
//!   matching row-block of `left` and column-block of `right` into
//!   per-worker scratch buffers
//!
//! Per output element the products are accumulated in ascending contraction
//! order, the same order as the reference loop.

#![allow(
    clippy::many_single_char_names,
    reason = "Math kernels conventionally use i/j/k for indices"
)]

use crate::utility::task::run_task;
use crate::utility::util::{block_ranges, check_out_len, try_filled};
use matchain_core::{Element, Error, MatrixView, Promote, Promoted, Result, TaskFailure};
use rayon::prelude::*;
use std::cell::RefCell;
use thread_local::ThreadLocal;

/// One output tile: rows `r0..r0 + rows.len()`, columns starting at `c0`.
struct Tile<'a, O> {
    r0: usize,
    c0: usize,
    rows: Vec<&'a mut [O]>,
}

/// Validates operand and output dimensions, returning `(height, width, span)`.
fn check_dims<A, B>(out_len: usize, left: &A, right: &B) -> Result<(usize, usize, usize)>
where
    A: MatrixView + ?Sized,
    B: MatrixView + ?Sized,
{
    let shape = left.shape().check_product(&right.shape())?;
    check_out_len(out_len, shape.height(), shape.width())?;
    Ok((shape.height(), shape.width(), left.width()))
}

/// Reference product `out = left @ right` by the direct triple loop.
///
/// Single-threaded and deterministic.
pub fn matmul_naive_into<L, R, A, B>(
    out: &mut [Promoted<L, R>],
    left: &A,
    right: &B,
) -> Result<()>
where
    L: Promote<R>,
    R: Element,
    A: MatrixView<Elem = L> + ?Sized,
    B: MatrixView<Elem = R> + ?Sized,
{
    let (height, width, span) = check_dims(out.len(), left, right)?;
    for i in 0..height {
        for j in 0..width {
            let mut acc = <Promoted<L, R> as Element>::zero();
            for k in 0..span {
                acc += <L as Promote<R>>::lift(left.get(i, k))
                    * <L as Promote<R>>::lift_rhs(right.get(k, j));
            }
            out[i * width + j] = acc;
        }
    }
    Ok(())
}

/// Blocked product `out = left @ right`, `out` row-major `height x width`.
///
/// Falls back to [`matmul_naive_into`] when either output dimension is below
/// `block`. Faults are caught per tile (or for the whole fallback loop); the
/// remaining tiles still run and the call reports [`Error::TaskFailed`].
///
/// # Errors
/// - `Error::Dimension` if `left.width() != right.height()`
/// - `Error::BufferLength` if `out` is not `left.height() * right.width()`
pub fn matmul_into<L, R, A, B>(
    out: &mut [Promoted<L, R>],
    left: &A,
    right: &B,
    block: usize,
) -> Result<()>
where
    L: Promote<R>,
    R: Element,
    A: MatrixView<Elem = L> + ?Sized,
    B: MatrixView<Elem = R> + ?Sized,
{
    let (height, width, span) = check_dims(out.len(), left, right)?;
    let block = block.max(1);
    if height < block || width < block {
        return run_task("matmul", || matmul_naive_into(out, left, right)).map_err(|failure| {
            Error::TaskFailed {
                first: failure,
                total: 1,
            }
        });
    }

    let col_tiles = width.div_ceil(block);
    let mut tiles: Vec<Tile<'_, Promoted<L, R>>> =
        Vec::with_capacity(height.div_ceil(block) * col_tiles);
    for (bi, band) in out.chunks_mut(block * width).enumerate() {
        let first = tiles.len();
        for (c0, _) in block_ranges(width, block) {
            tiles.push(Tile {
                r0: bi * block,
                c0,
                rows: Vec::with_capacity(block),
            });
        }
        for row in band.chunks_mut(width) {
            for (tj, seg) in row.chunks_mut(block).enumerate() {
                tiles[first + tj].rows.push(seg);
            }
        }
    }
    log::trace!(
        "matmul {height}x{span} @ {span}x{width}: {} tiles of {block}",
        tiles.len()
    );

    let scratch: ThreadLocal<RefCell<(Vec<L>, Vec<R>)>> = ThreadLocal::new();
    let failures: Vec<TaskFailure> = tiles
        .into_par_iter()
        .filter_map(|mut tile| {
            run_task("matmul tile", || {
                let cell = scratch.get_or(|| RefCell::new((Vec::new(), Vec::new())));
                let mut bufs = cell.borrow_mut();
                let (lbuf, rbuf) = &mut *bufs;
                multiply_tile(&mut tile, left, right, span, block, lbuf, rbuf);
                Ok(())
            })
            .err()
        })
        .collect();
    Error::from_failures(failures)
}

/// Allocating form of [`matmul_into`]; returns the row-major product.
pub fn matmul<L, R, A, B>(left: &A, right: &B, block: usize) -> Result<Vec<Promoted<L, R>>>
where
    L: Promote<R>,
    R: Element,
    A: MatrixView<Elem = L> + ?Sized,
    B: MatrixView<Elem = R> + ?Sized,
{
    let shape = left.shape().check_product(&right.shape())?;
    let mut out = try_filled(shape.len(), <Promoted<L, R> as Element>::zero())?;
    matmul_into(&mut out, left, right, block)?;
    Ok(out)
}

fn multiply_tile<L, R, A, B>(
    tile: &mut Tile<'_, Promoted<L, R>>,
    left: &A,
    right: &B,
    span: usize,
    block: usize,
    lbuf: &mut Vec<L>,
    rbuf: &mut Vec<R>,
) where
    L: Promote<R>,
    R: Element,
    A: MatrixView<Elem = L> + ?Sized,
    B: MatrixView<Elem = R> + ?Sized,
{
    let nrows = tile.rows.len();
    let ncols = tile.rows.first().map_or(0, |r| r.len());
    let (r0, c0) = (tile.r0, tile.c0);
    for row in &mut tile.rows {
        row.fill(<Promoted<L, R> as Element>::zero());
    }
    for (k0, k1) in block_ranges(span, block) {
        let kw = k1 - k0;
        left.get_block_into(r0, r0 + nrows, k0, k1, lbuf);
        right.get_block_into(k0, k1, c0, c0 + ncols, rbuf);
        for (ii, row) in tile.rows.iter_mut().enumerate() {
            let lrow = &lbuf[ii * kw..(ii + 1) * kw];
            for (jj, cell) in row.iter_mut().enumerate() {
                let mut acc = *cell;
                for (b, &l) in lrow.iter().enumerate() {
                    acc += <L as Promote<R>>::lift(l)
                        * <L as Promote<R>>::lift_rhs(rbuf[b * ncols + jj]);
                }
                *cell = acc;
            }
        }
    }
}
