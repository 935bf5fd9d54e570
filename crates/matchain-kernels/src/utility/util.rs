//! Utility constants and helpers shared by the dense kernels
//
// Block sizes, the threshold below which kernels stay single-threaded, and
// fallible allocation of output buffers.

use matchain_core::{Error, Result};

/// Edge length of a multiply tile; results narrower than this in either
/// dimension use the direct loop.
pub const BLOCK: usize = 100;
/// Element count below which the add kernel runs on the calling thread
pub const SMALL_ADD_LIMIT: usize = 16 * 1024;

/// Half-open `(start, end)` ranges of length `block` covering `0..len`.
#[inline]
pub fn block_ranges(len: usize, block: usize) -> impl Iterator<Item = (usize, usize)> {
    let block = block.max(1);
    (0..len).step_by(block).map(move |s| (s, (s + block).min(len)))
}

/// Allocates `len` copies of `value`, reporting allocator refusal as
/// [`Error::Allocation`] instead of aborting.
pub fn try_filled<T: Clone>(len: usize, value: T) -> Result<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| Error::Allocation { elements: len })?;
    v.resize(len, value);
    Ok(v)
}

/// Checks that an output buffer holds exactly `height * width` elements.
#[inline]
pub fn check_out_len(len: usize, height: usize, width: usize) -> Result<()> {
    if height.checked_mul(width) == Some(len) {
        Ok(())
    } else {
        Err(Error::BufferLength { len, height, width })
    }
}
