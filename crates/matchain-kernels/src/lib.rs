//! Dense kernels for matchain (pure Rust, rayon parallel)

/// Configures the global rayon pool with `threads` workers; `0` keeps
/// rayon's default (`RAYON_NUM_THREADS` or one per core). Returns `false`
/// if the global pool was already initialized.
pub fn init_parallel(threads: usize) -> bool {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if threads > 0 {
        builder = builder.num_threads(threads);
    }
    builder.build_global().is_ok()
}

pub mod elementwise;
pub mod linalg;
pub mod utility;

pub use elementwise::add::{add, add_into};
pub use linalg::matmul::{matmul, matmul_into, matmul_naive_into};
pub use utility::task::run_task;
pub use utility::util::{block_ranges, try_filled, BLOCK};
