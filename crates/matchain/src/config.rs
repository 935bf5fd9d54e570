//! Runtime configuration carried by every chain.

use matchain_kernels::BLOCK;

/// Environment variable overriding [`Config::block`].
pub const BLOCK_ENV: &str = "MATCHAIN_BLOCK";
/// Environment variable overriding [`Config::threads`].
pub const THREADS_ENV: &str = "MATCHAIN_THREADS";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Multiply tile edge; results narrower than this use the direct loop.
    pub block: usize,
    /// Worker threads for the global pool; `0` leaves rayon's default.
    pub threads: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            block: BLOCK,
            threads: 0,
        }
    }
}

impl Config {
    /// Defaults overridden by `MATCHAIN_BLOCK` / `MATCHAIN_THREADS`.
    /// Unparsable or zero block values are ignored with a warning.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(block) = read_env(BLOCK_ENV) {
            if block > 0 {
                config.block = block;
            } else {
                log::warn!("{BLOCK_ENV}=0 ignored, keeping block {}", config.block);
            }
        }
        if let Some(threads) = read_env(THREADS_ENV) {
            config.threads = threads;
        }
        config
    }

    #[must_use]
    pub const fn with_block(mut self, block: usize) -> Self {
        self.block = if block == 0 { 1 } else { block };
        self
    }

    #[must_use]
    pub const fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Sizes the global rayon pool. Only the first call in a process takes
    /// effect; later calls return `false`.
    pub fn install(&self) -> bool {
        let installed = matchain_kernels::init_parallel(self.threads);
        if installed {
            log::debug!("worker pool installed with {} threads", rayon::current_num_threads());
        } else {
            log::debug!("worker pool already initialized, {self:?} not applied");
        }
        installed
    }
}

fn read_env(key: &str) -> Option<usize> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            log::warn!("ignoring {key}={raw:?}: not an unsigned integer");
            None
        }
    }
}
