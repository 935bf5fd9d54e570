//! Task boundary: every unit of parallel work runs through [`run_task`], so
//! a fault in one task is classified and logged without tearing down its
//! siblings.

use matchain_core::{Result, TaskFailure};
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Runs `f`, turning both returned errors and panics into a [`TaskFailure`]
/// that is written to the diagnostic log.
pub fn run_task<R>(label: &str, f: impl FnOnce() -> Result<R>) -> std::result::Result<R, TaskFailure> {
    let failure = match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(v)) => return Ok(v),
        Ok(Err(err)) => TaskFailure::from_error(&err),
        Err(payload) => TaskFailure::from_panic(payload.as_ref()),
    };
    log::error!("{label}: {failure}");
    Err(failure)
}
