//! Error taxonomy shared by kernels, the reducer and the chain algebra.

use std::any::Any;
use std::fmt;
use thiserror::Error;

/// Which operator a dimension check belonged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Add,
    Mul,
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => f.write_str("addition"),
            Self::Mul => f.write_str("multiplication"),
        }
    }
}

/// Coarse classification of a failed task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Operand dimensions were inconsistent inside the task.
    Domain,
    /// An internal invariant did not hold.
    Logic,
    /// The task panicked with a message.
    Runtime,
    /// A result buffer could not be allocated.
    Allocation,
    /// The task panicked with a payload that carries no message.
    Unknown,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Domain => "dimension",
            Self::Logic => "logic",
            Self::Runtime => "runtime",
            Self::Allocation => "allocation",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// A failure caught at a task boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} failure: {message}")]
pub struct TaskFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl TaskFailure {
    #[must_use]
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Classifies an error returned by the task body.
    #[must_use]
    pub fn from_error(err: &Error) -> Self {
        let kind = match err {
            Error::Dimension { .. } | Error::ShapeMismatch { .. } => FailureKind::Domain,
            Error::OutOfBounds { .. } | Error::BufferLength { .. } | Error::NotAVector { .. } => {
                FailureKind::Logic
            }
            Error::Allocation { .. } => FailureKind::Allocation,
            Error::TaskFailed { first, .. } => first.kind,
        };
        Self::new(kind, err.to_string())
    }

    /// Classifies a panic payload caught with `catch_unwind`.
    #[must_use]
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        if let Some(s) = payload.downcast_ref::<&str>() {
            Self::new(FailureKind::Runtime, *s)
        } else if let Some(s) = payload.downcast_ref::<String>() {
            Self::new(FailureKind::Runtime, s.clone())
        } else {
            Self::new(FailureKind::Unknown, "task panicked with a non-string payload")
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Operand shapes are incompatible for the operator. `fixed` is set when
    /// both shapes were statically tagged.
    #[error("dimension mismatch in matrix {op}: {left:?} vs {right:?}")]
    Dimension {
        op: OpKind,
        left: (usize, usize),
        right: (usize, usize),
        fixed: bool,
    },

    /// A sized conversion asked for dimensions the matrix does not have.
    #[error("expected a {expected:?} matrix, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("window rows {rows:?} cols {cols:?} out of bounds for {height}x{width} view")]
    OutOfBounds {
        rows: (usize, usize),
        cols: (usize, usize),
        height: usize,
        width: usize,
    },

    #[error("buffer of length {len} cannot hold a {height}x{width} matrix")]
    BufferLength {
        len: usize,
        height: usize,
        width: usize,
    },

    #[error("view of shape {height}x{width} is not a vector")]
    NotAVector { height: usize, width: usize },

    #[error("failed to allocate {elements} elements")]
    Allocation { elements: usize },

    #[error("{total} task(s) failed, first: {first}")]
    TaskFailed { first: TaskFailure, total: usize },
}

impl Error {
    /// Collapses the failures of one fan-out into a single error, or `Ok`
    /// when every task succeeded.
    pub fn from_failures(mut failures: Vec<TaskFailure>) -> Result<()> {
        if failures.is_empty() {
            return Ok(());
        }
        let total = failures.len();
        let first = failures.swap_remove(0);
        Err(Self::TaskFailed { first, total })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
