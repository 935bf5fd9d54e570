//! Core element, shape, view and error types for matchain (pure Rust)

pub mod element;
pub mod error;
pub mod shape;
pub mod view;

pub use element::{Element, Promote, Promoted, Scalar};
pub use error::{Error, FailureKind, OpKind, Result, TaskFailure};
pub use shape::Shape;
pub use view::{MatrixView, MatrixViewMut, SharedView};
