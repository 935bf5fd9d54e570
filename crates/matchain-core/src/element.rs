//! Element traits: the numeric capability every matrix cell must offer, and
//! the promotion rule used when two element types meet in one operation.

use std::fmt::Debug;
use std::ops::{Add, AddAssign, Mul};
use wide::{f32x4, f64x4};

/// Numeric element stored in a matrix view.
pub trait Element:
    Copy
    + Send
    + Sync
    + Default
    + PartialEq
    + Debug
    + Add<Output = Self>
    + Mul<Output = Self>
    + AddAssign
    + 'static
{
    /// Additive identity.
    fn zero() -> Self;

    /// Short type name used in diagnostics.
    fn type_name() -> &'static str;

    /// `dst[i] += src[i]` over the common prefix of both slices.
    #[inline]
    fn add_assign_slice(dst: &mut [Self], src: &[Self]) {
        for (d, &s) in dst.iter_mut().zip(src) {
            *d += s;
        }
    }
}

macro_rules! impl_element_int {
    ($($t:ty),*) => {
        $(
            impl Element for $t {
                #[inline]
                fn zero() -> Self {
                    0
                }
                #[inline]
                fn type_name() -> &'static str {
                    stringify!($t)
                }
            }
        )*
    };
}

impl_element_int!(i32, i64, u32, u64);

impl Element for f64 {
    #[inline]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn type_name() -> &'static str {
        "f64"
    }

    fn add_assign_slice(dst: &mut [Self], src: &[Self]) {
        let n = dst.len().min(src.len());
        let limit4 = n & !3;
        let mut i = 0usize;
        while i < limit4 {
            let a = f64x4::from([dst[i], dst[i + 1], dst[i + 2], dst[i + 3]]);
            let b = f64x4::from([src[i], src[i + 1], src[i + 2], src[i + 3]]);
            let arr = (a + b).to_array();
            dst[i..i + 4].copy_from_slice(&arr);
            i += 4;
        }
        while i < n {
            dst[i] += src[i];
            i += 1;
        }
    }
}

impl Element for f32 {
    #[inline]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn type_name() -> &'static str {
        "f32"
    }

    fn add_assign_slice(dst: &mut [Self], src: &[Self]) {
        let n = dst.len().min(src.len());
        let limit4 = n & !3;
        let mut i = 0usize;
        while i < limit4 {
            let a = f32x4::from([dst[i], dst[i + 1], dst[i + 2], dst[i + 3]]);
            let b = f32x4::from([src[i], src[i + 1], src[i + 2], src[i + 3]]);
            let arr = (a + b).to_array();
            dst[i..i + 4].copy_from_slice(&arr);
            i += 4;
        }
        while i < n {
            dst[i] += src[i];
            i += 1;
        }
    }
}

/// Result element type of combining `Self` (left) with `R` (right).
///
/// Follows the usual C-family promotion: integers widen to the larger
/// integer, any integer meeting a float becomes that float, and `f64` wins
/// over everything.
pub trait Promote<R: Element>: Element {
    type Output: Element;

    /// Converts a left element into the promoted type.
    fn lift(self) -> <Self as Promote<R>>::Output;

    /// Converts a right element into the promoted type.
    fn lift_rhs(rhs: R) -> <Self as Promote<R>>::Output;
}

macro_rules! impl_promote {
    ($($l:ty, $r:ty => $o:ty;)*) => {
        $(
            impl Promote<$r> for $l {
                type Output = $o;
                #[inline]
                #[allow(clippy::cast_precision_loss, clippy::cast_lossless)]
                fn lift(self) -> $o {
                    self as $o
                }
                #[inline]
                #[allow(clippy::cast_precision_loss, clippy::cast_lossless)]
                fn lift_rhs(rhs: $r) -> $o {
                    rhs as $o
                }
            }
        )*
    };
}

impl_promote! {
    i32, i32 => i32;
    i32, i64 => i64;
    i32, f32 => f32;
    i32, f64 => f64;
    i64, i32 => i64;
    i64, i64 => i64;
    i64, f32 => f32;
    i64, f64 => f64;
    f32, i32 => f32;
    f32, i64 => f32;
    f32, f32 => f32;
    f32, f64 => f64;
    f64, i32 => f64;
    f64, i64 => f64;
    f64, f32 => f64;
    f64, f64 => f64;
    u32, u32 => u32;
    u64, u64 => u64;
}

/// An element that combines with itself without changing type; the bound
/// required by same-type chains.
pub trait Scalar: Element + Promote<Self, Output = Self> {}

impl<T: Element + Promote<T, Output = T>> Scalar for T {}

/// Promoted element type of `L` combined with `R`.
pub type Promoted<L, R> = <L as Promote<R>>::Output;
