//! Generic numeric bound shared by the vector and matrix helpers.
//!
//! Historical series may arrive as integer basis points or as floats; the
//! helpers here accept either and do their accumulation in the caller's type
//! (dot products) or in `f64` (statistics).

use std::fmt::Debug;
use std::ops::{Add, Mul, Sub};

use crate::core::DimensionError;

/// Integer or floating-point scalar accepted by the generic helpers.
pub trait Number:
    Copy
    + Debug
    + Default
    + PartialOrd
    + Send
    + Sync
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + 'static
{
    /// Lossy widening to `f64`.
    fn to_f64(self) -> f64;
}

macro_rules! impl_number {
    ($($t:ty),* $(,)?) => {
        $(
            impl Number for $t {
                #[inline(always)]
                fn to_f64(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

impl_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

/// Inner product of two equally sized vectors.
///
/// # Errors
/// Returns [`DimensionError`] when the lengths differ.
#[inline]
pub fn dot_product<T: Number>(a: &[T], b: &[T]) -> Result<T, DimensionError> {
    if a.len() != b.len() {
        return Err(DimensionError {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let mut acc = T::default();
    for (&x, &y) in a.iter().zip(b.iter()) {
        acc = acc + x * y;
    }
    Ok(acc)
}

/// Builds a dense `rows x cols` matrix from a generator.
pub fn matrix_from_fn<T: Number, F>(rows: usize, cols: usize, mut f: F) -> Vec<Vec<T>>
where
    F: FnMut(usize, usize) -> T,
{
    (0..rows)
        .map(|i| (0..cols).map(|j| f(i, j)).collect())
        .collect()
}
