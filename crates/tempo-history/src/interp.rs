//! Interpolation modes and the [`Lerp`] trait.
//!
//! Every snapshot in a [`Scrapbook`](crate::scrapbook::Scrapbook) is tagged
//! with an [`Interpolation`] mode that governs how the value is read back
//! between that snapshot and the next one:
//!
//! - `Linear` -- component-wise linear interpolation proportional to
//!   elapsed time (positions, velocities, alpha fades).
//! - `Step` -- the earlier value holds unchanged until the next snapshot's
//!   exact time (sprite indices, animator states, booleans).
//!
//! Types that have no meaningful in-between value (strings, integers used
//! as discrete IDs) implement [`Lerp`] as "hold the earlier value", which
//! makes them behave like `Step` even when tagged `Linear`.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Interpolation
// ---------------------------------------------------------------------------

/// How a snapshot's value is read back between it and the next snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interpolation {
    /// Component-wise linear blend toward the next snapshot.
    Linear,
    /// Hold this value until the next snapshot's exact time.
    Step,
}

// ---------------------------------------------------------------------------
// Lerp
// ---------------------------------------------------------------------------

/// Component-wise linear interpolation between two values of a type.
///
/// `alpha` is the normalized position between `self` (0.0) and `other`
/// (1.0). Implementations must return `self`'s value at `alpha == 0.0`
/// and `other`'s at `alpha == 1.0`.
pub trait Lerp: Sized {
    /// Blend from `self` toward `other` by `alpha` in `[0, 1]`.
    fn lerp(&self, other: &Self, alpha: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(&self, other: &Self, alpha: f64) -> Self {
        self + (other - self) * alpha
    }
}

impl Lerp for f32 {
    fn lerp(&self, other: &Self, alpha: f64) -> Self {
        self + (other - self) * alpha as f32
    }
}

impl<T: Lerp + Copy, const N: usize> Lerp for [T; N] {
    fn lerp(&self, other: &Self, alpha: f64) -> Self {
        let mut out = *self;
        for (o, b) in out.iter_mut().zip(other.iter()) {
            *o = o.lerp(b, alpha);
        }
        out
    }
}

impl<A: Lerp, B: Lerp> Lerp for (A, B) {
    fn lerp(&self, other: &Self, alpha: f64) -> Self {
        (self.0.lerp(&other.0, alpha), self.1.lerp(&other.1, alpha))
    }
}

impl<A: Lerp, B: Lerp, C: Lerp> Lerp for (A, B, C) {
    fn lerp(&self, other: &Self, alpha: f64) -> Self {
        (
            self.0.lerp(&other.0, alpha),
            self.1.lerp(&other.1, alpha),
            self.2.lerp(&other.2, alpha),
        )
    }
}

/// Implement [`Lerp`] as "hold the earlier value" for discrete types.
///
/// Used for types where a blend is meaningless; they read back with
/// `Step` semantics regardless of the snapshot's tag.
macro_rules! hold_lerp {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Lerp for $ty {
                fn lerp(&self, _other: &Self, _alpha: f64) -> Self {
                    self.clone()
                }
            }
        )*
    };
}

hold_lerp!(bool, char, String, i8, i16, i32, i64, u8, u16, u32, u64, usize, isize);

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
