//! Dimension-generic vector operations shared by the disc (2D) and sphere (3D) variants.
//!
//! [`SimVector`] is implemented for Bevy's `Vec2` and `Vec3`, so the body,
//! collision, and loop code is written once and instantiated per variant.

use bevy::math::{Vec2, Vec3};
use std::fmt::Debug;
use std::ops::{Add, AddAssign, Div, Index, IndexMut, Mul, Neg, Sub, SubAssign};

/// Index of the vertical axis. Gravity and spawning act along it.
pub const VERTICAL_AXIS: usize = 1;

/// Vector type a [`crate::body::Body`] can live in.
pub trait SimVector:
    Copy
    + Debug
    + Default
    + PartialEq
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<f32, Output = Self>
    + Div<f32, Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + Index<usize, Output = f32>
    + IndexMut<usize>
{
    /// Number of coordinates.
    const DIM: usize;

    const ZERO: Self;

    fn dot(self, other: Self) -> f32;

    fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    fn distance(self, other: Self) -> f32 {
        (self - other).length()
    }

    /// Unit vector along `axis`.
    fn unit(axis: usize) -> Self {
        let mut v = Self::ZERO;
        v[axis] = 1.0;
        v
    }

    /// Unit vector along the vertical axis (+y).
    fn up() -> Self {
        Self::unit(VERTICAL_AXIS)
    }
}

impl SimVector for Vec2 {
    const DIM: usize = 2;
    const ZERO: Self = Vec2::ZERO;

    fn dot(self, other: Self) -> f32 {
        Vec2::dot(self, other)
    }
}

impl SimVector for Vec3 {
    const DIM: usize = 3;
    const ZERO: Self = Vec3::ZERO;

    fn dot(self, other: Self) -> f32 {
        Vec3::dot(self, other)
    }
}
