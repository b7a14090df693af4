//! Axis-aligned world box the bodies bounce around in.

use crate::vector::SimVector;
use bevy::math::{Vec2, Vec3};

/// Static-per-frame axis-aligned bounds. Rebuilt from the display surface
/// whenever it changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBounds<V> {
    pub min: V,
    pub max: V,
}

impl<V: SimVector> WorldBounds<V> {
    pub fn new(min: V, max: V) -> Self {
        Self { min, max }
    }

    /// True iff a sphere of `radius` at `position` lies fully inside the box.
    pub fn contains_extent(&self, position: V, radius: f32) -> bool {
        (0..V::DIM).all(|axis| {
            position[axis] - radius >= self.min[axis] && position[axis] + radius <= self.max[axis]
        })
    }

    /// Extent of the box along `axis`.
    pub fn span(&self, axis: usize) -> f32 {
        self.max[axis] - self.min[axis]
    }
}

/// Maps a display surface onto world bounds for one dimensionality.
pub trait SurfaceBounds: SimVector {
    /// `margin` shrinks the usable surface; `depth` is the fixed extent of the
    /// third axis and is ignored in 2D.
    fn from_surface(width: f32, height: f32, margin: f32, depth: f32) -> WorldBounds<Self>;
}

/// Canvas bounds: top-left origin, the surface shrunk by `margin`.
impl SurfaceBounds for Vec2 {
    fn from_surface(width: f32, height: f32, margin: f32, _depth: f32) -> WorldBounds<Self> {
        WorldBounds::new(
            Vec2::ZERO,
            Vec2::new((width - margin).max(0.0), (height - margin).max(0.0)),
        )
    }
}

/// Room bounds: x centred on the origin, y from the floor up, z a fixed depth.
impl SurfaceBounds for Vec3 {
    fn from_surface(width: f32, height: f32, margin: f32, depth: f32) -> WorldBounds<Self> {
        let half_width = (width - margin).max(0.0) / 2.0;
        WorldBounds::new(
            Vec3::new(-half_width, 0.0, 0.0),
            Vec3::new(half_width, (height - margin).max(0.0), depth),
        )
    }
}
