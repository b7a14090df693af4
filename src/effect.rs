//! Short-lived collision rings spawned where two spheres hit.

use crate::render::SceneHandle;
use bevy::color::Srgba;

#[derive(Debug, Clone, PartialEq)]
pub struct Effect<V> {
    pub handle: SceneHandle,
    pub position: V,
    /// Base ring size before growth.
    pub size: f32,
    /// Scale reached at the end of the lifetime, as a multiple of `size`.
    pub growth: f32,
    /// Seconds.
    pub lifetime: f32,
    /// Seconds alive, never above `lifetime`.
    pub elapsed: f32,
    pub color: Srgba,
}

impl<V> Effect<V> {
    pub fn new(
        handle: SceneHandle,
        position: V,
        size: f32,
        growth: f32,
        lifetime: f32,
        color: Srgba,
    ) -> Self {
        Self {
            handle,
            position,
            size,
            growth,
            lifetime,
            elapsed: 0.0,
            color,
        }
    }

    /// Age the effect by `dt`. Returns false once it has expired; an effect
    /// already at its lifetime expires on the next call.
    pub fn advance(&mut self, dt: f32) -> bool {
        let expired = self.elapsed >= self.lifetime;
        self.elapsed = (self.elapsed + dt).min(self.lifetime);
        !expired && self.elapsed < self.lifetime
    }

    /// Fraction of the lifetime used, `0..=1`.
    pub fn progress(&self) -> f32 {
        if self.lifetime <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.lifetime).clamp(0.0, 1.0)
    }

    /// Ring scale, growing linearly from zero over the lifetime.
    pub fn scale(&self) -> f32 {
        self.size * self.growth * self.progress()
    }
}
