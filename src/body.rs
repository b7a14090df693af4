//! A single moving disc (2D) or sphere (3D).
//!
//! ## Lifecycle
//!
//! | Stage     | Trigger                                   | Physics                 |
//! |-----------|-------------------------------------------|-------------------------|
//! | Entering  | Spawned outside/at the edge, `spawned=false` | side walls, exit wall |
//! | Live      | Full extent inside the bounds             | walls + collisions      |
//! | Dead      | `health.current <= 0` (3D only)           | pruned by the loop      |
//!
//! Bodies in the disc variant carry no health and live for the whole process.

use crate::bounds::WorldBounds;
use crate::render::SceneHandle;
use crate::vector::{SimVector, VERTICAL_AXIS};
use bevy::color::{Mix, Srgba};

/// Remaining/maximum hit points of a sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn full(max: f32) -> Self {
        Self { current: max, max }
    }

    /// Remaining fraction, clamped to `[0, 1]`.
    pub fn ratio(&self) -> f32 {
        if self.max <= 0.0 {
            return 0.0;
        }
        (self.current / self.max).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Body<V> {
    /// Key the rendering collaborator uses to track this body.
    pub handle: SceneHandle,
    pub position: V,
    pub velocity: V,
    /// Fixed for the body's lifetime; always positive.
    pub radius: f32,
    /// Colour at full health.
    pub base_color: Srgba,
    /// Display colour, blended toward the damage colour as health drops.
    pub color: Srgba,
    pub health: Option<Health>,
    /// Spawn gate. Once true it never reverts.
    pub spawned: bool,
    /// Seconds until this body may emit another collision effect.
    pub effect_cooldown: f32,
}

impl<V: SimVector> Body<V> {
    pub fn new(handle: SceneHandle, position: V, velocity: V, radius: f32, color: Srgba) -> Self {
        debug_assert!(radius > 0.0, "body radius must be positive");
        Self {
            handle,
            position,
            velocity,
            radius,
            base_color: color,
            color,
            health: None,
            spawned: false,
            effect_cooldown: 0.0,
        }
    }

    /// Give the body a full health pool.
    pub fn with_health(mut self, max: f32) -> Self {
        self.health = Some(Health::full(max));
        self
    }

    /// Skip the spawn gate; the body collides from its first frame.
    pub fn already_spawned(mut self) -> Self {
        self.spawned = true;
        self
    }

    /// Apply `gravity` along -up, then advance the position by one step.
    pub fn integrate(&mut self, dt: f32, gravity: f32) {
        if gravity != 0.0 {
            self.velocity -= V::up() * (gravity * dt);
        }
        self.position += self.velocity * dt;
    }

    /// Open the spawn gate once the body has fully entered the bounds.
    /// Returns true on the frame the gate opens.
    pub fn try_enter(&mut self, bounds: &WorldBounds<V>) -> bool {
        if self.spawned || !bounds.contains_extent(self.position, self.radius) {
            return false;
        }
        self.spawned = true;
        true
    }

    /// Bounce off any wall the body's extent crosses: the axis velocity is
    /// negated and the position clamped back inside by `radius`.
    pub fn reflect_off_walls(&mut self, bounds: &WorldBounds<V>) {
        for axis in 0..V::DIM {
            self.reflect_axis(axis, bounds);
        }
    }

    /// Like [`Body::reflect_off_walls`] but leaves the vertical axis free, so
    /// a body still entering through the top or ceiling stays in its column.
    pub fn reflect_off_side_walls(&mut self, bounds: &WorldBounds<V>) {
        for axis in (0..V::DIM).filter(|&axis| axis != VERTICAL_AXIS) {
            self.reflect_axis(axis, bounds);
        }
    }

    /// Stop a body still entering from leaving through the wall opposite its
    /// entry edge. `inward` is the sign of a vertical velocity pointing into
    /// the box.
    ///
    /// When the box is tall enough the body bounces back and is fully inside.
    /// When it is shorter than the body's diameter the body is parked at the
    /// exit wall still heading inward, so it enters once the box grows again.
    pub fn hold_at_exit_wall(&mut self, bounds: &WorldBounds<V>, inward: f32) {
        let axis = VERTICAL_AXIS;
        let lo = bounds.min[axis] + self.radius;
        let hi = bounds.max[axis] - self.radius;
        let p = self.position[axis];
        let (past_exit, exit) = if inward > 0.0 { (p > hi, hi) } else { (p < lo, lo) };
        if !past_exit {
            return;
        }
        self.position[axis] = exit;
        let speed = self.velocity[axis].abs();
        self.velocity[axis] = if hi >= lo { -inward * speed } else { inward * speed };
    }

    fn reflect_axis(&mut self, axis: usize, bounds: &WorldBounds<V>) {
        let lo = bounds.min[axis] + self.radius;
        let hi = bounds.max[axis] - self.radius;
        let p = self.position[axis];
        if p < lo || p > hi {
            self.velocity[axis] = -self.velocity[axis];
            // max-then-min: a box narrower than the body pins it to the far wall
            self.position[axis] = p.max(lo).min(hi);
        }
    }

    pub fn distance_to(&self, other: &Body<V>) -> f32 {
        self.position.distance(other.position)
    }

    /// Strict: touching exactly is not an overlap.
    pub fn overlaps(&self, other: &Body<V>) -> bool {
        self.distance_to(other) < self.radius + other.radius
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Subtract `amount` from health (negative amounts heal) and recolour.
    /// No-op for bodies without health.
    pub fn apply_damage(&mut self, amount: f32, damage_color: Srgba) {
        let Some(health) = self.health.as_mut() else {
            return;
        };
        health.current -= amount;
        let ratio = health.ratio();
        self.color = self.base_color.mix(&damage_color, 1.0 - ratio);
    }

    pub fn is_alive(&self) -> bool {
        self.health.is_none_or(|h| h.current > 0.0)
    }

    pub fn tick_cooldown(&mut self, dt: f32) {
        self.effect_cooldown -= dt;
    }
}
