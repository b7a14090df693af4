//! Randomised body creation at the entry edge of the world box.

use crate::body::Body;
use crate::bounds::WorldBounds;
use crate::config::SimulationConfig;
use crate::constants::PASTEL_CHANNEL_MIN;
use crate::render::SceneHandle;
use crate::vector::{SimVector, VERTICAL_AXIS};
use bevy::color::Srgba;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Side of the vertical axis bodies enter from.
///
/// On the canvas +y points down, so discs enter at `Min` (the top); in the
/// 3D room +y points up, so spheres enter at `Max` (the ceiling).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpawnEdge {
    Min,
    Max,
}

impl SpawnEdge {
    /// Sign of the vertical velocity pointing into the box.
    pub fn inward(self) -> f32 {
        match self {
            SpawnEdge::Min => 1.0,
            SpawnEdge::Max => -1.0,
        }
    }
}

/// Owns the RNG and produces candidate bodies.
#[derive(Debug, Clone)]
pub struct Spawner {
    rng: StdRng,
}

impl Spawner {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// Uniform sample in `[lo, hi)`, or `lo` when the range is empty.
    fn sample(&mut self, lo: f32, hi: f32) -> f32 {
        if hi > lo {
            self.rng.gen_range(lo..hi)
        } else {
            lo
        }
    }

    fn pastel(&mut self) -> Srgba {
        Srgba::rgb(
            self.sample(PASTEL_CHANNEL_MIN, 1.0),
            self.sample(PASTEL_CHANNEL_MIN, 1.0),
            self.sample(PASTEL_CHANNEL_MIN, 1.0),
        )
    }

    /// Build a candidate body at the entry edge with a random radius, lateral
    /// position, velocity and colour. Admission (overlap rejection) is the
    /// caller's decision.
    pub fn candidate<V: SimVector>(
        &mut self,
        handle: SceneHandle,
        bounds: &WorldBounds<V>,
        config: &SimulationConfig,
    ) -> Body<V> {
        let radius = self.sample(config.radius_min, config.radius_max);

        let mut position = V::ZERO;
        let mut velocity = V::ZERO;
        for axis in 0..V::DIM {
            if axis == VERTICAL_AXIS {
                let jitter = self.sample(0.0, config.spawn_jitter);
                position[axis] = match config.spawn_edge {
                    SpawnEdge::Min => bounds.min[axis] - jitter,
                    SpawnEdge::Max => bounds.max[axis] + jitter,
                };
                velocity[axis] = config.spawn_edge.inward()
                    * self.sample(config.fall_speed_min, config.fall_speed_max);
            } else {
                let lo = bounds.min[axis] + radius;
                let hi = bounds.max[axis] - radius;
                position[axis] = if hi > lo {
                    self.sample(lo, hi)
                } else {
                    bounds.min[axis] + bounds.span(axis) / 2.0
                };
                velocity[axis] = self.sample(-config.lateral_speed, config.lateral_speed);
            }
        }

        let color = if config.pastel_bodies {
            self.pastel()
        } else {
            config.body_srgb()
        };

        let mut body = Body::new(handle, position, velocity, radius, color);
        if let Some(max) = config.max_health {
            body = body.with_health(max);
        }
        if !config.spawn_gate {
            body = body.already_spawned();
        }
        body
    }
}
