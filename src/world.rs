//! The frame loop: spawn, integrate, resolve, prune, draw.
//!
//! [`SimWorld`] exclusively owns every live body and effect. One call to
//! [`SimWorld::step`] runs a complete frame synchronously; nothing else
//! mutates the world in between.
//!
//! ## Frame order
//!
//! 1. Advance frame counter and clock
//! 2. Spawn wave every `spawn_interval_frames`
//! 3. Integrate all bodies, open spawn gates, tick effect cooldowns
//! 4. `resolution_passes` × (walls → collisions → overlap correction)
//! 5. Age and prune effects, prune dead bodies
//! 6. Draw bodies, then effects

use crate::body::Body;
use crate::bounds::WorldBounds;
use crate::collision::{correct_overlap, find_neighbors, resolve_collision, ImpactRules};
use crate::config::SimulationConfig;
use crate::effect::Effect;
use crate::error::SimResult;
use crate::render::{SceneHandle, SceneRenderer};
use crate::spawn::Spawner;
use crate::vector::SimVector;
use bevy::log::debug;
use bevy::prelude::Resource;

/// What happened during one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub spawned: usize,
    /// Candidates discarded for overlapping an existing body.
    pub rejected: usize,
    /// Contacts resolved across all passes.
    pub contacts: usize,
    pub effects_spawned: usize,
    pub bodies_pruned: usize,
    pub effects_pruned: usize,
}

#[derive(Resource, Debug)]
pub struct SimWorld<V: SimVector> {
    config: SimulationConfig,
    rules: ImpactRules,
    bounds: WorldBounds<V>,
    bodies: Vec<Body<V>>,
    effects: Vec<Effect<V>>,
    spawner: Spawner,
    frame: u64,
    elapsed: f32,
    next_handle: u64,
}

impl<V: SimVector> SimWorld<V> {
    /// Build an empty world. Fails if `config` does not validate, so a world
    /// never steps with a zero spawn interval or a non-positive radius.
    pub fn new(config: SimulationConfig, bounds: WorldBounds<V>) -> SimResult<Self> {
        config.validate()?;
        Ok(Self {
            rules: config.impact_rules(),
            spawner: Spawner::new(config.seed),
            config,
            bounds,
            bodies: Vec::new(),
            effects: Vec::new(),
            frame: 0,
            elapsed: 0.0,
            next_handle: 0,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn bounds(&self) -> &WorldBounds<V> {
        &self.bounds
    }

    /// Replace the bounds; the next resolution pass clamps against them.
    pub fn set_bounds(&mut self, bounds: WorldBounds<V>) {
        self.bounds = bounds;
    }

    pub fn bodies(&self) -> &[Body<V>] {
        &self.bodies
    }

    pub fn effects(&self) -> &[Effect<V>] {
        &self.effects
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Simulated seconds since the world was created.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    fn allocate_handle(&mut self) -> SceneHandle {
        let handle = SceneHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }

    /// Add a body built outside the spawner, e.g. a scripted scene.
    /// Its handle is replaced with a fresh one, which is returned.
    pub fn insert_body(&mut self, mut body: Body<V>) -> SceneHandle {
        body.handle = self.allocate_handle();
        let handle = body.handle;
        self.bodies.push(body);
        handle
    }

    /// Try to add one random body at the entry edge. Returns false when the
    /// candidate was rejected for overlapping an existing body.
    pub fn spawn_body(&mut self) -> bool {
        let handle = SceneHandle(self.next_handle);
        let candidate = self.spawner.candidate(handle, &self.bounds, &self.config);
        if self.config.reject_overlapping_spawns
            && self.bodies.iter().any(|other| candidate.overlaps(other))
        {
            debug!(
                "Rejected spawn at {:?}: overlaps an existing body",
                candidate.position
            );
            return false;
        }
        self.next_handle += 1;
        self.bodies.push(candidate);
        true
    }

    /// Run one full frame and hand the result to `renderer`.
    pub fn step(&mut self, renderer: &mut impl SceneRenderer<V>) -> FrameReport {
        let dt = self.config.step_dt;
        let mut report = FrameReport::default();

        self.frame += 1;
        self.elapsed += dt;

        if self.frame % self.config.spawn_interval_frames == 0 {
            for _ in 0..self.config.spawn_batch {
                if self.spawn_body() {
                    report.spawned += 1;
                } else {
                    report.rejected += 1;
                }
            }
        }

        for body in &mut self.bodies {
            body.integrate(dt, self.config.gravity);
            body.try_enter(&self.bounds);
            body.tick_cooldown(dt);
        }

        for _ in 0..self.config.resolution_passes {
            self.resolve_pass(&mut report);
        }

        let before = self.effects.len();
        self.effects.retain_mut(|effect| {
            let alive = effect.advance(dt);
            if !alive {
                renderer.remove_from_scene(effect.handle);
            }
            alive
        });
        report.effects_pruned = before - self.effects.len();

        let before = self.bodies.len();
        self.bodies.retain(|body| {
            let alive = body.is_alive();
            if !alive {
                renderer.remove_from_scene(body.handle);
            }
            alive
        });
        report.bodies_pruned = before - self.bodies.len();

        for body in &self.bodies {
            renderer.draw_body(body.handle, body.position, body.radius, body.color);
        }
        for effect in &self.effects {
            renderer.draw_effect(effect.handle, effect.position, effect.scale(), effect.color);
        }

        report
    }

    /// One wall + collision + overlap sweep over every body.
    fn resolve_pass(&mut self, report: &mut FrameReport) {
        let inward = self.config.spawn_edge.inward();
        for index in 0..self.bodies.len() {
            if !self.bodies[index].spawned {
                let body = &mut self.bodies[index];
                body.reflect_off_side_walls(&self.bounds);
                body.hold_at_exit_wall(&self.bounds, inward);
                continue;
            }
            let neighbors = find_neighbors(&self.bodies, index);
            self.bodies[index].reflect_off_walls(&self.bounds);

            let impacts = resolve_collision(&mut self.bodies, index, &neighbors, &self.rules);
            report.contacts += impacts.len();
            for impact in impacts.iter().filter(|impact| impact.emit_effect) {
                let handle = self.allocate_handle();
                self.effects.push(Effect::new(
                    handle,
                    impact.midpoint,
                    self.config.effect_size,
                    self.config.effect_growth,
                    self.config.effect_lifetime,
                    self.config.effect_srgb(),
                ));
                report.effects_spawned += 1;
            }

            correct_overlap(&mut self.bodies, index, &neighbors);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::DrawList;
    use bevy::color::Srgba;
    use bevy::math::{Vec2, Vec3};

    fn quiet_disc_config() -> SimulationConfig {
        SimulationConfig {
            seed: Some(11),
            // keep scripted scenes free of random arrivals
            spawn_interval_frames: u64::MAX,
            ..SimulationConfig::disc()
        }
    }

    fn canvas() -> WorldBounds<Vec2> {
        WorldBounds::new(Vec2::ZERO, Vec2::new(400.0, 300.0))
    }

    fn disc(position: Vec2, velocity: Vec2) -> Body<Vec2> {
        Body::new(SceneHandle(0), position, velocity, 10.0, Srgba::WHITE)
    }

    fn sphere_at(position: Vec3, velocity: Vec3) -> Body<Vec3> {
        Body::new(SceneHandle(0), position, velocity, 20.0, Srgba::WHITE)
    }

    #[test]
    fn invalid_config_is_refused() {
        let config = SimulationConfig {
            spawn_interval_frames: 0,
            ..SimulationConfig::disc()
        };
        assert!(SimWorld::new(config, canvas()).is_err());

        let config = SimulationConfig {
            radius_min: 0.0,
            ..SimulationConfig::disc()
        };
        assert!(SimWorld::new(config, canvas()).is_err());
    }

    #[test]
    fn spawns_a_wave_every_interval() {
        let config = SimulationConfig {
            seed: Some(5),
            ..SimulationConfig::disc()
        };
        let mut world = SimWorld::new(config, canvas()).expect("valid config");
        let mut draws = DrawList::<Vec2>::default();

        for _ in 0..59 {
            draws.clear();
            assert_eq!(world.step(&mut draws).spawned, 0);
        }
        draws.clear();
        let report = world.step(&mut draws);
        assert_eq!(report.spawned, 3);
        assert_eq!(world.bodies().len(), 3);
        assert_eq!(draws.bodies().count(), 3, "unspawned bodies are still drawn");
    }

    #[test]
    fn discs_persist_and_stay_inside_once_entered() {
        let config = SimulationConfig {
            seed: Some(8),
            ..SimulationConfig::disc()
        };
        let mut world = SimWorld::new(config, canvas()).expect("valid config");
        let mut draws = DrawList::<Vec2>::default();
        for _ in 0..1200 {
            draws.clear();
            let report = world.step(&mut draws);
            assert_eq!(report.bodies_pruned, 0);
        }
        assert_eq!(world.bodies().len(), 60);
        // corrections after a body's own wall check can nudge it past a wall
        // by a fraction of a radius; it is clamped again next frame
        let slack = 2.0 * world.config().radius_max;
        let bounds = *world.bounds();
        for body in world.bodies().iter().filter(|b| b.spawned) {
            assert!(body.position.is_finite());
            for axis in 0..2 {
                assert!(body.position[axis] >= bounds.min[axis] - slack);
                assert!(body.position[axis] <= bounds.max[axis] + slack);
            }
        }
        assert!(
            world.bodies().iter().filter(|b| b.spawned).count() >= 50,
            "most discs should have passed the spawn gate"
        );
    }

    #[test]
    fn head_on_pair_bounces_apart() {
        let mut world = SimWorld::new(quiet_disc_config(), canvas()).expect("valid config");
        world.insert_body(disc(Vec2::new(190.0, 150.0), Vec2::new(60.0, 0.0)).already_spawned());
        world.insert_body(disc(Vec2::new(210.0, 150.0), Vec2::new(-60.0, 0.0)).already_spawned());

        let mut draws = DrawList::<Vec2>::default();
        let report = world.step(&mut draws);

        assert!(report.contacts >= 1);
        let [a, b] = world.bodies() else {
            panic!("expected two bodies");
        };
        assert!(a.velocity.x < 0.0 && b.velocity.x > 0.0);
        assert!(a.distance_to(b) >= 20.0 - 1e-4);
    }

    #[test]
    fn shrinking_bounds_take_effect_next_step() {
        let mut world = SimWorld::new(quiet_disc_config(), canvas()).expect("valid config");
        world.insert_body(
            disc(Vec2::new(350.0, 100.0), Vec2::ZERO).already_spawned(),
        );
        world.set_bounds(WorldBounds::new(Vec2::ZERO, Vec2::new(200.0, 300.0)));
        world.step(&mut DrawList::default());
        assert_eq!(world.bodies()[0].position.x, 190.0);
    }

    #[test]
    fn battered_sphere_is_pruned_and_removed_from_scene() {
        let config = SimulationConfig {
            seed: Some(3),
            spawn_interval_frames: u64::MAX,
            gravity: 0.0,
            impact_damage_scale: 1.0,
            ..SimulationConfig::sphere()
        };
        let room = WorldBounds::new(Vec3::ZERO, Vec3::new(1000.0, 1000.0, 500.0));
        let mut world = SimWorld::new(config, room).expect("valid config");

        let sphere = |x: f32, vx: f32| {
            sphere_at(Vec3::new(x, 500.0, 250.0), Vec3::new(vx, 0.0, 0.0))
                .with_health(300.0)
                .already_spawned()
        };
        // 300 u/s against a resting sphere: one contact deals the whole pool.
        let hammer = world.insert_body(sphere(470.0, 300.0));
        let anvil = world.insert_body(sphere(505.0, 0.0));

        let mut draws = DrawList::<Vec3>::default();
        let report = world.step(&mut draws);

        assert_eq!(report.bodies_pruned, 2);
        assert!(world.bodies().is_empty());
        assert!(draws.removed.contains(&hammer));
        assert!(draws.removed.contains(&anvil));
        assert_eq!(draws.bodies().count(), 0, "pruned bodies are not drawn");
        assert_eq!(report.effects_spawned, 1);
        assert_eq!(draws.effects().count(), 1);
    }

    #[test]
    fn effects_expire_after_their_lifetime() {
        let config = SimulationConfig {
            seed: Some(4),
            spawn_interval_frames: u64::MAX,
            gravity: 0.0,
            impact_damage_scale: 0.0,
            ..SimulationConfig::sphere()
        };
        let room = WorldBounds::new(Vec3::ZERO, Vec3::new(1000.0, 1000.0, 500.0));
        let mut world = SimWorld::new(config, room).expect("valid config");
        world.insert_body(
            sphere_at(Vec3::new(480.0, 500.0, 250.0), Vec3::new(60.0, 0.0, 0.0)).already_spawned(),
        );
        world.insert_body(
            sphere_at(Vec3::new(515.0, 500.0, 250.0), Vec3::new(-60.0, 0.0, 0.0)).already_spawned(),
        );

        let mut draws = DrawList::<Vec3>::default();
        world.step(&mut draws);
        assert_eq!(world.effects().len(), 1);
        let ring = world.effects()[0].handle;

        let mut removed_at = None;
        for frame in 2..=60 {
            draws.clear();
            world.step(&mut draws);
            if draws.removed.contains(&ring) {
                removed_at = Some(frame);
                break;
            }
        }
        // 0.5 s lifetime at 60 fps
        assert!(matches!(removed_at, Some(30..=31)), "removed at {removed_at:?}");
    }

    #[test]
    fn overlapping_candidates_are_rejected() {
        let config = SimulationConfig {
            seed: Some(6),
            spawn_interval_frames: u64::MAX,
            radius_min: 50.0,
            radius_max: 50.0001,
            ..SimulationConfig::sphere()
        };
        // room barely wider than one sphere: every candidate lands in the same spot
        let room = WorldBounds::new(Vec3::ZERO, Vec3::new(100.0, 400.0, 100.0));
        let mut world = SimWorld::new(config, room).expect("valid config");
        assert!(world.spawn_body());
        assert!(!world.spawn_body());
        assert_eq!(world.bodies().len(), 1);
    }

    #[test]
    fn entering_discs_skip_collisions_with_live_ones() {
        let mut world = SimWorld::new(quiet_disc_config(), canvas()).expect("valid config");
        world.insert_body(disc(Vec2::new(200.0, 12.0), Vec2::new(60.0, 0.0)).already_spawned());
        // still poking out of the top edge, overlapping the live disc
        world.insert_body(disc(Vec2::new(205.0, 0.0), Vec2::new(0.0, 60.0)));

        let report = world.step(&mut DrawList::default());

        let [live, entering] = world.bodies() else {
            panic!("expected two bodies");
        };
        assert!(!entering.spawned);
        assert!(live.overlaps(entering));
        assert_eq!(report.contacts, 0);
        assert_eq!(live.velocity, Vec2::new(60.0, 0.0));
        assert_eq!(entering.velocity, Vec2::new(0.0, 60.0));
        assert!(live.position.distance(Vec2::new(201.0, 12.0)) < 1e-4);
    }

    #[test]
    fn discs_entering_a_collapsed_canvas_arrive_after_it_recovers() {
        let mut world = SimWorld::new(quiet_disc_config(), canvas()).expect("valid config");
        world.set_bounds(WorldBounds::new(Vec2::ZERO, Vec2::new(400.0, 0.0)));
        for _ in 0..3 {
            assert!(world.spawn_body());
        }

        let mut draws = DrawList::<Vec2>::default();
        for _ in 0..120 {
            draws.clear();
            world.step(&mut draws);
        }
        for body in world.bodies() {
            assert!(!body.spawned, "no disc fits a zero-height canvas");
            assert!(body.position.y <= 0.0, "disc fell through at y={}", body.position.y);
        }

        world.set_bounds(canvas());
        for _ in 0..120 {
            draws.clear();
            world.step(&mut draws);
        }
        for body in world.bodies() {
            assert!(body.spawned, "disc {:?} never entered", body.handle);
            assert!(body.position.y <= world.bounds().max.y + body.radius);
        }
    }
}
