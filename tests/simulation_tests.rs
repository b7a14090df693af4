//! Headless tests for [`SimulationPlugin`].
//!
//! These use [`MinimalPlugins`]: no window, no renderer, no scene layer. The
//! bounds therefore stay at the configured window size for the whole run.
//!
//! Covered scenarios:
//! 1. The first wave lands on frame 60 and is recorded in the draw list.
//! 2. A pre-inserted config survives plugin setup when no file is given.
//! 3. Sphere stats stay consistent over a long run (live = spawned - pruned).
//! 4. A missing config file keeps the compiled preset.
//! 5. A pre-inserted config that fails validation falls back to the preset.

use bevy::prelude::*;
use reflection_balls::config::{SimulationConfig, Variant};
use reflection_balls::render::DrawList;
use reflection_balls::simulation::{SimulationPlugin, SimulationStats};
use reflection_balls::world::SimWorld;

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Headless app running `variant` from `config`, with no config file overlay.
fn headless_app(variant: Variant, config: SimulationConfig) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.insert_resource(config);
    app.add_plugins(SimulationPlugin::new(variant));
    app
}

fn run_frames(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn first_disc_wave_arrives_on_frame_sixty() {
    let config = SimulationConfig {
        seed: Some(3),
        ..SimulationConfig::disc()
    };
    let mut app = headless_app(Variant::Disc, config);

    run_frames(&mut app, 59);
    assert!(
        app.world().resource::<SimWorld<Vec2>>().bodies().is_empty(),
        "nothing spawns before the first interval"
    );

    app.update();
    let world = app.world().resource::<SimWorld<Vec2>>();
    let stats = app.world().resource::<SimulationStats>();
    assert_eq!(world.frame(), 60);
    assert_eq!(stats.frames, 60);
    assert_eq!(stats.spawned + stats.rejected, 3, "one batch of candidates");
    assert_eq!(world.bodies().len(), stats.spawned);

    let draws = app.world().resource::<DrawList<Vec2>>();
    assert_eq!(draws.bodies().count(), world.bodies().len());
}

#[test]
fn preinserted_config_is_kept_without_a_file() {
    let config = SimulationConfig {
        seed: Some(8),
        spawn_batch: 1,
        spawn_interval_frames: 10,
        reject_overlapping_spawns: false,
        ..SimulationConfig::disc()
    };
    let mut app = headless_app(Variant::Disc, config.clone());
    run_frames(&mut app, 30);

    let world = app.world().resource::<SimWorld<Vec2>>();
    assert_eq!(world.config(), &config);
    assert_eq!(world.bodies().len(), 3, "one body per ten frames");
}

#[test]
fn sphere_stats_stay_consistent() {
    let config = SimulationConfig {
        seed: Some(21),
        ..SimulationConfig::sphere()
    };
    let mut app = headless_app(Variant::Sphere, config);
    run_frames(&mut app, 900);

    let world = app.world().resource::<SimWorld<Vec3>>();
    let stats = app.world().resource::<SimulationStats>();
    assert_eq!(stats.frames, 900);
    assert_eq!(stats.live_bodies, world.bodies().len());
    assert_eq!(stats.live_effects, world.effects().len());
    assert_eq!(stats.live_bodies, stats.spawned - stats.bodies_pruned);
    assert_eq!(
        stats.live_effects,
        stats.effects_spawned - stats.effects_pruned
    );
    for body in world.bodies() {
        assert!(body.position.is_finite(), "body {:?} went non-finite", body.handle);
        assert!(body.is_alive(), "dead bodies are pruned in the same frame");
    }
}

#[test]
fn missing_config_file_keeps_the_preset() {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(
        SimulationPlugin::new(Variant::Sphere).with_config_path("does/not/exist.toml"),
    );
    app.update();

    let world = app.world().resource::<SimWorld<Vec3>>();
    assert_eq!(world.config(), &SimulationConfig::sphere());
}

#[test]
fn invalid_preinserted_config_falls_back_to_the_preset() {
    let config = SimulationConfig {
        spawn_interval_frames: 0,
        radius_min: 0.0,
        ..SimulationConfig::disc()
    };
    let mut app = headless_app(Variant::Disc, config);
    run_frames(&mut app, 60);

    let world = app.world().resource::<SimWorld<Vec2>>();
    assert_eq!(world.config(), &SimulationConfig::disc());
    assert_eq!(world.frame(), 60, "the world keeps stepping");
    assert_eq!(
        app.world().resource::<SimulationConfig>(),
        &SimulationConfig::disc(),
        "the resource is corrected too"
    );
}
