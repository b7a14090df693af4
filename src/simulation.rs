//! Simulation plugin and systems for Bevy ECS.
//!
//! The plugin owns no physics of its own: each `Update` it pushes the live
//! window size into [`SimWorld`] and runs exactly one [`SimWorld::step`],
//! recording draw calls into a [`DrawList`] for the scene layer.
//!
//! | System                  | Schedule | Purpose                                   |
//! |-------------------------|----------|-------------------------------------------|
//! | `load_simulation_config`| Startup  | Overlay `assets/reflection.toml`          |
//! | `init_world_system`     | Startup  | Build the world from the final config     |
//! | `sync_bounds_system`    | Update   | Re-derive bounds from the primary window  |
//! | `step_world_system`     | Update   | One frame: spawn, resolve, prune, draw    |

use crate::bounds::SurfaceBounds;
use crate::config::{load_simulation_config, ConfigSource, SimulationConfig, Variant};
use crate::render::DrawList;
use crate::world::{FrameReport, SimWorld};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

/// Ordering anchor: everything that reads this frame's [`DrawList`] runs after it.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    Step,
}

/// Running totals since startup, read by the per-frame debug log and by tests.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct SimulationStats {
    pub frames: u64,
    pub live_bodies: usize,
    pub live_effects: usize,
    pub spawned: usize,
    pub rejected: usize,
    pub contacts: usize,
    pub effects_spawned: usize,
    pub bodies_pruned: usize,
    pub effects_pruned: usize,
}

impl SimulationStats {
    fn record(&mut self, report: &FrameReport, live_bodies: usize, live_effects: usize) {
        self.frames += 1;
        self.live_bodies = live_bodies;
        self.live_effects = live_effects;
        self.spawned += report.spawned;
        self.rejected += report.rejected;
        self.contacts += report.contacts;
        self.effects_spawned += report.effects_spawned;
        self.bodies_pruned += report.bodies_pruned;
        self.effects_pruned += report.effects_pruned;
    }
}

pub struct SimulationPlugin {
    pub variant: Variant,
    /// Config file to overlay at startup; `None` keeps whatever
    /// `SimulationConfig` is already present (or the variant preset).
    pub config_path: Option<String>,
}

impl SimulationPlugin {
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            config_path: None,
        }
    }

    pub fn with_config_path(mut self, path: impl Into<String>) -> Self {
        self.config_path = Some(path.into());
        self
    }
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<SimulationConfig>() {
            app.insert_resource(self.variant.preset());
        }
        app.insert_resource(self.variant)
            .insert_resource(ConfigSource(self.config_path.clone()))
            .init_resource::<SimulationStats>()
            .add_systems(Startup, load_simulation_config);

        match self.variant {
            Variant::Disc => add_variant_systems::<Vec2>(app),
            Variant::Sphere => add_variant_systems::<Vec3>(app),
        }
    }
}

fn add_variant_systems<V: SurfaceBounds>(app: &mut App) {
    app.init_resource::<DrawList<V>>()
        .add_systems(
            Startup,
            init_world_system::<V>.after(load_simulation_config),
        )
        .add_systems(
            Update,
            (sync_bounds_system::<V>, step_world_system::<V>)
                .chain()
                .in_set(SimulationSet::Step),
        );
}

/// Startup system: build the world from the loaded config, sized to the
/// configured window until the first bounds sync.
///
/// A config that fails validation (for example one inserted by hand before
/// the plugin) is logged and replaced by the variant preset.
pub fn init_world_system<V: SurfaceBounds>(
    mut commands: Commands,
    variant: Res<Variant>,
    mut config: ResMut<SimulationConfig>,
) {
    if let Err(e) = config.validate() {
        warn!("{e}; using compiled {} preset", variant.table_name());
        *config = variant.preset();
    }
    let bounds = V::from_surface(
        config.window_width as f32,
        config.window_height as f32,
        config.surface_margin,
        config.depth,
    );
    match SimWorld::new(config.clone(), bounds) {
        Ok(world) => {
            info!(
                "Starting {} simulation in {:?}..{:?}",
                variant.table_name(),
                bounds.min,
                bounds.max
            );
            commands.insert_resource(world);
        }
        Err(e) => error!("Cannot start {} simulation: {e}", variant.table_name()),
    }
}

/// Re-derive the bounds from the primary window every frame so a resize takes
/// effect on the very next resolution pass. Headless apps keep their bounds.
pub fn sync_bounds_system<V: SurfaceBounds>(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut world: ResMut<SimWorld<V>>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let config = world.config();
    let bounds = V::from_surface(
        window.width(),
        window.height(),
        config.surface_margin,
        config.depth,
    );
    if bounds != *world.bounds() {
        debug!("Surface resized; bounds now {:?}..{:?}", bounds.min, bounds.max);
        world.set_bounds(bounds);
    }
}

/// Advance the world by one frame and record its draw calls.
pub fn step_world_system<V: SurfaceBounds>(
    mut world: ResMut<SimWorld<V>>,
    mut draws: ResMut<DrawList<V>>,
    mut stats: ResMut<SimulationStats>,
) {
    draws.clear();
    let report = world.step(&mut *draws);
    stats.record(&report, world.bodies().len(), world.effects().len());

    if report.spawned + report.rejected + report.bodies_pruned > 0 {
        debug!(
            "Frame {}: +{} bodies, {} rejected, {} pruned, {} live",
            world.frame(),
            report.spawned,
            report.rejected,
            report.bodies_pruned,
            stats.live_bodies
        );
    }
}
