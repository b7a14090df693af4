use bevy::prelude::*;
use bevy::window::WindowResolution;
use reflection_balls::config::{Variant, CONFIG_PATH};
use reflection_balls::constants::{WINDOW_HEIGHT, WINDOW_WIDTH};
use reflection_balls::rendering::ScenePlugin;
use reflection_balls::simulation::SimulationPlugin;

fn main() {
    // REFLECTION_VARIANT=sphere (or 3d) selects the room; anything unset runs discs
    let variant = Variant::from_env().unwrap_or_else(|e| {
        eprintln!("{e}; falling back to {}", Variant::Disc.table_name());
        Variant::Disc
    });

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Reflection Balls".into(),
                resolution: WindowResolution::new(WINDOW_WIDTH, WINDOW_HEIGHT),
                ..Default::default()
            }),
            ..Default::default()
        }))
        // SimulationPlugin inserts the compiled preset; assets/reflection.toml
        // overrides it in the Startup schedule before the world is built.
        .add_plugins(SimulationPlugin::new(variant).with_config_path(CONFIG_PATH))
        .add_plugins(ScenePlugin { variant })
        .run();
}
