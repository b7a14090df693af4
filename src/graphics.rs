use crate::config::{SimulationConfig, Variant};
use crate::constants::CAMERA_DISTANCE;
use crate::world::SimWorld;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

/// Vertical field of view of the room camera, in degrees.
const ROOM_FOV_DEGREES: f32 = 80.0;

const ROOM_FAR_PLANE: f32 = 5000.0;

/// Marks the perspective camera looking into the sphere room.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct RoomCamera;

/// In front of the room, level with `eye_height`, looking straight in.
fn room_camera_transform(eye_height: f32) -> Transform {
    Transform::from_xyz(0.0, eye_height, CAMERA_DISTANCE)
        .looking_at(Vec3::new(0.0, eye_height, 0.0), Vec3::Y)
}

/// Spawn the camera matching the active variant.
pub fn setup_camera(
    mut commands: Commands,
    variant: Res<Variant>,
    config: Res<SimulationConfig>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    match *variant {
        Variant::Disc => {
            // Default Camera2d maps one world unit to one logical pixel around the centre
            commands.spawn(Camera2d);
        }
        Variant::Sphere => {
            let room_height = windows
                .single()
                .map(|window| window.height())
                .unwrap_or(config.window_height as f32);
            commands.spawn((
                RoomCamera,
                Camera3d::default(),
                Projection::from(PerspectiveProjection {
                    fov: ROOM_FOV_DEGREES.to_radians(),
                    far: ROOM_FAR_PLANE,
                    ..default()
                }),
                room_camera_transform(room_height / 2.0),
            ));
        }
    }
    info!("[SETUP] {} camera spawned", variant.table_name());
}

/// Re-aim the room camera when the room's height changes with the window.
pub fn frame_room_system(
    world: Res<SimWorld<Vec3>>,
    mut cameras: Query<&mut Transform, With<RoomCamera>>,
) {
    let bounds = world.bounds();
    let eye_height = (bounds.min.y + bounds.max.y) / 2.0;
    for mut transform in &mut cameras {
        if transform.translation.y != eye_height {
            *transform = room_camera_transform(eye_height);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::WorldBounds;

    #[test]
    fn room_camera_follows_the_room_height() {
        let room = WorldBounds::new(Vec3::new(-300.0, 0.0, 0.0), Vec3::new(300.0, 400.0, 500.0));
        let world = SimWorld::new(SimulationConfig::sphere(), room).expect("valid config");

        let mut app = App::new();
        app.insert_resource(world);
        app.add_systems(Update, frame_room_system);
        let camera = app
            .world_mut()
            .spawn((RoomCamera, room_camera_transform(340.0)))
            .id();

        app.update();

        let transform = app.world().get::<Transform>(camera).copied();
        let Some(transform) = transform else {
            panic!("camera lost its transform");
        };
        assert_eq!(transform.translation, Vec3::new(0.0, 200.0, CAMERA_DISTANCE));
        let forward = transform.forward();
        assert!(forward.dot(Vec3::NEG_Z) > 0.999, "camera must look straight in");
    }
}
