//! Scene layer: turns each frame's [`DrawList`] into retained Bevy entities.
//!
//! Every body and effect owns one mesh entity keyed by its [`SceneHandle`].
//! Draw calls create the entity on first sight and update its transform and
//! colour afterwards; `remove_from_scene` despawns it and frees its material.
//!
//! | Object        | 2D (canvas)                  | 3D (room)                      |
//! |---------------|------------------------------|--------------------------------|
//! | Body          | `Mesh2d` unit disc           | `Mesh3d` unit sphere, unlit    |
//! | Effect        | `Mesh2d` thin annulus        | `Mesh3d` torus facing camera   |
//!
//! Meshes are unit-sized and shared; radius and effect scale go into
//! `Transform::scale`. Each entity has its own material so colours can change
//! independently as bodies take damage.

use crate::config::{load_simulation_config, Variant};
use crate::graphics::{frame_room_system, setup_camera};
use crate::render::{DrawCommand, DrawKind, DrawList, SceneHandle};
use crate::simulation::SimulationSet;
use crate::world::SimWorld;
use bevy::prelude::*;
use bevy_asset::RenderAssetUsages;
use bevy_mesh::{Indices, PrimitiveTopology};
use std::collections::HashMap;
use std::f32::consts::FRAC_PI_2;

/// Segments in the body disc outline.
const DISC_SIDES: u32 = 48;

/// Effects draw in front of bodies on the canvas.
const EFFECT_LAYER_Z: f32 = 1.0;

/// Tags an entity mirroring a simulation body or effect.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneObject(pub SceneHandle);

/// Live scene entities by simulation handle.
#[derive(Resource, Debug, Default)]
pub struct SceneEntities(pub HashMap<SceneHandle, Entity>);

/// Shared unit meshes, created once at startup.
#[derive(Resource)]
pub struct SceneMeshes {
    pub body: Handle<Mesh>,
    pub effect: Handle<Mesh>,
}

pub struct ScenePlugin {
    pub variant: Variant,
}

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SceneEntities>()
            .insert_resource(ClearColor(Color::BLACK))
            .add_systems(Startup, setup_camera.after(load_simulation_config));
        match self.variant {
            Variant::Disc => {
                app.add_systems(Startup, init_disc_meshes).add_systems(
                    Update,
                    sync_disc_scene_system.after(SimulationSet::Step),
                );
            }
            Variant::Sphere => {
                app.add_systems(Startup, init_sphere_meshes).add_systems(
                    Update,
                    (sync_sphere_scene_system, frame_room_system).after(SimulationSet::Step),
                );
            }
        }
    }
}

// ── Startup systems ───────────────────────────────────────────────────────────

fn init_disc_meshes(mut commands: Commands, mut meshes: ResMut<Assets<Mesh>>) {
    commands.insert_resource(SceneMeshes {
        body: meshes.add(disc_mesh(1.0, DISC_SIDES)),
        effect: meshes.add(Annulus::new(0.9, 1.0)),
    });
}

fn init_sphere_meshes(mut commands: Commands, mut meshes: ResMut<Assets<Mesh>>) {
    commands.insert_resource(SceneMeshes {
        body: meshes.add(Sphere::new(1.0)),
        effect: meshes.add(Torus {
            minor_radius: 0.1,
            major_radius: 1.0,
        }),
    });
}

// ── Coordinate mapping ────────────────────────────────────────────────────────

/// Canvas (top-left origin, +y down) to the centred, y-up 2D camera space.
fn canvas_to_screen(position: Vec2, canvas_size: Vec2, z: f32) -> Vec3 {
    Vec3::new(
        position.x - canvas_size.x / 2.0,
        canvas_size.y / 2.0 - position.y,
        z,
    )
}

fn draw_scale(kind: DrawKind) -> f32 {
    match kind {
        DrawKind::Body { radius } => radius,
        DrawKind::Effect { scale } => scale,
    }
}

// ── Update systems ────────────────────────────────────────────────────────────

/// Mirror the disc world's draw list onto `Mesh2d` entities.
pub fn sync_disc_scene_system(
    mut commands: Commands,
    draws: Res<DrawList<Vec2>>,
    world: Res<SimWorld<Vec2>>,
    meshes: Res<SceneMeshes>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    mut entities: ResMut<SceneEntities>,
    mut objects: Query<(&mut Transform, &MeshMaterial2d<ColorMaterial>), With<SceneObject>>,
) {
    for handle in &draws.removed {
        let Some(entity) = entities.0.remove(handle) else {
            continue;
        };
        if let Ok((_, material)) = objects.get(entity) {
            materials.remove(&material.0);
        }
        commands.entity(entity).despawn();
    }

    let bounds = world.bounds();
    let canvas_size = Vec2::new(bounds.span(0), bounds.span(1));

    for command in &draws.draws {
        let DrawCommand {
            handle,
            kind,
            position,
            color,
        } = *command;
        let z = match kind {
            DrawKind::Body { .. } => 0.0,
            DrawKind::Effect { .. } => EFFECT_LAYER_Z,
        };
        let transform = Transform::from_translation(canvas_to_screen(position, canvas_size, z))
            .with_scale(Vec3::splat(draw_scale(kind)));

        if let Some(&entity) = entities.0.get(&handle) {
            if let Ok((mut current, material)) = objects.get_mut(entity) {
                *current = transform;
                if let Some(mat) = materials.get_mut(&material.0) {
                    mat.color = Color::from(color);
                }
            }
            continue;
        }

        let mesh = match kind {
            DrawKind::Body { .. } => meshes.body.clone(),
            DrawKind::Effect { .. } => meshes.effect.clone(),
        };
        let material = materials.add(ColorMaterial::from_color(color));
        let entity = commands
            .spawn((SceneObject(handle), Mesh2d(mesh), MeshMaterial2d(material), transform))
            .id();
        entities.0.insert(handle, entity);
    }
}

/// Mirror the sphere world's draw list onto unlit `Mesh3d` entities.
pub fn sync_sphere_scene_system(
    mut commands: Commands,
    draws: Res<DrawList<Vec3>>,
    meshes: Res<SceneMeshes>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut entities: ResMut<SceneEntities>,
    mut objects: Query<(&mut Transform, &MeshMaterial3d<StandardMaterial>), With<SceneObject>>,
) {
    for handle in &draws.removed {
        let Some(entity) = entities.0.remove(handle) else {
            continue;
        };
        if let Ok((_, material)) = objects.get(entity) {
            materials.remove(&material.0);
        }
        commands.entity(entity).despawn();
    }

    for command in &draws.draws {
        let DrawCommand {
            handle,
            kind,
            position,
            color,
        } = *command;
        let mut transform =
            Transform::from_translation(position).with_scale(Vec3::splat(draw_scale(kind)));
        if let DrawKind::Effect { .. } = kind {
            // Torus lies in XZ; stand it up to face the camera down -z.
            transform.rotation = Quat::from_rotation_x(FRAC_PI_2);
        }

        if let Some(&entity) = entities.0.get(&handle) {
            if let Ok((mut current, material)) = objects.get_mut(entity) {
                *current = transform;
                if let Some(mat) = materials.get_mut(&material.0) {
                    mat.base_color = Color::from(color);
                }
            }
            continue;
        }

        let mesh = match kind {
            DrawKind::Body { .. } => meshes.body.clone(),
            DrawKind::Effect { .. } => meshes.effect.clone(),
        };
        let material = materials.add(StandardMaterial {
            base_color: Color::from(color),
            unlit: true,
            double_sided: true,
            cull_mode: None,
            ..default()
        });
        let entity = commands
            .spawn((SceneObject(handle), Mesh3d(mesh), MeshMaterial3d(material), transform))
            .id();
        entities.0.insert(handle, entity);
    }
}

// ── Mesh helpers ──────────────────────────────────────────────────────────────

/// Filled regular polygon approximating a disc, centred at the origin.
fn disc_mesh(radius: f32, sides: u32) -> Mesh {
    let n = sides as usize;
    let mut positions: Vec<[f32; 3]> = Vec::with_capacity(n + 1);
    let mut normals: Vec<[f32; 3]> = Vec::with_capacity(n + 1);
    let mut uvs: Vec<[f32; 2]> = Vec::with_capacity(n + 1);

    positions.push([0.0, 0.0, 0.0]);
    normals.push([0.0, 0.0, 1.0]);
    uvs.push([0.5, 0.5]);

    for i in 0..n {
        let angle = std::f32::consts::TAU * i as f32 / n as f32;
        let (sin, cos) = angle.sin_cos();
        positions.push([radius * cos, radius * sin, 0.0]);
        normals.push([0.0, 0.0, 1.0]);
        uvs.push([cos * 0.5 + 0.5, sin * 0.5 + 0.5]);
    }

    let mut indices: Vec<u32> = Vec::with_capacity(n * 3);
    for i in 0..sides {
        // fan around the centre vertex; rim vertices are 1..=n
        indices.extend_from_slice(&[0, i + 1, (i + 1) % sides + 1]);
    }

    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD,
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh.insert_indices(Indices::U32(indices));
    mesh
}
