//! Boundary between the simulation core and whatever draws it.
//!
//! The core only ever calls [`SceneRenderer`]; [`DrawList`] is the
//! implementation the Bevy scene layer consumes once per frame.

use bevy::color::Srgba;
use bevy::prelude::Resource;

/// Opaque id linking a body or effect to its scene object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneHandle(pub u64);

/// Draw-side collaborator of the simulation loop.
pub trait SceneRenderer<V> {
    /// Draw one live body: a disc in 2D, a sphere in 3D.
    fn draw_body(&mut self, handle: SceneHandle, position: V, radius: f32, color: Srgba);

    /// Draw one live effect at its current visual scale.
    fn draw_effect(&mut self, handle: SceneHandle, position: V, scale: f32, color: Srgba);

    /// The body or effect behind `handle` was destroyed.
    fn remove_from_scene(&mut self, handle: SceneHandle);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawKind {
    Body { radius: f32 },
    Effect { scale: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand<V> {
    pub handle: SceneHandle,
    pub kind: DrawKind,
    pub position: V,
    pub color: Srgba,
}

/// Recorded draw calls and removals for a single frame.
#[derive(Resource, Debug, Clone)]
pub struct DrawList<V: Send + Sync + 'static> {
    pub draws: Vec<DrawCommand<V>>,
    pub removed: Vec<SceneHandle>,
}

impl<V: Send + Sync + 'static> Default for DrawList<V> {
    fn default() -> Self {
        Self {
            draws: Vec::new(),
            removed: Vec::new(),
        }
    }
}

impl<V: Send + Sync + 'static> DrawList<V> {
    /// Drop the previous frame's commands, keeping allocations.
    pub fn clear(&mut self) {
        self.draws.clear();
        self.removed.clear();
    }

    pub fn bodies(&self) -> impl Iterator<Item = &DrawCommand<V>> {
        self.draws
            .iter()
            .filter(|c| matches!(c.kind, DrawKind::Body { .. }))
    }

    pub fn effects(&self) -> impl Iterator<Item = &DrawCommand<V>> {
        self.draws
            .iter()
            .filter(|c| matches!(c.kind, DrawKind::Effect { .. }))
    }
}

impl<V: Send + Sync + 'static> SceneRenderer<V> for DrawList<V> {
    fn draw_body(&mut self, handle: SceneHandle, position: V, radius: f32, color: Srgba) {
        self.draws.push(DrawCommand {
            handle,
            kind: DrawKind::Body { radius },
            position,
            color,
        });
    }

    fn draw_effect(&mut self, handle: SceneHandle, position: V, scale: f32, color: Srgba) {
        self.draws.push(DrawCommand {
            handle,
            kind: DrawKind::Effect { scale },
            position,
            color,
        });
    }

    fn remove_from_scene(&mut self, handle: SceneHandle) {
        self.removed.push(handle);
    }
}
