//! Centralised simulation constants.
//!
//! These are the compiled defaults behind [`crate::config::SimulationConfig`].
//! Velocities are world units per second; the browser toy these presets are
//! tuned after moved bodies once per frame at 60 fps, so per-frame values are
//! multiplied by 60 (accelerations by 60²).

// ── Loop ──────────────────────────────────────────────────────────────────────

/// Fixed simulated time advanced per rendered frame (seconds).
pub const STEP_DT: f32 = 1.0 / 60.0;

/// Frames between spawn waves.
pub const SPAWN_INTERVAL_FRAMES: u64 = 60;

/// Bodies attempted per spawn wave.
pub const SPAWN_BATCH: usize = 3;

/// Wall + collision + overlap passes per frame.
///
/// One pass leaves residual overlap in stacks of three or more bodies; three
/// settles a resting pile without visible jitter.
pub const RESOLUTION_PASSES: usize = 3;

// ── Window ────────────────────────────────────────────────────────────────────

pub const WINDOW_WIDTH: u32 = 1200;
pub const WINDOW_HEIGHT: u32 = 680;

// ── Disc (2D) ─────────────────────────────────────────────────────────────────

/// Pixels trimmed off the window on each axis to form the canvas.
pub const DISC_SURFACE_MARGIN: f32 = 64.0;
pub const DISC_RADIUS_MIN: f32 = 10.0;
pub const DISC_RADIUS_MAX: f32 = 20.0;

/// How far above the top edge a disc may appear.
pub const DISC_SPAWN_JITTER: f32 = 30.0;

/// Horizontal speed range is ±this (u/s).
pub const DISC_LATERAL_SPEED: f32 = 120.0;
pub const DISC_FALL_SPEED_MIN: f32 = 60.0;
pub const DISC_FALL_SPEED_MAX: f32 = 300.0;

// ── Sphere (3D) ───────────────────────────────────────────────────────────────

/// Fixed depth of the room along z.
pub const SPHERE_DEPTH: f32 = 500.0;
pub const SPHERE_RADIUS_MIN: f32 = 20.0;
pub const SPHERE_RADIUS_MAX: f32 = 60.0;
pub const SPHERE_LATERAL_SPEED: f32 = 120.0;
pub const SPHERE_FALL_SPEED_MIN: f32 = 60.0;
pub const SPHERE_FALL_SPEED_MAX: f32 = 300.0;

/// Downward acceleration (u/s²). 0.1 u/frame².
pub const SPHERE_GRAVITY: f32 = 360.0;

pub const SPHERE_MAX_HEALTH: f32 = 300.0;

/// Converts the `|v1| - |v2|` speed difference (u/s) back to per-frame units,
/// so a 300-point pool lasts as long as it did at 60 fps.
pub const IMPACT_DAMAGE_SCALE: f32 = 1.0 / 60.0;

/// Lower bound of each pastel colour channel; the upper bound is 1.0.
pub const PASTEL_CHANNEL_MIN: f32 = 0.5;

// ── Effects ───────────────────────────────────────────────────────────────────

/// Seconds a sphere waits before emitting another collision ring.
pub const EFFECT_COOLDOWN: f32 = 1.0;
pub const EFFECT_LIFETIME: f32 = 0.5;
pub const EFFECT_SIZE: f32 = 1.0;

/// Final ring scale as a multiple of `EFFECT_SIZE`.
pub const EFFECT_GROWTH: f32 = 50.0;

// ── Colours (sRGB triples) ────────────────────────────────────────────────

pub const BODY_COLOR: [f32; 3] = [1.0, 1.0, 1.0];
pub const DAMAGE_COLOR: [f32; 3] = [1.0, 0.0, 0.0];
pub const EFFECT_COLOR: [f32; 3] = [1.0, 0.0, 0.0];

// ── Camera (3D) ───────────────────────────────────────────────────────────────

/// Camera distance from the room's front plane.
pub const CAMERA_DISTANCE: f32 = 1100.0;
