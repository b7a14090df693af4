//! Runtime simulation configuration loaded from `assets/reflection.toml`.
//!
//! [`SimulationConfig`] is a Bevy [`Resource`] whose defaults come from
//! [`crate::constants`]. Each variant has its own preset
//! ([`SimulationConfig::disc`], [`SimulationConfig::sphere`]); the file holds
//! one table per variant and any key present there overrides the preset:
//!
//! ```toml
//! [disc]
//! spawn_batch = 5
//!
//! [sphere]
//! gravity = 200.0
//! seed = 42
//! ```
//!
//! A missing file or table keeps the preset. Parse and validation failures are
//! logged and also keep the preset; they never abort the simulation.

use crate::collision::ImpactRules;
use crate::constants::*;
use crate::error::{ensure_non_negative, ensure_positive, SimError, SimResult};
use crate::spawn::SpawnEdge;
use bevy::color::Srgba;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Default config path, relative to the working directory.
pub const CONFIG_PATH: &str = "assets/reflection.toml";

/// Which of the two simulations to run.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Variant {
    /// 2D discs on a canvas.
    #[default]
    Disc,
    /// 3D spheres in a room, with gravity, health and collision effects.
    Sphere,
}

impl Variant {
    /// Environment variable consulted by [`Variant::from_env`].
    pub const ENV_VAR: &'static str = "REFLECTION_VARIANT";

    pub fn from_name(name: &str) -> SimResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "disc" | "2d" => Ok(Variant::Disc),
            "sphere" | "3d" => Ok(Variant::Sphere),
            other => Err(SimError::UnknownVariant(other.to_string())),
        }
    }

    /// Variant named by `REFLECTION_VARIANT`, or [`Variant::Disc`] when unset.
    pub fn from_env() -> SimResult<Self> {
        match std::env::var(Self::ENV_VAR) {
            Ok(name) => Self::from_name(&name),
            Err(_) => Ok(Variant::default()),
        }
    }

    /// Key of this variant's table in the config file.
    pub fn table_name(self) -> &'static str {
        match self {
            Variant::Disc => "disc",
            Variant::Sphere => "sphere",
        }
    }

    pub fn preset(self) -> SimulationConfig {
        match self {
            Variant::Disc => SimulationConfig::disc(),
            Variant::Sphere => SimulationConfig::sphere(),
        }
    }
}

/// Runtime-tunable simulation parameters.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // ── Loop ─────────────────────────────────────────────────────────────────
    pub step_dt: f32,
    pub spawn_interval_frames: u64,
    pub spawn_batch: usize,
    pub resolution_passes: usize,
    /// Fixed RNG seed; `None` seeds from entropy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    // ── Surface ──────────────────────────────────────────────────────────────
    pub window_width: u32,
    pub window_height: u32,
    pub surface_margin: f32,
    /// Extent of the z axis (3D only).
    pub depth: f32,

    // ── Motion ───────────────────────────────────────────────────────────────
    pub gravity: f32,
    pub radius_min: f32,
    pub radius_max: f32,
    pub spawn_edge: SpawnEdge,
    pub spawn_jitter: f32,
    pub lateral_speed: f32,
    pub fall_speed_min: f32,
    pub fall_speed_max: f32,

    // ── Spawn admission ──────────────────────────────────────────────────────
    /// Hold new bodies out of collisions until fully inside the bounds.
    pub spawn_gate: bool,
    /// Discard a new body that would overlap an existing one.
    pub reject_overlapping_spawns: bool,

    // ── Health ───────────────────────────────────────────────────────────────
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_health: Option<f32>,
    pub impact_damage_scale: f32,

    // ── Colours ──────────────────────────────────────────────────────────────
    pub body_color: [f32; 3],
    pub pastel_bodies: bool,
    pub damage_color: [f32; 3],

    // ── Effects ──────────────────────────────────────────────────────────────
    pub effects: bool,
    pub effect_cooldown: f32,
    pub effect_lifetime: f32,
    pub effect_size: f32,
    pub effect_growth: f32,
    pub effect_color: [f32; 3],
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::disc()
    }
}

impl SimulationConfig {
    /// 2D canvas preset: white discs dropping in from the top, no gravity,
    /// no health, never removed.
    pub fn disc() -> Self {
        Self {
            step_dt: STEP_DT,
            spawn_interval_frames: SPAWN_INTERVAL_FRAMES,
            spawn_batch: SPAWN_BATCH,
            resolution_passes: RESOLUTION_PASSES,
            seed: None,
            window_width: WINDOW_WIDTH,
            window_height: WINDOW_HEIGHT,
            surface_margin: DISC_SURFACE_MARGIN,
            depth: 0.0,
            gravity: 0.0,
            radius_min: DISC_RADIUS_MIN,
            radius_max: DISC_RADIUS_MAX,
            spawn_edge: SpawnEdge::Min,
            spawn_jitter: DISC_SPAWN_JITTER,
            lateral_speed: DISC_LATERAL_SPEED,
            fall_speed_min: DISC_FALL_SPEED_MIN,
            fall_speed_max: DISC_FALL_SPEED_MAX,
            spawn_gate: true,
            reject_overlapping_spawns: false,
            max_health: None,
            impact_damage_scale: 0.0,
            body_color: BODY_COLOR,
            pastel_bodies: false,
            damage_color: DAMAGE_COLOR,
            effects: false,
            effect_cooldown: EFFECT_COOLDOWN,
            effect_lifetime: EFFECT_LIFETIME,
            effect_size: EFFECT_SIZE,
            effect_growth: EFFECT_GROWTH,
            effect_color: EFFECT_COLOR,
        }
    }

    /// 3D room preset: pastel spheres under gravity that wear down on impact
    /// and flash a ring where they hit.
    pub fn sphere() -> Self {
        Self {
            surface_margin: 0.0,
            depth: SPHERE_DEPTH,
            gravity: SPHERE_GRAVITY,
            radius_min: SPHERE_RADIUS_MIN,
            radius_max: SPHERE_RADIUS_MAX,
            spawn_edge: SpawnEdge::Max,
            spawn_jitter: 0.0,
            lateral_speed: SPHERE_LATERAL_SPEED,
            fall_speed_min: SPHERE_FALL_SPEED_MIN,
            fall_speed_max: SPHERE_FALL_SPEED_MAX,
            spawn_gate: false,
            reject_overlapping_spawns: true,
            max_health: Some(SPHERE_MAX_HEALTH),
            impact_damage_scale: IMPACT_DAMAGE_SCALE,
            pastel_bodies: true,
            effects: true,
            ..Self::disc()
        }
    }

    /// Parse `contents` and overlay `variant`'s table onto its preset.
    pub fn from_toml_str(contents: &str, variant: Variant, path: &str) -> SimResult<Self> {
        let parse_err = |message: String| SimError::ConfigParse {
            path: path.to_string(),
            message,
        };

        let mut file: toml::Table = toml::from_str(contents).map_err(|e| parse_err(e.to_string()))?;
        let Some(overrides) = file.remove(variant.table_name()) else {
            return Ok(variant.preset());
        };
        let toml::Value::Table(overrides) = overrides else {
            return Err(parse_err(format!("[{}] must be a table", variant.table_name())));
        };

        let preset = toml::Value::try_from(variant.preset()).map_err(|e| parse_err(e.to_string()))?;
        let toml::Value::Table(mut merged) = preset else {
            return Err(parse_err("preset did not serialise to a table".to_string()));
        };
        merged.extend(overrides);

        let config: SimulationConfig = toml::Value::Table(merged)
            .try_into()
            .map_err(|e: toml::de::Error| parse_err(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read `path` for `variant`. `Ok(None)` when the file does not exist.
    pub fn load(path: &str, variant: Variant) -> SimResult<Option<Self>> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_toml_str(&contents, variant, path).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(SimError::ConfigRead {
                path: path.to_string(),
                source,
            }),
        }
    }

    pub fn validate(&self) -> SimResult<()> {
        ensure_positive("step_dt", self.step_dt)?;
        ensure_positive("radius_min", self.radius_min)?;
        ensure_positive("radius_max", self.radius_max)?;
        if self.radius_max < self.radius_min {
            return Err(SimError::UnsafeConstant {
                name: "radius_max",
                value: self.radius_max,
                safe_range: "[radius_min, ∞)",
            });
        }
        if self.fall_speed_max < self.fall_speed_min {
            return Err(SimError::UnsafeConstant {
                name: "fall_speed_max",
                value: self.fall_speed_max,
                safe_range: "[fall_speed_min, ∞)",
            });
        }
        if self.spawn_interval_frames == 0 {
            return Err(SimError::UnsafeConstant {
                name: "spawn_interval_frames",
                value: 0.0,
                safe_range: "[1, ∞)",
            });
        }
        if self.resolution_passes == 0 {
            return Err(SimError::UnsafeConstant {
                name: "resolution_passes",
                value: 0.0,
                safe_range: "[1, ∞)",
            });
        }
        ensure_non_negative("gravity", self.gravity)?;
        ensure_non_negative("spawn_jitter", self.spawn_jitter)?;
        ensure_non_negative("lateral_speed", self.lateral_speed)?;
        ensure_non_negative("surface_margin", self.surface_margin)?;
        ensure_non_negative("depth", self.depth)?;
        ensure_non_negative("effect_cooldown", self.effect_cooldown)?;
        ensure_positive("effect_lifetime", self.effect_lifetime)?;
        if let Some(max_health) = self.max_health {
            ensure_positive("max_health", max_health)?;
        }
        Ok(())
    }

    pub fn body_srgb(&self) -> Srgba {
        srgb(self.body_color)
    }

    pub fn damage_srgb(&self) -> Srgba {
        srgb(self.damage_color)
    }

    pub fn effect_srgb(&self) -> Srgba {
        srgb(self.effect_color)
    }

    pub fn impact_rules(&self) -> ImpactRules {
        ImpactRules {
            damage_scale: self.impact_damage_scale,
            damage_color: self.damage_srgb(),
            effects: self.effects,
            effect_cooldown: self.effect_cooldown,
        }
    }
}

fn srgb([r, g, b]: [f32; 3]) -> Srgba {
    Srgba::rgb(r, g, b)
}

/// Where the Startup system looks for the config file. `None` skips loading.
#[derive(Resource, Debug, Clone)]
pub struct ConfigSource(pub Option<String>);

/// Startup system: overwrite the `SimulationConfig` resource from the config
/// file for the active variant.
///
/// A missing file keeps the compiled preset. Read, parse and validation errors
/// are logged and also keep the preset.
pub fn load_simulation_config(
    source: Res<ConfigSource>,
    variant: Res<Variant>,
    mut config: ResMut<SimulationConfig>,
) {
    let Some(path) = source.0.as_deref() else {
        return;
    };
    match SimulationConfig::load(path, *variant) {
        Ok(Some(loaded)) => {
            *config = loaded;
            info!("Loaded [{}] config from {path}", variant.table_name());
        }
        Ok(None) => {
            info!("No {path} found; using compiled {} preset", variant.table_name());
        }
        Err(e) => {
            warn!("{e}; using compiled {} preset", variant.table_name());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_validate() {
        assert!(SimulationConfig::disc().validate().is_ok());
        assert!(SimulationConfig::sphere().validate().is_ok());
    }

    #[test]
    fn variant_names_parse_case_insensitively() {
        assert_eq!(Variant::from_name("3D").ok(), Some(Variant::Sphere));
        assert_eq!(Variant::from_name(" disc ").ok(), Some(Variant::Disc));
        assert!(matches!(
            Variant::from_name("cube"),
            Err(SimError::UnknownVariant(_))
        ));
    }

    #[test]
    fn table_overrides_only_named_keys() {
        let toml = r#"
            [sphere]
            gravity = 100.0
            seed = 9

            [disc]
            spawn_batch = 10
        "#;
        let config = SimulationConfig::from_toml_str(toml, Variant::Sphere, "test.toml")
            .expect("valid config");
        assert_eq!(config.gravity, 100.0);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.spawn_batch, SPAWN_BATCH, "other table must not leak in");
        assert_eq!(config.max_health, Some(SPHERE_MAX_HEALTH));
        assert_eq!(config.spawn_edge, SpawnEdge::Max);
    }

    #[test]
    fn missing_table_keeps_preset() {
        let config =
            SimulationConfig::from_toml_str("[sphere]\ngravity = 1.0\n", Variant::Disc, "t")
                .expect("valid config");
        assert_eq!(config, SimulationConfig::disc());
    }

    #[test]
    fn spawn_edge_parses_lowercase() {
        let toml = "[disc]\nspawn_edge = \"max\"\n";
        let config =
            SimulationConfig::from_toml_str(toml, Variant::Disc, "t").expect("valid config");
        assert_eq!(config.spawn_edge, SpawnEdge::Max);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = SimulationConfig::from_toml_str("[disc]\nradius_min = -1.0\n", Variant::Disc, "t")
            .unwrap_err();
        assert!(matches!(err, SimError::UnsafeConstant { name: "radius_min", .. }));

        let err = SimulationConfig::from_toml_str("[disc]\nradius_max = 5.0\n", Variant::Disc, "t")
            .unwrap_err();
        assert!(matches!(err, SimError::UnsafeConstant { name: "radius_max", .. }));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err =
            SimulationConfig::from_toml_str("[disc\n", Variant::Disc, "broken.toml").unwrap_err();
        assert!(matches!(err, SimError::ConfigParse { .. }));
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let loaded = SimulationConfig::load("does/not/exist.toml", Variant::Sphere);
        assert!(matches!(loaded, Ok(None)));
    }

    #[test]
    fn shipped_config_matches_presets() {
        let contents = include_str!("../assets/reflection.toml");
        for variant in [Variant::Disc, Variant::Sphere] {
            let config = SimulationConfig::from_toml_str(contents, variant, CONFIG_PATH)
                .expect("shipped config must validate");
            assert_eq!(config, variant.preset(), "{} table drifted", variant.table_name());
        }
    }
}
