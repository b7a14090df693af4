//! Simulation-specific error types.
//!
//! The physics step itself cannot fail; errors only arise while loading and
//! validating configuration or choosing a variant at startup.

use std::fmt;

/// Top-level error enum for the reflection simulation.
#[derive(Debug)]
pub enum SimError {
    /// The config file exists but could not be read.
    ConfigRead {
        path: String,
        source: std::io::Error,
    },

    /// The config file is not valid TOML or does not match the config schema.
    ConfigParse {
        path: String,
        message: String,
    },

    /// `REFLECTION_VARIANT` named something other than a disc or sphere variant.
    UnknownVariant(String),

    /// A tunable is outside the range the simulation can run with.
    UnsafeConstant {
        /// Name of the config key (for logging).
        name: &'static str,
        /// The value that was rejected.
        value: f32,
        /// Human-readable description of the safe range.
        safe_range: &'static str,
    },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::ConfigRead { path, source } => {
                write!(f, "failed to read {}: {}", path, source)
            }
            SimError::ConfigParse { path, message } => {
                write!(f, "failed to parse {}: {}", path, message)
            }
            SimError::UnknownVariant(name) => write!(
                f,
                "unknown variant '{}' (expected 'disc', '2d', 'sphere' or '3d')",
                name
            ),
            SimError::UnsafeConstant {
                name,
                value,
                safe_range,
            } => write!(
                f,
                "config value '{}' = {} is outside safe range {}",
                name, value, safe_range
            ),
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimError::ConfigRead { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience alias: a `Result` using `SimError` as the error type.
pub type SimResult<T> = Result<T, SimError>;

// ── Validation helpers ────────────────────────────────────────────────────────

/// Returns an error unless `value` is strictly positive and finite.
pub fn ensure_positive(name: &'static str, value: f32) -> SimResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(SimError::UnsafeConstant {
            name,
            value,
            safe_range: "(0.0, ∞)",
        })
    }
}

/// Returns an error if `value` is negative or not finite.
pub fn ensure_non_negative(name: &'static str, value: f32) -> SimResult<()> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(SimError::UnsafeConstant {
            name,
            value,
            safe_range: "[0.0, ∞)",
        })
    }
}
