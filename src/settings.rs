//! Simulation settings
//!
//! Loaded from JSON. Missing fields fall back to their defaults, so a file
//! only has to name what it overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::MAX_REFLECTIONS_LIMIT;
use crate::geometry::Tolerances;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("reading settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid setting: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Bounce limit per laser, clamped to `MAX_REFLECTIONS_LIMIT`
    pub max_reflections: u32,
    /// Time for a door to go from closed to fully open
    pub door_open_seconds: f32,
    /// Time for a target or trigger glow to fade fully in
    pub activation_seconds: f32,
    /// Endpoints closer than this make two beam segments duplicates
    pub dedup_epsilon: f32,
    pub tolerances: Tolerances,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_reflections: MAX_REFLECTIONS_LIMIT,
            door_open_seconds: 0.7,
            activation_seconds: 0.25,
            dedup_epsilon: 0.001,
            tolerances: Tolerances::default(),
        }
    }
}

impl Settings {
    /// Parse settings, clamp the bounce limit and reject unusable values
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let mut settings: Settings = serde_json::from_str(json)?;
        if settings.max_reflections > MAX_REFLECTIONS_LIMIT {
            log::info!(
                "max_reflections {} clamped to {}",
                settings.max_reflections,
                MAX_REFLECTIONS_LIMIT
            );
            settings.max_reflections = MAX_REFLECTIONS_LIMIT;
        }
        settings.validate()?;
        log::info!("Loaded settings (max_reflections {})", settings.max_reflections);
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.max_reflections > MAX_REFLECTIONS_LIMIT {
            return Err(SettingsError::Invalid(format!(
                "max_reflections must be at most {MAX_REFLECTIONS_LIMIT}, got {}",
                self.max_reflections
            )));
        }
        for (name, value) in [
            ("door_open_seconds", self.door_open_seconds),
            ("activation_seconds", self.activation_seconds),
            ("dedup_epsilon", self.dedup_epsilon),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(SettingsError::Invalid(format!("{name} must be positive, got {value}")));
            }
        }
        if !self.tolerances.is_valid() {
            return Err(SettingsError::Invalid("tolerances must all be positive".to_string()));
        }
        Ok(())
    }
}
