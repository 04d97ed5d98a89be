//! Player settings and preferences
//!
//! Persisted as JSON separately from the tuning file and the high scores.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sim::camera::CameraMode;

/// Integration method for simulated bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum IntegratorKind {
    /// Semi-implicit Euler
    Euler,
    /// Classic fourth-order Runge-Kutta
    #[default]
    Rk4,
}

impl IntegratorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntegratorKind::Euler => "Euler",
            IntegratorKind::Rk4 => "RK4",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "euler" => Some(IntegratorKind::Euler),
            "rk4" | "runge-kutta" => Some(IntegratorKind::Rk4),
            _ => None,
        }
    }

    pub fn use_rk4(&self) -> bool {
        *self == IntegratorKind::Rk4
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Camera mode a run starts in
    pub camera_mode: CameraMode,
    /// Radians of orbit per pixel of mouse drag
    pub mouse_sensitivity: f32,
    /// Zoom change per scroll unit
    pub zoom_step: f32,
    pub integrator: IntegratorKind,
    /// Fixed RNG seed; a fresh one is drawn per run when unset
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            camera_mode: CameraMode::ThirdPerson,
            mouse_sensitivity: 0.001,
            zoom_step: 0.25,
            integrator: IntegratorKind::Rk4,
            seed: None,
        }
    }
}

impl Settings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings = serde_json::from_str(&json)?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    /// Load settings, falling back to defaults when the file is missing or bad
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Using default settings ({}: {})", path.as_ref().display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Settings saved");
        Ok(())
    }
}
