//! Data-driven game balance
//!
//! Every gameplay number lives here so a run can be rebalanced from a JSON
//! file without recompiling. Missing fields fall back to [`crate::consts`].

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Player movement and survival
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub start_position: Vec3,
    pub height: f32,
    pub drag: f32,
    pub gravity: f32,
    pub start_speed: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    pub speed_step: f32,
    pub lateral_speed: f32,
    pub jump_velocity: f32,
    pub starting_lives: i32,
    pub max_lives: i32,
    pub out_of_bound_y: f32,
    /// Forced-speed effect duration (seconds)
    pub forced_speed_time: f64,
    /// Distortion duration after a power platform (seconds)
    pub power_animation_time: f64,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            start_position: PLAYER_START,
            height: PLAYER_HEIGHT,
            drag: PLAYER_DRAG,
            gravity: PLAYER_GRAVITY,
            start_speed: START_SPEED,
            min_speed: MIN_SPEED,
            max_speed: MAX_SPEED,
            speed_step: SPEED_STEP,
            lateral_speed: LATERAL_SPEED,
            jump_velocity: JUMP_VELOCITY,
            starting_lives: STARTING_LIVES,
            max_lives: MAX_LIVES,
            out_of_bound_y: OUT_OF_BOUND_Y,
            forced_speed_time: FORCED_SPEED_TIME,
            power_animation_time: POWER_ANIMATION_TIME,
        }
    }
}

/// Fuel economy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FuelTuning {
    pub max: f32,
    pub gain: f32,
    pub loss: f32,
    pub flow: f32,
}

impl Default for FuelTuning {
    fn default() -> Self {
        Self {
            max: MAX_FUEL,
            gain: FUEL_GAIN,
            loss: FUEL_LOSS,
            flow: FUEL_FLOW,
        }
    }
}

/// Platform lanes and streaming
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformTuning {
    pub lanes_x: Vec<f32>,
    pub length: f32,
    pub width: f32,
    pub thickness: f32,
    pub top_height: f32,
    pub max_platforms: u32,
    /// Platforms spawned at most per frame
    pub spawns_per_frame: u32,
    pub min_gap: u32,
    pub max_gap: u32,
    pub simple_percent: u32,
    pub no_spawn_range: f32,
    pub obstacle_percent: u32,
    pub collectible_percent: u32,
    pub slots: u32,
}

impl Default for PlatformTuning {
    fn default() -> Self {
        Self {
            lanes_x: LANES_X.to_vec(),
            length: PLATFORM_LENGTH,
            width: PLATFORM_WIDTH,
            thickness: PLATFORM_THICKNESS,
            top_height: PLATFORM_TOP_HEIGHT,
            max_platforms: MAX_PLATFORMS,
            spawns_per_frame: 1,
            min_gap: MIN_PLATFORM_GAP,
            max_gap: MAX_PLATFORM_GAP,
            simple_percent: SIMPLE_PLAT_PERCENT,
            no_spawn_range: NO_SPAWN_RANGE,
            obstacle_percent: OBSTACLE_PERCENT,
            collectible_percent: COLLECTIBLE_PERCENT,
            slots: PLATFORM_SLOTS,
        }
    }
}

/// Background stars and planets
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecorationTuning {
    pub max_live: u32,
    pub star_percent: u32,
    /// Lateral distance from the lane center, per side
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
    /// Z step between consecutive spawns on one side
    pub min_z_offset: f32,
    pub max_z_offset: f32,
    pub despawn_radius: f32,
    /// Free-floating bob amplitude and drift speed
    pub bob_amplitude: f32,
    pub max_drift: f32,
}

impl Default for DecorationTuning {
    fn default() -> Self {
        Self {
            max_live: MAX_DECORATIONS,
            star_percent: STAR_PERCENT,
            min_x: 20.0,
            max_x: 60.0,
            min_y: -15.0,
            max_y: 15.0,
            min_z_offset: 8.0,
            max_z_offset: 24.0,
            despawn_radius: DECORATION_DESPAWN_RADIUS,
            bob_amplitude: 0.5,
            max_drift: 0.4,
        }
    }
}

/// Camera framing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTuning {
    pub min_fov: f32,
    pub max_fov: f32,
    pub default_fov: f32,
    pub default_zoom: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub pitch_limit: f32,
    pub yaw_limit: f32,
    pub light_offset: Vec3,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            min_fov: MIN_FOV,
            max_fov: MAX_FOV,
            default_fov: DEFAULT_FOV,
            default_zoom: DEFAULT_ZOOM,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            pitch_limit: CAMERA_PITCH_LIMIT,
            yaw_limit: CAMERA_YAW_LIMIT,
            light_offset: LIGHT_OFFSET,
        }
    }
}

/// Complete balance sheet for one session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub player: PlayerTuning,
    pub fuel: FuelTuning,
    pub platforms: PlatformTuning,
    pub decorations: DecorationTuning,
    pub camera: CameraTuning,
    /// Bonus per collected pickup in the final score
    pub score_weight: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player: PlayerTuning::default(),
            fuel: FuelTuning::default(),
            platforms: PlatformTuning::default(),
            decorations: DecorationTuning::default(),
            camera: CameraTuning::default(),
            score_weight: SCORE_WEIGHT,
        }
    }
}

impl Tuning {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut tuning: Tuning = serde_json::from_str(json)?;
        tuning.sanitize();
        Ok(tuning)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.as_ref().display());
        Ok(tuning)
    }

    /// Load tuning, falling back to defaults when the file is missing or bad
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::warn!(
                    "Using default tuning ({}: {})",
                    path.as_ref().display(),
                    e
                );
                Self::new()
            }
        }
    }

    /// Clamp values that would break streaming invariants
    fn sanitize(&mut self) {
        if self.platforms.lanes_x.is_empty() {
            self.platforms.lanes_x = LANES_X.to_vec();
        }
        if self.platforms.max_gap <= self.platforms.min_gap {
            self.platforms.max_gap = self.platforms.min_gap + 1;
        }
        self.platforms.slots = self.platforms.slots.max(1);
        self.player.min_speed = self.player.min_speed.min(self.player.max_speed);
        self.camera.min_zoom = self.camera.min_zoom.min(self.camera.max_zoom);
        let d = &mut self.decorations;
        d.max_x = d.max_x.max(d.min_x);
        d.max_y = d.max_y.max(d.min_y);
        d.max_z_offset = d.max_z_offset.max(d.min_z_offset);
        d.bob_amplitude = d.bob_amplitude.max(0.0);
        d.max_drift = d.max_drift.max(0.0);
    }
}
