//! Skyroads - A lane-based endless runner over streaming platforms
//!
//! Core modules:
//! - `sim`: Simulation (integrator, colliders, entities, streaming, game state)
//! - `renderer`: Render submission payloads handed to the host renderer
//! - `platform`: Host collaborator interfaces (clock, input, assets, rendering)
//! - `app`: Frame-hook shell driving the simulation from a host loop
//! - `tuning`: Data-driven game balance

pub mod app;
pub mod assets;
pub mod error;
pub mod highscores;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use app::App;
pub use error::ConfigError;
pub use highscores::HighScores;
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
///
/// These are the defaults behind [`Tuning`]; gameplay code reads the tuning
/// values, never these directly.
pub mod consts {
    use glam::Vec3;

    /// Gravitational acceleration scale (multiplied by a body's gravity coefficient)
    pub const G_CONSTANT: f32 = 10.0;
    /// Default drag coefficient for a new kinematic state
    pub const DEFAULT_DRAG: f32 = 0.1;
    /// Default velocity magnitude clamp for rigid bodies
    pub const DEFAULT_VELOCITY_LIMIT: f32 = 2500.0;

    /// Player spawn point; also the origin of the distance score
    pub const PLAYER_START: Vec3 = Vec3::new(0.0, 2.0, 25.0);
    /// Player height (scale of the ship)
    pub const PLAYER_HEIGHT: f32 = 1.0;
    pub const PLAYER_DRAG: f32 = 10.0;
    pub const PLAYER_GRAVITY: f32 = 0.33;

    /// Forward speed, in world units per frame
    pub const START_SPEED: f32 = 0.05;
    pub const MAX_SPEED: f32 = 0.175;
    pub const MIN_SPEED: f32 = 0.0075;
    pub const SPEED_STEP: f32 = 0.001;
    /// Lateral velocity set by A/D (not continuously applied)
    pub const LATERAL_SPEED: f32 = 5.0;
    pub const JUMP_VELOCITY: f32 = 3.33;

    /// Forced-speed effect duration (seconds)
    pub const FORCED_SPEED_TIME: f64 = 5.0;
    /// Distortion duration for power platforms (seconds)
    pub const POWER_ANIMATION_TIME: f64 = 2.0;

    pub const STARTING_LIVES: i32 = 1;
    pub const MAX_LIVES: i32 = 3;
    pub const OUT_OF_BOUND_Y: f32 = -3.5;
    /// Bonus per collected pickup in the final score
    pub const SCORE_WEIGHT: f32 = 10.0;

    pub const MAX_FUEL: f32 = 100.0;
    pub const FUEL_GAIN: f32 = 0.33 * MAX_FUEL;
    pub const FUEL_LOSS: f32 = 0.10 * MAX_FUEL;
    /// Fuel burned per second at nominal speed
    pub const FUEL_FLOW: f32 = 2.5;

    /// Where the top surface of a platform sits
    pub const PLATFORM_TOP_HEIGHT: f32 = 0.0;
    /// Z extent of a platform
    pub const PLATFORM_LENGTH: f32 = 33.3;
    pub const PLATFORM_WIDTH: f32 = 1.0;
    pub const PLATFORM_THICKNESS: f32 = 0.25;
    pub const LANES_X: [f32; 3] = [-3.5, 0.0, 3.5];
    pub const MAX_PLATFORMS: u32 = 15;
    pub const MIN_PLATFORM_GAP: u32 = 5;
    pub const MAX_PLATFORM_GAP: u32 = PLATFORM_LENGTH as u32;
    pub const SIMPLE_PLAT_PERCENT: u32 = 60;
    pub const NO_SPAWN_RANGE: f32 = 10.0;

    pub const OBSTACLE_PERCENT: u32 = 15;
    pub const COLLECTIBLE_PERCENT: u32 = 25;
    /// Positions along a platform where obstacles/collectibles can sit
    pub const PLATFORM_SLOTS: u32 = 3;

    pub const MAX_DECORATIONS: u32 = 20;
    pub const STAR_PERCENT: u32 = 25;
    pub const DECORATION_DESPAWN_RADIUS: f32 = 150.0;

    pub const MIN_FOV: f32 = 60.0;
    pub const MAX_FOV: f32 = 90.0;
    pub const DEFAULT_FOV: f32 = 75.0;
    pub const DEFAULT_ZOOM: f32 = 4.25;
    pub const MIN_ZOOM: f32 = 2.0;
    pub const MAX_ZOOM: f32 = 10.0;
    /// Mouse-drag rotation box (pitch, yaw) in radians
    pub const CAMERA_PITCH_LIMIT: f32 = 0.275;
    pub const CAMERA_YAW_LIMIT: f32 = 0.5;

    /// Scene light follows the player at this offset
    pub const LIGHT_OFFSET: Vec3 = Vec3::new(0.0, 7.75, 0.0);
}

/// Map a value from one range to another, rounded to `decimal_precision` decimals
///
/// The rounding makes range boundaries exact: mapping `from_a` yields `to_a`.
/// An empty source range maps everything to `to_a`.
pub fn map_between_ranges(
    value: f64,
    from_a: f64,
    from_b: f64,
    to_a: f64,
    to_b: f64,
    decimal_precision: i32,
) -> f64 {
    if from_a == from_b {
        return to_a;
    }
    let scale = (to_b - to_a) / (from_b - from_a);
    let offset = -from_a * scale + to_a;
    let mapped = value * scale + offset;
    let precision = 10f64.powi(decimal_precision);
    (mapped * precision).round() / precision
}
