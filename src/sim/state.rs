//! Session state and core gameplay types
//!
//! Everything a run needs besides the entity table: player resources,
//! streaming cursors, entity counters and the game-over bookkeeping.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::camera::{CameraMode, CameraSettings};
use crate::map_between_ranges;
use crate::tuning::Tuning;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Running,
    /// Run ended; terminal
    GameOver,
}

/// Why the run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverCause {
    /// Dropped below the out-of-bounds height
    Fell,
    /// Touched a red platform
    RedPlatform,
    /// Fuel ran out with no lives left
    OutOfLives,
    /// Hit a bad obstacle with no lives left
    Obstacle,
}

impl std::fmt::Display for GameOverCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            GameOverCause::Fell => "fell off the track",
            GameOverCause::RedPlatform => "touched a red platform",
            GameOverCause::OutOfLives => "ran out of fuel",
            GameOverCause::Obstacle => "crashed into an obstacle",
        };
        f.write_str(reason)
    }
}

/// Final tally of a run, produced exactly once
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    pub distance: f32,
    pub collected: u32,
    pub score: f32,
    pub cause: GameOverCause,
}

/// Player resources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub fuel: f32,
    pub lives: i32,
    /// Forward speed (world units per frame)
    pub speed: f32,
    /// Speed to restore when the forced-speed effect ends
    pub old_speed: f32,
    pub forced_speed: bool,
    /// Simulation time the forced-speed effect (re)started
    pub forced_speed_start: f64,
    /// Collectibles picked up
    pub collected: u32,
}

impl PlayerState {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            fuel: tuning.fuel.max,
            lives: tuning.player.starting_lives,
            speed: tuning.player.start_speed,
            old_speed: tuning.player.start_speed,
            forced_speed: false,
            forced_speed_start: 0.0,
            collected: 0,
        }
    }
}

/// Numbers for the host's UI
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Hud {
    /// Fuel in [0, 1]
    pub fuel_fraction: f32,
    pub lives: i32,
    pub score: f32,
    pub speed: f32,
    pub collected: u32,
    pub forced_speed: bool,
    pub game_over: bool,
}

/// Left/right decoration sides
pub const SIDES: usize = 2;

/// Complete per-session state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub phase: GamePhase,
    pub camera: CameraSettings,
    pub player: PlayerState,
    /// Distance travelled from the start position
    pub score: f32,
    /// Next platform Z per lane; spawns walk towards -Z
    pub next_platform_spawn: Vec<f32>,
    /// Next decoration Z per side (left, right)
    pub next_decoration_spawn: [f32; SIDES],
    pub live_platforms: u32,
    pub live_obstacles: u32,
    pub live_decorations: u32,
    /// Platforms spawned since the start of the run
    pub platforms_spawned: u64,
    /// RNG seed for this run
    pub seed: u64,
    /// First terminal condition reached this frame
    pending_game_over: Option<GameOverCause>,
    result: Option<GameResult>,
}

impl GameState {
    pub fn new(tuning: &Tuning, camera_mode: CameraMode, seed: u64) -> Self {
        let start = tuning.player.start_position;
        let lanes = &tuning.platforms.lanes_x;

        // The player's lane starts one unit ahead so the opening platform
        // lands under the ship
        let player_lane = nearest_lane(lanes, start.x);
        let next_platform_spawn = (0..lanes.len())
            .map(|lane| if Some(lane) == player_lane { start.z + 1.0 } else { start.z })
            .collect();

        Self {
            phase: GamePhase::Running,
            camera: CameraSettings::new(&tuning.camera, camera_mode),
            player: PlayerState::new(tuning),
            score: 0.0,
            next_platform_spawn,
            next_decoration_spawn: [start.z; SIDES],
            live_platforms: 0,
            live_obstacles: 0,
            live_decorations: 0,
            platforms_spawned: 0,
            seed,
            pending_game_over: None,
            result: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    pub fn result(&self) -> Option<GameResult> {
        self.result
    }

    pub fn pending_game_over(&self) -> Option<GameOverCause> {
        self.pending_game_over
    }

    /// Record a terminal condition; only the first cause is kept
    pub fn fail(&mut self, cause: GameOverCause) {
        if self.pending_game_over.is_none() && self.is_running() {
            log::debug!("Game over requested: {}", cause);
            self.pending_game_over = Some(cause);
        }
    }

    /// Close the session if a terminal condition was recorded
    ///
    /// Returns the result on the transition only.
    pub fn finish(&mut self, score_weight: f32) -> Option<GameResult> {
        if !self.is_running() {
            return None;
        }
        let cause = self.pending_game_over?;
        let result = GameResult {
            distance: self.score,
            collected: self.player.collected,
            score: self.score + self.player.collected as f32 * score_weight,
            cause,
        };
        self.phase = GamePhase::GameOver;
        self.result = Some(result);
        log::info!(
            "Game over ({}): distance {:.1}, collected {}, score {:.1}",
            cause,
            result.distance,
            result.collected,
            result.score
        );
        Some(result)
    }

    /// Distance score from the start position
    pub fn update_score(&mut self, player: Vec3, start: Vec3) {
        self.score = (player.z - start.z).abs();
    }

    pub fn add_fuel(&mut self, amount: f32, max: f32) {
        self.player.fuel = (self.player.fuel + amount).clamp(0.0, max);
    }

    /// Lose one life; a run out of lives ends with `cause`
    pub fn lose_life(&mut self, cause: GameOverCause) {
        self.player.lives -= 1;
        if self.player.lives <= 0 {
            self.fail(cause);
        }
    }

    /// Gain a life up to the cap
    pub fn gain_life(&mut self, max_lives: i32) {
        if self.player.lives < max_lives {
            self.player.lives += 1;
        }
    }

    /// Burn fuel for one frame
    ///
    /// Consumption scales with speed. An empty tank costs a life and refills
    /// while lives remain.
    pub fn burn_fuel(&mut self, dt: f32, tuning: &Tuning) {
        let p = &tuning.player;
        let factor = map_between_ranges(
            self.player.speed as f64,
            p.min_speed as f64,
            p.max_speed as f64,
            0.5,
            1.5,
            1,
        ) as f32;
        self.add_fuel(-dt * tuning.fuel.flow * factor, tuning.fuel.max);

        if self.player.fuel <= 0.0 {
            self.lose_life(GameOverCause::OutOfLives);
            if self.player.lives > 0 {
                self.player.fuel = tuning.fuel.max;
            }
        }
    }

    /// Pin speed to the maximum; re-triggering only refreshes the timer
    pub fn start_forced_speed(&mut self, now: f64, max_speed: f32) {
        if !self.player.forced_speed {
            self.player.old_speed = self.player.speed;
        }
        self.player.forced_speed = true;
        self.player.forced_speed_start = now;
        self.player.speed = max_speed;
    }

    /// Restore the pre-effect speed once the effect has run its course
    pub fn update_forced_speed(&mut self, now: f64, duration: f64) {
        if self.player.forced_speed && now - self.player.forced_speed_start >= duration {
            self.player.forced_speed = false;
            self.player.speed = self.player.old_speed;
        }
    }

    /// W/S speed ramp; ignored while the forced-speed effect runs
    pub fn change_speed(&mut self, delta: f32, min: f32, max: f32) {
        if !self.player.forced_speed {
            self.player.speed = (self.player.speed + delta).clamp(min, max);
        }
    }

    pub fn hud(&self, tuning: &Tuning) -> Hud {
        let max_fuel = tuning.fuel.max.max(f32::EPSILON);
        Hud {
            fuel_fraction: (self.player.fuel / max_fuel).clamp(0.0, 1.0),
            lives: self.player.lives,
            score: self.score,
            speed: self.player.speed,
            collected: self.player.collected,
            forced_speed: self.player.forced_speed,
            game_over: !self.is_running(),
        }
    }
}

/// Index of the lane closest to `x`
pub fn nearest_lane(lanes: &[f32], x: f32) -> Option<usize> {
    lanes
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            (*a - x)
                .abs()
                .partial_cmp(&(*b - x).abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> (GameState, Tuning) {
        let tuning = Tuning::new();
        (GameState::new(&tuning, CameraMode::ThirdPerson, 7), tuning)
    }

    #[test]
    fn test_player_lane_cursor_leads() {
        let (state, _) = state();
        assert_eq!(state.next_platform_spawn, vec![25.0, 26.0, 25.0]);
        assert_eq!(state.next_decoration_spawn, [25.0, 25.0]);
    }

    #[test]
    fn test_first_cause_wins_and_result_once() {
        let (mut state, _) = state();
        state.score = 12.0;
        state.player.collected = 2;
        state.fail(GameOverCause::Fell);
        state.fail(GameOverCause::RedPlatform);

        let result = state.finish(10.0).expect("first finish yields a result");
        assert_eq!(result.cause, GameOverCause::Fell);
        assert_eq!(result.score, 32.0);
        assert_eq!(state.finish(10.0), None);
        assert_eq!(state.result(), Some(result));
        assert!(!state.is_running());
    }

    #[test]
    fn test_finish_without_cause_is_noop() {
        let (mut state, _) = state();
        assert_eq!(state.finish(10.0), None);
        assert!(state.is_running());
    }

    #[test]
    fn test_empty_tank_costs_a_life_and_refills() {
        let (mut state, tuning) = state();
        state.player.lives = 2;
        state.player.fuel = 0.0;
        state.burn_fuel(1.0 / 60.0, &tuning);
        assert_eq!(state.player.lives, 1);
        assert_eq!(state.player.fuel, tuning.fuel.max);
        assert!(state.pending_game_over().is_none());
    }

    #[test]
    fn test_empty_tank_on_last_life_ends_run() {
        let (mut state, tuning) = state();
        state.player.fuel = 0.01;
        state.burn_fuel(1.0, &tuning);
        assert_eq!(state.player.lives, 0);
        assert_eq!(state.player.fuel, 0.0);
        assert_eq!(state.pending_game_over(), Some(GameOverCause::OutOfLives));
    }

    #[test]
    fn test_fuel_burn_scales_with_speed() {
        let (mut slow, tuning) = state();
        let (mut fast, _) = state();
        slow.player.speed = tuning.player.min_speed;
        fast.player.speed = tuning.player.max_speed;
        slow.burn_fuel(1.0, &tuning);
        fast.burn_fuel(1.0, &tuning);
        assert!((tuning.fuel.max - slow.player.fuel - 0.5 * tuning.fuel.flow).abs() < 1e-4);
        assert!((tuning.fuel.max - fast.player.fuel - 1.5 * tuning.fuel.flow).abs() < 1e-4);
    }

    #[test]
    fn test_forced_speed_refresh_keeps_pre_effect_speed() {
        let (mut state, tuning) = state();
        let p = &tuning.player;
        state.player.speed = 0.08;
        state.start_forced_speed(1.0, p.max_speed);
        state.start_forced_speed(3.0, p.max_speed);
        assert_eq!(state.player.old_speed, 0.08);

        state.change_speed(-0.05, p.min_speed, p.max_speed);
        assert_eq!(state.player.speed, p.max_speed);

        state.update_forced_speed(7.9, p.forced_speed_time);
        assert!(state.player.forced_speed);
        state.update_forced_speed(8.0, p.forced_speed_time);
        assert!(!state.player.forced_speed);
        assert_eq!(state.player.speed, 0.08);
    }

    #[test]
    fn test_lives_are_capped() {
        let (mut state, tuning) = state();
        for _ in 0..10 {
            state.gain_life(tuning.player.max_lives);
        }
        assert_eq!(state.player.lives, tuning.player.max_lives);
    }

    #[test]
    fn test_hud_fraction() {
        let (mut state, tuning) = state();
        state.player.fuel = 25.0;
        let hud = state.hud(&tuning);
        assert_eq!(hud.fuel_fraction, 0.25);
        assert!(!hud.game_over);
    }
}
