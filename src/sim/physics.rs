//! Point-mass integrator
//!
//! A deliberately small physics model: every body is a point mass with
//! gravity along -Y and linear drag on the X axis only. Drag is applied as an
//! acceleration directly (it is not divided by a mass), which is what gives
//! the lateral controls their snappy feel.

use std::fmt;

use glam::Vec3;

use crate::consts::{DEFAULT_DRAG, DEFAULT_VELOCITY_LIMIT, G_CONSTANT};

/// Position/velocity state of a body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KinematicState {
    pub position: Vec3,
    pub velocity: Vec3,
    pub drag_coef: f32,
    pub gravity_coef: f32,
}

impl Default for KinematicState {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            drag_coef: DEFAULT_DRAG,
            gravity_coef: 0.0,
        }
    }
}

impl KinematicState {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }
}

/// Time derivative of a [`KinematicState`]
#[derive(Debug, Clone, Copy, Default)]
struct Derivative {
    dx: Vec3,
    dv: Vec3,
}

/// How a body's state advances each frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotionMode {
    /// Integrated from gravity and drag
    #[default]
    Simulated,
    /// Advanced by the body's movement function
    FunctionDriven,
}

/// Movement strategy for function-driven bodies, called with
/// `(state, total_time, dt)`
pub type MovementFn = Box<dyn FnMut(&mut KinematicState, f64, f64)>;

/// Kinematic body owned by an entity
pub struct RigidBody {
    pub state: KinematicState,
    pub mode: MotionMode,
    /// Physics is skipped entirely when disabled (static platforms)
    pub physics_enabled: bool,
    /// Velocity magnitude clamp applied on impulses; `None` is unlimited
    pub velocity_limit: Option<f32>,
    movement: Option<MovementFn>,
}

impl fmt::Debug for RigidBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RigidBody")
            .field("state", &self.state)
            .field("mode", &self.mode)
            .field("physics_enabled", &self.physics_enabled)
            .field("velocity_limit", &self.velocity_limit)
            .field("has_movement", &self.movement.is_some())
            .finish()
    }
}

impl Default for RigidBody {
    fn default() -> Self {
        Self {
            state: KinematicState::default(),
            mode: MotionMode::Simulated,
            physics_enabled: true,
            velocity_limit: Some(DEFAULT_VELOCITY_LIMIT),
            movement: None,
        }
    }
}

impl RigidBody {
    pub fn new(state: KinematicState) -> Self {
        Self {
            state,
            ..Default::default()
        }
    }

    /// Switch to function-driven motion using `movement`
    pub fn set_movement(&mut self, movement: MovementFn) {
        self.mode = MotionMode::FunctionDriven;
        self.movement = Some(movement);
    }

    /// Add an instantaneous velocity change, then enforce the velocity limit
    ///
    /// Only impulses are clamped: velocity gained through integration
    /// (falling) is never limited here.
    pub fn add_impulse(&mut self, impulse: Vec3) {
        self.state.velocity += impulse;
        self.clamp_velocity();
    }

    fn clamp_velocity(&mut self) {
        let Some(limit) = self.velocity_limit else {
            return;
        };
        if self.state.velocity.length() > limit {
            self.state.velocity = self.state.velocity.normalize_or_zero() * limit;
        }
    }
}

/// Acceleration model: gravity along -Y plus first-order drag on X
pub fn acceleration(state: &KinematicState) -> Vec3 {
    let drag = Vec3::new(-state.velocity.x * state.drag_coef, 0.0, 0.0);
    let gravity = Vec3::new(0.0, -G_CONSTANT * state.gravity_coef, 0.0);
    gravity + drag
}

fn evaluate(initial: &KinematicState, dt: f32, d: Derivative) -> Derivative {
    let state = KinematicState {
        position: initial.position + d.dx * dt,
        velocity: initial.velocity + d.dv * dt,
        ..*initial
    };
    Derivative {
        dx: state.velocity,
        dv: acceleration(&state),
    }
}

/// Advance a body by `dt`
///
/// Simulated bodies take one RK4 step (or one semi-implicit Euler step when
/// `use_rk4` is false). Function-driven bodies are handed to their movement
/// function with the total simulation time and nothing else touches them.
pub fn integrate(body: &mut RigidBody, time: f64, dt: f32, use_rk4: bool) {
    match body.mode {
        MotionMode::Simulated => {
            if use_rk4 {
                let a = evaluate(&body.state, 0.0, Derivative::default());
                let b = evaluate(&body.state, dt * 0.5, a);
                let c = evaluate(&body.state, dt * 0.5, b);
                let d = evaluate(&body.state, dt, c);

                let dxdt = (a.dx + 2.0 * (b.dx + c.dx) + d.dx) / 6.0;
                let dvdt = (a.dv + 2.0 * (b.dv + c.dv) + d.dv) / 6.0;

                body.state.position += dxdt * dt;
                body.state.velocity += dvdt * dt;
            } else {
                let accel = acceleration(&body.state);
                body.state.velocity += accel * dt;
                body.state.position += body.state.velocity * dt;
            }
        }
        MotionMode::FunctionDriven => {
            if let Some(movement) = body.movement.as_mut() {
                movement(&mut body.state, time, dt as f64);
            }
        }
    }
}

/// Owns the simulation clock and the integration method
#[derive(Debug, Clone)]
pub struct Integrator {
    current_time: f64,
    pub use_rk4: bool,
}

impl Default for Integrator {
    fn default() -> Self {
        Self {
            current_time: 0.0,
            use_rk4: true,
        }
    }
}

impl Integrator {
    pub fn new(use_rk4: bool) -> Self {
        Self {
            current_time: 0.0,
            use_rk4,
        }
    }

    /// Total simulated time (seconds)
    pub fn time(&self) -> f64 {
        self.current_time
    }

    /// Advance the clock. Call exactly once per frame.
    pub fn advance(&mut self, dt: f32) {
        self.current_time += dt.max(0.0) as f64;
    }

    /// Integrate one body over `dt` if its physics is enabled
    pub fn step(&self, body: &mut RigidBody, dt: f32) {
        if body.physics_enabled {
            integrate(body, self.current_time, dt, self.use_rk4);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn falling_body() -> RigidBody {
        let mut body = RigidBody::new(KinematicState::at(Vec3::new(0.0, 10.0, 0.0)));
        body.state.gravity_coef = 1.0;
        body.state.drag_coef = 0.0;
        body
    }

    #[test]
    fn test_rk4_matches_free_fall() {
        let mut body = falling_body();
        for _ in 0..100 {
            integrate(&mut body, 0.0, 0.01, true);
        }
        // y = 10 - g t^2 / 2 with t = 1
        assert!((body.state.position.y - 5.0).abs() < 1e-3);
        assert!((body.state.velocity.y + 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_euler_is_semi_implicit() {
        let mut body = falling_body();
        integrate(&mut body, 0.0, 0.1, false);
        // velocity updates first, position uses the new velocity
        assert!((body.state.velocity.y + 1.0).abs() < 1e-6);
        assert!((body.state.position.y - 9.9).abs() < 1e-5);
    }

    #[test]
    fn test_drag_only_on_x() {
        let mut body = RigidBody::new(KinematicState::at(Vec3::ZERO));
        body.state.velocity = Vec3::new(5.0, 0.0, 5.0);
        body.state.drag_coef = 10.0;
        integrate(&mut body, 0.0, 0.016, true);
        assert!(body.state.velocity.x < 5.0);
        assert!(body.state.velocity.x > 0.0);
        assert_eq!(body.state.velocity.z, 5.0);
    }

    #[test]
    fn test_function_driven_ignores_forces() {
        let mut body = falling_body();
        body.set_movement(Box::new(|_state, _t, _dt| {}));
        let before = body.state;
        for _ in 0..10 {
            integrate(&mut body, 1.0, 0.5, true);
        }
        assert_eq!(body.state, before);
    }

    #[test]
    fn test_function_driven_receives_time() {
        let mut body = RigidBody::default();
        body.set_movement(Box::new(|state, t, dt| {
            state.position.x = t as f32;
            state.position.y += dt as f32;
        }));
        integrate(&mut body, 3.0, 0.5, true);
        assert_eq!(body.state.position.x, 3.0);
        assert_eq!(body.state.position.y, 0.5);
    }

    #[test]
    fn test_disabled_physics_is_skipped() {
        let integrator = Integrator::default();
        let mut body = falling_body();
        body.physics_enabled = false;
        integrator.step(&mut body, 1.0);
        assert_eq!(body.state.position.y, 10.0);
    }

    #[test]
    fn test_clock_advances_once_per_call() {
        let mut integrator = Integrator::default();
        integrator.advance(0.25);
        integrator.advance(0.25);
        integrator.advance(-1.0);
        assert_eq!(integrator.time(), 0.5);
    }

    #[test]
    fn test_gravity_is_not_clamped() {
        let mut body = falling_body();
        body.velocity_limit = Some(1.0);
        for _ in 0..10 {
            integrate(&mut body, 0.0, 0.1, true);
        }
        assert!(body.state.velocity.length() > 1.0);
    }

    proptest! {
        #[test]
        fn prop_impulse_respects_limit(
            x in -5000.0f32..5000.0,
            y in -5000.0f32..5000.0,
            z in -5000.0f32..5000.0,
            limit in 0.1f32..3000.0,
        ) {
            let mut body = RigidBody::default();
            body.velocity_limit = Some(limit);
            body.add_impulse(Vec3::new(x, y, z));
            prop_assert!(body.state.velocity.length() <= limit * (1.0 + 1e-5));
        }

        #[test]
        fn prop_unlimited_impulse_is_exact(
            x in -5000.0f32..5000.0,
            y in -5000.0f32..5000.0,
        ) {
            let mut body = RigidBody::default();
            body.velocity_limit = None;
            body.add_impulse(Vec3::new(x, y, 0.0));
            prop_assert_eq!(body.state.velocity, Vec3::new(x, y, 0.0));
        }

        #[test]
        fn prop_function_driven_untouched_by_integrator(dt in 0.0f32..10.0, t in 0.0f64..100.0) {
            let mut body = falling_body();
            body.state.velocity = Vec3::new(1.0, 2.0, 3.0);
            body.set_movement(Box::new(|_, _, _| {}));
            let before = body.state;
            integrate(&mut body, t, dt, true);
            integrate(&mut body, t, dt, false);
            prop_assert_eq!(body.state, before);
        }
    }
}
