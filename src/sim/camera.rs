//! Chase camera
//!
//! Recomputed from scratch every frame from the player position and the
//! user's orbit rotation; nothing is smoothed.

use glam::{Mat4, Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::tuning::CameraTuning;

/// Where the camera sits relative to the ship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CameraMode {
    /// Inside the ship; the ship itself is hidden
    FirstPerson,
    #[default]
    ThirdPerson,
}

impl CameraMode {
    pub fn toggled(self) -> Self {
        match self {
            CameraMode::FirstPerson => CameraMode::ThirdPerson,
            CameraMode::ThirdPerson => CameraMode::FirstPerson,
        }
    }
}

/// User-controlled camera parameters, part of the session state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraSettings {
    /// Vertical FOV in degrees, driven by speed
    pub fov: f32,
    pub mode: CameraMode,
    /// (pitch, yaw) orbit offset in radians
    pub rotation: Vec2,
    /// Distance behind the ship in third person
    pub zoom: f32,
}

impl CameraSettings {
    pub fn new(tuning: &CameraTuning, mode: CameraMode) -> Self {
        Self {
            fov: tuning.default_fov,
            mode,
            rotation: Vec2::ZERO,
            zoom: tuning.default_zoom,
        }
    }

    /// Switch first/third person; the orbit rotation resets
    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggled();
        self.rotation = Vec2::ZERO;
    }

    /// Mouse drag (right button) in pixels
    pub fn drag(&mut self, dx: f32, dy: f32, sensitivity: f32, tuning: &CameraTuning) {
        self.rotation.x -= sensitivity * dy;
        self.rotation.y -= sensitivity * dx;
        self.rotation.x = self.rotation.x.clamp(-tuning.pitch_limit, tuning.pitch_limit);
        self.rotation.y = self.rotation.y.clamp(-tuning.yaw_limit, tuning.yaw_limit);
    }

    /// Scrolling forward pulls the camera closer
    pub fn scroll(&mut self, amount: f32, step: f32, tuning: &CameraTuning) {
        self.zoom = (self.zoom - amount * step).clamp(tuning.min_zoom, tuning.max_zoom);
    }
}

/// Look-at camera with an orbit pivot in front of it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
    /// Distance from the eye to the orbit pivot
    pub distance_to_target: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            forward: Vec3::NEG_Z,
            right: Vec3::X,
            up: Vec3::Y,
            distance_to_target: 1.0,
        }
    }
}

impl Camera {
    pub fn set(&mut self, position: Vec3, center: Vec3, up: Vec3) {
        self.position = position;
        self.forward = (center - position).normalize_or_zero();
        self.right = self.forward.cross(up).normalize_or_zero();
        self.up = self.right.cross(self.forward);
    }

    pub fn translate_forward(&mut self, distance: f32) {
        self.position += self.forward * distance;
    }

    pub fn rotate_first_person_ox(&mut self, angle: f32) {
        let rotation = Quat::from_axis_angle(self.right, angle);
        self.forward = (rotation * self.forward).normalize_or_zero();
        self.up = self.right.cross(self.forward);
    }

    pub fn rotate_first_person_oy(&mut self, angle: f32) {
        let rotation = Quat::from_rotation_y(angle);
        self.forward = (rotation * self.forward).normalize_or_zero();
        self.right = (rotation * self.right).normalize_or_zero();
        self.up = self.right.cross(self.forward);
    }

    pub fn rotate_third_person_ox(&mut self, angle: f32) {
        self.translate_forward(self.distance_to_target);
        self.rotate_first_person_ox(angle);
        self.translate_forward(-self.distance_to_target);
    }

    pub fn rotate_third_person_oy(&mut self, angle: f32) {
        self.translate_forward(self.distance_to_target);
        self.rotate_first_person_oy(angle);
        self.translate_forward(-self.distance_to_target);
    }

    pub fn target_position(&self) -> Vec3 {
        self.position + self.forward * self.distance_to_target
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward, self.up)
    }

    /// Place the camera for this frame around the player
    pub fn follow(&mut self, player: Vec3, settings: &CameraSettings) {
        let target = player - Vec3::new(0.0, 1.0, 100.0);
        match settings.mode {
            CameraMode::ThirdPerson => {
                self.set(player + Vec3::new(0.0, 0.5, settings.zoom), target, Vec3::Y);
                self.distance_to_target = settings.zoom;
                self.rotate_third_person_ox(settings.rotation.x);
                self.rotate_third_person_oy(settings.rotation.y);
            }
            CameraMode::FirstPerson => {
                self.set(player, target, Vec3::Y);
                self.distance_to_target = 0.0;
                self.rotate_first_person_ox(settings.rotation.x);
                self.rotate_first_person_oy(settings.rotation.y);
            }
        }
    }
}
