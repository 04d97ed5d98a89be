//! Platform abstraction layer
//!
//! Narrow interfaces to the host the simulation runs inside:
//! - Time (monotonic elapsed seconds)
//! - Input state (held keys, mouse drag, scroll)
//! - Asset resolution (name → handle)
//! - Render submission

pub mod headless;

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::assets::{MeshHandle, ShaderHandle, TextureHandle};
use crate::renderer::RenderFrame;

/// Keys the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Steer left
    A,
    /// Steer right
    D,
    /// Speed up
    W,
    /// Slow down
    S,
    /// Jump
    Space,
    /// Toggle camera mode
    C,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Monotonic time source
pub trait Clock {
    /// Seconds since the clock started
    fn elapsed_time(&mut self) -> f64;
}

/// Wall clock backed by [`Instant`]
#[derive(Debug, Clone)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn elapsed_time(&mut self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// Polled input state
///
/// `take_*` methods drain what accumulated since the previous poll.
pub trait InputSource {
    /// Called once at the start of every frame, before any query
    fn poll(&mut self) {}
    fn is_key_held(&self, key: Key) -> bool;
    fn is_mouse_held(&self, button: MouseButton) -> bool;
    /// Keys that went down since the last call
    fn take_pressed_keys(&mut self) -> Vec<Key>;
    /// Mouse movement (dx, dy) in pixels since the last call
    fn take_mouse_delta(&mut self) -> (f32, f32);
    /// Scroll wheel offset since the last call
    fn take_scroll(&mut self) -> f32;
}

/// Resolves asset names to host-owned handles
pub trait AssetProvider {
    fn resolve_mesh(&mut self, name: &str) -> Option<MeshHandle>;
    fn resolve_shader(&mut self, name: &str) -> Option<ShaderHandle>;
    fn resolve_texture(&mut self, name: &str) -> Option<TextureHandle>;
}

/// Receives one frame of render data
pub trait RenderSink {
    fn begin_frame(&mut self) {}
    fn submit(&mut self, frame: &RenderFrame);
    fn end_frame(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_monotonic() {
        let mut clock = SystemClock::new();
        let a = clock.elapsed_time();
        let b = clock.elapsed_time();
        assert!(a >= 0.0);
        assert!(b >= a);
    }
}
