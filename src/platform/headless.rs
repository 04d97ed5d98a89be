//! Headless host
//!
//! Deterministic stand-ins for the real window/GPU host: a fixed-step clock,
//! scripted input, a static asset catalog and a renderer that only counts.

use std::collections::{HashSet, VecDeque};

use super::{AssetProvider, Clock, InputSource, Key, MouseButton, RenderSink};
use crate::assets::{MESH_NAMES, MeshHandle, SHADER_NAMES, ShaderHandle, TEXTURE_NAMES, TextureHandle};
use crate::renderer::RenderFrame;

/// Clock that moves forward by a fixed step on every read
#[derive(Debug, Clone)]
pub struct FixedClock {
    step: f64,
    now: f64,
}

impl FixedClock {
    pub fn new(step: f64) -> Self {
        Self {
            step: step.max(0.0),
            now: 0.0,
        }
    }

    /// 60 Hz
    pub fn sixty_hz() -> Self {
        Self::new(1.0 / 60.0)
    }
}

impl Clock for FixedClock {
    fn elapsed_time(&mut self) -> f64 {
        let t = self.now;
        self.now += self.step;
        t
    }
}

/// Input for a single scripted frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputFrame {
    pub held: Vec<Key>,
    pub pressed: Vec<Key>,
    pub mouse_held: Vec<MouseButton>,
    pub mouse_delta: (f32, f32),
    pub scroll: f32,
}

impl InputFrame {
    pub fn holding(keys: &[Key]) -> Self {
        Self {
            held: keys.to_vec(),
            ..Default::default()
        }
    }

    pub fn pressing(keys: &[Key]) -> Self {
        Self {
            held: keys.to_vec(),
            pressed: keys.to_vec(),
            ..Default::default()
        }
    }
}

/// Replays a queue of input frames, one per [`InputSource::poll`]
///
/// Once the script runs out the last frame's held state stays down, but
/// one-shot presses, mouse deltas and scroll are not repeated.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    script: VecDeque<InputFrame>,
    current: InputFrame,
}

impl ScriptedInput {
    pub fn new(frames: impl IntoIterator<Item = InputFrame>) -> Self {
        Self {
            script: frames.into_iter().collect(),
            current: InputFrame::default(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) {
        match self.script.pop_front() {
            Some(frame) => self.current = frame,
            None => {
                self.current.pressed.clear();
                self.current.mouse_delta = (0.0, 0.0);
                self.current.scroll = 0.0;
            }
        }
    }

    fn is_key_held(&self, key: Key) -> bool {
        self.current.held.contains(&key)
    }

    fn is_mouse_held(&self, button: MouseButton) -> bool {
        self.current.mouse_held.contains(&button)
    }

    fn take_pressed_keys(&mut self) -> Vec<Key> {
        std::mem::take(&mut self.current.pressed)
    }

    fn take_mouse_delta(&mut self) -> (f32, f32) {
        std::mem::take(&mut self.current.mouse_delta)
    }

    fn take_scroll(&mut self) -> f32 {
        std::mem::take(&mut self.current.scroll)
    }
}

/// Asset catalog that hands out sequential handles for every known name
#[derive(Debug, Clone, Default)]
pub struct StaticAssets {
    missing: HashSet<String>,
}

impl StaticAssets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog missing the given names (in every table)
    pub fn without(names: &[&str]) -> Self {
        Self {
            missing: names.iter().map(|n| n.to_string()).collect(),
        }
    }

    fn lookup(&self, names: &[&str], name: &str) -> Option<u32> {
        if self.missing.contains(name) {
            return None;
        }
        names.iter().position(|&n| n == name).map(|i| i as u32)
    }
}

impl AssetProvider for StaticAssets {
    fn resolve_mesh(&mut self, name: &str) -> Option<MeshHandle> {
        self.lookup(MESH_NAMES, name).map(MeshHandle)
    }

    fn resolve_shader(&mut self, name: &str) -> Option<ShaderHandle> {
        self.lookup(SHADER_NAMES, name).map(ShaderHandle)
    }

    fn resolve_texture(&mut self, name: &str) -> Option<TextureHandle> {
        self.lookup(TEXTURE_NAMES, name).map(TextureHandle)
    }
}

/// Renderer that keeps counters and the last submitted frame
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub frames: u64,
    pub items_submitted: u64,
    pub last_frame: Option<RenderFrame>,
    in_frame: bool,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderSink for RecordingRenderer {
    fn begin_frame(&mut self) {
        self.in_frame = true;
    }

    fn submit(&mut self, frame: &RenderFrame) {
        if !self.in_frame {
            log::warn!("Frame submitted outside begin/end");
        }
        self.items_submitted += frame.items.len() as u64;
        self.last_frame = Some(frame.clone());
    }

    fn end_frame(&mut self) {
        self.in_frame = false;
        self.frames += 1;
    }
}
