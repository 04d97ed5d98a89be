//! Application shell
//!
//! Glues a [`World`] to the host: polls input, feeds the simulation once per
//! frame and submits the render payload.

use glam::Vec2;

use crate::platform::{Clock, InputSource, Key, MouseButton, RenderSink};
use crate::sim::{GameResult, TickInput, World, tick};

/// Frame-hook driver for one session
pub struct App<I: InputSource, R: RenderSink> {
    world: World,
    input: I,
    renderer: R,
    last_time: Option<f64>,
    frames: u64,
    result: Option<GameResult>,
}

impl<I: InputSource, R: RenderSink> App<I, R> {
    pub fn new(world: World, input: I, renderer: R) -> Self {
        Self {
            world,
            input,
            renderer,
            last_time: None,
            frames: 0,
            result: None,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Frames completed so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn result(&self) -> Option<GameResult> {
        self.result
    }

    pub fn on_frame_start(&mut self) {
        self.input.poll();
        self.renderer.begin_frame();
    }

    /// Advance the simulation by `dt` seconds and submit the frame
    ///
    /// Must be called exactly once per frame. Returns the result on the frame
    /// the run ends.
    pub fn on_update(&mut self, dt: f32) -> Option<GameResult> {
        let input = self.read_input();
        let finished = tick(&mut self.world, &input, dt.max(0.0));
        if finished.is_some() {
            self.result = finished;
        }
        self.renderer.submit(&self.world.render_frame());
        finished
    }

    pub fn on_frame_end(&mut self) {
        self.renderer.end_frame();
        self.frames += 1;
    }

    /// One full frame at host time `now` (seconds)
    pub fn frame(&mut self, now: f64) -> Option<GameResult> {
        let dt = self.last_time.map(|last| (now - last).max(0.0)).unwrap_or(0.0);
        self.last_time = Some(now);

        self.on_frame_start();
        let finished = self.on_update(dt as f32);
        self.on_frame_end();
        finished
    }

    /// Run frames until the session ends or `max_frames` is reached
    pub fn run(&mut self, clock: &mut dyn Clock, max_frames: Option<u64>) -> Option<GameResult> {
        while max_frames.is_none_or(|max| self.frames < max) {
            if let Some(result) = self.frame(clock.elapsed_time()) {
                return Some(result);
            }
        }
        log::info!("Stopped after {} frames", self.frames);
        self.result
    }

    fn read_input(&mut self) -> TickInput {
        let pressed = self.input.take_pressed_keys();
        let (dx, dy) = self.input.take_mouse_delta();
        let dragging = self.input.is_mouse_held(MouseButton::Right);

        TickInput {
            left: self.input.is_key_held(Key::A),
            right: self.input.is_key_held(Key::D),
            faster: self.input.is_key_held(Key::W),
            slower: self.input.is_key_held(Key::S),
            jump: pressed.contains(&Key::Space),
            toggle_camera: pressed.contains(&Key::C),
            mouse_drag: dragging.then_some(Vec2::new(dx, dy)),
            scroll: self.input.take_scroll(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetTable;
    use crate::platform::headless::{FixedClock, InputFrame, RecordingRenderer, ScriptedInput, StaticAssets};
    use crate::settings::Settings;
    use crate::sim::{CameraMode, GameOverCause};
    use crate::tuning::Tuning;

    fn app(frames: Vec<InputFrame>) -> App<ScriptedInput, RecordingRenderer> {
        let assets = AssetTable::load(&mut StaticAssets::new());
        let world = World::with_seed(Tuning::new(), &Settings::default(), assets, 4);
        App::new(world, ScriptedInput::new(frames), RecordingRenderer::new())
    }

    #[test]
    fn test_run_respects_frame_limit() {
        let mut app = app(Vec::new());
        let mut clock = FixedClock::sixty_hz();
        assert_eq!(app.run(&mut clock, Some(20)), None);
        assert_eq!(app.frames(), 20);
        assert_eq!(app.renderer().frames, 20);
        assert!(app.renderer().items_submitted > 0);
        // First frame has no previous timestamp
        assert!((app.world().integrator.time() - 19.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_run_stops_at_game_over() {
        let mut app = app(Vec::new());
        app.world_mut().player_mut().body.state.position.y = -10.0;
        let mut clock = FixedClock::sixty_hz();
        let result = app.run(&mut clock, Some(100)).expect("fall ends the run");
        assert_eq!(result.cause, GameOverCause::Fell);
        assert_eq!(app.frames(), 1);
        assert_eq!(app.result(), Some(result));
        assert!(app.renderer().last_frame.as_ref().is_some_and(|f| f.hud.game_over));
    }

    #[test]
    fn test_input_reaches_the_simulation() {
        let mut app = app(vec![
            InputFrame::pressing(&[Key::C]),
            InputFrame {
                mouse_held: vec![MouseButton::Right],
                mouse_delta: (100.0, 0.0),
                ..Default::default()
            },
            InputFrame {
                mouse_delta: (100.0, 0.0),
                ..Default::default()
            },
        ]);
        let mut clock = FixedClock::sixty_hz();
        app.run(&mut clock, Some(3));

        let camera = app.world().state.camera;
        assert_eq!(camera.mode, CameraMode::FirstPerson);
        // Only the drag with the right button held counts
        assert!((camera.rotation.y + 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_backwards_clock_gives_zero_dt() {
        let mut app = app(Vec::new());
        app.frame(10.0);
        app.frame(5.0);
        assert_eq!(app.world().integrator.time(), 0.0);
    }
}
