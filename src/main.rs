//! Skyroads headless entry point
//!
//! Runs one scripted session on the headless host and records the result in
//! the local leaderboard.
//!
//! Usage: `skyroads [tuning.json] [settings.json] [euler|rk4]`

use std::time::{SystemTime, UNIX_EPOCH};

use skyroads::assets::AssetTable;
use skyroads::platform::Key;
use skyroads::platform::headless::{FixedClock, InputFrame, RecordingRenderer, ScriptedInput, StaticAssets};
use skyroads::sim::World;
use skyroads::settings::IntegratorKind;
use skyroads::{App, HighScores, Settings, Tuning};

const HIGHSCORES_PATH: &str = "highscores.json";
/// Ten minutes at 60 Hz
const MAX_FRAMES: u64 = 60 * 60 * 10;

/// Speed up for a second, then hop every couple of seconds
fn demo_script() -> Vec<InputFrame> {
    let mut frames: Vec<InputFrame> = (0..60).map(|_| InputFrame::holding(&[Key::W])).collect();
    for i in 0..600 {
        if i % 120 == 0 {
            frames.push(InputFrame::pressing(&[Key::Space]));
        } else {
            frames.push(InputFrame::default());
        }
    }
    frames
}

fn main() {
    env_logger::init();
    log::info!("Skyroads (headless) starting...");

    let args: Vec<String> = std::env::args().collect();
    let tuning = args.get(1).map(Tuning::load_or_default).unwrap_or_default();
    let mut settings = args.get(2).map(Settings::load_or_default).unwrap_or_default();
    if let Some(name) = args.get(3) {
        match IntegratorKind::from_str(name) {
            Some(kind) => settings.integrator = kind,
            None => log::warn!("Unknown integrator '{}', keeping {}", name, settings.integrator.as_str()),
        }
    }

    let assets = AssetTable::load(&mut StaticAssets::new());
    let world = World::new(tuning, &settings, assets);
    let seed = world.state.seed;

    let mut app = App::new(world, ScriptedInput::new(demo_script()), RecordingRenderer::new());
    let mut clock = FixedClock::sixty_hz();

    let Some(result) = app.run(&mut clock, Some(MAX_FRAMES)) else {
        println!(
            "Still flying after {} frames (score {:.1})",
            app.frames(),
            app.world().state.score
        );
        return;
    };

    println!(" --- Game Over --- ");
    println!(" Seed: {}", seed);
    println!(" Cause: {}", result.cause);
    println!(" Distance: {:.1}, collected: {}", result.distance, result.collected);
    println!(" Your score was: {}", result.score as i64);

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let mut scores = HighScores::load_or_default(HIGHSCORES_PATH);
    if let Some(rank) = scores.add_result(&result, timestamp) {
        println!(" New high score! Rank #{}", rank);
        if let Err(e) = scores.save(HIGHSCORES_PATH) {
            log::warn!("Could not save high scores: {}", e);
        }
    }
}
