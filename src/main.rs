//! Invaders headless runner
//!
//! Drives the screen flow with a simple autopilot at a fixed timestep and
//! logs progress. Usage:
//!
//! ```text
//! invaders [SETTINGS.json] [--seed N] [--difficulty easy|classic|hard] [--seconds N]
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use glam::Vec2;

use invaders::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use invaders::flow::{ScreenId, ScreenManager};
use invaders::input::{InputSnapshot, Key};
use invaders::render::{Renderer, SpriteKey, Tint};
use invaders::sim::{Entity, GameCore, GameState, PlayerState, Rect};
use invaders::{Difficulty, Settings};

/// Simulated wall-clock frame, coarser than the sim step to exercise substeps
const FRAME_DT: f32 = 1.0 / 30.0;
/// Seconds between progress lines
const REPORT_INTERVAL: f32 = 5.0;

#[derive(Parser, Debug)]
#[command(name = "invaders")]
#[command(about = "Play Space Invaders headlessly with an autopilot and log the run")]
struct Options {
    /// Settings JSON to load instead of the built-in defaults
    settings_path: Option<PathBuf>,

    /// Seed for the simulation RNG
    #[arg(long, default_value_t = 0x1978)]
    seed: u64,

    /// Difficulty preset applied on top of the settings (easy, classic, hard)
    #[arg(long, value_parser = parse_difficulty)]
    difficulty: Option<Difficulty>,

    /// Stop after this many simulated seconds
    #[arg(long = "seconds", default_value_t = 300.0)]
    max_seconds: f32,
}

fn parse_difficulty(value: &str) -> Result<Difficulty, String> {
    Difficulty::parse(value)
        .ok_or_else(|| format!("unknown difficulty '{value}', expected easy, classic or hard"))
}

/// Lines up under the lowest invader of the nearest column and fires
#[derive(Default)]
struct Autopilot {
    fired_last_tick: bool,
}

impl Autopilot {
    fn plan(&mut self, core: &GameCore) -> InputSnapshot {
        let player = core.player();
        if player.state() == PlayerState::Dying || player.state() == PlayerState::Dead {
            self.fired_last_tick = false;
            return InputSnapshot::default();
        }

        let muzzle_x = player.fire_origin().x;
        let target = core
            .formation()
            .members()
            .map(|m| m.bounds())
            .min_by(|a, b| {
                (a.center().x - muzzle_x)
                    .abs()
                    .total_cmp(&(b.center().x - muzzle_x).abs())
                    .then(b.bottom().total_cmp(&a.bottom()))
            })
            .map(|b| b.center().x);

        let mut input = InputSnapshot::default();
        if let Some(x) = target {
            let offset = x - muzzle_x;
            input.left = offset < -1.0;
            input.right = offset > 1.0;
            if offset.abs() <= 3.0 && !self.fired_last_tick && player.can_fire() {
                input.fire = true;
                input.fire_just_pressed = true;
            }
        }
        self.fired_last_tick = input.fire;
        input
    }
}

/// Counts what a frame would draw
#[derive(Default)]
struct CountingRenderer {
    sprites: usize,
    pixels: usize,
    texts: usize,
}

impl Renderer for CountingRenderer {
    fn clear(&mut self) {
        *self = Self::default();
    }

    fn draw_sprite(&mut self, _sprite: SpriteKey, _pos: Vec2, _tint: Tint) {
        self.sprites += 1;
    }

    fn draw_pixel(&mut self, _pos: Vec2, _tint: Tint) {
        self.pixels += 1;
    }

    fn fill_rect(&mut self, _rect: Rect, _tint: Tint) {
        self.pixels += 1;
    }

    fn draw_text(&mut self, _text: &str, _pos: Vec2, _tint: Tint) {
        self.texts += 1;
    }

    fn draw_text_centered(&mut self, _text: &str, _y: f32, _tint: Tint) {
        self.texts += 1;
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let options = Options::parse();

    let mut settings = match &options.settings_path {
        Some(path) => Settings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::default(),
    };
    if let Some(difficulty) = options.difficulty {
        settings.apply_difficulty(difficulty);
    }

    let core = GameCore::new(settings, options.seed).context("building the game")?;
    let mut manager = ScreenManager::with_default_screens(core);
    manager.start_with(ScreenId::StartMenu)?;

    // Press and release Space on the menu
    manager.handle_input(Key::Space, true);
    manager.handle_input(Key::Space, false);

    let mut autopilot = Autopilot::default();
    let mut renderer = CountingRenderer::default();
    let mut accumulator = 0.0;
    let mut elapsed = 0.0;
    let mut next_report = REPORT_INTERVAL;

    while elapsed < options.max_seconds {
        accumulator += FRAME_DT.min(MAX_FRAME_DT);
        elapsed += FRAME_DT;

        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let input = autopilot.plan(manager.core());
            manager.update(&input, SIM_DT);
            accumulator -= SIM_DT;
            substeps += 1;
        }

        manager.draw(&mut renderer);
        log::trace!(
            "Frame: {} sprites, {} pixels, {} texts",
            renderer.sprites,
            renderer.pixels,
            renderer.texts
        );

        if elapsed >= next_report {
            next_report += REPORT_INTERVAL;
            log::info!("{:.0}s: {:?}", elapsed, manager.core().snapshot());
        }

        if matches!(
            manager.current(),
            Some(ScreenId::GameOver | ScreenId::Victory)
        ) {
            break;
        }
    }

    let core = manager.core();
    let outcome = match core.state() {
        GameState::GameOver => "game over",
        GameState::Victory => "victory",
        GameState::Playing | GameState::Paused => "time limit",
    };
    log::info!(
        "Finished ({outcome}) after {elapsed:.1}s: score {}, wave {}, {} lives",
        core.score(),
        core.wave(),
        core.lives()
    );
    println!("{}", serde_json::to_string_pretty(&core.snapshot())?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_definition() {
        Options::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let options = Options::try_parse_from(["invaders"]).unwrap();
        assert_eq!(options.settings_path, None);
        assert_eq!(options.seed, 0x1978);
        assert_eq!(options.difficulty, None);
        assert_eq!(options.max_seconds, 300.0);
    }

    #[test]
    fn test_all_flags() {
        let options = Options::try_parse_from([
            "invaders",
            "tuning.json",
            "--seed",
            "42",
            "--difficulty",
            "Hard",
            "--seconds",
            "12.5",
        ])
        .unwrap();
        assert_eq!(options.settings_path, Some(PathBuf::from("tuning.json")));
        assert_eq!(options.seed, 42);
        assert_eq!(options.difficulty, Some(Difficulty::Hard));
        assert_eq!(options.max_seconds, 12.5);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(Options::try_parse_from(["invaders", "--difficulty", "nightmare"]).is_err());
        assert!(Options::try_parse_from(["invaders", "--seed", "-1"]).is_err());
        assert!(Options::try_parse_from(["invaders", "--frames", "3"]).is_err());
    }

    #[test]
    fn test_autopilot_fires_only_when_aligned() {
        let core = GameCore::new(Settings::default(), 1).unwrap();
        let mut autopilot = Autopilot::default();
        let first = autopilot.plan(&core);
        // Centred cannon under a centred formation: a column is within reach
        assert!(first.fire_just_pressed || first.left || first.right);
        if first.fire_just_pressed {
            // Fire is released before it can be pressed again
            assert!(!autopilot.plan(&core).fire_just_pressed);
        }
    }
}
