//! Invaders - a fixed-step recreation of the 1978 arcade classic
//!
//! Core modules:
//! - `sim`: Deterministic simulation (formation, shields, collisions, game state)
//! - `flow`: Screen state machine wrapping the simulation (menu, pause, game over)
//! - `input`: Input capability refreshed once per tick
//! - `render`: Renderer collaborator boundary (drawing lives outside this crate)
//! - `settings`: Data-driven game balance

pub mod error;
pub mod flow;
pub mod input;
pub mod render;
pub mod settings;
pub mod sim;

pub use error::{FlowError, SetupError};
pub use settings::{Difficulty, Settings};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, the arcade refresh)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest delta time a single tick accepts
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Original arcade resolution
    pub const GAME_WIDTH: f32 = 224.0;
    pub const GAME_HEIGHT: f32 = 256.0;

    /// Formation defaults
    pub const INVADER_ROWS: usize = 5;
    pub const INVADER_COLUMNS: usize = 11;
    pub const INVADER_HORIZONTAL_SPACING: f32 = 16.0;
    pub const INVADER_VERTICAL_SPACING: f32 = 16.0;
    pub const INVADER_DROP_DISTANCE: f32 = 8.0;
    pub const FORMATION_TOP_MARGIN: f32 = 32.0;
    pub const FORMATION_BOTTOM_DANGER_ZONE: f32 = 32.0;
    pub const INVADER_BASE_SPEED: f32 = 30.0;
    pub const INVADER_SPEED_INCREMENT_PER_KILL: f32 = 1.5;
    pub const INVADER_ANIMATION_INTERVAL: f32 = 0.5;

    /// Scoring
    pub const POINTS_SMALL: u32 = 30;
    pub const POINTS_MEDIUM: u32 = 20;
    pub const POINTS_LARGE: u32 = 10;
    pub const FLYER_MAX_POINTS: u32 = 300;
    pub const FLYER_LESSER_POINTS: [u32; 3] = [50, 100, 150];
    /// Every Nth player shot makes the next flyer worth the maximum
    pub const FLYER_BONUS_SHOT_PERIOD: u32 = 15;

    /// Player defaults
    pub const PLAYER_LIVES: u32 = 3;
    pub const PLAYER_SPEED: f32 = 80.0;
    pub const PLAYER_FIRE_COOLDOWN: f32 = 0.3;
    pub const PLAYER_Y: f32 = GAME_HEIGHT - 32.0;

    /// Projectile defaults (speeds in pixels/s)
    pub const PLAYER_BULLET_SPEED: f32 = 240.0;
    pub const INVADER_BULLET_SPEED: f32 = 120.0;
    pub const MAX_PLAYER_BULLETS: usize = 1;
    pub const MAX_INVADER_BULLETS: usize = 3;

    /// Shield defaults
    pub const SHIELD_COUNT: usize = 4;
    pub const SHIELD_Y_POSITION: f32 = 180.0;

    /// Bonus flyer defaults
    pub const FLYER_SPEED: f32 = 60.0;
    pub const FLYER_Y_POSITION: f32 = 24.0;
    pub const FLYER_MIN_SPAWN_TIME: f32 = 20.0;
    pub const FLYER_MAX_SPAWN_TIME: f32 = 30.0;
}
