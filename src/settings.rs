//! Game settings and balance
//!
//! Every tunable the simulation reads lives here. Defaults reproduce the
//! classic arcade values; JSON documents may override any subset.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::SetupError;
use crate::sim::terrain::{CLASSIC_SHIELD_PATTERN, TerrainPattern};

/// Difficulty preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Classic,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Classic => "Classic",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "classic" | "normal" => Some(Difficulty::Classic),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Formation base speed multiplier
    pub fn speed_multiplier(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.8,
            Difficulty::Classic => 1.0,
            Difficulty::Hard => 1.25,
        }
    }

    /// Enemy fire interval multiplier (lower fires more often)
    pub fn fire_interval_multiplier(&self) -> f32 {
        match self {
            Difficulty::Easy => 1.3,
            Difficulty::Classic => 1.0,
            Difficulty::Hard => 0.75,
        }
    }

    /// Concurrent enemy projectile cap
    pub fn enemy_projectile_cap(&self) -> usize {
        match self {
            Difficulty::Easy => 2,
            Difficulty::Classic => MAX_INVADER_BULLETS,
            Difficulty::Hard => 4,
        }
    }
}

/// Play field dimensions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSettings {
    pub width: f32,
    pub height: f32,
}

impl Default for FieldSettings {
    fn default() -> Self {
        Self {
            width: GAME_WIDTH,
            height: GAME_HEIGHT,
        }
    }
}

/// Formation layout, motion and scoring
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormationSettings {
    pub rows: usize,
    pub columns: usize,
    pub horizontal_spacing: f32,
    pub vertical_spacing: f32,
    /// Vertical drop applied on every reversal
    pub drop_distance: f32,
    pub top_margin: f32,
    /// Distance above the field bottom that ends the round when crossed
    pub danger_zone: f32,
    pub base_speed: f32,
    pub speed_per_kill: f32,
    /// Added to the base speed for every wave after the first
    pub wave_speed_bonus: f32,
    /// Each later wave starts this much lower...
    pub wave_start_drop: f32,
    /// ...up to this cap
    pub max_wave_start_drop: f32,
    pub small_size: Vec2,
    pub medium_size: Vec2,
    pub large_size: Vec2,
    pub small_points: u32,
    pub medium_points: u32,
    pub large_points: u32,
    /// March animation frame interval (seconds)
    pub march_interval: f32,
}

impl Default for FormationSettings {
    fn default() -> Self {
        Self {
            rows: INVADER_ROWS,
            columns: INVADER_COLUMNS,
            horizontal_spacing: INVADER_HORIZONTAL_SPACING,
            vertical_spacing: INVADER_VERTICAL_SPACING,
            drop_distance: INVADER_DROP_DISTANCE,
            top_margin: FORMATION_TOP_MARGIN,
            danger_zone: FORMATION_BOTTOM_DANGER_ZONE,
            base_speed: INVADER_BASE_SPEED,
            speed_per_kill: INVADER_SPEED_INCREMENT_PER_KILL,
            wave_speed_bonus: 5.0,
            wave_start_drop: INVADER_DROP_DISTANCE,
            max_wave_start_drop: 5.0 * INVADER_DROP_DISTANCE,
            small_size: Vec2::new(8.0, 8.0),
            medium_size: Vec2::new(11.0, 8.0),
            large_size: Vec2::new(12.0, 8.0),
            small_points: POINTS_SMALL,
            medium_points: POINTS_MEDIUM,
            large_points: POINTS_LARGE,
            march_interval: INVADER_ANIMATION_INTERVAL,
        }
    }
}

/// Player cannon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    pub lives: u32,
    pub speed: f32,
    pub fire_cooldown: f32,
    pub size: Vec2,
    pub start_y: f32,
    pub death_duration: f32,
    /// Explosion sprite alternates on this interval
    pub death_frame_interval: f32,
    pub invincibility_duration: f32,
    pub blink_interval: f32,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            lives: PLAYER_LIVES,
            speed: PLAYER_SPEED,
            fire_cooldown: PLAYER_FIRE_COOLDOWN,
            size: Vec2::new(13.0, 8.0),
            start_y: PLAYER_Y,
            death_duration: 1.0,
            death_frame_interval: 0.1,
            invincibility_duration: 2.0,
            blink_interval: 0.1,
        }
    }
}

/// Projectile speeds, sizes and caps
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileSettings {
    pub player_speed: f32,
    pub enemy_speed: f32,
    pub player_size: Vec2,
    pub enemy_size: Vec2,
    pub max_player: usize,
    /// Enforced by the shooter controller, not the pool
    pub max_enemy: usize,
    /// Backing storage is compacted once it holds more entries than this
    pub compaction_threshold: usize,
}

impl Default for ProjectileSettings {
    fn default() -> Self {
        Self {
            player_speed: PLAYER_BULLET_SPEED,
            enemy_speed: INVADER_BULLET_SPEED,
            player_size: Vec2::new(1.0, 4.0),
            enemy_size: Vec2::new(3.0, 7.0),
            max_player: MAX_PLAYER_BULLETS,
            max_enemy: MAX_INVADER_BULLETS,
            compaction_threshold: 50,
        }
    }
}

/// Formation fire cadence
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShooterSettings {
    /// Interval with a full formation (seconds)
    pub base_interval: f32,
    /// Floor as the formation thins out
    pub min_interval: f32,
}

impl Default for ShooterSettings {
    fn default() -> Self {
        Self {
            base_interval: 3.0,
            min_interval: 0.5,
        }
    }
}

/// Destructible shields
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainSettings {
    pub count: usize,
    pub y: f32,
    /// Rows of the shield bitmap, any non-space character is solid
    pub pattern: Vec<String>,
    pub player_damage_radius: i32,
    pub enemy_damage_radius: i32,
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            count: SHIELD_COUNT,
            y: SHIELD_Y_POSITION,
            pattern: CLASSIC_SHIELD_PATTERN.iter().map(|row| row.to_string()).collect(),
            player_damage_radius: 3,
            enemy_damage_radius: 4,
        }
    }
}

/// Bonus flyer scheduling and scoring
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlyerSettings {
    pub speed: f32,
    pub y: f32,
    pub size: Vec2,
    pub min_spawn_time: f32,
    pub max_spawn_time: f32,
    pub max_points: u32,
    pub lesser_points: Vec<u32>,
    pub bonus_shot_period: u32,
}

impl Default for FlyerSettings {
    fn default() -> Self {
        Self {
            speed: FLYER_SPEED,
            y: FLYER_Y_POSITION,
            size: Vec2::new(16.0, 7.0),
            min_spawn_time: FLYER_MIN_SPAWN_TIME,
            max_spawn_time: FLYER_MAX_SPAWN_TIME,
            max_points: FLYER_MAX_POINTS,
            lesser_points: FLYER_LESSER_POINTS.to_vec(),
            bonus_shot_period: FLYER_BONUS_SHOT_PERIOD,
        }
    }
}

/// Wave progression
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveSettings {
    /// "Get ready" countdown between waves (seconds)
    pub transition_duration: f32,
    /// `None` loops waves forever; `Some(n)` ends in victory after wave n
    pub max_waves: Option<u32>,
}

impl Default for WaveSettings {
    fn default() -> Self {
        Self {
            transition_duration: 2.0,
            max_waves: None,
        }
    }
}

/// Complete game settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub difficulty: Difficulty,
    pub field: FieldSettings,
    pub formation: FormationSettings,
    pub player: PlayerSettings,
    pub projectiles: ProjectileSettings,
    pub shooter: ShooterSettings,
    pub terrain: TerrainSettings,
    pub flyer: FlyerSettings,
    pub waves: WaveSettings,
}

impl Settings {
    /// Create settings from a difficulty preset (applies preset defaults)
    pub fn from_preset(difficulty: Difficulty) -> Self {
        let mut settings = Self::default();
        settings.apply_difficulty(difficulty);
        settings
    }

    /// Apply a difficulty preset.
    ///
    /// Overwrites the preset-controlled fields (formation base speed, shooter
    /// intervals, enemy projectile cap) relative to the classic values, so
    /// applying presets repeatedly never compounds.
    pub fn apply_difficulty(&mut self, difficulty: Difficulty) {
        let classic_shooter = ShooterSettings::default();
        self.difficulty = difficulty;
        self.formation.base_speed = INVADER_BASE_SPEED * difficulty.speed_multiplier();
        self.shooter.base_interval =
            classic_shooter.base_interval * difficulty.fire_interval_multiplier();
        self.shooter.min_interval =
            classic_shooter.min_interval * difficulty.fire_interval_multiplier();
        self.projectiles.max_enemy = difficulty.enemy_projectile_cap();
    }

    /// A single-wave build: clearing the formation ends the game in victory
    pub fn single_wave(mut self) -> Self {
        self.waves.max_waves = Some(1);
        self
    }

    /// Parse settings from JSON and validate them
    pub fn from_json(json: &str) -> Result<Self, SetupError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        log::info!("Loaded settings ({} difficulty)", settings.difficulty.as_str());
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, SetupError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Parsed shield bitmap
    pub fn terrain_pattern(&self) -> Result<TerrainPattern, SetupError> {
        TerrainPattern::parse(&self.terrain.pattern)
    }

    /// Check every invariant the simulation relies on
    pub fn validate(&self) -> Result<(), SetupError> {
        fn positive(value: f32, field: &'static str) -> Result<(), SetupError> {
            if value > 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(SetupError::invalid(field, "must be positive"))
            }
        }

        fn positive_size(size: Vec2, field: &'static str) -> Result<(), SetupError> {
            if size.x > 0.0 && size.y > 0.0 && size.is_finite() {
                Ok(())
            } else {
                Err(SetupError::invalid(field, "both dimensions must be positive"))
            }
        }

        positive(self.field.width, "field.width")?;
        positive(self.field.height, "field.height")?;

        let f = &self.formation;
        if f.rows == 0 {
            return Err(SetupError::invalid("formation.rows", "must be at least 1"));
        }
        if f.columns == 0 {
            return Err(SetupError::invalid("formation.columns", "must be at least 1"));
        }
        positive(f.horizontal_spacing, "formation.horizontal_spacing")?;
        positive(f.vertical_spacing, "formation.vertical_spacing")?;
        positive(f.drop_distance, "formation.drop_distance")?;
        positive(f.base_speed, "formation.base_speed")?;
        positive(f.march_interval, "formation.march_interval")?;
        positive_size(f.small_size, "formation.small_size")?;
        positive_size(f.medium_size, "formation.medium_size")?;
        positive_size(f.large_size, "formation.large_size")?;
        if f.speed_per_kill < 0.0 || f.wave_speed_bonus < 0.0 {
            return Err(SetupError::invalid(
                "formation.speed_per_kill",
                "speed increments must not be negative",
            ));
        }
        let widest = f.small_size.x.max(f.medium_size.x).max(f.large_size.x);
        if (f.columns - 1) as f32 * f.horizontal_spacing + widest > self.field.width {
            return Err(SetupError::invalid("formation.columns", "formation is wider than the field"));
        }

        let p = &self.player;
        if p.lives == 0 {
            return Err(SetupError::invalid("player.lives", "must be at least 1"));
        }
        positive(p.speed, "player.speed")?;
        positive_size(p.size, "player.size")?;
        positive(p.death_duration, "player.death_duration")?;
        positive(p.death_frame_interval, "player.death_frame_interval")?;
        positive(p.invincibility_duration, "player.invincibility_duration")?;
        positive(p.blink_interval, "player.blink_interval")?;
        if p.fire_cooldown < 0.0 {
            return Err(SetupError::invalid("player.fire_cooldown", "must not be negative"));
        }
        if p.size.x > self.field.width {
            return Err(SetupError::invalid("player.size", "player is wider than the field"));
        }

        let pr = &self.projectiles;
        positive(pr.player_speed, "projectiles.player_speed")?;
        positive(pr.enemy_speed, "projectiles.enemy_speed")?;
        positive_size(pr.player_size, "projectiles.player_size")?;
        positive_size(pr.enemy_size, "projectiles.enemy_size")?;
        if pr.max_player == 0 {
            return Err(SetupError::invalid("projectiles.max_player", "must be at least 1"));
        }

        positive(self.shooter.base_interval, "shooter.base_interval")?;
        positive(self.shooter.min_interval, "shooter.min_interval")?;

        if self.terrain.player_damage_radius <= 0 || self.terrain.enemy_damage_radius <= 0 {
            return Err(SetupError::invalid("terrain.damage_radius", "must be positive"));
        }
        self.terrain_pattern()?;

        let fl = &self.flyer;
        positive(fl.speed, "flyer.speed")?;
        positive_size(fl.size, "flyer.size")?;
        positive(fl.min_spawn_time, "flyer.min_spawn_time")?;
        if fl.max_spawn_time < fl.min_spawn_time {
            return Err(SetupError::invalid(
                "flyer.max_spawn_time",
                "must not be below flyer.min_spawn_time",
            ));
        }
        if fl.lesser_points.is_empty() {
            return Err(SetupError::invalid("flyer.lesser_points", "must not be empty"));
        }
        if fl.bonus_shot_period == 0 {
            return Err(SetupError::invalid("flyer.bonus_shot_period", "must be at least 1"));
        }

        positive(self.waves.transition_duration, "waves.transition_duration")?;
        if self.waves.max_waves == Some(0) {
            return Err(SetupError::invalid("waves.max_waves", "must be at least 1"));
        }

        Ok(())
    }
}
