//! Game core state
//!
//! [`GameCore`] owns every manager plus score, lives, wave and the overall
//! game state. Per-frame sequencing lives in [`super::tick`].

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::animation::AnimationClock;
use super::collision::CollisionEngine;
use super::entity::EntityRef;
use super::events::{EventQueue, GameEvent};
use super::flyer::{BonusFlyer, FlyerScheduler};
use super::formation::Formation;
use super::player::{Player, PlayerState};
use super::pool::ProjectilePool;
use super::shooter::ShooterController;
use super::terrain::TerrainSet;
use crate::error::SetupError;
use crate::settings::Settings;

/// Overall state of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    Playing,
    /// Ticks are ignored until resumed
    Paused,
    GameOver,
    /// Only reachable when the wave count is bounded
    Victory,
}

/// Serializable summary of a core, cheap to compare
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub time_ticks: u64,
    pub score: u64,
    pub lives: u32,
    pub wave: u32,
    pub state: GameState,
    pub player_state: PlayerState,
    pub player_pos: Vec2,
    pub active_members: usize,
    pub formation_speed: f32,
    pub player_projectiles: usize,
    pub enemy_projectiles: usize,
    pub active_shields: usize,
    pub flyer_points: Option<u32>,
    pub shots_since_flyer_kill: u32,
    pub transitioning: bool,
}

/// The simulation orchestrator
#[derive(Debug, Clone)]
pub struct GameCore {
    pub(crate) settings: Settings,
    /// Run seed for reproducibility
    pub(crate) seed: u64,
    pub(crate) rng: Pcg32,
    pub(crate) formation: Formation,
    pub(crate) projectiles: ProjectilePool,
    pub(crate) terrain: TerrainSet,
    pub(crate) flyer: FlyerScheduler,
    pub(crate) shooter: ShooterController,
    pub(crate) player: Player,
    pub(crate) collisions: CollisionEngine,
    pub(crate) events: EventQueue,
    /// Formation march animation
    pub(crate) march: AnimationClock,
    pub(crate) score: u64,
    pub(crate) lives: u32,
    /// 1-based
    pub(crate) wave: u32,
    pub(crate) state: GameState,
    /// Seconds left in the between-wave countdown
    pub(crate) transition_timer: Option<f32>,
    /// Simulation tick counter
    pub(crate) time_ticks: u64,
    /// Events drained by the most recent tick
    pub(crate) last_events: Vec<GameEvent>,
}

impl GameCore {
    /// Validate `settings` and build a fresh wave-1 game seeded with `seed`
    pub fn new(settings: Settings, seed: u64) -> Result<Self, SetupError> {
        settings.validate()?;
        let mut rng = Pcg32::seed_from_u64(seed);
        let flyer = FlyerScheduler::new(&settings, &mut rng);
        let core = Self {
            formation: Formation::new(&settings),
            projectiles: ProjectilePool::new(&settings),
            terrain: TerrainSet::new(&settings)?,
            shooter: ShooterController::new(&settings),
            player: Player::new(&settings),
            collisions: CollisionEngine::new(),
            events: EventQueue::new(),
            march: AnimationClock::new(settings.formation.march_interval, 2),
            score: 0,
            lives: settings.player.lives,
            wave: 1,
            state: GameState::Playing,
            transition_timer: None,
            time_ticks: 0,
            last_events: Vec::new(),
            flyer,
            rng,
            seed,
            settings,
        };
        log::info!(
            "New game: seed {seed}, {} difficulty, {} lives",
            core.settings.difficulty.as_str(),
            core.lives
        );
        Ok(core)
    }

    /// Start over at wave 1 with full lives and zero score
    pub fn reset(&mut self) {
        self.score = 0;
        self.lives = self.settings.player.lives;
        self.state = GameState::Playing;
        self.time_ticks = 0;
        self.last_events.clear();
        super::tick::start_wave(self, 1);
    }

    pub fn pause(&mut self) {
        if self.state == GameState::Playing {
            self.state = GameState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state == GameState::Paused {
            self.state = GameState::Playing;
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn wave(&self) -> u32 {
        self.wave
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    pub fn formation(&self) -> &Formation {
        &self.formation
    }

    pub fn projectiles(&self) -> &ProjectilePool {
        &self.projectiles
    }

    pub fn terrain(&self) -> &TerrainSet {
        &self.terrain
    }

    pub fn flyer(&self) -> Option<&BonusFlyer> {
        self.flyer.current()
    }

    pub fn flyer_scheduler(&self) -> &FlyerScheduler {
        &self.flyer
    }

    pub fn shooter(&self) -> &ShooterController {
        &self.shooter
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition_timer.is_some()
    }

    /// Seconds left before the next wave, zero when not transitioning
    pub fn transition_remaining(&self) -> f32 {
        self.transition_timer.unwrap_or(0.0).max(0.0)
    }

    /// Current march frame for formation sprites
    pub fn animation_frame(&self) -> u32 {
        self.march.frame()
    }

    /// Events applied during the most recent tick, in order
    pub fn last_events(&self) -> &[GameEvent] {
        &self.last_events
    }

    /// Collision records published during the most recent tick
    pub fn last_frame_hits(&self) -> usize {
        self.collisions.last_frame_hits()
    }

    /// Every active entity, back to front
    pub fn entities(&self) -> impl Iterator<Item = EntityRef<'_>> {
        use super::entity::Entity;

        let terrain = self
            .terrain
            .blocks()
            .iter()
            .filter(|b| b.is_active())
            .map(EntityRef::Terrain);
        let members = self.formation.members().map(EntityRef::Member);
        let projectiles = self.projectiles.active().map(EntityRef::Projectile);
        let flyer = self
            .flyer
            .current()
            .filter(|f| f.is_active())
            .map(EntityRef::Flyer);
        let player = (self.player.state() != PlayerState::Dead)
            .then_some(EntityRef::Player(&self.player));

        terrain
            .chain(members)
            .chain(projectiles)
            .chain(flyer)
            .chain(player)
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            time_ticks: self.time_ticks,
            score: self.score,
            lives: self.lives,
            wave: self.wave,
            state: self.state,
            player_state: self.player.state(),
            player_pos: self.player.pos,
            active_members: self.formation.active_count(),
            formation_speed: self.formation.speed(),
            player_projectiles: self.projectiles.active_player_count(),
            enemy_projectiles: self.projectiles.active_enemy_count(),
            active_shields: self.terrain.active_count(),
            flyer_points: self.flyer.current().map(|f| f.points()),
            shots_since_flyer_kill: self.flyer.shots_since_kill(),
            transitioning: self.is_transitioning(),
        }
    }
}
