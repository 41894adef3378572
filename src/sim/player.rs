//! Player cannon and its life-cycle state machine
//!
//! ```text
//! Alive --Hit--> Dying --DeathTimerExpired--> Dead
//!   any --Respawn--> Respawning --InvincibilityExpired--> Alive
//! ```
//!
//! The table lives in [`transition`]; timers only decide when a trigger fires.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::animation::AnimationClock;
use super::entity::{Entity, EntityKind};
use super::events::{EventQueue, GameEvent};
use crate::input::InputSource;
use crate::settings::{PlayerSettings, Settings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerState {
    Alive,
    /// Explosion animation playing
    Dying,
    /// Waiting for the core to respawn or end the game
    Dead,
    /// Invincible and blinking
    Respawning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerTrigger {
    Hit,
    DeathTimerExpired,
    Respawn,
    InvincibilityExpired,
}

/// Player transition table. `None` means the trigger is ignored in `state`.
pub fn transition(state: PlayerState, trigger: PlayerTrigger) -> Option<PlayerState> {
    use PlayerState::*;
    use PlayerTrigger::*;
    match (state, trigger) {
        (Alive, Hit) => Some(Dying),
        (Dying, DeathTimerExpired) => Some(Dead),
        (_, Respawn) => Some(Respawning),
        (Respawning, InvincibilityExpired) => Some(Alive),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    pub pos: Vec2,
    size: Vec2,
    config: PlayerSettings,
    field_width: f32,
    state: PlayerState,
    /// Remaining time in Dying or Respawning
    state_timer: f32,
    /// Time spent in the current state (drives the blink)
    state_elapsed: f32,
    cooldown: f32,
    death_clock: AnimationClock,
}

impl Player {
    pub fn new(settings: &Settings) -> Self {
        let config = settings.player.clone();
        let mut player = Self {
            pos: Vec2::ZERO,
            size: config.size,
            field_width: settings.field.width,
            state: PlayerState::Alive,
            state_timer: 0.0,
            state_elapsed: 0.0,
            cooldown: 0.0,
            death_clock: AnimationClock::new(config.death_frame_interval, 2),
            config,
        };
        player.pos = player.start_position();
        player
    }

    /// Horizontally centred on the configured baseline
    pub fn start_position(&self) -> Vec2 {
        Vec2::new((self.field_width - self.size.x) * 0.5, self.config.start_y)
    }

    /// Apply a trigger through the table, running entry effects.
    /// Returns false when the trigger is ignored in the current state.
    pub fn apply(&mut self, trigger: PlayerTrigger) -> bool {
        let Some(next) = transition(self.state, trigger) else {
            return false;
        };
        self.state = next;
        self.state_elapsed = 0.0;
        match next {
            PlayerState::Dying => {
                self.state_timer = self.config.death_duration;
                self.death_clock.reset();
            }
            PlayerState::Respawning => {
                self.state_timer = self.config.invincibility_duration;
                self.cooldown = 0.0;
            }
            PlayerState::Alive | PlayerState::Dead => {
                self.state_timer = 0.0;
            }
        }
        true
    }

    /// No-op unless Alive
    pub fn hit(&mut self) -> bool {
        self.apply(PlayerTrigger::Hit)
    }

    /// Valid from any state
    pub fn respawn(&mut self, pos: Vec2) {
        self.pos = pos;
        self.apply(PlayerTrigger::Respawn);
    }

    /// Back to a fresh Alive cannon at `pos`
    pub fn reset(&mut self, pos: Vec2) {
        self.pos = pos;
        self.state = PlayerState::Alive;
        self.state_timer = 0.0;
        self.state_elapsed = 0.0;
        self.cooldown = 0.0;
        self.death_clock.reset();
    }

    pub fn update(&mut self, dt: f32, input: &dyn InputSource, events: &mut EventQueue) {
        self.cooldown = (self.cooldown - dt).max(0.0);
        self.state_elapsed += dt;

        match self.state {
            PlayerState::Alive => {
                let mut direction = 0.0;
                if input.left_pressed() {
                    direction -= 1.0;
                }
                if input.right_pressed() {
                    direction += 1.0;
                }
                let max_x = (self.field_width - self.size.x).max(0.0);
                self.pos.x = (self.pos.x + direction * self.config.speed * dt).clamp(0.0, max_x);

                if input.fire_just_pressed() && self.can_fire() {
                    self.cooldown = self.config.fire_cooldown;
                    events.push(GameEvent::PlayerFireRequested {
                        origin: self.fire_origin(),
                    });
                }
            }
            PlayerState::Dying => {
                self.death_clock.update(dt);
                self.state_timer -= dt;
                if self.state_timer <= 0.0 && self.apply(PlayerTrigger::DeathTimerExpired) {
                    events.push(GameEvent::PlayerDeathAnimationComplete);
                }
            }
            PlayerState::Respawning => {
                self.state_timer -= dt;
                if self.state_timer <= 0.0 {
                    self.apply(PlayerTrigger::InvincibilityExpired);
                }
            }
            PlayerState::Dead => {}
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    /// Time left in Dying or Respawning
    pub fn state_timer(&self) -> f32 {
        self.state_timer
    }

    pub fn cooldown_remaining(&self) -> f32 {
        self.cooldown
    }

    pub fn is_vulnerable(&self) -> bool {
        self.state == PlayerState::Alive
    }

    pub fn can_fire(&self) -> bool {
        self.state == PlayerState::Alive && self.cooldown <= 0.0
    }

    /// Blinks while Respawning, hidden when Dead
    pub fn should_render(&self) -> bool {
        match self.state {
            PlayerState::Alive | PlayerState::Dying => true,
            PlayerState::Dead => false,
            PlayerState::Respawning => {
                (self.state_elapsed / self.config.blink_interval) as u32 % 2 == 0
            }
        }
    }

    /// Explosion sprite index while Dying
    pub fn death_frame(&self) -> u32 {
        self.death_clock.frame()
    }

    /// Top-centre of the cannon
    pub fn fire_origin(&self) -> Vec2 {
        Vec2::new(self.pos.x + self.size.x * 0.5, self.pos.y)
    }
}

impl Entity for Player {
    fn kind(&self) -> EntityKind {
        EntityKind::Player
    }

    fn position(&self) -> Vec2 {
        self.pos
    }

    fn size(&self) -> Vec2 {
        self.size
    }

    fn is_active(&self) -> bool {
        self.state != PlayerState::Dead
    }
}
