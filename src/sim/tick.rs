//! Per-frame sequencing
//!
//! Order within a tick: march clock, formation, projectiles, player, flyer
//! scheduler, shooter, collision pass, event drain, end-of-round checks.

use super::collision::CollisionTargets;
use super::events::{Collision, GameEvent};
use super::state::{GameCore, GameState};
use crate::consts::MAX_FRAME_DT;
use crate::input::InputSource;

/// Advance the game by `dt` seconds (clamped to `[0, MAX_FRAME_DT]`)
pub fn tick(core: &mut GameCore, input: &dyn InputSource, dt: f32) {
    let dt = if dt.is_finite() {
        dt.clamp(0.0, MAX_FRAME_DT)
    } else {
        0.0
    };

    if core.state != GameState::Playing {
        return;
    }
    core.time_ticks += 1;
    core.last_events.clear();

    // The countdown freezes gameplay until the next wave
    if let Some(remaining) = core.transition_timer {
        let remaining = remaining - dt;
        if remaining <= 0.0 {
            let next = core.wave + 1;
            start_wave(core, next);
        } else {
            core.transition_timer = Some(remaining);
        }
        return;
    }

    core.march.update(dt);
    core.formation.advance(dt, &mut core.events);
    core.projectiles.advance(dt);
    core.player.update(dt, input, &mut core.events);
    core.flyer.advance(dt, &mut core.rng, &mut core.events);
    core.shooter.advance(
        dt,
        core.formation.members(),
        core.formation.total(),
        &mut core.projectiles,
        &mut core.rng,
    );

    core.collisions.check_all(
        CollisionTargets {
            projectiles: &mut core.projectiles,
            formation: &mut core.formation,
            terrain: &mut core.terrain,
            flyer: &mut core.flyer,
            player: &core.player,
        },
        &mut core.rng,
        &mut core.events,
    );

    apply_events(core);
    check_round_end(core);
}

/// Drain the queue and apply score, lives and player consequences
fn apply_events(core: &mut GameCore) {
    let events: Vec<GameEvent> = core.events.drain().collect();
    for event in &events {
        match *event {
            GameEvent::Collision(Collision::InvaderBulletHitPlayer { .. }) => {
                if core.player.hit() {
                    core.lives = core.lives.saturating_sub(1);
                    log::info!("Player hit, {} lives left", core.lives);
                }
            }
            GameEvent::Collision(_) => {}
            GameEvent::MemberDestroyed { points, .. } => {
                core.score += u64::from(points);
            }
            GameEvent::FlyerDestroyed { points, .. } => {
                core.score += u64::from(points);
                log::info!("Bonus flyer destroyed: +{points}");
            }
            GameEvent::FormationReachedBottom => {
                end_game(core, "the formation reached the bottom");
            }
            GameEvent::PlayerFireRequested { origin } => {
                if core.projectiles.try_fire_player(origin) {
                    core.flyer.on_player_shot_fired();
                }
            }
            GameEvent::PlayerDeathAnimationComplete => {
                if core.lives > 0 {
                    let start = core.player.start_position();
                    core.player.respawn(start);
                } else {
                    end_game(core, "no lives left");
                }
            }
            GameEvent::FlyerSpawned { .. } | GameEvent::FlyerEscaped => {}
        }
    }
    core.last_events = events;
}

/// Start the countdown (or declare victory) once the formation is gone
fn check_round_end(core: &mut GameCore) {
    if core.state != GameState::Playing || !core.formation.is_empty() {
        return;
    }

    // A last-life death still in progress ends the run
    if core.lives == 0 {
        end_game(core, "no lives left");
        return;
    }

    match core.settings.waves.max_waves {
        Some(max) if core.wave >= max => {
            core.state = GameState::Victory;
            log::info!("Victory! Final score {}", core.score);
        }
        _ => {
            core.transition_timer = Some(core.settings.waves.transition_duration);
            log::info!("Wave {} cleared, score {}", core.wave, core.score);
        }
    }
}

fn end_game(core: &mut GameCore, reason: &str) {
    if core.state == GameState::GameOver {
        return;
    }
    core.state = GameState::GameOver;
    core.transition_timer = None;
    log::info!("Game over ({reason}): score {}, wave {}", core.score, core.wave);
}

/// Reset every transient manager for wave `wave`, keeping score and lives
pub fn start_wave(core: &mut GameCore, wave: u32) {
    let wave = wave.max(1);
    core.wave = wave;
    core.transition_timer = None;
    core.formation.reset_for_wave(wave);
    core.projectiles.clear();
    core.shooter.reset();
    core.terrain.reset();
    core.flyer.reset(&mut core.rng);
    core.march.reset();
    let start = core.player.start_position();
    core.player.reset(start);
    core.events.clear();
    log::info!(
        "Wave {wave}: formation speed {:.1}, {} lives, score {}",
        core.formation.speed(),
        core.lives,
        core.score
    );
}

impl GameCore {
    /// See [`tick`]
    pub fn tick(&mut self, input: &dyn InputSource, dt: f32) {
        tick(self, input, dt);
    }
}
