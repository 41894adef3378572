//! Bonus flyer and its spawn scheduler
//!
//! A flyer crosses the top of the field on a randomized timer. Its value is
//! fixed at spawn: the maximum if the player's shots since the last flyer
//! kill are a positive multiple of the bonus period, otherwise a uniform pick
//! from the lesser values.

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityKind};
use super::events::{EventQueue, GameEvent};
use crate::settings::{FlyerSettings, Settings};

/// The mystery ship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BonusFlyer {
    pub pos: Vec2,
    pub size: Vec2,
    /// +1 left-to-right, -1 right-to-left
    pub direction: f32,
    pub speed: f32,
    points: u32,
    pub active: bool,
}

impl BonusFlyer {
    /// Just off the edge it travels away from
    pub fn spawn(direction: f32, points: u32, config: &FlyerSettings, field_width: f32) -> Self {
        let x = if direction > 0.0 {
            -config.size.x
        } else {
            field_width
        };
        Self {
            pos: Vec2::new(x, config.y),
            size: config.size,
            direction,
            speed: config.speed,
            points,
            active: true,
        }
    }

    pub fn points(&self) -> u32 {
        self.points
    }

    /// Move, deactivating once fully past the far edge
    pub fn advance(&mut self, dt: f32, field_width: f32) {
        if !self.active {
            return;
        }
        self.pos.x += self.direction * self.speed * dt;
        let gone = if self.direction > 0.0 {
            self.pos.x > field_width
        } else {
            self.pos.x + self.size.x < 0.0
        };
        if gone {
            self.active = false;
        }
    }
}

impl Entity for BonusFlyer {
    fn kind(&self) -> EntityKind {
        EntityKind::BonusFlyer
    }

    fn position(&self) -> Vec2 {
        self.pos
    }

    fn size(&self) -> Vec2 {
        self.size
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

#[derive(Debug, Clone)]
pub struct FlyerScheduler {
    config: FlyerSettings,
    field_width: f32,
    /// Time since the last spawn (or reset) with no flyer on screen
    timer: f32,
    next_spawn: f32,
    /// Reset only by a kill, never by an escape
    shots_since_kill: u32,
    current: Option<BonusFlyer>,
}

impl FlyerScheduler {
    pub fn new(settings: &Settings, rng: &mut impl Rng) -> Self {
        let mut scheduler = Self {
            config: settings.flyer.clone(),
            field_width: settings.field.width,
            timer: 0.0,
            next_spawn: 0.0,
            shots_since_kill: 0,
            current: None,
        };
        scheduler.next_spawn = scheduler.draw_spawn_time(rng);
        scheduler
    }

    fn draw_spawn_time(&self, rng: &mut impl Rng) -> f32 {
        if self.config.max_spawn_time > self.config.min_spawn_time {
            rng.random_range(self.config.min_spawn_time..=self.config.max_spawn_time)
        } else {
            self.config.min_spawn_time
        }
    }

    /// Point value a flyer spawned now would carry
    pub fn next_value(&self, rng: &mut impl Rng) -> u32 {
        let period = self.config.bonus_shot_period.max(1);
        if self.shots_since_kill > 0 && self.shots_since_kill % period == 0 {
            self.config.max_points
        } else {
            self.config
                .lesser_points
                .choose(rng)
                .copied()
                .unwrap_or(self.config.max_points)
        }
    }

    pub fn advance(&mut self, dt: f32, rng: &mut impl Rng, events: &mut EventQueue) {
        if let Some(flyer) = &mut self.current {
            flyer.advance(dt, self.field_width);
            if !flyer.active {
                // Dropped on the same call that sees it leave, not a tick later
                log::debug!("Flyer escaped ({} shots since last kill)", self.shots_since_kill);
                self.current = None;
                events.push(GameEvent::FlyerEscaped);
            }
            return;
        }

        self.timer += dt;
        if self.timer >= self.next_spawn {
            self.spawn(rng, events);
        }
    }

    fn spawn(&mut self, rng: &mut impl Rng, events: &mut EventQueue) {
        let direction = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        let points = self.next_value(rng);
        log::debug!(
            "Flyer spawned: direction {direction}, worth {points} (shots since kill: {})",
            self.shots_since_kill
        );
        self.current = Some(BonusFlyer::spawn(
            direction,
            points,
            &self.config,
            self.field_width,
        ));
        self.timer = 0.0;
        self.next_spawn = self.draw_spawn_time(rng);
        events.push(GameEvent::FlyerSpawned { direction, points });
    }

    pub fn on_player_shot_fired(&mut self) {
        self.shots_since_kill = self.shots_since_kill.saturating_add(1);
    }

    /// Destroy the current flyer if its bounds contain `impact`
    pub fn try_destroy(&mut self, impact: Vec2, events: &mut EventQueue) -> bool {
        let Some(flyer) = self
            .current
            .take_if(|f| f.active && f.bounds().contains(impact))
        else {
            return false;
        };
        self.shots_since_kill = 0;
        log::debug!("Flyer destroyed for {} points", flyer.points);
        events.push(GameEvent::FlyerDestroyed {
            points: flyer.points,
            position: flyer.pos,
        });
        true
    }

    pub fn current(&self) -> Option<&BonusFlyer> {
        self.current.as_ref()
    }

    pub fn shots_since_kill(&self) -> u32 {
        self.shots_since_kill
    }

    pub fn time_until_spawn(&self) -> f32 {
        (self.next_spawn - self.timer).max(0.0)
    }

    pub fn reset(&mut self, rng: &mut impl Rng) {
        self.current = None;
        self.shots_since_kill = 0;
        self.timer = 0.0;
        self.next_spawn = self.draw_spawn_time(rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn spawned_value(shots: u32, seed: u64) -> u32 {
        let settings = Settings::default();
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut events = EventQueue::new();
        let mut scheduler = FlyerScheduler::new(&settings, &mut rng);
        for _ in 0..shots {
            scheduler.on_player_shot_fired();
        }
        scheduler.advance(settings.flyer.max_spawn_time + 1.0, &mut rng, &mut events);
        scheduler.current().map(|f| f.points()).unwrap()
    }

    #[test]
    fn test_fifteen_shots_gives_max_value() {
        for seed in 0..20 {
            assert_eq!(spawned_value(15, seed), 300);
            assert_eq!(spawned_value(30, seed), 300);
        }
    }

    #[test]
    fn test_other_counts_give_lesser_values() {
        for seed in 0..20 {
            for shots in [0, 1, 14, 16] {
                let value = spawned_value(shots, seed);
                assert!([50, 100, 150].contains(&value), "{shots} shots gave {value}");
            }
        }
    }

    #[test]
    fn test_spawns_off_the_matching_edge() {
        let config = FlyerSettings::default();
        let right = BonusFlyer::spawn(1.0, 50, &config, 224.0);
        assert_eq!(right.pos, Vec2::new(-16.0, 24.0));
        let left = BonusFlyer::spawn(-1.0, 50, &config, 224.0);
        assert_eq!(left.pos, Vec2::new(224.0, 24.0));
    }

    #[test]
    fn test_escape_keeps_shot_counter() {
        let settings = Settings::default();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut events = EventQueue::new();
        let mut scheduler = FlyerScheduler::new(&settings, &mut rng);
        for _ in 0..7 {
            scheduler.on_player_shot_fired();
        }
        scheduler.advance(31.0, &mut rng, &mut events);
        assert!(scheduler.current().is_some());

        // 240 px of travel at 60 px/s
        for _ in 0..50 {
            scheduler.advance(0.1, &mut rng, &mut events);
        }
        assert!(scheduler.current().is_none());
        assert!(events.iter().any(|e| *e == GameEvent::FlyerEscaped));
        assert_eq!(scheduler.shots_since_kill(), 7);
    }

    #[test]
    fn test_escape_clears_flyer_on_the_same_call() {
        let settings = Settings::default();
        let mut rng = Pcg32::seed_from_u64(8);
        let mut events = EventQueue::new();
        let mut scheduler = FlyerScheduler::new(&settings, &mut rng);
        scheduler.advance(31.0, &mut rng, &mut events);
        assert!(scheduler.current().is_some());
        events.clear();

        // One step long enough to cross the whole field
        scheduler.advance(5.0, &mut rng, &mut events);
        assert!(scheduler.current().is_none());
        assert_eq!(events.iter().collect::<Vec<_>>(), vec![&GameEvent::FlyerEscaped]);
    }

    #[test]
    fn test_destroy_resets_shot_counter() {
        let settings = Settings::default();
        let mut rng = Pcg32::seed_from_u64(11);
        let mut events = EventQueue::new();
        let mut scheduler = FlyerScheduler::new(&settings, &mut rng);
        scheduler.on_player_shot_fired();
        scheduler.advance(31.0, &mut rng, &mut events);
        scheduler.advance(1.0, &mut rng, &mut events);

        assert!(!scheduler.try_destroy(Vec2::new(0.0, 200.0), &mut events));
        let center = scheduler.current().unwrap().bounds().center();
        let points = scheduler.current().unwrap().points();
        assert!(scheduler.try_destroy(center, &mut events));
        assert!(scheduler.current().is_none());
        assert_eq!(scheduler.shots_since_kill(), 0);
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::FlyerDestroyed { points: p, .. } if *p == points)));
    }

    #[test]
    fn test_no_spawn_before_timer() {
        let settings = Settings::default();
        let mut rng = Pcg32::seed_from_u64(5);
        let mut events = EventQueue::new();
        let mut scheduler = FlyerScheduler::new(&settings, &mut rng);
        assert!(scheduler.time_until_spawn() >= settings.flyer.min_spawn_time);
        scheduler.advance(settings.flyer.min_spawn_time - 1.0, &mut rng, &mut events);
        assert!(scheduler.current().is_none());
        assert!(events.is_empty());

        scheduler.reset(&mut rng);
        assert_eq!(scheduler.shots_since_kill(), 0);
    }
}
