//! Formation fire control

use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::IndexedRandom;

use super::formation::Member;
use super::pool::ProjectilePool;
use crate::settings::Settings;

/// Decides when the formation fires and which member pulls the trigger
#[derive(Debug, Clone)]
pub struct ShooterController {
    base_interval: f32,
    min_interval: f32,
    column_spacing: f32,
    max_enemy: usize,
    /// Counts down to the next attempt
    timer: f32,
}

impl ShooterController {
    pub fn new(settings: &Settings) -> Self {
        Self {
            base_interval: settings.shooter.base_interval,
            min_interval: settings.shooter.min_interval,
            column_spacing: settings.formation.horizontal_spacing,
            max_enemy: settings.projectiles.max_enemy,
            timer: settings.shooter.base_interval,
        }
    }

    /// Interval before jitter, shrinking as the formation thins
    pub fn interval_for(&self, active: usize, total: usize) -> f32 {
        if total == 0 {
            return self.min_interval;
        }
        (self.base_interval * active as f32 / total as f32).max(self.min_interval)
    }

    /// Lowest member of each column, left to right
    pub fn candidates<'a>(&self, members: impl Iterator<Item = &'a Member>) -> Vec<&'a Member> {
        let mut columns: BTreeMap<i64, &Member> = BTreeMap::new();
        for member in members {
            let column = (member.pos.x / self.column_spacing).round() as i64;
            columns
                .entry(column)
                .and_modify(|lowest| {
                    if member.pos.y > lowest.pos.y {
                        *lowest = member;
                    }
                })
                .or_insert(member);
        }
        columns.into_values().collect()
    }

    /// Count down; when due, maybe fire and redraw the interval.
    /// Returns true if a projectile was fired.
    pub fn advance<'a>(
        &mut self,
        dt: f32,
        members: impl Iterator<Item = &'a Member>,
        total: usize,
        pool: &mut ProjectilePool,
        rng: &mut impl Rng,
    ) -> bool {
        self.timer -= dt;
        if self.timer > 0.0 {
            return false;
        }

        let members: Vec<&Member> = members.collect();
        let candidates = self.candidates(members.iter().copied());
        if candidates.is_empty() {
            self.timer = self.base_interval;
            return false;
        }

        let mut fired = false;
        if pool.active_enemy_count() < self.max_enemy {
            if let Some(shooter) = candidates.choose(rng) {
                pool.fire_enemy(shooter.muzzle());
                fired = true;
            }
        }

        let interval = self.interval_for(members.len(), total);
        self.timer = interval * rng.random_range(0.5..1.5);
        fired
    }

    pub fn reset(&mut self) {
        self.timer = self.base_interval;
    }

    pub fn time_until_next(&self) -> f32 {
        self.timer.max(0.0)
    }
}
