//! Projectile pool
//!
//! Owns every projectile in flight. The player-fire cap is enforced here; the
//! enemy cap belongs to the shooter controller.

use glam::Vec2;

use super::projectile::{Owner, Projectile};
use crate::settings::Settings;

#[derive(Debug, Clone)]
pub struct ProjectilePool {
    /// Spawn order; inactive entries linger until compaction
    projectiles: Vec<Projectile>,
    next_id: u32,
    max_player: usize,
    player_speed: f32,
    enemy_speed: f32,
    player_size: Vec2,
    enemy_size: Vec2,
    field_height: f32,
    compaction_threshold: usize,
}

impl ProjectilePool {
    pub fn new(settings: &Settings) -> Self {
        let p = &settings.projectiles;
        Self {
            projectiles: Vec::new(),
            next_id: 1,
            max_player: p.max_player,
            player_speed: p.player_speed,
            enemy_speed: p.enemy_speed,
            player_size: p.player_size,
            enemy_size: p.enemy_size,
            field_height: settings.field.height,
            compaction_threshold: p.compaction_threshold,
        }
    }

    /// Spawn a projectile with its top-left corner at `pos`, ignoring caps
    pub fn spawn_at(&mut self, owner: Owner, pos: Vec2) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        let (size, velocity_y) = match owner {
            Owner::Player => (self.player_size, -self.player_speed),
            Owner::Enemy => (self.enemy_size, self.enemy_speed),
        };
        self.projectiles
            .push(Projectile::new(id, owner, pos, size, velocity_y));
        id
    }

    /// Fire upward from `origin` (bottom-centre of the shot).
    /// Returns false when the player cap is already reached.
    pub fn try_fire_player(&mut self, origin: Vec2) -> bool {
        if self.active_player_count() >= self.max_player {
            return false;
        }
        let pos = Vec2::new(
            origin.x - self.player_size.x * 0.5,
            origin.y - self.player_size.y,
        );
        self.spawn_at(Owner::Player, pos);
        true
    }

    /// Fire downward from `origin` (top-centre of the shot)
    pub fn fire_enemy(&mut self, origin: Vec2) -> u32 {
        let pos = Vec2::new(origin.x - self.enemy_size.x * 0.5, origin.y);
        self.spawn_at(Owner::Enemy, pos)
    }

    pub fn advance(&mut self, dt: f32) {
        for projectile in &mut self.projectiles {
            projectile.advance(dt, self.field_height);
        }
        if self.projectiles.len() > self.compaction_threshold {
            // retain keeps the relative order of survivors
            self.projectiles.retain(|p| p.active);
        }
    }

    pub fn active(&self) -> impl Iterator<Item = &Projectile> {
        self.projectiles.iter().filter(|p| p.active)
    }

    pub fn player_projectiles(&self) -> impl Iterator<Item = &Projectile> {
        self.active().filter(|p| p.owner() == Owner::Player)
    }

    pub fn enemy_projectiles(&self) -> impl Iterator<Item = &Projectile> {
        self.active().filter(|p| p.owner() == Owner::Enemy)
    }

    /// IDs of active projectiles of one owner, in spawn order
    pub fn active_ids(&self, owner: Owner) -> Vec<u32> {
        self.active()
            .filter(|p| p.owner() == owner)
            .map(|p| p.id)
            .collect()
    }

    /// Look up an active projectile
    pub fn get(&self, id: u32) -> Option<&Projectile> {
        self.active().find(|p| p.id == id)
    }

    pub fn active_player_count(&self) -> usize {
        self.player_projectiles().count()
    }

    pub fn active_enemy_count(&self) -> usize {
        self.enemy_projectiles().count()
    }

    /// Deactivate; returns false if `id` was not active
    pub fn destroy(&mut self, id: u32) -> bool {
        match self.projectiles.iter_mut().find(|p| p.active && p.id == id) {
            Some(projectile) => {
                projectile.active = false;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.projectiles.clear();
    }

    /// Entries held in backing storage, including inactive ones
    pub fn storage_len(&self) -> usize {
        self.projectiles.len()
    }
}
