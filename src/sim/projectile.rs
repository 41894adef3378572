//! Straight-line projectiles

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityKind};

/// Who fired a projectile. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Owner {
    Player,
    Enemy,
}

/// A single shot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    owner: Owner,
    pub pos: Vec2,
    pub size: Vec2,
    /// Signed vertical speed (negative travels up)
    pub velocity_y: f32,
    pub active: bool,
}

impl Projectile {
    pub fn new(id: u32, owner: Owner, pos: Vec2, size: Vec2, velocity_y: f32) -> Self {
        Self {
            id,
            owner,
            pos,
            size,
            velocity_y,
            active: true,
        }
    }

    pub fn owner(&self) -> Owner {
        self.owner
    }

    /// Move and deactivate once fully outside the vertical field bounds
    pub fn advance(&mut self, dt: f32, field_height: f32) {
        if !self.active {
            return;
        }
        self.pos.y += self.velocity_y * dt;
        if self.pos.y <= -self.size.y || self.pos.y >= field_height {
            self.active = false;
        }
    }
}

impl Entity for Projectile {
    fn kind(&self) -> EntityKind {
        EntityKind::Projectile
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
