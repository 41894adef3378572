//! Typed per-frame notifications
//!
//! Managers push records while a frame runs; the core drains the queue once
//! the collision pass is over, so nothing mutates score or lives mid-scan.

use std::collections::VecDeque;

use glam::Vec2;

use super::formation::{MemberKind, SlotId};
use super::projectile::Owner;

/// Hits detected by the collision engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Collision {
    PlayerBulletHitInvader {
        projectile: u32,
        member: SlotId,
        impact: Vec2,
    },
    InvaderBulletHitPlayer {
        projectile: u32,
    },
    BulletHitShield {
        projectile: u32,
        owner: Owner,
        block: usize,
    },
    InvaderCrushedShield {
        member: SlotId,
        block: usize,
    },
    PlayerBulletHitFlyer {
        projectile: u32,
        impact: Vec2,
    },
}

/// Everything that happened during a frame, in publication order
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    Collision(Collision),
    MemberDestroyed {
        slot: SlotId,
        kind: MemberKind,
        points: u32,
        position: Vec2,
    },
    /// A bottom-row member crossed the danger line while dropping
    FormationReachedBottom,
    FlyerSpawned {
        direction: f32,
        points: u32,
    },
    /// Left the field undamaged
    FlyerEscaped,
    FlyerDestroyed {
        points: u32,
        position: Vec2,
    },
    PlayerFireRequested {
        origin: Vec2,
    },
    PlayerDeathAnimationComplete,
}

/// FIFO of frame events
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: VecDeque<GameEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: GameEvent) {
        self.events.push_back(event);
    }

    pub fn collision(&mut self, collision: Collision) {
        self.push(GameEvent::Collision(collision));
    }

    /// Remove and yield every queued event, oldest first
    pub fn drain(&mut self) -> std::collections::vec_deque::Drain<'_, GameEvent> {
        self.events.drain(..)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
