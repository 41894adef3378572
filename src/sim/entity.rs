//! Shared entity capabilities
//!
//! The set of simulated kinds is closed, so instead of a class hierarchy every
//! mover implements [`Entity`] and borrowed views are passed around as the
//! tagged [`EntityRef`].

use glam::Vec2;

use super::flyer::BonusFlyer;
use super::formation::Member;
use super::geometry::Rect;
use super::player::Player;
use super::projectile::Projectile;
use super::terrain::TerrainBlock;

/// Closed set of simulated kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Player,
    Projectile,
    FormationMember,
    BonusFlyer,
    TerrainBlock,
}

/// Lifecycle contract every simulated object shares
pub trait Entity {
    fn kind(&self) -> EntityKind;
    fn position(&self) -> Vec2;
    fn size(&self) -> Vec2;
    fn is_active(&self) -> bool;

    fn bounds(&self) -> Rect {
        Rect::from_pos_size(self.position(), self.size())
    }
}

/// Borrowed view of any entity, for exhaustive dispatch
#[derive(Debug, Clone, Copy)]
pub enum EntityRef<'a> {
    Player(&'a Player),
    Projectile(&'a Projectile),
    Member(&'a Member),
    Flyer(&'a BonusFlyer),
    Terrain(&'a TerrainBlock),
}

impl EntityRef<'_> {
    fn as_entity(&self) -> &dyn Entity {
        match *self {
            EntityRef::Player(p) => p,
            EntityRef::Projectile(p) => p,
            EntityRef::Member(m) => m,
            EntityRef::Flyer(f) => f,
            EntityRef::Terrain(t) => t,
        }
    }
}

impl Entity for EntityRef<'_> {
    fn kind(&self) -> EntityKind {
        self.as_entity().kind()
    }

    fn position(&self) -> Vec2 {
        self.as_entity().position()
    }

    fn size(&self) -> Vec2 {
        self.as_entity().size()
    }

    fn is_active(&self) -> bool {
        self.as_entity().is_active()
    }

    fn bounds(&self) -> Rect {
        self.as_entity().bounds()
    }
}
