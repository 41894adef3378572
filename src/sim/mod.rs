//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only (one `Pcg32` owned by the core)
//! - Stable iteration order (row-major formation, spawn-order projectiles)
//! - No rendering or platform dependencies

pub mod animation;
pub mod collision;
pub mod entity;
pub mod events;
pub mod flyer;
pub mod formation;
pub mod geometry;
pub mod player;
pub mod pool;
pub mod projectile;
pub mod shooter;
pub mod state;
pub mod terrain;
pub mod tick;

pub use animation::AnimationClock;
pub use collision::{CollisionEngine, CollisionTargets};
pub use entity::{Entity, EntityKind, EntityRef};
pub use events::{Collision, EventQueue, GameEvent};
pub use flyer::{BonusFlyer, FlyerScheduler};
pub use formation::{Formation, Member, MemberKind, OccupancyBounds, SlotId};
pub use geometry::Rect;
pub use player::{Player, PlayerState, PlayerTrigger};
pub use pool::ProjectilePool;
pub use projectile::{Owner, Projectile};
pub use shooter::ShooterController;
pub use state::{GameCore, GameSnapshot, GameState};
pub use terrain::{TerrainBlock, TerrainPattern, TerrainSet};
pub use tick::{start_wave, tick};
