//! Collision engine
//!
//! One pass per frame, in a fixed order:
//! 1. every projectile vs terrain (player-owned first, then enemy-owned)
//! 2. player projectiles vs formation members, then vs the bonus flyer
//! 3. enemy projectiles vs the player, only while vulnerable
//! 4. formation members crushing terrain
//!
//! A projectile consumed by one step is gone for every later step. The engine
//! deactivates entities through their managers and publishes what happened;
//! score, lives and player state are left to whoever drains the queue.

use rand::Rng;

use super::entity::Entity;
use super::events::{Collision, EventQueue, GameEvent};
use super::flyer::FlyerScheduler;
use super::formation::Formation;
use super::player::Player;
use super::pool::ProjectilePool;
use super::projectile::Owner;
use super::terrain::TerrainSet;

/// Everything one collision pass may touch
pub struct CollisionTargets<'a> {
    pub projectiles: &'a mut ProjectilePool,
    pub formation: &'a mut Formation,
    pub terrain: &'a mut TerrainSet,
    pub flyer: &'a mut FlyerScheduler,
    pub player: &'a Player,
}

#[derive(Debug, Clone, Default)]
pub struct CollisionEngine {
    last_frame_hits: usize,
}

impl CollisionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the full pass, publishing one `GameEvent::Collision` per hit
    pub fn check_all(
        &mut self,
        targets: CollisionTargets<'_>,
        rng: &mut impl Rng,
        events: &mut EventQueue,
    ) {
        let CollisionTargets {
            projectiles,
            formation,
            terrain,
            flyer,
            player,
        } = targets;
        let start = events.len();

        for owner in [Owner::Player, Owner::Enemy] {
            for id in projectiles.active_ids(owner) {
                let Some(footprint) = projectiles.get(id).cloned() else {
                    continue;
                };
                if let Some(block) = terrain.check_projectile(&footprint, &mut *rng) {
                    projectiles.destroy(id);
                    events.collision(Collision::BulletHitShield {
                        projectile: id,
                        owner,
                        block,
                    });
                }
            }
        }

        for id in projectiles.active_ids(Owner::Player) {
            let Some(bounds) = projectiles.get(id).map(|p| p.bounds()) else {
                continue;
            };

            let member_hit = formation.members().find_map(|member| {
                bounds
                    .intersection(&member.bounds())
                    .map(|overlap| (member.slot, overlap.center()))
            });
            if let Some((member, impact)) = member_hit {
                projectiles.destroy(id);
                events.collision(Collision::PlayerBulletHitInvader {
                    projectile: id,
                    member,
                    impact,
                });
                formation.destroy_member_containing(impact, events);
                continue;
            }

            let flyer_hit = flyer
                .current()
                .filter(|f| f.is_active())
                .and_then(|f| bounds.intersection(&f.bounds()))
                .map(|overlap| overlap.center());
            if let Some(impact) = flyer_hit {
                projectiles.destroy(id);
                events.collision(Collision::PlayerBulletHitFlyer {
                    projectile: id,
                    impact,
                });
                flyer.try_destroy(impact, events);
            }
        }

        if player.is_vulnerable() {
            let target = player.bounds();
            let hit = projectiles
                .enemy_projectiles()
                .find(|p| p.bounds().intersects(&target))
                .map(|p| p.id);
            if let Some(id) = hit {
                projectiles.destroy(id);
                events.collision(Collision::InvaderBulletHitPlayer { projectile: id });
            }
        }

        let members: Vec<_> = formation.members().map(|m| (m.slot, m.bounds())).collect();
        for (member, bounds) in members {
            for block in terrain.crush(bounds) {
                events.collision(Collision::InvaderCrushedShield { member, block });
            }
        }

        self.last_frame_hits = events
            .iter()
            .skip(start)
            .filter(|e| matches!(e, GameEvent::Collision(_)))
            .count();
    }

    /// Collision records published by the most recent pass
    pub fn last_frame_hits(&self) -> usize {
        self.last_frame_hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::formation::SlotId;
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    struct World {
        pool: ProjectilePool,
        formation: Formation,
        terrain: TerrainSet,
        flyer: FlyerScheduler,
        player: Player,
        engine: CollisionEngine,
        rng: Pcg32,
        events: EventQueue,
    }

    impl World {
        fn with_formation_at(origin: Vec2) -> Self {
            let settings = Settings::default();
            let mut rng = Pcg32::seed_from_u64(42);
            Self {
                pool: ProjectilePool::new(&settings),
                formation: Formation::anchored(&settings, origin),
                terrain: TerrainSet::new(&settings).unwrap(),
                flyer: FlyerScheduler::new(&settings, &mut rng),
                player: Player::new(&settings),
                engine: CollisionEngine::new(),
                rng,
                events: EventQueue::new(),
            }
        }

        fn check(&mut self) -> Vec<Collision> {
            self.engine.check_all(
                CollisionTargets {
                    projectiles: &mut self.pool,
                    formation: &mut self.formation,
                    terrain: &mut self.terrain,
                    flyer: &mut self.flyer,
                    player: &self.player,
                },
                &mut self.rng,
                &mut self.events,
            );
            self.events
                .iter()
                .filter_map(|e| match e {
                    GameEvent::Collision(c) => Some(*c),
                    _ => None,
                })
                .collect()
        }
    }

    #[test]
    fn test_player_shot_hits_member() {
        let mut world = World::with_formation_at(Vec2::new(10.0, 10.0));
        let id = world.pool.spawn_at(Owner::Player, Vec2::new(10.0, 10.0));
        let slot = SlotId { row: 0, col: 0 };

        let hits = world.check();
        assert_eq!(hits.len(), 1);
        assert!(matches!(
            hits[0],
            Collision::PlayerBulletHitInvader { projectile, member, .. } if projectile == id && member == slot
        ));
        assert!(world.pool.get(id).is_none());
        assert!(world.formation.member(slot).is_none());
        assert_eq!(world.formation.active_count(), 54);
        assert_eq!(world.engine.last_frame_hits(), 1);
    }

    #[test]
    fn test_consumed_member_is_not_hit_twice() {
        let mut world = World::with_formation_at(Vec2::new(10.0, 10.0));
        let first = world.pool.spawn_at(Owner::Player, Vec2::new(10.0, 10.0));
        let second = world.pool.spawn_at(Owner::Player, Vec2::new(12.0, 10.0));

        let hits = world.check();
        assert_eq!(hits.len(), 1);
        assert!(matches!(
            hits[0],
            Collision::PlayerBulletHitInvader { projectile, .. } if projectile == first
        ));
        assert_eq!(world.formation.active_count(), 54);
        assert!(world.pool.get(second).is_some());
    }

    #[test]
    fn test_only_one_enemy_shot_hits_player() {
        let mut world = World::with_formation_at(Vec2::new(26.0, 32.0));
        let target = world.player.pos;
        let first = world.pool.spawn_at(Owner::Enemy, target);
        let second = world.pool.spawn_at(Owner::Enemy, target + Vec2::new(2.0, 0.0));

        let hits = world.check();
        assert_eq!(hits, vec![Collision::InvaderBulletHitPlayer { projectile: first }]);
        assert!(world.pool.get(first).is_none());
        assert!(world.pool.get(second).is_some());
    }

    #[test]
    fn test_dying_player_is_not_hit() {
        let mut world = World::with_formation_at(Vec2::new(26.0, 32.0));
        world.player.hit();
        let target = world.player.pos;
        world.pool.spawn_at(Owner::Enemy, target);

        assert!(world.check().is_empty());
        assert_eq!(world.pool.active_enemy_count(), 1);
    }

    #[test]
    fn test_shield_absorbs_before_members() {
        let mut world = World::with_formation_at(Vec2::new(26.0, 32.0));
        let block = world.terrain.blocks()[1].pos;
        let id = world.pool.spawn_at(Owner::Player, block + Vec2::new(10.0, 5.0));

        let hits = world.check();
        assert_eq!(
            hits,
            vec![Collision::BulletHitShield {
                projectile: id,
                owner: Owner::Player,
                block: 1,
            }]
        );
        assert!(world.pool.get(id).is_none());
        assert_eq!(world.formation.active_count(), 55);
    }

    #[test]
    fn test_enemy_shots_erode_shields() {
        let mut world = World::with_formation_at(Vec2::new(26.0, 32.0));
        let block = world.terrain.blocks()[2].pos;
        let id = world.pool.spawn_at(Owner::Enemy, block + Vec2::new(8.0, 0.0));

        let hits = world.check();
        assert_eq!(
            hits,
            vec![Collision::BulletHitShield {
                projectile: id,
                owner: Owner::Enemy,
                block: 2,
            }]
        );
    }

    #[test]
    fn test_members_crush_shields() {
        // Bottom row sits on the shields' top edge band
        let mut world = World::with_formation_at(Vec2::new(10.0, 116.0));
        let hits = world.check();
        assert!(!hits.is_empty());
        assert!(
            hits.iter()
                .all(|c| matches!(c, Collision::InvaderCrushedShield { member, .. } if member.row == 4))
        );
        for c in &hits {
            if let Collision::InvaderCrushedShield { block, .. } = c {
                assert!(world.terrain.blocks()[*block].is_completely_destroyed());
            }
        }
        // A block is crushed once even if several members overlap it
        let mut blocks: Vec<usize> = hits
            .iter()
            .filter_map(|c| match c {
                Collision::InvaderCrushedShield { block, .. } => Some(*block),
                _ => None,
            })
            .collect();
        let before = blocks.len();
        blocks.dedup();
        assert_eq!(blocks.len(), before);
    }

    #[test]
    fn test_player_shot_hits_flyer() {
        let mut world = World::with_formation_at(Vec2::new(26.0, 32.0));
        world.flyer.on_player_shot_fired();
        world
            .flyer
            .advance(31.0, &mut world.rng, &mut world.events);
        world.flyer.advance(1.0, &mut world.rng, &mut world.events);
        world.events.clear();

        let flyer_pos = world.flyer.current().unwrap().pos;
        let id = world.pool.spawn_at(Owner::Player, flyer_pos + Vec2::new(5.0, 1.0));

        let hits = world.check();
        assert_eq!(hits.len(), 1);
        assert!(matches!(hits[0], Collision::PlayerBulletHitFlyer { projectile, .. } if projectile == id));
        assert!(world.flyer.current().is_none());
        assert_eq!(world.flyer.shots_since_kill(), 0);
        assert!(
            world
                .events
                .iter()
                .any(|e| matches!(e, GameEvent::FlyerDestroyed { .. }))
        );
    }
}
