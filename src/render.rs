//! Renderer collaborator boundary
//!
//! Drawing happens outside this crate. Screens describe a frame through the
//! [`Renderer`] trait; sprite lookup and rasterization belong to whoever
//! implements it.

use glam::Vec2;

use crate::sim::{Entity, EntityRef, GameCore, MemberKind, Owner, Rect};

/// Logical sprite identifiers, resolved by the renderer's own asset table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpriteKey {
    Member { kind: MemberKind, frame: u32 },
    Player,
    PlayerExplosion { frame: u32 },
    Flyer,
    PlayerShot,
    EnemyShot,
}

/// Palette, after the cellophane strips on the original cabinet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tint {
    White,
    Green,
    Red,
    Yellow,
    Dim,
}

/// What a frame can ask of the output device
pub trait Renderer {
    fn clear(&mut self);
    fn draw_sprite(&mut self, sprite: SpriteKey, pos: Vec2, tint: Tint);
    fn draw_pixel(&mut self, pos: Vec2, tint: Tint);
    fn fill_rect(&mut self, rect: Rect, tint: Tint);
    fn draw_text(&mut self, text: &str, pos: Vec2, tint: Tint);
    /// Horizontally centred on the field at height `y`
    fn draw_text_centered(&mut self, text: &str, y: f32, tint: Tint);
}

/// Draw the playfield and HUD for `core`
pub fn draw_world(core: &GameCore, renderer: &mut dyn Renderer) {
    let frame = core.animation_frame();

    for entity in core.entities() {
        match entity {
            EntityRef::Terrain(block) => {
                for (x, y) in block.solid_pixels() {
                    renderer.draw_pixel(block.pos + Vec2::new(x as f32, y as f32), Tint::Green);
                }
            }
            EntityRef::Member(member) => {
                renderer.draw_sprite(
                    SpriteKey::Member {
                        kind: member.kind,
                        frame,
                    },
                    member.pos,
                    Tint::White,
                );
            }
            EntityRef::Projectile(projectile) => {
                let sprite = match projectile.owner() {
                    Owner::Player => SpriteKey::PlayerShot,
                    Owner::Enemy => SpriteKey::EnemyShot,
                };
                renderer.draw_sprite(sprite, projectile.position(), Tint::White);
            }
            EntityRef::Flyer(flyer) => {
                renderer.draw_sprite(SpriteKey::Flyer, flyer.position(), Tint::Red);
            }
            EntityRef::Player(player) => {
                if !player.should_render() {
                    continue;
                }
                let sprite = match player.state() {
                    crate::sim::PlayerState::Dying => SpriteKey::PlayerExplosion {
                        frame: player.death_frame(),
                    },
                    _ => SpriteKey::Player,
                };
                renderer.draw_sprite(sprite, player.position(), Tint::Green);
            }
        }
    }

    draw_hud(core, renderer);
}

fn draw_hud(core: &GameCore, renderer: &mut dyn Renderer) {
    renderer.draw_text(&format!("SCORE {:05}", core.score()), Vec2::new(8.0, 8.0), Tint::White);
    renderer.draw_text(&format!("WAVE {}", core.wave()), Vec2::new(150.0, 8.0), Tint::White);
    let bottom = core.settings().field.height - 12.0;
    renderer.draw_text(&format!("{}", core.lives()), Vec2::new(8.0, bottom), Tint::White);
    for i in 0..core.lives().saturating_sub(1) {
        renderer.draw_sprite(SpriteKey::Player, Vec2::new(24.0 + i as f32 * 16.0, bottom), Tint::Green);
    }

    if core.is_transitioning() {
        renderer.draw_text_centered(&format!("WAVE {}", core.wave() + 1), 120.0, Tint::Yellow);
        renderer.draw_text_centered(
            &format!("GET READY {:.0}", core.transition_remaining().ceil()),
            136.0,
            Tint::Yellow,
        );
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Records draw calls as strings
    #[derive(Debug, Default)]
    pub struct RecordingRenderer {
        pub calls: Vec<String>,
    }

    impl RecordingRenderer {
        pub fn count_sprites(&self, prefix: &str) -> usize {
            self.calls
                .iter()
                .filter(|c| c.starts_with(&format!("sprite {prefix}")))
                .count()
        }

        pub fn has_text(&self, needle: &str) -> bool {
            self.calls
                .iter()
                .any(|c| c.starts_with("text") && c.contains(needle))
        }
    }

    impl Renderer for RecordingRenderer {
        fn clear(&mut self) {
            self.calls.push("clear".into());
        }

        fn draw_sprite(&mut self, sprite: SpriteKey, pos: Vec2, _tint: Tint) {
            self.calls.push(format!("sprite {sprite:?} {pos}"));
        }

        fn draw_pixel(&mut self, pos: Vec2, _tint: Tint) {
            self.calls.push(format!("pixel {pos}"));
        }

        fn fill_rect(&mut self, rect: Rect, _tint: Tint) {
            self.calls.push(format!("rect {rect:?}"));
        }

        fn draw_text(&mut self, text: &str, _pos: Vec2, _tint: Tint) {
            self.calls.push(format!("text {text}"));
        }

        fn draw_text_centered(&mut self, text: &str, _y: f32, _tint: Tint) {
            self.calls.push(format!("text {text}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingRenderer;
    use super::*;
    use crate::settings::Settings;

    #[test]
    fn test_draw_world_covers_entities() {
        let core = GameCore::new(Settings::default(), 3).unwrap();
        let mut renderer = RecordingRenderer::default();
        draw_world(&core, &mut renderer);

        assert_eq!(renderer.count_sprites("Member"), 55);
        assert_eq!(renderer.count_sprites("Player"), 1 + 2);
        let pixels = renderer.calls.iter().filter(|c| c.starts_with("pixel")).count();
        let solid_per_block = core.terrain().blocks()[0].solid_pixels().count();
        assert_eq!(pixels, 4 * solid_per_block);
        assert!(renderer.has_text("SCORE 00000"));
        assert!(renderer.has_text("WAVE 1"));
    }
}
