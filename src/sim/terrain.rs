//! Destructible shields
//!
//! Each block is a boolean pixel grid plus the pattern it was built from.
//! Projectiles erode a roughly circular crater around the first solid pixel
//! under their footprint; edge pixels survive with some probability so the
//! damage looks organic.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityKind};
use super::geometry::Rect;
use super::projectile::{Owner, Projectile};
use crate::error::SetupError;
use crate::settings::Settings;

/// Classic 22x16 bunker
pub const CLASSIC_SHIELD_PATTERN: [&str; 16] = [
    "    XXXXXXXXXXXXXX    ",
    "   XXXXXXXXXXXXXXXX   ",
    "  XXXXXXXXXXXXXXXXXX  ",
    " XXXXXXXXXXXXXXXXXXXX ",
    "XXXXXXXXXXXXXXXXXXXXXX",
    "XXXXXXXXXXXXXXXXXXXXXX",
    "XXXXXXXXXXXXXXXXXXXXXX",
    "XXXXXXXXXXXXXXXXXXXXXX",
    "XXXXXXXXXXXXXXXXXXXXXX",
    "XXXXXXXXXXXXXXXXXXXXXX",
    "XXXXXXXXXXXXXXXXXXXXXX",
    "XXXXXXX      XXXXXXXXX",
    "XXXXXX        XXXXXXXX",
    "XXXXX          XXXXXXX",
    "XXXXX          XXXXXXX",
    "XXXXX          XXXXXXX",
];

/// Share of clear probability lost at the crater rim
const EDGE_SURVIVAL: f32 = 0.3;

/// Validated rectangular bitmap, row-major
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainPattern {
    width: usize,
    height: usize,
    pixels: Vec<bool>,
}

impl TerrainPattern {
    /// Parse rows of text; any non-space character is solid
    pub fn parse<S: AsRef<str>>(rows: &[S]) -> Result<Self, SetupError> {
        let first = rows.first().ok_or(SetupError::EmptyPattern)?;
        let width = first.as_ref().chars().count();
        if width == 0 {
            return Err(SetupError::EmptyPattern);
        }

        let mut pixels = Vec::with_capacity(width * rows.len());
        for (row, line) in rows.iter().enumerate() {
            let found = line.as_ref().chars().count();
            if found != width {
                return Err(SetupError::RaggedPattern {
                    row,
                    expected: width,
                    found,
                });
            }
            pixels.extend(line.as_ref().chars().map(|c| c != ' '));
        }

        if !pixels.iter().any(|&p| p) {
            return Err(SetupError::HollowPattern);
        }

        Ok(Self {
            width,
            height: rows.len(),
            pixels,
        })
    }

    pub fn classic() -> Result<Self, SetupError> {
        Self::parse(&CLASSIC_SHIELD_PATTERN)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }
}

/// A single shield
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainBlock {
    pub pos: Vec2,
    width: usize,
    height: usize,
    pixels: Vec<bool>,
    original: Vec<bool>,
    active: bool,
}

impl TerrainBlock {
    pub fn new(pos: Vec2, pattern: &TerrainPattern) -> Self {
        Self {
            pos,
            width: pattern.width,
            height: pattern.height,
            pixels: pattern.pixels.clone(),
            original: pattern.pixels.clone(),
            active: true,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Local pixel; out-of-range coordinates are empty
    pub fn pixel(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return false;
        }
        self.pixels[y as usize * self.width + x as usize]
    }

    /// Local coordinates of every solid pixel, row-major
    pub fn solid_pixels(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.pixels
            .iter()
            .enumerate()
            .filter(|(_, solid)| **solid)
            .map(|(i, _)| (i % self.width, i / self.width))
    }

    pub fn is_completely_destroyed(&self) -> bool {
        !self.pixels.iter().any(|&p| p)
    }

    /// Test `footprint` against the grid and erode on the first solid pixel.
    /// Returns true if the footprint hit something.
    pub fn check_collision(&mut self, footprint: Rect, radius: i32, rng: &mut impl Rng) -> bool {
        if !self.active || !footprint.intersects(&self.bounds()) {
            return false;
        }

        let local_x = (footprint.x - self.pos.x).floor() as i32;
        let local_y = (footprint.y - self.pos.y).floor() as i32;
        let w = (footprint.width.ceil() as i32).max(1);
        let h = (footprint.height.ceil() as i32).max(1);

        for dy in 0..h {
            for dx in 0..w {
                let (x, y) = (local_x + dx, local_y + dy);
                if self.pixel(x, y) {
                    self.damage(x, y, radius, rng);
                    if self.is_completely_destroyed() {
                        self.active = false;
                    }
                    return true;
                }
            }
        }
        false
    }

    /// Clear pixels within `radius` of (cx, cy), nearer ones more reliably
    fn damage(&mut self, cx: i32, cy: i32, radius: i32, rng: &mut impl Rng) {
        let r = radius.max(1) as f32;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let distance = ((dx * dx + dy * dy) as f32).sqrt();
                if distance > r || !self.pixel(cx + dx, cy + dy) {
                    continue;
                }
                let clear_chance = 1.0 - (distance / r) * EDGE_SURVIVAL;
                if rng.random::<f32>() < clear_chance {
                    let index = (cy + dy) as usize * self.width + (cx + dx) as usize;
                    self.pixels[index] = false;
                }
            }
        }
    }

    /// Crushed outright
    pub fn destroy(&mut self) {
        self.pixels.fill(false);
        self.active = false;
    }

    /// Restore the original pattern
    pub fn reset(&mut self) {
        self.pixels.clone_from(&self.original);
        self.active = true;
    }
}

impl Entity for TerrainBlock {
    fn kind(&self) -> EntityKind {
        EntityKind::TerrainBlock
    }

    fn position(&self) -> Vec2 {
        self.pos
    }

    fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

/// The row of shields
#[derive(Debug, Clone)]
pub struct TerrainSet {
    blocks: Vec<TerrainBlock>,
    player_radius: i32,
    enemy_radius: i32,
}

impl TerrainSet {
    /// Lay blocks out with equal gaps across the field
    pub fn new(settings: &Settings) -> Result<Self, SetupError> {
        let pattern = settings.terrain_pattern()?;
        let count = settings.terrain.count;
        let block_width = pattern.width() as f32;
        let spacing = (settings.field.width - count as f32 * block_width) / (count as f32 + 1.0);
        let blocks = (0..count)
            .map(|i| {
                let x = spacing + i as f32 * (block_width + spacing);
                TerrainBlock::new(Vec2::new(x, settings.terrain.y), &pattern)
            })
            .collect();
        Ok(Self {
            blocks,
            player_radius: settings.terrain.player_damage_radius,
            enemy_radius: settings.terrain.enemy_damage_radius,
        })
    }

    /// Index of the first block the projectile hit, if any
    pub fn check_projectile(&mut self, projectile: &Projectile, rng: &mut impl Rng) -> Option<usize> {
        let radius = match projectile.owner() {
            Owner::Player => self.player_radius,
            Owner::Enemy => self.enemy_radius,
        };
        let footprint = projectile.bounds();
        self.blocks
            .iter_mut()
            .position(|block| block.check_collision(footprint, radius, &mut *rng))
    }

    /// Destroy every active block overlapping `bounds`, returning their indices
    pub fn crush(&mut self, bounds: Rect) -> Vec<usize> {
        let mut crushed = Vec::new();
        for (i, block) in self.blocks.iter_mut().enumerate() {
            if block.is_active() && bounds.intersects(&block.bounds()) {
                block.destroy();
                crushed.push(i);
            }
        }
        crushed
    }

    pub fn reset(&mut self) {
        for block in &mut self.blocks {
            block.reset();
        }
    }

    pub fn blocks(&self) -> &[TerrainBlock] {
        &self.blocks
    }

    pub fn active_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_active()).count()
    }
}
