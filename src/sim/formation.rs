//! Enemy formation
//!
//! A sparse arena of row-major slots with per-row and per-column occupancy
//! counts. Removing a member is an O(1) slot invalidation followed by an
//! O(rows + cols) recompute of [`OccupancyBounds`]; the boundary check then
//! only looks at the two extreme columns.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityKind};
use super::events::{EventQueue, GameEvent};
use super::geometry::Rect;
use crate::settings::{FormationSettings, Settings};

/// Grid coordinates of a member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotId {
    pub row: usize,
    pub col: usize,
}

/// Member sprite class, which also fixes size and score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemberKind {
    Small,
    Medium,
    Large,
}

impl MemberKind {
    /// Top two rows are small, next two medium, the rest large
    pub fn for_row(row: usize) -> Self {
        match row {
            0 | 1 => MemberKind::Small,
            2 | 3 => MemberKind::Medium,
            _ => MemberKind::Large,
        }
    }

    pub fn size(&self, config: &FormationSettings) -> Vec2 {
        match self {
            MemberKind::Small => config.small_size,
            MemberKind::Medium => config.medium_size,
            MemberKind::Large => config.large_size,
        }
    }

    pub fn points(&self, config: &FormationSettings) -> u32 {
        match self {
            MemberKind::Small => config.small_points,
            MemberKind::Medium => config.medium_points,
            MemberKind::Large => config.large_points,
        }
    }
}

/// One invader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub slot: SlotId,
    pub kind: MemberKind,
    pub pos: Vec2,
    pub size: Vec2,
    pub points: u32,
    pub active: bool,
}

impl Member {
    /// Lower-centre point, where its shots leave from
    pub fn muzzle(&self) -> Vec2 {
        Vec2::new(self.pos.x + self.size.x * 0.5, self.pos.y + self.size.y)
    }
}

impl Entity for Member {
    fn kind(&self) -> EntityKind {
        EntityKind::FormationMember
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

/// Extreme occupied rows and columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupancyBounds {
    pub top_row: usize,
    pub bottom_row: usize,
    pub left_col: usize,
    pub right_col: usize,
}

impl OccupancyBounds {
    /// `None` when every count is zero
    pub fn from_counts(row_counts: &[usize], column_counts: &[usize]) -> Option<Self> {
        Some(Self {
            top_row: row_counts.iter().position(|&n| n > 0)?,
            bottom_row: row_counts.iter().rposition(|&n| n > 0)?,
            left_col: column_counts.iter().position(|&n| n > 0)?,
            right_col: column_counts.iter().rposition(|&n| n > 0)?,
        })
    }
}

/// The marching grid
#[derive(Debug, Clone)]
pub struct Formation {
    config: FormationSettings,
    field_width: f32,
    field_height: f32,
    /// Top-left of slot (0, 0) for wave 1
    origin: Vec2,
    slots: Vec<Option<Member>>,
    row_counts: Vec<usize>,
    column_counts: Vec<usize>,
    occupancy: Option<OccupancyBounds>,
    /// +1 right, -1 left
    direction: f32,
    base_speed: f32,
    speed: f32,
    total: usize,
    active_count: usize,
    wave: u32,
}

impl Formation {
    /// Full formation centred horizontally below the top margin
    pub fn new(settings: &Settings) -> Self {
        let config = &settings.formation;
        let origin = Vec2::new(
            (settings.field.width - Self::grid_width(config)) * 0.5,
            config.top_margin,
        );
        Self::anchored(settings, origin)
    }

    /// Full formation with slot (0, 0) at `origin`
    pub fn anchored(settings: &Settings, origin: Vec2) -> Self {
        let config = settings.formation.clone();
        let mut formation = Self {
            slots: Vec::new(),
            row_counts: vec![0; config.rows],
            column_counts: vec![0; config.columns],
            occupancy: None,
            direction: 1.0,
            base_speed: config.base_speed,
            speed: config.base_speed,
            total: config.rows * config.columns,
            active_count: 0,
            wave: 1,
            field_width: settings.field.width,
            field_height: settings.field.height,
            origin,
            config,
        };
        formation.populate();
        formation
    }

    /// Spacing between columns plus the widest member
    fn grid_width(config: &FormationSettings) -> f32 {
        let widest = config
            .small_size
            .x
            .max(config.medium_size.x)
            .max(config.large_size.x);
        (config.columns.saturating_sub(1)) as f32 * config.horizontal_spacing + widest
    }

    /// Base speed a wave starts at
    pub fn wave_base_speed(config: &FormationSettings, wave: u32) -> f32 {
        config.base_speed + wave.saturating_sub(1) as f32 * config.wave_speed_bonus
    }

    /// How much lower than wave 1 a wave starts
    pub fn wave_start_offset(config: &FormationSettings, wave: u32) -> f32 {
        (wave.saturating_sub(1) as f32 * config.wave_start_drop).min(config.max_wave_start_drop)
    }

    fn populate(&mut self) {
        let config = &self.config;
        let top = self.origin.y + Self::wave_start_offset(config, self.wave);
        let mut slots = Vec::with_capacity(self.total);
        for row in 0..config.rows {
            let kind = MemberKind::for_row(row);
            for col in 0..config.columns {
                slots.push(Some(Member {
                    slot: SlotId { row, col },
                    kind,
                    pos: Vec2::new(
                        self.origin.x + col as f32 * config.horizontal_spacing,
                        top + row as f32 * config.vertical_spacing,
                    ),
                    size: kind.size(config),
                    points: kind.points(config),
                    active: true,
                }));
            }
        }
        self.slots = slots;
        self.row_counts = vec![config.columns; config.rows];
        self.column_counts = vec![config.rows; config.columns];
        self.active_count = self.total;
        self.occupancy = OccupancyBounds::from_counts(&self.row_counts, &self.column_counts);
        self.direction = 1.0;
        self.base_speed = Self::wave_base_speed(config, self.wave);
        self.update_speed();
    }

    /// Restore the wave 1 layout
    pub fn reset(&mut self) {
        self.reset_for_wave(1);
    }

    /// Full formation at wave `n` difficulty
    pub fn reset_for_wave(&mut self, wave: u32) {
        self.wave = wave.max(1);
        self.populate();
    }

    fn update_speed(&mut self) {
        let destroyed = self.total - self.active_count;
        self.speed = self.base_speed + destroyed as f32 * self.config.speed_per_kill;
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> usize {
        row * self.config.columns + col
    }

    /// Bottom edge a member must not reach
    pub fn danger_line(&self) -> f32 {
        self.field_height - self.config.danger_zone
    }

    /// Step the formation by `dt`: translate, or drop and reverse at an edge
    pub fn advance(&mut self, dt: f32, events: &mut EventQueue) {
        let Some(bounds) = self.occupancy else {
            return;
        };
        let dx = self.direction * self.speed * dt;

        let mut at_edge = false;
        for row in bounds.top_row..=bounds.bottom_row {
            for col in [bounds.left_col, bounds.right_col] {
                if let Some(member) = &self.slots[self.index(row, col)] {
                    let future_x = member.pos.x + dx;
                    if future_x < 0.0 || future_x + member.size.x > self.field_width {
                        at_edge = true;
                    }
                }
            }
        }

        if !at_edge {
            for member in self.slots.iter_mut().flatten() {
                member.pos.x += dx;
            }
            return;
        }

        let drop = self.config.drop_distance;
        for member in self.slots.iter_mut().flatten() {
            member.pos.y += drop;
        }

        let danger_line = self.danger_line();
        let first = self.index(bounds.bottom_row, 0);
        let reached_bottom = self.slots[first..first + self.config.columns]
            .iter()
            .flatten()
            .any(|member| member.bounds().bottom() >= danger_line);
        if reached_bottom {
            log::debug!("Formation reached the danger line at y={danger_line}");
            events.push(GameEvent::FormationReachedBottom);
        }

        self.direction = -self.direction;
        self.update_speed();
        log::debug!(
            "Formation reversed (direction {}, speed {:.1})",
            self.direction,
            self.speed
        );
    }

    /// Destroy the first member whose bounds contain `point`.
    /// Returns false (and does nothing) when no member does.
    pub fn destroy_member_containing(&mut self, point: Vec2, events: &mut EventQueue) -> bool {
        let Some(index) = self
            .slots
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|m| m.bounds().contains(point)))
        else {
            return false;
        };
        let Some(mut member) = self.slots[index].take() else {
            return false;
        };
        member.active = false;

        self.row_counts[member.slot.row] -= 1;
        self.column_counts[member.slot.col] -= 1;
        self.active_count -= 1;
        self.occupancy = OccupancyBounds::from_counts(&self.row_counts, &self.column_counts);
        self.update_speed();

        events.push(GameEvent::MemberDestroyed {
            slot: member.slot,
            kind: member.kind,
            points: member.points,
            position: member.pos,
        });
        true
    }

    /// Active members in row-major order
    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.slots.iter().flatten()
    }

    pub fn member(&self, slot: SlotId) -> Option<&Member> {
        if slot.row >= self.config.rows || slot.col >= self.config.columns {
            return None;
        }
        self.slots[self.index(slot.row, slot.col)].as_ref()
    }

    pub fn active_count(&self) -> usize {
        self.active_count
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn destroyed_count(&self) -> usize {
        self.total - self.active_count
    }

    pub fn is_empty(&self) -> bool {
        self.active_count == 0
    }

    pub fn occupancy(&self) -> Option<OccupancyBounds> {
        self.occupancy
    }

    pub fn row_counts(&self) -> &[usize] {
        &self.row_counts
    }

    pub fn column_counts(&self) -> &[usize] {
        &self.column_counts
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn direction(&self) -> f32 {
        self.direction
    }

    pub fn wave(&self) -> u32 {
        self.wave
    }

    pub fn horizontal_spacing(&self) -> f32 {
        self.config.horizontal_spacing
    }

    /// Bounding box of every active member
    pub fn extent(&self) -> Option<Rect> {
        let mut members = self.members();
        let first = members.next()?.bounds();
        let (mut left, mut top, mut right, mut bottom) =
            (first.left(), first.top(), first.right(), first.bottom());
        for m in members {
            let b = m.bounds();
            left = left.min(b.left());
            top = top.min(b.top());
            right = right.max(b.right());
            bottom = bottom.max(b.bottom());
        }
        Some(Rect::new(left, top, right - left, bottom - top))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn destroy_slot(formation: &mut Formation, row: usize, col: usize, events: &mut EventQueue) {
        let center = formation
            .member(SlotId { row, col })
            .map(|m| m.bounds().center())
            .unwrap();
        assert!(formation.destroy_member_containing(center, events));
    }

    #[test]
    fn test_new_is_centred() {
        let settings = Settings::default();
        let formation = Formation::new(&settings);
        assert_eq!(formation.active_count(), 55);
        assert_eq!(formation.total(), 55);

        let first = formation.member(SlotId { row: 0, col: 0 }).unwrap();
        // 10 gaps of 16 plus the 12 px large member
        assert_eq!(first.pos, Vec2::new((224.0 - 172.0) / 2.0, 32.0));
        assert_eq!(first.kind, MemberKind::Small);

        let last = formation.member(SlotId { row: 4, col: 10 }).unwrap();
        assert_eq!(last.kind, MemberKind::Large);
        assert_eq!(last.points, 10);
        assert_eq!(last.size, Vec2::new(12.0, 8.0));
    }

    #[test]
    fn test_destroy_first_member() {
        let settings = Settings::default();
        let mut formation = Formation::new(&settings);
        let mut events = EventQueue::new();
        let first = formation.member(SlotId { row: 0, col: 0 }).cloned().unwrap();

        assert!(formation.destroy_member_containing(first.bounds().center(), &mut events));
        assert_eq!(formation.active_count(), 54);
        assert!(formation.member(first.slot).is_none());

        let destroyed: Vec<_> = events
            .drain()
            .filter(|e| matches!(e, GameEvent::MemberDestroyed { .. }))
            .collect();
        assert_eq!(
            destroyed,
            vec![GameEvent::MemberDestroyed {
                slot: first.slot,
                kind: MemberKind::Small,
                points: 30,
                position: first.pos,
            }]
        );
    }

    #[test]
    fn test_miss_is_noop() {
        let settings = Settings::default();
        let mut formation = Formation::new(&settings);
        let mut events = EventQueue::new();
        assert!(!formation.destroy_member_containing(Vec2::new(1.0, 250.0), &mut events));
        assert_eq!(formation.active_count(), 55);
        assert!(events.is_empty());
    }

    #[test]
    fn test_speed_ramps_per_kill() {
        let settings = Settings::default();
        let mut formation = Formation::new(&settings);
        let mut events = EventQueue::new();
        assert_eq!(formation.speed(), 30.0);
        destroy_slot(&mut formation, 2, 5, &mut events);
        assert!((formation.speed() - 31.5).abs() < 1e-5);
        destroy_slot(&mut formation, 3, 5, &mut events);
        assert!((formation.speed() - 33.0).abs() < 1e-5);
    }

    #[test]
    fn test_occupancy_bounds_from_counts() {
        assert_eq!(OccupancyBounds::from_counts(&[0, 0], &[0, 0, 0]), None);
        assert_eq!(
            OccupancyBounds::from_counts(&[0, 3, 1, 0], &[0, 2, 0, 2, 0]),
            Some(OccupancyBounds {
                top_row: 1,
                bottom_row: 2,
                left_col: 1,
                right_col: 3,
            })
        );
    }

    #[test]
    fn test_occupancy_tracks_cleared_columns() {
        let settings = Settings::default();
        let mut formation = Formation::new(&settings);
        let mut events = EventQueue::new();
        for row in 0..5 {
            destroy_slot(&mut formation, row, 0, &mut events);
        }
        let bounds = formation.occupancy().unwrap();
        assert_eq!(bounds.left_col, 1);
        assert_eq!(bounds.right_col, 10);
        assert_eq!(formation.column_counts()[0], 0);

        for col in 0..11 {
            if formation.member(SlotId { row: 4, col }).is_some() {
                destroy_slot(&mut formation, 4, col, &mut events);
            }
        }
        assert_eq!(formation.occupancy().unwrap().bottom_row, 3);
    }

    #[test]
    fn test_reverse_and_drop_at_edge() {
        let settings = Settings::default();
        let mut formation = Formation::anchored(&settings, Vec2::new(52.0, 32.0));
        let mut events = EventQueue::new();
        let before = formation.member(SlotId { row: 0, col: 0 }).unwrap().pos;

        formation.advance(0.1, &mut events);
        let after = formation.member(SlotId { row: 0, col: 0 }).unwrap().pos;
        assert_eq!(after, before + Vec2::new(0.0, 8.0));
        assert_eq!(formation.direction(), -1.0);
        assert!(events.is_empty());

        formation.advance(0.1, &mut events);
        let moved = formation.member(SlotId { row: 0, col: 0 }).unwrap().pos;
        assert!((moved.x - (52.0 - 3.0)).abs() < 1e-4);
    }

    #[test]
    fn test_reached_bottom_on_drop() {
        let settings = Settings::default();
        let mut formation = Formation::anchored(&settings, Vec2::new(52.0, 144.0));
        let mut events = EventQueue::new();
        formation.advance(0.1, &mut events);
        assert_eq!(events.drain().collect::<Vec<_>>(), vec![GameEvent::FormationReachedBottom]);
    }

    #[test]
    fn test_reset_for_wave() {
        let settings = Settings::default();
        let mut formation = Formation::new(&settings);
        let mut events = EventQueue::new();
        destroy_slot(&mut formation, 0, 0, &mut events);
        formation.advance(0.5, &mut events);

        formation.reset_for_wave(3);
        assert_eq!(formation.active_count(), 55);
        assert_eq!(formation.wave(), 3);
        assert_eq!(formation.speed(), 40.0);
        let first = formation.member(SlotId { row: 0, col: 0 }).unwrap();
        assert_eq!(first.pos, Vec2::new(26.0, 48.0));

        formation.reset_for_wave(50);
        let first = formation.member(SlotId { row: 0, col: 0 }).unwrap();
        assert_eq!(first.pos.y, 72.0);

        formation.reset();
        assert_eq!(formation.speed(), 30.0);
        assert_eq!(formation.direction(), 1.0);
        assert_eq!(formation.member(SlotId { row: 0, col: 0 }).unwrap().pos, Vec2::new(26.0, 32.0));
    }

    #[test]
    fn test_destroying_everything_empties() {
        let settings = Settings::default();
        let mut formation = Formation::new(&settings);
        let mut events = EventQueue::new();
        for row in 0..5 {
            for col in 0..11 {
                destroy_slot(&mut formation, row, col, &mut events);
            }
        }
        assert!(formation.is_empty());
        assert_eq!(formation.occupancy(), None);
        assert_eq!(formation.extent(), None);
        // Advancing an empty formation is a no-op
        formation.advance(0.1, &mut events);
        assert_eq!(events.len(), 55);
    }

    proptest! {
        #[test]
        fn prop_members_stay_inside_field(
            kills in proptest::collection::vec((0usize..5, 0usize..11), 0..40),
            steps in proptest::collection::vec(0.0f32..0.1, 1..300),
        ) {
            let settings = Settings::default();
            let mut formation = Formation::new(&settings);
            let mut events = EventQueue::new();
            for (row, col) in kills {
                if let Some(center) = formation.member(SlotId { row, col }).map(|m| m.bounds().center()) {
                    formation.destroy_member_containing(center, &mut events);
                }
            }
            for dt in steps {
                formation.advance(dt, &mut events);
                for member in formation.members() {
                    prop_assert!(member.pos.x >= 0.0);
                    prop_assert!(member.pos.x + member.size.x <= settings.field.width);
                }
            }
        }

        #[test]
        fn prop_active_plus_destroyed_is_total(
            kills in proptest::collection::vec((0usize..5, 0usize..11), 0..80),
        ) {
            let settings = Settings::default();
            let mut formation = Formation::new(&settings);
            let mut events = EventQueue::new();
            for (row, col) in kills {
                if let Some(center) = formation.member(SlotId { row, col }).map(|m| m.bounds().center()) {
                    formation.destroy_member_containing(center, &mut events);
                }
                prop_assert_eq!(formation.active_count() + formation.destroyed_count(), formation.total());
                prop_assert_eq!(formation.members().count(), formation.active_count());
                prop_assert_eq!(
                    formation.occupancy().is_none(),
                    formation.is_empty()
                );
            }
        }
    }
}
