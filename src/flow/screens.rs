//! The five standard screens

use glam::Vec2;

use super::{Screen, ScreenId, Transition, TransitionContext};
use crate::input::{InputSource, Key};
use crate::render::{Renderer, SpriteKey, Tint, draw_world};
use crate::sim::{AnimationClock, GameCore, GameState, MemberKind};

/// Seconds the result screens ignore Space for
const RESULT_INPUT_GUARD: f32 = 2.0;

/// Title and score table
pub struct StartMenuScreen {
    /// Animates the score-table sprites
    demo_clock: AnimationClock,
    elapsed: f32,
}

impl StartMenuScreen {
    pub fn new() -> Self {
        Self {
            demo_clock: AnimationClock::new(0.5, 2),
            elapsed: 0.0,
        }
    }
}

impl Default for StartMenuScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for StartMenuScreen {
    fn enter(&mut self, _core: &mut GameCore, _ctx: TransitionContext) {
        self.demo_clock.reset();
        self.elapsed = 0.0;
    }

    fn update(&mut self, _core: &mut GameCore, _input: &dyn InputSource, dt: f32) -> Option<Transition> {
        self.demo_clock.update(dt);
        self.elapsed += dt;
        None
    }

    fn handle_input(&mut self, key: Key, pressed: bool) -> Option<Transition> {
        match (key, pressed) {
            (Key::Space, false) => Some(Transition::with_reset(ScreenId::Playing)),
            _ => None,
        }
    }

    fn draw(&self, core: &GameCore, renderer: &mut dyn Renderer) {
        let f = &core.settings().formation;
        let flyer = &core.settings().flyer;
        renderer.draw_text_centered("SPACE INVADERS", 48.0, Tint::White);
        renderer.draw_text_centered("* SCORE ADVANCE TABLE *", 88.0, Tint::White);

        let frame = self.demo_clock.frame();
        let rows = [
            (None, String::from("= ? MYSTERY"), Tint::Red),
            (Some(MemberKind::Small), format!("= {} POINTS", f.small_points), Tint::White),
            (Some(MemberKind::Medium), format!("= {} POINTS", f.medium_points), Tint::White),
            (Some(MemberKind::Large), format!("= {} POINTS", f.large_points), Tint::Green),
        ];
        for (i, (kind, label, tint)) in rows.iter().enumerate() {
            let y = 108.0 + i as f32 * 16.0;
            let sprite = match kind {
                Some(kind) => SpriteKey::Member { kind: *kind, frame },
                None => SpriteKey::Flyer,
            };
            renderer.draw_sprite(sprite, Vec2::new(64.0, y), *tint);
            renderer.draw_text(label, Vec2::new(88.0, y), *tint);
        }
        renderer.draw_text_centered(
            &format!("EVERY {}TH SHOT: {} POINTS", flyer.bonus_shot_period, flyer.max_points),
            180.0,
            Tint::Dim,
        );

        // Blink the prompt once a second
        if (self.elapsed as u32) % 2 == 0 {
            renderer.draw_text_centered("PRESS SPACE TO START", 210.0, Tint::Yellow);
        }
    }
}

/// Runs the core
pub struct PlayingScreen {
    /// Skip the result check on the first update after entering
    just_entered: bool,
}

impl PlayingScreen {
    pub fn new() -> Self {
        Self { just_entered: false }
    }
}

impl Default for PlayingScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for PlayingScreen {
    fn enter(&mut self, core: &mut GameCore, ctx: TransitionContext) {
        if ctx.reset_game {
            core.reset();
        }
        core.resume();
        self.just_entered = true;
    }

    fn update(&mut self, core: &mut GameCore, input: &dyn InputSource, dt: f32) -> Option<Transition> {
        core.tick(input, dt);
        if self.just_entered {
            self.just_entered = false;
            return None;
        }
        match core.state() {
            GameState::GameOver => Some(Transition::to(ScreenId::GameOver)),
            GameState::Victory => Some(Transition::to(ScreenId::Victory)),
            GameState::Playing | GameState::Paused => None,
        }
    }

    fn handle_input(&mut self, key: Key, pressed: bool) -> Option<Transition> {
        match (key, pressed) {
            (Key::Escape, false) => Some(Transition::to(ScreenId::Paused)),
            _ => None,
        }
    }

    fn draw(&self, core: &GameCore, renderer: &mut dyn Renderer) {
        draw_world(core, renderer);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PauseOption {
    Resume,
    Restart,
    QuitToMenu,
}

impl PauseOption {
    const ALL: [PauseOption; 3] = [PauseOption::Resume, PauseOption::Restart, PauseOption::QuitToMenu];

    fn label(&self) -> &'static str {
        match self {
            PauseOption::Resume => "RESUME",
            PauseOption::Restart => "RESTART",
            PauseOption::QuitToMenu => "QUIT TO MENU",
        }
    }

    fn transition(&self) -> Transition {
        match self {
            PauseOption::Resume => Transition::to(ScreenId::Playing),
            PauseOption::Restart => Transition::with_reset(ScreenId::Playing),
            PauseOption::QuitToMenu => Transition::to(ScreenId::StartMenu),
        }
    }
}

/// Overlay menu; acts on key release only
pub struct PausedScreen {
    selected: usize,
}

impl PausedScreen {
    pub fn new() -> Self {
        Self { selected: 0 }
    }

    pub fn selected_label(&self) -> &'static str {
        PauseOption::ALL[self.selected].label()
    }
}

impl Default for PausedScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen for PausedScreen {
    fn enter(&mut self, core: &mut GameCore, _ctx: TransitionContext) {
        core.pause();
        self.selected = 0;
    }

    fn update(&mut self, _core: &mut GameCore, _input: &dyn InputSource, _dt: f32) -> Option<Transition> {
        None
    }

    fn handle_input(&mut self, key: Key, pressed: bool) -> Option<Transition> {
        if pressed {
            return None;
        }
        let count = PauseOption::ALL.len();
        match key {
            Key::Up => {
                self.selected = (self.selected + count - 1) % count;
                None
            }
            Key::Down => {
                self.selected = (self.selected + 1) % count;
                None
            }
            Key::Space | Key::Enter => Some(PauseOption::ALL[self.selected].transition()),
            Key::Escape => Some(Transition::to(ScreenId::Playing)),
            _ => None,
        }
    }

    fn draw(&self, core: &GameCore, renderer: &mut dyn Renderer) {
        draw_world(core, renderer);
        renderer.draw_text_centered("PAUSED", 96.0, Tint::Yellow);
        for (i, option) in PauseOption::ALL.iter().enumerate() {
            let (text, tint) = if i == self.selected {
                (format!("> {} <", option.label()), Tint::Yellow)
            } else {
                (option.label().to_string(), Tint::White)
            };
            renderer.draw_text_centered(&text, 120.0 + i as f32 * 14.0, tint);
        }
    }
}

/// Game over and victory: show the result, back to the menu on Space
pub struct ResultScreen {
    title: &'static str,
    elapsed: f32,
}

impl ResultScreen {
    pub fn game_over() -> Self {
        Self {
            title: "GAME OVER",
            elapsed: 0.0,
        }
    }

    pub fn victory() -> Self {
        Self {
            title: "VICTORY",
            elapsed: 0.0,
        }
    }

    fn accepts_input(&self) -> bool {
        self.elapsed >= RESULT_INPUT_GUARD
    }
}

impl Screen for ResultScreen {
    fn enter(&mut self, core: &mut GameCore, _ctx: TransitionContext) {
        self.elapsed = 0.0;
        log::info!("{}: score {}, wave {}", self.title, core.score(), core.wave());
    }

    fn update(&mut self, _core: &mut GameCore, _input: &dyn InputSource, dt: f32) -> Option<Transition> {
        self.elapsed += dt;
        None
    }

    fn handle_input(&mut self, key: Key, pressed: bool) -> Option<Transition> {
        match (key, pressed) {
            (Key::Space, false) if self.accepts_input() => Some(Transition::to(ScreenId::StartMenu)),
            _ => None,
        }
    }

    fn draw(&self, core: &GameCore, renderer: &mut dyn Renderer) {
        draw_world(core, renderer);
        renderer.draw_text_centered(self.title, 100.0, Tint::Red);
        renderer.draw_text_centered(&format!("SCORE {}", core.score()), 120.0, Tint::White);
        renderer.draw_text_centered(&format!("WAVE {}", core.wave()), 134.0, Tint::White);
        if self.accepts_input() {
            renderer.draw_text_centered("PRESS SPACE", 160.0, Tint::Yellow);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputSnapshot;
    use crate::render::testing::RecordingRenderer;
    use crate::settings::Settings;

    fn core() -> GameCore {
        GameCore::new(Settings::default(), 5).unwrap()
    }

    #[test]
    fn test_menu_starts_on_space_release() {
        let mut menu = StartMenuScreen::new();
        assert_eq!(menu.handle_input(Key::Space, true), None);
        assert_eq!(
            menu.handle_input(Key::Space, false),
            Some(Transition::with_reset(ScreenId::Playing))
        );
        assert_eq!(menu.handle_input(Key::Enter, false), None);
    }

    #[test]
    fn test_menu_draws_score_table() {
        let core = core();
        let mut menu = StartMenuScreen::new();
        let mut renderer = RecordingRenderer::default();
        menu.update(&mut core.clone(), &InputSnapshot::default(), 0.6);
        menu.draw(&core, &mut renderer);
        assert!(renderer.has_text("= 30 POINTS"));
        assert!(renderer.has_text("PRESS SPACE TO START"));
        assert_eq!(renderer.count_sprites("Member"), 3);
    }

    #[test]
    fn test_playing_skips_result_check_on_first_update() {
        let mut core = core();
        let mut playing = PlayingScreen::new();
        playing.enter(&mut core, TransitionContext::default());
        core.state = GameState::GameOver;
        let idle = InputSnapshot::default();
        assert_eq!(playing.update(&mut core, &idle, 0.016), None);
        assert_eq!(
            playing.update(&mut core, &idle, 0.016),
            Some(Transition::to(ScreenId::GameOver))
        );
    }

    #[test]
    fn test_playing_enter_with_reset() {
        let mut core = core();
        core.score = 70;
        core.pause();
        let mut playing = PlayingScreen::new();
        playing.enter(&mut core, TransitionContext { reset_game: true, from: None });
        assert_eq!(core.score(), 0);
        assert_eq!(core.state(), GameState::Playing);
    }

    #[test]
    fn test_playing_pauses_on_escape_release() {
        let mut playing = PlayingScreen::new();
        assert_eq!(playing.handle_input(Key::Escape, true), None);
        assert_eq!(
            playing.handle_input(Key::Escape, false),
            Some(Transition::to(ScreenId::Paused))
        );
    }

    #[test]
    fn test_pause_menu_navigation() {
        let mut core = core();
        let mut paused = PausedScreen::new();
        paused.enter(&mut core, TransitionContext::default());
        assert_eq!(core.state(), GameState::Paused);
        assert_eq!(paused.selected_label(), "RESUME");

        // Presses are ignored, releases act
        assert_eq!(paused.handle_input(Key::Down, true), None);
        assert_eq!(paused.selected_label(), "RESUME");
        paused.handle_input(Key::Down, false);
        assert_eq!(paused.selected_label(), "RESTART");
        assert_eq!(
            paused.handle_input(Key::Enter, false),
            Some(Transition::with_reset(ScreenId::Playing))
        );

        paused.handle_input(Key::Down, false);
        assert_eq!(paused.selected_label(), "QUIT TO MENU");
        assert_eq!(
            paused.handle_input(Key::Space, false),
            Some(Transition::to(ScreenId::StartMenu))
        );

        // Wraps upward
        paused.handle_input(Key::Up, false);
        paused.handle_input(Key::Up, false);
        paused.handle_input(Key::Up, false);
        assert_eq!(paused.selected_label(), "QUIT TO MENU");

        assert_eq!(
            paused.handle_input(Key::Escape, false),
            Some(Transition::to(ScreenId::Playing))
        );
    }

    #[test]
    fn test_result_screen_guard() {
        let mut core = core();
        let mut result = ResultScreen::game_over();
        result.enter(&mut core, TransitionContext::default());
        let idle = InputSnapshot::default();

        result.update(&mut core, &idle, 1.0);
        assert_eq!(result.handle_input(Key::Space, false), None);

        result.update(&mut core, &idle, 1.0);
        assert_eq!(result.handle_input(Key::Space, true), None);
        assert_eq!(
            result.handle_input(Key::Space, false),
            Some(Transition::to(ScreenId::StartMenu))
        );

        let mut renderer = RecordingRenderer::default();
        result.draw(&core, &mut renderer);
        assert!(renderer.has_text("GAME OVER"));
        assert!(renderer.has_text("PRESS SPACE"));
    }
}
