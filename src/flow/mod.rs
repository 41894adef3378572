//! Meta game-state machine
//!
//! A [`ScreenManager`] owns the [`GameCore`] and a table of registered
//! screens. The active screen receives per-tick updates and discrete key
//! events and may request a [`Transition`]; the manager runs `exit` on the
//! outgoing screen and `enter` on the incoming one.

mod screens;

use std::collections::HashMap;

pub use screens::{PausedScreen, PlayingScreen, ResultScreen, StartMenuScreen};

use crate::consts::MAX_FRAME_DT;
use crate::error::FlowError;
use crate::input::{InputSource, Key};
use crate::render::Renderer;
use crate::sim::GameCore;

/// Names screens are registered under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenId {
    StartMenu,
    Playing,
    Paused,
    GameOver,
    Victory,
}

/// A request to switch screens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub target: ScreenId,
    /// Consumed by the Playing screen's `enter`
    pub reset_game: bool,
}

impl Transition {
    pub fn to(target: ScreenId) -> Self {
        Self {
            target,
            reset_game: false,
        }
    }

    pub fn with_reset(target: ScreenId) -> Self {
        Self {
            target,
            reset_game: true,
        }
    }
}

/// Handed to a screen's `enter`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransitionContext {
    pub reset_game: bool,
    /// `None` for the first screen
    pub from: Option<ScreenId>,
}

/// One state of the meta machine
pub trait Screen {
    fn enter(&mut self, core: &mut GameCore, ctx: TransitionContext);

    fn exit(&mut self, _core: &mut GameCore) {}

    fn update(
        &mut self,
        core: &mut GameCore,
        input: &dyn InputSource,
        dt: f32,
    ) -> Option<Transition>;

    /// `pressed` is false for a key release
    fn handle_input(&mut self, key: Key, pressed: bool) -> Option<Transition>;

    fn draw(&self, core: &GameCore, renderer: &mut dyn Renderer);
}

pub struct ScreenManager {
    core: GameCore,
    screens: HashMap<ScreenId, Box<dyn Screen>>,
    current: Option<ScreenId>,
}

impl ScreenManager {
    /// Manager with no screens registered
    pub fn new(core: GameCore) -> Self {
        Self {
            core,
            screens: HashMap::new(),
            current: None,
        }
    }

    /// Manager with the five standard screens registered
    pub fn with_default_screens(core: GameCore) -> Self {
        let mut manager = Self::new(core);
        manager.register(ScreenId::StartMenu, Box::new(StartMenuScreen::new()));
        manager.register(ScreenId::Playing, Box::new(PlayingScreen::new()));
        manager.register(ScreenId::Paused, Box::new(PausedScreen::new()));
        manager.register(ScreenId::GameOver, Box::new(ResultScreen::game_over()));
        manager.register(ScreenId::Victory, Box::new(ResultScreen::victory()));
        manager
    }

    /// Register (or replace) the screen for `id`
    pub fn register(&mut self, id: ScreenId, screen: Box<dyn Screen>) {
        self.screens.insert(id, screen);
    }

    /// Enter `id` as the first screen
    pub fn start_with(&mut self, id: ScreenId) -> Result<(), FlowError> {
        let screen = self
            .screens
            .get_mut(&id)
            .ok_or(FlowError::UnknownScreen(id))?;
        if let Some(previous) = self.current {
            log::warn!("Restarting screen flow from {previous:?} at {id:?}");
        }
        screen.enter(&mut self.core, TransitionContext::default());
        self.current = Some(id);
        log::info!("Screen flow started at {id:?}");
        Ok(())
    }

    pub fn current(&self) -> Option<ScreenId> {
        self.current
    }

    /// Forward one frame to the active screen; `dt` is clamped to `[0, MAX_FRAME_DT]`
    pub fn update(&mut self, input: &dyn InputSource, dt: f32) {
        let Some(id) = self.current else {
            return;
        };
        let dt = if dt.is_finite() {
            dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        let request = match self.screens.get_mut(&id) {
            Some(screen) => screen.update(&mut self.core, input, dt),
            None => None,
        };
        if let Some(transition) = request {
            self.transition(transition);
        }
    }

    pub fn handle_input(&mut self, key: Key, pressed: bool) {
        let Some(id) = self.current else {
            return;
        };
        let request = self
            .screens
            .get_mut(&id)
            .and_then(|screen| screen.handle_input(key, pressed));
        if let Some(transition) = request {
            self.transition(transition);
        }
    }

    pub fn draw(&self, renderer: &mut dyn Renderer) {
        let Some(screen) = self.current.and_then(|id| self.screens.get(&id)) else {
            return;
        };
        renderer.clear();
        screen.draw(&self.core, renderer);
    }

    /// Switch screens; requests for unregistered targets are ignored
    fn transition(&mut self, transition: Transition) {
        if !self.screens.contains_key(&transition.target) {
            log::warn!(
                "Ignoring transition to unregistered screen {:?}",
                transition.target
            );
            return;
        }

        let from = self.current;
        if let Some(screen) = from.and_then(|id| self.screens.get_mut(&id)) {
            screen.exit(&mut self.core);
        }
        if let Some(screen) = self.screens.get_mut(&transition.target) {
            screen.enter(
                &mut self.core,
                TransitionContext {
                    reset_game: transition.reset_game,
                    from,
                },
            );
        }
        self.current = Some(transition.target);
        log::info!(
            "Screen {:?} -> {:?}{}",
            from,
            transition.target,
            if transition.reset_game { " (reset)" } else { "" }
        );
    }

    pub fn core(&self) -> &GameCore {
        &self.core
    }

    pub fn core_mut(&mut self) -> &mut GameCore {
        &mut self.core
    }
}
