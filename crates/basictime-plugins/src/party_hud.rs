//! Party status HUD on the map.
//!
//! The window docks to one screen edge. `top` and `bot` windows span the
//! full screen width and are as tall as the shown stat lines; `left` and
//! `right` windows are a quarter of the screen wide and full height.

use basictime_core::config::{HudPosition, PartyHudConfig};
use basictime_core::game::{Actor, GameState, Rect, WindowContent};
use basictime_core::host::Collaborator;
use basictime_core::ledger::Ledger;
use tracing::debug;

/// Collaborator name.
pub const NAME: &str = "party_hud";

/// Window key in [`GameState`].
pub const WINDOW: &str = "party_hud";

/// Height of one text line.
pub const LINE_HEIGHT: u32 = 36;

/// Height of an actor face image.
pub const FACE_HEIGHT: u32 = 144;

/// Window padding on each side.
pub const PADDING: u32 = 18;

/// Upper bound for `max_actors`.
pub const MAX_ACTORS: u32 = 4;

/// Height of the window contents for the shown stats.
pub fn content_height(config: &PartyHudConfig) -> u32 {
    let lines = [config.show_hp, config.show_mp, config.show_tp, config.show_name]
        .into_iter()
        .filter(|shown| *shown)
        .count();
    let height = u32::try_from(lines)
        .unwrap_or(u32::MAX)
        .saturating_mul(LINE_HEIGHT);
    if config.show_face {
        height.max(FACE_HEIGHT)
    } else {
        height
    }
}

/// Window placement for the configured position.
pub fn window_rect(config: &PartyHudConfig, screen_width: u32, screen_height: u32) -> Rect {
    let (width, height) = match config.position {
        HudPosition::Top | HudPosition::Bot => (
            screen_width,
            content_height(config).saturating_add(PADDING.saturating_mul(2)),
        ),
        HudPosition::Left | HudPosition::Right => {
            (screen_width.checked_div(4).unwrap_or(0), screen_height)
        }
    };
    let x = match config.position {
        HudPosition::Right => screen_width.saturating_sub(width),
        HudPosition::Top | HudPosition::Bot | HudPosition::Left => 0,
    };
    let y = match config.position {
        HudPosition::Bot => screen_height.saturating_sub(height),
        HudPosition::Top | HudPosition::Left | HudPosition::Right => 0,
    };
    Rect {
        x: i32::try_from(x).unwrap_or(i32::MAX),
        y: i32::try_from(y).unwrap_or(i32::MAX),
        width,
        height,
    }
}

/// One text line per shown party member.
pub fn actor_lines(config: &PartyHudConfig, party: &[Actor]) -> Vec<String> {
    let shown = usize::try_from(config.max_actors.min(MAX_ACTORS)).unwrap_or(0);
    party
        .iter()
        .take(shown)
        .map(|actor| actor_line(config, actor))
        .collect()
}

fn actor_line(config: &PartyHudConfig, actor: &Actor) -> String {
    let mut parts = Vec::new();
    if config.show_face {
        parts.push(format!("[{}]", actor.face_name));
    }
    if config.show_name {
        parts.push(actor.name.clone());
    }
    if config.show_hp {
        parts.push(format!("HP {}/{}", actor.hp, actor.mhp));
    }
    if config.show_mp {
        parts.push(format!("MP {}/{}", actor.mp, actor.mmp));
    }
    if config.show_tp {
        parts.push(format!("TP {}", actor.tp));
    }
    parts.join("  ")
}

/// Keeps the `party_hud` window in sync with the party.
#[derive(Debug)]
pub struct PartyHud {
    config: PartyHudConfig,
    rect: Rect,
}

impl PartyHud {
    /// Create the HUD for a screen of the given size.
    pub fn new(config: PartyHudConfig, screen_width: u32, screen_height: u32) -> Self {
        let rect = window_rect(&config, screen_width, screen_height);
        Self { config, rect }
    }

    /// Window placement.
    pub const fn rect(&self) -> Rect {
        self.rect
    }

    fn content(&self, game: &GameState) -> WindowContent {
        WindowContent {
            rect: self.rect,
            visible: game.switch(self.config.switch_id),
            lines: actor_lines(&self.config, &game.party),
        }
    }
}

impl Collaborator for PartyHud {
    fn name(&self) -> &'static str {
        NAME
    }

    fn on_tick(&mut self, _ledger: &Ledger, game: &mut GameState) {
        if !game.on_map() {
            return;
        }
        let content = self.content(game);
        if let Some(window) = game.window_mut(WINDOW) {
            if *window != content {
                *window = content;
            }
        }
    }

    fn on_map_setup(&mut self, _ledger: &Ledger, game: &mut GameState) {
        let content = self.content(game);
        debug!(rect = ?content.rect, members = content.lines.len(), "Party HUD created");
        game.set_window(WINDOW, content);
    }
}
