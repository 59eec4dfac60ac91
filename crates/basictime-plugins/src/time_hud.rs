//! Time HUD: a window on the map showing the clock as formatted text.
//!
//! The HUD text is a template. Formatting runs three passes in order:
//!
//! 1. every unit name is replaced by its current value (all occurrences,
//!    units in configuration order);
//! 2. every `v[id]` is replaced by the host variable `id` (0 when unset);
//! 3. every `(number, digits)` group is replaced by `number` left-padded
//!    with zeros to `digits` characters.
//!
//! With the default template `(hour, 2) : (minute, 2)` at 7:05 the first
//! pass yields `(7, 2) : (5, 2)` and the last pass `07 : 05`.

use basictime_core::command::PluginCommand;
use basictime_core::config::TimeHudConfig;
use basictime_core::game::{GameState, Rect, WindowContent};
use basictime_core::host::{Collaborator, HostError, ObserverInbox};
use basictime_core::ledger::{ANY_CHANNEL, Ledger};
use basictime_core::save::{SaveContents, SaveError};
use tracing::debug;

/// Collaborator name.
pub const NAME: &str = "time_hud";

/// Window key in [`GameState`].
pub const WINDOW: &str = "time_hud";

/// Format a HUD template against the ledger and host variables.
pub fn format_text(template: &str, ledger: &Ledger, game: &GameState) -> String {
    let text = format_units(template, ledger);
    let text = format_variables(&text, game);
    format_numbers(&text)
}

/// Replace every unit name with its value.
pub fn format_units(text: &str, ledger: &Ledger) -> String {
    ledger
        .values()
        .fold(text.to_owned(), |acc, (name, value)| acc.replace(name, &value.to_string()))
}

/// Replace every `v[id]` (or `V[id]`) with the variable's value.
pub fn format_variables(text: &str, game: &GameState) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find(['v', 'V']) {
        let (before, from_v) = rest.split_at(pos);
        out.push_str(before);
        if let Some((id, tail)) = parse_variable(from_v) {
            out.push_str(&game.variable(id).to_string());
            rest = tail;
        } else {
            let mut chars = from_v.chars();
            if let Some(c) = chars.next() {
                out.push(c);
            }
            rest = chars.as_str();
        }
    }
    out.push_str(rest);
    out
}

/// Replace every `(number, digits)` group with the zero-padded number.
///
/// Spaces are allowed around both numbers. Groups that do not match the
/// pattern are left as written.
pub fn format_numbers(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('(') {
        let (before, from_paren) = rest.split_at(pos);
        out.push_str(before);
        if let Some((number, digits, tail)) = parse_number_group(from_paren) {
            out.push_str(&pad_number(number, digits));
            rest = tail;
        } else {
            out.push('(');
            rest = from_paren.get(1..).unwrap_or_default();
        }
    }
    out.push_str(rest);
    out
}

/// Widest padding honoured; a `u64` never needs more.
pub const MAX_PAD_DIGITS: usize = 20;

/// Left-pad `number` with zeros to at least `digits` characters, capped at
/// [`MAX_PAD_DIGITS`].
pub fn pad_number(number: u64, digits: usize) -> String {
    let digits = digits.min(MAX_PAD_DIGITS);
    format!("{number:0digits$}")
}

/// Parse `v[<digits>]` at the start of `text`.
fn parse_variable(text: &str) -> Option<(u32, &str)> {
    let inner = text.get(1..)?.strip_prefix('[')?;
    let close = inner.find(']')?;
    let (digits, tail) = inner.split_at(close);
    if !is_digits(digits) {
        return None;
    }
    Some((digits.parse().ok()?, tail.get(1..)?))
}

/// Parse `( <digits> , <digits> )` at the start of `text`.
fn parse_number_group(text: &str) -> Option<(u64, usize, &str)> {
    let inner = text.strip_prefix('(')?;
    let close = inner.find(')')?;
    let (body, tail) = inner.split_at(close);
    let (number, digits) = body.split_once(',')?;
    let (number, digits) = (number.trim_matches(' '), digits.trim_matches(' '));
    if !is_digits(number) || !is_digits(digits) {
        return None;
    }
    Some((number.parse().ok()?, digits.parse().ok()?, tail.get(1..)?))
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

/// Keeps the `time_hud` window in sync with the ledger.
#[derive(Debug)]
pub struct TimeHud {
    config: TimeHudConfig,
    changes: ObserverInbox<()>,
}

impl TimeHud {
    /// Create the HUD from its configuration.
    pub fn new(config: TimeHudConfig) -> Self {
        Self {
            config,
            changes: ObserverInbox::new(),
        }
    }

    /// The HUD text for the current state.
    pub fn text(&self, ledger: &Ledger, game: &GameState) -> String {
        format_text(&self.config.text, ledger, game)
    }

    fn is_ok_to_show(&self, game: &GameState) -> bool {
        game.switch(self.config.switch_id)
    }

    /// Redraw the window if the map is showing it.
    fn refresh(&self, ledger: &Ledger, game: &mut GameState) {
        if !game.on_map() {
            return;
        }
        let text = self.text(ledger, game);
        let visible = self.is_ok_to_show(game);
        if let Some(window) = game.window_mut(WINDOW) {
            window.visible = visible;
            window.lines = vec![text];
        }
    }
}

impl Collaborator for TimeHud {
    fn name(&self) -> &'static str {
        NAME
    }

    fn on_register(&mut self, ledger: &mut Ledger) -> Result<(), HostError> {
        ledger.register_on_change(ANY_CHANNEL, self.changes.observer(()))?;
        Ok(())
    }

    fn on_tick(&mut self, ledger: &Ledger, game: &mut GameState) {
        let changed = !self.changes.drain().is_empty();
        let visibility_stale = game
            .window(WINDOW)
            .is_some_and(|w| w.visible != self.is_ok_to_show(game));
        if changed || visibility_stale {
            self.refresh(ledger, game);
        }
    }

    fn on_map_setup(&mut self, ledger: &Ledger, game: &mut GameState) {
        let content = WindowContent {
            rect: Rect {
                x: self.config.x,
                y: self.config.y,
                width: self.config.width,
                height: self.config.height,
            },
            visible: self.is_ok_to_show(game),
            lines: vec![self.text(ledger, game)],
        };
        debug!(text = ?content.lines, visible = content.visible, "Time HUD created");
        game.set_window(WINDOW, content);
    }

    fn on_command(
        &mut self,
        command: &PluginCommand,
        ledger: &Ledger,
        game: &mut GameState,
    ) -> Result<bool, HostError> {
        if *command != PluginCommand::RefreshHud {
            return Ok(false);
        }
        self.changes.drain();
        self.refresh(ledger, game);
        Ok(true)
    }

    fn on_load(
        &mut self,
        _contents: &SaveContents,
        ledger: &Ledger,
        game: &mut GameState,
    ) -> Result<(), SaveError> {
        self.refresh(ledger, game);
        Ok(())
    }
}
