//! Screen tints driven by one time unit.
//!
//! A [`TintTable`] maps each value of the tinting unit (usually `hour`) to
//! a tone, built from the configured steps and named tones. Steps are kept
//! as inclusive ranges; later steps override earlier ones where ranges
//! overlap.
//!
//! Tinting happens only on the map while the control switch is on. When
//! the tinting unit changes on an outdoor map, the outdoor tone for the new
//! value fades in over the configured duration. Entering a map applies the
//! indoor tone (indoor maps) or the outdoor tone (outdoor maps) at once.

use basictime_core::config::TimeTintsConfig;
use basictime_core::game::{GameState, Tone};
use basictime_core::host::{Collaborator, HostError, ObserverInbox};
use basictime_core::ledger::Ledger;
use tracing::{debug, warn};

use crate::error::PluginError;

/// Collaborator name.
pub const NAME: &str = "time_tints";

/// One configured step: an inclusive value range and its tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TintRange {
    from: u32,
    to: u32,
    tone: Tone,
}

/// Unit value to tone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TintTable {
    ranges: Vec<TintRange>,
}

impl TintTable {
    /// Build the table from the configured steps.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::UnknownTint`] if a step names a tone that is
    /// not in `named`.
    pub fn from_config(config: &TimeTintsConfig) -> Result<Self, PluginError> {
        let mut ranges = Vec::with_capacity(config.steps.len());
        for step in &config.steps {
            let tone = config
                .named
                .get(&step.tint)
                .copied()
                .map(Tone::from)
                .ok_or_else(|| PluginError::UnknownTint {
                    from: step.from,
                    to: step.to,
                    tint: step.tint.clone(),
                })?;
            ranges.push(TintRange {
                from: step.from,
                to: step.to,
                tone,
            });
        }
        Ok(Self { ranges })
    }

    /// Tone for a unit value, from the last step that covers it.
    pub fn tone_for(&self, value: u32) -> Option<Tone> {
        self.ranges
            .iter()
            .rev()
            .find(|range| (range.from..=range.to).contains(&value))
            .map(|range| range.tone)
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Whether no step is configured.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

/// Requests screen tints when the tinting unit changes or a map is entered.
#[derive(Debug)]
pub struct TimeTints {
    unit: String,
    duration: u32,
    switch_id: u32,
    indoor: Tone,
    table: TintTable,
    changes: ObserverInbox<()>,
}

impl TimeTints {
    /// Create the collaborator from its configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::UnknownTint`] if a step names an undefined tone.
    pub fn new(config: &TimeTintsConfig) -> Result<Self, PluginError> {
        Ok(Self {
            unit: config.unit.clone(),
            duration: config.duration,
            switch_id: config.switch_id,
            indoor: Tone::from(config.indoor),
            table: TintTable::from_config(config)?,
            changes: ObserverInbox::new(),
        })
    }

    /// The tint table.
    pub const fn table(&self) -> &TintTable {
        &self.table
    }

    fn can_tint(&self, game: &GameState) -> bool {
        game.on_map() && game.switch(self.switch_id)
    }

    fn outdoor_tint(&self, ledger: &Ledger, game: &mut GameState, duration: u32) {
        let value = match ledger.value(&self.unit) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Tinting unit missing");
                return;
            }
        };
        match self.table.tone_for(value) {
            Some(tone) => {
                debug!(unit = %self.unit, value, ?tone, duration, "Outdoor tint");
                game.start_tint(tone, duration);
            }
            None => warn!(unit = %self.unit, value, "No tint step covers value"),
        }
    }

    fn indoor_tint(&self, game: &mut GameState) {
        debug!(tone = ?self.indoor, "Indoor tint");
        game.start_tint(self.indoor, 0);
    }
}

impl Collaborator for TimeTints {
    fn name(&self) -> &'static str {
        NAME
    }

    fn on_register(&mut self, ledger: &mut Ledger) -> Result<(), HostError> {
        ledger.register_on_change(&self.unit, self.changes.observer(()))?;
        Ok(())
    }

    fn on_tick(&mut self, ledger: &Ledger, game: &mut GameState) {
        if self.changes.drain().is_empty() {
            return;
        }
        if self.can_tint(game) && !game.map.indoor {
            self.outdoor_tint(ledger, game, self.duration);
        }
    }

    fn on_map_setup(&mut self, ledger: &Ledger, game: &mut GameState) {
        if !self.can_tint(game) {
            return;
        }
        if game.map.indoor {
            self.indoor_tint(game);
        } else {
            self.outdoor_tint(ledger, game, 0);
        }
    }
}
