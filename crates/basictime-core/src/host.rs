//! Host-side extension points.
//!
//! The [`Host`] owns the [`Ledger`] and the [`GameState`] and drives every
//! registered [`Collaborator`] through explicit lifecycle hooks, in the
//! order the collaborators were registered. Plugins never wrap each other;
//! they only see the hooks.
//!
//! Ledger observers must not touch host state directly (they only get a
//! shared reference to the ledger). A collaborator that needs to react to a
//! unit change registers an observer built from an [`ObserverInbox`] and
//! drains the inbox in [`Collaborator::on_tick`], which the host calls right
//! after every ledger update.

use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};

use crate::command::PluginCommand;
use crate::config::TimeConfig;
use crate::game::{GameState, MapInfo};
use crate::ledger::{ChangeSet, Ledger, LedgerError, Observer};
use crate::save::{self, SaveContents, SaveError};

/// Errors surfaced by host operations.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// A ledger operation failed.
    #[error("ledger error: {source}")]
    Ledger {
        /// The underlying ledger error.
        #[from]
        source: LedgerError,
    },

    /// Saving or loading failed.
    #[error("save error: {source}")]
    Save {
        /// The underlying save error.
        #[from]
        source: SaveError,
    },

    /// A collaborator failed.
    #[error("{plugin} failed: {message}")]
    Plugin {
        /// Collaborator name.
        plugin: &'static str,
        /// Description of the failure.
        message: String,
    },
}

/// A plugin driven by the host through lifecycle hooks.
///
/// Every hook has a no-op default.
pub trait Collaborator: Send {
    /// Name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Called once when the collaborator is registered. Register ledger
    /// observers here.
    fn on_register(&mut self, _ledger: &mut Ledger) -> Result<(), HostError> {
        Ok(())
    }

    /// Called after every ledger update (timer tick or unit command), once
    /// the ledger's observers have run.
    fn on_tick(&mut self, _ledger: &Ledger, _game: &mut GameState) {}

    /// Called when a new game starts.
    fn on_new_game(&mut self, _ledger: &Ledger, _game: &mut GameState) {}

    /// Called after the host has entered a map.
    fn on_map_setup(&mut self, _ledger: &Ledger, _game: &mut GameState) {}

    /// Offered every plugin command the ledger does not consume. Returns
    /// whether the command was handled.
    fn on_command(
        &mut self,
        _command: &PluginCommand,
        _ledger: &Ledger,
        _game: &mut GameState,
    ) -> Result<bool, HostError> {
        Ok(false)
    }

    /// Add this collaborator's sections to a save.
    fn on_save(&self, _contents: &mut SaveContents) -> Result<(), SaveError> {
        Ok(())
    }

    /// Called after a save was loaded and the ledger restored.
    fn on_load(
        &mut self,
        _contents: &SaveContents,
        _ledger: &Ledger,
        _game: &mut GameState,
    ) -> Result<(), SaveError> {
        Ok(())
    }
}

/// Decides whether a timer tick may advance the ledger.
///
/// Time flows only on the map, while the control switch is on, and (unless
/// configured otherwise) while no message window is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickGate {
    /// Switch that must be on.
    pub switch_id: u32,
    /// Whether an open message window still lets time flow.
    pub update_during_message: bool,
}

impl TickGate {
    /// Build the gate from the time configuration.
    pub const fn from_config(config: &TimeConfig) -> Self {
        Self {
            switch_id: config.switch_id,
            update_during_message: config.update_during_message,
        }
    }

    /// Whether time may advance in the given state.
    pub fn allows(&self, game: &GameState) -> bool {
        game.on_map()
            && game.switch(self.switch_id)
            && (!game.message_busy || self.update_during_message)
    }
}

/// What [`Host::execute`] did with a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The ledger or a collaborator applied it.
    Applied,
    /// The tick interval should change; the runner owns the interval.
    IntervalChanged(u64),
    /// Nobody handled it (for example a disabled plugin's command).
    Unhandled,
}

/// Turns ledger notifications into messages a collaborator drains later.
#[derive(Debug)]
pub struct ObserverInbox<T> {
    tx: UnboundedSender<T>,
    rx: UnboundedReceiver<T>,
}

impl<T: Clone + Send + Sync + 'static> ObserverInbox<T> {
    /// Create an empty inbox.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }

    /// An observer that posts `message` each time it fires.
    pub fn observer(&self, message: T) -> Observer {
        let tx = self.tx.clone();
        Arc::new(move |_ledger: &Ledger| {
            // The receiver lives as long as the inbox; a send can only
            // fail after the collaborator is gone.
            let _ = tx.send(message.clone());
        })
    }

    /// Take every posted message, oldest first.
    pub fn drain(&mut self) -> Vec<T> {
        let mut messages = Vec::new();
        while let Ok(message) = self.rx.try_recv() {
            messages.push(message);
        }
        messages
    }
}

impl<T: Clone + Send + Sync + 'static> Default for ObserverInbox<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Owns the ledger and game state and drives the collaborators.
pub struct Host {
    ledger: Ledger,
    game: GameState,
    gate: TickGate,
    collaborators: Vec<Box<dyn Collaborator>>,
}

impl Host {
    /// Build the ledger from the time configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Ledger`] if the unit configuration is invalid.
    pub fn new(config: &TimeConfig) -> Result<Self, HostError> {
        let ledger = Ledger::new(&config.units)?;
        Ok(Self::with_ledger(ledger, TickGate::from_config(config)))
    }

    /// Wrap an existing ledger.
    pub fn with_ledger(ledger: Ledger, gate: TickGate) -> Self {
        Self {
            ledger,
            game: GameState::new(),
            gate,
            collaborators: Vec::new(),
        }
    }

    /// Register a collaborator after those already registered.
    ///
    /// # Errors
    ///
    /// Returns whatever the collaborator's `on_register` hook returns.
    pub fn register(&mut self, mut collaborator: Box<dyn Collaborator>) -> Result<(), HostError> {
        collaborator.on_register(&mut self.ledger)?;
        info!(
            plugin = collaborator.name(),
            position = self.collaborators.len(),
            "Collaborator registered"
        );
        self.collaborators.push(collaborator);
        Ok(())
    }

    /// Names of registered collaborators in registration order.
    pub fn collaborator_names(&self) -> Vec<&'static str> {
        self.collaborators.iter().map(|c| c.name()).collect()
    }

    /// The ledger.
    pub const fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// The game state.
    pub const fn game(&self) -> &GameState {
        &self.game
    }

    /// Mutable game state, for the host engine side.
    pub const fn game_mut(&mut self) -> &mut GameState {
        &mut self.game
    }

    /// The tick gate.
    pub const fn gate(&self) -> TickGate {
        self.gate
    }

    /// Handle one timer tick. Returns the changed units, or `None` if the
    /// gate was closed.
    pub fn tick(&mut self) -> Option<ChangeSet> {
        if !self.gate.allows(&self.game) {
            return None;
        }
        let changed = self.ledger.advance(1);
        self.notify_tick();
        Some(changed)
    }

    /// Apply a plugin command.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Ledger`] for unit commands naming an unknown
    /// unit, or a collaborator's error.
    pub fn execute(&mut self, command: &PluginCommand) -> Result<CommandOutcome, HostError> {
        match command {
            PluginCommand::SetUnit { unit, value } => {
                self.ledger.set_unit(unit, *value)?;
                Ok(CommandOutcome::Applied)
            }
            PluginCommand::ChangeUnit { unit, amount } => {
                let changed = self.ledger.change_unit(unit, *amount)?;
                debug!(unit = %unit, amount, changed = changed.len(), "Unit changed by command");
                self.notify_tick();
                Ok(CommandOutcome::Applied)
            }
            PluginCommand::ChangeUpdateInterval { interval_ms } => {
                Ok(CommandOutcome::IntervalChanged(*interval_ms))
            }
            _ => {
                let mut handled = false;
                for collaborator in &mut self.collaborators {
                    if collaborator.on_command(command, &self.ledger, &mut self.game)? {
                        handled = true;
                    }
                }
                Ok(if handled {
                    CommandOutcome::Applied
                } else {
                    CommandOutcome::Unhandled
                })
            }
        }
    }

    /// Start a new game.
    pub fn new_game(&mut self) {
        for collaborator in &mut self.collaborators {
            collaborator.on_new_game(&self.ledger, &mut self.game);
        }
    }

    /// Enter a map and run the map setup hooks.
    pub fn setup_map(&mut self, map: MapInfo) {
        self.game.map = map;
        for collaborator in &mut self.collaborators {
            collaborator.on_map_setup(&self.ledger, &mut self.game);
        }
    }

    /// Build the contents of a save slot.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Save`] if any section fails to encode.
    pub fn save(&self) -> Result<SaveContents, HostError> {
        let mut contents = SaveContents::new();
        save::save_ledger(&self.ledger, &mut contents)?;
        for collaborator in &self.collaborators {
            collaborator.on_save(&mut contents)?;
        }
        Ok(contents)
    }

    /// Load a save slot: the ledger first, then every collaborator.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Save`] if a section is malformed.
    pub fn load(&mut self, contents: &SaveContents) -> Result<(), HostError> {
        let restored = save::load_ledger(&mut self.ledger, contents)?;
        info!(restored, "Time data loaded");
        for collaborator in &mut self.collaborators {
            collaborator.on_load(contents, &self.ledger, &mut self.game)?;
        }
        Ok(())
    }

    fn notify_tick(&mut self) {
        for collaborator in &mut self.collaborators {
            collaborator.on_tick(&self.ledger, &mut self.game);
        }
    }
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host")
            .field("ledger", &self.ledger)
            .field("gate", &self.gate)
            .field("collaborators", &self.collaborator_names())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::UnitConfig;
    use crate::game::Scene;

    fn time_config() -> TimeConfig {
        TimeConfig {
            update_interval_ms: 1000,
            update_during_message: false,
            switch_id: 1,
            units: vec![UnitConfig::new("minute", 0, 59), UnitConfig::new("hour", 0, 23)],
        }
    }

    fn open_host() -> Host {
        let mut host = Host::new(&time_config()).unwrap();
        host.game_mut().scene = Scene::Map;
        host.game_mut().set_switch(1, true);
        host
    }

    /// Records every hook call and counts hour notifications.
    struct Recorder {
        calls: Arc<std::sync::Mutex<Vec<String>>>,
        hours: ObserverInbox<()>,
    }

    impl Recorder {
        fn new(calls: &Arc<std::sync::Mutex<Vec<String>>>) -> Self {
            Self {
                calls: Arc::clone(calls),
                hours: ObserverInbox::new(),
            }
        }

        fn log(&self, entry: String) {
            self.calls.lock().unwrap().push(entry);
        }
    }

    impl Collaborator for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }

        fn on_register(&mut self, ledger: &mut Ledger) -> Result<(), HostError> {
            ledger.register_on_change("hour", self.hours.observer(()))?;
            Ok(())
        }

        fn on_tick(&mut self, ledger: &Ledger, _game: &mut GameState) {
            let hours = self.hours.drain().len();
            self.log(format!("tick minute={} hours={hours}", ledger.value("minute").unwrap()));
        }

        fn on_command(
            &mut self,
            command: &PluginCommand,
            _ledger: &Ledger,
            _game: &mut GameState,
        ) -> Result<bool, HostError> {
            self.log(format!("command {command}"));
            Ok(matches!(command, PluginCommand::RefreshHud))
        }

        fn on_load(
            &mut self,
            _contents: &SaveContents,
            ledger: &Ledger,
            _game: &mut GameState,
        ) -> Result<(), SaveError> {
            self.log(format!("load hour={}", ledger.value("hour").unwrap()));
            Ok(())
        }
    }

    #[test]
    fn gate_requires_map_switch_and_no_message() {
        let gate = TickGate::from_config(&time_config());
        let mut game = GameState::new();
        assert!(!gate.allows(&game));
        game.scene = Scene::Map;
        assert!(!gate.allows(&game));
        game.set_switch(1, true);
        assert!(gate.allows(&game));
        game.message_busy = true;
        assert!(!gate.allows(&game));

        let lenient = TickGate {
            update_during_message: true,
            ..gate
        };
        assert!(lenient.allows(&game));
    }

    #[test]
    fn closed_gate_skips_tick() {
        let mut host = Host::new(&time_config()).unwrap();
        assert!(host.tick().is_none());
        assert_eq!(host.ledger().value("minute").unwrap(), 0);
    }

    #[test]
    fn tick_advances_and_notifies_collaborators() {
        let calls = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut host = open_host();
        host.register(Box::new(Recorder::new(&calls))).unwrap();
        host.execute(&PluginCommand::SetUnit {
            unit: "minute".to_owned(),
            value: 59,
        })
        .unwrap();

        let changed = host.tick().unwrap();
        assert!(changed.contains("hour"));
        assert_eq!(*calls.lock().unwrap(), vec!["tick minute=0 hours=1"]);
    }

    #[test]
    fn change_unit_command_runs_tick_hooks() {
        let calls = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut host = Host::new(&time_config()).unwrap();
        host.register(Box::new(Recorder::new(&calls))).unwrap();

        let outcome = host
            .execute(&PluginCommand::ChangeUnit {
                unit: "hour".to_owned(),
                amount: -1,
            })
            .unwrap();
        assert_eq!(outcome, CommandOutcome::Applied);
        assert_eq!(host.ledger().value("hour").unwrap(), 23);
        assert_eq!(*calls.lock().unwrap(), vec!["tick minute=0 hours=1"]);
    }

    #[test]
    fn unknown_unit_command_is_error() {
        let mut host = open_host();
        let result = host.execute(&PluginCommand::SetUnit {
            unit: "day".to_owned(),
            value: 1,
        });
        assert!(matches!(result, Err(HostError::Ledger { .. })));
    }

    #[test]
    fn interval_command_is_returned_to_caller() {
        let mut host = open_host();
        let outcome = host
            .execute(&PluginCommand::ChangeUpdateInterval { interval_ms: 50 })
            .unwrap();
        assert_eq!(outcome, CommandOutcome::IntervalChanged(50));
    }

    #[test]
    fn other_commands_go_to_collaborators() {
        let calls = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut host = open_host();
        host.register(Box::new(Recorder::new(&calls))).unwrap();
        assert_eq!(
            host.execute(&PluginCommand::RefreshHud).unwrap(),
            CommandOutcome::Applied
        );
        assert_eq!(
            host.execute(&PluginCommand::SetGlobalSwitch {
                global_id: 1,
                local_id: 1
            })
            .unwrap(),
            CommandOutcome::Unhandled
        );
        assert_eq!(calls.lock().unwrap().len(), 2);
    }

    #[test]
    fn load_restores_ledger_before_collaborators() {
        let calls = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut source = open_host();
        source
            .execute(&PluginCommand::SetUnit {
                unit: "hour".to_owned(),
                value: 17,
            })
            .unwrap();
        let contents = source.save().unwrap();

        let mut target = open_host();
        target.register(Box::new(Recorder::new(&calls))).unwrap();
        target.load(&contents).unwrap();
        assert_eq!(target.ledger().value("hour").unwrap(), 17);
        assert_eq!(*calls.lock().unwrap(), vec!["load hour=17"]);
    }

    #[test]
    fn inbox_drains_in_order() {
        let mut inbox = ObserverInbox::new();
        let ledger = Ledger::new(&[UnitConfig::new("minute", 0, 59)]).unwrap();
        inbox.observer(1_u32)(&ledger);
        inbox.observer(2_u32)(&ledger);
        assert_eq!(inbox.drain(), vec![1, 2]);
        assert!(inbox.drain().is_empty());
    }

    #[test]
    fn registration_order_is_kept() {
        let calls = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut host = open_host();
        host.register(Box::new(Recorder::new(&calls))).unwrap();
        host.register(Box::new(Recorder::new(&calls))).unwrap();
        assert_eq!(host.collaborator_names(), vec!["recorder", "recorder"]);
    }
}
