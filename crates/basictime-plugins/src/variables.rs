//! Mirrors connected units into host variables.
//!
//! Every connection is rewritten whenever any unit changed, when a new game
//! starts, and after a save is loaded, so event scripts can read the clock
//! through ordinary variables.

use basictime_core::config::{Connection, ConnectionsConfig};
use basictime_core::game::GameState;
use basictime_core::host::{Collaborator, HostError, ObserverInbox};
use basictime_core::ledger::{ANY_CHANNEL, Ledger, LedgerError};
use basictime_core::save::{SaveContents, SaveError};

/// Collaborator name.
pub const NAME: &str = "variables";

/// Unit-to-variable mirror.
#[derive(Debug)]
pub struct Variables {
    connections: Vec<Connection>,
    changes: ObserverInbox<()>,
}

impl Variables {
    /// Create the mirror from its configuration.
    pub fn new(config: &ConnectionsConfig) -> Self {
        Self {
            connections: config.connections.clone(),
            changes: ObserverInbox::new(),
        }
    }

    /// Write every connected unit into its variable.
    pub fn update_all(&self, ledger: &Ledger, game: &mut GameState) {
        for connection in &self.connections {
            if let Ok(value) = ledger.value(&connection.unit) {
                game.set_variable(connection.id, i64::from(value));
            }
        }
    }
}

impl Collaborator for Variables {
    fn name(&self) -> &'static str {
        NAME
    }

    fn on_register(&mut self, ledger: &mut Ledger) -> Result<(), HostError> {
        if let Some(missing) = self.connections.iter().find(|c| !ledger.contains(&c.unit)) {
            return Err(LedgerError::UnknownUnit {
                name: missing.unit.clone(),
            }
            .into());
        }
        ledger.register_on_change(ANY_CHANNEL, self.changes.observer(()))?;
        Ok(())
    }

    fn on_tick(&mut self, ledger: &Ledger, game: &mut GameState) {
        if !self.changes.drain().is_empty() {
            self.update_all(ledger, game);
        }
    }

    fn on_new_game(&mut self, ledger: &Ledger, game: &mut GameState) {
        self.update_all(ledger, game);
    }

    fn on_load(
        &mut self,
        _contents: &SaveContents,
        ledger: &Ledger,
        game: &mut GameState,
    ) -> Result<(), SaveError> {
        self.update_all(ledger, game);
        Ok(())
    }
}
