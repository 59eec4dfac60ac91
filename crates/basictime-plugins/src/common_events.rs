//! Reserves a common event whenever a connected unit changes.

use basictime_core::config::{Connection, ConnectionsConfig};
use basictime_core::game::GameState;
use basictime_core::host::{Collaborator, HostError, ObserverInbox};
use basictime_core::ledger::Ledger;
use tracing::debug;

/// Collaborator name.
pub const NAME: &str = "common_events";

/// Unit-to-common-event dispatcher.
#[derive(Debug)]
pub struct CommonEvents {
    connections: Vec<Connection>,
    fired: ObserverInbox<u32>,
}

impl CommonEvents {
    /// Create the dispatcher from its configuration.
    pub fn new(config: &ConnectionsConfig) -> Self {
        Self {
            connections: config.connections.clone(),
            fired: ObserverInbox::new(),
        }
    }
}

impl Collaborator for CommonEvents {
    fn name(&self) -> &'static str {
        NAME
    }

    fn on_register(&mut self, ledger: &mut Ledger) -> Result<(), HostError> {
        for connection in &self.connections {
            ledger.register_on_change(&connection.unit, self.fired.observer(connection.id))?;
        }
        Ok(())
    }

    fn on_tick(&mut self, _ledger: &Ledger, game: &mut GameState) {
        for id in self.fired.drain() {
            debug!(common_event = id, "Common event reserved");
            game.reserve_common_event(id);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use basictime_core::config::UnitConfig;
    use basictime_core::ledger::LedgerError;

    use super::*;

    fn make_ledger() -> Ledger {
        Ledger::new(&[UnitConfig::new("minute", 58, 59), UnitConfig::new("hour", 0, 23)]).unwrap()
    }

    #[test]
    fn reserves_in_unit_order() {
        let mut ledger = make_ledger();
        let mut game = GameState::new();
        let mut events = CommonEvents::new(&ConnectionsConfig::default());
        events.on_register(&mut ledger).unwrap();

        ledger.advance(1);
        events.on_tick(&ledger, &mut game);
        assert_eq!(game.drain_common_events(), vec![1]);

        ledger.advance(1);
        events.on_tick(&ledger, &mut game);
        assert_eq!(game.drain_common_events(), vec![1, 2]);
    }

    #[test]
    fn each_connection_fires_once_per_change() {
        let mut ledger = make_ledger();
        let mut game = GameState::new();
        let mut events = CommonEvents::new(&ConnectionsConfig {
            enabled: true,
            connections: vec![Connection::new("hour", 4), Connection::new("hour", 9)],
        });
        events.on_register(&mut ledger).unwrap();

        ledger.advance(120);
        events.on_tick(&ledger, &mut game);
        assert_eq!(game.drain_common_events(), vec![4, 9]);
    }

    #[test]
    fn unknown_unit_fails_registration() {
        let mut ledger = make_ledger();
        let mut events = CommonEvents::new(&ConnectionsConfig {
            enabled: true,
            connections: vec![Connection::new("day", 1)],
        });
        assert!(matches!(
            events.on_register(&mut ledger),
            Err(HostError::Ledger {
                source: LedgerError::UnknownUnit { .. }
            })
        ));
    }
}
