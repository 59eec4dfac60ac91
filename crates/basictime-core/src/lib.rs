//! In-game clock, host extension points, and tick loop for `BasicTime`.
//!
//! This crate owns the Time Unit Ledger (a multi-radix counter with
//! carry/borrow cascades and per-unit observers) and everything the host
//! needs to drive it: configuration, the host state model, collaborator
//! hooks, plugin commands, save sections, and the async tick runner.
//!
//! # Modules
//!
//! - [`command`] -- Parsing of `Time ...` and `GlobalData ...` plugin
//!   command lines into [`PluginCommand`].
//! - [`config`] -- Configuration loading from `basictime-config.yaml` into
//!   strongly-typed structs.
//! - [`game`] -- The slice of host engine state plugins read and write.
//! - [`host`] -- [`Host`], the [`Collaborator`] trait, the tick gate, and
//!   observer inboxes.
//! - [`ledger`] -- The Time Unit Ledger.
//! - [`operator`] -- Pause, stop, and tick speed controls.
//! - [`runner`] -- The async tick loop.
//! - [`save`] -- Save-file sections and the ledger's persistence adapter.
//!
//! [`PluginCommand`]: command::PluginCommand
//! [`Host`]: host::Host
//! [`Collaborator`]: host::Collaborator

pub mod command;
pub mod config;
pub mod game;
pub mod host;
pub mod ledger;
pub mod operator;
pub mod runner;
pub mod save;

// Re-export primary types at crate root.
pub use command::{CommandError, PluginCommand};
pub use config::{BasicTimeConfig, ConfigError};
pub use game::{GameState, MapInfo, Scene};
pub use host::{Collaborator, CommandOutcome, Host, HostError, ObserverInbox, TickGate};
pub use ledger::{ANY_CHANNEL, ChangeSet, Ledger, LedgerError, Observer, Snapshot};
pub use operator::{OperatorState, RunEndReason};
pub use runner::{RunResult, log_run_end, run};
pub use save::{SaveContents, SaveError, TIME_SECTION};
