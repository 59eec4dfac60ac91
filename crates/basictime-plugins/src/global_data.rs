//! Cross-save global variables and switches.
//!
//! The store lives in its own JSON file, independent of save slots:
//!
//! ```json
//! {"variables": {"3": 12}, "switches": {"1": true}}
//! ```
//!
//! `GlobalData setVariable <globalId> <localId>` copies host variable
//! `localId` into global slot `globalId` and writes the file;
//! `setSwitch` does the same for switches.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use basictime_core::command::PluginCommand;
use basictime_core::config::GlobalDataConfig;
use basictime_core::game::GameState;
use basictime_core::host::{Collaborator, HostError};
use basictime_core::ledger::Ledger;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::error::GlobalDataError;

/// Collaborator name.
pub const NAME: &str = "global_data";

/// Contents of the global data file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalStore {
    /// Global variable slots.
    #[serde(default)]
    pub variables: BTreeMap<u32, i64>,
    /// Global switch slots.
    #[serde(default)]
    pub switches: BTreeMap<u32, bool>,
}

impl GlobalStore {
    /// Read the store from `path`. A missing file yields `None`.
    ///
    /// # Errors
    ///
    /// Returns [`GlobalDataError::Io`] if the file exists but cannot be
    /// read, or [`GlobalDataError::Json`] if it is malformed.
    pub fn read_from(path: &Path) -> Result<Option<Self>, GlobalDataError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&text)?))
    }

    /// Write the store to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`GlobalDataError::Io`] on filesystem failure.
    pub fn write_to(&self, path: &Path) -> Result<(), GlobalDataError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string(self)?)?;
        Ok(())
    }
}

/// The global data collaborator.
#[derive(Debug)]
pub struct GlobalData {
    path: PathBuf,
    store: GlobalStore,
}

impl GlobalData {
    /// Open the store configured in `config`.
    ///
    /// A missing file starts an empty store. An unreadable or corrupt file
    /// is logged and also starts an empty store; it is overwritten on the
    /// next `set`.
    pub fn open(config: &GlobalDataConfig) -> Self {
        let store = match GlobalStore::read_from(&config.path) {
            Ok(Some(store)) => {
                info!(
                    path = %config.path.display(),
                    variables = store.variables.len(),
                    switches = store.switches.len(),
                    "Global data loaded"
                );
                store
            }
            Ok(None) => {
                debug!(path = %config.path.display(), "No global data file, starting empty");
                GlobalStore::default()
            }
            Err(e) => {
                error!(path = %config.path.display(), error = %e, "Failed to load global data");
                GlobalStore::default()
            }
        };
        Self {
            path: config.path.clone(),
            store,
        }
    }

    /// Value of a global variable slot, if set.
    pub fn variable(&self, id: u32) -> Option<i64> {
        self.store.variables.get(&id).copied()
    }

    /// Value of a global switch slot, if set.
    pub fn switch(&self, id: u32) -> Option<bool> {
        self.store.switches.get(&id).copied()
    }

    /// The whole store.
    pub const fn store(&self) -> &GlobalStore {
        &self.store
    }

    /// Copy host variable `local_id` into slot `global_id` and persist.
    ///
    /// # Errors
    ///
    /// Returns [`GlobalDataError`] if the file cannot be written.
    pub fn set_variable(
        &mut self,
        global_id: u32,
        local_id: u32,
        game: &GameState,
    ) -> Result<(), GlobalDataError> {
        self.store.variables.insert(global_id, game.variable(local_id));
        self.persist()
    }

    /// Copy host switch `local_id` into slot `global_id` and persist.
    ///
    /// # Errors
    ///
    /// Returns [`GlobalDataError`] if the file cannot be written.
    pub fn set_switch(
        &mut self,
        global_id: u32,
        local_id: u32,
        game: &GameState,
    ) -> Result<(), GlobalDataError> {
        self.store.switches.insert(global_id, game.switch(local_id));
        self.persist()
    }

    fn persist(&self) -> Result<(), GlobalDataError> {
        self.store.write_to(&self.path)?;
        debug!(path = %self.path.display(), "Global data saved");
        Ok(())
    }
}

impl Collaborator for GlobalData {
    fn name(&self) -> &'static str {
        NAME
    }

    fn on_command(
        &mut self,
        command: &PluginCommand,
        _ledger: &Ledger,
        game: &mut GameState,
    ) -> Result<bool, HostError> {
        match *command {
            PluginCommand::SetGlobalVariable {
                global_id,
                local_id,
            } => {
                self.set_variable(global_id, local_id, game)?;
                Ok(true)
            }
            PluginCommand::SetGlobalSwitch {
                global_id,
                local_id,
            } => {
                self.set_switch(global_id, local_id, game)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
