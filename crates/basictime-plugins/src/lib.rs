//! Collaborators that consume the `BasicTime` ledger and host state.
//!
//! Each module provides one plugin implementing
//! [`Collaborator`](basictime_core::host::Collaborator), plus the pure
//! helpers it is built from so they can be tested without a host.
//!
//! # Modules
//!
//! - [`common_events`] -- Reserves common events when connected units change.
//! - [`error`] -- Error types for plugin construction and the global store.
//! - [`global_data`] -- Cross-save variables and switches in a JSON file.
//! - [`party_hud`] -- Party status window layout and text.
//! - [`splash`] -- Boot decision and the splash picture state machine.
//! - [`time_hud`] -- HUD template formatting and the clock window.
//! - [`time_tints`] -- Tint table and time-of-day screen tinting.
//! - [`variables`] -- Mirrors units into host variables.

pub mod common_events;
pub mod error;
pub mod global_data;
pub mod party_hud;
pub mod splash;
pub mod time_hud;
pub mod time_tints;
pub mod variables;

use basictime_core::config::BasicTimeConfig;
use basictime_core::host::Collaborator;
use tracing::info;

pub use common_events::CommonEvents;
pub use error::{GlobalDataError, PluginError};
pub use global_data::GlobalData;
pub use party_hud::PartyHud;
pub use splash::{SplashPhase, SplashSequence, boot_scene};
pub use time_hud::TimeHud;
pub use time_tints::TimeTints;
pub use variables::Variables;

/// Build every enabled collaborator, in registration order.
///
/// Variables come first so the HUD template sees freshly mirrored values;
/// the global data store is last since it only reacts to commands.
///
/// # Errors
///
/// Returns [`PluginError`] if a collaborator cannot be built from its
/// configuration.
pub fn build_collaborators(
    config: &BasicTimeConfig,
) -> Result<Vec<Box<dyn Collaborator>>, PluginError> {
    let mut collaborators: Vec<Box<dyn Collaborator>> = Vec::new();

    if config.variables.enabled {
        collaborators.push(Box::new(Variables::new(&config.variables)));
    }
    if config.common_events.enabled {
        collaborators.push(Box::new(CommonEvents::new(&config.common_events)));
    }
    if config.time_tints.enabled {
        collaborators.push(Box::new(TimeTints::new(&config.time_tints)?));
    }
    if config.time_hud.enabled {
        collaborators.push(Box::new(TimeHud::new(config.time_hud.clone())));
    }
    if config.party_hud.enabled {
        collaborators.push(Box::new(PartyHud::new(
            config.party_hud.clone(),
            config.engine.screen_width,
            config.engine.screen_height,
        )));
    }
    if config.global_data.enabled {
        collaborators.push(Box::new(GlobalData::open(&config.global_data)));
    }

    info!(count = collaborators.len(), "Collaborators built");
    Ok(collaborators)
}
