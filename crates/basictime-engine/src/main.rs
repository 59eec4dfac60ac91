//! Headless host binary for `BasicTime`.
//!
//! Wires the ledger, the plugin collaborators, and the operator controls
//! into a running game clock. Plugin commands and operator controls are
//! read from stdin; the game is saved when the tick loop ends.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `basictime-config.yaml` (or `BASICTIME_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Validate configuration and build the host
//! 4. Register collaborators in build order
//! 5. Boot: splash pictures, then a new game on the first map
//! 6. Load the save file if present
//! 7. Start the console reader and the Ctrl-C handler
//! 8. Run the tick loop
//! 9. Save and log the result

mod console;
mod error;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use basictime_core::config::{BasicTimeConfig, LoggingConfig, SplashConfig};
use basictime_core::game::{GameState, MapInfo, Scene};
use basictime_core::host::Host;
use basictime_core::operator::OperatorState;
use basictime_core::runner;
use basictime_core::save::SaveContents;
use basictime_plugins::{SplashSequence, boot_scene, build_collaborators};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Default configuration file, relative to the working directory.
const CONFIG_FILE: &str = "basictime-config.yaml";

/// Environment variable overriding [`CONFIG_FILE`].
const CONFIG_ENV: &str = "BASICTIME_CONFIG";

/// Length of one splash frame.
const FRAME: Duration = Duration::from_millis(16);

/// Map entered by a new game.
const START_MAP: MapInfo = MapInfo {
    id: 1,
    indoor: false,
};

/// Application entry point.
///
/// # Errors
///
/// Returns an error if any initialization step, loading, or saving fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, config_path) = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging)?;
    info!("basictime-engine starting");
    match &config_path {
        Some(path) => info!(path = %path.display(), "Configuration loaded"),
        None => info!("Config file not found, using defaults"),
    }

    // 3. Validate and build the host.
    config.validate()?;
    let mut host = Host::new(&config.time)?;
    info!(
        units = ?host.ledger().unit_names().collect::<Vec<_>>(),
        update_interval_ms = config.time.update_interval_ms,
        "Ledger initialized"
    );

    // 4. Register collaborators.
    for collaborator in build_collaborators(&config)? {
        host.register(collaborator)?;
    }
    info!(plugins = ?host.collaborator_names(), "Collaborators registered");

    // 5-6. Boot and start the game.
    boot(&mut host, &config).await?;

    // 7. Operator controls.
    let operator = Arc::new(OperatorState::new(
        config.time.update_interval_ms,
        config.engine.max_ticks,
    ));
    let (command_tx, mut command_rx) = mpsc::unbounded_channel();
    if let Err(e) = console::spawn_console(Arc::clone(&operator), command_tx) {
        warn!(error = %e, "Console unavailable, running without commands");
    }
    spawn_signal_handler(Arc::clone(&operator));
    info!(
        tick_interval_ms = operator.tick_interval_ms(),
        max_ticks = operator.max_ticks(),
        "Operator state initialized"
    );

    // 8. Run the tick loop.
    let result = runner::run(&mut host, &operator, &mut command_rx).await;
    runner::log_run_end(&result, &operator);

    // 9. Save.
    save_game(&host, &config.engine.save_path)?;
    info!(
        end_reason = ?result.end_reason,
        applied_ticks = result.applied_ticks,
        time = ?host.ledger().snapshot(),
        "basictime-engine shutdown complete"
    );

    Ok(())
}

/// Load configuration from [`CONFIG_ENV`] or [`CONFIG_FILE`].
///
/// Returns the path that was read, or `None` if defaults are used.
fn load_config() -> Result<(BasicTimeConfig, Option<PathBuf>), EngineError> {
    let config_path =
        std::env::var_os(CONFIG_ENV).map_or_else(|| PathBuf::from(CONFIG_FILE), PathBuf::from);
    if config_path.exists() {
        let config = BasicTimeConfig::from_file(&config_path)?;
        Ok((config, Some(config_path)))
    } else {
        Ok((BasicTimeConfig::default(), None))
    }
}

/// Install the tracing subscriber. `RUST_LOG` wins over the configured level.
fn init_logging(config: &LoggingConfig) -> Result<(), EngineError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| EngineError::Logging {
        message: e.to_string(),
    })
}

/// Go from boot to the scene the configuration asks for.
async fn boot(host: &mut Host, config: &BasicTimeConfig) -> Result<(), EngineError> {
    let scene = boot_scene(&config.splash, config.engine.boot_mode);
    info!(mode = ?config.engine.boot_mode, ?scene, "Booting");
    match scene {
        Scene::Battle => {
            host.new_game();
            host.game_mut().scene = Scene::Battle;
            Ok(())
        }
        Scene::Splash => {
            play_splash(&config.splash, host.game_mut()).await;
            start_game(host, config)
        }
        Scene::Boot | Scene::Title | Scene::Map | Scene::Menu => start_game(host, config),
    }
}

/// Show every splash picture, one update per frame, then the title.
async fn play_splash(config: &SplashConfig, game: &mut GameState) {
    let mut sequence = SplashSequence::new(config);
    game.scene = Scene::Splash;
    info!(
        pictures = config.pictures.len(),
        frames = sequence.total_frames(),
        "Splash starting"
    );
    let mut frames = tokio::time::interval(FRAME);
    while !sequence.is_finished() {
        frames.tick().await;
        sequence.update();
    }
    game.scene = Scene::Title;
    info!("Splash finished, at title");
}

/// Start a new game, continue from the save file if there is one, and
/// enter the first map with the plugin switches on.
fn start_game(host: &mut Host, config: &BasicTimeConfig) -> Result<(), EngineError> {
    host.new_game();

    let save_path = &config.engine.save_path;
    if save_path.exists() {
        let contents = SaveContents::read_from(save_path)?;
        host.load(&contents)?;
        info!(path = %save_path.display(), "Save file loaded");
    }

    let game = host.game_mut();
    for switch_id in [
        config.time.switch_id,
        config.time_hud.switch_id,
        config.time_tints.switch_id,
        config.party_hud.switch_id,
    ] {
        game.set_switch(switch_id, true);
    }
    game.scene = Scene::Map;
    host.setup_map(START_MAP);
    info!(map = START_MAP.id, "Entered map");
    Ok(())
}

/// Request a clean stop on Ctrl-C.
fn spawn_signal_handler(operator: Arc<OperatorState>) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl-C received, stopping");
                operator.request_stop();
            }
            Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C"),
        }
    });
}

/// Write the host's save contents to `path`.
fn save_game(host: &Host, path: &Path) -> Result<(), EngineError> {
    let contents = host.save()?;
    contents.write_to(path)?;
    info!(path = %path.display(), "Game saved");
    Ok(())
}
