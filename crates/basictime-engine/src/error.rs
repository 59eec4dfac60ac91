//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during engine startup, the tick loop, and shutdown.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading or validation failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: basictime_core::config::ConfigError,
    },

    /// Building the host or registering a collaborator failed.
    #[error("host error: {source}")]
    Host {
        /// The underlying host error.
        #[from]
        source: basictime_core::host::HostError,
    },

    /// A collaborator could not be built from its configuration.
    #[error("plugin error: {source}")]
    Plugin {
        /// The underlying plugin error.
        #[from]
        source: basictime_plugins::PluginError,
    },

    /// Reading or writing the save file failed.
    #[error("save error: {source}")]
    Save {
        /// The underlying save error.
        #[from]
        source: basictime_core::save::SaveError,
    },

    /// The log subscriber could not be installed.
    #[error("logging error: {message}")]
    Logging {
        /// Description of the logging failure.
        message: String,
    },
}
