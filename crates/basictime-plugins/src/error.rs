//! Error types for the `basictime-plugins` crate.

use basictime_core::HostError;

/// Errors that can occur when building a collaborator from configuration.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// A tint step names a tint that is not defined.
    #[error("tint step {from}..={to} names unknown tint `{tint}`")]
    UnknownTint {
        /// First unit value of the step.
        from: u32,
        /// Last unit value of the step.
        to: u32,
        /// The missing tint name.
        tint: String,
    },
}

/// Errors that can occur when persisting the global data store.
#[derive(Debug, thiserror::Error)]
pub enum GlobalDataError {
    /// Failed to read or write the store file.
    #[error("global data I/O failed: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The store file is not valid JSON.
    #[error("global data is malformed: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}

impl From<GlobalDataError> for HostError {
    fn from(e: GlobalDataError) -> Self {
        Self::Plugin {
            plugin: crate::global_data::NAME,
            message: e.to_string(),
        }
    }
}
