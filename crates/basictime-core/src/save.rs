//! Save-file contents: a JSON object of named sections.
//!
//! The host engine writes one object per save slot. Each collaborator owns
//! one or more top-level keys in it; the ledger's values live under
//! [`TIME_SECTION`]. How the host encodes the object on disk (compression,
//! slot naming) is outside this crate; [`SaveContents::write_to`] and
//! [`SaveContents::read_from`] store it as plain JSON.

use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::ledger::{Ledger, Snapshot};

/// Section holding the ledger snapshot.
pub const TIME_SECTION: &str = "basicTimeData";

/// Errors that can occur when reading or writing save contents.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    /// Failed to read or write the save file.
    #[error("save file I/O failed: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// A section could not be encoded or decoded.
    #[error("save section `{section}` is malformed: {source}")]
    Section {
        /// Section key.
        section: String,
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// The file is not a JSON object.
    #[error("save file is not a JSON object: {source}")]
    Json {
        /// The underlying JSON error.
        source: serde_json::Error,
    },
}

/// Named sections of one save slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaveContents {
    sections: Map<String, Value>,
}

impl SaveContents {
    /// Create empty contents.
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode `value` under `section`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`SaveError::Section`] if the value cannot be encoded.
    pub fn insert_section<T: Serialize>(
        &mut self,
        section: &str,
        value: &T,
    ) -> Result<(), SaveError> {
        let encoded = serde_json::to_value(value).map_err(|source| SaveError::Section {
            section: section.to_owned(),
            source,
        })?;
        self.sections.insert(section.to_owned(), encoded);
        Ok(())
    }

    /// Decode `section`, or `None` if it is absent.
    ///
    /// # Errors
    ///
    /// Returns [`SaveError::Section`] if the section exists but does not
    /// decode as `T`.
    pub fn section<T: DeserializeOwned>(&self, section: &str) -> Result<Option<T>, SaveError> {
        self.sections
            .get(section)
            .map(|value| {
                T::deserialize(value).map_err(|source| SaveError::Section {
                    section: section.to_owned(),
                    source,
                })
            })
            .transpose()
    }

    /// Whether `section` is present.
    pub fn contains(&self, section: &str) -> bool {
        self.sections.contains_key(section)
    }

    /// Serialize to a JSON string.
    pub fn to_json_string(&self) -> String {
        Value::Object(self.sections.clone()).to_string()
    }

    /// Parse from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`SaveError::Json`] if the text is not a JSON object.
    pub fn from_json_str(text: &str) -> Result<Self, SaveError> {
        let sections: Map<String, Value> =
            serde_json::from_str(text).map_err(|source| SaveError::Json { source })?;
        Ok(Self { sections })
    }

    /// Write to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`SaveError::Io`] on filesystem failure.
    pub fn write_to(&self, path: &Path) -> Result<(), SaveError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json_string())?;
        Ok(())
    }

    /// Read from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SaveError::Io`] if the file cannot be read, or
    /// [`SaveError::Json`] if it is not a JSON object.
    pub fn read_from(path: &Path) -> Result<Self, SaveError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

/// Store the ledger snapshot under [`TIME_SECTION`].
///
/// # Errors
///
/// Returns [`SaveError::Section`] if encoding fails.
pub fn save_ledger(ledger: &Ledger, contents: &mut SaveContents) -> Result<(), SaveError> {
    contents.insert_section(TIME_SECTION, &ledger.snapshot())
}

/// Restore the ledger from [`TIME_SECTION`]. Returns whether the section
/// was present; a missing section leaves the ledger untouched.
///
/// # Errors
///
/// Returns [`SaveError::Section`] if the section is malformed.
pub fn load_ledger(ledger: &mut Ledger, contents: &SaveContents) -> Result<bool, SaveError> {
    match contents.section::<Snapshot>(TIME_SECTION)? {
        Some(snapshot) => {
            ledger.restore(&snapshot);
            Ok(true)
        }
        None => Ok(false),
    }
}
