//! Configuration loading and typed config structures for `BasicTime`.
//!
//! The canonical configuration lives in `basictime-config.yaml`. This module
//! defines strongly-typed structs that mirror the YAML structure, a loader
//! that reads the file, and [`BasicTimeConfig::validate`], which checks the
//! cross-references between sections (tint steps naming tints, connections
//! naming units) before anything is constructed from them.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but is internally inconsistent.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level `BasicTime` configuration.
///
/// Mirrors the structure of `basictime-config.yaml`. Every section has
/// defaults matching the stock plugin parameters, so an empty file is a
/// valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BasicTimeConfig {
    /// Time core settings (units, update interval, gate).
    #[serde(default)]
    pub time: TimeConfig,

    /// Time HUD window settings.
    #[serde(default)]
    pub time_hud: TimeHudConfig,

    /// Time-of-day screen tinting.
    #[serde(default)]
    pub time_tints: TimeTintsConfig,

    /// Common events reserved when a unit changes.
    #[serde(default)]
    pub common_events: ConnectionsConfig,

    /// Host variables mirroring unit values.
    #[serde(default)]
    pub variables: ConnectionsConfig,

    /// Cross-save global variables and switches.
    #[serde(default)]
    pub global_data: GlobalDataConfig,

    /// Party status HUD.
    #[serde(default)]
    pub party_hud: PartyHudConfig,

    /// Splash screen intro sequence.
    #[serde(default)]
    pub splash: SplashConfig,

    /// Engine binary settings (save file, bounds, screen size).
    #[serde(default)]
    pub engine: EngineConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BasicTimeConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_yml::from_str(&contents)?;
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }

    /// Check the cross-references between sections.
    ///
    /// Unit-level rules (duplicates, `max < 1`) are enforced by
    /// [`Ledger::new`](crate::ledger::Ledger::new); this only checks what
    /// the ledger cannot see. Sections that are disabled are not checked.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.time.update_interval_ms == 0 {
            return Err(invalid("time.update_interval_ms must be at least 1"));
        }

        let units: BTreeSet<&str> = self.time.units.iter().map(|u| u.name.as_str()).collect();

        if self.time_tints.enabled {
            let Some(tint_unit) = self
                .time
                .units
                .iter()
                .find(|u| u.name == self.time_tints.unit)
            else {
                return Err(invalid(format!(
                    "time_tints.unit `{}` is not a configured unit",
                    self.time_tints.unit
                )));
            };
            for step in &self.time_tints.steps {
                if step.from > step.to {
                    return Err(invalid(format!(
                        "tint step {}..={} is empty",
                        step.from, step.to
                    )));
                }
                if step.to > tint_unit.max {
                    return Err(invalid(format!(
                        "tint step {}..={} goes past {} max {}",
                        step.from, step.to, tint_unit.name, tint_unit.max
                    )));
                }
                if !self.time_tints.named.contains_key(&step.tint) {
                    return Err(invalid(format!("tint step names unknown tint `{}`", step.tint)));
                }
            }
        }

        for (section, connections) in [
            ("common_events", &self.common_events),
            ("variables", &self.variables),
        ] {
            if !connections.enabled {
                continue;
            }
            if let Some(bad) = connections
                .connections
                .iter()
                .find(|c| !units.contains(c.unit.as_str()))
            {
                return Err(invalid(format!(
                    "{section} connection names unknown unit `{}`",
                    bad.unit
                )));
            }
        }

        Ok(())
    }
}

fn invalid(reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        reason: reason.into(),
    }
}

/// One time unit as configured: name, starting value and inclusive maximum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitConfig {
    /// Unit name, unique within the ledger.
    pub name: String,

    /// Value the unit holds at initialization (clamped into `0..=max`).
    #[serde(default)]
    pub start: u32,

    /// Largest value the unit can hold before it carries.
    pub max: u32,
}

impl UnitConfig {
    /// Build a unit config from its parts.
    pub fn new(name: &str, start: u32, max: u32) -> Self {
        Self {
            name: name.to_owned(),
            start,
            max,
        }
    }
}

/// Time core configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TimeConfig {
    /// Real-time milliseconds between ticks.
    #[serde(default = "default_update_interval_ms")]
    pub update_interval_ms: u64,

    /// Whether time keeps flowing while a message window is open.
    #[serde(default)]
    pub update_during_message: bool,

    /// Time only flows while this switch is on.
    #[serde(default = "default_switch_id")]
    pub switch_id: u32,

    /// Units in cascade order, fastest first.
    #[serde(default = "default_units")]
    pub units: Vec<UnitConfig>,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            update_interval_ms: default_update_interval_ms(),
            update_during_message: false,
            switch_id: default_switch_id(),
            units: default_units(),
        }
    }
}

/// Time HUD window configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TimeHudConfig {
    /// Whether the HUD collaborator is registered.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// The HUD is visible while this switch is on.
    #[serde(default = "default_switch_id")]
    pub switch_id: u32,

    /// Window x position.
    #[serde(default)]
    pub x: i32,

    /// Window y position.
    #[serde(default)]
    pub y: i32,

    /// Window width.
    #[serde(default = "default_hud_width")]
    pub width: u32,

    /// Window height.
    #[serde(default = "default_hud_height")]
    pub height: u32,

    /// Text template; see the time HUD formatter for the syntax.
    #[serde(default = "default_hud_text")]
    pub text: String,
}

impl Default for TimeHudConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            switch_id: default_switch_id(),
            x: 0,
            y: 0,
            width: default_hud_width(),
            height: default_hud_height(),
            text: default_hud_text(),
        }
    }
}

/// A contiguous range of unit values mapped to a named tint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TintStep {
    /// First unit value of the range.
    pub from: u32,
    /// Last unit value of the range (inclusive).
    pub to: u32,
    /// Name of the tint in [`TimeTintsConfig::named`].
    pub tint: String,
}

impl TintStep {
    fn new(from: u32, to: u32, tint: &str) -> Self {
        Self {
            from,
            to,
            tint: tint.to_owned(),
        }
    }
}

/// Time-of-day tinting configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TimeTintsConfig {
    /// Whether the tint collaborator is registered.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Unit whose value selects the tint.
    #[serde(default = "default_tint_unit")]
    pub unit: String,

    /// Tint transition duration in frames.
    #[serde(default = "default_tint_duration")]
    pub duration: u32,

    /// Tinting only happens while this switch is on.
    #[serde(default = "default_switch_id")]
    pub switch_id: u32,

    /// Tone used on indoor maps: `[red, green, blue, grey]`.
    #[serde(default)]
    pub indoor: [i32; 4],

    /// Named tones: `name -> [red, green, blue, grey]`.
    #[serde(default = "default_named_tints")]
    pub named: BTreeMap<String, [i32; 4]>,

    /// Value ranges mapped to named tones.
    #[serde(default = "default_tint_steps")]
    pub steps: Vec<TintStep>,
}

impl Default for TimeTintsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            unit: default_tint_unit(),
            duration: default_tint_duration(),
            switch_id: default_switch_id(),
            indoor: [0; 4],
            named: default_named_tints(),
            steps: default_tint_steps(),
        }
    }
}

/// A link between a unit and a numeric host id (common event or variable).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Connection {
    /// Unit name.
    pub unit: String,
    /// Host-side id: a common event id or a variable id.
    #[serde(alias = "common_event", alias = "variable")]
    pub id: u32,
}

impl Connection {
    /// Build a connection from its parts.
    pub fn new(unit: &str, id: u32) -> Self {
        Self {
            unit: unit.to_owned(),
            id,
        }
    }
}

/// Configuration for the unit-to-id connection plugins.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectionsConfig {
    /// Whether the collaborator is registered.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Unit/id pairs.
    #[serde(default = "default_connections")]
    pub connections: Vec<Connection>,
}

impl Default for ConnectionsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            connections: default_connections(),
        }
    }
}

/// Cross-save global data configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GlobalDataConfig {
    /// Whether the global data collaborator is registered.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// JSON file holding the global variables and switches.
    #[serde(default = "default_global_data_path")]
    pub path: PathBuf,
}

impl Default for GlobalDataConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_global_data_path(),
        }
    }
}

/// Screen edge the party HUD is docked to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HudPosition {
    /// Full-width strip along the top edge.
    #[default]
    Top,
    /// Full-width strip along the bottom edge.
    #[serde(alias = "bottom")]
    Bot,
    /// Quarter-width column on the left edge.
    Left,
    /// Quarter-width column on the right edge.
    Right,
}

/// Party status HUD configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct PartyHudConfig {
    /// Whether the party HUD collaborator is registered.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Screen edge the window is docked to.
    #[serde(default)]
    pub position: HudPosition,

    /// Number of party members shown (clamped to 0..=4).
    #[serde(default = "default_max_actors")]
    pub max_actors: u32,

    /// Show HP line.
    #[serde(default = "default_true")]
    pub show_hp: bool,

    /// Show MP line.
    #[serde(default = "default_true")]
    pub show_mp: bool,

    /// Show TP line.
    #[serde(default = "default_true")]
    pub show_tp: bool,

    /// Show actor name.
    #[serde(default = "default_true")]
    pub show_name: bool,

    /// Reserve room for the actor face.
    #[serde(default = "default_true")]
    pub show_face: bool,

    /// The HUD is visible while this switch is on.
    #[serde(default = "default_switch_id")]
    pub switch_id: u32,
}

impl Default for PartyHudConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            position: HudPosition::Top,
            max_actors: default_max_actors(),
            show_hp: true,
            show_mp: true,
            show_tp: true,
            show_name: true,
            show_face: true,
            switch_id: default_switch_id(),
        }
    }
}

/// Splash screen configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SplashConfig {
    /// Whether the splash sequence runs at boot.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Frames each picture is fully shown.
    #[serde(default = "default_splash_duration")]
    pub splash_duration: u32,

    /// Frames for each fade-in and fade-out.
    #[serde(default = "default_fade_duration")]
    pub fade_duration: u32,

    /// Picture names, shown in order. Blank entries are skipped.
    #[serde(default)]
    pub pictures: Vec<String>,
}

impl Default for SplashConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            splash_duration: default_splash_duration(),
            fade_duration: default_fade_duration(),
            pictures: Vec::new(),
        }
    }
}

/// How the host was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BootMode {
    /// Regular start: splash, then title.
    #[default]
    Normal,
    /// Editor battle test: straight into battle.
    BattleTest,
    /// Editor event test: straight onto the map.
    EventTest,
}

/// Engine binary configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// Save file loaded at startup and written at shutdown.
    #[serde(default = "default_save_path")]
    pub save_path: PathBuf,

    /// Stop after this many applied ticks (0 = unlimited).
    #[serde(default)]
    pub max_ticks: u64,

    /// Screen width in pixels.
    #[serde(default = "default_screen_width")]
    pub screen_width: u32,

    /// Screen height in pixels.
    #[serde(default = "default_screen_height")]
    pub screen_height: u32,

    /// How the host was started.
    #[serde(default)]
    pub boot_mode: BootMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            save_path: default_save_path(),
            max_ticks: 0,
            screen_width: default_screen_width(),
            screen_height: default_screen_height(),
            boot_mode: BootMode::Normal,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error), used when `RUST_LOG`
    /// is not set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_update_interval_ms() -> u64 {
    1000
}

const fn default_switch_id() -> u32 {
    1
}

fn default_units() -> Vec<UnitConfig> {
    vec![UnitConfig::new("minute", 0, 59), UnitConfig::new("hour", 6, 23)]
}

const fn default_hud_width() -> u32 {
    144
}

const fn default_hud_height() -> u32 {
    72
}

fn default_hud_text() -> String {
    "(hour, 2) : (minute, 2)".to_owned()
}

fn default_tint_unit() -> String {
    "hour".to_owned()
}

const fn default_tint_duration() -> u32 {
    60
}

fn default_named_tints() -> BTreeMap<String, [i32; 4]> {
    let mut m = BTreeMap::new();
    m.insert("morning".to_owned(), [-51, -34, -17, 68]);
    m.insert("noon".to_owned(), [0, 0, 0, 0]);
    m.insert("afternoon".to_owned(), [0, -17, -34, 0]);
    m.insert("evening".to_owned(), [0, -34, -68, 34]);
    m.insert("night".to_owned(), [-102, -85, -34, 85]);
    m
}

fn default_tint_steps() -> Vec<TintStep> {
    vec![
        TintStep::new(0, 5, "night"),
        TintStep::new(6, 11, "morning"),
        TintStep::new(12, 12, "noon"),
        TintStep::new(13, 16, "afternoon"),
        TintStep::new(17, 21, "evening"),
        TintStep::new(22, 23, "night"),
    ]
}

fn default_connections() -> Vec<Connection> {
    vec![Connection::new("minute", 1), Connection::new("hour", 2)]
}

fn default_global_data_path() -> PathBuf {
    PathBuf::from("save/globaldata.json")
}

const fn default_max_actors() -> u32 {
    4
}

const fn default_splash_duration() -> u32 {
    60
}

const fn default_fade_duration() -> u32 {
    30
}

fn default_save_path() -> PathBuf {
    PathBuf::from("save/file1.json")
}

const fn default_screen_width() -> u32 {
    816
}

const fn default_screen_height() -> u32 {
    624
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = BasicTimeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.time.units.len(), 2);
        assert_eq!(config.time.update_interval_ms, 1000);
        assert_eq!(config.time_tints.steps.len(), 6);
    }

    #[test]
    fn empty_yaml_uses_defaults() {
        let config = BasicTimeConfig::parse("{}").unwrap();
        assert_eq!(config, BasicTimeConfig::default());
    }

    #[test]
    fn parse_units_in_order() {
        let yaml = r"
time:
  update_interval_ms: 250
  units:
    - { name: second, start: 0, max: 59 }
    - { name: minute, start: 30, max: 59 }
    - { name: hour, max: 23 }
time_tints:
  enabled: false
common_events:
  connections: []
variables:
  connections:
    - { unit: second, variable: 7 }
";
        let config = BasicTimeConfig::parse(yaml).unwrap();
        let names: Vec<&str> = config.time.units.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, ["second", "minute", "hour"]);
        assert_eq!(config.time.units.get(1).unwrap().start, 30);
        assert_eq!(config.time.units.get(2).unwrap().start, 0);
        assert_eq!(config.variables.connections, vec![Connection::new("second", 7)]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn common_event_alias_parses() {
        let yaml = r"
common_events:
  connections:
    - { unit: hour, common_event: 3 }
";
        let config = BasicTimeConfig::parse(yaml).unwrap();
        assert_eq!(config.common_events.connections, vec![Connection::new("hour", 3)]);
    }

    #[test]
    fn unknown_tint_name_rejected() {
        let mut config = BasicTimeConfig::default();
        config.time_tints.steps.push(TintStep::new(0, 1, "dusk"));
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn inverted_tint_step_rejected() {
        let mut config = BasicTimeConfig::default();
        config.time_tints.steps = vec![TintStep::new(5, 2, "noon")];
        assert!(config.validate().is_err());
    }

    #[test]
    fn tint_step_past_unit_max_rejected() {
        let mut config = BasicTimeConfig::default();
        config.time_tints.steps.push(TintStep::new(0, 50_000_000, "night"));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("hour max 23"), "{err}");

        config.time_tints.steps = vec![TintStep::new(20, 24, "night")];
        assert!(config.validate().is_err());
        config.time_tints.steps = vec![TintStep::new(20, 23, "night")];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn disabled_tints_are_not_checked() {
        let mut config = BasicTimeConfig::default();
        config.time_tints.enabled = false;
        config.time_tints.unit = "day".to_owned();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn connection_to_unknown_unit_rejected() {
        let mut config = BasicTimeConfig::default();
        config.common_events.connections.push(Connection::new("day", 9));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("day"));
    }

    #[test]
    fn zero_interval_rejected() {
        let mut config = BasicTimeConfig::default();
        config.time.update_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn party_hud_position_parses() {
        let config = BasicTimeConfig::parse("party_hud: { position: bottom }").unwrap();
        assert_eq!(config.party_hud.position, HudPosition::Bot);
        let config = BasicTimeConfig::parse("party_hud: { position: right }").unwrap();
        assert_eq!(config.party_hud.position, HudPosition::Right);
    }

    #[test]
    fn invalid_yaml_is_error() {
        let result = BasicTimeConfig::parse("time: [unclosed");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let config =
            BasicTimeConfig::parse(include_str!("../../../basictime-config.yaml")).unwrap();
        assert_eq!(config, BasicTimeConfig::default());
        assert!(config.validate().is_ok());
    }
}
