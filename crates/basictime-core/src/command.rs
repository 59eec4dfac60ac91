//! Plugin commands issued from the host's event scripts.
//!
//! Commands arrive as a line of whitespace-separated words, for example
//! `Time changeUnit hour -1` or `GlobalData setVariable 3, 12`. Commas
//! between arguments are accepted and ignored.

use std::fmt;

/// Errors produced when parsing a plugin command line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// The line was empty.
    #[error("empty command")]
    Empty,

    /// The first word is not a known plugin.
    #[error("unknown plugin command: {0}")]
    UnknownCommand(String),

    /// The second word is not a known sub-command of the plugin.
    #[error("unknown {command} sub-command: {sub}")]
    UnknownSubCommand {
        /// Plugin name.
        command: &'static str,
        /// The unrecognized sub-command.
        sub: String,
    },

    /// An argument is missing.
    #[error("{command} is missing argument `{argument}`")]
    MissingArgument {
        /// The sub-command being parsed.
        command: &'static str,
        /// Name of the missing argument.
        argument: &'static str,
    },

    /// An argument is not a valid number.
    #[error("{command}: `{value}` is not a valid {argument}")]
    InvalidArgument {
        /// The sub-command being parsed.
        command: &'static str,
        /// Name of the argument.
        argument: &'static str,
        /// The text that failed to parse.
        value: String,
    },
}

/// A parsed plugin command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginCommand {
    /// `Time setUnit <unit> <value>`: overwrite a unit, clamped.
    SetUnit {
        /// Unit name.
        unit: String,
        /// New value.
        value: i64,
    },

    /// `Time changeUnit <unit> <amount>`: step a unit with cascades.
    ChangeUnit {
        /// Unit name.
        unit: String,
        /// Signed step count.
        amount: i64,
    },

    /// `Time changeUpdateInterval <ms>`: change the tick interval.
    ChangeUpdateInterval {
        /// New interval in milliseconds.
        interval_ms: u64,
    },

    /// `Time refreshHud`: redraw the time HUD.
    RefreshHud,

    /// `GlobalData setVariable <globalId> <localId>`.
    SetGlobalVariable {
        /// Slot in the global store.
        global_id: u32,
        /// Host variable copied into it.
        local_id: u32,
    },

    /// `GlobalData setSwitch <globalId> <localId>`.
    SetGlobalSwitch {
        /// Slot in the global store.
        global_id: u32,
        /// Host switch copied into it.
        local_id: u32,
    },
}

impl PluginCommand {
    /// Parse a command line.
    ///
    /// # Errors
    ///
    /// Returns a [`CommandError`] describing the first problem.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let mut words = line
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|w| !w.is_empty());

        let command = words.next().ok_or(CommandError::Empty)?;
        match command {
            "Time" => parse_time(&mut words),
            "GlobalData" => parse_global_data(&mut words),
            other => Err(CommandError::UnknownCommand(other.to_owned())),
        }
    }
}

fn parse_time<'a>(
    words: &mut impl Iterator<Item = &'a str>,
) -> Result<PluginCommand, CommandError> {
    let sub = words.next().ok_or(CommandError::MissingArgument {
        command: "Time",
        argument: "sub-command",
    })?;
    match sub {
        "setUnit" => Ok(PluginCommand::SetUnit {
            unit: word(words, "setUnit", "unit")?.to_owned(),
            value: number(words, "setUnit", "value")?,
        }),
        "changeUnit" => Ok(PluginCommand::ChangeUnit {
            unit: word(words, "changeUnit", "unit")?.to_owned(),
            amount: number(words, "changeUnit", "amount")?,
        }),
        "changeUpdateInterval" | "changeTimeInterval" => Ok(PluginCommand::ChangeUpdateInterval {
            interval_ms: number(words, "changeUpdateInterval", "interval")?,
        }),
        "refreshHud" => Ok(PluginCommand::RefreshHud),
        other => Err(CommandError::UnknownSubCommand {
            command: "Time",
            sub: other.to_owned(),
        }),
    }
}

fn parse_global_data<'a>(
    words: &mut impl Iterator<Item = &'a str>,
) -> Result<PluginCommand, CommandError> {
    let sub = words.next().ok_or(CommandError::MissingArgument {
        command: "GlobalData",
        argument: "sub-command",
    })?;
    match sub {
        "setVariable" => Ok(PluginCommand::SetGlobalVariable {
            global_id: number(words, "setVariable", "global id")?,
            local_id: number(words, "setVariable", "local id")?,
        }),
        "setSwitch" => Ok(PluginCommand::SetGlobalSwitch {
            global_id: number(words, "setSwitch", "global id")?,
            local_id: number(words, "setSwitch", "local id")?,
        }),
        other => Err(CommandError::UnknownSubCommand {
            command: "GlobalData",
            sub: other.to_owned(),
        }),
    }
}

fn word<'a>(
    words: &mut impl Iterator<Item = &'a str>,
    command: &'static str,
    argument: &'static str,
) -> Result<&'a str, CommandError> {
    words
        .next()
        .ok_or(CommandError::MissingArgument { command, argument })
}

fn number<'a, T: std::str::FromStr>(
    words: &mut impl Iterator<Item = &'a str>,
    command: &'static str,
    argument: &'static str,
) -> Result<T, CommandError> {
    let raw = word(words, command, argument)?;
    raw.parse().map_err(|_err| CommandError::InvalidArgument {
        command,
        argument,
        value: raw.to_owned(),
    })
}

impl fmt::Display for PluginCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetUnit { unit, value } => write!(f, "Time setUnit {unit} {value}"),
            Self::ChangeUnit { unit, amount } => write!(f, "Time changeUnit {unit} {amount}"),
            Self::ChangeUpdateInterval { interval_ms } => {
                write!(f, "Time changeUpdateInterval {interval_ms}")
            }
            Self::RefreshHud => f.write_str("Time refreshHud"),
            Self::SetGlobalVariable {
                global_id,
                local_id,
            } => write!(f, "GlobalData setVariable {global_id} {local_id}"),
            Self::SetGlobalSwitch {
                global_id,
                local_id,
            } => write!(f, "GlobalData setSwitch {global_id} {local_id}"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parse_set_unit() {
        assert_eq!(
            PluginCommand::parse("Time setUnit hour 12").unwrap(),
            PluginCommand::SetUnit {
                unit: "hour".to_owned(),
                value: 12
            }
        );
    }

    #[test]
    fn parse_negative_change() {
        assert_eq!(
            PluginCommand::parse("  Time   changeUnit minute -90 ").unwrap(),
            PluginCommand::ChangeUnit {
                unit: "minute".to_owned(),
                amount: -90
            }
        );
    }

    #[test]
    fn interval_aliases() {
        let expected = PluginCommand::ChangeUpdateInterval { interval_ms: 250 };
        assert_eq!(PluginCommand::parse("Time changeUpdateInterval 250").unwrap(), expected);
        assert_eq!(PluginCommand::parse("Time changeTimeInterval 250").unwrap(), expected);
    }

    #[test]
    fn global_data_with_commas() {
        assert_eq!(
            PluginCommand::parse("GlobalData setVariable 3, 12").unwrap(),
            PluginCommand::SetGlobalVariable {
                global_id: 3,
                local_id: 12
            }
        );
        assert_eq!(
            PluginCommand::parse("GlobalData setSwitch 1,2").unwrap(),
            PluginCommand::SetGlobalSwitch {
                global_id: 1,
                local_id: 2
            }
        );
    }

    #[test]
    fn refresh_hud() {
        assert_eq!(PluginCommand::parse("Time refreshHud").unwrap(), PluginCommand::RefreshHud);
    }

    #[test]
    fn errors() {
        assert_eq!(PluginCommand::parse("   "), Err(CommandError::Empty));
        assert!(matches!(
            PluginCommand::parse("Weather rain"),
            Err(CommandError::UnknownCommand(_))
        ));
        assert!(matches!(
            PluginCommand::parse("Time rewind"),
            Err(CommandError::UnknownSubCommand { .. })
        ));
        assert!(matches!(
            PluginCommand::parse("Time setUnit hour"),
            Err(CommandError::MissingArgument { .. })
        ));
        assert!(matches!(
            PluginCommand::parse("Time setUnit hour noon"),
            Err(CommandError::InvalidArgument { .. })
        ));
        assert!(matches!(
            PluginCommand::parse("Time changeUpdateInterval -5"),
            Err(CommandError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn display_reparses() {
        let command = PluginCommand::ChangeUnit {
            unit: "hour".to_owned(),
            amount: -2,
        };
        assert_eq!(PluginCommand::parse(&command.to_string()).unwrap(), command);
    }
}
