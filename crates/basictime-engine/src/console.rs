//! Operator console on stdin.
//!
//! Each line is either an operator control (`pause`, `resume`, `stop`) or
//! a plugin command such as `Time changeUnit hour 1`, which is forwarded to
//! the tick loop. Bad lines are logged and skipped. End of input closes the
//! command channel; the tick loop keeps running.
//!
//! Stdin is read with blocking I/O on a dedicated thread so a pending read
//! never holds up runtime shutdown.

use std::io::BufRead;
use std::sync::Arc;
use std::thread::JoinHandle;

use basictime_core::command::{CommandError, PluginCommand};
use basictime_core::operator::OperatorState;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

/// One parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleLine {
    /// Blank line.
    Empty,
    /// Pause the tick loop.
    Pause,
    /// Resume the tick loop.
    Resume,
    /// Stop the tick loop.
    Stop,
    /// A plugin command for the host.
    Command(PluginCommand),
}

/// Parse one console line.
pub fn parse_line(line: &str) -> Result<ConsoleLine, CommandError> {
    match line.trim() {
        "" => Ok(ConsoleLine::Empty),
        "pause" => Ok(ConsoleLine::Pause),
        "resume" => Ok(ConsoleLine::Resume),
        "stop" | "quit" => Ok(ConsoleLine::Stop),
        other => PluginCommand::parse(other).map(ConsoleLine::Command),
    }
}

/// Read stdin on a background thread.
pub fn spawn_console(
    operator: Arc<OperatorState>,
    commands: UnboundedSender<PluginCommand>,
) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("console".to_owned())
        .spawn(move || read_console(std::io::stdin().lock(), &operator, &commands))
}

/// Apply console lines from `reader` until end of input or a stop.
pub fn read_console<R: BufRead>(
    reader: R,
    operator: &OperatorState,
    commands: &UnboundedSender<PluginCommand>,
) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "Console read failed");
                return;
            }
        };

        match parse_line(&line) {
            Ok(ConsoleLine::Empty) => {}
            Ok(ConsoleLine::Pause) => {
                info!("Operator pause");
                operator.pause();
            }
            Ok(ConsoleLine::Resume) => {
                info!("Operator resume");
                operator.resume();
            }
            Ok(ConsoleLine::Stop) => {
                info!("Operator stop");
                operator.request_stop();
                return;
            }
            Ok(ConsoleLine::Command(command)) => {
                if commands.send(command).is_err() {
                    debug!("Tick loop gone, console exiting");
                    return;
                }
            }
            Err(e) => warn!(line = %line.trim(), error = %e, "Ignoring console line"),
        }
    }
    debug!("Console input closed");
}
