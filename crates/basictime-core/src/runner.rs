//! Tick loop runner with operator controls.
//!
//! [`run`] drives a [`Host`] from a `tokio` interval: each interval tick
//! calls [`Host::tick`], which advances the ledger by one step when the
//! host's gate is open. Plugin commands arriving on the command channel are
//! applied between ticks. Common events reserved by either are taken off
//! the host queue and run right after. Around that sit the operator
//! controls:
//!
//! - **Pause/resume**: no ticks are taken while paused
//! - **Variable tick speed**: `Time changeUpdateInterval` rebuilds the interval
//! - **Bounded run**: stop after `max_ticks` applied ticks
//! - **Operator stop**: clean stop at the next loop iteration

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::command::PluginCommand;
use crate::host::{CommandOutcome, Host};
use crate::operator::{OperatorState, RunEndReason};

/// Result of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    /// Why the loop ended.
    pub end_reason: RunEndReason,
    /// Interval ticks that advanced the ledger.
    pub applied_ticks: u64,
    /// Interval ticks the gate held back.
    pub skipped_ticks: u64,
    /// Commands applied successfully.
    pub commands_applied: u64,
    /// Reserved common events taken off the host queue.
    pub common_events_run: u64,
}

/// Run the tick loop until the operator stops it or the tick limit is hit.
///
/// Command failures (unknown units, rejected intervals) are logged and do
/// not end the run. A closed command channel only stops command intake.
pub async fn run(
    host: &mut Host,
    operator: &Arc<OperatorState>,
    commands: &mut UnboundedReceiver<PluginCommand>,
) -> RunResult {
    let mut result = RunResult {
        end_reason: RunEndReason::OperatorStop,
        applied_ticks: 0,
        skipped_ticks: 0,
        commands_applied: 0,
        common_events_run: 0,
    };
    let mut period_ms = operator.tick_interval_ms();
    let mut ticker = make_interval(period_ms);
    let mut commands_open = true;

    info!(
        tick_interval_ms = period_ms,
        max_ticks = operator.max_ticks(),
        "Tick loop starting"
    );

    loop {
        // --- Check pause ---
        if operator.is_paused() {
            info!("Tick loop paused, waiting for resume...");
            operator.wait_if_paused().await;
            ticker.reset();
            info!("Tick loop resumed");
        }

        // --- Check stop request ---
        if operator.is_stop_requested() {
            info!("Operator stop requested");
            result.end_reason = RunEndReason::OperatorStop;
            return result;
        }

        tokio::select! {
            _ = ticker.tick() => {
                match host.tick() {
                    Some(changed) => {
                        result.applied_ticks = result.applied_ticks.saturating_add(1);
                        debug!(
                            tick = result.applied_ticks,
                            changed = ?changed.iter().collect::<Vec<_>>(),
                            "Tick applied"
                        );
                    }
                    None => {
                        result.skipped_ticks = result.skipped_ticks.saturating_add(1);
                    }
                }
                run_common_events(host, &mut result);

                if operator.tick_limit_reached(result.applied_ticks) {
                    info!(
                        applied_ticks = result.applied_ticks,
                        max_ticks = operator.max_ticks(),
                        "Tick limit reached"
                    );
                    result.end_reason = RunEndReason::MaxTicksReached;
                    return result;
                }
            }
            received = commands.recv(), if commands_open => {
                match received {
                    Some(command) => {
                        if apply_command(host, operator, &command) {
                            result.commands_applied = result.commands_applied.saturating_add(1);
                        }
                        run_common_events(host, &mut result);
                    }
                    None => {
                        debug!("Command channel closed");
                        commands_open = false;
                    }
                }
            }
        }

        // --- Pick up interval changes ---
        let wanted_ms = operator.tick_interval_ms();
        if wanted_ms != period_ms {
            info!(from_ms = period_ms, to_ms = wanted_ms, "Tick interval changed");
            period_ms = wanted_ms;
            ticker = make_interval(period_ms);
        }
    }
}

/// Apply one command; returns whether it took effect.
fn apply_command(host: &mut Host, operator: &OperatorState, command: &PluginCommand) -> bool {
    match host.execute(command) {
        Ok(CommandOutcome::Applied) => {
            debug!(%command, "Command applied");
            true
        }
        Ok(CommandOutcome::IntervalChanged(ms)) => {
            if operator.set_tick_interval_ms(ms).is_some() {
                true
            } else {
                warn!(%command, "Rejected tick interval");
                false
            }
        }
        Ok(CommandOutcome::Unhandled) => {
            warn!(%command, "No plugin handled command");
            false
        }
        Err(e) => {
            warn!(%command, error = %e, "Command failed");
            false
        }
    }
}

/// Take every reserved common event off the host queue, oldest first.
fn run_common_events(host: &mut Host, result: &mut RunResult) {
    for id in host.game_mut().drain_common_events() {
        info!(common_event = id, "Running common event");
        result.common_events_run = result.common_events_run.saturating_add(1);
    }
}

fn make_interval(period_ms: u64) -> Interval {
    let period = Duration::from_millis(period_ms.max(1));
    let start = Instant::now().checked_add(period).unwrap_or_else(Instant::now);
    let mut ticker = tokio::time::interval_at(start, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

/// Log the end of a run.
pub fn log_run_end(result: &RunResult, operator: &OperatorState) {
    info!(
        reason = ?result.end_reason,
        applied_ticks = result.applied_ticks,
        skipped_ticks = result.skipped_ticks,
        commands_applied = result.commands_applied,
        common_events_run = result.common_events_run,
        elapsed_seconds = operator.elapsed_seconds(),
        "Tick loop ended"
    );
    if result.applied_ticks == 0 {
        warn!("Run ended with no ticks applied");
    }
}
