//! The time unit ledger: an ordered set of bounded counters with cascades.
//!
//! The [`Ledger`] owns the units configured at startup (for example
//! `minute` then `hour`) and behaves like a multi-radix odometer: stepping
//! a unit past its maximum resets it to zero and carries one step into the
//! next unit, stepping it below zero resets it to its maximum and borrows
//! one step from the next unit. The last unit wraps silently.
//!
//! # Notification
//!
//! Every unit touched by a step during one [`advance`](Ledger::advance) or
//! [`change_unit`](Ledger::change_unit) call is marked as changed, even if
//! a full cycle leaves its value where it started. After all steps are
//! applied, the observers of each changed unit run once, in unit order and
//! then registration order, followed by the [`ANY_CHANNEL`] observers.
//!
//! Direct writes ([`set_unit`](Ledger::set_unit),
//! [`restore`](Ledger::restore)) clamp and never notify.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::UnitConfig;

/// Channel name that receives a notification whenever any unit changed.
pub const ANY_CHANNEL: &str = "_any_";

/// A change callback. Receives the ledger after all values have settled.
pub type Observer = Arc<dyn Fn(&Ledger) + Send + Sync>;

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// The unit configuration is invalid. Fatal at startup.
    #[error("invalid unit configuration: {reason}")]
    Configuration {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },

    /// An operation referenced a unit that is not configured.
    #[error("unknown time unit: {name}")]
    UnknownUnit {
        /// The name that was looked up.
        name: String,
    },
}

/// A named bounded counter and the observers of its channel.
struct Unit {
    name: String,
    value: u32,
    max: u32,
    observers: Vec<Observer>,
}

/// Unit names touched during one ledger request, in unit order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    units: Vec<String>,
}

impl ChangeSet {
    /// Whether no unit changed.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Number of changed units.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether the named unit changed.
    pub fn contains(&self, name: &str) -> bool {
        self.units.iter().any(|u| u == name)
    }

    /// Iterate over the changed unit names in unit order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.units.iter().map(String::as_str)
    }
}

/// Unit name to value mapping used for persistence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(pub BTreeMap<String, i64>);

impl Snapshot {
    /// Value recorded for the named unit, if any.
    pub fn get(&self, name: &str) -> Option<i64> {
        self.0.get(name).copied()
    }
}

/// Ordered time units with carry/borrow cascades and change observers.
pub struct Ledger {
    /// Units in cascade order, fastest first.
    units: Vec<Unit>,

    /// Observers of the any-change channel.
    any_observers: Vec<Observer>,
}

impl fmt::Debug for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ledger")
            .field("units", &self.snapshot())
            .field("any_observers", &self.any_observers.len())
            .finish_non_exhaustive()
    }
}

impl Ledger {
    /// Create a ledger from units listed in cascade order, fastest first.
    ///
    /// Each unit starts at its configured `start`, clamped into `0..=max`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Configuration`] if the list is empty, a name
    /// is empty or repeated, or a unit has `max < 1`.
    pub fn new(config: &[UnitConfig]) -> Result<Self, LedgerError> {
        if config.is_empty() {
            return Err(LedgerError::Configuration {
                reason: "at least one unit must be configured".to_owned(),
            });
        }

        let mut units: Vec<Unit> = Vec::with_capacity(config.len());
        for unit in config {
            if unit.name.is_empty() || unit.name == ANY_CHANNEL {
                return Err(LedgerError::Configuration {
                    reason: format!("`{}` is not a valid unit name", unit.name),
                });
            }
            if units.iter().any(|u| u.name == unit.name) {
                return Err(LedgerError::Configuration {
                    reason: format!("unit `{}` is defined twice", unit.name),
                });
            }
            if unit.max < 1 {
                return Err(LedgerError::Configuration {
                    reason: format!("unit `{}` must have max >= 1", unit.name),
                });
            }
            units.push(Unit {
                name: unit.name.clone(),
                value: unit.start.min(unit.max),
                max: unit.max,
                observers: Vec::new(),
            });
        }

        Ok(Self {
            units,
            any_observers: Vec::new(),
        })
    }

    /// Step the fastest unit by `amount`, cascading, then notify observers.
    ///
    /// Positive amounts step up, negative amounts step down, one step of
    /// magnitude 1 at a time. Returns the units that were touched.
    pub fn advance(&mut self, amount: i64) -> ChangeSet {
        let changed = self.apply_steps(0, amount);
        self.dispatch(&changed)
    }

    /// Step the named unit by `amount`, cascading, then notify observers.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnknownUnit`] if no unit has that name.
    pub fn change_unit(&mut self, name: &str, amount: i64) -> Result<ChangeSet, LedgerError> {
        let index = self.index_of(name)?;
        let changed = self.apply_steps(index, amount);
        Ok(self.dispatch(&changed))
    }

    /// Overwrite the named unit, clamped into `0..=max`. No cascade, no
    /// notification.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnknownUnit`] if no unit has that name.
    pub fn set_unit(&mut self, name: &str, value: i64) -> Result<(), LedgerError> {
        let index = self.index_of(name)?;
        if let Some(unit) = self.units.get_mut(index) {
            unit.value = clamp_value(value, unit.max);
        }
        Ok(())
    }

    /// Register `observer` on a unit name or on [`ANY_CHANNEL`].
    ///
    /// Registering the same observer (same [`Arc`]) twice on the same
    /// channel is a no-op. Returns whether the observer was added.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnknownUnit`] if the channel is neither a
    /// configured unit nor [`ANY_CHANNEL`].
    pub fn register_on_change(
        &mut self,
        channel: &str,
        observer: Observer,
    ) -> Result<bool, LedgerError> {
        let list = if channel == ANY_CHANNEL {
            &mut self.any_observers
        } else {
            let index = self.index_of(channel)?;
            match self.units.get_mut(index) {
                Some(unit) => &mut unit.observers,
                None => {
                    return Err(LedgerError::UnknownUnit {
                        name: channel.to_owned(),
                    });
                }
            }
        };

        if list.iter().any(|existing| Arc::ptr_eq(existing, &observer)) {
            return Ok(false);
        }
        list.push(observer);
        Ok(true)
    }

    /// Current value of the named unit.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnknownUnit`] if no unit has that name.
    pub fn value(&self, name: &str) -> Result<u32, LedgerError> {
        self.units
            .iter()
            .find(|u| u.name == name)
            .map(|u| u.value)
            .ok_or_else(|| LedgerError::UnknownUnit {
                name: name.to_owned(),
            })
    }

    /// Maximum of the named unit.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnknownUnit`] if no unit has that name.
    pub fn max(&self, name: &str) -> Result<u32, LedgerError> {
        self.units
            .iter()
            .find(|u| u.name == name)
            .map(|u| u.max)
            .ok_or_else(|| LedgerError::UnknownUnit {
                name: name.to_owned(),
            })
    }

    /// Whether a unit with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.units.iter().any(|u| u.name == name)
    }

    /// Unit names in cascade order.
    pub fn unit_names(&self) -> impl Iterator<Item = &str> {
        self.units.iter().map(|u| u.name.as_str())
    }

    /// `(name, value)` pairs in cascade order.
    pub fn values(&self) -> impl Iterator<Item = (&str, u32)> {
        self.units.iter().map(|u| (u.name.as_str(), u.value))
    }

    /// All current values keyed by unit name.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot(
            self.units
                .iter()
                .map(|u| (u.name.clone(), i64::from(u.value)))
                .collect(),
        )
    }

    /// Overwrite unit values from a snapshot, clamped. No notification.
    ///
    /// Units missing from the snapshot keep their value; names the ledger
    /// does not know are ignored.
    pub fn restore(&mut self, snapshot: &Snapshot) {
        for unit in &mut self.units {
            if let Some(value) = snapshot.get(&unit.name) {
                unit.value = clamp_value(value, unit.max);
            }
        }
        for name in snapshot.0.keys().filter(|name| !self.contains(name)) {
            debug!(unit = %name, "Ignoring unknown unit in snapshot");
        }
    }

    fn index_of(&self, name: &str) -> Result<usize, LedgerError> {
        self.units
            .iter()
            .position(|u| u.name == name)
            .ok_or_else(|| LedgerError::UnknownUnit {
                name: name.to_owned(),
            })
    }

    /// Apply `|amount|` single steps to the unit at `index`.
    ///
    /// The result equals stepping one at a time, but each unit is settled
    /// in one mixed-radix operation so the work is bounded by the number
    /// of units, not by `amount`. A unit above `index` is touched exactly
    /// when at least one carry or borrow reaches it.
    ///
    /// Returns one flag per unit telling whether it was touched.
    fn apply_steps(&mut self, index: usize, amount: i64) -> Vec<bool> {
        let mut changed = vec![false; self.units.len()];
        let up = amount >= 0;
        let mut pending = u128::from(amount.unsigned_abs());

        for (unit, flag) in self.units.iter_mut().zip(changed.iter_mut()).skip(index) {
            if pending == 0 {
                break;
            }
            *flag = true;
            let (value, wraps) = if up {
                carry(unit.value, unit.max, pending)
            } else {
                borrow(unit.value, unit.max, pending)
            };
            unit.value = value;
            // Past the slowest unit the wraps are dropped: the wrap is silent.
            pending = wraps;
        }
        changed
    }

    /// Run observers for the touched units, then the any channel.
    fn dispatch(&self, changed: &[bool]) -> ChangeSet {
        let mut set = ChangeSet::default();
        for (unit, _) in self
            .units
            .iter()
            .zip(changed)
            .filter(|(_, touched)| **touched)
        {
            for observer in &unit.observers {
                observer(self);
            }
            set.units.push(unit.name.clone());
        }

        if !set.is_empty() {
            for observer in &self.any_observers {
                observer(self);
            }
            debug!(units = ?set.units, "Dispatched unit change observers");
        }
        set
    }
}

/// Step `value` up `steps` times within `0..=max`.
///
/// Returns the new value and how many times it wrapped past `max`.
fn carry(value: u32, max: u32, steps: u128) -> (u32, u128) {
    let radix = u128::from(max).saturating_add(1);
    let total = u128::from(value).saturating_add(steps);
    let next = total.checked_rem(radix).unwrap_or(0);
    let wraps = total.checked_div(radix).unwrap_or(0);
    (u32::try_from(next).unwrap_or(max), wraps)
}

/// Step `value` down `steps` times within `0..=max`.
///
/// Returns the new value and how many times it wrapped below zero.
fn borrow(value: u32, max: u32, steps: u128) -> (u32, u128) {
    let current = u128::from(value);
    if steps <= current {
        return (u32::try_from(current.saturating_sub(steps)).unwrap_or(0), 0);
    }
    // Steps left after reaching zero; the first of them wraps to `max`.
    let below = steps.saturating_sub(current).saturating_sub(1);
    let radix = u128::from(max).saturating_add(1);
    let next = u128::from(max).saturating_sub(below.checked_rem(radix).unwrap_or(0));
    let wraps = below.checked_div(radix).unwrap_or(0).saturating_add(1);
    (u32::try_from(next).unwrap_or(max), wraps)
}

fn clamp_value(value: i64, max: u32) -> u32 {
    u32::try_from(value.clamp(0, i64::from(max))).unwrap_or(max)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn clock_units() -> Vec<UnitConfig> {
        vec![UnitConfig::new("minute", 0, 59), UnitConfig::new("hour", 0, 23)]
    }

    fn make_ledger() -> Ledger {
        Ledger::new(&clock_units()).unwrap()
    }

    fn counter() -> (Arc<AtomicU32>, Observer) {
        let count = Arc::new(AtomicU32::new(0));
        let seen = Arc::clone(&count);
        let observer: Observer = Arc::new(move |_ledger: &Ledger| {
            seen.fetch_add(1, Ordering::Relaxed);
        });
        (count, observer)
    }

    #[test]
    fn units_start_at_configured_values() {
        let ledger = Ledger::new(&[
            UnitConfig::new("minute", 15, 59),
            UnitConfig::new("hour", 6, 23),
        ])
        .unwrap();
        assert_eq!(ledger.value("minute").unwrap(), 15);
        assert_eq!(ledger.value("hour").unwrap(), 6);
    }

    #[test]
    fn start_above_max_is_clamped() {
        let ledger = Ledger::new(&[UnitConfig::new("hour", 30, 23)]).unwrap();
        assert_eq!(ledger.value("hour").unwrap(), 23);
    }

    #[test]
    fn duplicate_unit_rejected() {
        let result = Ledger::new(&[
            UnitConfig::new("minute", 0, 59),
            UnitConfig::new("minute", 0, 59),
        ]);
        assert!(matches!(result, Err(LedgerError::Configuration { .. })));
    }

    #[test]
    fn zero_max_rejected() {
        let result = Ledger::new(&[UnitConfig::new("tick", 0, 0)]);
        assert!(matches!(result, Err(LedgerError::Configuration { .. })));
    }

    #[test]
    fn empty_config_rejected() {
        assert!(Ledger::new(&[]).is_err());
    }

    #[test]
    fn any_channel_name_is_reserved() {
        assert!(Ledger::new(&[UnitConfig::new(ANY_CHANNEL, 0, 5)]).is_err());
    }

    #[test]
    fn advance_increments_fastest_unit() {
        let mut ledger = make_ledger();
        let changed = ledger.advance(1);
        assert_eq!(ledger.value("minute").unwrap(), 1);
        assert_eq!(ledger.value("hour").unwrap(), 0);
        assert!(changed.contains("minute"));
        assert!(!changed.contains("hour"));
    }

    #[test]
    fn carry_moves_exactly_one() {
        let mut ledger = make_ledger();
        ledger.set_unit("minute", 59).unwrap();
        ledger.set_unit("hour", 4).unwrap();
        let changed = ledger.advance(1);
        assert_eq!(ledger.value("minute").unwrap(), 0);
        assert_eq!(ledger.value("hour").unwrap(), 5);
        assert_eq!(changed.len(), 2);
    }

    #[test]
    fn advance_sixty_minutes_rolls_hour() {
        let mut ledger = make_ledger();
        let (minutes, on_minute) = counter();
        let (hours, on_hour) = counter();
        ledger.register_on_change("minute", on_minute).unwrap();
        ledger.register_on_change("hour", on_hour).unwrap();

        let changed = ledger.advance(60);

        assert_eq!(ledger.value("minute").unwrap(), 0);
        assert_eq!(ledger.value("hour").unwrap(), 1);
        assert!(changed.contains("minute"));
        assert!(changed.contains("hour"));
        assert_eq!(minutes.load(Ordering::Relaxed), 1);
        assert_eq!(hours.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn stepwise_and_bulk_advance_agree() {
        let mut stepwise = make_ledger();
        let mut bulk = make_ledger();
        for _ in 0..1_500 {
            stepwise.advance(1);
        }
        bulk.advance(1_500);
        assert_eq!(stepwise.snapshot(), bulk.snapshot());
        assert_eq!(bulk.value("minute").unwrap(), 0);
        assert_eq!(bulk.value("hour").unwrap(), 1);
    }

    #[test]
    fn stepwise_and_bulk_rewind_agree() {
        for amount in [1_i64, 7, 59, 60, 61, 1_439, 1_440, 1_441, 5_000] {
            let mut stepwise = make_ledger();
            let mut bulk = make_ledger();
            stepwise.set_unit("minute", 5).unwrap();
            bulk.set_unit("minute", 5).unwrap();
            for _ in 0..amount {
                stepwise.advance(-1);
            }
            bulk.advance(-amount);
            assert_eq!(stepwise.snapshot(), bulk.snapshot(), "amount {amount}");
        }
    }

    #[test]
    fn extreme_amounts_settle_immediately() {
        // 60 * 24 = 1440 minutes per full cycle of the clock.
        for (amount, hour, minute) in [(i64::MAX, 18, 7), (i64::MIN, 5, 52)] {
            let mut ledger = make_ledger();
            let (minutes, on_minute) = counter();
            let (hours, on_hour) = counter();
            let (any, on_any) = counter();
            ledger.register_on_change("minute", on_minute).unwrap();
            ledger.register_on_change("hour", on_hour).unwrap();
            ledger.register_on_change(ANY_CHANNEL, on_any).unwrap();

            let changed = ledger.change_unit("minute", amount).unwrap();

            assert_eq!(ledger.value("hour").unwrap(), hour);
            assert_eq!(ledger.value("minute").unwrap(), minute);
            assert_eq!(changed.len(), 2);
            assert_eq!(minutes.load(Ordering::Relaxed), 1);
            assert_eq!(hours.load(Ordering::Relaxed), 1);
            assert_eq!(any.load(Ordering::Relaxed), 1);
        }
    }

    #[test]
    fn extreme_unit_change_leaves_faster_units_alone() {
        // 24 * 7 = 168 hours per full cycle of hour and day.
        for (amount, hour, day) in [(i64::MAX, 6, 1), (i64::MIN, 15, 0)] {
            let mut ledger = Ledger::new(&[
                UnitConfig::new("minute", 10, 59),
                UnitConfig::new("hour", 23, 23),
                UnitConfig::new("day", 0, 6),
            ])
            .unwrap();
            let changed = ledger.change_unit("hour", amount).unwrap();
            assert_eq!(ledger.value("minute").unwrap(), 10);
            assert_eq!(ledger.value("hour").unwrap(), hour);
            assert_eq!(ledger.value("day").unwrap(), day);
            assert!(!changed.contains("minute"));
            assert!(changed.contains("hour"));
            assert!(changed.contains("day"));
        }
    }

    #[test]
    fn top_unit_wraps_silently() {
        let mut ledger = make_ledger();
        ledger.set_unit("minute", 59).unwrap();
        ledger.set_unit("hour", 23).unwrap();
        ledger.advance(1);
        assert_eq!(ledger.value("minute").unwrap(), 0);
        assert_eq!(ledger.value("hour").unwrap(), 0);
    }

    #[test]
    fn negative_advance_borrows_from_next_unit() {
        let mut ledger = make_ledger();
        ledger.set_unit("hour", 5).unwrap();
        ledger.advance(-1);
        assert_eq!(ledger.value("minute").unwrap(), 59);
        assert_eq!(ledger.value("hour").unwrap(), 4);
    }

    #[test]
    fn change_hour_below_zero_wraps() {
        let mut ledger = make_ledger();
        let changed = ledger.change_unit("hour", -1).unwrap();
        assert_eq!(ledger.value("hour").unwrap(), 23);
        assert_eq!(ledger.value("minute").unwrap(), 0);
        assert!(changed.contains("hour"));
        assert!(!changed.contains("minute"));
    }

    #[test]
    fn change_unit_cascades_upward_only() {
        let mut ledger = Ledger::new(&[
            UnitConfig::new("minute", 10, 59),
            UnitConfig::new("hour", 23, 23),
            UnitConfig::new("day", 0, 6),
        ])
        .unwrap();
        ledger.change_unit("hour", 2).unwrap();
        assert_eq!(ledger.value("minute").unwrap(), 10);
        assert_eq!(ledger.value("hour").unwrap(), 1);
        assert_eq!(ledger.value("day").unwrap(), 1);
    }

    #[test]
    fn full_cycle_still_notifies() {
        let mut ledger = Ledger::new(&[UnitConfig::new("hour", 3, 23)]).unwrap();
        let (hours, on_hour) = counter();
        ledger.register_on_change("hour", on_hour).unwrap();

        let changed = ledger.advance(24);

        assert_eq!(ledger.value("hour").unwrap(), 3);
        assert!(changed.contains("hour"));
        assert_eq!(hours.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn zero_advance_notifies_nobody() {
        let mut ledger = make_ledger();
        let (any, on_any) = counter();
        ledger.register_on_change(ANY_CHANNEL, on_any).unwrap();
        let changed = ledger.advance(0);
        assert!(changed.is_empty());
        assert_eq!(any.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn duplicate_registration_fires_once() {
        let mut ledger = make_ledger();
        let (minutes, on_minute) = counter();
        assert!(ledger.register_on_change("minute", Arc::clone(&on_minute)).unwrap());
        assert!(!ledger.register_on_change("minute", on_minute).unwrap());

        ledger.advance(1);
        assert_eq!(minutes.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn same_observer_on_two_channels_fires_per_channel() {
        let mut ledger = make_ledger();
        let (count, observer) = counter();
        ledger.register_on_change("minute", Arc::clone(&observer)).unwrap();
        ledger.register_on_change("hour", observer).unwrap();
        ledger.advance(60);
        assert_eq!(count.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn any_channel_fires_once_per_call() {
        let mut ledger = make_ledger();
        let (any, on_any) = counter();
        ledger.register_on_change(ANY_CHANNEL, on_any).unwrap();
        ledger.advance(120);
        assert_eq!(any.load(Ordering::Relaxed), 1);
        ledger.advance(1);
        assert_eq!(any.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn observers_see_settled_values() {
        let mut ledger = make_ledger();
        let seen = Arc::new(AtomicU32::new(u32::MAX));
        let slot = Arc::clone(&seen);
        ledger
            .register_on_change(
                "minute",
                Arc::new(move |l: &Ledger| {
                    let minute = l.value("minute").unwrap_or(u32::MAX);
                    let hour = l.value("hour").unwrap_or(u32::MAX);
                    slot.store(hour * 100 + minute, Ordering::Relaxed);
                }),
            )
            .unwrap();
        ledger.advance(61);
        assert_eq!(seen.load(Ordering::Relaxed), 101);
    }

    #[test]
    fn observers_run_in_unit_then_registration_order() {
        let mut ledger = make_ledger();
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        for (channel, tag) in [
            (ANY_CHANNEL, "any"),
            ("hour", "hour"),
            ("minute", "m1"),
            ("minute", "m2"),
        ] {
            let log = Arc::clone(&order);
            ledger
                .register_on_change(
                    channel,
                    Arc::new(move |_: &Ledger| log.lock().unwrap().push(tag)),
                )
                .unwrap();
        }
        ledger.advance(60);
        assert_eq!(*order.lock().unwrap(), vec!["m1", "m2", "hour", "any"]);
    }

    #[test]
    fn register_on_unknown_unit_fails() {
        let mut ledger = make_ledger();
        let (_, observer) = counter();
        let result = ledger.register_on_change("day", observer);
        assert_eq!(
            result,
            Err(LedgerError::UnknownUnit {
                name: "day".to_owned()
            })
        );
    }

    #[test]
    fn set_unit_clamps_and_does_not_notify() {
        let mut ledger = make_ledger();
        let (any, on_any) = counter();
        ledger.register_on_change(ANY_CHANNEL, on_any).unwrap();

        ledger.set_unit("minute", 500).unwrap();
        assert_eq!(ledger.value("minute").unwrap(), 59);
        ledger.set_unit("minute", -4).unwrap();
        assert_eq!(ledger.value("minute").unwrap(), 0);
        assert_eq!(any.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn unknown_unit_operations_fail() {
        let mut ledger = make_ledger();
        assert!(ledger.set_unit("day", 1).is_err());
        assert!(ledger.change_unit("day", 1).is_err());
        assert!(ledger.value("day").is_err());
    }

    #[test]
    fn snapshot_restore_roundtrip_is_idempotent() {
        let mut ledger = make_ledger();
        ledger.advance(185);
        let snapshot = ledger.snapshot();

        let mut other = make_ledger();
        other.restore(&snapshot);
        let once = other.snapshot();
        other.restore(&snapshot);
        assert_eq!(other.snapshot(), once);
        assert_eq!(once, snapshot);
    }

    #[test]
    fn restore_clamps_and_ignores_unknown_units() {
        let mut ledger = make_ledger();
        ledger.set_unit("hour", 7).unwrap();
        let mut values = BTreeMap::new();
        values.insert("minute".to_owned(), 99);
        values.insert("weekday".to_owned(), 3);
        ledger.restore(&Snapshot(values));
        assert_eq!(ledger.value("minute").unwrap(), 59);
        assert_eq!(ledger.value("hour").unwrap(), 7);
    }

    #[test]
    fn snapshot_serializes_as_plain_map() {
        let ledger = make_ledger();
        let json = serde_json::to_value(ledger.snapshot()).unwrap();
        assert_eq!(json, serde_json::json!({ "minute": 0, "hour": 0 }));
    }
}
