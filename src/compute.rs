use crate::{
    data::{Entry, Roster, YearMonth},
    read::EntrySink,
};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Running per-month, per-driver sums. Entries are folded in one at a time, so the
/// same accumulator works on a loaded log or straight off a CSV reader.
#[derive(Debug, Default)]
pub(crate) struct MonthlyTotals {
    totals: BTreeMap<YearMonth, HashMap<String, i64>>,
    /// Every driver seen in a counted entry, in first-seen order.
    seen: Vec<String>,
    dropped: usize,
}

impl EntrySink for MonthlyTotals {
    fn push_entry(&mut self, entry: Entry) {
        let Some(date) = entry.date() else {
            debug!(date = %entry.date, driver = %entry.driver, "dropping entry with unparseable date");
            self.dropped += 1;
            return;
        };
        let Some(amount) = entry.amount() else {
            debug!(amount = %entry.amount, driver = %entry.driver, "dropping entry with unparseable amount");
            self.dropped += 1;
            return;
        };
        if !self.seen.contains(&entry.driver) {
            self.seen.push(entry.driver.clone());
        }
        let month = YearMonth::from(date);
        let sum = self
            .totals
            .entry(month)
            .or_default()
            .entry(entry.driver)
            .or_insert(0);
        let current = *sum;
        *sum = current.checked_add(amount).unwrap_or_else(|| {
            warn!(%month, "monthly total out of range, clamping");
            current.saturating_add(amount)
        });
    }
}

impl MonthlyTotals {
    /// Pivots the sums against `roster`. Returns `None` when no entry had a usable
    /// date and amount, which callers report as "no data".
    pub fn into_summary(self, roster: &Roster) -> Option<Summary> {
        if self.totals.is_empty() {
            return None;
        }
        if self.dropped > 0 {
            debug!(dropped = self.dropped, "entries left out of the summary");
        }
        let mut drivers = roster.as_slice().to_vec();
        for driver in self.seen {
            if !roster.contains(&driver) {
                drivers.push(driver);
            }
        }
        // BTreeMap keeps months chronological.
        let rows = self
            .totals
            .into_iter()
            .map(|(month, sums)| MonthRow {
                month,
                amounts: drivers
                    .iter()
                    .map(|driver| sums.get(driver).copied().unwrap_or(0))
                    .collect(),
            })
            .collect();
        Some(Summary { drivers, rows })
    }
}

/// Monthly pivot: one row per month that has at least one valid entry, one column
/// per driver. Roster drivers come first in roster order, then any driver found in
/// the log but missing from the roster, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Summary {
    pub drivers: Vec<String>,
    pub rows: Vec<MonthRow>,
}

/// `amounts[i]` is the sum for `Summary::drivers[i]`; absent means 0, never missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MonthRow {
    pub month: YearMonth,
    pub amounts: Vec<i64>,
}

pub(crate) fn summarize(entries: Vec<Entry>, roster: &Roster) -> Option<Summary> {
    let mut totals = MonthlyTotals::default();
    for entry in entries {
        totals.push_entry(entry);
    }
    totals.into_summary(roster)
}
