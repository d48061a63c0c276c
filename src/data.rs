use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Amounts offered when recording an entry. The store itself accepts any integer.
pub const ALLOWED_AMOUNTS: [i64; 3] = [100, 300, 500];

/// Canonical date format used when the app writes a new entry.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const DEFAULT_ROSTER: [&str; 17] = [
    "平野", "ケイン", "山﨑", "萩原", "仙波し", "仙波ち", "久保田", "落合", "浜島", "野波", "末田",
    "芳本", "鈴木", "山田", "佐久間", "今井", "西川",
];

/// One row of the entry log. Date and amount are the text exactly as stored, so
/// rows that can't be parsed (a bad date, `100.0` or an empty amount from older
/// logs) still survive a load/save cycle and show up in exports; only the monthly
/// summary needs real values, through `date()`/`amount()`.
///
/// Serialization goes through `StoredEntry`, which carries the derived `year-month`
/// column. Nothing keeps that column in sync: it's recomputed every time the log
/// is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "StoredEntry")]
pub(crate) struct Entry {
    pub date: String,
    pub driver: String,
    pub amount: String,
}

impl Entry {
    pub fn new(date: NaiveDate, driver: impl Into<String>, amount: i64) -> Self {
        Self {
            date: date.format(DATE_FORMAT).to_string(),
            driver: driver.into(),
            amount: amount.to_string(),
        }
    }

    /// Builds one entry per selected driver, all sharing `date` and `amount`, in
    /// selection order. This is the only place drivers and amounts get checked.
    pub fn batch(
        date: NaiveDate,
        amount: i64,
        drivers: &[String],
        roster: &Roster,
    ) -> Result<Vec<Entry>, Error> {
        if drivers.is_empty() {
            return Err(Error::NoDrivers);
        }
        if !ALLOWED_AMOUNTS.contains(&amount) {
            return Err(Error::DisallowedAmount(amount));
        }
        drivers
            .iter()
            .map(|driver| {
                if roster.contains(driver) {
                    Ok(Entry::new(date, driver.as_str(), amount))
                } else {
                    Err(Error::UnknownDriver(driver.clone()))
                }
            })
            .collect()
    }

    pub fn date(&self) -> Option<NaiveDate> {
        parse_entry_date(&self.date)
    }

    /// Whole-number amount. A float with no fractional part (`100.0`) counts.
    pub fn amount(&self) -> Option<i64> {
        let raw = self.amount.trim();
        raw.parse::<i64>().ok().or_else(|| {
            raw.parse::<f64>()
                .ok()
                .filter(|a| a.fract() == 0.0 && a.abs() < MAX_EXACT_FLOAT)
                .map(|a| a as i64)
        })
    }

    pub fn year_month(&self) -> Option<YearMonth> {
        self.date().map(YearMonth::from)
    }
}

/// Largest magnitude below which every whole `f64` is an exact integer (2^53).
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

/// On-disk shape of an `Entry`. An unparseable date gets an empty `year-month`.
#[derive(Serialize)]
pub(crate) struct StoredEntry {
    pub date: String,
    pub driver: String,
    pub amount: String,
    #[serde(rename = "year-month")]
    pub year_month: String,
}

impl From<Entry> for StoredEntry {
    fn from(entry: Entry) -> Self {
        Self {
            year_month: entry
                .year_month()
                .map(|ym| ym.to_string())
                .unwrap_or_default(),
            date: entry.date,
            driver: entry.driver,
            amount: entry.amount,
        }
    }
}

/// Monthly grouping key. Field order makes the derived `Ord` chronological, which
/// matches the lexical order of the zero-padded `YYYY-MM` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl From<NaiveDate> for YearMonth {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Accepts the date shapes found in older logs: plain dates with `-` or `/`,
/// date-times with a space or `T`, and RFC 3339 stamps.
pub(crate) fn parse_entry_date(raw: &str) -> Option<NaiveDate> {
    const DATE_FORMATS: [&str; 2] = [DATE_FORMAT, "%Y/%m/%d"];
    const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// Ordered set of known drivers. Duplicates are dropped, first occurrence wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Roster {
    drivers: Vec<String>,
}

impl Roster {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut drivers: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if !drivers.contains(&name) {
                drivers.push(name);
            }
        }
        Self { drivers }
    }

    pub fn contains(&self, driver: &str) -> bool {
        self.drivers.iter().any(|d| d == driver)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.drivers
    }
}

impl Default for Roster {
    fn default() -> Self {
        Self::new(DEFAULT_ROSTER)
    }
}

/// Errors raised while recording new entries. Loading, saving and summarizing
/// never produce these: bad stored data is healed or skipped instead.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("Driver {0:?} is not on the roster")]
    UnknownDriver(String),
    #[error("Amount {0} is not one of 100, 300 or 500")]
    DisallowedAmount(i64),
    #[error("Amount {0:?} is not a whole number")]
    InvalidAmount(String),
    #[error("Can't parse date {0:?} (expected YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("At least one driver must be selected")]
    NoDrivers,
}
