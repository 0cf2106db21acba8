use crate::error::{LedgerError, Result};
use crate::utils::{
    end_of_week, first_day_of_month, first_day_of_year, last_day_of_month, last_day_of_year,
    out_of_range, start_of_week,
};
use chrono::{Datelike, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::FusedIterator;
use std::str::FromStr;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Granularity {
    #[schemars(description = "Calendar years, January 1 through December 31")]
    Year,

    #[default]
    #[schemars(description = "Calendar months, the 1st through the last day of the month")]
    Month,

    #[schemars(description = "Weeks of exactly seven days, Monday through Sunday")]
    Week,

    #[schemars(description = "Single days")]
    Day,
}

impl Granularity {
    pub const ALL: [Granularity; 4] = [
        Granularity::Year,
        Granularity::Month,
        Granularity::Week,
        Granularity::Day,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Year => "year",
            Granularity::Month => "month",
            Granularity::Week => "week",
            Granularity::Day => "day",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Granularity {
    type Error = LedgerError;

    fn try_from(token: String) -> Result<Self> {
        token.parse()
    }
}

impl FromStr for Granularity {
    type Err = LedgerError;

    fn from_str(token: &str) -> Result<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "year" => Ok(Granularity::Year),
            "month" => Ok(Granularity::Month),
            "week" => Ok(Granularity::Week),
            "day" => Ok(Granularity::Day),
            _ => Err(LedgerError::UnknownGranularity(token.to_string())),
        }
    }
}

/// A closed date interval `[start, stop]`, inclusive of both endpoints.
///
/// Ordering is by `(start, stop)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, JsonSchema)]
pub struct Span {
    start: NaiveDate,
    stop: NaiveDate,
}

impl Span {
    pub fn new(start: NaiveDate, stop: NaiveDate) -> Result<Self> {
        if start > stop {
            return Err(LedgerError::InvalidRange {
                begin: start,
                end: stop,
            });
        }
        Ok(Self { start, stop })
    }

    pub fn day(date: NaiveDate) -> Self {
        Self {
            start: date,
            stop: date,
        }
    }

    /// The calendar-aligned span of `granularity` that contains `date`.
    pub fn aligned(date: NaiveDate, granularity: Granularity) -> Result<Self> {
        let (start, stop) = match granularity {
            Granularity::Day => (Some(date), Some(date)),
            Granularity::Week => (start_of_week(date), end_of_week(date)),
            Granularity::Month => (
                first_day_of_month(date),
                last_day_of_month(date.year(), date.month()),
            ),
            Granularity::Year => (
                first_day_of_year(date.year()),
                last_day_of_year(date.year()),
            ),
        };

        match (start, stop) {
            (Some(start), Some(stop)) => Ok(Self { start, stop }),
            _ => Err(out_of_range(
                &format!("The enclosing {} span", granularity),
                date,
            )),
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn stop(&self) -> NaiveDate {
        self.stop
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.stop
    }

    pub fn num_days(&self) -> i64 {
        (self.stop - self.start).num_days() + 1
    }

    /// The aligned span of `granularity` beginning the day after this span stops.
    pub fn next(&self, granularity: Granularity) -> Result<Self> {
        let following = self
            .stop
            .succ_opt()
            .ok_or_else(|| out_of_range("The following day", self.stop))?;
        Self::aligned(following, granularity)
    }

    /// The aligned span of `granularity` ending the day before this span starts.
    pub fn previous(&self, granularity: Granularity) -> Result<Self> {
        let preceding = self
            .start
            .pred_opt()
            .ok_or_else(|| out_of_range("The preceding day", self.start))?;
        Self::aligned(preceding, granularity)
    }

    /// Compact label used when spans of one granularity are listed side by side.
    pub fn label(&self, granularity: Granularity) -> String {
        match granularity {
            Granularity::Year => self.start.format("%Y").to_string(),
            Granularity::Month => self.start.format("%Y/%m").to_string(),
            Granularity::Week => format!(
                "{}-{}",
                self.start.format("%m/%d"),
                self.stop.format("%m/%d")
            ),
            Granularity::Day => self.start.format("%m/%d").to_string(),
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.stop {
            write!(f, "{}", self.start.format("%Y/%m/%d"))
        } else {
            write!(
                f,
                "{}-{}",
                self.start.format("%Y/%m/%d"),
                self.stop.format("%Y/%m/%d")
            )
        }
    }
}

/// Lazily yields contiguous, calendar-aligned spans covering `[begin, end]`.
///
/// The first span is the one of the chosen granularity containing `begin`; each
/// following span starts the day after the previous one stops. Generation ends
/// with the first span whose stop is on or after `end`, so the last span may
/// extend past `end`.
///
/// Construction fails with `DateError` when the span containing `end` runs past
/// the representable calendar, so a generator that was built always covers `end`.
#[derive(Debug, Clone)]
pub struct SpanGenerator {
    granularity: Granularity,
    end: NaiveDate,
    pending: Option<Span>,
}

impl SpanGenerator {
    pub fn new(begin: NaiveDate, end: NaiveDate, granularity: Granularity) -> Result<Self> {
        if begin > end {
            return Err(LedgerError::InvalidRange { begin, end });
        }

        let first = Span::aligned(begin, granularity)?;
        Span::aligned(end, granularity)?;

        Ok(Self {
            granularity,
            end,
            pending: Some(first),
        })
    }
}

impl Iterator for SpanGenerator {
    type Item = Span;

    fn next(&mut self) -> Option<Span> {
        let current = self.pending.take()?;

        if current.stop < self.end {
            // Stop strictly increases, so this always reaches `end`. Every span up to
            // the one containing `end` is representable, which `new` checked.
            self.pending = current.next(self.granularity).ok();
        }

        Some(current)
    }
}

impl FusedIterator for SpanGenerator {}

pub fn generate(begin: NaiveDate, end: NaiveDate, granularity: Granularity) -> Result<SpanGenerator> {
    SpanGenerator::new(begin, end, granularity)
}
