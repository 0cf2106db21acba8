use crate::error::{LedgerError, Result};
use crate::schema::{Breakdown, CategoryFilter, Entry, Measure, SummaryRow};
use crate::span::{generate, Granularity, Span};
use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Immutable snapshot of ledger entries.
///
/// Cloning is cheap and shares the underlying entries, so one ledger can be
/// handed to any number of readers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    entries: Arc<[Entry]>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Ledger {
    pub fn new<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = Entry>,
    {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Loads a JSON array of entries.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    /// Entries dated within `span` whose category starts with `filter`.
    ///
    /// Every aggregate goes through this predicate.
    pub fn matching<'a>(
        &'a self,
        span: &'a Span,
        filter: &'a CategoryFilter,
    ) -> impl Iterator<Item = &'a Entry> + 'a {
        self.iter()
            .filter(move |entry| entry.is_in_span(span) && entry.matches_category(filter))
    }

    pub fn sum_income(&self, span: &Span, filter: &CategoryFilter) -> i64 {
        self.matching(span, filter)
            .map(|entry| i64::from(entry.income))
            .sum()
    }

    pub fn sum_outgo(&self, span: &Span, filter: &CategoryFilter) -> i64 {
        self.matching(span, filter)
            .map(|entry| i64::from(entry.outgo))
            .sum()
    }

    pub fn sum_balance(&self, span: &Span, filter: &CategoryFilter) -> i64 {
        self.matching(span, filter).map(Entry::balance).sum()
    }

    /// Income, outgo and balance for one span, gathered in a single pass.
    pub fn summary_row(&self, span: &Span, filter: &CategoryFilter) -> SummaryRow {
        let (income, outgo) = self
            .matching(span, filter)
            .fold((0i64, 0i64), |(income, outgo), entry| {
                (income + i64::from(entry.income), outgo + i64::from(entry.outgo))
            });

        SummaryRow {
            span: *span,
            income,
            outgo,
            balance: income - outgo,
        }
    }

    /// Earliest and latest entry dates.
    pub fn date_extent(&self) -> Result<(NaiveDate, NaiveDate)> {
        let first = self.iter().map(|entry| entry.date).min();
        let last = self.iter().map(|entry| entry.date).max();

        match (first, last) {
            (Some(first), Some(last)) => Ok((first, last)),
            _ => Err(LedgerError::EmptyLedger),
        }
    }

    /// Fills a missing `begin`/`end` from the entry date extremes.
    ///
    /// The ledger is only scanned when a bound is missing, so an empty ledger
    /// with an explicit range resolves without error.
    pub fn resolve_range(
        &self,
        begin: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<(NaiveDate, NaiveDate)> {
        match (begin, end) {
            (Some(begin), Some(end)) => Ok((begin, end)),
            (begin, end) => {
                let (first, last) = self.date_extent()?;
                let resolved = (begin.unwrap_or(first), end.unwrap_or(last));
                debug!(
                    "Resolved default range {} to {} from {} entries",
                    resolved.0,
                    resolved.1,
                    self.len()
                );
                Ok(resolved)
            }
        }
    }

    pub fn summarize(
        &self,
        begin: Option<NaiveDate>,
        end: Option<NaiveDate>,
        granularity: Granularity,
        filter: &CategoryFilter,
    ) -> Result<Vec<SummaryRow>> {
        let (begin, end) = self.resolve_range(begin, end)?;

        Ok(generate(begin, end, granularity)?
            .map(|span| self.summary_row(&span, filter))
            .collect())
    }

    /// One value of `measure` per generated span.
    pub fn series(
        &self,
        begin: Option<NaiveDate>,
        end: Option<NaiveDate>,
        granularity: Granularity,
        measure: Measure,
        filter: &CategoryFilter,
    ) -> Result<Vec<i64>> {
        let (begin, end) = self.resolve_range(begin, end)?;

        Ok(generate(begin, end, granularity)?
            .map(|span| measure.of(&self.summary_row(&span, filter)))
            .collect())
    }

    /// Net amount within `span` per top-level category.
    ///
    /// Entries with an empty category path are grouped under the empty label.
    pub fn breakdown(&self, span: &Span) -> Breakdown {
        let any = CategoryFilter::any();
        let mut breakdown = Breakdown::new();

        for entry in self.matching(span, &any) {
            let label = entry.top_level_category().unwrap_or_default();
            *breakdown.entry(label.to_string()).or_insert(0) += entry.balance();
        }

        breakdown
    }
}

impl<'a> IntoIterator for &'a Ledger {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Entry> for Ledger {
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        Self::new(iter)
    }
}
