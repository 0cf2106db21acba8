//! # Ledger Span Summary
//!
//! A library for partitioning dated ledger entries into calendar-aligned spans
//! and summarizing income, outgo and balance per span.
//!
//! ## Core Concepts
//!
//! - **Span**: A closed date interval `[start, stop]`
//! - **Granularity**: The calendar unit (year, month, week, day) used to cut a range into spans
//! - **Entry**: One dated record with income, outgo and a category path such as `["food", "dining"]`
//! - **Category Filter**: A category path prefix; an empty filter matches everything
//! - **Breakdown**: Net amount per top-level category within one span
//!
//! ## Example
//!
//! ```rust
//! use ledger_span_summary::*;
//! use chrono::NaiveDate;
//!
//! let ledger = Ledger::new(vec![
//!     Entry::new(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(), 1000, 0, ["food", "groceries"]),
//!     Entry::new(NaiveDate::from_ymd_opt(2024, 1, 20).unwrap(), 0, 200, ["food", "dining"]),
//!     Entry::new(NaiveDate::from_ymd_opt(2024, 2, 10).unwrap(), 500, 0, ["income", "salary"]),
//! ]);
//!
//! let query = ReportQuery {
//!     begin: NaiveDate::from_ymd_opt(2024, 1, 1),
//!     end: NaiveDate::from_ymd_opt(2024, 2, 29),
//!     granularity: Granularity::Month,
//!     ..Default::default()
//! };
//!
//! let report = process_report(&ledger, &query).unwrap();
//! assert_eq!(report.rows.len(), 2);
//! assert_eq!(report.rows[0].balance, 800);
//! ```

pub mod error;
pub mod ledger;
pub mod schema;
pub mod span;
pub mod utils;

pub use error::{LedgerError, Result};
pub use ledger::Ledger;
pub use schema::*;
pub use span::{generate, Granularity, Span, SpanGenerator};
pub use utils::parse_date;

use log::{debug, info};

pub struct ReportProcessor;

impl ReportProcessor {
    pub fn process(ledger: &Ledger, query: &ReportQuery) -> Result<SummaryReport> {
        let filter = query.category_filter();
        let (begin, end) = ledger.resolve_range(query.begin, query.end)?;
        let range = Span::new(begin, end)?;

        info!(
            "Summarizing {} entries from {} to {} by {} (category: {})",
            ledger.len(),
            begin,
            end,
            query.granularity,
            filter
        );

        let rows = ledger.summarize(Some(begin), Some(end), query.granularity, &filter)?;
        let total = ledger.summary_row(&range, &filter);

        debug!(
            "Produced {} rows, total income {} outgo {} balance {}",
            rows.len(),
            total.income,
            total.outgo,
            total.balance
        );

        let breakdowns = if query.breakdown {
            rows.iter()
                .map(|row| SpanBreakdown {
                    span: row.span,
                    amounts: ledger.breakdown(&row.span),
                })
                .collect()
        } else {
            Vec::new()
        };

        Ok(SummaryReport {
            begin,
            end,
            granularity: query.granularity,
            category: filter,
            rows,
            total,
            breakdowns,
        })
    }
}

pub fn process_report(ledger: &Ledger, query: &ReportQuery) -> Result<SummaryReport> {
    ReportProcessor::process(ledger, query)
}
