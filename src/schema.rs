use crate::error::{LedgerError, Result};
use crate::span::{Granularity, Span};
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// One dated ledger line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Entry {
    #[schemars(description = "Transaction date in YYYY-MM-DD format")]
    pub date: NaiveDate,

    #[schemars(description = "Amount received, as a non-negative integer in the smallest currency unit")]
    pub income: u32,

    #[schemars(description = "Amount spent, as a non-negative integer in the smallest currency unit")]
    pub outgo: u32,

    #[schemars(
        description = "Hierarchical category path, most general first (e.g. [\"food\", \"groceries\"]). Labels are opaque."
    )]
    pub category: Vec<String>,
}

impl Entry {
    pub fn new<I, S>(date: NaiveDate, income: u32, outgo: u32, category: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            date,
            income,
            outgo,
            category: category.into_iter().map(Into::into).collect(),
        }
    }

    pub fn balance(&self) -> i64 {
        i64::from(self.income) - i64::from(self.outgo)
    }

    pub fn top_level_category(&self) -> Option<&str> {
        self.category.first().map(String::as_str)
    }

    pub fn is_in_span(&self, span: &Span) -> bool {
        span.contains(self.date)
    }

    pub fn matches_category(&self, filter: &CategoryFilter) -> bool {
        filter.matches(&self.category)
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Entry(date={}, income={}, outgo={}, category={})",
            self.date,
            self.income,
            self.outgo,
            self.category.join("/")
        )
    }
}

/// Category path prefix. An empty filter matches every entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct CategoryFilter(Vec<String>);

impl CategoryFilter {
    pub fn any() -> Self {
        Self(Vec::new())
    }

    pub fn new<I, S>(path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(path.into_iter().map(Into::into).collect())
    }

    pub fn is_any(&self) -> bool {
        self.0.is_empty()
    }

    /// True when the filter is an element-wise prefix of `category`.
    pub fn matches(&self, category: &[String]) -> bool {
        category.starts_with(&self.0)
    }
}

impl<S: Into<String>> FromIterator<S> for CategoryFilter {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_any() {
            f.write_str("*")
        } else {
            f.write_str(&self.0.join("/"))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Measure {
    Income,
    Outgo,
    Balance,
}

impl Measure {
    pub fn of(&self, row: &SummaryRow) -> i64 {
        match self {
            Measure::Income => row.income,
            Measure::Outgo => row.outgo,
            Measure::Balance => row.balance,
        }
    }
}

impl FromStr for Measure {
    type Err = LedgerError;

    fn from_str(token: &str) -> Result<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(Measure::Income),
            "outgo" => Ok(Measure::Outgo),
            "balance" => Ok(Measure::Balance),
            _ => Err(LedgerError::UnknownMeasure(token.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct SummaryRow {
    pub span: Span,
    pub income: i64,
    pub outgo: i64,
    /// Always `income - outgo`.
    pub balance: i64,
}

/// Net amount per top-level category, iterated in label order.
pub type Breakdown = BTreeMap<String, i64>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct SpanBreakdown {
    pub span: Span,
    pub amounts: Breakdown,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReportQuery {
    #[serde(default)]
    #[schemars(
        description = "First date of the report in YYYY-MM-DD format. Defaults to the earliest entry date."
    )]
    pub begin: Option<NaiveDate>,

    #[serde(default)]
    #[schemars(
        description = "Last date of the report in YYYY-MM-DD format. Defaults to the latest entry date."
    )]
    pub end: Option<NaiveDate>,

    #[serde(default)]
    #[schemars(description = "Calendar unit used to partition the range. Defaults to month.")]
    pub granularity: Granularity,

    #[serde(default)]
    #[schemars(
        description = "Category path prefix to restrict the summary to (e.g. [\"food\"]). Omit or leave empty for all entries."
    )]
    pub category: Option<CategoryFilter>,

    #[serde(default)]
    #[schemars(description = "If true, include a per-span breakdown by top-level category.")]
    pub breakdown: bool,
}

impl ReportQuery {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ReportQuery)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }

    /// Parses a query, reporting an unrecognized granularity token as
    /// `UnknownGranularity` rather than a generic serialization error.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;

        if let Some(token) = value.get("granularity").and_then(serde_json::Value::as_str) {
            token.parse::<Granularity>()?;
        }

        Ok(serde_json::from_value(value)?)
    }

    pub fn category_filter(&self) -> CategoryFilter {
        self.category.clone().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct SummaryReport {
    pub begin: NaiveDate,
    pub end: NaiveDate,
    pub granularity: Granularity,
    pub category: CategoryFilter,
    pub rows: Vec<SummaryRow>,
    /// Totals over exactly `[begin, end]`, using the same filter as the rows.
    pub total: SummaryRow,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub breakdowns: Vec<SpanBreakdown>,
}

impl SummaryReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn path(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_category_prefix_match() {
        let category = path(&["food", "groceries"]);

        assert!(CategoryFilter::any().matches(&category));
        assert!(CategoryFilter::new(["food"]).matches(&category));
        assert!(CategoryFilter::new(["food", "groceries"]).matches(&category));

        assert!(!CategoryFilter::new(["groceries"]).matches(&category));
        assert!(!CategoryFilter::new(["food", "dining"]).matches(&category));
        // Longer than the entry's path never matches
        assert!(!CategoryFilter::new(["food", "groceries", "organic"]).matches(&category));
    }

    #[test]
    fn test_others_label_is_not_special() {
        let entry = Entry::new(ymd(2024, 1, 1), 0, 10, ["others", "others"]);
        assert!(entry.matches_category(&CategoryFilter::new(["others"])));
        assert!(!entry.matches_category(&CategoryFilter::new(["food"])));
    }

    #[test]
    fn test_entry_helpers() {
        let entry = Entry::new(ymd(2024, 1, 20), 0, 200, ["food", "dining"]);
        assert_eq!(entry.balance(), -200);
        assert_eq!(entry.top_level_category(), Some("food"));
        assert!(entry.is_in_span(&Span::new(ymd(2024, 1, 1), ymd(2024, 1, 31)).unwrap()));
        assert!(!entry.is_in_span(&Span::day(ymd(2024, 1, 21))));
        assert_eq!(
            entry.to_string(),
            "Entry(date=2024-01-20, income=0, outgo=200, category=food/dining)"
        );
    }

    #[test]
    fn test_entry_deserialization() {
        let json = r#"{"date":"2024-02-10","income":500,"outgo":0,"category":["income","salary"]}"#;
        let entry: Entry = serde_json::from_str(json).unwrap();
        assert_eq!(entry, Entry::new(ymd(2024, 2, 10), 500, 0, ["income", "salary"]));

        let negative = r#"{"date":"2024-02-10","income":-5,"outgo":0,"category":[]}"#;
        assert!(serde_json::from_str::<Entry>(negative).is_err());

        let too_large = r#"{"date":"2024-02-10","income":4294967296,"outgo":0,"category":[]}"#;
        assert!(serde_json::from_str::<Entry>(too_large).is_err());
    }

    #[test]
    fn test_balance_at_amount_limits() {
        let date = ymd(2024, 1, 1);
        assert_eq!(
            Entry::new(date, u32::MAX, 0, ["income"]).balance(),
            4_294_967_295
        );
        assert_eq!(
            Entry::new(date, 0, u32::MAX, ["housing"]).balance(),
            -4_294_967_295
        );
    }

    #[test]
    fn test_measure_parsing() {
        assert_eq!("income".parse::<Measure>().unwrap(), Measure::Income);
        assert_eq!("Outgo".parse::<Measure>().unwrap(), Measure::Outgo);
        assert_eq!("balance".parse::<Measure>().unwrap(), Measure::Balance);
        assert!(matches!(
            "profit".parse::<Measure>(),
            Err(LedgerError::UnknownMeasure(_))
        ));
    }

    #[test]
    fn test_query_defaults() {
        let query = ReportQuery::from_json("{}").unwrap();
        assert_eq!(query, ReportQuery::default());
        assert_eq!(query.granularity, Granularity::Month);
        assert!(query.category_filter().is_any());

        let query = ReportQuery::from_json(
            r#"{"begin":"2024-01-01","granularity":"week","category":["food"],"breakdown":true}"#,
        )
        .unwrap();
        assert_eq!(query.begin, Some(ymd(2024, 1, 1)));
        assert_eq!(query.end, None);
        assert_eq!(query.granularity, Granularity::Week);
        assert_eq!(query.category_filter(), CategoryFilter::new(["food"]));
        assert!(query.breakdown);

        let query = ReportQuery::from_json(r#"{"granularity":" Day "}"#).unwrap();
        assert_eq!(query.granularity, Granularity::Day);
    }

    #[test]
    fn test_query_with_unknown_granularity() {
        match ReportQuery::from_json(r#"{"granularity":"quarter"}"#) {
            Err(LedgerError::UnknownGranularity(token)) => assert_eq!(token, "quarter"),
            other => panic!("expected UnknownGranularity, got {:?}", other),
        }

        // A non-string granularity is a malformed document, not an unknown token
        assert!(matches!(
            ReportQuery::from_json(r#"{"granularity":7}"#),
            Err(LedgerError::SerializationError(_))
        ));
    }

    #[test]
    fn test_schema_generation() {
        let schema_json = ReportQuery::schema_as_json().unwrap();
        assert!(schema_json.contains("begin"));
        assert!(schema_json.contains("granularity"));
        assert!(schema_json.contains("category"));
    }
}
