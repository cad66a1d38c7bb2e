//! Typed parameters for the financial tools. Doc comments become schema descriptions.

use chrono::{Months, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PriceInterval {
    Second,
    Minute,
    Day,
    Week,
    Month,
    Year,
}

impl PriceInterval {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Second => "second",
            Self::Minute => "minute",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    Annual,
    Quarterly,
    Ttm,
}

impl ReportPeriod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Annual => "annual",
            Self::Quarterly => "quarterly",
            Self::Ttm => "ttm",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

fn default_interval() -> PriceInterval {
    PriceInterval::Day
}

fn default_interval_multiplier() -> u32 {
    1
}

fn default_period() -> ReportPeriod {
    ReportPeriod::Ttm
}

fn default_limit() -> u32 {
    5
}

fn default_search_limit() -> u32 {
    10
}

fn sample_filters() -> serde_json::Value {
    serde_json::json!([{"field": "revenue", "operator": "gt", "value": 50_000_000_000u64}])
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, JsonSchema)]
pub struct StockPricesArgs {
    /// The ticker of the company to get historical prices for
    pub ticker: String,
    /// The start date for historical prices (YYYY-MM-DD), defaults to one month ago
    #[serde(default)]
    pub start_date: Option<String>,
    /// The end date for historical prices (YYYY-MM-DD), defaults to today
    #[serde(default)]
    pub end_date: Option<String>,
    /// The interval between price points
    #[serde(default = "default_interval")]
    pub interval: PriceInterval,
    /// The multiplier for the interval
    #[serde(default = "default_interval_multiplier")]
    pub interval_multiplier: u32,
}

impl StockPricesArgs {
    /// Start and end dates with the one-month window applied to missing bounds.
    pub fn date_range(&self, today: NaiveDate) -> (String, String) {
        let start = self.start_date.clone().unwrap_or_else(|| {
            today
                .checked_sub_months(Months::new(1))
                .unwrap_or(today)
                .format(DATE_FORMAT)
                .to_string()
        });
        let end = self
            .end_date
            .clone()
            .unwrap_or_else(|| today.format(DATE_FORMAT).to_string());
        (start, end)
    }

    pub fn historical_query(&self) -> Vec<(&'static str, String)> {
        let (start, end) = self.date_range(Utc::now().date_naive());
        vec![
            ("ticker", self.ticker.clone()),
            ("start_date", start),
            ("end_date", end),
            ("interval", self.interval.as_str().to_string()),
            ("interval_multiplier", self.interval_multiplier.to_string()),
        ]
    }
}

/// Shared by income statements, balance sheets, cash-flow statements and metrics.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, JsonSchema)]
pub struct StatementArgs {
    /// The ticker of the company
    pub ticker: String,
    /// The reporting period: annual, quarterly, or ttm (trailing twelve months)
    #[serde(default = "default_period")]
    pub period: ReportPeriod,
    /// The number of periods to return
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Only include periods ending on or after this date (YYYY-MM-DD)
    #[serde(default)]
    pub report_period_gte: Option<String>,
    /// Only include periods ending on or before this date (YYYY-MM-DD)
    #[serde(default)]
    pub report_period_lte: Option<String>,
}

impl StatementArgs {
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("ticker", self.ticker.clone()),
            ("period", self.period.as_str().to_string()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(gte) = &self.report_period_gte {
            query.push(("report_period_gte", gte.clone()));
        }
        if let Some(lte) = &self.report_period_lte {
            query.push(("report_period_lte", lte.clone()));
        }
        query
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct SearchFilter {
    /// The financial metric to filter on, e.g. revenue or net_income
    pub field: String,
    /// The comparison operator
    pub operator: FilterOperator,
    /// The value to compare against
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct SearchStocksArgs {
    /// The filters every returned company must satisfy
    #[schemars(example = "sample_filters")]
    pub filters: Vec<SearchFilter>,
    /// The maximum number of companies to return
    #[serde(default = "default_search_limit")]
    pub limit: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, JsonSchema)]
pub struct NewsArgs {
    /// The ticker of the company to get news for
    pub ticker: String,
    /// The number of news articles to return
    #[serde(default = "default_limit")]
    pub limit: u32,
}

impl NewsArgs {
    pub fn query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("ticker", self.ticker.clone()),
            ("limit", self.limit.to_string()),
        ]
    }
}
