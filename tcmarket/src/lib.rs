//! Financial market data for tickerchat: a timeout-bounded fetch client for the
//! financial data endpoint and the tools that expose it to the model.
//!
//! ```rust
//! use std::sync::Arc;
//! use tcmarket::{FINANCIAL_TOOL_NAMES, FetchClient, financial_registry};
//!
//! let registry = financial_registry(Arc::new(FetchClient::new("fd-key")));
//! assert_eq!(registry.len(), FINANCIAL_TOOL_NAMES.len());
//! assert!(registry.contains("getNews"));
//! ```

mod args;
mod error;
mod fetch;
mod tools;

pub mod prelude {
    pub use crate::{
        FetchClient, FetchError, FetchErrorKind, financial_registry, register_financial_tools,
    };
}

pub use args::{
    FilterOperator, NewsArgs, PriceInterval, ReportPeriod, SearchFilter, SearchStocksArgs,
    StatementArgs, StockPricesArgs,
};
pub use error::{FetchError, FetchErrorKind};
pub use fetch::{API_KEY_HEADER, DEFAULT_FETCH_TIMEOUT, FINANCIAL_DATASETS_BASE_URL, FetchClient};
pub use tools::{
    FINANCIAL_TOOL_NAMES, GET_BALANCE_SHEETS, GET_CASH_FLOW_STATEMENTS, GET_FINANCIAL_METRICS,
    GET_INCOME_STATEMENTS, GET_NEWS, GET_STOCK_PRICES, SEARCH_STOCKS_BY_FILTERS,
    financial_registry, financial_tools, register_financial_tools,
};
