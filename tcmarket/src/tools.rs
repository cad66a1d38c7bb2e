//! The seven financial data tools and their registration.

use std::future::Future;
use std::sync::Arc;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tctooling::{FunctionTool, ToolError, ToolExecutionContext, ToolRegistry};

use crate::{FetchClient, FetchError, NewsArgs, SearchStocksArgs, StatementArgs, StockPricesArgs};

pub const GET_STOCK_PRICES: &str = "getStockPrices";
pub const GET_INCOME_STATEMENTS: &str = "getIncomeStatements";
pub const GET_BALANCE_SHEETS: &str = "getBalanceSheets";
pub const GET_CASH_FLOW_STATEMENTS: &str = "getCashFlowStatements";
pub const GET_FINANCIAL_METRICS: &str = "getFinancialMetrics";
pub const SEARCH_STOCKS_BY_FILTERS: &str = "searchStocksByFilters";
pub const GET_NEWS: &str = "getNews";

pub const FINANCIAL_TOOL_NAMES: [&str; 7] = [
    GET_STOCK_PRICES,
    GET_INCOME_STATEMENTS,
    GET_BALANCE_SHEETS,
    GET_CASH_FLOW_STATEMENTS,
    GET_FINANCIAL_METRICS,
    SEARCH_STOCKS_BY_FILTERS,
    GET_NEWS,
];

/// One statement-style endpoint: a ticker plus period/limit filters.
struct StatementEndpoint {
    name: &'static str,
    description: &'static str,
    path: &'static str,
    failure: &'static str,
}

static STATEMENT_ENDPOINTS: [StatementEndpoint; 4] = [
    StatementEndpoint {
        name: GET_INCOME_STATEMENTS,
        description: "Use this tool to get the income statements for a company, including revenue, gross profit, operating income, net income and earnings per share.",
        path: "/financials/income-statements/",
        failure: "Failed to fetch income statements",
    },
    StatementEndpoint {
        name: GET_BALANCE_SHEETS,
        description: "Use this tool to get the balance sheets for a company, including assets, liabilities, shareholder equity, cash and debt.",
        path: "/financials/balance-sheets/",
        failure: "Failed to fetch balance sheets",
    },
    StatementEndpoint {
        name: GET_CASH_FLOW_STATEMENTS,
        description: "Use this tool to get the cash flow statements for a company, including operating, investing and financing cash flows and free cash flow.",
        path: "/financials/cash-flow-statements/",
        failure: "Failed to fetch cash flow statements",
    },
    StatementEndpoint {
        name: GET_FINANCIAL_METRICS,
        description: "Use this tool to get derived financial metrics for a company, such as valuation ratios, margins, returns and growth rates.",
        path: "/financial-metrics/",
        failure: "Failed to fetch financial metrics",
    },
];

/// Builds every financial tool. Entries whose schema cannot be converted are errors.
pub fn financial_tools(client: Arc<FetchClient>) -> Vec<Result<FunctionTool, ToolError>> {
    let mut tools = vec![stock_prices_tool(Arc::clone(&client))];
    tools.extend(
        STATEMENT_ENDPOINTS
            .iter()
            .map(|endpoint| statement_tool(Arc::clone(&client), endpoint)),
    );
    tools.push(search_tool(Arc::clone(&client)));
    tools.push(news_tool(client));
    tools
}

/// Registers the financial tools, skipping any whose schema is unsupported.
/// Returns the number registered.
pub fn register_financial_tools(registry: &mut ToolRegistry, client: Arc<FetchClient>) -> usize {
    let mut registered = 0;
    for tool in financial_tools(client) {
        match tool {
            Ok(tool) => {
                registry.register(tool);
                registered += 1;
            }
            Err(error) => {
                tracing::warn!(
                    tool = error.tool_name.as_deref().unwrap_or("unknown"),
                    error = %error,
                    "skipping tool with unsupported parameter schema"
                );
            }
        }
    }
    registered
}

pub fn financial_registry(client: Arc<FetchClient>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    register_financial_tools(&mut registry, client);
    registry
}

fn fetch_tool<A, F, Fut>(
    client: Arc<FetchClient>,
    name: &'static str,
    description: &'static str,
    failure: &'static str,
    fetch: F,
) -> Result<FunctionTool, ToolError>
where
    A: DeserializeOwned + JsonSchema + Send + 'static,
    F: Fn(Arc<FetchClient>, A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, FetchError>> + Send + 'static,
{
    FunctionTool::typed::<A, _, _>(name, description, move |args, _ctx: ToolExecutionContext| {
        let pending = fetch(Arc::clone(&client), args);
        async move {
            pending
                .await
                .map_err(|error| error.into_tool_error(name, failure))
        }
    })
}

fn stock_prices_tool(client: Arc<FetchClient>) -> Result<FunctionTool, ToolError> {
    fetch_tool(
        client,
        GET_STOCK_PRICES,
        "Use this tool to get stock prices and market cap for a company. This tool will return a snapshot of the current price, market cap, and the historical prices over a given time period.",
        "Failed to fetch stock price data",
        |client, args: StockPricesArgs| async move {
            let snapshot = client
                .fetch_json("/prices/snapshot/", &[("ticker", args.ticker.as_str())])
                .await?;
            let historical = client.fetch_json("/prices/", &args.historical_query()).await?;
            Ok::<_, FetchError>(json!({
                "ticker": args.ticker,
                "snapshot": snapshot,
                "historical": historical,
            }))
        },
    )
}

fn statement_tool(
    client: Arc<FetchClient>,
    endpoint: &'static StatementEndpoint,
) -> Result<FunctionTool, ToolError> {
    fetch_tool(
        client,
        endpoint.name,
        endpoint.description,
        endpoint.failure,
        move |client, args: StatementArgs| async move {
            client.fetch_json(endpoint.path, &args.query()).await
        },
    )
}

fn search_tool(client: Arc<FetchClient>) -> Result<FunctionTool, ToolError> {
    fetch_tool(
        client,
        SEARCH_STOCKS_BY_FILTERS,
        "Use this tool to screen for stocks whose financial metrics satisfy a set of filters, for example revenue greater than a value.",
        "Failed to search stocks",
        |client, args: SearchStocksArgs| async move {
            client.post_json("/financials/search/", &args).await
        },
    )
}

fn news_tool(client: Arc<FetchClient>) -> Result<FunctionTool, ToolError> {
    fetch_tool(
        client,
        GET_NEWS,
        "Use this tool to get news and latest events for a company. This tool will return a list of news articles and events for a company. When using this tool, include dates in your output.",
        "Failed to fetch news data",
        |client, args: NewsArgs| async move { client.fetch_json("/news/", &args.query()).await },
    )
}
