use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value, json};
use tcmarket::{FINANCIAL_TOOL_NAMES, FetchClient, financial_registry};
use tctooling::{
    DefaultToolRuntime, ToolCallRequest, ToolExecutionContext, ToolExecutionResult, ToolRuntime,
};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn runtime_for(server: &MockServer) -> DefaultToolRuntime {
    let client = FetchClient::new("fd-test-key")
        .with_base_url(server.uri())
        .with_timeout(Duration::from_millis(300));
    DefaultToolRuntime::new(Arc::new(financial_registry(Arc::new(client))))
}

fn request(tool_name: &str, arguments: Value) -> ToolCallRequest {
    let arguments = match arguments {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    ToolCallRequest::new(format!("call_{tool_name}"), tool_name, arguments)
}

async fn run(server: &MockServer, tool_name: &str, arguments: Value) -> ToolExecutionResult {
    runtime_for(server)
        .execute(
            request(tool_name, arguments),
            ToolExecutionContext::new("session-market"),
        )
        .await
}

#[tokio::test]
async fn news_upstream_failure_is_reported_as_tool_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/news/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let result = run(&server, "getNews", json!({"ticker": "AAPL"})).await;

    assert!(result.is_error());
    assert_eq!(result.error_description(), Some("Failed to fetch news data"));
    assert_eq!(result.tool_name, "getNews");
    assert_eq!(result.arguments, json!({"ticker": "AAPL"}));
}

#[tokio::test]
async fn news_applies_default_limit_and_auth_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/news/"))
        .and(header("X-API-KEY", "fd-test-key"))
        .and(query_param("ticker", "NVDA"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "news": [{"title": "NVDA beats estimates", "date": "2024-05-22"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = run(&server, "getNews", json!({"ticker": "NVDA"})).await;

    assert_eq!(
        result.payload(),
        Some(&json!({"news": [{"title": "NVDA beats estimates", "date": "2024-05-22"}]}))
    );
}

#[tokio::test]
async fn stock_prices_combine_snapshot_and_history() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/prices/snapshot/"))
        .and(query_param("ticker", "AAPL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"snapshot": {"price": 189.5}})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/prices/"))
        .and(query_param("ticker", "AAPL"))
        .and(query_param("start_date", "2024-01-01"))
        .and(query_param("end_date", "2024-02-01"))
        .and(query_param("interval", "week"))
        .and(query_param("interval_multiplier", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"prices": [{"close": 185.0}]})))
        .mount(&server)
        .await;

    let result = run(
        &server,
        "getStockPrices",
        json!({
            "ticker": "AAPL",
            "start_date": "2024-01-01",
            "end_date": "2024-02-01",
            "interval": "week"
        }),
    )
    .await;

    assert_eq!(
        result.payload(),
        Some(&json!({
            "ticker": "AAPL",
            "snapshot": {"snapshot": {"price": 189.5}},
            "historical": {"prices": [{"close": 185.0}]}
        }))
    );
}

#[tokio::test]
async fn statements_send_period_and_coerced_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/financials/income-statements/"))
        .and(query_param("ticker", "MSFT"))
        .and(query_param("period", "ttm"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"income_statements": []})))
        .expect(1)
        .mount(&server)
        .await;

    let result = run(
        &server,
        "getIncomeStatements",
        json!({"ticker": "MSFT", "limit": "2"}),
    )
    .await;

    assert_eq!(result.payload(), Some(&json!({"income_statements": []})));
}

#[tokio::test]
async fn screener_posts_filters_as_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/financials/search/"))
        .and(header("X-API-KEY", "fd-test-key"))
        .and(body_json(json!({
            "filters": [{"field": "revenue", "operator": "gt", "value": 1.0e9}],
            "limit": 10
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"search_results": [{"ticker": "AAPL"}]})))
        .expect(1)
        .mount(&server)
        .await;

    let result = run(
        &server,
        "searchStocksByFilters",
        json!({"filters": [{"field": "revenue", "operator": "gt", "value": 1.0e9}]}),
    )
    .await;

    assert!(!result.is_error());
}

#[tokio::test]
async fn slow_endpoint_times_out_into_tool_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/financial-metrics/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let result = run(&server, "getFinancialMetrics", json!({"ticker": "AAPL"})).await;

    assert_eq!(
        result.error_description(),
        Some("Failed to fetch financial metrics")
    );
}

#[tokio::test]
async fn invalid_arguments_never_reach_the_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let result = run(&server, "getBalanceSheets", json!({"period": "weekly"})).await;

    let description = result.error_description().expect("should be an error");
    assert!(description.starts_with("Invalid arguments for getBalanceSheets"));
}

#[test]
fn all_seven_tools_register_with_plain_schemas() {
    let registry = financial_registry(Arc::new(FetchClient::new("fd-key")));
    let mut expected = FINANCIAL_TOOL_NAMES.map(str::to_string).to_vec();
    expected.sort();

    assert_eq!(registry.names(), expected);
    for definition in registry.list() {
        let rendered = serde_json::to_string(&definition.parameters).expect("serialize");
        assert!(!rendered.contains("$schema"), "{} kept $schema", definition.name);
        assert!(!rendered.contains("$ref"), "{} kept $ref", definition.name);
        assert_eq!(definition.parameters["type"], "object");
    }
}
