//! Metrics-based observability hooks for tool execution and orchestration rounds.
//!
//! ```rust
//! use tcobserve::MetricsObservabilityHooks;
//! use tctooling::ToolRuntimeHooks;
//!
//! fn accepts_tool_hooks(_hooks: &dyn ToolRuntimeHooks) {}
//!
//! let hooks = MetricsObservabilityHooks;
//! accepts_tool_hooks(&hooks);
//! ```

use std::time::Duration;

use tccommon::SessionId;
use tcchat::{ChatLoopHooks, ToolCallingMode};
use tcprovider::{FinishReason, ProviderError, TokenUsage};
use tctooling::{
    ToolCallRequest, ToolError, ToolExecutionContext, ToolExecutionResult, ToolRuntimeHooks,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsObservabilityHooks;

impl ToolRuntimeHooks for MetricsObservabilityHooks {
    fn on_execution_start(&self, request: &ToolCallRequest, _context: &ToolExecutionContext) {
        metrics::counter!(
            "tickerchat_tool_execution_start_total",
            "tool_name" => request.tool_name.clone()
        )
        .increment(1);
    }

    fn on_execution_success(
        &self,
        request: &ToolCallRequest,
        _context: &ToolExecutionContext,
        _result: &ToolExecutionResult,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "tickerchat_tool_execution_success_total",
            "tool_name" => request.tool_name.clone()
        )
        .increment(1);
        metrics::histogram!(
            "tickerchat_tool_execution_duration_seconds",
            "tool_name" => request.tool_name.clone(),
            "status" => "success"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_execution_failure(
        &self,
        request: &ToolCallRequest,
        _context: &ToolExecutionContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "tickerchat_tool_execution_failure_total",
            "tool_name" => request.tool_name.clone(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "tickerchat_tool_execution_duration_seconds",
            "tool_name" => request.tool_name.clone(),
            "status" => "failure"
        )
        .record(elapsed.as_secs_f64());
    }
}

impl ChatLoopHooks for MetricsObservabilityHooks {
    fn on_round_start(&self, _session_id: &SessionId, mode: ToolCallingMode, _step: u32) {
        metrics::counter!("tickerchat_round_start_total", "mode" => mode.as_str()).increment(1);
    }

    fn on_round_success(
        &self,
        _session_id: &SessionId,
        mode: ToolCallingMode,
        _step: u32,
        finish_reason: FinishReason,
        usage: &TokenUsage,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "tickerchat_round_success_total",
            "mode" => mode.as_str(),
            "finish_reason" => finish_reason.as_str()
        )
        .increment(1);
        metrics::counter!("tickerchat_tokens_total", "kind" => "prompt")
            .increment(u64::from(usage.prompt_tokens));
        metrics::counter!("tickerchat_tokens_total", "kind" => "completion")
            .increment(u64::from(usage.completion_tokens));
        metrics::histogram!(
            "tickerchat_round_duration_seconds",
            "mode" => mode.as_str(),
            "status" => "success"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_round_failure(
        &self,
        _session_id: &SessionId,
        mode: ToolCallingMode,
        _step: u32,
        error: &ProviderError,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "tickerchat_round_failure_total",
            "mode" => mode.as_str(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "tickerchat_round_duration_seconds",
            "mode" => mode.as_str(),
            "status" => "failure"
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_duplicate_call(&self, _session_id: &SessionId, tool_name: &str) {
        metrics::counter!(
            "tickerchat_duplicate_tool_call_total",
            "tool_name" => tool_name.to_string()
        )
        .increment(1);
    }

    fn on_step_ceiling(&self, _session_id: &SessionId, _max_steps: u32) {
        metrics::counter!("tickerchat_step_ceiling_total").increment(1);
    }
}
