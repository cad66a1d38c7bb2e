//! Tracing-based observability hooks for tool execution and orchestration rounds.
//!
//! ```rust
//! use tcchat::ChatLoopHooks;
//! use tcobserve::TracingObservabilityHooks;
//!
//! fn accepts_chat_hooks(_hooks: &dyn ChatLoopHooks) {}
//!
//! let hooks = TracingObservabilityHooks;
//! accepts_chat_hooks(&hooks);
//! ```

use std::time::Duration;

use tccommon::SessionId;
use tcchat::{ChatLoopHooks, ToolCallingMode};
use tcprovider::{FinishReason, ProviderError, TokenUsage};
use tctooling::{
    ToolCallRequest, ToolError, ToolExecutionContext, ToolExecutionResult, ToolRuntimeHooks,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObservabilityHooks;

impl ToolRuntimeHooks for TracingObservabilityHooks {
    fn on_execution_start(&self, request: &ToolCallRequest, context: &ToolExecutionContext) {
        tracing::info!(
            phase = "tool",
            event = "execution_start",
            tool_name = %request.tool_name,
            tool_call_id = %request.id,
            session_id = %context.session_id,
            prompt_marker = request.raw_source_text.is_some()
        );
    }

    fn on_execution_success(
        &self,
        request: &ToolCallRequest,
        context: &ToolExecutionContext,
        _result: &ToolExecutionResult,
        elapsed: Duration,
    ) {
        tracing::info!(
            phase = "tool",
            event = "execution_success",
            tool_name = %request.tool_name,
            tool_call_id = %request.id,
            session_id = %context.session_id,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_execution_failure(
        &self,
        request: &ToolCallRequest,
        context: &ToolExecutionContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        tracing::warn!(
            phase = "tool",
            event = "execution_failure",
            tool_name = %request.tool_name,
            tool_call_id = %request.id,
            session_id = %context.session_id,
            elapsed_ms = elapsed.as_millis() as u64,
            error_kind = ?error.kind,
            retryable = error.retryable,
            error = %error
        );
    }
}

impl ChatLoopHooks for TracingObservabilityHooks {
    fn on_round_start(&self, session_id: &SessionId, mode: ToolCallingMode, step: u32) {
        tracing::info!(
            phase = "round",
            event = "round_start",
            session_id = %session_id,
            mode = mode.as_str(),
            step
        );
    }

    fn on_round_success(
        &self,
        session_id: &SessionId,
        mode: ToolCallingMode,
        step: u32,
        finish_reason: FinishReason,
        usage: &TokenUsage,
        elapsed: Duration,
    ) {
        tracing::info!(
            phase = "round",
            event = "round_success",
            session_id = %session_id,
            mode = mode.as_str(),
            step,
            finish_reason = finish_reason.as_str(),
            total_tokens = usage.total_tokens,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_round_failure(
        &self,
        session_id: &SessionId,
        mode: ToolCallingMode,
        step: u32,
        error: &ProviderError,
        elapsed: Duration,
    ) {
        tracing::error!(
            phase = "round",
            event = "round_failure",
            session_id = %session_id,
            mode = mode.as_str(),
            step,
            elapsed_ms = elapsed.as_millis() as u64,
            error_kind = ?error.kind,
            retryable = error.retryable,
            error = %error
        );
    }

    fn on_duplicate_call(&self, session_id: &SessionId, tool_name: &str) {
        tracing::info!(
            phase = "round",
            event = "duplicate_call",
            session_id = %session_id,
            tool_name
        );
    }

    fn on_step_ceiling(&self, session_id: &SessionId, max_steps: u32) {
        tracing::warn!(
            phase = "round",
            event = "step_ceiling",
            session_id = %session_id,
            max_steps
        );
    }
}
