use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use tccommon::SessionId;
use tcchat::{ChatLoopHooks, ToolCallingMode};
use tcprovider::{FinishReason, ProviderError, TokenUsage};
use tctooling::{
    ToolCallRequest, ToolError, ToolExecutionContext, ToolExecutionResult, ToolRuntimeHooks,
};

pub struct SafeToolHooks<H> {
    inner: H,
}

impl<H> SafeToolHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> ToolRuntimeHooks for SafeToolHooks<H>
where
    H: ToolRuntimeHooks,
{
    fn on_execution_start(&self, request: &ToolCallRequest, context: &ToolExecutionContext) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_execution_start(request, context)
        }));
    }

    fn on_execution_success(
        &self,
        request: &ToolCallRequest,
        context: &ToolExecutionContext,
        result: &ToolExecutionResult,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_execution_success(request, context, result, elapsed)
        }));
    }

    fn on_execution_failure(
        &self,
        request: &ToolCallRequest,
        context: &ToolExecutionContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_execution_failure(request, context, error, elapsed)
        }));
    }
}

pub struct SafeChatLoopHooks<H> {
    inner: H,
}

impl<H> SafeChatLoopHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> ChatLoopHooks for SafeChatLoopHooks<H>
where
    H: ChatLoopHooks,
{
    fn on_round_start(&self, session_id: &SessionId, mode: ToolCallingMode, step: u32) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_round_start(session_id, mode, step)
        }));
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
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_round_success(session_id, mode, step, finish_reason, usage, elapsed)
        }));
    }

    fn on_round_failure(
        &self,
        session_id: &SessionId,
        mode: ToolCallingMode,
        step: u32,
        error: &ProviderError,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_round_failure(session_id, mode, step, error, elapsed)
        }));
    }

    fn on_duplicate_call(&self, session_id: &SessionId, tool_name: &str) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_duplicate_call(session_id, tool_name)
        }));
    }

    fn on_step_ceiling(&self, session_id: &SessionId, max_steps: u32) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_step_ceiling(session_id, max_steps)
        }));
    }
}
