//! Lifecycle hooks for orchestration rounds.
//!
//! ```rust
//! use tcchat::{ChatLoopHooks, NoopChatLoopHooks};
//!
//! fn accepts_hooks(_hooks: &dyn ChatLoopHooks) {}
//!
//! accepts_hooks(&NoopChatLoopHooks);
//! ```

use std::time::Duration;

use tccommon::SessionId;
use tcprovider::{FinishReason, ProviderError, TokenUsage};

use crate::ToolCallingMode;

pub trait ChatLoopHooks: Send + Sync {
    fn on_round_start(&self, _session_id: &SessionId, _mode: ToolCallingMode, _step: u32) {}

    fn on_round_success(
        &self,
        _session_id: &SessionId,
        _mode: ToolCallingMode,
        _step: u32,
        _finish_reason: FinishReason,
        _usage: &TokenUsage,
        _elapsed: Duration,
    ) {
    }

    fn on_round_failure(
        &self,
        _session_id: &SessionId,
        _mode: ToolCallingMode,
        _step: u32,
        _error: &ProviderError,
        _elapsed: Duration,
    ) {
    }

    fn on_duplicate_call(&self, _session_id: &SessionId, _tool_name: &str) {}

    fn on_step_ceiling(&self, _session_id: &SessionId, _max_steps: u32) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopChatLoopHooks;

impl ChatLoopHooks for NoopChatLoopHooks {}
