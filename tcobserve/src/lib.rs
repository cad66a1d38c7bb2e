//! Observability hooks for tool execution and orchestration rounds.
//!
//! ```rust
//! use tcobserve::{MetricsObservabilityHooks, SafeChatLoopHooks, TracingObservabilityHooks};
//!
//! let _chat_hooks = SafeChatLoopHooks::new(TracingObservabilityHooks);
//! let _metrics = MetricsObservabilityHooks;
//! ```

mod metrics_hooks;
mod safe_hooks;
mod tracing_hooks;

pub use metrics_hooks::MetricsObservabilityHooks;
pub use safe_hooks::{SafeChatLoopHooks, SafeToolHooks};
pub use tracing_hooks::TracingObservabilityHooks;

pub mod prelude {
    pub use crate::{
        MetricsObservabilityHooks, SafeChatLoopHooks, SafeToolHooks, TracingObservabilityHooks,
    };
}
