//! Fetch failures and their conversion into tool errors.

use std::error::Error;
use std::fmt::{Display, Formatter};

use tctooling::ToolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    Timeout,
    Upstream,
    Decode,
    Transport,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FetchErrorKind,
    pub message: String,
    /// HTTP status for `Upstream` failures.
    pub status: Option<u16>,
}

impl FetchError {
    pub fn new(kind: FetchErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::Timeout, message)
    }

    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            ..Self::new(FetchErrorKind::Upstream, message)
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::Decode, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::Transport, message)
    }

    /// Replaces the detail with a fixed, user-safe description for the tool.
    pub fn into_tool_error(self, tool_name: &str, description: &str) -> ToolError {
        let error = match self.kind {
            FetchErrorKind::Timeout => ToolError::timeout(description),
            FetchErrorKind::Upstream | FetchErrorKind::Transport => ToolError::upstream(description),
            FetchErrorKind::Decode => ToolError::decode(description),
        };
        error.with_tool_name(tool_name)
    }
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "{:?} [status={}]: {}", self.kind, status, self.message),
            None => write!(f, "{:?}: {}", self.kind, self.message),
        }
    }
}

impl Error for FetchError {}
