//! Small convenience constructors for common types.

use crate::{ChatRequest, ChatId, Message, ProviderId, Role, Session, SessionId, ToolCallingMode, UserId};

pub fn system_message(content: impl Into<String>) -> Message {
    Message::new(Role::System, content)
}

pub fn user_message(content: impl Into<String>) -> Message {
    Message::new(Role::User, content)
}

pub fn assistant_message(content: impl Into<String>) -> Message {
    Message::new(Role::Assistant, content)
}

pub fn session(
    id: impl Into<SessionId>,
    model: impl Into<String>,
    conversation: Vec<Message>,
) -> Session {
    Session::new(id, model, conversation)
}

/// A single-message chat request from the anonymous user.
pub fn anonymous_request(
    chat_id: impl Into<ChatId>,
    model: impl Into<String>,
    user_input: impl Into<String>,
) -> ChatRequest {
    ChatRequest::new(chat_id, UserId::anonymous(), model, vec![user_message(user_input)])
}

pub fn parse_provider_id(value: &str) -> Option<ProviderId> {
    match value.trim().to_ascii_lowercase().as_str() {
        "heroku-inference" | "heroku_inference" | "heroku" | "inference" => {
            Some(ProviderId::HerokuInference)
        }
        "openai" | "gpt" => Some(ProviderId::OpenAi),
        _ => None,
    }
}

pub fn parse_tool_mode(value: &str) -> Option<ToolCallingMode> {
    match value.trim().to_ascii_lowercase().as_str() {
        "native" | "function" | "functions" => Some(ToolCallingMode::Native),
        "prompt" | "prompted" | "marker" => Some(ToolCallingMode::Prompt),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use crate::{ProviderId, Role, ToolCallingMode, UserId};

    use super::{anonymous_request, parse_provider_id, parse_tool_mode, user_message};

    #[test]
    fn parse_provider_id_supports_aliases() {
        assert_eq!(parse_provider_id("openai"), Some(ProviderId::OpenAi));
        assert_eq!(parse_provider_id("Heroku"), Some(ProviderId::HerokuInference));
        assert_eq!(parse_provider_id("anthropic"), None);
    }

    #[test]
    fn parse_tool_mode_accepts_both_strategies() {
        assert_eq!(parse_tool_mode(" Native "), Some(ToolCallingMode::Native));
        assert_eq!(parse_tool_mode("prompt"), Some(ToolCallingMode::Prompt));
        assert_eq!(parse_tool_mode("auto"), None);
    }

    #[test]
    fn message_and_request_helpers_apply_expected_defaults() {
        let message = user_message("hello");
        assert_eq!(message.role, Role::User);

        let request = anonymous_request("chat-1", "claude-4-sonnet", "How is NVDA doing?");
        assert_eq!(request.user_id, UserId::anonymous());
        assert_eq!(
            request.latest_user_message().map(|message| message.content.as_str()),
            Some("How is NVDA doing?")
        );
    }
}
