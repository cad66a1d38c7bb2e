/// Creates a single chat [`Message`](crate::Message) from a role shorthand.
///
/// ```rust
/// use tickerchat::{Role, tc_msg};
///
/// let message = tc_msg!(user => "How did AAPL close?");
/// assert_eq!(message.role, Role::User);
/// assert_eq!(message.content, "How did AAPL close?");
/// ```
#[macro_export]
macro_rules! tc_msg {
    (system => $content:expr $(,)?) => {
        $crate::Message::new($crate::Role::System, $content)
    };
    (user => $content:expr $(,)?) => {
        $crate::Message::new($crate::Role::User, $content)
    };
    (assistant => $content:expr $(,)?) => {
        $crate::Message::new($crate::Role::Assistant, $content)
    };
    ($role:ident => $content:expr $(,)?) => {
        compile_error!("unsupported role: use system, user, or assistant");
    };
}

/// Creates a `Vec<Message>` from role/content pairs.
///
/// ```rust
/// use tickerchat::{Role, tc_messages};
///
/// let messages = tc_messages![
///     user => "What is MSFT's P/E?",
///     assistant => "About 35.",
///     user => "And last year?",
/// ];
///
/// assert_eq!(messages.len(), 3);
/// assert_eq!(messages[1].role, Role::Assistant);
/// ```
#[macro_export]
macro_rules! tc_messages {
    () => {
        Vec::<$crate::Message>::new()
    };
    ($($role:ident => $content:expr),+ $(,)?) => {
        vec![$($crate::tc_msg!($role => $content)),+]
    };
}

/// Creates an orchestration [`Session`](crate::Session), optionally with a
/// system prompt override.
///
/// ```rust
/// use tickerchat::{tc_messages, tc_session};
///
/// let session = tc_session!("session-1", "claude-4-sonnet", tc_messages![user => "Hi"]);
/// assert_eq!(session.model, "claude-4-sonnet");
/// assert!(session.system_prompt.is_none());
///
/// let session = tc_session!("session-2", "gpt-4o", Vec::new(), "Be brief.");
/// assert_eq!(session.system_prompt.as_deref(), Some("Be brief."));
/// ```
#[macro_export]
macro_rules! tc_session {
    ($session_id:expr, $model:expr, $conversation:expr $(,)?) => {
        $crate::Session::new($session_id, $model, $conversation)
    };
    ($session_id:expr, $model:expr, $conversation:expr, $system_prompt:expr $(,)?) => {
        $crate::Session::new($session_id, $model, $conversation).with_system_prompt($system_prompt)
    };
}
