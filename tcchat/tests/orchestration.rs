use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures_util::StreamExt;
use serde_json::{Value, json};
use tcchat::prelude::*;
use tcchat::{
    DEFAULT_SYSTEM_PROMPT, DEFAULT_TASK_NAME, FOLLOW_UP_USER_REQUEST, NativeOrchestrator,
    PromptOrchestrator,
};
use tcprovider::{
    BoxedEventStream, FinishReason, Message, ModelProvider, ModelRequest, ModelResponse,
    OutputItem, ProviderError, ProviderFuture, ProviderId, Role, StreamEvent, TokenUsage, ToolCall,
    ToolDefinition, VecEventStream,
};

/// Replays canned responses in order and records every request it sees.
#[derive(Debug)]
struct ScriptedProvider {
    script: Mutex<VecDeque<Result<ModelResponse, ProviderError>>>,
    fallback: Option<ModelResponse>,
    requests: Mutex<Vec<ModelRequest>>,
}

impl ScriptedProvider {
    fn new(script: Vec<Result<ModelResponse, ProviderError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn repeating(response: ModelResponse) -> Self {
        Self {
            fallback: Some(response),
            ..Self::new(Vec::new())
        }
    }

    fn next(&self, request: ModelRequest) -> Result<ModelResponse, ProviderError> {
        self.requests.lock().expect("requests lock").push(request);
        let scripted = self.script.lock().expect("script lock").pop_front();
        match (scripted, &self.fallback) {
            (Some(response), _) => response,
            (None, Some(fallback)) => Ok(fallback.clone()),
            (None, None) => Err(ProviderError::other("script exhausted")),
        }
    }

    fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl ModelProvider for ScriptedProvider {
    fn id(&self) -> ProviderId {
        ProviderId::HerokuInference
    }

    fn complete<'a>(
        &'a self,
        request: ModelRequest,
    ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>> {
        Box::pin(async move { self.next(request) })
    }

    fn stream<'a>(
        &'a self,
        request: ModelRequest,
    ) -> ProviderFuture<'a, Result<BoxedEventStream<'a>, ProviderError>> {
        Box::pin(async move {
            let response = self.next(request)?;
            let mut events = Vec::new();
            let text = response.text();
            for word in text.split_inclusive(' ') {
                events.push(Ok(StreamEvent::TextDelta(word.to_string())));
            }
            for call in response.tool_calls() {
                events.push(Ok(StreamEvent::ToolCallDelta(call)));
            }
            events.push(Ok(StreamEvent::ResponseComplete(response)));
            Ok(Box::pin(VecEventStream::new(events)) as BoxedEventStream<'a>)
        })
    }
}

fn usage(prompt: u32, completion: u32) -> TokenUsage {
    TokenUsage {
        prompt_tokens: prompt,
        completion_tokens: completion,
        total_tokens: prompt + completion,
    }
}

fn text_response(text: &str, usage: TokenUsage) -> ModelResponse {
    ModelResponse {
        provider: ProviderId::HerokuInference,
        model: "claude-4-sonnet".to_string(),
        output: vec![OutputItem::Message(Message::new(Role::Assistant, text))],
        finish_reason: FinishReason::Stop,
        usage,
    }
}

fn tool_call_response(calls: Vec<ToolCall>, usage: TokenUsage) -> ModelResponse {
    ModelResponse {
        provider: ProviderId::HerokuInference,
        model: "claude-4-sonnet".to_string(),
        output: calls.into_iter().map(OutputItem::ToolCall).collect(),
        finish_reason: FinishReason::ToolCalls,
        usage,
    }
}

fn news_call(id: &str, ticker: &str) -> ToolCall {
    ToolCall {
        id: id.to_string(),
        name: "getNews".to_string(),
        arguments: json!({ "ticker": ticker, "limit": 3 }).to_string(),
    }
}

fn news_runtime(invocations: Arc<AtomicUsize>) -> Arc<DefaultToolRuntime> {
    let mut registry = ToolRegistry::new();
    registry.register_sync_fn(
        ToolDefinition {
            name: "getNews".to_string(),
            description: "Recent company news".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "ticker": {"type": "string"},
                    "limit": {"type": "integer", "default": 5}
                },
                "required": ["ticker"]
            }),
        },
        move |arguments, _ctx| {
            invocations.fetch_add(1, Ordering::SeqCst);
            Ok(json!({
                "news": [{"title": format!("{} beats estimates", arguments["ticker"].as_str().unwrap_or("?"))}]
            }))
        },
    );
    Arc::new(DefaultToolRuntime::new(Arc::new(registry)))
}

fn session(text: &str) -> Session {
    Session::new("session-1", "claude-4-sonnet", vec![Message::user(text)])
}

async fn collect(orchestrator: &dyn Orchestrator, session: Session) -> Vec<ChatEvent> {
    orchestrator.run(session).collect().await
}

fn loading_positions(events: &[ChatEvent]) -> (usize, usize) {
    let open = events
        .iter()
        .position(|event| matches!(event, ChatEvent::QueryLoading { is_loading: true, .. }))
        .expect("loading opened");
    let close = events
        .iter()
        .position(|event| matches!(event, ChatEvent::QueryLoading { is_loading: false, .. }))
        .expect("loading closed");
    (open, close)
}

#[tokio::test]
async fn native_round_trip_executes_tools_and_streams_the_answer() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        Ok(tool_call_response(vec![news_call("call_1", "AAPL")], usage(10, 2))),
        Ok(text_response("Apple beat estimates.", usage(20, 5))),
    ]));
    let invocations = Arc::new(AtomicUsize::new(0));
    let orchestrator = NativeOrchestrator::new(provider.clone(), news_runtime(invocations.clone()));

    let events = collect(&orchestrator, session("Any news on AAPL?")).await;

    assert_eq!(invocations.load(Ordering::SeqCst), 1);
    assert!(matches!(
        &events[0],
        ChatEvent::QueryLoading { is_loading: true, task_names } if task_names == &vec![DEFAULT_TASK_NAME.to_string()]
    ));
    assert!(matches!(&events[1], ChatEvent::ToolResult { tool_name, error: None, .. } if tool_name == "getNews"));
    assert!(matches!(&events[2], ChatEvent::QueryLoading { is_loading: false, .. }));

    let text: String = events
        .iter()
        .filter_map(|event| match event {
            ChatEvent::TextDelta(delta) => Some(delta.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(text, "Apple beat estimates.");

    assert_eq!(
        events.last(),
        Some(&ChatEvent::finish(FinishReason::Stop, usage(30, 7)))
    );

    let requests = provider.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].tools.len(), 1);
    assert!(requests[0].options.stream);
    let follow_up = &requests[1].messages;
    assert_eq!(follow_up.len(), 3);
    assert_eq!(follow_up[1].role, Role::Assistant);
    assert_eq!(follow_up[1].tool_calls.len(), 1);
    assert_eq!(follow_up[2].role, Role::Tool);
    assert_eq!(follow_up[2].tool_call_id.as_deref(), Some("call_1"));
    let payload: Value = serde_json::from_str(&follow_up[2].content).expect("tool turn is json");
    assert_eq!(payload["news"][0]["title"], "AAPL beats estimates");
}

#[tokio::test]
async fn native_rounds_carry_the_assistant_system_prompt() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        Ok(tool_call_response(vec![news_call("call_1", "MSFT")], usage(4, 1))),
        Ok(text_response("Microsoft shipped new Azure regions.", usage(6, 3))),
    ]));
    let orchestrator = NativeOrchestrator::new(
        provider.clone(),
        news_runtime(Arc::new(AtomicUsize::new(0))),
    );

    collect(&orchestrator, session("Any news on MSFT?")).await;

    let requests = provider.requests();
    assert_eq!(requests.len(), 2);
    for request in &requests {
        assert_eq!(request.system_prompt.as_deref(), Some(DEFAULT_SYSTEM_PROMPT));
    }

    let custom = session("Any news on MSFT?").with_system_prompt("Answer in one line.");
    let provider = Arc::new(ScriptedProvider::new(vec![Ok(text_response(
        "Nothing new.",
        usage(2, 2),
    ))]));
    let orchestrator = NativeOrchestrator::new(
        provider.clone(),
        news_runtime(Arc::new(AtomicUsize::new(0))),
    );
    collect(&orchestrator, custom).await;
    assert_eq!(
        provider.requests()[0].system_prompt.as_deref(),
        Some("Answer in one line.")
    );
}

#[tokio::test]
async fn native_loop_stops_at_the_step_ceiling_without_error() {
    let provider = Arc::new(ScriptedProvider::repeating(tool_call_response(
        vec![news_call("call_n", "MSFT")],
        usage(1, 1),
    )));
    let invocations = Arc::new(AtomicUsize::new(0));
    let orchestrator = NativeOrchestrator::new(provider.clone(), news_runtime(invocations.clone()));

    let events = collect(&orchestrator, session("Loop forever")).await;

    assert_eq!(provider.requests().len(), 10);
    assert_eq!(invocations.load(Ordering::SeqCst), 1);
    let tool_results = events
        .iter()
        .filter(|event| matches!(event, ChatEvent::ToolResult { .. }))
        .count();
    assert_eq!(tool_results, 1);

    let finishes: Vec<&ChatEvent> = events.iter().filter(|event| event.is_finish()).collect();
    assert_eq!(finishes.len(), 1);
    assert_eq!(
        finishes[0],
        &ChatEvent::finish(FinishReason::ToolCalls, usage(10, 10))
    );

    let last_request = provider.requests().pop().expect("last request");
    let duplicate_turn = last_request
        .messages
        .iter()
        .rev()
        .find(|message| message.role == Role::Tool)
        .expect("duplicate call still answered");
    assert!(duplicate_turn.content.contains("Duplicate call skipped"));
}

#[tokio::test]
async fn native_loop_answers_unparseable_calls_without_events() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        Ok(tool_call_response(
            vec![ToolCall {
                id: "call_bad".to_string(),
                name: "getNews".to_string(),
                arguments: "{not json".to_string(),
            }],
            usage(1, 1),
        )),
        Ok(text_response("Sorry, let me answer directly.", usage(1, 1))),
    ]));
    let invocations = Arc::new(AtomicUsize::new(0));
    let orchestrator = NativeOrchestrator::new(provider.clone(), news_runtime(invocations.clone()))
        .with_policy(ChatPolicy::default().with_streaming(false));

    let events = collect(&orchestrator, session("News?")).await;

    assert_eq!(invocations.load(Ordering::SeqCst), 0);
    assert!(!events.iter().any(|event| matches!(event, ChatEvent::ToolResult { .. })));
    let deltas = events
        .iter()
        .filter(|event| matches!(event, ChatEvent::TextDelta(_)))
        .count();
    assert_eq!(deltas, 1);

    let requests = provider.requests();
    assert!(!requests[0].options.stream);
    let notice = &requests[1].messages[2];
    assert_eq!(notice.tool_call_id.as_deref(), Some("call_bad"));
    assert!(notice.content.contains("error"));
}

#[tokio::test]
async fn provider_failure_closes_loading_and_finishes_with_error() {
    let provider = Arc::new(ScriptedProvider::new(vec![Err(ProviderError::timeout(
        "upstream took too long",
    ))]));
    let orchestrator = NativeOrchestrator::new(
        provider,
        news_runtime(Arc::new(AtomicUsize::new(0))),
    );

    let events = collect(&orchestrator, session("Hello")).await;

    let (open, close) = loading_positions(&events);
    assert!(open < close);
    assert_eq!(events.len(), 3);
    assert_eq!(
        events.last(),
        Some(&ChatEvent::failed(
            "The language model did not respond in time.",
            TokenUsage::default()
        ))
    );
}

#[tokio::test]
async fn prompt_mode_runs_duplicate_markers_once_and_streams_only_the_follow_up() {
    let phase_one = "Let me look that up.\n\
🔧 CALL_TOOL:getNews:{\"ticker\":\"AAPL\",\"limit\":3}\n\
🔧 CALL_TOOL:getNews:{\"limit\":3,\"ticker\":\"AAPL\"}\n";
    let provider = Arc::new(ScriptedProvider::new(vec![
        Ok(text_response(phase_one, usage(50, 20))),
        Ok(text_response("Apple beat estimates this quarter.", usage(80, 10))),
    ]));
    let invocations = Arc::new(AtomicUsize::new(0));
    let orchestrator = PromptOrchestrator::new(provider.clone(), news_runtime(invocations.clone()));

    let events = collect(&orchestrator, session("Any AAPL news?")).await;

    assert_eq!(invocations.load(Ordering::SeqCst), 1);
    let tool_results: Vec<&ChatEvent> = events
        .iter()
        .filter(|event| matches!(event, ChatEvent::ToolResult { .. }))
        .collect();
    assert_eq!(tool_results.len(), 1);
    assert!(matches!(
        tool_results[0],
        ChatEvent::ToolResult { arguments, .. } if arguments == &json!({"ticker": "AAPL", "limit": 3})
    ));

    let text: String = events
        .iter()
        .filter_map(|event| match event {
            ChatEvent::TextDelta(delta) => Some(delta.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(text, "Apple beat estimates this quarter.");

    let (_, close) = loading_positions(&events);
    let first_delta = events
        .iter()
        .position(|event| matches!(event, ChatEvent::TextDelta(_)))
        .expect("delta");
    assert!(close < first_delta);
    assert_eq!(
        events.last(),
        Some(&ChatEvent::finish(FinishReason::Stop, usage(130, 30)))
    );

    let requests = provider.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].tools.is_empty());
    assert!(!requests[0].options.stream);
    assert!(
        requests[0]
            .system_prompt
            .as_deref()
            .expect("phase one prompt")
            .contains("🔧 CALL_TOOL:getNews:")
    );
    let follow_up = &requests[1];
    assert!(
        follow_up
            .system_prompt
            .as_deref()
            .expect("follow-up prompt")
            .contains("Tool: getNews(")
    );
    assert_eq!(
        follow_up.messages.last().map(|message| message.content.as_str()),
        Some(FOLLOW_UP_USER_REQUEST)
    );
}

#[tokio::test]
async fn prompt_mode_without_markers_returns_the_first_answer() {
    let provider = Arc::new(ScriptedProvider::new(vec![Ok(text_response(
        "Markets are closed today.",
        usage(5, 5),
    ))]));
    let orchestrator = PromptOrchestrator::new(
        provider.clone(),
        news_runtime(Arc::new(AtomicUsize::new(0))),
    );

    let events = collect(&orchestrator, session("Are markets open?")).await;

    assert_eq!(provider.requests().len(), 1);
    assert_eq!(
        events,
        vec![
            ChatEvent::loading(&[DEFAULT_TASK_NAME.to_string()]),
            ChatEvent::loaded(),
            ChatEvent::TextDelta("Markets are closed today.".to_string()),
            ChatEvent::finish(FinishReason::Stop, usage(5, 5)),
        ]
    );
}

#[tokio::test]
async fn prompt_mode_skips_malformed_markers_and_reports_unknown_tools() {
    let phase_one = "🔧 CALL_TOOL:getNews:{\"ticker\": \n\
🔧 CALL_TOOL:getNews:{\"ticker\":\"TSLA\"}\n\
🔧 CALL_TOOL:getWeather:{\"city\":\"Paris\"}";
    let provider = Arc::new(ScriptedProvider::new(vec![
        Ok(text_response(phase_one, usage(1, 1))),
        Ok(text_response("Tesla news is mixed.", usage(1, 1))),
    ]));
    let invocations = Arc::new(AtomicUsize::new(0));
    let orchestrator = PromptOrchestrator::new(provider, news_runtime(invocations.clone()));

    let events = collect(&orchestrator, session("TSLA?")).await;

    assert_eq!(invocations.load(Ordering::SeqCst), 1);
    let errors: Vec<Option<String>> = events
        .iter()
        .filter_map(|event| match event {
            ChatEvent::ToolResult { error, .. } => Some(error.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(errors, vec![None, Some("Unknown tool: getWeather".to_string())]);
    assert!(matches!(events.last(), Some(ChatEvent::Finish { error: None, .. })));
}

#[tokio::test]
async fn chat_service_wraps_the_run_and_persists_both_turns() {
    let provider = Arc::new(ScriptedProvider::new(vec![Ok(text_response(
        "AAPL is trading higher.",
        usage(3, 4),
    ))]));
    let store = Arc::new(InMemoryChatStore::new());
    let service = ChatService::new(
        provider,
        news_runtime(Arc::new(AtomicUsize::new(0))),
        store.clone(),
    );
    let request = ChatRequest::new(
        "chat-1",
        UserId::new("user-1"),
        "claude-4-sonnet",
        vec![Message::user("How is AAPL doing today?")],
    );

    let events: Vec<ChatEvent> = service
        .stream_chat(request)
        .await
        .expect("stream starts")
        .collect()
        .await;

    assert!(matches!(&events[0], ChatEvent::UserMessageId(_)));
    let annotation = events
        .iter()
        .position(|event| matches!(event, ChatEvent::MessageAnnotation { .. }))
        .expect("annotation emitted");
    assert_eq!(annotation, events.len() - 2);
    assert!(events[events.len() - 1].is_finish());

    let chat = store
        .get_chat(&ChatId::new("chat-1"))
        .await
        .expect("store readable")
        .expect("chat saved");
    assert_eq!(chat.title, "How is AAPL doing today?");
    assert_eq!(chat.user_id, UserId::new("user-1"));

    let mut saved = Vec::new();
    for _ in 0..50 {
        saved = store.messages(&ChatId::new("chat-1")).expect("messages");
        if saved.len() == 2 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert_eq!(saved.len(), 2);
    assert_eq!(saved[0].role, Role::User);
    assert_eq!(saved[1].role, Role::Assistant);
    assert_eq!(saved[1].content, "AAPL is trading higher.");
    let ChatEvent::MessageAnnotation { server_message_id } = &events[annotation] else {
        unreachable!()
    };
    assert_eq!(&saved[1].id, server_message_id);
}

#[tokio::test]
async fn chat_service_keeps_model_rounds_apart_in_the_saved_answer() {
    let mut lead_in = tool_call_response(vec![news_call("call_1", "AAPL")], usage(5, 3));
    lead_in
        .output
        .insert(0, OutputItem::Message(Message::assistant("Let me pull Apple's news.")));
    let provider = Arc::new(ScriptedProvider::new(vec![
        Ok(lead_in),
        Ok(text_response("Apple beat estimates.", usage(9, 4))),
    ]));
    let store = Arc::new(InMemoryChatStore::new());
    let service = ChatService::new(
        provider,
        news_runtime(Arc::new(AtomicUsize::new(0))),
        store.clone(),
    );
    let request = ChatRequest::new(
        "chat-rounds",
        UserId::new("user-1"),
        "claude-4-sonnet",
        vec![Message::user("Any news on AAPL?")],
    );

    let events: Vec<ChatEvent> = service
        .stream_chat(request)
        .await
        .expect("stream starts")
        .collect()
        .await;
    assert!(matches!(events.last(), Some(ChatEvent::Finish { error: None, .. })));

    let mut saved = Vec::new();
    for _ in 0..50 {
        saved = store.messages(&ChatId::new("chat-rounds")).expect("messages");
        if saved.len() == 2 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert_eq!(saved.len(), 2);
    assert_eq!(
        saved[1].content,
        "Let me pull Apple's news.\n\nApple beat estimates."
    );
}

#[tokio::test]
async fn chat_service_rejects_requests_without_a_user_message() {
    let service = ChatService::new(
        Arc::new(ScriptedProvider::new(Vec::new())),
        news_runtime(Arc::new(AtomicUsize::new(0))),
        Arc::new(InMemoryChatStore::new()),
    );
    let request = ChatRequest::new(
        "chat-2",
        UserId::anonymous(),
        "claude-4-sonnet",
        vec![Message::assistant("Hello!")],
    );

    let error = match service.stream_chat(request).await {
        Ok(_) => panic!("request without user message should fail"),
        Err(error) => error,
    };
    assert_eq!(error.kind, ChatErrorKind::InvalidRequest);
    assert_eq!(error.message, "No user message found");
}

#[tokio::test]
async fn delete_chat_checks_existence_and_ownership() {
    let store = Arc::new(InMemoryChatStore::new());
    store
        .save_chat(ChatRecord {
            id: ChatId::new("chat-3"),
            user_id: UserId::new("owner"),
            title: "AAPL".to_string(),
        })
        .await
        .expect("seed chat");
    let service = ChatService::new(
        Arc::new(ScriptedProvider::new(Vec::new())),
        news_runtime(Arc::new(AtomicUsize::new(0))),
        store.clone(),
    );

    let missing = service
        .delete_chat(&ChatId::new("nope"), &UserId::new("owner"))
        .await
        .expect_err("missing chat");
    assert_eq!(missing.kind, ChatErrorKind::NotFound);

    let stranger = service
        .delete_chat(&ChatId::new("chat-3"), &UserId::new("someone-else"))
        .await
        .expect_err("not the owner");
    assert_eq!(stranger.kind, ChatErrorKind::Unauthorized);

    service
        .delete_chat(&ChatId::new("chat-3"), &UserId::new("owner"))
        .await
        .expect("owner deletes");
    assert!(
        store
            .get_chat(&ChatId::new("chat-3"))
            .await
            .expect("store readable")
            .is_none()
    );
}
