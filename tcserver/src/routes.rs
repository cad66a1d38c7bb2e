//! HTTP handlers for the chat, deletion, and key-status endpoints.

use std::convert::Infallible;

use axum::Json;
use axum::body::{Body, Bytes};
use axum::extract::{Query, State};
use axum::http::{HeaderMap, header};
use axum::response::{IntoResponse, Response};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tickerchat::{
    ChatId, ConfiguredKeys, Message, NDJSON_CONTENT_TYPE, RecordStream, RequestKeys, Role,
    SecretString, UserId,
};

use crate::{ApiError, AppState};

const CONFIGURED_MARKER: &str = "***configured***";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatPayload {
    pub id: String,
    #[serde(default)]
    pub messages: Vec<ClientMessage>,
    pub model_id: String,
    #[serde(default)]
    pub financial_datasets_api_key: Option<String>,
    #[serde(default)]
    pub model_api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientMessage {
    pub role: String,
    #[serde(default)]
    pub content: String,
}

impl ClientMessage {
    /// Client-side roles other than user, assistant, and system carry no model input.
    fn into_message(self) -> Option<Message> {
        let role = match self.role.as_str() {
            "user" => Role::User,
            "assistant" => Role::Assistant,
            "system" => Role::System,
            _ => return None,
        };
        Some(Message::new(role, self.content))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteParams {
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeysResponse {
    #[serde(rename = "hasInferenceKey")]
    pub has_inference_key: bool,
    #[serde(rename = "hasOpenAIKey")]
    pub has_openai_key: bool,
    #[serde(rename = "hasFinancialKey")]
    pub has_financial_key: bool,
    #[serde(rename = "inferenceKey")]
    pub inference_key: Option<&'static str>,
    #[serde(rename = "openaiKey")]
    pub openai_key: Option<&'static str>,
    #[serde(rename = "financialKey")]
    pub financial_key: Option<&'static str>,
}

impl From<ConfiguredKeys> for KeysResponse {
    fn from(keys: ConfiguredKeys) -> Self {
        let marker = |configured: bool| configured.then_some(CONFIGURED_MARKER);
        Self {
            has_inference_key: keys.inference,
            has_openai_key: keys.openai,
            has_financial_key: keys.financial,
            inference_key: marker(keys.inference),
            openai_key: marker(keys.openai),
            financial_key: marker(keys.financial),
        }
    }
}

/// `POST /api/chat`: validates the request and streams NDJSON event records.
pub async fn post_chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let payload: ChatPayload = serde_json::from_slice(&body).map_err(|error| {
        tracing::debug!(error = %error, "rejecting malformed chat body");
        ApiError::bad_request("Invalid request body")
    })?;
    let user_id = state.auth.identify(&headers).unwrap_or_else(UserId::anonymous);
    let keys = RequestKeys {
        model_api_key: payload.model_api_key.map(SecretString::from),
        financial_api_key: payload.financial_datasets_api_key.map(SecretString::from),
    };
    let messages = payload
        .messages
        .into_iter()
        .filter_map(ClientMessage::into_message)
        .collect();

    tracing::info!(chat_id = %payload.id, model_id = %payload.model_id, "chat request received");
    let events = state
        .runtime
        .stream_chat(&payload.model_id, keys, ChatId::new(payload.id), user_id, messages)
        .await?;

    let records = RecordStream::new(events).map(Ok::<_, Infallible>);
    Ok((
        [
            (header::CONTENT_TYPE, NDJSON_CONTENT_TYPE),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(records),
    )
        .into_response())
}

/// `DELETE /api/chat?id=`: removes a chat owned by the caller.
pub async fn delete_chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<DeleteParams>,
) -> Result<&'static str, ApiError> {
    let Some(id) = params.id.filter(|id| !id.is_empty()) else {
        return Err(ApiError::not_found("Not Found"));
    };
    let Some(user_id) = state.auth.identify(&headers) else {
        return Err(ApiError::unauthorized());
    };

    state.runtime.delete_chat(&ChatId::new(id), &user_id).await?;
    Ok("Chat deleted")
}

/// `GET /api/keys`: reports which server-side keys exist.
pub async fn get_keys(State(state): State<AppState>) -> Json<KeysResponse> {
    Json(state.runtime.configured_keys().into())
}
