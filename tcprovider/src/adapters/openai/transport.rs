//! Chat-completions transport trait and reqwest-based HTTP implementation.

use std::collections::BTreeMap;
use std::pin::Pin;

use async_stream::try_stream;
use futures_core::Stream;
use futures_util::StreamExt;
use reqwest::{Client, Response, StatusCode};

use crate::{ProviderError, ProviderFuture};

use super::serde_api::{
    OpenAiApiResponse, OpenAiApiStreamResponse, build_api_request, extract_error_message,
    parse_finish_reason,
};
use super::types::{
    OpenAiAssistantMessage, OpenAiAuth, OpenAiFinishReason, OpenAiRequest, OpenAiResponse,
    OpenAiStreamChunk, OpenAiToolCall, OpenAiUsage,
};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const HEROKU_INFERENCE_BASE_URL: &str = "https://us.inference.heroku.com/v1";

pub type OpenAiChunkStream<'a> =
    Pin<Box<dyn Stream<Item = Result<OpenAiStreamChunk, ProviderError>> + Send + 'a>>;

pub trait OpenAiTransport: Send + Sync + std::fmt::Debug {
    fn complete<'a>(
        &'a self,
        request: OpenAiRequest,
        auth: OpenAiAuth,
    ) -> ProviderFuture<'a, Result<OpenAiResponse, ProviderError>>;

    fn stream<'a>(
        &'a self,
        request: OpenAiRequest,
        auth: OpenAiAuth,
    ) -> ProviderFuture<'a, Result<OpenAiChunkStream<'a>, ProviderError>>;
}

#[derive(Debug, Clone)]
pub struct OpenAiHttpTransport {
    client: Client,
    base_url: String,
}

impl OpenAiHttpTransport {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: OPENAI_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    fn apply_auth(
        &self,
        builder: reqwest::RequestBuilder,
        auth: &OpenAiAuth,
    ) -> reqwest::RequestBuilder {
        match auth {
            OpenAiAuth::ApiKey(key) => builder.bearer_auth(key.expose()),
        }
    }

    async fn send(
        &self,
        request: OpenAiRequest,
        auth: &OpenAiAuth,
    ) -> Result<Response, ProviderError> {
        let api_request = build_api_request(request)?;
        let builder = self
            .client
            .post(self.endpoint("chat/completions"))
            .json(&api_request);
        let response = self.apply_auth(builder, auth).send().await.map_err(|err| {
            if err.is_timeout() {
                ProviderError::timeout(err.to_string())
            } else {
                ProviderError::transport(err.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(Self::parse_error(response).await);
        }

        Ok(response)
    }

    async fn parse_error(response: Response) -> ProviderError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body)
            .unwrap_or_else(|| format!("chat completion failed with status {status}"));

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ProviderError::authentication(message)
            }
            StatusCode::TOO_MANY_REQUESTS => ProviderError::rate_limited(message),
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
                ProviderError::timeout(message)
            }
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ProviderError::invalid_request(message)
            }
            StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => {
                ProviderError::unavailable(message)
            }
            _ => ProviderError::transport(message),
        }
    }
}

impl OpenAiTransport for OpenAiHttpTransport {
    fn complete<'a>(
        &'a self,
        mut request: OpenAiRequest,
        auth: OpenAiAuth,
    ) -> ProviderFuture<'a, Result<OpenAiResponse, ProviderError>> {
        Box::pin(async move {
            request.stream = false;
            let response = self.send(request, &auth).await?;
            let parsed: OpenAiApiResponse = response
                .json()
                .await
                .map_err(|err| ProviderError::transport(err.to_string()))?;

            OpenAiResponse::try_from(parsed)
        })
    }

    fn stream<'a>(
        &'a self,
        mut request: OpenAiRequest,
        auth: OpenAiAuth,
    ) -> ProviderFuture<'a, Result<OpenAiChunkStream<'a>, ProviderError>> {
        Box::pin(async move {
            request.stream = true;
            let fallback_model = request.model.clone();
            let response = self.send(request, &auth).await?;

            let stream = try_stream! {
                let mut chunks = response.bytes_stream();
                let mut sse_buffer = String::new();
                let mut accumulator = SseAccumulator::new(fallback_model);

                'read: while let Some(item) = chunks.next().await {
                    let bytes = item.map_err(|err| ProviderError::transport(err.to_string()))?;
                    let text = std::str::from_utf8(&bytes)
                        .map_err(|err| ProviderError::transport(err.to_string()))?;
                    sse_buffer.push_str(text);

                    while let Some(newline_index) = sse_buffer.find('\n') {
                        let line = sse_buffer.drain(..=newline_index).collect::<String>();
                        let line = line.trim();

                        let Some(payload) = line.strip_prefix("data:") else {
                            continue;
                        };
                        let payload = payload.trim();
                        if payload == "[DONE]" {
                            break 'read;
                        }

                        for chunk in accumulator.push_payload(payload)? {
                            yield chunk;
                        }
                    }
                }

                yield OpenAiStreamChunk::ResponseComplete(accumulator.finish());
            };

            Ok(Box::pin(stream) as OpenAiChunkStream<'a>)
        })
    }
}

/// Folds SSE `data:` payloads into deltas and the final response.
#[derive(Debug)]
pub(crate) struct SseAccumulator {
    fallback_model: String,
    model: Option<String>,
    content: String,
    tool_calls: BTreeMap<u32, OpenAiToolCall>,
    finish_reason: OpenAiFinishReason,
    usage: OpenAiUsage,
}

impl SseAccumulator {
    pub(crate) fn new(fallback_model: impl Into<String>) -> Self {
        Self {
            fallback_model: fallback_model.into(),
            model: None,
            content: String::new(),
            tool_calls: BTreeMap::new(),
            finish_reason: OpenAiFinishReason::Other,
            usage: OpenAiUsage::default(),
        }
    }

    pub(crate) fn push_payload(
        &mut self,
        payload: &str,
    ) -> Result<Vec<OpenAiStreamChunk>, ProviderError> {
        let parsed: OpenAiApiStreamResponse = serde_json::from_str(payload)
            .map_err(|err| ProviderError::transport(err.to_string()))?;
        let mut chunks = Vec::new();

        if self.model.is_none() {
            self.model = parsed.model.filter(|model| !model.is_empty());
        }

        if let Some(usage) = parsed.usage {
            self.usage = usage.into();
        }

        let Some(choice) = parsed.choices.into_iter().next() else {
            return Ok(chunks);
        };

        if let Some(delta_content) = choice.delta.content
            && !delta_content.is_empty()
        {
            self.content.push_str(&delta_content);
            chunks.push(OpenAiStreamChunk::TextDelta(delta_content));
        }

        for delta_call in choice.delta.tool_calls.unwrap_or_default() {
            let index = delta_call.index.unwrap_or(0);
            let entry = self
                .tool_calls
                .entry(index)
                .or_insert_with(|| OpenAiToolCall {
                    id: format!("tool_call_{index}"),
                    name: String::new(),
                    arguments: String::new(),
                });

            if let Some(id) = delta_call.id {
                entry.id = id;
            }

            if let Some(function) = delta_call.function {
                if let Some(name) = function.name {
                    entry.name = name;
                }

                if let Some(arguments) = function.arguments {
                    entry.arguments.push_str(&arguments);
                }
            }

            chunks.push(OpenAiStreamChunk::ToolCallDelta(entry.clone()));
        }

        if choice.finish_reason.is_some() {
            self.finish_reason = parse_finish_reason(choice.finish_reason.as_deref());
        }

        Ok(chunks)
    }

    pub(crate) fn finish(self) -> OpenAiResponse {
        OpenAiResponse {
            model: self.model.unwrap_or(self.fallback_model),
            message: OpenAiAssistantMessage {
                content: self.content,
                tool_calls: self.tool_calls.into_values().collect(),
            },
            finish_reason: self.finish_reason,
            usage: self.usage,
        }
    }
}
