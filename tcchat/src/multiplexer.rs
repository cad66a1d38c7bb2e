//! Newline-delimited JSON framing of a chat event stream.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use tcprovider::TokenUsage;

use crate::{ChatEvent, ChatEventStream};

pub const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

const MISSING_FINISH_DESCRIPTION: &str = "The response ended unexpectedly.";

/// Yields one `\n`-terminated JSON record per event, in order. Nothing follows
/// the first `finish`; a stream that ends without one gets a synthetic
/// `finish{error}` record.
pub struct RecordStream {
    inner: ChatEventStream,
    finished: bool,
}

impl RecordStream {
    pub fn new(inner: ChatEventStream) -> Self {
        Self {
            inner,
            finished: false,
        }
    }
}

impl Stream for RecordStream {
    type Item = String;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.finished {
            return Poll::Ready(None);
        }

        match self.inner.as_mut().poll_next(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Some(event)) => {
                if event.is_finish() {
                    self.finished = true;
                }
                Poll::Ready(Some(encode_record(&event)))
            }
            Poll::Ready(None) => {
                self.finished = true;
                tracing::warn!("event stream ended without a finish record");
                let event = ChatEvent::failed(MISSING_FINISH_DESCRIPTION, TokenUsage::default());
                Poll::Ready(Some(encode_record(&event)))
            }
        }
    }
}

pub fn encode_record(event: &ChatEvent) -> String {
    let mut line = match serde_json::to_string(event) {
        Ok(line) => line,
        Err(error) => {
            tracing::error!(error = %error, "failed to encode chat event");
            r#"{"type":"finish","content":{"finishReason":"error","usage":{"promptTokens":0,"completionTokens":0,"totalTokens":0},"error":"The response could not be encoded."}}"#
                .to_string()
        }
    };
    line.push('\n');
    line
}

#[cfg(test)]
mod tests {
    use futures_util::{StreamExt, stream};
    use serde_json::Value;
    use tcprovider::FinishReason;

    use super::*;

    fn record_types(records: &[String]) -> Vec<String> {
        records
            .iter()
            .map(|record| {
                let value: Value = serde_json::from_str(record.trim_end()).expect("record is json");
                value["type"].as_str().expect("type tag").to_string()
            })
            .collect()
    }

    #[tokio::test]
    async fn records_stop_after_the_first_finish() {
        let events = vec![
            ChatEvent::loading(&["Working".to_string()]),
            ChatEvent::loaded(),
            ChatEvent::TextDelta("Apple".to_string()),
            ChatEvent::finish(FinishReason::Stop, TokenUsage::default()),
            ChatEvent::TextDelta("late".to_string()),
        ];
        let records: Vec<String> = RecordStream::new(Box::pin(stream::iter(events)))
            .collect()
            .await;

        assert!(records.iter().all(|record| record.ends_with('\n')));
        assert_eq!(
            record_types(&records),
            vec!["query-loading", "query-loading", "text-delta", "finish"]
        );
    }

    #[tokio::test]
    async fn missing_finish_is_synthesized_as_error() {
        let events = vec![ChatEvent::TextDelta("partial".to_string())];
        let records: Vec<String> = RecordStream::new(Box::pin(stream::iter(events)))
            .collect()
            .await;

        assert_eq!(records.len(), 2);
        let last: Value = serde_json::from_str(records[1].trim_end()).expect("record is json");
        assert_eq!(last["content"]["finishReason"], "error");
        assert_eq!(last["content"]["error"], MISSING_FINISH_DESCRIPTION);
    }
}
