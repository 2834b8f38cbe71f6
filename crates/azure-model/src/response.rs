use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use expense_agent_model::{
    ErrorKind, ModelFinishReason, ModelResponse, ModelResponseEvent,
    ToolCallRequest,
};
use pin_project_lite::pin_project;
use serde_json::{Value, json};

use crate::Error;
use crate::io::{Sse, SseError};
use crate::proto::{ChatCompletionChunk, ToolCallDelta};

/// A tool call whose fragments are still arriving.
#[derive(Default)]
struct PartialToolCall {
    index: u32,
    id: String,
    name: String,
    arguments: String,
}

impl PartialToolCall {
    fn merge(&mut self, delta: ToolCallDelta) {
        if let Some(id) = delta.id {
            if self.id.is_empty() {
                self.id = id;
            }
        }
        if let Some(function) = delta.function {
            if let Some(name) = function.name {
                self.name.push_str(&name);
            }
            if let Some(arguments) = function.arguments {
                self.arguments.push_str(&arguments);
            }
        }
    }

    fn into_request(self) -> ToolCallRequest {
        let arguments = if self.arguments.trim().is_empty() {
            json!({})
        } else {
            serde_json::from_str::<Value>(&self.arguments)
                .unwrap_or(Value::String(self.arguments))
        };
        ToolCallRequest {
            id: self.id,
            name: self.name,
            arguments,
        }
    }
}

struct PartialState {
    sse: Sse,
    tool_calls: Vec<PartialToolCall>,
    // Events that are decoded but not yet handed out. One chunk may yield
    // several events, and finishing yields all tool calls at once.
    pending_events: VecDeque<ModelResponseEvent>,
    finished: bool,
}

impl PartialState {
    fn merge_tool_call(&mut self, delta: ToolCallDelta) {
        let index = delta.index.unwrap_or(0);
        match self.tool_calls.iter_mut().find(|t| t.index == index) {
            Some(partial) => partial.merge(delta),
            None => {
                let mut partial = PartialToolCall {
                    index,
                    ..Default::default()
                };
                partial.merge(delta);
                self.tool_calls.push(partial);
            }
        }
    }

    /// Flushes the accumulated tool calls followed by the completion event.
    /// `reason` is `None` when the stream ended without a finish reason.
    fn finish(&mut self, reason: Option<&str>) -> Result<(), Error> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;

        let has_tool_calls = !self.tool_calls.is_empty();
        let reason = match reason {
            Some("content_filter") => {
                return Err(Error::new(
                    "the response was filtered by the content policy",
                    ErrorKind::Moderated,
                ));
            }
            Some("tool_calls") | Some("function_call") => {
                ModelFinishReason::ToolCalls
            }
            Some("length") => ModelFinishReason::Length,
            Some(_) => ModelFinishReason::Stop,
            None if has_tool_calls => ModelFinishReason::ToolCalls,
            None => ModelFinishReason::Stop,
        };

        for partial in self.tool_calls.drain(..) {
            self.pending_events
                .push_back(ModelResponseEvent::ToolCall(partial.into_request()));
        }
        self.pending_events
            .push_back(ModelResponseEvent::Completed(reason));
        Ok(())
    }

    fn apply_chunk(&mut self, chunk: ChatCompletionChunk) -> Result<(), Error> {
        trace!("got chunk ({}) with {} choices", chunk.id, chunk.choices.len());
        for choice in chunk.choices {
            // Only one completion is requested.
            if choice.index != 0 {
                continue;
            }
            if let Some(delta) = choice.delta {
                if let Some(content) = delta.content {
                    if !content.is_empty() {
                        self.pending_events
                            .push_back(ModelResponseEvent::MessageDelta(content));
                    }
                }
                for tool_call in delta.tool_calls.into_iter().flatten() {
                    self.merge_tool_call(tool_call);
                }
            }
            if let Some(reason) = choice.finish_reason {
                self.finish(Some(&reason))?;
            }
        }
        Ok(())
    }
}

type PinnedFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;
type NextEvent = Result<(Option<ModelResponseEvent>, PartialState), Error>;

pin_project! {
    pub struct AzureResponse {
        next_event_fut: Option<PinnedFuture<NextEvent>>,
    }
}

impl AzureResponse {
    #[inline]
    pub fn from_sse(sse: Sse) -> Self {
        let partial_state = PartialState {
            sse,
            tool_calls: Default::default(),
            pending_events: Default::default(),
            finished: false,
        };
        let next_event_fut = async move { next_event(partial_state).await };
        Self {
            next_event_fut: Some(Box::pin(next_event_fut)),
        }
    }
}

impl ModelResponse for AzureResponse {
    type Error = crate::Error;

    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<ModelResponseEvent>, Self::Error>> {
        let this = self.project();
        let Some(next_event_fut) = this.next_event_fut else {
            return Poll::Ready(Ok(None));
        };
        let (event, partial_state) =
            match ready!(next_event_fut.as_mut().poll(cx)) {
                Ok((Some(event), partial_state)) => (event, partial_state),
                Ok((None, _)) => {
                    *this.next_event_fut = None;
                    return Poll::Ready(Ok(None));
                }
                Err(err) => {
                    *this.next_event_fut = None;
                    return Poll::Ready(Err(err));
                }
            };

        let next_event_fut = async move { next_event(partial_state).await };
        *this.next_event_fut = Some(Box::pin(next_event_fut));

        Poll::Ready(Ok(Some(event)))
    }
}

async fn next_event(mut partial_state: PartialState) -> NextEvent {
    loop {
        if let Some(event) = partial_state.pending_events.pop_front() {
            return Ok((Some(event), partial_state));
        }
        if partial_state.finished {
            return Ok((None, partial_state));
        }

        let data = match partial_state.sse.next_event().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                partial_state.finish(None)?;
                continue;
            }
            Err(SseError::ChunksError(err)) => {
                return Err(Error::new(
                    format!("response stream interrupted: {}", err.0),
                    ErrorKind::Network,
                ));
            }
            Err(SseError::InvalidPayload) => {
                return Err(Error::new(
                    "response stream is not valid UTF-8",
                    ErrorKind::Other,
                ));
            }
        };
        if data.trim() == "[DONE]" {
            partial_state.finish(None)?;
            continue;
        }

        let chunk = serde_json::from_str::<ChatCompletionChunk>(&data)
            .map_err(|err| Error::new(format!("{err}"), ErrorKind::Other))?;
        partial_state.apply_chunk(chunk)?;
    }
}
