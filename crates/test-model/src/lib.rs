//! A local scripted model for testing purpose.

mod preset;

use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt::{self, Display, Formatter};
use std::future::ready;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll, ready};
use std::time::Duration;

use expense_agent_model::{
    ErrorKind, ModelFinishReason, ModelProvider, ModelProviderError,
    ModelRequest, ModelResponse, ModelResponseEvent,
};
use tokio::time::{Sleep, sleep};

pub use preset::*;

#[derive(Clone, Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    #[inline]
    pub fn new<S: Into<String>>(kind: ErrorKind, message: S) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for Error {}

impl ModelProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

pub struct TestModelResponse {
    events: VecDeque<ModelResponseEvent>,
    delay: Duration,
    sleep: Option<Pin<Box<Sleep>>>,
}

impl TestModelResponse {
    fn from_preset(preset: PresetResponse, delay: Duration) -> Self {
        let finish_reason = if preset.has_tool_call() {
            ModelFinishReason::ToolCalls
        } else {
            ModelFinishReason::Stop
        };
        let mut events: VecDeque<_> = preset
            .events
            .into_iter()
            .map(|event| match event {
                PresetEvent::MessageDelta(msg) => {
                    ModelResponseEvent::MessageDelta(msg)
                }
                PresetEvent::ToolCall(req) => ModelResponseEvent::ToolCall(req),
            })
            .collect();
        events.push_back(ModelResponseEvent::Completed(finish_reason));
        Self {
            events,
            delay,
            sleep: None,
        }
    }
}

impl ModelResponse for TestModelResponse {
    type Error = crate::Error;

    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<ModelResponseEvent>, Self::Error>> {
        let this = self.get_mut();
        let delay = this.delay;
        let sleep = this.sleep.get_or_insert_with(|| Box::pin(sleep(delay)));
        ready!(sleep.as_mut().poll(cx));
        this.sleep = None;

        // Keeps returning `None` once all events are drained.
        Poll::Ready(Ok(this.events.pop_front()))
    }
}

#[derive(Clone)]
enum ScriptStep {
    Respond(PresetResponse),
    Fail(Error),
}

#[derive(Default)]
struct ScriptState {
    steps: VecDeque<ScriptStep>,
    requests: Vec<ModelRequest>,
}

/// A local scripted model for testing purpose.
///
/// Before sending requests, you need to setup the script, which is how the
/// model should respond to each request in order. Every request consumes
/// one step. If there are no steps left, an error will be returned.
///
/// All requests are recorded, and clones share the same script and
/// records, so a test can keep a clone to inspect what has been sent after
/// handing the provider off.
///
/// # Note
///
/// This type is not optimized for production use, there are heavy memory
/// copies involved. You should only use it for testing.
#[derive(Clone, Default)]
pub struct TestModelProvider {
    state: Arc<Mutex<ScriptState>>,
    delay: Option<Duration>,
}

impl TestModelProvider {
    #[inline]
    pub fn add_response(&mut self, preset: PresetResponse) {
        self.lock().steps.push_back(ScriptStep::Respond(preset));
    }

    #[inline]
    pub fn add_text_response<S: Into<String>>(&mut self, text: S) {
        self.add_response(PresetResponse::with_text(text));
    }

    #[inline]
    pub fn add_failure<S: Into<String>>(&mut self, kind: ErrorKind, message: S) {
        self.lock()
            .steps
            .push_back(ScriptStep::Fail(Error::new(kind, message)));
    }

    #[inline]
    pub fn set_delay(&mut self, duration: Duration) {
        self.delay = Some(duration);
    }

    /// Returns all requests received so far.
    #[inline]
    pub fn requests(&self) -> Vec<ModelRequest> {
        self.lock().requests.clone()
    }

    #[inline]
    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    #[inline]
    fn lock(&self) -> MutexGuard<'_, ScriptState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ModelProvider for TestModelProvider {
    type Error = crate::Error;
    type Response = TestModelResponse;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send + 'static
    {
        let delay = self.delay.unwrap_or(Duration::from_millis(1));
        let mut state = self.lock();
        state.requests.push(req.clone());
        let result = match state.steps.pop_front() {
            Some(ScriptStep::Respond(preset)) => {
                Ok(TestModelResponse::from_preset(preset, delay))
            }
            Some(ScriptStep::Fail(err)) => Err(err),
            None => Err(Error::new(ErrorKind::Other, "no enough steps")),
        };
        ready(result)
    }
}

#[cfg(test)]
mod tests {
    use std::future::poll_fn;
    use std::pin::pin;

    use expense_agent_model::{ModelMessage, ToolCallRequest};
    use serde_json::json;

    use super::*;

    async fn collect_response(
        resp: TestModelResponse,
    ) -> (String, Option<ToolCallRequest>, ModelFinishReason) {
        let mut resp = pin!(resp);
        let mut msg = String::new();
        let mut tool_call = None;
        loop {
            let event = poll_fn(|cx| resp.as_mut().poll_next_event(cx))
                .await
                .unwrap()
                .unwrap();
            match event {
                ModelResponseEvent::Completed(reason) => {
                    return (msg, tool_call, reason);
                }
                ModelResponseEvent::MessageDelta(delta) => {
                    msg.push_str(&delta);
                }
                ModelResponseEvent::ToolCall(req) => tool_call = Some(req),
            }
        }
    }

    #[tokio::test]
    async fn test_send_request() {
        let mut provider = TestModelProvider::default();
        provider.add_response(PresetResponse::with_events([
            PresetEvent::MessageDelta("Sure, ".to_owned()),
            PresetEvent::MessageDelta("let me send it.".to_owned()),
            PresetEvent::ToolCall(ToolCallRequest {
                id: "tool:1".to_owned(),
                name: "send_email".to_owned(),
                arguments: json!({ "to": "expenses@contoso.com" }),
            }),
        ]));
        provider.add_text_response("Done.");

        let req = ModelRequest {
            messages: vec![ModelMessage::User("Submit my expenses".to_owned())],
            tools: vec![],
        };
        let resp = provider.send_request(&req).await.unwrap();
        let (msg, tool_call, reason) = collect_response(resp).await;
        assert_eq!(msg, "Sure, let me send it.");
        assert_eq!(reason, ModelFinishReason::ToolCalls);
        let tool_call = tool_call.unwrap();
        assert_eq!(tool_call.name, "send_email");

        let resp = provider.send_request(&req).await.unwrap();
        let (msg, tool_call, reason) = collect_response(resp).await;
        assert_eq!(msg, "Done.");
        assert_eq!(tool_call, None);
        assert_eq!(reason, ModelFinishReason::Stop);

        assert_eq!(provider.request_count(), 2);
        assert_eq!(provider.requests()[0], req);
    }

    #[tokio::test]
    async fn test_delayed_response() {
        let mut provider = TestModelProvider::default();
        provider.set_delay(Duration::from_millis(20));
        provider.add_text_response("Slowly.");

        let req = ModelRequest {
            messages: vec![],
            tools: vec![],
        };
        let started = std::time::Instant::now();
        let resp = provider.send_request(&req).await.unwrap();
        let (msg, _, reason) = collect_response(resp).await;
        assert_eq!(msg, "Slowly.");
        assert_eq!(reason, ModelFinishReason::Stop);
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[tokio::test]
    async fn test_scripted_failure() {
        let mut provider = TestModelProvider::default();
        provider.add_failure(ErrorKind::Network, "connection reset");
        let observer = provider.clone();

        let req = ModelRequest {
            messages: vec![],
            tools: vec![],
        };
        let err = provider.send_request(&req).await.err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Network);
        assert_eq!(err.to_string(), "connection reset");

        let err = provider.send_request(&req).await.err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Other);
        assert_eq!(observer.request_count(), 2);
    }
}
