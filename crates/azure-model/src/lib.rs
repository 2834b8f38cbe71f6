//! A model provider for Azure OpenAI and Azure AI Foundry deployments.

#[macro_use]
extern crate tracing;

mod config;
mod credential;
mod io;
mod proto;
mod response;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;

use expense_agent_model::{
    ErrorKind, ModelProvider, ModelProviderError, ModelRequest,
};
use mime::Mime;
use reqwest::{Client, StatusCode, header};

pub use config::{AzureConfig, AzureConfigBuilder, DEFAULT_API_VERSION};
pub use credential::{Authorization, Credential};
use io::{Chunks, Sse};
use proto::ErrorEnvelope;
pub use response::AzureResponse;

/// Error type for [`AzureProvider`].
#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for Error {}

impl ModelProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// Azure chat-completions model provider bound to one deployment.
///
/// The credential is acquired once when connecting, and released together
/// with the provider.
#[derive(Clone, Debug)]
pub struct AzureProvider {
    client: Client,
    url: Arc<str>,
    authorization: Arc<Authorization>,
}

impl AzureProvider {
    /// Acquires the configured credential and creates the provider.
    #[inline]
    pub async fn connect(config: AzureConfig) -> Result<Self, Error> {
        Self::connect_with_client(config, Client::new()).await
    }

    /// Like [`Self::connect`], but sends requests with a custom client.
    pub async fn connect_with_client(
        config: AzureConfig,
        client: Client,
    ) -> Result<Self, Error> {
        let authorization = config.credential.acquire().await?;
        debug!(
            "connected to deployment {} (token expires on {:?})",
            config.deployment(),
            authorization.expires_on()
        );
        Ok(Self {
            client,
            url: config.chat_completions_url().into(),
            authorization: Arc::new(authorization),
        })
    }
}

impl ModelProvider for AzureProvider {
    type Error = Error;
    type Response = AzureResponse;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send + 'static
    {
        let azure_req = proto::create_request(req);
        let resp_fut = self
            .client
            .post(&*self.url)
            .header(
                self.authorization.header().clone(),
                self.authorization.value(),
            )
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "text/event-stream")
            .json(&azure_req)
            .send();

        async move {
            let resp = resp_fut.await.map_err(|err| {
                Error::new(format!("request failed: {err}"), ErrorKind::Network)
            })?;

            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(error_from_status(status, &body));
            }

            let content_type = resp
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok());
            let is_event_stream = content_type
                .and_then(|v| v.parse().ok())
                .map(|m: Mime| m.subtype().as_str() == "event-stream")
                .unwrap_or(false);
            if !is_event_stream {
                return Err(Error::new(
                    format!("Unexpected content type: {content_type:?}"),
                    ErrorKind::Other,
                ));
            }

            // Here we got a successful response.
            let chunks = Chunks::from_response(resp);
            let sse = Sse::new(chunks);
            Ok(AzureResponse::from_sse(sse))
        }
    }
}

fn error_from_status(status: StatusCode, body: &str) -> Error {
    let detail = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error)
        .unwrap_or_default();

    let kind = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ErrorKind::Authentication
        }
        StatusCode::TOO_MANY_REQUESTS => ErrorKind::RateLimitExceeded,
        StatusCode::BAD_REQUEST
            if detail.code.as_deref() == Some("content_filter") =>
        {
            ErrorKind::Moderated
        }
        _ => ErrorKind::Other,
    };

    let message = match detail.message {
        Some(message) => format!("{status}: {message}"),
        None if body.trim().is_empty() => format!("{status}"),
        None => format!("{status}: {}", body.trim()),
    };
    warn!("request rejected: {message}");
    Error::new(message, kind)
}
