use std::io;
use std::path::PathBuf;

use expense_agent_model::ErrorKind;

/// Errors that end a run, or are reported at its end.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The expenses file is missing or unreadable. Fatal, raised before
    /// any remote interaction.
    #[error("cannot read expenses file {}: {source}", .path.display())]
    FileAccess {
        /// The path that was read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The remote agent failed.
    #[error(transparent)]
    RemoteAgent(#[from] RemoteAgentError),
    /// A required setting is missing or invalid.
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Any failure surfaced by the remote collaborator, from credential
/// acquisition to the model's answer.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct RemoteAgentError {
    kind: ErrorKind,
    message: String,
}

impl RemoteAgentError {
    /// Creates a new error.
    #[inline]
    pub fn new<S: Into<String>>(kind: ErrorKind, message: S) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Returns the kind of the error.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl From<expense_agent_core::Error> for RemoteAgentError {
    #[inline]
    fn from(err: expense_agent_core::Error) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}

impl From<expense_agent_azure_model::Error> for RemoteAgentError {
    #[inline]
    fn from(err: expense_agent_azure_model::Error) -> Self {
        use expense_agent_model::ModelProviderError;

        Self::new(err.kind(), err.message())
    }
}
