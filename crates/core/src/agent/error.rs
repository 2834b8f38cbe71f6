use std::error::Error as StdError;
use std::fmt::{self, Display};

use expense_agent_model::{ErrorKind, ModelProviderError};

/// Error returned by [`super::AgentSession::run`].
#[derive(Debug)]
pub enum Error {
    /// The model provider failed.
    Model(Box<dyn ModelProviderError>),
    /// The model kept calling tools beyond the configured limit.
    ToolRoundsExceeded(usize),
}

impl Error {
    /// Returns the kind of this error.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Model(err) => err.kind(),
            Error::ToolRoundsExceeded(_) => ErrorKind::Other,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Model(err) => write!(f, "{err}"),
            Error::ToolRoundsExceeded(max) => {
                write!(f, "the model requested tools more than {max} times in a row")
            }
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Model(err) => Some(err.as_ref()),
            Error::ToolRoundsExceeded(_) => None,
        }
    }
}
