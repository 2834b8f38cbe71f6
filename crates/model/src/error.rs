use std::fmt::{self, Display, Formatter};

/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The credential was rejected or could not be acquired.
    Authentication,
    /// The service could not be reached or the connection broke.
    Network,
    /// The content is moderated.
    Moderated,
    /// The model provider is rate limited.
    RateLimitExceeded,
    /// Any other errors.
    Other,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Authentication => "authentication failed",
            ErrorKind::Network => "network error",
            ErrorKind::Moderated => "content moderated",
            ErrorKind::RateLimitExceeded => "rate limit exceeded",
            ErrorKind::Other => "model error",
        };
        f.write_str(s)
    }
}
