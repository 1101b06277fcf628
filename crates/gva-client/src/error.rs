use std::fmt;

/// Failures below the outcome level. These stay inside the crate's call paths
/// and are folded into `TransportError` outcomes (or a typed claim failure)
/// before anything is returned to the workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Connection refused, DNS failure, TLS failure, request build failure.
    Transport(String),
    /// No complete response within the configured timeout.
    Timeout,
    /// The collaborator answered with a non-success HTTP status.
    Status { code: u16 },
    /// A response body could not be decoded.
    Decode(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Transport(msg) => write!(f, "transport error: {msg}"),
            ClientError::Timeout => write!(f, "request timed out"),
            ClientError::Status { code } => write!(f, "unexpected http status {code}"),
            ClientError::Decode(msg) => write!(f, "decode error: {msg}"),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Timeout
        } else if e.is_decode() {
            ClientError::Decode(e.to_string())
        } else {
            ClientError::Transport(e.to_string())
        }
    }
}
