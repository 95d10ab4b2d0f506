use thiserror::Error;

/// Failure of a send or receive on a streaming connection.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("receive failed: {0}")]
    Recv(String),

    #[error("send failed: {0}")]
    Send(String),

    #[error("connection already closed")]
    Closed,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("deadline exceeded before {phase}")]
    DeadlineExceeded { phase: String },

    #[error("stream transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("service not ready: {0}")]
    NotReady(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for std::io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(e) => e,
            Error::InvalidArgument(_) => std::io::Error::new(std::io::ErrorKind::InvalidInput, err),
            Error::DeadlineExceeded { .. } => std::io::Error::new(std::io::ErrorKind::TimedOut, err),
            other => std::io::Error::other(other),
        }
    }
}
