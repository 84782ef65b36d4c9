use thiserror::Error;

/// Flat error taxonomy shared by the registry, codec and domain entities.
///
/// Kept intentionally small and non-exhaustive: callers match on the kinds
/// they can act on (`Offline`, `NotFound`, ...) and fall through to a
/// generic path for the rest, the same way the C core's error codes were
/// meant to be consumed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum McError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("out of memory")]
    OutOfMemory,
    #[error("parse error: {0}")]
    Parse(String),
    #[error("unsupported: {0}")]
    Unsupported(String),
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("offline")]
    Offline,
    #[error("timed out")]
    Timeout,
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("rate limited")]
    RateLimit,
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("value out of range: {0}")]
    Range(String),
}

/// Errors local to the MessagePack codec, before translation into [`McError`].
#[derive(Debug, Error)]
pub enum McpMpError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("out of memory")]
    NoMemory,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<McpMpError> for McError {
    fn from(err: McpMpError) -> Self {
        match err {
            McpMpError::InvalidArgument(msg) => McError::InvalidArgument(msg),
            McpMpError::Parse(msg) => McError::Parse(msg),
            McpMpError::NoMemory => McError::OutOfMemory,
            McpMpError::Io(e) => McError::Io(e),
        }
    }
}

impl From<rmpv::decode::Error> for McpMpError {
    fn from(err: rmpv::decode::Error) -> Self {
        McpMpError::Parse(err.to_string())
    }
}

impl From<rmp::encode::ValueWriteError> for McpMpError {
    fn from(err: rmp::encode::ValueWriteError) -> Self {
        match err {
            rmp::encode::ValueWriteError::InvalidMarkerWrite(e)
            | rmp::encode::ValueWriteError::InvalidDataWrite(e) => McpMpError::Io(e),
        }
    }
}
