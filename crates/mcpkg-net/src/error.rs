use thiserror::Error;

/// Errors specific to the network client and downloader, translated into
/// [`mcpkg_core::McError`] at the boundary callers actually see.
#[derive(Debug, Error)]
pub enum NetError {
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error("download queue is full")]
    QueueFull,
    #[error("downloader is shutting down")]
    ShuttingDown,
    #[error("unexpected HTTP status {0}")]
    BadStatus(u16),
    #[error("digest mismatch: expected {expected}, got {actual}")]
    DigestMismatch { expected: String, actual: String },
    #[error("I/O error writing `{path}`: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("a download task panicked or was dropped before completing")]
    WorkerLost,
}

impl From<NetError> for mcpkg_core::McError {
    fn from(err: NetError) -> Self {
        use mcpkg_core::McError;
        match err {
            NetError::ClientBuild(_) | NetError::Request(_) => McError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                err.to_string(),
            )),
            NetError::Timeout(_) => McError::Timeout,
            NetError::QueueFull => McError::RateLimit,
            NetError::ShuttingDown => McError::InvalidState("downloader is shutting down".into()),
            NetError::BadStatus(code) => McError::Protocol(format!("HTTP {code}")),
            NetError::DigestMismatch { .. } => McError::Protocol(err.to_string()),
            NetError::Io { source, .. } => McError::Io(source),
            NetError::WorkerLost => McError::InvalidState(err.to_string()),
        }
    }
}
