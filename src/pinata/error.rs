use thiserror::Error;

/// Broad category of a failure, used by callers to decide between aborting and retrying
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Input couldn't be turned into something uploadable
    Encoding,
    /// The pinning service rejected the credential
    Authentication,
    /// The pinning service couldn't be reached
    Network,
    /// The pinning service answered, but not with a usable result
    Service,
}

/// Errors that can occur when talking to Pinata
#[derive(Debug, Error)]
pub enum PinError {
    /// HTTP request failed before a response arrived
    #[error("request to pinning service failed: {0}")]
    RequestFailed(String),

    /// Response body couldn't be used
    #[error("pinning service response couldn't be parsed: {0}")]
    ResponseParseFailed(String),

    /// Upload body couldn't be built
    #[error("upload couldn't be prepared: {0}")]
    InvalidUpload(String),

    #[error("pinning service rejected the credential (status {status})")]
    Unauthorized { status: u16 },

    #[error("pinning service rate limit reached")]
    RateLimited,

    #[error("pinning service error (status {status}): {message}")]
    ApiError { status: u16, message: String },
}

impl PinError {
    pub fn kind(&self) -> FailureKind {
        match self {
            PinError::RequestFailed(_) => FailureKind::Network,
            PinError::InvalidUpload(_) => FailureKind::Encoding,
            PinError::Unauthorized { .. } => FailureKind::Authentication,
            PinError::ResponseParseFailed(_)
            | PinError::RateLimited
            | PinError::ApiError { .. } => FailureKind::Service,
        }
    }
}
