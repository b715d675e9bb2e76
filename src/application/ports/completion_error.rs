#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    /// A single attempt exceeded the configured deadline.
    #[error("completion attempt timed out after {0} ms")]
    Timeout(u64),
    /// The backend answered with a non-success status.
    #[error("backend returned HTTP {status}: {body}")]
    UpstreamStatus { status: u16, body: String },
    /// The request never got a response (connection refused, DNS, ...).
    #[error("request failed: {0}")]
    RequestFailed(String),
    /// The backend answered 2xx but the body did not match the expected
    /// shape. A contract break, not a transient failure.
    #[error("malformed backend response: {0}")]
    MalformedResponse(String),
    /// The caller aborted the call. Never retried, never a user-facing error.
    #[error("completion cancelled")]
    Cancelled,
}

impl CompletionError {
    /// Only timeouts and server-side errors are worth another attempt;
    /// everything else indicates a problem a retry cannot fix.
    pub fn is_retryable(&self) -> bool {
        match self {
            CompletionError::Timeout(_) => true,
            CompletionError::UpstreamStatus { status, .. } => *status >= 500,
            CompletionError::RequestFailed(_)
            | CompletionError::MalformedResponse(_)
            | CompletionError::Cancelled => false,
        }
    }
}
