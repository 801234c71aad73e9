/// Failure of a single store call
#[derive(Debug, Clone, thiserror::Error)]
pub enum LookupError {
    #[error("Lookup timed out")]
    Timeout,

    #[error("Lookup failed: {0}")]
    Failed(String),

    /// The store cannot serve any request (auth rejected, connection refused)
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl LookupError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, LookupError::Timeout)
    }
}

/// Whole-batch failure surfaced to the caller of `resolve_batch`
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Store unavailable after {failed} failed lookups: {reason}")]
    StoreUnavailable { failed: usize, reason: String },

    #[error("Lookup worker panicked: {0}")]
    WorkerPanicked(String),

    #[error("Invalid resolver config: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<serde_json::Error> for LoadError {
    fn from(e: serde_json::Error) -> Self {
        LoadError::ParseError(e.to_string())
    }
}
