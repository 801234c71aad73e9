pub mod store;

pub use store::RestStore;

use kotoba_core::LookupError;

#[derive(Debug, thiserror::Error)]
pub enum RestError {
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Authentication rejected (HTTP {0})")]
    AuthenticationError(u16),

    #[error("API error: HTTP {status}: {body}")]
    ApiError { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

impl From<RestError> for LookupError {
    fn from(e: RestError) -> Self {
        match e {
            RestError::NetworkError(e) if e.is_timeout() => LookupError::Timeout,
            RestError::NetworkError(e) if e.is_connect() => LookupError::Unavailable(e.to_string()),
            e @ (RestError::AuthenticationError(_) | RestError::InvalidConfig(_)) => {
                LookupError::Unavailable(e.to_string())
            }
            e => LookupError::Failed(e.to_string()),
        }
    }
}
