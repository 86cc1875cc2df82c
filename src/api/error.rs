use reqwest::StatusCode;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No response arrived: connection, DNS, timeout, or a malformed request.
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    /// The request url could not be resolved against the api base url.
    #[error("invalid request url: {0}")]
    InvalidUrl(#[source] url::ParseError),
    /// The backend answered with a non-2xx status.
    #[error("server responded with {status}")]
    Http {
        status: StatusCode,
        message: Option<String>,
        body: Value,
    },
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Transport(err) => err.status(),
            ApiError::Http { status, .. } => Some(*status),
            ApiError::InvalidUrl(_) => None,
        }
    }

    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Http { message, .. } => message.as_deref(),
            ApiError::Transport(_) | ApiError::InvalidUrl(_) => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    pub fn is_forbidden(&self) -> bool {
        self.status() == Some(StatusCode::FORBIDDEN)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Transport(err) if err.is_timeout())
    }
}
