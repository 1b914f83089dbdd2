//! Error types for branchboard-client

use thiserror::Error;

use branchboard_core::CoreError;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Could not decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),
}

pub type ClientResult<T> = Result<T, ClientError>;

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        match (error.status(), error.url()) {
            (Some(status), Some(url)) => ClientError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            },
            _ if error.is_decode() => ClientError::Decode {
                url: error.url().map(|u| u.to_string()).unwrap_or_default(),
                message: error.to_string(),
            },
            _ => ClientError::Transport(error.to_string()),
        }
    }
}

impl ClientError {
    /// Convert into a core error attributed to `branch_id`
    pub fn for_branch(self, branch_id: Option<i64>) -> CoreError {
        match self {
            ClientError::Http { status: 404, url } => CoreError::NotFound { resource: url },
            ClientError::Decode { message, .. } => CoreError::InvalidFormat { message },
            ClientError::InvalidConfig(message) => CoreError::ConfigError { message },
            other => CoreError::fetch(branch_id, other.to_string()),
        }
    }
}

impl From<ClientError> for CoreError {
    fn from(error: ClientError) -> Self {
        error.for_branch(None)
    }
}
