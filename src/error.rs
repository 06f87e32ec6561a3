use reqwest::StatusCode;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("{0}")]
    Validation(String),

    #[error("Not logged in")]
    NotAuthenticated,

    #[error("Unauthorized")]
    Unauthorized(Option<String>),

    #[error("Server returned {status}")]
    Api {
        status: StatusCode,
        message: Option<String>,
    },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ClientError {
    /// Text to show the user. Server-provided messages win over `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Validation(msg) => msg.clone(),
            ClientError::Unauthorized(Some(msg)) => msg.clone(),
            ClientError::Api {
                message: Some(msg), ..
            } => msg.clone(),
            ClientError::NotAuthenticated => "Please log in first.".to_string(),
            ClientError::Unauthorized(None)
            | ClientError::Api { message: None, .. }
            | ClientError::Transport(_)
            | ClientError::Json(_)
            | ClientError::Io(_)
            | ClientError::Url(_) => fallback.to_string(),
        }
    }

    /// Whether the error means the session is missing or no longer valid.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            ClientError::NotAuthenticated | ClientError::Unauthorized(_)
        )
    }

    /// Build the error for a non-2xx response from its status and raw body.
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        let message = extract_detail(body);
        if status == StatusCode::UNAUTHORIZED {
            ClientError::Unauthorized(message)
        } else {
            ClientError::Api { status, message }
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<Detail>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Detail {
    Message(String),
    Fields(Vec<FieldError>),
}

#[derive(Deserialize)]
struct FieldError {
    msg: String,
}

/// Pull the message out of a `{"detail": ...}` error body.
fn extract_detail(body: &[u8]) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_slice(body).ok()?;
    match parsed.detail? {
        Detail::Message(msg) if !msg.trim().is_empty() => Some(msg),
        Detail::Message(_) => None,
        Detail::Fields(fields) => fields.into_iter().next().map(|f| f.msg),
    }
}
