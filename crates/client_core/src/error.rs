use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server responded with status {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Status {
        status: u16,
        message: Option<String>,
    },
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid api base url '{0}'")]
    InvalidBaseUrl(String),
}

impl ClientError {
    pub fn status(status: u16, message: Option<&str>) -> Self {
        Self::Status {
            status,
            message: message.map(str::to_string),
        }
    }

    /// Message supplied by the server in the error body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status {
                message: Some(message),
                ..
            } => Some(message),
            _ => None,
        }
    }

    /// Text to show the operator: the server message when present,
    /// otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message()
            .map(str::to_string)
            .unwrap_or_else(|| fallback.to_string())
    }

    pub fn requires_reauth(&self) -> bool {
        matches!(self, Self::Status { status: 401 | 403, .. })
    }
}

/// Failure of a form submission: either rejected locally before any
/// request, or rejected by the server.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("{message}")]
    Remote {
        message: String,
        #[source]
        source: ClientError,
    },
}

impl FormError {
    /// Per-field messages, sorted by field name, for inline rendering.
    pub fn field_messages(&self) -> Vec<(String, String)> {
        let Self::Validation(errors) = self else {
            return Vec::new();
        };
        let mut messages: Vec<(String, String)> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    let message = error
                        .message
                        .as_ref()
                        .map(|message| message.to_string())
                        .unwrap_or_else(|| format!("{field} is invalid"));
                    (field.to_string(), message)
                })
            })
            .collect();
        messages.sort();
        messages
    }
}
