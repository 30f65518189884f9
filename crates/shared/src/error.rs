use serde::{Deserialize, Serialize};

/// Error body returned by the admin API on non-2xx responses.
///
/// Validation failures carry a list of messages, everything else a single
/// string; both shapes are accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<ApiErrorMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiErrorMessage {
    Single(String),
    Many(Vec<String>),
}

impl ApiErrorBody {
    /// Human-readable server message, if the body carried a non-empty one.
    pub fn message(&self) -> Option<String> {
        let text = match self.message.as_ref()? {
            ApiErrorMessage::Single(text) => text.trim().to_string(),
            ApiErrorMessage::Many(lines) => lines
                .iter()
                .map(|line| line.trim())
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join("; "),
        };
        (!text.is_empty()).then_some(text)
    }
}
