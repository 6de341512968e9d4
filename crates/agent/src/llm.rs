use async_trait::async_trait;
use thiserror::Error;

/// A completion backend: prompt in, raw model text out.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, AdvisoryError>;
}

/// Failures of assisted fill. Always advisory: shown next to the form and
/// never turned into a calculation error.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AdvisoryError {
    #[error("assisted fill is not configured: no API key")]
    MissingCredential,
    #[error("describe the object to get suggestions")]
    EmptyDescription,
    #[error("model request failed: {0}")]
    Transport(String),
    #[error("model service answered with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("could not read the model response: {0}")]
    Envelope(String),
    #[error("model returned malformed JSON: {0}")]
    EmbeddedJson(String),
    #[error("model reply does not match the expected schema: {0}")]
    Schema(String),
}

impl AdvisoryError {
    /// Stable machine-readable code for logs and JSON responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingCredential => "missing_credential",
            Self::EmptyDescription => "empty_description",
            Self::Transport(_) => "transport",
            Self::Status { .. } => "upstream_status",
            Self::Envelope(_) => "envelope",
            Self::EmbeddedJson(_) => "embedded_json",
            Self::Schema(_) => "schema",
        }
    }

    /// Whether the failure is on the caller's side rather than upstream.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::MissingCredential | Self::EmptyDescription)
    }
}

#[cfg(test)]
mod tests {
    use super::AdvisoryError;

    #[test]
    fn codes_are_distinct() {
        let errors = [
            AdvisoryError::MissingCredential,
            AdvisoryError::EmptyDescription,
            AdvisoryError::Transport("timeout".to_string()),
            AdvisoryError::Status { status: 500, body: String::new() },
            AdvisoryError::Envelope("no candidates".to_string()),
            AdvisoryError::EmbeddedJson("eof".to_string()),
            AdvisoryError::Schema("array".to_string()),
        ];
        let mut codes: Vec<&str> = errors.iter().map(AdvisoryError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn only_input_and_credential_problems_are_caller_errors() {
        assert!(AdvisoryError::EmptyDescription.is_caller_error());
        assert!(AdvisoryError::MissingCredential.is_caller_error());
        assert!(!AdvisoryError::Status { status: 429, body: "quota".to_string() }.is_caller_error());
    }
}
