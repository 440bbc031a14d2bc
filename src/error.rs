use std::io;

/// Custom error type for chat_trigger_hook operations
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    #[error("Issue with {0} Header: No value found in HEADER for the key: {0}")]
    MissingHeader(String),

    #[error("Content-Type is not supported: {0}")]
    UnsupportedContentType(String),

    #[error("Missing required parameter: '{0}'")]
    MissingParameter(String),

    #[error("Missing branch parameter!")]
    MissingBranch,

    /// Extraction failure surfaced through the hook provider; the inner message is kept verbatim.
    #[error("Failed to parse the request/message: {0}")]
    MessageParse(#[source] Box<HookError>),

    #[error("Trigger API error: {0}")]
    TriggerApi(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl HookError {
    /// Wraps a message extraction error the way the hook provider reports it.
    pub fn message_parse(inner: HookError) -> Self {
        HookError::MessageParse(Box::new(inner))
    }
}

/// Helper type for Results that use HookError
pub type Result<T> = std::result::Result<T, HookError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_content_type_message() {
        let err = HookError::MissingHeader("Content-Type".to_string());
        assert_eq!(
            err.to_string(),
            "Issue with Content-Type Header: No value found in HEADER for the key: Content-Type"
        );
    }

    #[test]
    fn message_parse_keeps_inner_message() {
        let err = HookError::message_parse(HookError::MissingParameter("text".to_string()));
        assert_eq!(
            err.to_string(),
            "Failed to parse the request/message: Missing required parameter: 'text'"
        );
    }
}
