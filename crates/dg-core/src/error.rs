use crate::types::SourceSpan;
use thiserror::Error;

/// Coarse classification of error codes, used by callers that only care
/// about which stage failed and whether the failure is recoverable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Parse,
    StructuralLowering,
    UnknownConstruct,
    ChatNotFound,
    LogSink,
    Engine,
    Cli,
}

#[derive(Debug, Error, Clone)]
#[error("{code}: {message}")]
pub struct DialogicError {
    pub code: String,
    pub message: String,
    pub span: Option<SourceSpan>,
}

impl DialogicError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            span: None,
        }
    }

    pub fn with_span(
        code: impl Into<String>,
        message: impl Into<String>,
        span: SourceSpan,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            span: Some(span),
        }
    }

    pub fn chat_not_found(name: &str) -> Self {
        Self::new("CHAT_NOT_FOUND", format!("Chat \"{}\" not found.", name))
    }

    pub fn kind(&self) -> ErrorKind {
        let code = self.code.as_str();
        match code {
            "CHAT_NOT_FOUND" => ErrorKind::ChatNotFound,
            "LOWER_UNKNOWN_CONSTRUCT" => ErrorKind::UnknownConstruct,
            "LOG_SINK_ERROR" => ErrorKind::LogSink,
            _ if code.starts_with("LOWER_") => ErrorKind::StructuralLowering,
            _ if code.starts_with("ENGINE_") => ErrorKind::Engine,
            _ if code.starts_with("CLI_") => ErrorKind::Cli,
            _ => ErrorKind::Parse,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        self.kind() == ErrorKind::LogSink
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_classifies_codes_by_stage() {
        assert_eq!(
            DialogicError::chat_not_found("x").kind(),
            ErrorKind::ChatNotFound
        );
        assert_eq!(
            DialogicError::new("LOWER_ARITY_MISMATCH", "m").kind(),
            ErrorKind::StructuralLowering
        );
        assert_eq!(
            DialogicError::new("LOWER_UNKNOWN_CONSTRUCT", "m").kind(),
            ErrorKind::UnknownConstruct
        );
        assert_eq!(
            DialogicError::new("ENGINE_STEP_LIMIT", "m").kind(),
            ErrorKind::Engine
        );
        assert_eq!(
            DialogicError::new("XML_PARSE_ERROR", "m").kind(),
            ErrorKind::Parse
        );
    }

    #[test]
    fn only_log_sink_errors_are_recoverable() {
        assert!(DialogicError::new("LOG_SINK_ERROR", "disk full").is_recoverable());
        assert!(!DialogicError::chat_not_found("intro").is_recoverable());
    }

    #[test]
    fn display_joins_code_and_message() {
        let error = DialogicError::chat_not_found("intro");
        assert_eq!(error.to_string(), "CHAT_NOT_FOUND: Chat \"intro\" not found.");
    }
}
