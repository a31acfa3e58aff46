#[derive(Debug, thiserror::Error)]
pub enum ExpandError {
    #[error("scenario request must not be empty")]
    EmptyRequest,
    #[error("no API key configured (set CLAUDE_API_KEY or ANTHROPIC_API_KEY)")]
    MissingApiKey,
    #[error("failed to parse scenarios from model response: {message}")]
    Parse { message: String },
    #[error("model request failed: {message}")]
    Transport { message: String },
    #[error("model did not respond within {secs}s")]
    Timeout { secs: u64 },
}

#[cfg(test)]
mod tests {
    use super::ExpandError;

    #[test]
    fn timeout_error_names_the_limit() {
        assert_eq!(
            ExpandError::Timeout { secs: 90 }.to_string(),
            "model did not respond within 90s"
        );
    }

    #[test]
    fn parse_error_formats_message() {
        let err = ExpandError::Parse {
            message: "missing scenarios array".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to parse scenarios from model response: missing scenarios array"
        );
    }

    #[test]
    fn missing_key_error_names_env_vars() {
        let text = ExpandError::MissingApiKey.to_string();
        assert!(text.contains("CLAUDE_API_KEY"));
        assert!(text.contains("ANTHROPIC_API_KEY"));
    }
}
