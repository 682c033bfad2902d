//! Error types for profile marshalling

/// Errors raised by [`ProfileMarshaller`](crate::ProfileMarshaller)
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    /// Input is not JSON, or JSON that does not map onto a profile
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The derived schema could not be compiled
    #[error("schema compilation failed: {0}")]
    SchemaCompilation(String),

    /// A document violates the profile schema
    #[error("schema validation failed: {}", .0.join("; "))]
    SchemaValidation(Vec<String>),
}

/// Result alias for profile operations
pub type ProfileResult<T> = Result<T, ProfileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_are_joined() {
        let err = ProfileError::SchemaValidation(vec!["/name: bad".into(), "/settings: worse".into()]);
        assert_eq!(err.to_string(), "schema validation failed: /name: bad; /settings: worse");
    }
}
