//! Error types for the XML document model

/// Errors raised while parsing or writing a [`Document`](crate::Document)
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    /// Malformed markup reported by the underlying reader
    #[error("syntax error at byte {position}: {message}")]
    Syntax { position: u64, message: String },

    /// Input contained no element at all
    #[error("document has no root element")]
    MissingRoot,

    /// A second top-level element followed the root
    #[error("unexpected second root element <{0}>")]
    MultipleRoots(String),

    /// Input ended while an element was still open
    #[error("element <{0}> is never closed")]
    Unclosed(String),

    /// Closing tag with no open element
    #[error("closing tag </{0}> has no matching start tag")]
    UnbalancedEnd(String),

    /// Names or raw content that are not valid UTF-8
    #[error("invalid utf-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    /// Serialization failure
    #[error("write failed: {0}")]
    Write(String),
}

impl XmlError {
    /// Create syntax error at a byte offset
    pub fn syntax(position: u64, message: impl Into<String>) -> Self {
        Self::Syntax {
            position,
            message: message.into(),
        }
    }
}

/// Result alias for XML operations
pub type XmlResult<T> = Result<T, XmlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_display() {
        let err = XmlError::syntax(42, "unexpected token");
        assert_eq!(err.to_string(), "syntax error at byte 42: unexpected token");
    }

    #[test]
    fn unclosed_display() {
        let err = XmlError::Unclosed("Service".to_string());
        assert_eq!(err.to_string(), "element <Service> is never closed");
    }
}
