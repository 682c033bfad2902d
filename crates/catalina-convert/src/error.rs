//! Error types for conversion and reconciliation
//!
//! - Structural problems in a document abort the read of a subtree
//! - Invalid desired state is reported before any write happens

use catalina_model::ValidationErrors;
use catalina_xml::XmlError;

/// Errors raised by element converters
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// A required attribute is absent
    #[error("<{element}> is missing required attribute '{attribute}'")]
    AttributeNotFound { element: String, attribute: String },

    /// A required element is absent
    #[error("<{parent}> has no <{element}> element")]
    ElementNotFound { element: String, parent: String },

    /// A singleton child occurs the wrong number of times
    #[error("<{parent}> must contain exactly one <{element}>, found {found}")]
    ElementCardinality {
        element: String,
        parent: String,
        found: usize,
    },

    /// Element the engine does not manage
    #[error("<{element}> uses unsupported protocol '{protocol}'")]
    UnsupportedProtocol { element: String, protocol: String },

    /// Options could not be loaded
    #[error("invalid options: {0}")]
    Config(#[from] toml::de::Error),

    /// Underlying document error
    #[error("xml error: {0}")]
    Xml(#[from] XmlError),
}

impl ConvertError {
    /// Missing attribute on an element
    pub fn missing_attribute(element: &str, attribute: &str) -> Self {
        Self::AttributeNotFound {
            element: element.to_owned(),
            attribute: attribute.to_owned(),
        }
    }

    /// Missing child element
    pub fn missing_element(element: &str, parent: &str) -> Self {
        Self::ElementNotFound {
            element: element.to_owned(),
            parent: parent.to_owned(),
        }
    }

    /// Check if the error stems from the document structure rather than
    /// from configuration
    #[inline]
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::AttributeNotFound { .. }
                | Self::ElementNotFound { .. }
                | Self::ElementCardinality { .. }
        )
    }
}

/// Result alias for converter operations
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Errors raised by [`Reconciler::reconcile`](crate::Reconciler::reconcile)
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// Desired state failed validation; nothing was written
    #[error("desired settings are invalid: {0}")]
    Invalid(ValidationErrors),

    /// Conversion failed
    #[error(transparent)]
    Convert(#[from] ConvertError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_not_found_display() {
        let err = ConvertError::missing_attribute("Connector", "port");
        assert_eq!(err.to_string(), "<Connector> is missing required attribute 'port'");
        assert!(err.is_structural());
    }

    #[test]
    fn cardinality_display() {
        let err = ConvertError::ElementCardinality {
            element: "Engine".into(),
            parent: "Service".into(),
            found: 2,
        };
        assert_eq!(err.to_string(), "<Service> must contain exactly one <Engine>, found 2");
    }

    #[test]
    fn config_error_is_not_structural() {
        let toml_err = toml::from_str::<toml::Value>("= broken").unwrap_err();
        assert!(!ConvertError::from(toml_err).is_structural());
    }
}
