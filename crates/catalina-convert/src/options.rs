//! Reconciliation options

use crate::error::ConvertResult;
use catalina_model::{AjpProtocol, HttpProtocol};
use serde::{Deserialize, Serialize};

/// How attribute values are written back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePolicy {
    /// Keep a live `${key}` placeholder that still resolves to the value
    PreserveExpression,
    /// Always write the literal value
    Literal,
}

/// Knobs for reading and writing documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconcileOptions {
    /// Keep placeholders on override-preserving attributes
    pub preserve_expressions: bool,
    /// Implementation behind the generic `HTTP/1.1` token
    pub http_protocol: HttpProtocol,
    /// Implementation behind the generic `AJP/1.3` token
    pub ajp_protocol: AjpProtocol,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            preserve_expressions: true,
            http_protocol: HttpProtocol::Nio,
            ajp_protocol: AjpProtocol::Nio,
        }
    }
}

impl ReconcileOptions {
    /// Load options from TOML; missing keys keep their defaults
    ///
    /// # Errors
    /// Returns [`ConvertError::Config`](crate::ConvertError::Config) for
    /// malformed TOML or unknown keys.
    pub fn from_toml(text: &str) -> ConvertResult<Self> {
        Ok(toml::from_str(text)?)
    }

    #[must_use]
    pub fn with_preserve_expressions(mut self, preserve: bool) -> Self {
        self.preserve_expressions = preserve;
        self
    }

    #[must_use]
    pub fn with_http_protocol(mut self, protocol: HttpProtocol) -> Self {
        self.http_protocol = protocol;
        self
    }

    #[must_use]
    pub fn with_ajp_protocol(mut self, protocol: AjpProtocol) -> Self {
        self.ajp_protocol = protocol;
        self
    }

    /// Policy actually applied for an attribute declared with `requested`
    #[inline]
    #[must_use]
    pub fn effective(&self, requested: WritePolicy) -> WritePolicy {
        if self.preserve_expressions {
            requested
        } else {
            WritePolicy::Literal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = ReconcileOptions::default();
        assert!(options.preserve_expressions);
        assert_eq!(options.http_protocol, HttpProtocol::Nio);
        assert_eq!(options.ajp_protocol, AjpProtocol::Nio);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let options = ReconcileOptions::from_toml("http_protocol = \"nio2\"\n").unwrap();
        assert_eq!(options.http_protocol, HttpProtocol::Nio2);
        assert!(options.preserve_expressions);
    }

    #[test]
    fn unknown_keys_rejected() {
        assert!(ReconcileOptions::from_toml("colour = \"blue\"").is_err());
    }

    #[test]
    fn literal_policy_when_preservation_disabled() {
        let options = ReconcileOptions::default().with_preserve_expressions(false);
        assert_eq!(options.effective(WritePolicy::PreserveExpression), WritePolicy::Literal);
        let options = options.with_preserve_expressions(true);
        assert_eq!(
            options.effective(WritePolicy::PreserveExpression),
            WritePolicy::PreserveExpression
        );
    }
}
