//! Attribute access shared by all converters
//!
//! Reading resolves placeholders and tolerates malformed numbers and
//! booleans (logged, default kept). Writing is minimal: an attribute that is
//! absent and would only restate its default is not added, `None` removes
//! the attribute, and an unchanged value is never rewritten.

use crate::converters::ConvertContext;
use crate::error::{ConvertError, ConvertResult};
use crate::options::WritePolicy;
use crate::properties::is_placeholder;
use catalina_model::Secret;
use catalina_xml::Element;
use std::fmt::Display;
use std::str::FromStr;

/// Read view over one element
pub(crate) struct AttrReader<'e, 'c> {
    element: &'e Element,
    cx: &'c ConvertContext<'c>,
}

impl<'e, 'c> AttrReader<'e, 'c> {
    pub(crate) fn new(element: &'e Element, cx: &'c ConvertContext<'c>) -> Self {
        Self { element, cx }
    }

    /// Resolved value, `None` when absent
    pub(crate) fn string(&self, name: &str) -> Option<String> {
        self.element
            .attribute(name)
            .map(|raw| self.cx.properties.resolve(raw).to_owned())
    }

    /// Resolved value of an attribute that must be present
    pub(crate) fn required(&self, name: &str) -> ConvertResult<String> {
        self.string(name)
            .ok_or_else(|| ConvertError::missing_attribute(self.element.name(), name))
    }

    pub(crate) fn secret(&self, name: &str) -> Option<Secret> {
        self.string(name).map(Secret::from)
    }

    /// Parsed value; malformed input is logged and yields `None`
    pub(crate) fn parse<T: FromStr>(&self, name: &str) -> Option<T> {
        let value = self.string(name)?;
        match value.trim().parse() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                tracing::warn!(
                    element = self.element.name(),
                    attribute = name,
                    value = %value,
                    "ignoring malformed attribute value, keeping default"
                );
                None
            }
        }
    }

    /// Boolean in any letter case
    pub(crate) fn flag(&self, name: &str) -> Option<bool> {
        let value = self.string(name)?;
        match value.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => {
                tracing::warn!(
                    element = self.element.name(),
                    attribute = name,
                    value = %value,
                    "ignoring malformed boolean, keeping default"
                );
                None
            }
        }
    }
}

/// Write view over one element
pub(crate) struct AttrWriter<'e, 'c> {
    element: &'e mut Element,
    cx: &'c ConvertContext<'c>,
}

impl<'e, 'c> AttrWriter<'e, 'c> {
    pub(crate) fn new(element: &'e mut Element, cx: &'c ConvertContext<'c>) -> Self {
        Self { element, cx }
    }

    /// Core write rule shared by every typed setter
    fn apply(&mut self, name: &str, value: Option<String>, default: Option<String>, policy: WritePolicy) {
        let Some(value) = value else {
            if self.element.remove_attribute(name).is_some() {
                tracing::debug!(element = self.element.name(), attribute = name, "removed attribute");
            }
            return;
        };
        let Some(live) = self.element.attribute(name) else {
            if default.as_deref() != Some(value.as_str()) {
                self.element.set_attribute(name, value);
            }
            return;
        };
        if live == value {
            return;
        }
        if self.cx.options.effective(policy) == WritePolicy::PreserveExpression
            && is_placeholder(live)
            && self.cx.properties.resolve(live) == value
        {
            return;
        }
        self.element.set_attribute(name, value);
    }

    /// Non-optional value with a default
    pub(crate) fn value<T: Display + PartialEq>(&mut self, name: &str, value: &T, default: &T) {
        self.value_with(name, value, default, WritePolicy::Literal);
    }

    pub(crate) fn value_with<T: Display + PartialEq>(
        &mut self,
        name: &str,
        value: &T,
        default: &T,
        policy: WritePolicy,
    ) {
        self.apply(name, Some(value.to_string()), Some(default.to_string()), policy);
    }

    /// Optional value; `None` removes the attribute
    pub(crate) fn optional_with<T: Display + ?Sized>(
        &mut self,
        name: &str,
        value: Option<&T>,
        default: Option<&T>,
        policy: WritePolicy,
    ) {
        self.apply(
            name,
            value.map(ToString::to_string),
            default.map(ToString::to_string),
            policy,
        );
    }

    /// Optional text without a default
    pub(crate) fn text(&mut self, name: &str, value: Option<&str>) {
        self.apply(name, value.map(str::to_owned), None, WritePolicy::Literal);
    }

    pub(crate) fn text_with(&mut self, name: &str, value: Option<&str>, policy: WritePolicy) {
        self.apply(name, value.map(str::to_owned), None, policy);
    }

    pub(crate) fn secret(&mut self, name: &str, value: Option<&Secret>) {
        self.text(name, value.map(Secret::expose));
    }

    /// Always present, even when it equals the model default
    pub(crate) fn explicit_with<T: Display>(&mut self, name: &str, value: &T, policy: WritePolicy) {
        self.apply(name, Some(value.to_string()), None, policy);
    }

    /// Unconditional literal write
    pub(crate) fn force(&mut self, name: &str, value: &str) {
        if self.element.attribute(name) != Some(value) {
            self.element.set_attribute(name, value);
        }
    }

    pub(crate) fn remove(&mut self, names: &[&str]) {
        for name in names {
            self.element.remove_attribute(name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ReconcileOptions;
    use crate::properties::Properties;

    fn with_cx<R>(options: ReconcileOptions, f: impl FnOnce(&ConvertContext<'_>) -> R) -> R {
        let properties = Properties::new().with("port", "8080").with("flag", "yes");
        let cx = ConvertContext::new(&properties, &options);
        f(&cx)
    }

    #[test]
    fn reader_resolves_and_tolerates_garbage() {
        let element = Element::new("Connector")
            .with_attribute("port", "${port}")
            .with_attribute("maxThreads", "many")
            .with_attribute("secure", "${flag}")
            .with_attribute("SSLEnabled", "TRUE");
        with_cx(ReconcileOptions::default(), |cx| {
            let attrs = AttrReader::new(&element, cx);
            assert_eq!(attrs.parse::<i32>("port"), Some(8080));
            assert_eq!(attrs.parse::<i32>("maxThreads"), None);
            assert_eq!(attrs.flag("secure"), None);
            assert_eq!(attrs.flag("SSLEnabled"), Some(true));
            assert!(matches!(
                attrs.required("address"),
                Err(ConvertError::AttributeNotFound { .. })
            ));
        });
    }

    #[test]
    fn writer_is_minimal() {
        let mut element = Element::new("Host");
        with_cx(ReconcileOptions::default(), |cx| {
            let mut attrs = AttrWriter::new(&mut element, cx);
            attrs.value("autoDeploy", &true, &true);
            attrs.value("unpackWARs", &false, &true);
            attrs.optional_with("appBase", Some("webapps"), Some("webapps"), WritePolicy::Literal);
            attrs.text("workDir", None);
        });
        assert_eq!(element.attributes().len(), 1);
        assert_eq!(element.attribute("unpackWARs"), Some("false"));
    }

    #[test]
    fn writer_keeps_explicit_default_and_removes_none() {
        let mut element = Element::new("Host")
            .with_attribute("autoDeploy", "false")
            .with_attribute("workDir", "work");
        with_cx(ReconcileOptions::default(), |cx| {
            let mut attrs = AttrWriter::new(&mut element, cx);
            attrs.value("autoDeploy", &true, &true);
            attrs.text("workDir", None);
        });
        assert_eq!(element.attribute("autoDeploy"), Some("true"));
        assert!(!element.has_attribute("workDir"));
    }

    #[test]
    fn placeholder_preserved_only_when_requested() {
        let mut element = Element::new("Connector")
            .with_attribute("port", "${port}")
            .with_attribute("redirectPort", "${port}");
        with_cx(ReconcileOptions::default(), |cx| {
            let mut attrs = AttrWriter::new(&mut element, cx);
            attrs.value_with("port", &8080, &0, WritePolicy::PreserveExpression);
            attrs.value("redirectPort", &8080, &8443);
        });
        assert_eq!(element.attribute("port"), Some("${port}"));
        assert_eq!(element.attribute("redirectPort"), Some("8080"));
    }

    #[test]
    fn placeholder_replaced_when_value_differs_or_disabled() {
        let mut element = Element::new("Connector").with_attribute("port", "${port}");
        with_cx(ReconcileOptions::default(), |cx| {
            AttrWriter::new(&mut element, cx).value_with("port", &9090, &0, WritePolicy::PreserveExpression);
        });
        assert_eq!(element.attribute("port"), Some("9090"));

        let mut element = Element::new("Connector").with_attribute("port", "${port}");
        let options = ReconcileOptions::default().with_preserve_expressions(false);
        with_cx(options, |cx| {
            AttrWriter::new(&mut element, cx).value_with("port", &8080, &0, WritePolicy::PreserveExpression);
        });
        assert_eq!(element.attribute("port"), Some("8080"));
    }
}
