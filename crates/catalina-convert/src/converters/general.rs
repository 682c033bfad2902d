//! `<Server>` attributes and singleton listeners

use super::listener::{AprListenerConverter, JmxListenerConverter};
use super::{ConvertContext, ElementConverter};
use crate::attributes::{AttrReader, AttrWriter};
use crate::error::ConvertResult;
use crate::merge::MergeOutcome;
use crate::options::WritePolicy;
use catalina_model::{GeneralConfig, ServerProperties, DEFAULT_SHUTDOWN_COMMAND, DEFAULT_SHUTDOWN_PORT};
use catalina_xml::Element;

#[derive(Debug, Clone, Copy, Default)]
pub struct GeneralConfigConverter;

impl ElementConverter for GeneralConfigConverter {
    type Node = GeneralConfig;

    fn read(&self, server: &Element, cx: &ConvertContext<'_>) -> ConvertResult<GeneralConfig> {
        let attrs = AttrReader::new(server, cx);
        let mut general = GeneralConfig::default();
        let properties: &mut ServerProperties = &mut general.server;
        if let Some(port) = attrs.parse("port") {
            properties.port = Some(port);
        }
        if let Some(shutdown) = attrs.string("shutdown") {
            properties.shutdown = Some(shutdown);
        }
        properties.address = attrs.string("address");
        general.jmx_listener = JmxListenerConverter.read(server, cx)?;
        general.apr_lifecycle_listener = AprListenerConverter.read(server, cx)?;
        Ok(general)
    }

    fn write(
        &self,
        server: &mut Element,
        general: &GeneralConfig,
        cx: &ConvertContext<'_>,
    ) -> ConvertResult<MergeOutcome> {
        let preserve = WritePolicy::PreserveExpression;
        let props = &general.server;
        let mut attrs = AttrWriter::new(server, cx);
        attrs.optional_with("port", props.port.as_ref(), Some(&DEFAULT_SHUTDOWN_PORT), preserve);
        attrs.optional_with(
            "shutdown",
            props.shutdown.as_deref(),
            Some(DEFAULT_SHUTDOWN_COMMAND),
            preserve,
        );
        attrs.text_with("address", props.address.as_deref(), preserve);

        let mut outcome = JmxListenerConverter.write(server, &general.jmx_listener, cx)?;
        outcome += AprListenerConverter.write(server, &general.apr_lifecycle_listener, cx)?;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ReconcileOptions;
    use crate::properties::Properties;
    use catalina_xml::Document;

    #[test]
    fn server_placeholders_survive_unchanged_write() {
        let properties = Properties::new().with("shutdown.port", "8005");
        let options = ReconcileOptions::default();
        let cx = ConvertContext::new(&properties, &options);
        let mut doc =
            Document::parse(r#"<Server port="${shutdown.port}" shutdown="SHUTDOWN"/>"#).unwrap();

        let general = GeneralConfigConverter.read(doc.root(), &cx).unwrap();
        assert_eq!(general.server.port, Some(8005));
        GeneralConfigConverter.write(doc.root_mut(), &general, &cx).unwrap();
        assert_eq!(doc.root().attribute("port"), Some("${shutdown.port}"));
    }

    #[test]
    fn missing_attributes_keep_defaults() {
        let properties = Properties::new();
        let options = ReconcileOptions::default();
        let cx = ConvertContext::new(&properties, &options);
        let doc = Document::parse(r#"<Server port="x"/>"#).unwrap();
        let general = GeneralConfigConverter.read(doc.root(), &cx).unwrap();
        assert_eq!(general, GeneralConfig::default());
    }
}
