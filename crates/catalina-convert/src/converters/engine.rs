//! The single `<Engine>` of a service

use super::access_log::AccessLogConverter;
use super::host::HostConverter;
use super::names::HOST;
use super::thread_diagnostics::ThreadDiagnosticsConverter;
use super::{ConvertContext, ElementConverter};
use crate::attributes::{AttrReader, AttrWriter};
use crate::error::ConvertResult;
use crate::merge::{merge, MergeOutcome};
use crate::options::WritePolicy;
use catalina_model::{Engine, EngineScope};
use catalina_xml::Element;

#[derive(Debug, Clone, Copy, Default)]
pub struct EngineConverter;

impl EngineConverter {
    const LOGGING: AccessLogConverter<EngineScope> = AccessLogConverter::new();
}

impl ElementConverter for EngineConverter {
    type Node = Engine;

    fn read(&self, element: &Element, cx: &ConvertContext<'_>) -> ConvertResult<Engine> {
        let attrs = AttrReader::new(element, cx);
        let mut engine = Engine::new(attrs.required("name")?);
        engine.default_host = Some(attrs.required("defaultHost")?);
        engine.jvm_route = attrs.string("jvmRoute");
        engine.hosts = element
            .child_elements()
            .filter(|child| child.name() == HOST)
            .map(|child| HostConverter.read(child, cx))
            .collect::<ConvertResult<_>>()?;
        engine.logging = Self::LOGGING.read(element, cx)?;
        engine.thread_diagnostics = ThreadDiagnosticsConverter.read(element, cx)?;
        Ok(engine)
    }

    fn write(&self, element: &mut Element, engine: &Engine, cx: &ConvertContext<'_>) -> ConvertResult<MergeOutcome> {
        let preserve = WritePolicy::PreserveExpression;
        let mut attrs = AttrWriter::new(element, cx);
        attrs.text_with("name", engine.name.as_deref(), preserve);
        attrs.text_with("defaultHost", engine.default_host.as_deref(), preserve);
        attrs.text_with("jvmRoute", engine.jvm_route.as_deref(), preserve);

        let mut outcome = merge(&HostConverter, element, &engine.hosts, cx)?;
        outcome += Self::LOGGING.write(element, &engine.logging, cx)?;
        outcome += ThreadDiagnosticsConverter.write(element, &engine.thread_diagnostics, cx)?;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConvertError;
    use crate::options::ReconcileOptions;
    use crate::properties::Properties;
    use catalina_model::Host;
    use catalina_xml::Document;
    use pretty_assertions::assert_eq;

    const ENGINE: &str = r#"<Engine name="Catalina" defaultHost="localhost">
  <Realm className="org.apache.catalina.realm.LockOutRealm"/>
  <Host name="localhost" appBase="webapps"/>
  <Host name="old"/>
</Engine>"#;

    #[test]
    fn default_host_is_required() {
        let (properties, options) = (Properties::new(), ReconcileOptions::default());
        let cx = ConvertContext::new(&properties, &options);
        let element = Element::new("Engine").with_attribute("name", "Catalina");
        assert!(matches!(
            EngineConverter.read(&element, &cx),
            Err(ConvertError::AttributeNotFound { attribute, .. }) if attribute == "defaultHost"
        ));
    }

    #[test]
    fn hosts_merge_around_unmanaged_children() {
        let (properties, options) = (Properties::new(), ReconcileOptions::default());
        let cx = ConvertContext::new(&properties, &options);
        let mut doc = Document::parse(ENGINE).unwrap();
        let mut engine = EngineConverter.read(doc.root(), &cx).unwrap();
        assert_eq!(engine.hosts.len(), 2);

        engine.hosts.retain(|h| h.name.as_deref() == Some("localhost"));
        engine.hosts.push(Host::new("new"));
        let outcome = EngineConverter.write(doc.root_mut(), &engine, &cx).unwrap();
        assert_eq!((outcome.updated, outcome.created, outcome.removed), (1, 1, 1));
        assert_eq!(
            doc.to_xml_string().unwrap(),
            r#"<Engine name="Catalina" defaultHost="localhost">
  <Realm className="org.apache.catalina.realm.LockOutRealm"/>
  <Host name="localhost" appBase="webapps"/>
  <Host name="new"/>
</Engine>"#
        );
    }
}
