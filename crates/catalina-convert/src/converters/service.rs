//! `<Service>` elements of the server

use super::connector::ConnectorConverter;
use super::engine::EngineConverter;
use super::names::{CONNECTOR, ENGINE, SERVICE};
use super::{ConvertContext, ElementConverter};
use crate::attributes::{AttrReader, AttrWriter};
use crate::error::{ConvertError, ConvertResult};
use crate::merge::{merge, MergeOutcome, MergeTarget};
use crate::options::WritePolicy;
use catalina_model::{Identity, Service};
use catalina_xml::Element;

#[derive(Debug, Clone, Copy, Default)]
pub struct ServiceConverter;

impl ServiceConverter {
    fn cardinality(service: &Element, found: usize) -> ConvertError {
        ConvertError::ElementCardinality {
            element: ENGINE.to_owned(),
            parent: format!("{SERVICE} name=\"{}\"", service.attribute("name").unwrap_or_default()),
            found,
        }
    }

    /// Index of the single engine, creating one when there is none
    fn engine_index(service: &mut Element) -> ConvertResult<(usize, MergeOutcome)> {
        match service.element_indices(ENGINE).as_slice() {
            [index] => Ok((*index, MergeOutcome::default())),
            [] => {
                let index = service.append_element(Element::new(ENGINE));
                tracing::debug!(service = service.attribute("name"), "created missing engine");
                Ok((index, MergeOutcome::created()))
            }
            many => Err(Self::cardinality(service, many.len())),
        }
    }
}

impl ElementConverter for ServiceConverter {
    type Node = Service;

    fn read(&self, element: &Element, cx: &ConvertContext<'_>) -> ConvertResult<Service> {
        let attrs = AttrReader::new(element, cx);
        let name = attrs.required("name")?;
        let engines: Vec<&Element> = element.child_elements().filter(|c| c.name() == ENGINE).collect();
        let [engine] = engines.as_slice() else {
            return Err(Self::cardinality(element, engines.len()));
        };
        let mut service = Service::new(name);
        service.engine = EngineConverter.read(engine, cx)?;
        for child in element.child_elements().filter(|c| c.name() == CONNECTOR) {
            if let Some(connector) = ConnectorConverter.read_owned(child, cx)? {
                service.connectors.push(connector);
            }
        }
        Ok(service)
    }

    fn write(&self, element: &mut Element, service: &Service, cx: &ConvertContext<'_>) -> ConvertResult<MergeOutcome> {
        AttrWriter::new(element, cx).text_with("name", service.name.as_deref(), WritePolicy::PreserveExpression);

        let (index, mut outcome) = Self::engine_index(element)?;
        let engine = element
            .element_at_mut(index)
            .ok_or_else(|| ConvertError::missing_element(ENGINE, SERVICE))?;
        outcome += EngineConverter.write(engine, &service.engine, cx)?;
        outcome += merge(&ConnectorConverter, element, &service.connectors, cx)?;
        Ok(outcome)
    }
}

impl MergeTarget for ServiceConverter {
    type Item = Service;

    fn tag(&self) -> &'static str {
        SERVICE
    }

    fn item_key(&self, item: &Service) -> String {
        item.identity_key()
    }

    fn element_key(&self, element: &Element, cx: &ConvertContext<'_>) -> String {
        AttrReader::new(element, cx).string("name").unwrap_or_default()
    }

    fn is_owned(&self, _element: &Element, _cx: &ConvertContext<'_>) -> bool {
        true
    }

    fn create(&self, _item: &Service, _cx: &ConvertContext<'_>) -> Element {
        Element::new(SERVICE)
    }

    fn update(&self, element: &mut Element, item: &Service, cx: &ConvertContext<'_>) -> ConvertResult<MergeOutcome> {
        self.write(element, item, cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ReconcileOptions;
    use crate::properties::Properties;
    use catalina_model::{Connector, Engine, Host, HttpConnector};
    use catalina_xml::Document;
    use pretty_assertions::assert_eq;

    fn cx_parts() -> (Properties, ReconcileOptions) {
        (Properties::new(), ReconcileOptions::default())
    }

    #[test]
    fn two_engines_is_a_cardinality_error() {
        let (properties, options) = cx_parts();
        let cx = ConvertContext::new(&properties, &options);
        let doc = Document::parse(
            r#"<Service name="Catalina"><Engine name="a" defaultHost="x"/><Engine name="b" defaultHost="x"/></Service>"#,
        )
        .unwrap();
        assert!(matches!(
            ServiceConverter.read(doc.root(), &cx),
            Err(ConvertError::ElementCardinality { found: 2, .. })
        ));
    }

    #[test]
    fn missing_engine_fails_read_but_is_created_on_write() {
        let (properties, options) = cx_parts();
        let cx = ConvertContext::new(&properties, &options);
        let mut doc = Document::parse("<Service name=\"Catalina\">\n</Service>").unwrap();
        assert!(matches!(
            ServiceConverter.read(doc.root(), &cx),
            Err(ConvertError::ElementCardinality { found: 0, .. })
        ));

        let service = Service::new("Catalina")
            .with_engine(Engine::new("Catalina").with_host(Host::new("localhost")))
            .with_connector(Connector::Http(HttpConnector::new(8080)));
        let outcome = ServiceConverter.write(doc.root_mut(), &service, &cx).unwrap();
        assert_eq!(outcome.created, 3);
        assert_eq!(ServiceConverter.read(doc.root(), &cx).unwrap(), service);
    }

    #[test]
    fn foreign_connectors_are_skipped_and_kept() {
        let (properties, options) = cx_parts();
        let cx = ConvertContext::new(&properties, &options);
        let input = r#"<Service name="Catalina">
  <Connector port="9000" protocol="com.example.Custom"/>
  <Connector port="8080" protocol="HTTP/1.1" connectionTimeout="20000" redirectPort="8443"/>
  <Engine name="Catalina" defaultHost="localhost">
    <Host name="localhost"/>
  </Engine>
</Service>"#;
        let mut doc = Document::parse(input).unwrap();
        let mut service = ServiceConverter.read(doc.root(), &cx).unwrap();
        assert_eq!(service.connectors.len(), 1);

        service.connectors.clear();
        let outcome = ServiceConverter.write(doc.root_mut(), &service, &cx).unwrap();
        assert_eq!((outcome.removed, outcome.foreign), (1, 1));
        assert_eq!(doc.root().element_indices(CONNECTOR).len(), 1);
        assert_eq!(
            doc.root().first_child(CONNECTOR).and_then(|c| c.attribute("port")),
            Some("9000")
        );
    }
}
