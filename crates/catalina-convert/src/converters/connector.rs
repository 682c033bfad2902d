//! `<Connector>` elements
//!
//! Only connectors whose protocol resolves to a known HTTP or AJP
//! implementation are owned; anything else is foreign and never read or
//! modified.

use super::names::CONNECTOR;
use super::{ConvertContext, ElementConverter};
use crate::attributes::{AttrReader, AttrWriter};
use crate::error::{ConvertError, ConvertResult};
use crate::merge::{MergeOutcome, MergeTarget};
use crate::options::WritePolicy;
use catalina_model::{
    connector_key, AjpConnector, Connector, ConnectorCommon, HttpConnector, Identity, ProtocolKind,
};
use catalina_xml::Element;

const HTTP_ONLY: &[&str] = &[
    "acceptCount",
    "algorithm",
    "keyAlias",
    "keystoreFile",
    "keystorePass",
    "keystoreType",
    "maxKeepAliveRequests",
    "secure",
    "SSLEnabled",
];
const AJP_ONLY: &[&str] = &["secret", "secretRequired"];

#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectorConverter;

impl ConnectorConverter {
    /// Protocol of a live element under the configured defaults
    #[must_use]
    pub fn classify(element: &Element, cx: &ConvertContext<'_>) -> Option<ProtocolKind> {
        let raw = element.attribute("protocol").map(|p| cx.properties.resolve(p));
        ProtocolKind::classify(raw, cx.options.http_protocol, cx.options.ajp_protocol)
    }

    /// Read an element if the engine owns it
    ///
    /// # Errors
    /// Fails when an owned connector has no `port`.
    pub fn read_owned(
        &self,
        element: &Element,
        cx: &ConvertContext<'_>,
    ) -> ConvertResult<Option<Connector>> {
        match self.read(element, cx) {
            Ok(connector) => Ok(Some(connector)),
            Err(ConvertError::UnsupportedProtocol { protocol, .. }) => {
                tracing::debug!(protocol = %protocol, "skipping foreign connector");
                Ok(None)
            }
            Err(other) => Err(other),
        }
    }

    fn read_common(attrs: &AttrReader<'_, '_>) -> ConvertResult<ConnectorCommon> {
        attrs.required("port")?;
        let mut common = ConnectorCommon::default();
        common.port = attrs.parse("port");
        common.address = attrs.string("address");
        common.connection_timeout = attrs.parse("connectionTimeout").unwrap_or(common.connection_timeout);
        common.max_threads = attrs.parse("maxThreads").unwrap_or(common.max_threads);
        common.proxy_name = attrs.string("proxyName");
        common.proxy_port = attrs.parse("proxyPort");
        common.redirect_port = attrs.parse("redirectPort").unwrap_or(common.redirect_port);
        if let Some(scheme) = attrs.string("scheme") {
            common.scheme = scheme;
        }
        Ok(common)
    }

    fn write_common(attrs: &mut AttrWriter<'_, '_>, common: &ConnectorCommon) {
        let defaults = ConnectorCommon::default();
        let preserve = WritePolicy::PreserveExpression;
        attrs.text_with("address", common.address.as_deref(), preserve);
        attrs.optional_with("port", common.port.as_ref(), None, preserve);
        attrs.explicit_with("connectionTimeout", &common.connection_timeout, WritePolicy::Literal);
        attrs.value("maxThreads", &common.max_threads, &defaults.max_threads);
        attrs.text_with("proxyName", common.proxy_name.as_deref(), preserve);
        attrs.optional_with("proxyPort", common.proxy_port.as_ref(), None, preserve);
        attrs.explicit_with("redirectPort", &common.redirect_port, preserve);
        attrs.value("scheme", &common.scheme, &defaults.scheme);
    }

    fn write_http(attrs: &mut AttrWriter<'_, '_>, http: &HttpConnector) {
        let defaults = HttpConnector::default();
        attrs.value("acceptCount", &http.accept_count, &defaults.accept_count);
        attrs.text("algorithm", http.algorithm.as_deref());
        attrs.text("keyAlias", http.key_alias.as_deref());
        attrs.text("keystoreFile", http.keystore_file.as_deref());
        attrs.secret("keystorePass", http.keystore_pass.as_ref());
        attrs.text("keystoreType", http.keystore_type.as_deref());
        attrs.value(
            "maxKeepAliveRequests",
            &http.max_keep_alive_requests,
            &defaults.max_keep_alive_requests,
        );
        attrs.value("secure", &http.secure, &defaults.secure);
        attrs.value("SSLEnabled", &http.ssl_enabled, &defaults.ssl_enabled);
    }

    fn write_ajp(attrs: &mut AttrWriter<'_, '_>, ajp: &AjpConnector) {
        attrs.secret("secret", ajp.request_secret.as_ref());
        attrs.value("secretRequired", &ajp.request_use_secret, &true);
    }
}

impl ElementConverter for ConnectorConverter {
    type Node = Connector;

    fn read(&self, element: &Element, cx: &ConvertContext<'_>) -> ConvertResult<Connector> {
        let Some(kind) = Self::classify(element, cx) else {
            return Err(ConvertError::UnsupportedProtocol {
                element: CONNECTOR.to_owned(),
                protocol: element.attribute("protocol").unwrap_or_default().to_owned(),
            });
        };
        let attrs = AttrReader::new(element, cx);
        let common = Self::read_common(&attrs)?;
        let connector = match kind {
            ProtocolKind::Http(protocol) => {
                let mut http = HttpConnector {
                    common,
                    protocol,
                    ..HttpConnector::default()
                };
                http.accept_count = attrs.parse("acceptCount").unwrap_or(http.accept_count);
                http.algorithm = attrs.string("algorithm");
                http.key_alias = attrs.string("keyAlias");
                http.keystore_file = attrs.string("keystoreFile");
                http.keystore_pass = attrs.secret("keystorePass");
                http.keystore_type = attrs.string("keystoreType");
                http.max_keep_alive_requests = attrs
                    .parse("maxKeepAliveRequests")
                    .unwrap_or(http.max_keep_alive_requests);
                http.secure = attrs.flag("secure").unwrap_or(http.secure);
                http.ssl_enabled = attrs.flag("SSLEnabled").unwrap_or(http.ssl_enabled);
                Connector::Http(http)
            }
            ProtocolKind::Ajp(protocol) => {
                let mut ajp = AjpConnector {
                    common,
                    protocol,
                    ..AjpConnector::default()
                };
                ajp.request_secret = attrs.secret("secret");
                ajp.request_use_secret = attrs.flag("secretRequired").unwrap_or(ajp.request_use_secret);
                Connector::Ajp(ajp)
            }
        };
        Ok(connector)
    }

    fn write(
        &self,
        element: &mut Element,
        connector: &Connector,
        cx: &ConvertContext<'_>,
    ) -> ConvertResult<MergeOutcome> {
        let live = Self::classify(element, cx);
        let generic = ProtocolKind::is_generic(
            element.attribute("protocol").map(|p| cx.properties.resolve(p)),
        );
        let desired = connector.protocol();
        let mut attrs = AttrWriter::new(element, cx);
        if generic || live != Some(desired) {
            attrs.force("protocol", desired.class_name());
        }
        Self::write_common(&mut attrs, connector.common());
        match connector {
            Connector::Http(http) => {
                if matches!(live, Some(ProtocolKind::Ajp(_))) {
                    attrs.remove(AJP_ONLY);
                }
                Self::write_http(&mut attrs, http);
            }
            Connector::Ajp(ajp) => {
                if matches!(live, Some(ProtocolKind::Http(_))) {
                    attrs.remove(HTTP_ONLY);
                }
                Self::write_ajp(&mut attrs, ajp);
            }
        }
        Ok(MergeOutcome::default())
    }
}

impl MergeTarget for ConnectorConverter {
    type Item = Connector;

    fn tag(&self) -> &'static str {
        CONNECTOR
    }

    fn item_key(&self, item: &Connector) -> String {
        item.identity_key()
    }

    fn element_key(&self, element: &Element, cx: &ConvertContext<'_>) -> String {
        let attrs = AttrReader::new(element, cx);
        let address = attrs.string("address");
        let port = attrs
            .string("port")
            .map(|raw| raw.trim().parse::<i32>().map_or(raw, |p| p.to_string()));
        connector_key(address.as_deref(), port.as_deref())
    }

    fn is_owned(&self, element: &Element, cx: &ConvertContext<'_>) -> bool {
        Self::classify(element, cx).is_some()
    }

    fn create(&self, item: &Connector, _cx: &ConvertContext<'_>) -> Element {
        Element::new(CONNECTOR).with_attribute("protocol", item.protocol().class_name())
    }

    fn update(
        &self,
        element: &mut Element,
        item: &Connector,
        cx: &ConvertContext<'_>,
    ) -> ConvertResult<MergeOutcome> {
        self.write(element, item, cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ReconcileOptions;
    use crate::properties::Properties;
    use catalina_model::{AjpProtocol, HttpProtocol};
    use pretty_assertions::assert_eq;

    fn cx_parts() -> (Properties, ReconcileOptions) {
        (Properties::new().with("http.port", "8080"), ReconcileOptions::default())
    }

    #[test]
    fn reads_generic_http_with_defaults() {
        let (properties, options) = cx_parts();
        let cx = ConvertContext::new(&properties, &options);
        let element = Element::new("Connector")
            .with_attribute("port", "${http.port}")
            .with_attribute("protocol", "HTTP/1.1")
            .with_attribute("connectionTimeout", "20000")
            .with_attribute("maxThreads", "lots");
        let connector = ConnectorConverter.read(&element, &cx).unwrap();
        let Connector::Http(http) = connector else {
            panic!("expected http connector");
        };
        assert_eq!(http.protocol, HttpProtocol::Nio);
        assert_eq!(http.common.port, Some(8080));
        assert_eq!(http.common.max_threads, 200);
    }

    #[test]
    fn ajp_token_normalized_on_write() {
        let (properties, options) = cx_parts();
        let cx = ConvertContext::new(&properties, &options);
        let mut element = Element::new("Connector")
            .with_attribute("port", "8009")
            .with_attribute("protocol", "AJP/1.3")
            .with_attribute("secret", "x");
        let connector = ConnectorConverter.read(&element, &cx).unwrap();
        assert!(matches!(&connector, Connector::Ajp(a) if a.protocol == AjpProtocol::Nio));

        ConnectorConverter.write(&mut element, &connector, &cx).unwrap();
        assert_eq!(element.attribute("protocol"), Some("org.apache.coyote.ajp.AjpNioProtocol"));
        assert_eq!(ConnectorConverter.read(&element, &cx).unwrap(), connector);
    }

    #[test]
    fn generic_or_absent_http_protocol_gets_configured_class() {
        let (properties, options) = cx_parts();
        let options = options.with_http_protocol(HttpProtocol::Nio2);
        let cx = ConvertContext::new(&properties, &options);
        for mut element in [
            Element::new("Connector").with_attribute("port", "8080"),
            Element::new("Connector")
                .with_attribute("port", "8080")
                .with_attribute("protocol", "HTTP/1.1"),
        ] {
            let connector = ConnectorConverter.read(&element, &cx).unwrap();
            ConnectorConverter.write(&mut element, &connector, &cx).unwrap();
            assert_eq!(
                element.attribute("protocol"),
                Some("org.apache.coyote.http11.Http11Nio2Protocol")
            );
        }
    }

    #[test]
    fn concrete_class_is_never_collapsed() {
        let (properties, options) = cx_parts();
        let cx = ConvertContext::new(&properties, &options);
        let class = "org.apache.coyote.http11.Http11NioProtocol";
        let mut element = Element::new("Connector")
            .with_attribute("port", "8080")
            .with_attribute("protocol", class);
        let connector = ConnectorConverter.read(&element, &cx).unwrap();
        ConnectorConverter.write(&mut element, &connector, &cx).unwrap();
        assert_eq!(element.attribute("protocol"), Some(class));
    }

    #[test]
    fn foreign_protocol_is_not_owned() {
        let (properties, options) = cx_parts();
        let cx = ConvertContext::new(&properties, &options);
        let element = Element::new("Connector")
            .with_attribute("port", "9000")
            .with_attribute("protocol", "com.example.Custom");
        assert!(!ConnectorConverter.is_owned(&element, &cx));
        assert!(ConnectorConverter.read_owned(&element, &cx).unwrap().is_none());
    }

    #[test]
    fn missing_port_is_fatal() {
        let (properties, options) = cx_parts();
        let cx = ConvertContext::new(&properties, &options);
        let element = Element::new("Connector");
        assert!(matches!(
            ConnectorConverter.read(&element, &cx),
            Err(ConvertError::AttributeNotFound { .. })
        ));
    }

    #[test]
    fn element_key_resolves_placeholders() {
        let (properties, options) = cx_parts();
        let cx = ConvertContext::new(&properties, &options);
        let element = Element::new("Connector").with_attribute("port", "${http.port}");
        assert_eq!(ConnectorConverter.element_key(&element, &cx), ":8080");
    }

    #[test]
    fn switching_kind_drops_other_variant_attributes() {
        let (properties, options) = cx_parts();
        let cx = ConvertContext::new(&properties, &options);
        let mut element = Element::new("Connector")
            .with_attribute("port", "8009")
            .with_attribute("SSLEnabled", "true")
            .with_attribute("keystoreFile", "conf/ks");
        let ajp = Connector::Ajp(AjpConnector::new(8009, "shh"));
        ConnectorConverter.write(&mut element, &ajp, &cx).unwrap();
        assert!(!element.has_attribute("SSLEnabled"));
        assert!(!element.has_attribute("keystoreFile"));
        assert_eq!(element.attribute("secret"), Some("shh"));
        assert_eq!(
            element.attribute("protocol"),
            Some("org.apache.coyote.ajp.AjpNioProtocol")
        );
    }
}
