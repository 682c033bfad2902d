//! Singleton `<Listener>` elements of `<Server>`
//!
//! Both converters operate on the `<Server>` element and locate their
//! listener by `className`.

use super::names::{APR_LISTENER_CLASS, GLOBAL_NAMING_RESOURCES, JMX_LISTENER_CLASS, LISTENER};
use super::singleton::{element_by_class, sync_singleton, Placement};
use super::{ConvertContext, ElementConverter};
use crate::attributes::{AttrReader, AttrWriter};
use crate::error::ConvertResult;
use crate::merge::MergeOutcome;
use crate::options::WritePolicy;
use catalina_model::{AprLifecycleListener, JmxListener};
use catalina_xml::Element;

const PLACEMENT: Placement = Placement::AfterLast {
    tag: LISTENER,
    anchor: GLOBAL_NAMING_RESOURCES,
};

/// Remote JMX listener
#[derive(Debug, Clone, Copy, Default)]
pub struct JmxListenerConverter;

impl ElementConverter for JmxListenerConverter {
    type Node = JmxListener;

    fn read(&self, server: &Element, cx: &ConvertContext<'_>) -> ConvertResult<JmxListener> {
        let mut jmx = JmxListener::default();
        let Some(element) = element_by_class(server, LISTENER, JMX_LISTENER_CLASS) else {
            return Ok(jmx);
        };
        let attrs = AttrReader::new(element, cx);
        jmx.enabled = true;
        jmx.registry_port = attrs.parse("rmiRegistryPortPlatform").unwrap_or(jmx.registry_port);
        jmx.server_port = attrs.parse("rmiServerPortPlatform").unwrap_or(jmx.server_port);
        jmx.bind_address = attrs.string("rmiBindAddress");
        jmx.use_local_ports = attrs.flag("useLocalPorts").unwrap_or(jmx.use_local_ports);
        Ok(jmx)
    }

    fn write(
        &self,
        server: &mut Element,
        jmx: &JmxListener,
        cx: &ConvertContext<'_>,
    ) -> ConvertResult<MergeOutcome> {
        sync_singleton(server, LISTENER, JMX_LISTENER_CLASS, jmx.enabled, PLACEMENT, |element| {
            let mut attrs = AttrWriter::new(element, cx);
            let preserve = WritePolicy::PreserveExpression;
            attrs.explicit_with("rmiRegistryPortPlatform", &jmx.registry_port, preserve);
            attrs.explicit_with("rmiServerPortPlatform", &jmx.server_port, preserve);
            attrs.text_with("rmiBindAddress", jmx.bind_address.as_deref(), preserve);
            attrs.value("useLocalPorts", &jmx.use_local_ports, &false);
            Ok(())
        })
    }
}

/// Native library listener; `None` means absent
#[derive(Debug, Clone, Copy, Default)]
pub struct AprListenerConverter;

impl ElementConverter for AprListenerConverter {
    type Node = Option<AprLifecycleListener>;

    fn read(
        &self,
        server: &Element,
        cx: &ConvertContext<'_>,
    ) -> ConvertResult<Option<AprLifecycleListener>> {
        let Some(element) = element_by_class(server, LISTENER, APR_LISTENER_CLASS) else {
            return Ok(None);
        };
        let attrs = AttrReader::new(element, cx);
        let mut apr = AprLifecycleListener::default();
        if let Some(engine) = attrs.string("SSLEngine") {
            apr.ssl_engine = engine;
        }
        if let Some(seed) = attrs.string("SSLRandomSeed") {
            apr.ssl_random_seed = seed;
        }
        Ok(Some(apr))
    }

    fn write(
        &self,
        server: &mut Element,
        apr: &Option<AprLifecycleListener>,
        cx: &ConvertContext<'_>,
    ) -> ConvertResult<MergeOutcome> {
        let defaults = AprLifecycleListener::default();
        sync_singleton(server, LISTENER, APR_LISTENER_CLASS, apr.is_some(), PLACEMENT, |element| {
            if let Some(apr) = apr {
                let mut attrs = AttrWriter::new(element, cx);
                attrs.value("SSLEngine", &apr.ssl_engine, &defaults.ssl_engine);
                attrs.value("SSLRandomSeed", &apr.ssl_random_seed, &defaults.ssl_random_seed);
            }
            Ok(())
        })
    }
}
