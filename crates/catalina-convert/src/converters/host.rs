//! `<Host>` elements of an engine

use super::access_log::AccessLogConverter;
use super::names::HOST;
use super::{ConvertContext, ElementConverter};
use crate::attributes::{AttrReader, AttrWriter};
use crate::error::ConvertResult;
use crate::merge::{MergeOutcome, MergeTarget};
use crate::options::WritePolicy;
use catalina_model::{Host, HostScope, Identity};
use catalina_xml::Element;

#[derive(Debug, Clone, Copy, Default)]
pub struct HostConverter;

impl HostConverter {
    const LOGGING: AccessLogConverter<HostScope> = AccessLogConverter::new();
}

impl ElementConverter for HostConverter {
    type Node = Host;

    fn read(&self, element: &Element, cx: &ConvertContext<'_>) -> ConvertResult<Host> {
        let attrs = AttrReader::new(element, cx);
        let mut host = Host::new(attrs.required("name")?);
        host.app_base = attrs.string("appBase").or(host.app_base);
        host.auto_deploy = attrs.flag("autoDeploy").unwrap_or(host.auto_deploy);
        host.deploy_on_startup = attrs.flag("deployOnStartup").unwrap_or(host.deploy_on_startup);
        host.deploy_xml = attrs.flag("deployXML").unwrap_or(host.deploy_xml);
        host.unpack_wars = attrs.flag("unpackWARs").unwrap_or(host.unpack_wars);
        host.work_dir = attrs.string("workDir");
        host.logging = Self::LOGGING.read(element, cx)?;
        Ok(host)
    }

    fn write(&self, element: &mut Element, host: &Host, cx: &ConvertContext<'_>) -> ConvertResult<MergeOutcome> {
        let defaults = Host::default();
        let mut attrs = AttrWriter::new(element, cx);
        attrs.text_with("name", host.name.as_deref(), WritePolicy::PreserveExpression);
        attrs.optional_with(
            "appBase",
            host.app_base.as_deref(),
            defaults.app_base.as_deref(),
            WritePolicy::PreserveExpression,
        );
        attrs.value("autoDeploy", &host.auto_deploy, &defaults.auto_deploy);
        attrs.value("deployOnStartup", &host.deploy_on_startup, &defaults.deploy_on_startup);
        attrs.value("deployXML", &host.deploy_xml, &defaults.deploy_xml);
        attrs.value("unpackWARs", &host.unpack_wars, &defaults.unpack_wars);
        attrs.text_with("workDir", host.work_dir.as_deref(), WritePolicy::PreserveExpression);
        Self::LOGGING.write(element, &host.logging, cx)
    }
}

impl MergeTarget for HostConverter {
    type Item = Host;

    fn tag(&self) -> &'static str {
        HOST
    }

    fn item_key(&self, item: &Host) -> String {
        item.identity_key()
    }

    fn element_key(&self, element: &Element, cx: &ConvertContext<'_>) -> String {
        AttrReader::new(element, cx).string("name").unwrap_or_default()
    }

    fn is_owned(&self, _element: &Element, _cx: &ConvertContext<'_>) -> bool {
        true
    }

    fn create(&self, _item: &Host, _cx: &ConvertContext<'_>) -> Element {
        Element::new(HOST)
    }

    fn update(&self, element: &mut Element, item: &Host, cx: &ConvertContext<'_>) -> ConvertResult<MergeOutcome> {
        self.write(element, item, cx)
    }
}
