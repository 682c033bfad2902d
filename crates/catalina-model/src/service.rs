//! Services, their engine and virtual hosts

use crate::connector::Connector;
use crate::diagnostics::ThreadDiagnostics;
use crate::hierarchy::{adopt, attach_slot, indexed, Hierarchical, ParentRef, ParentSlot};
use crate::identity::Identity;
use crate::logging::{EngineScope, HostScope, Logging};
use crate::settings::Settings;
use crate::validation::{ErrorCode, Validate, ValidationContext};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A `<Service>`: one engine plus the connectors feeding it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct Service {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub engine: Engine,
    pub connectors: Vec<Connector>,
    #[serde(skip)]
    parent: ParentSlot<Settings>,
}

impl Service {
    /// Service with an engine of the same name
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            engine: Engine::new(name.clone()),
            name: Some(name),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_engine(mut self, engine: Engine) -> Self {
        self.engine = engine;
        self
    }

    #[must_use]
    pub fn with_connector(mut self, connector: Connector) -> Self {
        self.connectors.push(connector);
        self
    }
}

impl Identity for Service {
    fn machine_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_machine_id(&mut self, id: Option<String>) {
        self.id = id;
    }

    fn human_id(&self) -> String {
        self.name.clone().unwrap_or_default()
    }

    fn identity_key(&self) -> String {
        self.name.clone().unwrap_or_default()
    }
}

impl Hierarchical for Service {
    type Parent = Settings;

    fn parent(&self) -> Option<&ParentRef<Settings>> {
        self.parent.get()
    }

    fn location(&self) -> &str {
        self.parent.location()
    }

    fn apply_parent_to_children(&mut self) {
        let path = self.parent.location().to_owned();
        let id = self.id.clone();
        adopt(&mut self.engine, ParentRef::new(path.as_str(), id.as_deref()), "engine");
        for (index, connector) in self.connectors.iter_mut().enumerate() {
            let me = ParentRef::new(path.as_str(), id.as_deref());
            adopt(connector, me, &indexed("connectors", index));
        }
    }
}

attach_slot!(Service, Settings);

impl Validate for Service {
    fn validate(&self, ctx: &mut ValidationContext) {
        ctx.require_text("name", self.name.as_deref());
        ctx.validate_child("engine", &self.engine);
        ctx.validate_each("connectors", &self.connectors);
        ctx.check_unique("connectors", "port", &self.connectors, |c| {
            c.common().port.map(|_| c.identity_key())
        });
    }
}

/// The request processing `<Engine>` of a service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct Engine {
    pub name: Option<String>,
    pub default_host: Option<String>,
    pub jvm_route: Option<String>,
    pub hosts: Vec<Host>,
    pub logging: Logging<EngineScope>,
    pub thread_diagnostics: ThreadDiagnostics,
    #[serde(skip)]
    parent: ParentSlot<Service>,
}

impl Engine {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Add a host; the first host added becomes the default host
    #[must_use]
    pub fn with_host(mut self, host: Host) -> Self {
        if self.default_host.is_none() {
            self.default_host.clone_from(&host.name);
        }
        self.hosts.push(host);
        self
    }

    /// Host named by `default_host`
    #[must_use]
    pub fn default_host(&self) -> Option<&Host> {
        let wanted = self.default_host.as_deref()?;
        self.hosts.iter().find(|h| h.name.as_deref() == Some(wanted))
    }
}

impl Hierarchical for Engine {
    type Parent = Service;

    fn parent(&self) -> Option<&ParentRef<Service>> {
        self.parent.get()
    }

    fn location(&self) -> &str {
        self.parent.location()
    }

    fn apply_parent_to_children(&mut self) {
        let path = self.parent.location().to_owned();
        for (index, host) in self.hosts.iter_mut().enumerate() {
            adopt(host, ParentRef::new(path.as_str(), None), &indexed("hosts", index));
        }
        adopt(&mut self.logging, ParentRef::new(path.as_str(), None), "logging");
        adopt(
            &mut self.thread_diagnostics,
            ParentRef::new(path.as_str(), None),
            "threadDiagnostics",
        );
    }
}

attach_slot!(Engine, Service);

impl Validate for Engine {
    fn validate(&self, ctx: &mut ValidationContext) {
        ctx.require_text("name", self.name.as_deref());
        if ctx.require_text("defaultHost", self.default_host.as_deref())
            && !self.hosts.is_empty()
            && self.default_host().is_none()
        {
            let wanted = self.default_host.clone().unwrap_or_default();
            ctx.reject_with("defaultHost", ErrorCode::UnknownReference, vec![wanted]);
        }
        ctx.validate_each("hosts", &self.hosts);
        ctx.check_unique("hosts", "name", &self.hosts, |h| h.name.clone());
        ctx.validate_child("logging", &self.logging);
        ctx.validate_child("threadDiagnostics", &self.thread_diagnostics);
    }
}

/// A virtual `<Host>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct Host {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub app_base: Option<String>,
    pub auto_deploy: bool,
    pub deploy_on_startup: bool,
    #[serde(rename = "deployXML")]
    pub deploy_xml: bool,
    #[serde(rename = "unpackWARs")]
    pub unpack_wars: bool,
    pub work_dir: Option<String>,
    pub logging: Logging<HostScope>,
    #[serde(skip)]
    parent: ParentSlot<Engine>,
}

impl Default for Host {
    fn default() -> Self {
        Self {
            id: None,
            name: None,
            app_base: Some("webapps".to_owned()),
            auto_deploy: true,
            deploy_on_startup: true,
            deploy_xml: true,
            unpack_wars: true,
            work_dir: None,
            logging: Logging::default(),
            parent: ParentSlot::default(),
        }
    }
}

impl Host {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_app_base(mut self, app_base: impl Into<String>) -> Self {
        self.app_base = Some(app_base.into());
        self
    }
}

impl Identity for Host {
    fn machine_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_machine_id(&mut self, id: Option<String>) {
        self.id = id;
    }

    fn human_id(&self) -> String {
        self.name.as_deref().unwrap_or_default().replace('/', "")
    }

    fn identity_key(&self) -> String {
        self.name.clone().unwrap_or_default()
    }
}

impl Hierarchical for Host {
    type Parent = Engine;

    fn parent(&self) -> Option<&ParentRef<Engine>> {
        self.parent.get()
    }

    fn location(&self) -> &str {
        self.parent.location()
    }

    fn apply_parent_to_children(&mut self) {
        let me = ParentRef::new(self.parent.location(), self.id.as_deref());
        adopt(&mut self.logging, me, "logging");
    }
}

attach_slot!(Host, Engine);

impl Validate for Host {
    fn validate(&self, ctx: &mut ValidationContext) {
        ctx.require_text("name", self.name.as_deref());
        ctx.require_text("appBase", self.app_base.as_deref());
        ctx.validate_child("logging", &self.logging);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::{Connector, HttpConnector};
    use crate::validation::validate_node;
    use pretty_assertions::assert_eq;

    fn catalina() -> Service {
        Service::new("Catalina")
            .with_engine(Engine::new("Catalina").with_host(Host::new("localhost")))
            .with_connector(Connector::Http(HttpConnector::new(8080)))
    }

    #[test]
    fn valid_service_has_no_errors() {
        assert!(validate_node(&catalina()).is_empty());
    }

    #[test]
    fn host_human_id_strips_slashes() {
        let host = Host::new("/apps/site/");
        assert_eq!(host.human_id(), "appssite");
        assert_eq!(host.identity_key(), "/apps/site/");
    }

    #[test]
    fn default_host_must_exist() {
        let mut service = catalina();
        service.engine.default_host = Some("missing".to_owned());
        let errors = validate_node(&service);
        let found = errors.for_field("engine.defaultHost");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].code, ErrorCode::UnknownReference);
    }

    #[test]
    fn default_host_without_hosts_only_required() {
        let mut service = Service::new("Catalina");
        service.engine.default_host = Some("localhost".to_owned());
        assert!(validate_node(&service).is_empty());
        service.engine.default_host = None;
        assert_eq!(validate_node(&service).for_field("engine.defaultHost")[0].code, ErrorCode::Required);
    }

    #[test]
    fn duplicate_hosts_flagged() {
        let mut service = catalina();
        service.engine.hosts.push(Host::new("localhost"));
        let errors = validate_node(&service);
        assert_eq!(errors.for_field("engine.hosts[0].name").len(), 1);
        assert_eq!(errors.for_field("engine.hosts[1].name").len(), 1);
    }

    #[test]
    fn duplicate_connectors_flagged_by_address_and_port() {
        let mut service = catalina();
        service.connectors.push(Connector::Http(HttpConnector::new(8080)));
        let mut other = HttpConnector::new(8080);
        other.common.address = Some("127.0.0.1".to_owned());
        service.connectors.push(Connector::Http(other));
        let errors = validate_node(&service);
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["connectors[0].port", "connectors[1].port"]);
    }

    #[test]
    fn parents_follow_tree_shape() {
        let mut service = catalina();
        service.id = Some("svc-1".to_owned());
        service.apply_parent_to_children();
        let host = &service.engine.hosts[0];
        assert_eq!(host.location(), "engine.hosts[0]");
        assert_eq!(host.parent().map(ParentRef::path), Some("engine"));
        let connector = &service.connectors[0];
        assert_eq!(connector.parent().and_then(ParentRef::machine_id), Some("svc-1"));
    }
}
