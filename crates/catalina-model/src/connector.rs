//! Connectors and their protocol implementations

use crate::hierarchy::{Attach, Hierarchical, ParentRef, ParentSlot};
use crate::identity::{connector_key, Identity};
use crate::secret::Secret;
use crate::service::Service;
use crate::validation::{ErrorCode, Validate, ValidationContext};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// HTTP protocol implementations
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum HttpProtocol {
    #[default]
    Nio,
    Nio2,
    Apr,
}

impl HttpProtocol {
    /// Generic token resolved to the configured default implementation
    pub const GENERIC: &'static str = "HTTP/1.1";

    /// Implementation class name
    #[must_use]
    pub const fn class_name(self) -> &'static str {
        match self {
            Self::Nio => "org.apache.coyote.http11.Http11NioProtocol",
            Self::Nio2 => "org.apache.coyote.http11.Http11Nio2Protocol",
            Self::Apr => "org.apache.coyote.http11.Http11AprProtocol",
        }
    }

    /// Inverse of [`class_name`](Self::class_name)
    #[must_use]
    pub fn from_class_name(name: &str) -> Option<Self> {
        [Self::Nio, Self::Nio2, Self::Apr]
            .into_iter()
            .find(|p| p.class_name() == name)
    }
}

/// AJP protocol implementations
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum AjpProtocol {
    #[default]
    Nio,
    Nio2,
    Apr,
}

impl AjpProtocol {
    /// Generic token resolved to the configured default implementation
    pub const GENERIC: &'static str = "AJP/1.3";

    #[must_use]
    pub const fn class_name(self) -> &'static str {
        match self {
            Self::Nio => "org.apache.coyote.ajp.AjpNioProtocol",
            Self::Nio2 => "org.apache.coyote.ajp.AjpNio2Protocol",
            Self::Apr => "org.apache.coyote.ajp.AjpAprProtocol",
        }
    }

    #[must_use]
    pub fn from_class_name(name: &str) -> Option<Self> {
        [Self::Nio, Self::Nio2, Self::Apr]
            .into_iter()
            .find(|p| p.class_name() == name)
    }
}

/// Concrete protocol a `protocol` attribute resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolKind {
    Http(HttpProtocol),
    Ajp(AjpProtocol),
}

impl ProtocolKind {
    /// Whether a raw `protocol` attribute names no concrete implementation
    #[must_use]
    pub fn is_generic(raw: Option<&str>) -> bool {
        matches!(
            raw.map(str::trim),
            None | Some("" | HttpProtocol::GENERIC | AjpProtocol::GENERIC)
        )
    }

    /// Classify a raw `protocol` attribute.
    ///
    /// Absent and `HTTP/1.1` resolve to `http_default`, `AJP/1.3` to
    /// `ajp_default`. Unknown values yield `None`.
    #[must_use]
    pub fn classify(
        raw: Option<&str>,
        http_default: HttpProtocol,
        ajp_default: AjpProtocol,
    ) -> Option<Self> {
        match raw.map(str::trim) {
            None | Some("" | HttpProtocol::GENERIC) => Some(Self::Http(http_default)),
            Some(AjpProtocol::GENERIC) => Some(Self::Ajp(ajp_default)),
            Some(other) => HttpProtocol::from_class_name(other)
                .map(Self::Http)
                .or_else(|| AjpProtocol::from_class_name(other).map(Self::Ajp)),
        }
    }

    #[must_use]
    pub const fn class_name(self) -> &'static str {
        match self {
            Self::Http(p) => p.class_name(),
            Self::Ajp(p) => p.class_name(),
        }
    }
}

/// Attributes shared by every connector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ConnectorCommon {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub address: Option<String>,
    pub port: Option<i32>,
    /// Milliseconds, `-1` waits forever
    pub connection_timeout: i32,
    pub max_threads: i32,
    pub proxy_name: Option<String>,
    pub proxy_port: Option<i32>,
    pub redirect_port: i32,
    pub scheme: String,
    #[serde(skip)]
    parent: ParentSlot<Service>,
}

impl Default for ConnectorCommon {
    fn default() -> Self {
        Self {
            id: None,
            address: None,
            port: None,
            connection_timeout: 20000,
            max_threads: 200,
            proxy_name: None,
            proxy_port: None,
            redirect_port: 8443,
            scheme: "http".to_owned(),
            parent: ParentSlot::default(),
        }
    }
}

impl ConnectorCommon {
    #[must_use]
    pub fn on_port(port: i32) -> Self {
        Self {
            port: Some(port),
            ..Self::default()
        }
    }

    /// `address:port`, blank parts rendered empty
    #[must_use]
    pub fn key(&self) -> String {
        let port = self.port.map(|p| p.to_string());
        connector_key(self.address.as_deref(), port.as_deref())
    }
}

impl Validate for ConnectorCommon {
    fn validate(&self, ctx: &mut ValidationContext) {
        if ctx.require("port", self.port.as_ref()) {
            ctx.check_range("port", self.port.unwrap_or_default(), 0, 65535);
        }
        ctx.check_range("redirectPort", self.redirect_port, -1, 65535);
        if let Some(proxy_port) = self.proxy_port {
            ctx.check_range("proxyPort", proxy_port, -1, 65535);
        }
        ctx.check_min("maxThreads", self.max_threads, 1);
        ctx.check_min("connectionTimeout", self.connection_timeout, -1);
    }
}

/// HTTP/1.1 connector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct HttpConnector {
    pub common: ConnectorCommon,
    pub protocol: HttpProtocol,
    pub accept_count: i32,
    pub algorithm: Option<String>,
    pub key_alias: Option<String>,
    pub keystore_file: Option<String>,
    pub keystore_pass: Option<Secret>,
    pub keystore_type: Option<String>,
    pub max_keep_alive_requests: i32,
    pub secure: bool,
    #[serde(rename = "sslEnabled")]
    pub ssl_enabled: bool,
}

impl Default for HttpConnector {
    fn default() -> Self {
        Self {
            common: ConnectorCommon::default(),
            protocol: HttpProtocol::default(),
            accept_count: 100,
            algorithm: None,
            key_alias: None,
            keystore_file: None,
            keystore_pass: None,
            keystore_type: None,
            max_keep_alive_requests: 100,
            secure: false,
            ssl_enabled: false,
        }
    }
}

impl HttpConnector {
    #[must_use]
    pub fn new(port: i32) -> Self {
        Self {
            common: ConnectorCommon::on_port(port),
            ..Self::default()
        }
    }

    /// Turn on TLS with the given keystore; also marks the connector secure
    /// with scheme `https`
    #[must_use]
    pub fn with_ssl(mut self, keystore_file: impl Into<String>, keystore_pass: impl Into<Secret>) -> Self {
        self.ssl_enabled = true;
        self.secure = true;
        self.common.scheme = "https".to_owned();
        self.keystore_file = Some(keystore_file.into());
        self.keystore_pass = Some(keystore_pass.into());
        self
    }
}

impl Validate for HttpConnector {
    fn validate(&self, ctx: &mut ValidationContext) {
        self.common.validate(ctx);
        ctx.check_min("acceptCount", self.accept_count, 0);
        if self.ssl_enabled {
            ctx.require_text("keystoreFile", self.keystore_file.as_deref());
        }
    }
}

/// AJP/1.3 connector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct AjpConnector {
    pub common: ConnectorCommon,
    pub protocol: AjpProtocol,
    pub request_secret: Option<Secret>,
    pub request_use_secret: bool,
}

impl Default for AjpConnector {
    fn default() -> Self {
        Self {
            common: ConnectorCommon::default(),
            protocol: AjpProtocol::default(),
            request_secret: None,
            request_use_secret: true,
        }
    }
}

impl AjpConnector {
    #[must_use]
    pub fn new(port: i32, secret: impl Into<Secret>) -> Self {
        Self {
            common: ConnectorCommon::on_port(port),
            request_secret: Some(secret.into()),
            ..Self::default()
        }
    }
}

impl Validate for AjpConnector {
    fn validate(&self, ctx: &mut ValidationContext) {
        self.common.validate(ctx);
        if self.request_use_secret && self.request_secret.as_ref().map_or(true, Secret::is_blank) {
            ctx.reject("requestSecret", ErrorCode::Required);
        }
    }
}

/// A `<Connector>` owned by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Connector {
    Http(HttpConnector),
    Ajp(AjpConnector),
}

impl Connector {
    #[inline]
    #[must_use]
    pub fn common(&self) -> &ConnectorCommon {
        match self {
            Self::Http(c) => &c.common,
            Self::Ajp(c) => &c.common,
        }
    }

    #[inline]
    pub fn common_mut(&mut self) -> &mut ConnectorCommon {
        match self {
            Self::Http(c) => &mut c.common,
            Self::Ajp(c) => &mut c.common,
        }
    }

    /// Concrete protocol of this connector
    #[must_use]
    pub fn protocol(&self) -> ProtocolKind {
        match self {
            Self::Http(c) => ProtocolKind::Http(c.protocol),
            Self::Ajp(c) => ProtocolKind::Ajp(c.protocol),
        }
    }

    /// Whether this is an HTTP connector on the native APR implementation
    #[must_use]
    pub fn uses_apr(&self) -> bool {
        matches!(self, Self::Http(c) if c.protocol == HttpProtocol::Apr)
    }
}

impl From<HttpConnector> for Connector {
    fn from(value: HttpConnector) -> Self {
        Self::Http(value)
    }
}

impl From<AjpConnector> for Connector {
    fn from(value: AjpConnector) -> Self {
        Self::Ajp(value)
    }
}

impl Identity for Connector {
    fn machine_id(&self) -> Option<&str> {
        self.common().id.as_deref()
    }

    fn set_machine_id(&mut self, id: Option<String>) {
        self.common_mut().id = id;
    }

    fn human_id(&self) -> String {
        self.common().key()
    }

    fn identity_key(&self) -> String {
        self.common().key()
    }
}

impl Hierarchical for Connector {
    type Parent = Service;

    fn parent(&self) -> Option<&ParentRef<Service>> {
        self.common().parent.get()
    }

    fn location(&self) -> &str {
        self.common().parent.location()
    }

    fn apply_parent_to_children(&mut self) {}
}

impl Attach for Connector {
    fn slot_mut(&mut self) -> &mut ParentSlot<Service> {
        &mut self.common_mut().parent
    }
}

impl Validate for Connector {
    fn validate(&self, ctx: &mut ValidationContext) {
        match self {
            Self::Http(c) => c.validate(ctx),
            Self::Ajp(c) => c.validate(ctx),
        }
    }
}
