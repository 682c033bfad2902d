//! Server-wide configuration: `<Server>` attributes, singleton listeners and
//! the process environment.

use crate::context::{ContextContainer, ServerDefaults};
use crate::hierarchy::{adopt, attach_slot, leaf_node, Hierarchical, ParentRef, ParentSlot};
use crate::settings::Settings;
use crate::validation::{ErrorCode, Validate, ValidationContext};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default shutdown port
pub const DEFAULT_SHUTDOWN_PORT: i32 = 8005;
/// Default shutdown command
pub const DEFAULT_SHUTDOWN_COMMAND: &str = "SHUTDOWN";
/// Default JMX registry port
pub const DEFAULT_JMX_REGISTRY_PORT: i32 = 10001;
/// Default JMX server port
pub const DEFAULT_JMX_SERVER_PORT: i32 = 10002;

/// Grouping node below [`Settings`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct Configuration {
    pub general: GeneralConfig,
    pub environment: Option<Environment>,
    pub context: ContextContainer,
    pub defaults: ServerDefaults,
    #[serde(skip)]
    parent: ParentSlot<Settings>,
}

impl Hierarchical for Configuration {
    type Parent = Settings;

    fn parent(&self) -> Option<&ParentRef<Settings>> {
        self.parent.get()
    }

    fn location(&self) -> &str {
        self.parent.location()
    }

    fn apply_parent_to_children(&mut self) {
        let path = self.parent.location().to_owned();
        adopt(&mut self.general, ParentRef::new(path.as_str(), None), "general");
        if let Some(env) = self.environment.as_mut() {
            adopt(env, ParentRef::new(path.as_str(), None), "environment");
        }
        adopt(&mut self.context, ParentRef::new(path.as_str(), None), "context");
        adopt(&mut self.defaults, ParentRef::new(path.as_str(), None), "defaults");
    }
}

attach_slot!(Configuration, Settings);

impl Validate for Configuration {
    fn validate(&self, ctx: &mut ValidationContext) {
        ctx.validate_child("general", &self.general);
        if let Some(env) = &self.environment {
            ctx.validate_child("environment", env);
        }
        ctx.validate_child("context", &self.context);
        ctx.validate_child("defaults", &self.defaults);
    }
}

/// Attributes of the `<Server>` element and its singleton listeners
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneralConfig {
    pub server: ServerProperties,
    pub jmx_listener: JmxListener,
    /// Derived from the connector set; see [`crate::derive_apr_listener`]
    pub apr_lifecycle_listener: Option<AprLifecycleListener>,
    #[serde(skip)]
    parent: ParentSlot<Configuration>,
}

impl Hierarchical for GeneralConfig {
    type Parent = Configuration;

    fn parent(&self) -> Option<&ParentRef<Configuration>> {
        self.parent.get()
    }

    fn location(&self) -> &str {
        self.parent.location()
    }

    fn apply_parent_to_children(&mut self) {
        let path = self.parent.location().to_owned();
        adopt(&mut self.server, ParentRef::new(path.as_str(), None), "server");
        adopt(&mut self.jmx_listener, ParentRef::new(path.as_str(), None), "jmxListener");
        if let Some(apr) = self.apr_lifecycle_listener.as_mut() {
            adopt(apr, ParentRef::new(path.as_str(), None), "aprLifecycleListener");
        }
    }
}

attach_slot!(GeneralConfig, Configuration);

impl Validate for GeneralConfig {
    fn validate(&self, ctx: &mut ValidationContext) {
        ctx.validate_child("server", &self.server);
        ctx.validate_child("jmxListener", &self.jmx_listener);
        if let Some(apr) = &self.apr_lifecycle_listener {
            ctx.validate_child("aprLifecycleListener", apr);
        }
    }
}

/// `<Server port shutdown address>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerProperties {
    /// Shutdown port, `-1` disables it
    pub port: Option<i32>,
    pub shutdown: Option<String>,
    pub address: Option<String>,
    #[serde(skip)]
    parent: ParentSlot<GeneralConfig>,
}

impl Default for ServerProperties {
    fn default() -> Self {
        Self {
            port: Some(DEFAULT_SHUTDOWN_PORT),
            shutdown: Some(DEFAULT_SHUTDOWN_COMMAND.to_owned()),
            address: None,
            parent: ParentSlot::default(),
        }
    }
}

leaf_node!(ServerProperties, GeneralConfig);

impl Validate for ServerProperties {
    fn validate(&self, ctx: &mut ValidationContext) {
        match self.port {
            Some(port) => ctx.check_range("port", port, -1, 65535),
            None => ctx.reject("port", ErrorCode::Required),
        }
        ctx.require_text("shutdown", self.shutdown.as_deref());
    }
}

/// Remote JMX listener
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct JmxListener {
    pub enabled: bool,
    pub registry_port: i32,
    pub server_port: i32,
    pub bind_address: Option<String>,
    pub use_local_ports: bool,
    #[serde(skip)]
    parent: ParentSlot<GeneralConfig>,
}

impl Default for JmxListener {
    fn default() -> Self {
        Self {
            enabled: false,
            registry_port: DEFAULT_JMX_REGISTRY_PORT,
            server_port: DEFAULT_JMX_SERVER_PORT,
            bind_address: None,
            use_local_ports: false,
            parent: ParentSlot::default(),
        }
    }
}

impl JmxListener {
    /// Enabled listener on the given ports
    #[must_use]
    pub fn enabled(registry_port: i32, server_port: i32) -> Self {
        Self {
            enabled: true,
            registry_port,
            server_port,
            ..Self::default()
        }
    }
}

leaf_node!(JmxListener, GeneralConfig);

impl Validate for JmxListener {
    fn validate(&self, ctx: &mut ValidationContext) {
        if self.enabled {
            ctx.check_range("registryPort", self.registry_port, 0, 65535);
            ctx.check_range("serverPort", self.server_port, 0, 65535);
        }
    }
}

/// Native library listener, present only while an APR connector exists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct AprLifecycleListener {
    pub ssl_engine: String,
    pub ssl_random_seed: String,
    #[serde(skip)]
    parent: ParentSlot<GeneralConfig>,
}

impl Default for AprLifecycleListener {
    fn default() -> Self {
        Self {
            ssl_engine: "on".to_owned(),
            ssl_random_seed: "builtin".to_owned(),
            parent: ParentSlot::default(),
        }
    }
}

leaf_node!(AprLifecycleListener, GeneralConfig);

impl Validate for AprLifecycleListener {
    fn validate(&self, ctx: &mut ValidationContext) {
        ctx.require_text("sslEngine", Some(&self.ssl_engine));
    }
}

/// Process environment used when launching the instance.
///
/// Consumed by the lifecycle controller; never written into a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct Environment {
    pub java_home: Option<String>,
    pub catalina_opts: String,
    pub java_opts: String,
    #[serde(skip)]
    parent: ParentSlot<Configuration>,
}

impl Environment {
    #[must_use]
    pub fn new(java_home: impl Into<String>) -> Self {
        Self {
            java_home: Some(java_home.into()),
            ..Self::default()
        }
    }
}

leaf_node!(Environment, Configuration);

impl Validate for Environment {
    fn validate(&self, ctx: &mut ValidationContext) {
        ctx.require_text("javaHome", self.java_home.as_deref());
    }
}
