//! Element converters
//!
//! One converter per node type. Each reads a subtree into a model node and
//! writes a node back into an existing subtree, delegating nested structures
//! to child converters and collections to [`merge`](crate::merge::merge).

mod access_log;
mod connector;
mod context;
mod datasource;
mod engine;
mod general;
mod host;
mod listener;
mod service;
mod settings;
mod singleton;
mod thread_diagnostics;
mod web_defaults;

pub use access_log::AccessLogConverter;
pub use connector::ConnectorConverter;
pub use context::ContextConverter;
pub use datasource::{DataSourceConverter, DataSourcesConverter};
pub use engine::EngineConverter;
pub use general::GeneralConfigConverter;
pub use host::HostConverter;
pub use listener::{AprListenerConverter, JmxListenerConverter};
pub use service::ServiceConverter;
pub use settings::{DocumentSet, SettingsConverter};
pub use thread_diagnostics::ThreadDiagnosticsConverter;
pub use web_defaults::WebDefaultsConverter;

use crate::error::ConvertResult;
use crate::merge::MergeOutcome;
use crate::options::ReconcileOptions;
use crate::properties::Properties;
use catalina_xml::Element;

/// Element and class names of the managed schema
pub mod names {
    pub const SERVER: &str = "Server";
    pub const SERVICE: &str = "Service";
    pub const ENGINE: &str = "Engine";
    pub const HOST: &str = "Host";
    pub const CONNECTOR: &str = "Connector";
    pub const LISTENER: &str = "Listener";
    pub const VALVE: &str = "Valve";
    pub const GLOBAL_NAMING_RESOURCES: &str = "GlobalNamingResources";
    pub const RESOURCE: &str = "Resource";
    pub const CONTEXT: &str = "Context";
    pub const RESOURCES: &str = "Resources";
    pub const SESSION_CONFIG: &str = "session-config";
    pub const SESSION_TIMEOUT: &str = "session-timeout";
    pub const WELCOME_FILE_LIST: &str = "welcome-file-list";
    pub const WELCOME_FILE: &str = "welcome-file";

    pub const CLASS_NAME: &str = "className";
    pub const JMX_LISTENER_CLASS: &str = "org.apache.catalina.mbeans.JmxRemoteLifecycleListener";
    pub const APR_LISTENER_CLASS: &str = "org.apache.catalina.core.AprLifecycleListener";
    pub const ACCESS_LOG_VALVE_CLASS: &str = "org.apache.catalina.valves.AccessLogValve";
    pub const STUCK_THREAD_VALVE_CLASS: &str = "org.apache.catalina.valves.StuckThreadDetectionValve";
    pub const DATA_SOURCE_TYPE: &str = "javax.sql.DataSource";
}

/// What every converter needs besides the element
#[derive(Debug, Clone, Copy)]
pub struct ConvertContext<'a> {
    pub properties: &'a Properties,
    pub options: &'a ReconcileOptions,
}

impl<'a> ConvertContext<'a> {
    #[must_use]
    pub fn new(properties: &'a Properties, options: &'a ReconcileOptions) -> Self {
        Self {
            properties,
            options,
        }
    }
}

/// Two-way mapping between an element and a model node
pub trait ElementConverter {
    /// Model node type
    type Node;

    /// Build a node from `element`
    ///
    /// # Errors
    /// Fails when a required attribute or singleton child is missing.
    fn read(&self, element: &Element, cx: &ConvertContext<'_>) -> ConvertResult<Self::Node>;

    /// Apply `node` onto `element`, creating and removing children as needed
    ///
    /// # Errors
    /// Fails when the live element violates a structural precondition.
    fn write(
        &self,
        element: &mut Element,
        node: &Self::Node,
        cx: &ConvertContext<'_>,
    ) -> ConvertResult<MergeOutcome>;
}
