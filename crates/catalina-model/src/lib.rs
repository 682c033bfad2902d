//! Catalina settings model
//!
//! Strongly typed tree mirroring a server's `server.xml`, global
//! `context.xml` and global `web.xml`.
//!
//! # Core Concepts
//!
//! - [`Settings`]: root owning configuration, data sources and services
//! - [`Hierarchical`]: typed, non-owning parent snapshots refreshed by
//!   [`Hierarchical::apply_parent_to_children`]
//! - [`Identity`]: machine id, display id and merge key of collection members
//! - [`Validate`] / [`validate`]: cascading validation with qualified paths
//! - [`derive_apr_listener`]: the one derived field, recomputed by `validate`
//!
//! # Example
//!
//! ```
//! use catalina_model::{validate, Connector, Engine, Host, HttpConnector, Service, Settings};
//!
//! let mut settings = Settings::new().with_service(
//!     Service::new("Catalina")
//!         .with_engine(Engine::new("Catalina").with_host(Host::new("localhost")))
//!         .with_connector(Connector::Http(HttpConnector::new(8080))),
//! );
//! assert!(validate(&mut settings).is_empty());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod configuration;
mod connector;
mod context;
mod datasource;
mod derive;
mod diagnostics;
mod hierarchy;
mod identity;
mod logging;
mod secret;
mod service;
mod settings;
mod validation;

pub use configuration::{
    AprLifecycleListener, Configuration, Environment, GeneralConfig, JmxListener, ServerProperties,
    DEFAULT_JMX_REGISTRY_PORT, DEFAULT_JMX_SERVER_PORT, DEFAULT_SHUTDOWN_COMMAND,
    DEFAULT_SHUTDOWN_PORT,
};
pub use connector::{
    AjpConnector, AjpProtocol, Connector, ConnectorCommon, HttpConnector, HttpProtocol,
    ProtocolKind,
};
pub use context::{
    ContextContainer, ServerDefaults, StaticResourceCache, WebApplicationLogger,
    DEFAULT_CACHE_MAX_SIZE, DEFAULT_CACHE_TTL, DEFAULT_SESSION_TIMEOUT, DEFAULT_WELCOME_FILES,
};
pub use datasource::{
    Connection, ConnectionPool, DataSource, General, JdbcResource, DBCP_FACTORY, TOMCAT_FACTORY,
};
pub use derive::{derive_apr_listener, requires_apr_listener};
pub use diagnostics::ThreadDiagnostics;
pub use hierarchy::{Hierarchical, ParentRef, ParentSlot};
pub use identity::{connector_key, Identity};
pub use logging::{EngineScope, HostScope, Logging, LoggingScope};
pub use secret::Secret;
pub use service::{Engine, Host, Service};
pub use settings::Settings;
pub use validation::{
    validate, validate_node, ErrorCode, FieldError, Validate, ValidationContext, ValidationErrors,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Settings {
        let mut settings = Settings::new()
            .with_data_source(DataSource::tomcat(
                "jdbc/app",
                "jdbc:h2:mem:app",
                "org.h2.Driver",
            ))
            .with_service(
                Service::new("Catalina")
                    .with_engine(Engine::new("Catalina").with_host(Host::new("localhost")))
                    .with_connector(Connector::Http(HttpConnector::new(8080))),
            );
        settings.services[0].id = Some("svc".to_owned());
        settings
    }

    #[test]
    fn apply_parents_binds_every_level() {
        let mut settings = sample();
        settings.apply_parent_to_children();

        assert!(settings.parent().is_none());
        let service = &settings.services[0];
        assert_eq!(service.location(), "services[0]");
        assert_eq!(service.parent().map(ParentRef::path), Some(""));

        let engine = &service.engine;
        assert_eq!(engine.location(), "services[0].engine");
        assert_eq!(engine.parent().and_then(ParentRef::machine_id), Some("svc"));

        let host_log = &engine.hosts[0].logging;
        assert_eq!(host_log.location(), "services[0].engine.hosts[0].logging");

        let connector = &service.connectors[0];
        assert_eq!(connector.location(), "services[0].connectors[0]");

        let pool = &settings.data_sources[0].resource().pool;
        assert_eq!(pool.location(), "dataSources[0].pool");

        let server = &settings.configuration.general.server;
        assert_eq!(server.location(), "configuration.general.server");
    }

    #[test]
    fn parent_links_do_not_affect_equality() {
        let plain = sample();
        let mut bound = sample();
        bound.apply_parent_to_children();
        assert_eq!(plain, bound);
    }

    #[test]
    fn parent_snapshot_is_not_live() {
        let mut settings = sample();
        settings.apply_parent_to_children();
        let moved = settings.services.remove(0);
        settings.services.push(Service::new("Other"));
        settings.services.push(moved);
        assert_eq!(settings.services[1].location(), "services[0]");
        settings.apply_parent_to_children();
        assert_eq!(settings.services[1].location(), "services[1]");
    }

    #[test]
    fn full_tree_paths_are_qualified() {
        let mut settings = sample();
        settings.configuration.general.server.port = Some(-2);
        settings.services[0].engine.hosts[0].app_base = None;
        settings.data_sources[0].resource_mut().connection.url = None;
        let errors = validate(&mut settings);
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "configuration.general.server.port",
                "dataSources[0].connection.url",
                "services[0].engine.hosts[0].appBase",
            ]
        );
    }
}
