//! Testing utilities for the catalina workspace
//!
//! Shared document fixtures, sample settings trees and tracing setup.

#![allow(missing_docs)]

use catalina_model::{Connector, Engine, Host, HttpConnector, Service, Settings};
use catalina_xml::Document;
use std::sync::Once;

/// Stock Tomcat `server.xml`, trimmed to the managed parts plus a few
/// elements the engine must leave alone; one attribute list per line so an
/// unchanged write reproduces it byte for byte
pub const SERVER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- Stock server configuration -->
<Server port="8005" shutdown="SHUTDOWN">
  <Listener className="org.apache.catalina.startup.VersionLoggerListener"/>
  <Listener className="org.apache.catalina.core.JreMemoryLeakPreventionListener"/>
  <GlobalNamingResources>
    <Resource name="UserDatabase" auth="Container" type="org.apache.catalina.UserDatabase" factory="org.apache.catalina.users.MemoryUserDatabaseFactory" pathname="conf/tomcat-users.xml"/>
  </GlobalNamingResources>
  <Service name="Catalina">
    <Connector port="${http.port}" protocol="HTTP/1.1" connectionTimeout="20000" redirectPort="8443"/>
    <Engine name="Catalina" defaultHost="localhost">
      <Realm className="org.apache.catalina.realm.LockOutRealm"/>
      <Host name="localhost" appBase="webapps" unpackWARs="true" autoDeploy="true">
        <Valve className="org.apache.catalina.valves.AccessLogValve" directory="logs" prefix="localhost_access_log" suffix=".txt" pattern="%h %l %u %t &quot;%r&quot; %s %b"/>
      </Host>
    </Engine>
  </Service>
</Server>
"#;

/// Global `context.xml`
pub const CONTEXT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Context>
  <WatchedResource>WEB-INF/web.xml</WatchedResource>
</Context>
"#;

/// Global `web.xml`, defaults only
pub const WEB_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<web-app xmlns="http://xmlns.jcp.org/xml/ns/javaee" version="4.0">
  <session-config>
    <session-timeout>30</session-timeout>
  </session-config>
  <welcome-file-list>
    <welcome-file>index.html</welcome-file>
    <welcome-file>index.htm</welcome-file>
    <welcome-file>index.jsp</welcome-file>
  </welcome-file-list>
</web-app>
"#;

/// `catalina.properties` fragment backing [`SERVER_XML`]'s placeholders
pub const CATALINA_PROPERTIES: &str = "\
# ports
http.port=8080
shutdown.port=8005
";

/// A server with one connector whose protocol the engine does not manage
pub const FOREIGN_CONNECTOR_XML: &str = r#"<Server port="8005" shutdown="SHUTDOWN">
  <Service name="Catalina">
    <Connector port="9000" protocol="com.example.CustomProtocol"/>
    <Connector port="8080" protocol="HTTP/1.1" connectionTimeout="20000" redirectPort="8443"/>
    <Engine name="Catalina" defaultHost="localhost">
      <Host name="localhost" appBase="webapps"/>
    </Engine>
  </Service>
</Server>
"#;

pub fn parse(xml: &str) -> Document {
    Document::parse(xml).unwrap()
}

pub fn server_document() -> Document {
    parse(SERVER_XML)
}

/// `Catalina` service with a `localhost` host and an HTTP connector on
/// `port`
pub fn catalina_service(port: i32) -> Service {
    Service::new("Catalina")
        .with_engine(Engine::new("Catalina").with_host(Host::new("localhost")))
        .with_connector(Connector::Http(HttpConnector::new(port)))
}

pub fn sample_settings() -> Settings {
    Settings::new().with_service(catalina_service(8080))
}

static TRACING: Once = Once::new();

/// Install a test subscriber honoring `RUST_LOG`; safe to call repeatedly
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
