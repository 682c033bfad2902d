//! Catalina document reconciliation
//!
//! Reads `server.xml`, the global `context.xml` and the global `web.xml`
//! into a [`catalina_model::Settings`] tree, and writes a desired tree back
//! into the same documents with the smallest possible edit.
//!
//! # Core Concepts
//!
//! - [`Reconciler`]: `read`, `write` and validating `reconcile`
//! - [`ElementConverter`]: per-node two-way mapping
//! - [`merge`]: identity-based collection merge that never touches
//!   elements it does not own
//! - [`Properties`]: `${key}` placeholder resolution; placeholders are kept
//!   on write while they still resolve to the desired value
//!
//! # Example
//!
//! ```
//! use catalina_convert::{DocumentSet, Properties, ReconcileOptions, Reconciler};
//! use catalina_model::{Connector, HttpConnector};
//!
//! let xml = r#"<Server port="8005" shutdown="SHUTDOWN">
//!   <Service name="Catalina">
//!     <Connector port="${http.port}" protocol="HTTP/1.1" connectionTimeout="20000" redirectPort="8443"/>
//!     <Engine name="Catalina" defaultHost="localhost">
//!       <Host name="localhost" appBase="webapps"/>
//!     </Engine>
//!   </Service>
//! </Server>"#;
//!
//! let reconciler = Reconciler::new(
//!     Properties::new().with("http.port", "8080"),
//!     ReconcileOptions::default(),
//! );
//! let mut documents = DocumentSet::parse(xml, None, None).unwrap();
//! let mut settings = reconciler.read(&documents).unwrap();
//! settings.services[0]
//!     .connectors
//!     .push(Connector::Http(HttpConnector::new(8081)));
//!
//! let outcome = reconciler.reconcile(&mut documents, &mut settings).unwrap();
//! assert_eq!(outcome.created, 1);
//! let written = documents.server.to_xml_string().unwrap();
//! assert!(written.contains(r#"port="${http.port}""#));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod attributes;
pub mod converters;
mod error;
mod merge;
mod options;
mod properties;
mod reconciler;

pub use converters::{ConvertContext, DocumentSet, ElementConverter};
pub use error::{ConvertError, ConvertResult, ReconcileError};
pub use merge::{merge, MergeOutcome, MergeTarget};
pub use options::{ReconcileOptions, WritePolicy};
pub use properties::{is_placeholder, placeholder_key, Properties};
pub use reconciler::Reconciler;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use catalina_model::{validate, ErrorCode, Service};
    use pretty_assertions::assert_eq;

    const SERVER: &str = r#"<Server port="8005" shutdown="SHUTDOWN">
  <Service name="Catalina">
    <Connector port="8080" protocol="org.apache.coyote.http11.Http11NioProtocol" connectionTimeout="20000" redirectPort="8443"/>
    <Engine name="Catalina" defaultHost="localhost">
      <Host name="localhost" appBase="webapps"/>
    </Engine>
  </Service>
</Server>"#;

    #[test]
    fn invalid_settings_are_not_written() {
        let reconciler = Reconciler::default();
        let mut documents = DocumentSet::parse(SERVER, None, None).unwrap();
        let mut settings = reconciler.read(&documents).unwrap();
        settings.services.push(Service::new("Catalina"));

        let err = reconciler.reconcile(&mut documents, &mut settings).unwrap_err();
        let ReconcileError::Invalid(errors) = err else {
            panic!("expected validation failure");
        };
        assert!(errors
            .for_field("services[1].name")
            .iter()
            .any(|e| e.code == ErrorCode::Duplicate));
        assert_eq!(documents.server.to_xml_string().unwrap(), SERVER);
    }

    #[test]
    fn read_tree_is_valid() {
        let reconciler = Reconciler::default();
        let documents = DocumentSet::parse(SERVER, None, None).unwrap();
        let mut settings = reconciler.read(&documents).unwrap();
        assert!(validate(&mut settings).is_empty());
    }

    #[test]
    fn unchanged_write_is_a_no_op() {
        let reconciler = Reconciler::default();
        let mut documents = DocumentSet::parse(SERVER, None, None).unwrap();
        let settings = reconciler.read(&documents).unwrap();
        let outcome = reconciler.write(&mut documents, &settings).unwrap();
        assert!(outcome.is_structurally_stable());
        assert_eq!(documents.server.to_xml_string().unwrap(), SERVER);
    }
}
