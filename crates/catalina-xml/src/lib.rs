//! Catalina XML document model
//!
//! A small, mutable, order-preserving XML tree used as the live document
//! that configuration converters read from and reconcile into.
//!
//! # Core Concepts
//!
//! - [`Document`]: prolog, root [`Element`], epilog
//! - [`Element`]: ordered attributes and child [`Node`]s
//! - Structural edits (`append_element`, `insert_element_before`,
//!   `insert_element_after`, `detach_element`) that carry indentation along
//!
//! # Example
//!
//! ```
//! use catalina_xml::{Document, Element};
//!
//! let mut doc = Document::parse("<Server>\n  <Service name=\"Catalina\"/>\n</Server>").unwrap();
//! doc.root_mut().append_element(Element::new("Service").with_attribute("name", "Other"));
//! assert_eq!(doc.root().element_indices("Service").len(), 2);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod document;
mod error;
mod node;

pub use document::Document;
pub use error::{XmlError, XmlResult};
pub use node::{Attribute, Detached, Element, Node};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn edit_then_serialize_keeps_layout() {
        let input = "<Server>\n  <Service name=\"A\"/>\n</Server>";
        let mut doc = Document::parse(input).unwrap();
        doc.root_mut()
            .append_element(Element::new("Service").with_attribute("name", "B"));
        let written = doc.to_xml_string().unwrap();
        assert_eq!(
            written,
            "<Server>\n  <Service name=\"A\"/>\n  <Service name=\"B\"/>\n</Server>"
        );
    }

    #[test]
    fn detach_then_serialize_keeps_layout() {
        let input = "<Server>\n  <Service name=\"A\"/>\n  <Service name=\"B\"/>\n</Server>";
        let mut doc = Document::parse(input).unwrap();
        let idx = doc.root().element_indices("Service")[0];
        doc.root_mut().detach_element(idx).unwrap();
        let written = doc.to_xml_string().unwrap();
        assert_eq!(written, "<Server>\n  <Service name=\"B\"/>\n</Server>");
    }
}
