//! Documents: parsing and serialization
//!
//! Parsing keeps every node the reader reports (whitespace, comments,
//! declarations) so a document that is parsed and written back without edits
//! reproduces its structure. Attribute quoting and entity spelling are
//! normalized by the writer.

use crate::error::{XmlError, XmlResult};
use crate::node::{Element, Node};
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesCData, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

/// A parsed XML document: prolog, one root element, epilog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    prolog: Vec<Node>,
    root: Element,
    epilog: Vec<Node>,
}

impl Document {
    /// Create a document holding an empty root element
    #[inline]
    #[must_use]
    pub fn new(root_name: impl Into<String>) -> Self {
        Self::from_root(Element::new(root_name))
    }

    /// Create a document around an existing root
    #[inline]
    #[must_use]
    pub fn from_root(root: Element) -> Self {
        Self {
            prolog: Vec::new(),
            root,
            epilog: Vec::new(),
        }
    }

    /// Root element
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Root element, mutably
    #[inline]
    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    /// Nodes before the root (declaration, doctype, comments)
    #[inline]
    #[must_use]
    pub fn prolog(&self) -> &[Node] {
        &self.prolog
    }

    /// Parse a document from a string
    ///
    /// # Errors
    /// Returns [`XmlError`] for malformed markup, a missing or duplicated
    /// root, or unbalanced tags.
    pub fn parse(input: &str) -> XmlResult<Self> {
        let mut reader = Reader::from_str(input);
        reader.config_mut().trim_text(false);

        let mut builder = TreeBuilder::default();
        loop {
            let position = reader.buffer_position() as u64;
            let event = reader
                .read_event()
                .map_err(|e| XmlError::syntax(position, e.to_string()))?;
            match event {
                Event::Start(start) => {
                    let element = element_from_start(&start, position)?;
                    builder.open.push(element);
                }
                Event::Empty(start) => {
                    let element = element_from_start(&start, position)?;
                    builder.attach(Node::Element(element))?;
                }
                Event::End(end) => {
                    let element = builder.open.pop().ok_or_else(|| {
                        XmlError::UnbalancedEnd(String::from_utf8_lossy(end.name().as_ref()).into_owned())
                    })?;
                    builder.attach(Node::Element(element))?;
                }
                Event::Text(text) => {
                    let text = text
                        .unescape()
                        .map_err(|e| XmlError::syntax(position, e.to_string()))?;
                    builder.attach(Node::Text(text.into_owned()))?;
                }
                Event::CData(data) => {
                    let data = std::str::from_utf8(&data)?;
                    builder.attach(Node::CData(data.to_owned()))?;
                }
                Event::Comment(comment) => {
                    let comment = std::str::from_utf8(&comment)?;
                    builder.attach(Node::Comment(comment.to_owned()))?;
                }
                Event::Decl(decl) => {
                    let decl = std::str::from_utf8(&decl)?;
                    builder.attach(Node::Declaration(decl.to_owned()))?;
                }
                Event::PI(pi) => {
                    let pi = std::str::from_utf8(&pi)?;
                    builder.attach(Node::ProcessingInstruction(pi.to_owned()))?;
                }
                Event::DocType(doctype) => {
                    let doctype = std::str::from_utf8(&doctype)?;
                    builder.attach(Node::DocType(doctype.trim().to_owned()))?;
                }
                Event::Eof => break,
            }
        }
        builder.finish()
    }

    /// Serialize the document to a string
    ///
    /// # Errors
    /// Returns [`XmlError::Write`] if the writer rejects an event.
    pub fn to_xml_string(&self) -> XmlResult<String> {
        let mut writer = Writer::new(Vec::new());
        for node in &self.prolog {
            write_node(&mut writer, node)?;
        }
        write_element(&mut writer, &self.root)?;
        for node in &self.epilog {
            write_node(&mut writer, node)?;
        }
        String::from_utf8(writer.into_inner()).map_err(|e| XmlError::Write(e.to_string()))
    }
}

impl std::str::FromStr for Document {
    type Err = XmlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Incremental tree assembly for the reader loop
#[derive(Default)]
struct TreeBuilder {
    prolog: Vec<Node>,
    root: Option<Element>,
    epilog: Vec<Node>,
    open: Vec<Element>,
}

impl TreeBuilder {
    fn attach(&mut self, node: Node) -> XmlResult<()> {
        if let Some(parent) = self.open.last_mut() {
            parent.push_node(node);
            return Ok(());
        }
        match (node, self.root.is_some()) {
            (Node::Element(el), false) => self.root = Some(el),
            (Node::Element(el), true) => return Err(XmlError::MultipleRoots(el.name().to_owned())),
            (other, false) => self.prolog.push(other),
            (other, true) => self.epilog.push(other),
        }
        Ok(())
    }

    fn finish(mut self) -> XmlResult<Document> {
        if let Some(open) = self.open.pop() {
            return Err(XmlError::Unclosed(open.name().to_owned()));
        }
        let root = self.root.ok_or(XmlError::MissingRoot)?;
        Ok(Document {
            prolog: self.prolog,
            root,
            epilog: self.epilog,
        })
    }
}

fn element_from_start(start: &BytesStart<'_>, position: u64) -> XmlResult<Element> {
    let name = std::str::from_utf8(start.name().as_ref())?.to_owned();
    let mut element = Element::new(name);
    for attr in start.attributes() {
        let attr = attr.map_err(|e| XmlError::syntax(position, e.to_string()))?;
        let key = std::str::from_utf8(attr.key.as_ref())?.to_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| XmlError::syntax(position, e.to_string()))?
            .into_owned();
        element.set_attribute(key, value);
    }
    Ok(element)
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &Node) -> XmlResult<()> {
    match node {
        Node::Element(el) => write_element(writer, el),
        Node::Text(text) => emit(
            writer,
            Event::Text(BytesText::from_escaped(partial_escape(text.as_str()))),
        ),
        Node::CData(data) => emit(writer, Event::CData(BytesCData::new(data.as_str()))),
        Node::Comment(comment) => emit(
            writer,
            Event::Comment(BytesText::from_escaped(comment.as_str())),
        ),
        Node::ProcessingInstruction(raw) | Node::Declaration(raw) => {
            write_raw(writer, &format!("<?{raw}?>"));
            Ok(())
        }
        Node::DocType(raw) => {
            write_raw(writer, &format!("<!DOCTYPE {raw}>"));
            Ok(())
        }
    }
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> XmlResult<()> {
    let mut start = BytesStart::new(element.name());
    for attr in element.attributes() {
        start.push_attribute((attr.name.as_str(), attr.value.as_str()));
    }
    if element.children().is_empty() {
        return emit(writer, Event::Empty(start));
    }
    emit(writer, Event::Start(start))?;
    for child in element.children() {
        write_node(writer, child)?;
    }
    emit(writer, Event::End(BytesEnd::new(element.name())))
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> XmlResult<()> {
    writer
        .write_event(event)
        .map_err(|e| XmlError::Write(e.to_string()))
}

fn write_raw(writer: &mut Writer<Vec<u8>>, raw: &str) {
    writer.get_mut().extend_from_slice(raw.as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SERVER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- main server -->
<Server port="8005" shutdown="SHUTDOWN">
  <Listener className="org.apache.catalina.startup.VersionLoggerListener"/>
  <Service name="Catalina">
    <Connector port="8080" protocol="HTTP/1.1"/>
    <Engine name="Catalina" defaultHost="localhost">
      <Valve className="org.apache.catalina.valves.AccessLogValve" pattern="%h %l %u %t &quot;%r&quot; %s %b"/>
    </Engine>
  </Service>
</Server>
"#;

    #[test]
    fn parse_keeps_prolog_and_structure() {
        let doc = Document::parse(SERVER).unwrap();
        assert!(matches!(doc.prolog()[0], Node::Declaration(_)));
        assert!(doc
            .prolog()
            .iter()
            .any(|n| matches!(n, Node::Comment(c) if c.trim() == "main server")));
        assert_eq!(doc.root().name(), "Server");
        assert_eq!(doc.root().attribute("port"), Some("8005"));
        let service = doc.root().first_child("Service").unwrap();
        assert_eq!(service.attribute("name"), Some("Catalina"));
    }

    #[test]
    fn attribute_entities_are_unescaped() {
        let doc = Document::parse(SERVER).unwrap();
        let valve = doc
            .root()
            .first_child("Service")
            .and_then(|s| s.first_child("Engine"))
            .and_then(|e| e.first_child("Valve"))
            .unwrap();
        assert_eq!(valve.attribute("pattern"), Some(r#"%h %l %u %t "%r" %s %b"#));
    }

    #[test]
    fn unedited_roundtrip_is_stable() {
        let doc = Document::parse(SERVER).unwrap();
        let written = doc.to_xml_string().unwrap();
        let reparsed = Document::parse(&written).unwrap();
        assert_eq!(doc, reparsed);
        assert_eq!(written, reparsed.to_xml_string().unwrap());
    }

    #[test]
    fn written_output_preserves_comments_and_declaration() {
        let doc = Document::parse(SERVER).unwrap();
        let written = doc.to_xml_string().unwrap();
        assert!(written.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(written.contains("<!-- main server -->"));
        assert!(written.contains("&quot;%r&quot;"));
    }

    #[test]
    fn rejects_second_root() {
        let err = Document::parse("<a/><b/>").unwrap_err();
        assert!(matches!(err, XmlError::MultipleRoots(name) if name == "b"));
    }

    #[test]
    fn rejects_missing_root() {
        let err = Document::parse("<!-- nothing -->").unwrap_err();
        assert!(matches!(err, XmlError::MissingRoot));
    }

    #[test]
    fn rejects_unclosed_element() {
        let err = Document::parse("<Server><Service>").unwrap_err();
        assert!(matches!(err, XmlError::Unclosed(_)));
    }

    #[test]
    fn rejects_mismatched_end() {
        assert!(Document::parse("<Server></Service>").is_err());
    }

    #[test]
    fn new_document_serializes_empty_root() {
        let doc = Document::new("Server");
        assert_eq!(doc.to_xml_string().unwrap(), "<Server/>");
    }

    #[test]
    fn text_content_is_escaped_on_write() {
        let root = Element::new("a").with_child(Node::Text("x < y & z".to_string()));
        let doc = Document::from_root(root);
        let written = doc.to_xml_string().unwrap();
        assert_eq!(written, "<a>x &lt; y &amp; z</a>");
        assert_eq!(Document::parse(&written).unwrap(), doc);
    }
}
