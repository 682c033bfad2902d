//! Element and node types
//!
//! An [`Element`] owns its attributes (in document order) and its child
//! [`Node`]s, including the whitespace text between siblings. Structural
//! edits go through the `*_element` methods, which keep the surrounding
//! indentation consistent so hand-formatted files stay readable.

use std::ops::Range;

/// A single `name="value"` pair, value stored unescaped
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Attribute {
    /// Qualified attribute name
    pub name: String,
    /// Unescaped attribute value
    pub value: String,
}

/// Any child of an element or top-level item of a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Nested element
    Element(Element),
    /// Character data, unescaped
    Text(String),
    /// `<![CDATA[...]]>` section content
    CData(String),
    /// `<!--...-->` content, kept verbatim
    Comment(String),
    /// `<?target ...?>` content, kept verbatim
    ProcessingInstruction(String),
    /// `<?xml ...?>` content, kept verbatim
    Declaration(String),
    /// `<!DOCTYPE ...>` content, kept verbatim
    DocType(String),
}

impl Node {
    /// Borrow as element
    #[inline]
    #[must_use]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Mutably borrow as element
    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Self::Element(el) => Some(el),
            _ => None,
        }
    }

    /// True for elements
    #[inline]
    #[must_use]
    pub fn is_element(&self) -> bool {
        matches!(self, Self::Element(_))
    }

    /// True for text nodes made only of whitespace
    #[inline]
    #[must_use]
    pub fn is_whitespace(&self) -> bool {
        matches!(self, Self::Text(text) if text.chars().all(char::is_whitespace))
    }
}

/// An element removed from its parent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detached {
    /// The removed element
    pub element: Element,
    /// Child indices (before removal) that were taken out, including the
    /// element's leading indentation
    pub span: Range<usize>,
}

/// XML element with ordered attributes and children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<Attribute>,
    children: Vec<Node>,
}

impl Element {
    /// Create an empty element
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder: add or replace an attribute
    #[inline]
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Builder: push a child node as is (no indentation handling)
    #[inline]
    #[must_use]
    pub fn with_child(mut self, node: Node) -> Self {
        self.children.push(node);
        self
    }

    /// Element name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attributes in document order
    #[inline]
    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Look up an attribute value
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Check attribute presence
    #[inline]
    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Set an attribute, replacing in place if present, otherwise appending.
    ///
    /// Returns the previous value.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => Some(std::mem::replace(&mut existing.value, value)),
            None => {
                self.attributes.push(Attribute { name, value });
                None
            }
        }
    }

    /// Remove an attribute, returning its value
    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let pos = self.attributes.iter().position(|a| a.name == name)?;
        Some(self.attributes.remove(pos).value)
    }

    /// Child nodes
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Push a raw child node
    #[inline]
    pub fn push_node(&mut self, node: Node) {
        self.children.push(node);
    }

    /// Child elements in document order
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Child elements with a given tag, paired with their child index
    pub fn indexed_elements<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = (usize, &'a Element)> + 'a {
        self.children
            .iter()
            .enumerate()
            .filter_map(move |(idx, node)| match node {
                Node::Element(el) if el.name == tag => Some((idx, el)),
                _ => None,
            })
    }

    /// Child indices of all elements with a given tag
    #[must_use]
    pub fn element_indices(&self, tag: &str) -> Vec<usize> {
        self.indexed_elements(tag).map(|(idx, _)| idx).collect()
    }

    /// First child element with a given tag
    #[must_use]
    pub fn first_child(&self, tag: &str) -> Option<&Element> {
        self.child_elements().find(|el| el.name == tag)
    }

    /// First child element with a given tag, mutably
    pub fn first_child_mut(&mut self, tag: &str) -> Option<&mut Element> {
        self.children
            .iter_mut()
            .filter_map(Node::as_element_mut)
            .find(|el| el.name == tag)
    }

    /// Child index of the first element with a given tag
    #[must_use]
    pub fn first_child_index(&self, tag: &str) -> Option<usize> {
        self.indexed_elements(tag).next().map(|(idx, _)| idx)
    }

    /// Element at a child index
    #[inline]
    #[must_use]
    pub fn element_at(&self, idx: usize) -> Option<&Element> {
        self.children.get(idx).and_then(Node::as_element)
    }

    /// Element at a child index, mutably
    #[inline]
    pub fn element_at_mut(&mut self, idx: usize) -> Option<&mut Element> {
        self.children.get_mut(idx).and_then(Node::as_element_mut)
    }

    /// Concatenated text and CDATA content of direct children
    #[must_use]
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) | Node::CData(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Replace direct text/CDATA children with a single text node
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children
            .retain(|node| !matches!(node, Node::Text(_) | Node::CData(_)));
        self.children.insert(0, Node::Text(text.into()));
    }

    /// Append a child element after the last child, copying sibling indentation.
    ///
    /// Returns the child index of the new element.
    pub fn append_element(&mut self, element: Element) -> usize {
        let indent = self.sibling_indent();
        let closing_ws = self.children.last().is_some_and(Node::is_whitespace)
            && self.children.len() > 1;
        let mut at = if closing_ws {
            self.children.len() - 1
        } else {
            self.children.len()
        };
        if let Some(indent) = indent {
            self.children.insert(at, Node::Text(indent));
            at += 1;
        }
        self.children.insert(at, Node::Element(element));
        at
    }

    /// Insert a child element directly before the element at `idx`.
    ///
    /// Returns the child index of the new element.
    pub fn insert_element_before(&mut self, idx: usize, element: Element) -> usize {
        let idx = idx.min(self.children.len());
        if let Some(indent) = self.leading_whitespace(idx).map(str::to_owned) {
            self.children.insert(idx, Node::Text(indent));
        }
        self.children.insert(idx, Node::Element(element));
        idx
    }

    /// Insert a child element directly after the element at `idx`.
    ///
    /// Returns the child index of the new element.
    pub fn insert_element_after(&mut self, idx: usize, element: Element) -> usize {
        if idx >= self.children.len() {
            return self.append_element(element);
        }
        let indent = self
            .leading_whitespace(idx)
            .map(str::to_owned)
            .or_else(|| self.sibling_indent());
        let mut at = idx + 1;
        if let Some(indent) = indent {
            self.children.insert(at, Node::Text(indent));
            at += 1;
        }
        self.children.insert(at, Node::Element(element));
        at
    }

    /// Remove the element at `idx` together with its leading indentation
    pub fn detach_element(&mut self, idx: usize) -> Option<Detached> {
        if !self.children.get(idx).is_some_and(Node::is_element) {
            return None;
        }
        let start = if self.leading_whitespace(idx).is_some() {
            idx - 1
        } else {
            idx
        };
        let mut removed: Vec<Node> = self.children.drain(start..=idx).collect();
        let element = match removed.pop() {
            Some(Node::Element(el)) => el,
            _ => return None,
        };
        Some(Detached {
            element,
            span: start..idx + 1,
        })
    }

    /// Whitespace text directly preceding the child at `idx`
    fn leading_whitespace(&self, idx: usize) -> Option<&str> {
        let prev = idx.checked_sub(1)?;
        match self.children.get(prev) {
            Some(Node::Text(text)) if text.chars().all(char::is_whitespace) => Some(text),
            _ => None,
        }
    }

    /// Indentation used in front of existing child elements
    fn sibling_indent(&self) -> Option<String> {
        let first = self.children.iter().position(Node::is_element)?;
        self.leading_whitespace(first).map(str::to_owned)
    }
}
